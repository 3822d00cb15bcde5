//! Failure Reporter: collects every mismatch of one traversal and renders
//! them into a single failure.
//!
//! A mismatch carries a message template with four placeholders:
//!
//! - `{context}`: root label joined to the breadcrumb (`subject.Orders[1]`)
//! - `{expected}` / `{actual}`: descriptions captured when recorded
//! - `{reason}`: ` because ...` built from the caller's reason, or nothing
//!
//! `{{` and `}}` render literal braces, so text embedded in a template at
//! construction time must go through [`escape`].

use std::borrow::Cow;

use equivalency_path::Path;

use crate::error::{AssertionFailure, EquivalencyError, UsageError};

const DEFAULT_ROOT: &str = "subject";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchKind {
    /// Scalar or fallback values differ.
    Value,
    /// Exactly one side is `<null>`.
    Null,
    /// The subject does not have the expected shape at all.
    Shape,
    /// Sequence lengths differ.
    Count,
    /// Expected elements without an equivalent in the subject.
    MissingItems,
    /// Subject elements left over after matching.
    AdditionalItems,
    /// Dictionary key sets differ.
    Keys,
    /// Dictionary key types cannot be compared.
    IncompatibleKeys,
    /// A value exposes several conflicting dictionary shapes.
    AmbiguousShape,
    /// A member of the expectation is absent on the subject.
    MissingMember,
    /// A custom comparer failed or panicked.
    ComparerFailed,
    MaxDepth,
    /// Raised by a direct collection assertion.
    Assertion,
}

/// A single discovered difference.
#[derive(Debug, Clone)]
pub struct Mismatch {
    pub kind: MismatchKind,
    pub path: Path,
    pub expected: String,
    pub actual: String,
    pub template: Cow<'static, str>,
}

impl Mismatch {
    pub fn new(kind: MismatchKind, path: Path, template: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            path,
            expected: String::new(),
            actual: String::new(),
            template: template.into(),
        }
    }

    pub fn expected(mut self, text: impl Into<String>) -> Self {
        self.expected = text.into();
        self
    }

    pub fn actual(mut self, text: impl Into<String>) -> Self {
        self.actual = text.into();
        self
    }

    /// Renders the template for the given root label and reason clause.
    pub fn render(&self, root: &str, reason: &str) -> String {
        let context = self.path.describe(root);
        let template = self.template.as_ref();
        let mut out = String::with_capacity(template.len() + 32);
        let mut rest = template;
        while let Some(pos) = rest.find(['{', '}']) {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            if tail.starts_with("{{") {
                out.push('{');
                rest = &tail[2..];
                continue;
            }
            if tail.starts_with("}}") {
                out.push('}');
                rest = &tail[2..];
                continue;
            }
            let placeholder = [
                ("{context}", context.as_str()),
                ("{expected}", self.expected.as_str()),
                ("{actual}", self.actual.as_str()),
                ("{reason}", reason),
            ]
            .into_iter()
            .find(|(token, _)| tail.starts_with(token));
            match placeholder {
                Some((token, text)) => {
                    out.push_str(text);
                    rest = &tail[token.len()..];
                }
                None => {
                    out.push_str(&tail[..1]);
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Doubles braces so `text` renders literally inside a template.
pub fn escape(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}

/// Builds the ` because ...` clause. Empty reasons give an empty clause and
/// a leading "because" is not repeated.
pub fn because_clause(reason: &str) -> String {
    let reason = reason.trim();
    if reason.is_empty() {
        String::new()
    } else if reason.starts_with("because") {
        format!(" {reason}")
    } else {
        format!(" because {reason}")
    }
}

/// Accumulates mismatches for one traversal.
#[derive(Debug, Clone)]
pub struct Reporter {
    root: String,
    reason: String,
    mismatches: Vec<Mismatch>,
}

impl Reporter {
    pub fn new(root: impl Into<String>, because: &str) -> Self {
        Self {
            root: root.into(),
            reason: because_clause(because),
            mismatches: Vec::new(),
        }
    }

    /// A reporter whose output is only inspected for emptiness.
    pub(crate) fn scratch() -> Self {
        Self::new(DEFAULT_ROOT, "")
    }

    pub fn record(&mut self, mismatch: Mismatch) {
        self.mismatches.push(mismatch);
    }

    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mismatches.len()
    }

    pub fn finish(self) -> MismatchList {
        MismatchList {
            root: self.root,
            reason: self.reason,
            mismatches: self.mismatches,
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT, "")
    }
}

/// The outcome of one traversal: empty on success.
#[derive(Debug, Clone)]
pub struct MismatchList {
    root: String,
    reason: String,
    mismatches: Vec<Mismatch>,
}

impl MismatchList {
    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mismatches.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mismatch> {
        self.mismatches.iter()
    }

    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Each mismatch rendered on its own, reason included.
    pub fn lines(&self) -> Vec<String> {
        self.mismatches
            .iter()
            .map(|m| m.render(&self.root, &self.reason))
            .collect()
    }

    /// The aggregated message. A single mismatch is its own message; several
    /// are listed under one header carrying the root label and reason.
    pub fn render(&self) -> String {
        match self.mismatches.as_slice() {
            [] => String::new(),
            [single] => single.render(&self.root, &self.reason),
            many => {
                let mut out = format!(
                    "Expected {} to be equivalent{}, but found {} differences:",
                    self.root,
                    self.reason,
                    many.len()
                );
                for mismatch in many {
                    out.push_str("\n- ");
                    out.push_str(&mismatch.render(&self.root, ""));
                }
                out
            }
        }
    }

    /// `Ok` when empty, otherwise one failure listing every mismatch.
    pub fn into_result(self) -> Result<(), AssertionFailure> {
        if self.is_empty() {
            return Ok(());
        }
        let message = self.render();
        Err(AssertionFailure::new(message, self.mismatches))
    }

    /// Hands the mismatches to a batch instead of raising them.
    pub fn hand_to(self, batch: &mut FailureBatch) {
        batch.absorb(self);
    }
}

/// Combines failures from several unrelated assertions into one report.
#[derive(Debug, Default)]
pub struct FailureBatch {
    messages: Vec<String>,
    mismatches: Vec<Mismatch>,
}

impl FailureBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, list: MismatchList) {
        if list.is_empty() {
            return;
        }
        self.messages.push(list.render());
        self.mismatches.extend(list.mismatches);
    }

    /// Keeps assertion failures for later; usage errors still surface at once.
    pub fn absorb_result(&mut self, result: Result<(), EquivalencyError>) -> Result<(), UsageError> {
        match result {
            Ok(()) => Ok(()),
            Err(EquivalencyError::Failed(failure)) => {
                self.messages.push(failure.message().to_string());
                self.mismatches.extend_from_slice(failure.mismatches());
                Ok(())
            }
            Err(EquivalencyError::Usage(usage)) => Err(usage),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn finish(self) -> Result<(), AssertionFailure> {
        if self.messages.is_empty() {
            return Ok(());
        }
        Err(AssertionFailure::new(
            self.messages.join("\n"),
            self.mismatches,
        ))
    }
}
