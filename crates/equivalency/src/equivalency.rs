//! Top-level entry points.
//!
//! Each call builds its own options snapshot, graph tracker and reporter,
//! so concurrent calls over unrelated graphs share nothing.

use tracing::debug;

use crate::engine::Engine;
use crate::error::{EquivalencyError, UsageError};
use crate::node::ComparisonNode;
use crate::options::{EquivalencyOptions, EquivalencyOptionsBuilder};
use crate::reporter::{MismatchList, Reporter};
use crate::types::TypeRef;
use crate::value::Value;

const DEFAULT_ROOT: &str = "subject";

/// Configures and runs one structural comparison.
///
/// ```
/// use equivalency::{Equivalency, Seq};
///
/// let report = Equivalency::new(Seq::of([1, 2, 3]), Seq::of([3, 2, 1]))
///     .identified_as("numbers")
///     .run()
///     .unwrap();
/// assert!(report.is_empty());
/// ```
pub struct Equivalency {
    subject: Value,
    expectation: Value,
    root: String,
    because: String,
    declared_type: Option<TypeRef>,
    builder: EquivalencyOptionsBuilder,
}

impl Equivalency {
    pub fn new(subject: impl Into<Value>, expectation: impl Into<Value>) -> Self {
        Self {
            subject: subject.into(),
            expectation: expectation.into(),
            root: DEFAULT_ROOT.to_string(),
            because: String::new(),
            declared_type: None,
            builder: EquivalencyOptionsBuilder::new(),
        }
    }

    /// Label used in place of `subject` in every message.
    pub fn identified_as(mut self, name: impl Into<String>) -> Self {
        self.root = name.into();
        self
    }

    pub fn because(mut self, reason: impl Into<String>) -> Self {
        self.because = reason.into();
        self
    }

    /// Statically known type of the expectation at the root.
    pub fn declared_as(mut self, ty: TypeRef) -> Self {
        self.declared_type = Some(ty);
        self
    }

    pub fn configure(
        mut self,
        configure: impl FnOnce(EquivalencyOptionsBuilder) -> EquivalencyOptionsBuilder,
    ) -> Self {
        self.builder = configure(self.builder);
        self
    }

    /// Compares and returns every mismatch found. Invalid options fail
    /// before traversal starts.
    pub fn run(self) -> Result<MismatchList, UsageError> {
        let options = self.builder.build()?;
        Ok(compare_with(
            &options,
            ComparisonNode {
                declared_type: self.declared_type,
                ..ComparisonNode::root(self.subject, self.expectation)
            },
            Reporter::new(self.root, &self.because),
        ))
    }

    /// Like [`Equivalency::run`], but mismatches become one failure.
    pub fn assert(self) -> Result<(), EquivalencyError> {
        self.run()?.into_result()?;
        Ok(())
    }
}

fn compare_with(
    options: &EquivalencyOptions,
    root: ComparisonNode,
    reporter: Reporter,
) -> MismatchList {
    debug!(
        subject_type = %root.subject.runtime_type(),
        expectation_type = %root.runtime_type(),
        runtime_typing = options.uses_runtime_typing(),
        "starting equivalency comparison"
    );
    let mut engine = Engine::new(options, reporter);
    engine.compare(&root);
    let mismatches = engine.finish();
    debug!(
        root = mismatches.root(),
        mismatches = mismatches.len(),
        "finished equivalency comparison"
    );
    mismatches
}

/// Compares `subject` against `expectation` and returns every mismatch.
///
/// `configure` receives a fresh options builder; `because` is appended to
/// each message as ` because ...` when non-empty.
pub fn assert_equivalent(
    subject: impl Into<Value>,
    expectation: impl Into<Value>,
    configure: impl FnOnce(EquivalencyOptionsBuilder) -> EquivalencyOptionsBuilder,
    because: &str,
) -> Result<MismatchList, UsageError> {
    Equivalency::new(subject, expectation)
        .configure(configure)
        .because(because)
        .run()
}

/// Default options, raising a single failure on any mismatch.
pub fn should_be_equivalent(
    subject: impl Into<Value>,
    expectation: impl Into<Value>,
) -> Result<(), EquivalencyError> {
    Equivalency::new(subject, expectation).assert()
}
