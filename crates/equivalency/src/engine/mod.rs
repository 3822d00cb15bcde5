//! Recursive equivalency traversal.
//!
//! One [`Engine`] runs per top-level call. Options, the graph tracker and the
//! reporter travel with it through every recursive step; nothing is shared
//! between calls.

mod collection;
mod dictionary;
mod object;

pub use dictionary::{check_key_compatibility, KeyCompatibility, KeyIncompatibility};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{trace, warn};

use crate::classify::{classify, Classification, Strategy};
use crate::deep_equal::deep_equal;
use crate::format::describe;
use crate::node::ComparisonNode;
use crate::options::{EnumEquivalence, EqualityRule, EquivalencyOptions};
use crate::reporter::{escape, Mismatch, MismatchKind, MismatchList, Reporter};
use crate::tracker::GraphTracker;
use crate::types::TypeRef;
use crate::value::Value;

const VALUE_DIFFERS: &str = "Expected {context} to be {expected}{reason}, but found {actual}.";

pub(crate) struct Engine<'o> {
    options: &'o EquivalencyOptions,
    tracker: GraphTracker,
    reporter: Reporter,
}

impl<'o> Engine<'o> {
    pub(crate) fn new(options: &'o EquivalencyOptions, reporter: Reporter) -> Self {
        Self {
            options,
            tracker: GraphTracker::new(),
            reporter,
        }
    }

    pub(crate) fn finish(self) -> MismatchList {
        self.reporter.finish()
    }

    pub(crate) fn compare(&mut self, node: &ComparisonNode) {
        let options = self.options;
        if let Some(rule) = options.equality_rule_for(&node.context()) {
            self.apply_rule(rule, node);
            return;
        }

        let classification = classify(node, options);
        trace!(path = %node.path, strategy = label(&classification), "classified node");

        match classification {
            Classification::BothAbsent => {}
            Classification::SubjectAbsent | Classification::ExpectationAbsent => {
                self.record(value_mismatch(MismatchKind::Null, node));
            }
            Classification::Ambiguous { ty, key_types } => {
                self.record(ambiguous_shape(node, &ty, &key_types));
            }
            Classification::Strategy(strategy) => {
                if !matches!(strategy, Strategy::Scalar) && self.too_deep(node) {
                    return;
                }
                if !self.tracker.enter(&node.subject, &node.expectation) {
                    trace!(path = %node.path, "reference pair already visited");
                    return;
                }
                match strategy {
                    Strategy::Scalar => self.compare_scalars(node),
                    Strategy::Collection { element } => self.compare_collections(node, &element),
                    Strategy::Dictionary { key, value } => {
                        self.compare_dictionaries(node, &key, &value)
                    }
                    Strategy::ComplexObject { ty } => self.compare_objects(node, &ty),
                }
            }
        }
    }

    /// Records a mismatch instead of descending below the depth limit.
    fn too_deep(&mut self, node: &ComparisonNode) -> bool {
        let Some(max) = self.options.max_depth() else {
            return false;
        };
        if node.path.depth() <= max {
            return false;
        }
        let template = format!(
            "Expected {{context}} to be {{expected}}{{reason}}, but the maximum recursion depth of {max} was reached."
        );
        self.record(
            Mismatch::new(MismatchKind::MaxDepth, node.path.clone(), template)
                .expected(describe(&node.expectation)),
        );
        true
    }

    fn record(&mut self, mismatch: Mismatch) {
        self.reporter.record(mismatch);
    }

    fn apply_rule(&mut self, rule: &EqualityRule, node: &ComparisonNode) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            rule.compare(&node.subject, &node.expectation)
        }));
        let failure = match outcome {
            Ok(Ok(true)) => return,
            Ok(Ok(false)) => {
                self.record(value_mismatch(MismatchKind::Value, node));
                return;
            }
            Ok(Err(error)) => error.to_string(),
            Err(payload) => format!("panicked with {}", panic_message(payload.as_ref())),
        };
        warn!(path = %node.path, selector = %rule.selector(), %failure, "custom comparer failed");
        let template = format!(
            "Expected {{context}} to be {{expected}}{{reason}}, but the custom comparer for {} failed: {}.",
            escape(&rule.selector().to_string()),
            escape(&failure)
        );
        self.record(
            Mismatch::new(MismatchKind::ComparerFailed, node.path.clone(), template)
                .expected(describe(&node.expectation))
                .actual(describe(&node.subject)),
        );
    }

    fn compare_scalars(&mut self, node: &ComparisonNode) {
        if !scalars_equal(
            &node.subject,
            &node.expectation,
            self.options.enum_equivalence(),
        ) {
            self.record(value_mismatch(MismatchKind::Value, node));
        }
    }

    /// Compares `node` in isolation. On success, returns the tracker state
    /// the caller should adopt; a failed attempt leaves no trace.
    fn try_match(&self, node: &ComparisonNode) -> Option<GraphTracker> {
        let mut trial = Engine {
            options: self.options,
            tracker: self.tracker.clone(),
            reporter: Reporter::scratch(),
        };
        trial.compare(node);
        trial.reporter.is_empty().then_some(trial.tracker)
    }
}

fn label(classification: &Classification) -> &'static str {
    match classification {
        Classification::BothAbsent => "both-null",
        Classification::SubjectAbsent | Classification::ExpectationAbsent => "one-null",
        Classification::Ambiguous { .. } => "ambiguous",
        Classification::Strategy(Strategy::Scalar) => "scalar",
        Classification::Strategy(Strategy::Collection { .. }) => "collection",
        Classification::Strategy(Strategy::Dictionary { .. }) => "dictionary",
        Classification::Strategy(Strategy::ComplexObject { .. }) => "complex-object",
    }
}

fn scalars_equal(subject: &Value, expectation: &Value, enums: EnumEquivalence) -> bool {
    match (subject, expectation) {
        (Value::Enum(a), Value::Enum(b)) => match enums {
            EnumEquivalence::ByValue => a.value() == b.value(),
            EnumEquivalence::ByName => a.name() == b.name(),
        },
        (Value::Enum(a), Value::Int(b)) | (Value::Int(b), Value::Enum(a))
            if enums == EnumEquivalence::ByValue =>
        {
            a.value() == *b
        }
        _ => deep_equal(subject, expectation),
    }
}

fn value_mismatch(kind: MismatchKind, node: &ComparisonNode) -> Mismatch {
    Mismatch::new(kind, node.path.clone(), VALUE_DIFFERS)
        .expected(describe(&node.expectation))
        .actual(describe(&node.subject))
}

fn ambiguous_shape(node: &ComparisonNode, ty: &TypeRef, key_types: &[TypeRef]) -> Mismatch {
    let keys: Vec<&str> = key_types.iter().map(|t| t.name()).collect();
    let template = format!(
        "Expected {{context}} to be comparable as a dictionary{{reason}}, but type {} exposes conflicting key types {}.",
        escape(ty.name()),
        escape(&keys.join(", "))
    );
    Mismatch::new(MismatchKind::AmbiguousShape, node.path.clone(), template)
        .expected(describe(&node.expectation))
        .actual(describe(&node.subject))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "a non-string payload".to_string()
    }
}
