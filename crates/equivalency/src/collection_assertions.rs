//! Direct assertions over one collection.
//!
//! Each check runs over materialized items using strict [`deep_equal`]
//! element equality, except the `be_equivalent_to` pair, which delegates to
//! the structural engine. `<null>` and `{empty}` are distinct states with
//! distinct messages. An expectation that is `<null>` or not a collection
//! is a [`UsageError`].

use std::cmp::Ordering;

use equivalency_path::Path;

use crate::deep_equal::deep_equal;
use crate::equivalency::Equivalency;
use crate::error::{AssertionFailure, EquivalencyError, UsageError};
use crate::format::{describe, describe_list, NULL};
use crate::options::EquivalencyOptionsBuilder;
use crate::reporter::{because_clause, escape, Mismatch, MismatchKind};
use crate::value::Value;

const DEFAULT_ROOT: &str = "collection";
const SAME_OBJECT: &str = "they both reference the same object";

type Outcome = Result<(), EquivalencyError>;

/// Assertions about `subject`, a sequence or `<null>`.
#[derive(Debug, Clone)]
pub struct CollectionAssertions {
    subject: Value,
    root: String,
    because: String,
}

impl CollectionAssertions {
    pub fn new(subject: impl Into<Value>) -> Self {
        Self {
            subject: subject.into(),
            root: DEFAULT_ROOT.to_string(),
            because: String::new(),
        }
    }

    pub fn identified_as(mut self, name: impl Into<String>) -> Self {
        self.root = name.into();
        self
    }

    pub fn because(mut self, reason: impl Into<String>) -> Self {
        self.because = reason.into();
        self
    }

    /// Counts through the native count when the sequence has one, so a
    /// deferred sequence is not enumerated on success. Without one, the
    /// single enumeration serves both the count and the message.
    pub fn have_count(&self, expected: usize) -> Outcome {
        let seq = match &self.subject {
            Value::Null => {
                return self.fail(format!(
                    "Expected {{context}} to contain {expected} item(s){{reason}}, but found {NULL}."
                ))
            }
            Value::Seq(seq) => seq,
            other => return Err(not_a_collection("have_count", other).into()),
        };
        let items = if seq.has_native_count() {
            if seq.count() == expected {
                return Ok(());
            }
            seq.items()
        } else {
            let items = seq.items();
            if items.len() == expected {
                return Ok(());
            }
            items
        };
        self.fail(format!(
            "Expected {{context}} to contain {expected} item(s){{reason}}, but found {}: {}.",
            items.len(),
            escape(&describe_list(&items))
        ))
    }

    pub fn be_null(&self) -> Outcome {
        if self.subject.is_null() {
            return Ok(());
        }
        self.fail(format!(
            "Expected {{context}} to be {NULL}{{reason}}, but found {}.",
            escape(&describe(&self.subject))
        ))
    }

    pub fn not_be_null(&self) -> Outcome {
        if !self.subject.is_null() {
            return Ok(());
        }
        self.fail(format!("Expected {{context}} not to be {NULL}{{reason}}."))
    }

    pub fn be_empty(&self) -> Outcome {
        let Some(items) = self.subject_items("be_empty")? else {
            return self.fail(format!(
                "Expected {{context}} to be empty{{reason}}, but found {NULL}."
            ));
        };
        if items.is_empty() {
            return Ok(());
        }
        self.fail(format!(
            "Expected {{context}} to be empty{{reason}}, but found {}.",
            escape(&describe_list(&items))
        ))
    }

    pub fn not_be_empty(&self) -> Outcome {
        let Some(items) = self.subject_items("not_be_empty")? else {
            return self.fail(format!(
                "Expected {{context}} not to be empty{{reason}}, but found {NULL}."
            ));
        };
        if !items.is_empty() {
            return Ok(());
        }
        self.fail("Expected {context} not to be empty{reason}.".to_string())
    }

    /// Same items in the same order.
    pub fn equal(&self, expected: impl Into<Value>) -> Outcome {
        self.equal_by(expected, deep_equal)
    }

    pub fn equal_by(
        &self,
        expected: impl Into<Value>,
        comparer: impl Fn(&Value, &Value) -> bool,
    ) -> Outcome {
        let expected = expectation_items("equal", expected.into())?;
        let shown = escape(&describe_list(&expected));
        let Some(items) = self.subject_items("equal")? else {
            return self.fail(format!(
                "Expected {{context}} to be equal to {shown}{{reason}}, but found {NULL}."
            ));
        };
        let actual = escape(&describe_list(&items));
        if items.len() > expected.len() {
            return self.fail(format!(
                "Expected {{context}} to be equal to {shown}{{reason}}, but {actual} contains {} item(s) too many.",
                items.len() - expected.len()
            ));
        }
        if items.len() < expected.len() {
            return self.fail(format!(
                "Expected {{context}} to be equal to {shown}{{reason}}, but {actual} contains {} item(s) less.",
                expected.len() - items.len()
            ));
        }
        match first_difference(&items, &expected, &comparer) {
            None => Ok(()),
            Some(index) => self.fail(format!(
                "Expected {{context}} to be equal to {shown}{{reason}}, but {} differs at index {index}.",
                escape(&describe(&items[index]))
            )),
        }
    }

    pub fn not_equal(&self, unexpected: impl Into<Value>) -> Outcome {
        let unexpected = unexpected.into();
        let items = expectation_items("not_equal", unexpected.clone())?;
        let shown = escape(&describe_list(&items));
        if self.subject.same_reference(&unexpected) {
            return self.fail(format!(
                "Expected {{context}} not to be equal to {shown}{{reason}}, but {SAME_OBJECT}."
            ));
        }
        let Some(actual) = self.subject_items("not_equal")? else {
            return self.fail(format!(
                "Expected {{context}} not to be equal to {shown}{{reason}}, but found {NULL}."
            ));
        };
        if actual.len() == items.len() && first_difference(&actual, &items, &deep_equal).is_none() {
            return self.fail(format!(
                "Expected {{context}} not to be equal to {shown}{{reason}}, but they are."
            ));
        }
        Ok(())
    }

    /// Structural equivalence, ignoring order unless configured otherwise.
    pub fn be_equivalent_to(
        &self,
        expected: impl Into<Value>,
        configure: impl FnOnce(EquivalencyOptionsBuilder) -> EquivalencyOptionsBuilder,
    ) -> Outcome {
        let expected = expected.into();
        if expected.is_null() {
            return Err(UsageError::NullExpectation {
                assertion: "be_equivalent_to",
            }
            .into());
        }
        Equivalency::new(self.subject.clone(), expected)
            .identified_as(self.root.clone())
            .because(self.because.clone())
            .configure(configure)
            .assert()
    }

    pub fn not_be_equivalent_to(
        &self,
        unexpected: impl Into<Value>,
        configure: impl FnOnce(EquivalencyOptionsBuilder) -> EquivalencyOptionsBuilder,
    ) -> Outcome {
        let unexpected = unexpected.into();
        let items = expectation_items("not_be_equivalent_to", unexpected.clone())?;
        let shown = escape(&describe_list(&items));
        if self.subject.same_reference(&unexpected) {
            return self.fail(format!(
                "Expected {{context}} not to be equivalent to {shown}{{reason}}, but {SAME_OBJECT}."
            ));
        }
        let report = Equivalency::new(self.subject.clone(), unexpected)
            .configure(configure)
            .run()?;
        if report.is_empty() {
            return self.fail(format!(
                "Expected {{context}} not to be equivalent to {shown}{{reason}}, but they are."
            ));
        }
        Ok(())
    }

    /// `expected` must appear as a subsequence, with gaps allowed.
    pub fn contain_in_order(&self, expected: impl Into<Value>) -> Outcome {
        let expected = expectation_items("contain_in_order", expected.into())?;
        let shown = escape(&describe_list(&expected));
        let Some(items) = self.subject_items("contain_in_order")? else {
            return self.fail(format!(
                "Expected {{context}} to contain {shown} in order{{reason}}, but found {NULL}."
            ));
        };
        let mut cursor = 0;
        for (index, wanted) in expected.iter().enumerate() {
            match items[cursor..].iter().position(|item| deep_equal(item, wanted)) {
                Some(offset) => cursor += offset + 1,
                None => {
                    return self.fail(format!(
                        "Expected {{context}} {} to contain items {shown} in order{{reason}}, but {} (index {index}) did not appear (in the right order).",
                        escape(&describe_list(&items)),
                        escape(&describe(wanted))
                    ))
                }
            }
        }
        Ok(())
    }

    pub fn be_subset_of(&self, superset: impl Into<Value>) -> Outcome {
        let superset = expectation_items("be_subset_of", superset.into())?;
        let shown = escape(&describe_list(&superset));
        let Some(items) = self.subject_items("be_subset_of")? else {
            return self.fail(format!(
                "Expected {{context}} to be a subset of {shown}{{reason}}, but found {NULL}."
            ));
        };
        let excess = distinct(items.iter().filter(|item| !contains(&superset, item)));
        if excess.is_empty() {
            return Ok(());
        }
        self.fail(format!(
            "Expected {{context}} to be a subset of {shown}{{reason}}, but items {} are not part of the superset.",
            escape(&describe_list(&excess))
        ))
    }

    pub fn not_be_subset_of(&self, superset: impl Into<Value>) -> Outcome {
        let superset_value = superset.into();
        let superset = expectation_items("not_be_subset_of", superset_value.clone())?;
        let shown = escape(&describe_list(&superset));
        if self.subject.same_reference(&superset_value) {
            return self.fail(format!(
                "Expected {{context}} not to be a subset of {shown}{{reason}}, but {SAME_OBJECT}."
            ));
        }
        let Some(items) = self.subject_items("not_be_subset_of")? else {
            return self.fail(format!(
                "Expected {{context}} not to be a subset of {shown}{{reason}}, but found {NULL}."
            ));
        };
        if items.iter().all(|item| contains(&superset, item)) {
            return self.fail(format!(
                "Expected {{context}} {} not to be a subset of {shown}{{reason}}, but it is.",
                escape(&describe_list(&items))
            ));
        }
        Ok(())
    }

    /// Every expected item is present, in any order.
    pub fn contain(&self, expected: impl Into<Value>) -> Outcome {
        let expected = expectation_items("contain", expected.into())?;
        if expected.is_empty() {
            return Err(UsageError::EmptyExpectation {
                assertion: "contain",
            }
            .into());
        }
        let shown = escape(&describe_list(&expected));
        let Some(items) = self.subject_items("contain")? else {
            return self.fail(format!(
                "Expected {{context}} to contain {shown}{{reason}}, but found {NULL}."
            ));
        };
        let missing = distinct(expected.iter().filter(|wanted| !contains(&items, wanted)));
        if missing.is_empty() {
            return Ok(());
        }
        self.fail(format!(
            "Expected {{context}} {} to contain {shown}{{reason}}, but could not find {}.",
            escape(&describe_list(&items)),
            escape(&describe_list(&missing))
        ))
    }

    pub fn not_contain(&self, unexpected: impl Into<Value>) -> Outcome {
        let unexpected = expectation_items("not_contain", unexpected.into())?;
        if unexpected.is_empty() {
            return Err(UsageError::EmptyExpectation {
                assertion: "not_contain",
            }
            .into());
        }
        let shown = escape(&describe_list(&unexpected));
        let Some(items) = self.subject_items("not_contain")? else {
            return self.fail(format!(
                "Expected {{context}} to not contain {shown}{{reason}}, but found {NULL}."
            ));
        };
        let found = distinct(unexpected.iter().filter(|item| contains(&items, item)));
        if found.is_empty() {
            return Ok(());
        }
        self.fail(format!(
            "Expected {{context}} {} to not contain {shown}{{reason}}, but found {}.",
            escape(&describe_list(&items)),
            escape(&describe_list(&found))
        ))
    }

    pub fn intersect_with(&self, other: impl Into<Value>) -> Outcome {
        let other = expectation_items("intersect_with", other.into())?;
        let shown = escape(&describe_list(&other));
        let Some(items) = self.subject_items("intersect_with")? else {
            return self.fail(format!(
                "Expected {{context}} to intersect with {shown}{{reason}}, but found {NULL}."
            ));
        };
        if items.iter().any(|item| contains(&other, item)) {
            return Ok(());
        }
        self.fail(format!(
            "Expected {{context}} to intersect with {shown}{{reason}}, but {} does not contain any shared items.",
            escape(&describe_list(&items))
        ))
    }

    pub fn not_intersect_with(&self, other: impl Into<Value>) -> Outcome {
        let other_value = other.into();
        let other = expectation_items("not_intersect_with", other_value.clone())?;
        let shown = escape(&describe_list(&other));
        if self.subject.same_reference(&other_value) {
            return self.fail(format!(
                "Did not expect {{context}} to intersect with {shown}{{reason}}, but {SAME_OBJECT}."
            ));
        }
        let Some(items) = self.subject_items("not_intersect_with")? else {
            return self.fail(format!(
                "Did not expect {{context}} to intersect with {shown}{{reason}}, but found {NULL}."
            ));
        };
        let shared = distinct(items.iter().filter(|item| contains(&other, item)));
        if shared.is_empty() {
            return Ok(());
        }
        self.fail(format!(
            "Did not expect {{context}} to intersect with {shown}{{reason}}, but found the following shared items {}.",
            escape(&describe_list(&shared))
        ))
    }

    pub fn start_with(&self, expected: impl Into<Value>) -> Outcome {
        self.check_edge("start_with", "start with", expected.into(), false)
    }

    pub fn end_with(&self, expected: impl Into<Value>) -> Outcome {
        self.check_edge("end_with", "end with", expected.into(), true)
    }

    pub fn have_element_at(&self, index: usize, expected: impl Into<Value>) -> Outcome {
        let expected = expected.into();
        let shown = escape(&describe(&expected));
        let Some(items) = self.subject_items("have_element_at")? else {
            return self.fail(format!(
                "Expected {{context}} to have {shown} at index {index}{{reason}}, but found {NULL}."
            ));
        };
        match items.get(index) {
            None => self.fail(format!(
                "Expected {{context}} to have {shown} at index {index}{{reason}}, but it contains only {} item(s).",
                items.len()
            )),
            Some(actual) if deep_equal(actual, &expected) => Ok(()),
            Some(actual) => self.fail(format!(
                "Expected {{context}} to have {shown} at index {index}{{reason}}, but found {}.",
                escape(&describe(actual))
            )),
        }
    }

    /// Natural ordering of scalars; other items need
    /// [`CollectionAssertions::be_in_ascending_order_by`].
    pub fn be_in_ascending_order(&self) -> Outcome {
        self.check_order(false, natural_order)
    }

    pub fn be_in_descending_order(&self) -> Outcome {
        self.check_order(true, natural_order)
    }

    pub fn be_in_ascending_order_by(&self, comparer: impl Fn(&Value, &Value) -> Ordering) -> Outcome {
        self.check_order(false, |a, b| Ok(comparer(a, b)))
    }

    pub fn be_in_descending_order_by(&self, comparer: impl Fn(&Value, &Value) -> Ordering) -> Outcome {
        self.check_order(true, |a, b| Ok(comparer(a, b)))
    }

    fn check_edge(
        &self,
        assertion: &'static str,
        verb: &str,
        expected: Value,
        from_end: bool,
    ) -> Outcome {
        let expected = expectation_items(assertion, expected)?;
        let shown = escape(&describe_list(&expected));
        let Some(items) = self.subject_items(assertion)? else {
            return self.fail(format!(
                "Expected {{context}} to {verb} {shown}{{reason}}, but found {NULL}."
            ));
        };
        let actual = escape(&describe_list(&items));
        if items.len() < expected.len() {
            return self.fail(format!(
                "Expected {{context}} to {verb} {shown}{{reason}}, but {actual} contains {} item(s) less.",
                expected.len() - items.len()
            ));
        }
        let offset = if from_end { items.len() - expected.len() } else { 0 };
        let window = &items[offset..offset + expected.len()];
        match first_difference(window, &expected, &deep_equal) {
            None => Ok(()),
            Some(index) => self.fail(format!(
                "Expected {{context}} to {verb} {shown}{{reason}}, but {actual} differs at index {}.",
                offset + index
            )),
        }
    }

    fn check_order(
        &self,
        descending: bool,
        compare: impl Fn(&Value, &Value) -> Result<Ordering, UsageError>,
    ) -> Outcome {
        let direction = if descending { "descending" } else { "ascending" };
        let assertion = if descending {
            "be_in_descending_order"
        } else {
            "be_in_ascending_order"
        };
        let Some(items) = self.subject_items(assertion)? else {
            return self.fail(format!(
                "Expected {{context}} to be in {direction} order{{reason}}, but found {NULL}."
            ));
        };
        for (index, pair) in items.windows(2).enumerate() {
            let ordering = compare(&pair[0], &pair[1])?;
            let wrong = if descending {
                ordering == Ordering::Less
            } else {
                ordering == Ordering::Greater
            };
            if wrong {
                return self.fail(format!(
                    "Expected {{context}} to be in {direction} order{{reason}}, but found {} where item at index {} is in wrong order.",
                    escape(&describe_list(&items)),
                    index + 1
                ));
            }
        }
        Ok(())
    }

    /// Items of the subject, `None` when it is `<null>`.
    fn subject_items(&self, assertion: &'static str) -> Result<Option<Vec<Value>>, UsageError> {
        match &self.subject {
            Value::Null => Ok(None),
            Value::Seq(seq) => Ok(Some(seq.items())),
            other => Err(not_a_collection(assertion, other)),
        }
    }

    fn fail(&self, template: String) -> Outcome {
        let mismatch = Mismatch::new(MismatchKind::Assertion, Path::root(), template);
        let message = mismatch.render(&self.root, &because_clause(&self.because));
        Err(AssertionFailure::new(message, vec![mismatch]).into())
    }
}

fn expectation_items(assertion: &'static str, value: Value) -> Result<Vec<Value>, UsageError> {
    match value {
        Value::Null => Err(UsageError::NullExpectation { assertion }),
        Value::Seq(seq) => Ok(seq.items()),
        other => Err(not_a_collection(assertion, &other)),
    }
}

fn not_a_collection(assertion: &'static str, value: &Value) -> UsageError {
    UsageError::NotACollection {
        assertion,
        found: describe(value),
    }
}

fn natural_order(a: &Value, b: &Value) -> Result<Ordering, UsageError> {
    a.compare_scalar(b).ok_or_else(|| UsageError::NotComparable {
        left: describe(a),
        right: describe(b),
    })
}

fn first_difference(
    items: &[Value],
    expected: &[Value],
    comparer: &impl Fn(&Value, &Value) -> bool,
) -> Option<usize> {
    items
        .iter()
        .zip(expected)
        .position(|(actual, wanted)| !comparer(actual, wanted))
}

fn contains(items: &[Value], wanted: &Value) -> bool {
    items.iter().any(|item| deep_equal(item, wanted))
}

fn distinct<'a>(items: impl Iterator<Item = &'a Value>) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    for item in items {
        if !contains(&out, item) {
            out.push(item.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types;
    use crate::value::Seq;

    fn message(outcome: Outcome) -> String {
        outcome.unwrap_err().to_string()
    }

    #[test]
    fn null_and_empty_are_distinct() {
        let null = CollectionAssertions::new(Value::Null);
        assert_eq!(
            message(null.be_empty()),
            "Expected collection to be empty, but found <null>."
        );
        let empty = CollectionAssertions::new(Seq::of(Vec::<Value>::new()));
        assert!(empty.be_empty().is_ok());
        assert_eq!(
            message(empty.not_be_empty()),
            "Expected collection not to be empty."
        );
        assert!(null.be_null().is_ok());
        assert_eq!(
            message(empty.be_null()),
            "Expected collection to be <null>, but found {empty}."
        );
    }

    #[test]
    fn have_count_uses_native_count() {
        let seq = Seq::deferred_with_count(types::int(), || vec![1.into(), 2.into()], || 2);
        let assertions = CollectionAssertions::new(seq.clone());
        assert!(assertions.have_count(2).is_ok());
        assert_eq!(seq.enumerations(), 0);
        assert_eq!(
            message(assertions.have_count(3)),
            "Expected collection to contain 3 item(s), but found 2: {1, 2}."
        );
        assert_eq!(seq.enumerations(), 1);
    }

    #[test]
    fn equal_reports_first_differing_index() {
        let numbers = CollectionAssertions::new(Seq::of([1, 2, 3])).identified_as("numbers");
        assert!(numbers.equal(Seq::of([1, 2, 3])).is_ok());
        assert_eq!(
            message(numbers.equal(Seq::of([3, 1, 2]))),
            "Expected numbers to be equal to {3, 1, 2}, but 1 differs at index 0."
        );
        assert_eq!(
            message(numbers.equal(Seq::of([1, 2]))),
            "Expected numbers to be equal to {1, 2}, but {1, 2, 3} contains 1 item(s) too many."
        );
    }

    #[test]
    fn not_assertions_report_same_reference() {
        let seq = Seq::of([1, 2]);
        let assertions = CollectionAssertions::new(seq.clone());
        assert_eq!(
            message(assertions.not_equal(seq.clone())),
            "Expected collection not to be equal to {1, 2}, but they both reference the same object."
        );
        assert_eq!(
            message(assertions.not_be_subset_of(seq)),
            "Expected collection not to be a subset of {1, 2}, but they both reference the same object."
        );
    }

    #[test]
    fn null_expectation_is_a_usage_error() {
        let assertions = CollectionAssertions::new(Seq::of([1]));
        let err = assertions.contain(Value::Null).unwrap_err();
        assert!(matches!(
            err,
            EquivalencyError::Usage(UsageError::NullExpectation { assertion: "contain" })
        ));
        let err = assertions.be_subset_of(5).unwrap_err();
        assert!(matches!(
            err,
            EquivalencyError::Usage(UsageError::NotACollection { .. })
        ));
    }

    #[test]
    fn reason_is_rendered() {
        let assertions = CollectionAssertions::new(Seq::of([2, 1])).because("we sort");
        assert_eq!(
            message(assertions.be_in_ascending_order()),
            "Expected collection to be in ascending order because we sort, but found {2, 1} where item at index 1 is in wrong order."
        );
    }
}
