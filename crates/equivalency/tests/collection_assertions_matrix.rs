//! Direct collection assertions: counts, ordering, containment and set
//! relations, with `<null>` and `{empty}` kept apart.

use std::cmp::Ordering;

use equivalency::{types, CollectionAssertions, EquivalencyError, Seq, UsageError, Value};

fn numbers(items: &[i64]) -> Seq {
    Seq::of(items.iter().copied())
}

fn check(items: &[i64]) -> CollectionAssertions {
    CollectionAssertions::new(numbers(items))
}

fn message(outcome: Result<(), EquivalencyError>) -> String {
    outcome.unwrap_err().to_string()
}

// ---------------------------------------------------------------------------
// Count and emptiness
// ---------------------------------------------------------------------------

#[test]
fn have_count_enumerates_without_native_count_only_once() {
    let seq = Seq::deferred(types::int(), || vec![1.into(), 2.into(), 3.into()]);
    assert!(CollectionAssertions::new(seq.clone()).have_count(3).is_ok());
    assert_eq!(seq.enumerations(), 1);
}

#[test]
fn failing_checks_enumerate_a_deferred_subject_once() {
    let deferred = || Seq::deferred(types::int(), || vec![1.into(), 2.into()]);

    let seq = deferred();
    assert_eq!(
        message(CollectionAssertions::new(seq.clone()).have_count(3)),
        "Expected collection to contain 3 item(s), but found 2: {1, 2}."
    );
    assert_eq!(seq.enumerations(), 1);

    let seq = deferred();
    assert_eq!(
        message(CollectionAssertions::new(seq.clone()).be_empty()),
        "Expected collection to be empty, but found {1, 2}."
    );
    assert_eq!(seq.enumerations(), 1);

    let seq = deferred();
    assert!(CollectionAssertions::new(seq.clone())
        .contain(numbers(&[3]))
        .is_err());
    assert_eq!(seq.enumerations(), 1);
}

#[test]
fn have_count_on_null() {
    assert_eq!(
        message(CollectionAssertions::new(Value::Null).have_count(1)),
        "Expected collection to contain 1 item(s), but found <null>."
    );
}

#[test]
fn not_be_null_and_not_be_empty() {
    assert!(check(&[1]).not_be_null().is_ok());
    assert!(check(&[1]).not_be_empty().is_ok());
    assert_eq!(
        message(CollectionAssertions::new(Value::Null).not_be_null()),
        "Expected collection not to be <null>."
    );
    assert_eq!(
        message(CollectionAssertions::new(Value::Null).not_be_empty()),
        "Expected collection not to be empty, but found <null>."
    );
    assert_eq!(
        message(check(&[1, 2]).be_empty()),
        "Expected collection to be empty, but found {1, 2}."
    );
}

// ---------------------------------------------------------------------------
// Equality and equivalence
// ---------------------------------------------------------------------------

#[test]
fn equivalent_but_not_equal() {
    let subject = check(&[1, 2, 3]);
    assert!(subject.be_equivalent_to(numbers(&[3, 1, 2]), |o| o).is_ok());
    assert_eq!(
        message(subject.equal(numbers(&[3, 1, 2]))),
        "Expected collection to be equal to {3, 1, 2}, but 1 differs at index 0."
    );
}

#[test]
fn equal_on_shorter_subject() {
    assert_eq!(
        message(check(&[1]).equal(numbers(&[1, 2, 3]))),
        "Expected collection to be equal to {1, 2, 3}, but {1} contains 2 item(s) less."
    );
}

#[test]
fn equal_by_custom_comparer() {
    let parity = |a: &Value, b: &Value| match (a, b) {
        (Value::Int(a), Value::Int(b)) => a % 2 == b % 2,
        _ => false,
    };
    assert!(check(&[1, 2]).equal_by(numbers(&[3, 4]), parity).is_ok());
}

#[test]
fn not_equal_passes_on_difference() {
    assert!(check(&[1, 2]).not_equal(numbers(&[2, 1])).is_ok());
    assert_eq!(
        message(check(&[1, 2]).not_equal(numbers(&[1, 2]))),
        "Expected collection not to be equal to {1, 2}, but they are."
    );
}

#[test]
fn be_equivalent_to_uses_root_label_and_reason() {
    let err = CollectionAssertions::new(numbers(&[1, 2]))
        .identified_as("ids")
        .because("ids are stable")
        .be_equivalent_to(numbers(&[1, 3]), |o| o)
        .unwrap_err();
    let failure = err.failure().unwrap();
    assert_eq!(failure.mismatches().len(), 2);
    assert!(failure
        .message()
        .starts_with("Expected ids to be equivalent because ids are stable, but found 2 differences:"));
}

#[test]
fn not_be_equivalent_to() {
    let seq = numbers(&[1, 2]);
    let subject = CollectionAssertions::new(seq.clone());
    assert!(subject.not_be_equivalent_to(numbers(&[1, 3]), |o| o).is_ok());
    assert_eq!(
        message(subject.not_be_equivalent_to(numbers(&[2, 1]), |o| o)),
        "Expected collection not to be equivalent to {2, 1}, but they are."
    );
    assert_eq!(
        message(subject.not_be_equivalent_to(seq, |o| o)),
        "Expected collection not to be equivalent to {1, 2}, but they both reference the same object."
    );
}

// ---------------------------------------------------------------------------
// Subsequences and edges
// ---------------------------------------------------------------------------

#[test]
fn contain_in_order_allows_gaps() {
    assert!(check(&[1, 2, 3, 4]).contain_in_order(numbers(&[1, 3, 4])).is_ok());
}

#[test]
fn contain_in_order_names_first_unmatched_value() {
    assert_eq!(
        message(check(&[1, 2, 3]).contain_in_order(numbers(&[3, 1]))),
        "Expected collection {1, 2, 3} to contain items {3, 1} in order, but 1 (index 1) did not appear (in the right order)."
    );
}

#[test]
fn start_and_end() {
    let subject = check(&[1, 2, 3]);
    assert!(subject.start_with(numbers(&[1, 2])).is_ok());
    assert!(subject.end_with(numbers(&[2, 3])).is_ok());
    assert_eq!(
        message(subject.start_with(numbers(&[2]))),
        "Expected collection to start with {2}, but {1, 2, 3} differs at index 0."
    );
    assert_eq!(
        message(subject.end_with(numbers(&[1, 3]))),
        "Expected collection to end with {1, 3}, but {1, 2, 3} differs at index 1."
    );
}

#[test]
fn element_at() {
    let subject = check(&[5, 6]);
    assert!(subject.have_element_at(1, 6).is_ok());
    assert_eq!(
        message(subject.have_element_at(0, 6)),
        "Expected collection to have 6 at index 0, but found 5."
    );
    assert_eq!(
        message(subject.have_element_at(4, 6)),
        "Expected collection to have 6 at index 4, but it contains only 2 item(s)."
    );
}

// ---------------------------------------------------------------------------
// Set relations
// ---------------------------------------------------------------------------

#[test]
fn subset_names_every_excess_item() {
    assert!(check(&[1, 2]).be_subset_of(numbers(&[1, 2, 3])).is_ok());
    assert_eq!(
        message(check(&[1, 2, 3, 6]).be_subset_of(numbers(&[1, 2, 4, 5]))),
        "Expected collection to be a subset of {1, 2, 4, 5}, but items {3, 6} are not part of the superset."
    );
}

#[test]
fn empty_is_a_subset_and_null_is_not() {
    assert!(check(&[]).be_subset_of(numbers(&[1])).is_ok());
    assert_eq!(
        message(CollectionAssertions::new(Value::Null).be_subset_of(numbers(&[1]))),
        "Expected collection to be a subset of {1}, but found <null>."
    );
}

#[test]
fn not_subset() {
    assert!(check(&[1, 9]).not_be_subset_of(numbers(&[1, 2])).is_ok());
    assert_eq!(
        message(check(&[1]).not_be_subset_of(numbers(&[1, 2]))),
        "Expected collection {1} not to be a subset of {1, 2}, but it is."
    );
}

#[test]
fn contain_and_not_contain() {
    assert!(check(&[1, 2, 3]).contain(numbers(&[3, 1])).is_ok());
    assert_eq!(
        message(check(&[1, 2]).contain(numbers(&[2, 4, 4]))),
        "Expected collection {1, 2} to contain {2, 4, 4}, but could not find {4}."
    );
    assert!(check(&[1, 2]).not_contain(numbers(&[3])).is_ok());
    assert_eq!(
        message(check(&[1, 2]).not_contain(numbers(&[2, 3]))),
        "Expected collection {1, 2} to not contain {2, 3}, but found {2}."
    );
}

#[test]
fn intersections() {
    assert!(check(&[1, 2]).intersect_with(numbers(&[2, 3])).is_ok());
    assert_eq!(
        message(check(&[1, 2]).intersect_with(numbers(&[3]))),
        "Expected collection to intersect with {3}, but {1, 2} does not contain any shared items."
    );
    assert!(check(&[1, 2]).not_intersect_with(numbers(&[3])).is_ok());
    assert_eq!(
        message(check(&[1, 2]).not_intersect_with(numbers(&[2, 1]))),
        "Did not expect collection to intersect with {2, 1}, but found the following shared items {1, 2}."
    );
    let seq = numbers(&[1]);
    assert_eq!(
        message(CollectionAssertions::new(seq.clone()).not_intersect_with(seq)),
        "Did not expect collection to intersect with {1}, but they both reference the same object."
    );
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[test]
fn natural_ordering() {
    assert!(check(&[1, 2, 2, 5]).be_in_ascending_order().is_ok());
    assert!(check(&[5, 2, 2, 1]).be_in_descending_order().is_ok());
    assert_eq!(
        message(check(&[3, 2, 1]).be_in_ascending_order()),
        "Expected collection to be in ascending order, but found {3, 2, 1} where item at index 1 is in wrong order."
    );
}

#[test]
fn ordering_by_comparer() {
    let by_abs = |a: &Value, b: &Value| match (a, b) {
        (Value::Int(a), Value::Int(b)) => a.abs().cmp(&b.abs()),
        _ => Ordering::Equal,
    };
    assert!(check(&[1, -2, 3]).be_in_ascending_order_by(by_abs).is_ok());
    assert!(check(&[-3, 2, -1]).be_in_descending_order_by(by_abs).is_ok());
}

#[test]
fn unorderable_items_are_a_usage_error() {
    let subject = CollectionAssertions::new(Seq::of([Value::from(1), Value::from("a")]));
    assert!(matches!(
        subject.be_in_ascending_order().unwrap_err(),
        EquivalencyError::Usage(UsageError::NotComparable { .. })
    ));
}

// ---------------------------------------------------------------------------
// Usage errors
// ---------------------------------------------------------------------------

#[test]
fn null_expectations_are_rejected_before_checking() {
    for outcome in [
        check(&[1]).equal(Value::Null),
        check(&[1]).be_subset_of(Value::Null),
        check(&[1]).intersect_with(Value::Null),
        CollectionAssertions::new(Value::Null).contain_in_order(Value::Null),
    ] {
        assert!(matches!(
            outcome.unwrap_err(),
            EquivalencyError::Usage(UsageError::NullExpectation { .. })
        ));
    }
}

#[test]
fn empty_containment_expectation_is_rejected() {
    assert!(matches!(
        check(&[1]).contain(numbers(&[])).unwrap_err(),
        EquivalencyError::Usage(UsageError::EmptyExpectation { assertion: "contain" })
    ));
}

#[test]
fn non_collection_subject_is_rejected() {
    assert!(matches!(
        CollectionAssertions::new(5).be_empty().unwrap_err(),
        EquivalencyError::Usage(UsageError::NotACollection { .. })
    ));
    assert!(matches!(
        CollectionAssertions::new("abc").have_count(3).unwrap_err(),
        EquivalencyError::Usage(UsageError::NotACollection {
            assertion: "have_count",
            ..
        })
    ));
}
