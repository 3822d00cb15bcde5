//! Property-based tests for equivalency.
//!
//! Reflexivity over generated JSON graphs, independence from dictionary
//! insertion order, and the difference between ordered and unordered
//! sequence comparison.

use equivalency::{assert_equivalent, deep_equal, types, Dict, Seq, Value};
use proptest::prelude::*;
use serde_json::json;

fn json_leaf() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        any::<i64>().prop_map(serde_json::Value::from),
        "[a-z]{0,6}".prop_map(serde_json::Value::from),
    ]
}

fn json_graph() -> impl Strategy<Value = serde_json::Value> {
    json_leaf().prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..6)
                .prop_map(|map| json!(map)),
        ]
    })
}

fn is_equivalent(subject: impl Into<Value>, expectation: impl Into<Value>) -> bool {
    assert_equivalent(subject, expectation, |o| o, "")
        .map(|list| list.is_empty())
        .unwrap_or(false)
}

fn is_strictly_equivalent(subject: impl Into<Value>, expectation: impl Into<Value>) -> bool {
    assert_equivalent(subject, expectation, |o| o.with_strict_ordering(), "")
        .map(|list| list.is_empty())
        .unwrap_or(false)
}

// =============================================================================
// Reflexivity
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// A graph is equivalent to an independently built copy of itself.
    #[test]
    fn generated_graphs_are_reflexive(graph in json_graph()) {
        prop_assert!(is_equivalent(graph.clone(), graph.clone()));
        prop_assert!(is_strictly_equivalent(graph.clone(), graph));
    }

    /// A graph is equivalent to the very same instance.
    #[test]
    fn shared_instance_is_reflexive(graph in json_graph()) {
        let value = Value::from(graph);
        prop_assert!(is_equivalent(value.clone(), value));
    }
}

// =============================================================================
// Dictionaries
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Insertion order of dictionary entries never matters.
    #[test]
    fn dictionary_order_is_irrelevant(
        entries in prop::collection::btree_map("[a-z]{1,5}", any::<i64>(), 0..12)
    ) {
        let forward = entries
            .iter()
            .fold(Dict::new(types::string(), types::int()), |d, (k, v)| d.with(k.as_str(), *v));
        let backward = entries
            .iter()
            .rev()
            .fold(Dict::new(types::string(), types::int()), |d, (k, v)| d.with(k.as_str(), *v));
        prop_assert!(is_equivalent(forward.clone(), backward.clone()));
        prop_assert!(deep_equal(&forward.into(), &backward.into()));
    }

    /// Removing one key is always reported as a key difference.
    #[test]
    fn dropped_key_is_detected(
        entries in prop::collection::btree_map("[a-z]{1,5}", any::<i64>(), 1..12)
    ) {
        let full = entries
            .iter()
            .fold(Dict::new(types::string(), types::int()), |d, (k, v)| d.with(k.as_str(), *v));
        let partial = entries
            .iter()
            .skip(1)
            .fold(Dict::new(types::string(), types::int()), |d, (k, v)| d.with(k.as_str(), *v));
        prop_assert!(!is_equivalent(partial.clone(), full.clone()));
        prop_assert!(!is_equivalent(full, partial));
    }
}

// =============================================================================
// Sequences
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Reversal keeps a sequence equivalent, but not strictly so unless it
    /// is a palindrome.
    #[test]
    fn reversed_sequences(items in prop::collection::vec(0i64..8, 0..10)) {
        let reversed: Vec<i64> = items.iter().rev().copied().collect();
        prop_assert!(is_equivalent(Seq::of(items.clone()), Seq::of(reversed.clone())));
        prop_assert_eq!(
            is_strictly_equivalent(Seq::of(items.clone()), Seq::of(reversed.clone())),
            items == reversed
        );
    }

    /// Unordered equivalence is multiset equality.
    #[test]
    fn unordered_equivalence_is_multiset_equality(
        a in prop::collection::vec(0i64..4, 0..8),
        b in prop::collection::vec(0i64..4, 0..8),
    ) {
        let mut sorted_a = a.clone();
        let mut sorted_b = b.clone();
        sorted_a.sort_unstable();
        sorted_b.sort_unstable();
        prop_assert_eq!(is_equivalent(Seq::of(a), Seq::of(b)), sorted_a == sorted_b);
    }
}
