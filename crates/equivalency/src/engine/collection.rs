//! Collection Matcher.
//!
//! Strict ordering pairs elements by index. Otherwise each expected element
//! is matched with the first not-yet-matched subject element that is
//! equivalent to it, in iteration order. First-fit, not an optimal
//! assignment.

use crate::format::{describe, describe_list};
use crate::node::ComparisonNode;
use crate::options::OrderingMode;
use crate::reporter::{Mismatch, MismatchKind};
use crate::types::TypeRef;
use crate::value::Value;

use super::Engine;

impl Engine<'_> {
    pub(super) fn compare_collections(&mut self, node: &ComparisonNode, element: &TypeRef) {
        let Value::Seq(expected) = &node.expectation else {
            self.compare_scalars(node);
            return;
        };
        let expected_items = expected.items();
        let Value::Seq(subject) = &node.subject else {
            let template = format!(
                "Expected {{context}} to be a collection with {} item(s){{reason}}, but found {{actual}}.",
                expected_items.len()
            );
            self.record(
                Mismatch::new(MismatchKind::Shape, node.path.clone(), template)
                    .expected(describe_list(&expected_items))
                    .actual(describe(&node.subject)),
            );
            return;
        };
        let subject_items = subject.items();

        match self.options.ordering_for(&node.context()) {
            OrderingMode::Strict => {
                self.compare_in_order(node, element, &subject_items, &expected_items)
            }
            OrderingMode::Ignore => {
                self.compare_in_any_order(node, element, &subject_items, &expected_items)
            }
        }
    }

    fn compare_in_order(
        &mut self,
        node: &ComparisonNode,
        element: &TypeRef,
        subject_items: &[Value],
        expected_items: &[Value],
    ) {
        if subject_items.len() != expected_items.len() {
            self.record(count_mismatch(node, subject_items, expected_items));
        }
        for (index, (actual, expected)) in subject_items.iter().zip(expected_items).enumerate() {
            let child = node.child(
                actual.clone(),
                expected.clone(),
                node.path.index(index),
                Some(element.clone()),
            );
            self.compare(&child);
        }
    }

    fn compare_in_any_order(
        &mut self,
        node: &ComparisonNode,
        element: &TypeRef,
        subject_items: &[Value],
        expected_items: &[Value],
    ) {
        let mut matched = vec![false; subject_items.len()];
        let mut missing = Vec::new();

        for expected in expected_items {
            let mut found = false;
            for (index, actual) in subject_items.iter().enumerate() {
                if matched[index] {
                    continue;
                }
                let child = node.child(
                    actual.clone(),
                    expected.clone(),
                    node.path.index(index),
                    Some(element.clone()),
                );
                if let Some(tracker) = self.try_match(&child) {
                    self.tracker = tracker;
                    matched[index] = true;
                    found = true;
                    break;
                }
            }
            if !found {
                missing.push(expected.clone());
            }
        }

        let additional: Vec<Value> = subject_items
            .iter()
            .zip(&matched)
            .filter(|(_, &was_matched)| !was_matched)
            .map(|(item, _)| item.clone())
            .collect();

        if !missing.is_empty() {
            let template = format!(
                "Expected {{context}} to be a collection equivalent to {{expected}}{{reason}}, but it misses {} item(s): {{actual}}.",
                missing.len()
            );
            self.record(
                Mismatch::new(MismatchKind::MissingItems, node.path.clone(), template)
                    .expected(describe_list(expected_items))
                    .actual(describe_list(&missing)),
            );
        }
        if !additional.is_empty() {
            let template = format!(
                "Expected {{context}} to be a collection equivalent to {{expected}}{{reason}}, but it has {} additional item(s): {{actual}}.",
                additional.len()
            );
            self.record(
                Mismatch::new(MismatchKind::AdditionalItems, node.path.clone(), template)
                    .expected(describe_list(expected_items))
                    .actual(describe_list(&additional)),
            );
        }
    }
}

fn count_mismatch(node: &ComparisonNode, subject_items: &[Value], expected_items: &[Value]) -> Mismatch {
    let template = if subject_items.len() > expected_items.len() {
        format!(
            "Expected {{context}} to be a collection with {} item(s){{reason}}, but {{actual}} contains {} item(s) too many.",
            expected_items.len(),
            subject_items.len() - expected_items.len()
        )
    } else {
        format!(
            "Expected {{context}} to be a collection with {} item(s){{reason}}, but {{actual}} contains {} item(s) less than {{expected}}.",
            expected_items.len(),
            expected_items.len() - subject_items.len()
        )
    };
    Mismatch::new(MismatchKind::Count, node.path.clone(), template)
        .expected(describe_list(expected_items))
        .actual(describe_list(subject_items))
}
