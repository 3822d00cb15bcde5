//! Cycle guard keyed by reference identity.

use std::collections::HashSet;

use crate::value::Value;

/// Records every `(subject, expectation)` reference pair entered during one
/// traversal. Entries are never removed, so shared substructure is validated
/// once and cyclic graphs terminate.
#[derive(Debug, Clone, Default)]
pub struct GraphTracker {
    visited: HashSet<(usize, usize)>,
}

impl GraphTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when this exact pair was already entered; the caller
    /// must not recurse into it again. Pairs involving a value-typed side are
    /// never tracked and always enter.
    pub fn enter(&mut self, subject: &Value, expectation: &Value) -> bool {
        match (subject.reference_id(), expectation.reference_id()) {
            (Some(s), Some(e)) => self.visited.insert((s, e)),
            _ => true,
        }
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Object, Seq};

    #[test]
    fn reference_pairs_enter_once() {
        let a = Value::from(Seq::of([1]));
        let b = Value::from(Seq::of([1]));
        let mut tracker = GraphTracker::new();
        assert!(tracker.enter(&a, &b));
        assert!(!tracker.enter(&a, &b));
        assert!(tracker.enter(&b, &a));
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn value_types_are_not_tracked() {
        let mut tracker = GraphTracker::new();
        assert!(tracker.enter(&1.into(), &1.into()));
        assert!(tracker.enter(&1.into(), &1.into()));
        let o = Value::from(Object::anonymous([("A", 1)]));
        assert!(tracker.enter(&o, &Value::Null));
        assert!(tracker.enter(&o, &Value::Null));
        assert!(tracker.is_empty());
    }

    #[test]
    fn clones_fork_independently() {
        let a = Value::from(Seq::of([1]));
        let mut tracker = GraphTracker::new();
        let mut fork = tracker.clone();
        assert!(fork.enter(&a, &a));
        assert!(tracker.enter(&a, &a));
        assert!(!fork.enter(&a, &a));
    }
}
