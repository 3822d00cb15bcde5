//! ComplexObject Matcher.
//!
//! Members come from the expectation's relevant type, so extra members on
//! the subject are never compared. Deselected members never produce a
//! mismatch, even when that leaves nothing to compare.

use tracing::trace;

use crate::format::describe;
use crate::node::ComparisonNode;
use crate::options::MemberContext;
use crate::reporter::{Mismatch, MismatchKind};
use crate::types::TypeRef;
use crate::value::Value;

use super::{Engine, VALUE_DIFFERS};

const MISSING_MEMBER: &str =
    "Expectation has member {context} that the other object does not have{reason}.";

impl Engine<'_> {
    pub(super) fn compare_objects(&mut self, node: &ComparisonNode, ty: &TypeRef) {
        let Value::Object(expected) = &node.expectation else {
            self.compare_scalars(node);
            return;
        };
        let Value::Object(subject) = &node.subject else {
            self.record(
                Mismatch::new(MismatchKind::Shape, node.path.clone(), VALUE_DIFFERS)
                    .expected(describe(&node.expectation))
                    .actual(describe(&node.subject)),
            );
            return;
        };

        let options = self.options;
        let selected: Vec<_> = ty
            .members()
            .into_iter()
            .filter_map(|member| {
                let path = node.path.member(&member.name);
                let expectation = expected.get(&member.name).unwrap_or(Value::Null);
                let selected = options.is_selected(&MemberContext {
                    path: &path,
                    declared_type: Some(&member.ty),
                    runtime_type: expectation.runtime_type(),
                });
                selected.then_some((member, path, expectation))
            })
            .collect();

        if selected.is_empty() {
            trace!(path = %node.path, ty = ty.name(), "every member deselected");
            return;
        }

        for (member, path, expectation) in selected {
            match subject.get(&member.name) {
                Some(actual) => {
                    let child = node.child(actual, expectation, path, Some(member.ty));
                    self.compare(&child);
                }
                None if options.ignores_missing_members() => {}
                None => self.record(
                    Mismatch::new(MismatchKind::MissingMember, path, MISSING_MEMBER)
                        .expected(describe(&expectation)),
                ),
            }
        }
    }
}
