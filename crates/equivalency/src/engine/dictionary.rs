//! Dictionary Matcher.
//!
//! Key types are reconciled first. Only then are the key sets diffed, in
//! both directions at once, and common keys compared by value.

use crate::classify::{dictionary_shape, DictionaryShape};
use crate::format::{describe, describe_key, describe_list};
use crate::node::ComparisonNode;
use crate::reporter::{escape, Mismatch, MismatchKind};
use crate::types::{self, Type, TypeRef};
use crate::value::{Dict, Value};

use super::{ambiguous_shape, Engine};

const INCOMPATIBLE_KEYS: &str = "Expected {context} to be a dictionary with keys of type {expected}{reason}, but found keys of type {actual}.";

/// Result of reconciling the key types of two dictionaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCompatibility {
    Compatible,
    Incompatible(KeyIncompatibility),
}

/// Names both key kinds of an incompatible pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyIncompatibility {
    pub subject_key: String,
    pub expectation_key: String,
}

/// Keys are compatible when either side is untyped or one key type can
/// stand in for the other.
pub fn check_key_compatibility(subject_key: &Type, expectation_key: &Type) -> KeyCompatibility {
    if subject_key.is_any()
        || expectation_key.is_any()
        || subject_key.is_assignable_to(expectation_key)
        || expectation_key.is_assignable_to(subject_key)
    {
        KeyCompatibility::Compatible
    } else {
        KeyCompatibility::Incompatible(KeyIncompatibility {
            subject_key: subject_key.name().to_string(),
            expectation_key: expectation_key.name().to_string(),
        })
    }
}

impl Engine<'_> {
    pub(super) fn compare_dictionaries(
        &mut self,
        node: &ComparisonNode,
        key: &TypeRef,
        value: &TypeRef,
    ) {
        let Value::Dict(expected) = &node.expectation else {
            self.compare_scalars(node);
            return;
        };
        let Value::Dict(subject) = &node.subject else {
            let template = format!(
                "Expected {{context}} to be a dictionary with {} item(s){{reason}}, but found {{actual}}.",
                expected.len()
            );
            self.record(
                Mismatch::new(MismatchKind::Shape, node.path.clone(), template)
                    .expected(describe(&node.expectation))
                    .actual(describe(&node.subject)),
            );
            return;
        };

        let subject_key = match self.subject_key_type(node, subject) {
            Ok(key) => key,
            Err(key_types) => {
                self.record(ambiguous_shape(node, subject.ty(), &key_types));
                return;
            }
        };
        let expectation_key = self.effective_key_type(key, expected);
        let subject_key = self.effective_key_type(&subject_key, subject);

        if let KeyCompatibility::Incompatible(mismatch) =
            check_key_compatibility(&subject_key, &expectation_key)
        {
            self.record(
                Mismatch::new(MismatchKind::IncompatibleKeys, node.path.clone(), INCOMPATIBLE_KEYS)
                    .expected(mismatch.expectation_key)
                    .actual(mismatch.subject_key),
            );
            return;
        }

        let expected_entries = expected.entries();
        let subject_keys = subject.keys();
        let missing: Vec<Value> = expected_entries
            .iter()
            .filter(|(k, _)| !subject.contains_key(k))
            .map(|(k, _)| k.clone())
            .collect();
        let additional: Vec<Value> = subject_keys
            .into_iter()
            .filter(|k| !expected.contains_key(k))
            .collect();
        if !missing.is_empty() || !additional.is_empty() {
            self.record(keys_mismatch(node, expected_entries.len(), &missing, &additional));
        }

        for (k, expectation) in expected_entries {
            let Some(actual) = subject.get(&k) else {
                continue;
            };
            let child = node.child(
                actual,
                expectation,
                node.path.key(describe_key(&k)),
                Some(value.clone()),
            );
            self.compare(&child);
        }
    }

    /// The subject's key type, or the conflicting key types if it has
    /// several. Declared typing prefers the declared key type.
    fn subject_key_type(&self, node: &ComparisonNode, subject: &Dict) -> Result<TypeRef, Vec<TypeRef>> {
        if !self.options.uses_runtime_typing() {
            if let Some(declared) = &node.declared_type {
                if subject.ty().is_assignable_to(declared) {
                    if let DictionaryShape::Keyed { key, .. } = dictionary_shape(declared) {
                        return Ok(key);
                    }
                }
            }
        }
        match dictionary_shape(subject.ty()) {
            DictionaryShape::Keyed { key, .. } => Ok(key),
            DictionaryShape::Ambiguous(key_types) => Err(key_types),
            DictionaryShape::NotKeyed => Ok(types::any()),
        }
    }

    /// Under runtime typing an untyped key is narrowed to the type shared
    /// by every actual key.
    fn effective_key_type(&self, key: &TypeRef, dict: &Dict) -> TypeRef {
        if !self.options.uses_runtime_typing() || !key.is_any() {
            return key.clone();
        }
        let mut runtime: Option<TypeRef> = None;
        for k in dict.keys() {
            let ty = k.runtime_type();
            match &runtime {
                None => runtime = Some(ty),
                Some(seen) if seen.same_as(&ty) => {}
                Some(_) => return key.clone(),
            }
        }
        runtime.unwrap_or_else(|| key.clone())
    }
}

fn keys_mismatch(
    node: &ComparisonNode,
    expected_len: usize,
    missing: &[Value],
    additional: &[Value],
) -> Mismatch {
    let mut template = format!(
        "Expected {{context}} to be a dictionary with {expected_len} item(s){{reason}}, but it"
    );
    if !missing.is_empty() {
        template.push_str(&format!(
            " misses {} key(s): {}",
            missing.len(),
            escape(&describe_list(missing))
        ));
    }
    if !additional.is_empty() {
        if !missing.is_empty() {
            template.push_str(" and");
        }
        template.push_str(&format!(
            " has {} additional key(s): {}",
            additional.len(),
            escape(&describe_list(additional))
        ));
    }
    template.push('.');
    Mismatch::new(MismatchKind::Keys, node.path.clone(), template)
        .expected(describe(&node.expectation))
        .actual(describe(&node.subject))
}
