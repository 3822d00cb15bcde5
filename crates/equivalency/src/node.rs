use equivalency_path::Path;

use crate::options::{EquivalencyOptions, MemberContext};
use crate::types::TypeRef;
use crate::value::Value;

/// One recursion frame: a subject/expectation pair at a path.
///
/// Immutable; descending creates a new node per member, element or key.
#[derive(Debug, Clone)]
pub struct ComparisonNode {
    pub subject: Value,
    pub expectation: Value,
    pub path: Path,
    /// Statically known type at this position, if any.
    pub declared_type: Option<TypeRef>,
    /// Replaces the expectation's runtime type when set.
    pub runtime_type_override: Option<TypeRef>,
}

impl ComparisonNode {
    pub fn root(subject: Value, expectation: Value) -> Self {
        Self {
            subject,
            expectation,
            path: Path::root(),
            declared_type: None,
            runtime_type_override: None,
        }
    }

    pub fn child(
        &self,
        subject: Value,
        expectation: Value,
        path: Path,
        declared_type: Option<TypeRef>,
    ) -> Self {
        Self {
            subject,
            expectation,
            path,
            declared_type,
            runtime_type_override: None,
        }
    }

    pub fn runtime_type(&self) -> TypeRef {
        self.runtime_type_override
            .clone()
            .unwrap_or_else(|| self.expectation.runtime_type())
    }

    /// The type that drives classification and member resolution.
    ///
    /// Runtime typing always uses the runtime type. Declared typing uses the
    /// declared type unless it is absent, `object`, or does not describe the
    /// value at all.
    pub fn relevant_type(&self, options: &EquivalencyOptions) -> TypeRef {
        let runtime = self.runtime_type();
        if options.uses_runtime_typing() {
            return runtime;
        }
        match &self.declared_type {
            Some(declared) if !declared.is_any() && runtime.is_assignable_to(declared) => {
                declared.clone()
            }
            _ => runtime,
        }
    }

    pub fn context(&self) -> MemberContext<'_> {
        MemberContext {
            path: &self.path,
            declared_type: self.declared_type.as_ref(),
            runtime_type: self.runtime_type(),
        }
    }
}
