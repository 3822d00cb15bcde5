//! Nominal type descriptors for compared values.
//!
//! A [`Type`] is what the classifier inspects to decide how a node is
//! compared. Types are immutable and shared through [`TypeRef`]. Identity is
//! nominal: two descriptors with the same name are the same type.

use std::fmt;
use std::sync::{Arc, OnceLock};

pub type TypeRef = Arc<Type>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// The top type (`object`). Carries no members.
    Any,
    Bool,
    Int,
    Float,
    String,
    Enum,
    /// Member-bearing, sequence or dictionary types.
    Object,
}

/// A declared member of an object type.
#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub ty: TypeRef,
}

/// An observable shape a type exposes besides its members.
#[derive(Debug, Clone)]
pub enum Capability {
    /// Key-indexed, key-enumerable access.
    Keyed { key: TypeRef, value: TypeRef },
    /// Ordered iteration.
    Ordered { element: TypeRef },
}

#[derive(Debug)]
pub struct Type {
    name: String,
    kind: TypeKind,
    base: Option<TypeRef>,
    members: Vec<Member>,
    capabilities: Vec<Capability>,
    value_semantics: bool,
}

impl Type {
    fn builtin(name: &str, kind: TypeKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            base: None,
            members: Vec::new(),
            capabilities: Vec::new(),
            value_semantics: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn base(&self) -> Option<&TypeRef> {
        self.base.as_ref()
    }

    pub fn is_any(&self) -> bool {
        self.kind == TypeKind::Any
    }

    /// Primitive, string or enum: never decomposed.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Bool | TypeKind::Int | TypeKind::Float | TypeKind::String | TypeKind::Enum
        )
    }

    /// Compared with plain value equality even when it declares members.
    pub fn has_value_semantics(&self) -> bool {
        self.value_semantics || self.base.as_ref().is_some_and(|b| b.has_value_semantics())
    }

    pub fn own_members(&self) -> &[Member] {
        &self.members
    }

    /// All members, inherited ones first. A member redeclared by a derived
    /// type keeps its base position but takes the derived declaration.
    pub fn members(&self) -> Vec<Member> {
        let mut out = match &self.base {
            Some(base) => base.members(),
            None => Vec::new(),
        };
        for member in &self.members {
            match out.iter_mut().find(|m| m.name == member.name) {
                Some(existing) => *existing = member.clone(),
                None => out.push(member.clone()),
            }
        }
        out
    }

    pub fn find_member(&self, name: &str) -> Option<Member> {
        self.members.iter().find(|m| m.name == name).cloned().or_else(|| {
            self.base
                .as_ref()
                .and_then(|base| base.find_member(name))
        })
    }

    /// Own capabilities followed by inherited ones.
    pub fn capabilities(&self) -> Vec<Capability> {
        let mut out = self.capabilities.clone();
        if let Some(base) = &self.base {
            out.extend(base.capabilities());
        }
        out
    }

    /// Every key-value interface as `(key, value)`, deduplicated by key type.
    pub fn keyed(&self) -> Vec<(TypeRef, TypeRef)> {
        let mut out: Vec<(TypeRef, TypeRef)> = Vec::new();
        for capability in self.capabilities() {
            if let Capability::Keyed { key, value } = capability {
                if !out.iter().any(|(k, _)| k.same_as(&key)) {
                    out.push((key, value));
                }
            }
        }
        out
    }

    /// Element type of the first ordered-iteration capability.
    pub fn ordered(&self) -> Option<TypeRef> {
        self.capabilities().into_iter().find_map(|c| match c {
            Capability::Ordered { element } => Some(element),
            Capability::Keyed { .. } => None,
        })
    }

    pub fn same_as(&self, other: &Type) -> bool {
        self.name == other.name
    }

    /// True when this type is `name` or derives from a type called `name`.
    pub fn is_named_or_derives(&self, name: &str) -> bool {
        self.name == name || self.base.as_ref().is_some_and(|b| b.is_named_or_derives(name))
    }

    /// A value of this type can stand where `target` is declared.
    pub fn is_assignable_to(&self, target: &Type) -> bool {
        target.is_any() || self.is_named_or_derives(&target.name)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

macro_rules! builtin_type {
    ($fn_name:ident, $name:literal, $kind:expr) => {
        pub fn $fn_name() -> TypeRef {
            static CELL: OnceLock<TypeRef> = OnceLock::new();
            CELL.get_or_init(|| Arc::new(Type::builtin($name, $kind)))
                .clone()
        }
    };
}

builtin_type!(any, "object", TypeKind::Any);
builtin_type!(boolean, "bool", TypeKind::Bool);
builtin_type!(int, "int", TypeKind::Int);
builtin_type!(float, "float", TypeKind::Float);
builtin_type!(string, "string", TypeKind::String);

/// `List<element>`: ordered iteration over `element`.
pub fn sequence_of(element: TypeRef) -> TypeRef {
    TypeBuilder::object(format!("List<{}>", element.name()))
        .ordered(element)
        .build()
}

/// `Dictionary<key, value>`: keyed access, also enumerable as a sequence.
pub fn dictionary_of(key: TypeRef, value: TypeRef) -> TypeRef {
    TypeBuilder::object(format!("Dictionary<{}, {}>", key.name(), value.name()))
        .keyed(key, value)
        .ordered(any())
        .build()
}

pub fn enumeration(name: impl Into<String>) -> TypeRef {
    Arc::new(Type::builtin(&name.into(), TypeKind::Enum))
}

/// Builder for object, sequence and dictionary-like types.
#[derive(Debug)]
pub struct TypeBuilder {
    ty: Type,
}

impl TypeBuilder {
    pub fn object(name: impl Into<String>) -> Self {
        Self {
            ty: Type::builtin(&name.into(), TypeKind::Object),
        }
    }

    pub fn extends(mut self, base: TypeRef) -> Self {
        self.ty.base = Some(base);
        self
    }

    pub fn member(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.ty.members.push(Member {
            name: name.into(),
            ty,
        });
        self
    }

    pub fn keyed(mut self, key: TypeRef, value: TypeRef) -> Self {
        self.ty.capabilities.push(Capability::Keyed { key, value });
        self
    }

    pub fn ordered(mut self, element: TypeRef) -> Self {
        self.ty.capabilities.push(Capability::Ordered { element });
        self
    }

    pub fn value_semantics(mut self) -> Self {
        self.ty.value_semantics = true;
        self
    }

    pub fn build(self) -> TypeRef {
        Arc::new(self.ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_and_derived() -> (TypeRef, TypeRef) {
        let base = TypeBuilder::object("Base")
            .member("Id", int())
            .member("Name", string())
            .build();
        let derived = TypeBuilder::object("Derived")
            .extends(base.clone())
            .member("Extra", string())
            .member("Name", any())
            .build();
        (base, derived)
    }

    #[test]
    fn builtins_are_shared() {
        assert!(Arc::ptr_eq(&int(), &int()));
        assert!(int().is_scalar());
        assert!(!any().is_scalar());
        assert!(any().is_any());
    }

    #[test]
    fn members_include_inherited_in_base_order() {
        let (_, derived) = base_and_derived();
        let names: Vec<String> = derived.members().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["Id", "Name", "Extra"]);
        let own: Vec<&str> = derived.own_members().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(own, vec!["Extra", "Name"]);
        assert!(derived.find_member("Name").unwrap().ty.is_any());
        assert_eq!(derived.find_member("Id").unwrap().ty.name(), "int");
        assert!(derived.find_member("Missing").is_none());
    }

    #[test]
    fn assignability_follows_base_chain() {
        let (base, derived) = base_and_derived();
        assert!(derived.is_assignable_to(&base));
        assert!(!base.is_assignable_to(&derived));
        assert!(base.is_assignable_to(&any()));
        assert!(!int().is_assignable_to(&string()));
    }

    #[test]
    fn capabilities_are_reported() {
        let dict = dictionary_of(int(), string());
        assert_eq!(dict.name(), "Dictionary<int, string>");
        let keyed = dict.keyed();
        assert_eq!(keyed.len(), 1);
        assert_eq!(keyed[0].0.name(), "int");
        assert!(dict.ordered().is_some());

        let list = sequence_of(string());
        assert!(list.keyed().is_empty());
        assert_eq!(list.ordered().unwrap().name(), "string");

        let two_faced = TypeBuilder::object("TwoFaced")
            .keyed(int(), string())
            .keyed(string(), string())
            .keyed(int(), any())
            .build();
        assert_eq!(two_faced.keyed().len(), 2);
    }

    #[test]
    fn value_semantics_is_inherited() {
        let money = TypeBuilder::object("Money")
            .member("Amount", float())
            .value_semantics()
            .build();
        let euro = TypeBuilder::object("Euro").extends(money).build();
        assert!(euro.has_value_semantics());
    }
}
