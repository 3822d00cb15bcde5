//! Type Classifier: picks exactly one comparison strategy per node.
//!
//! Priority is Dictionary > Collection > Scalar > ComplexObject, even though
//! a dictionary is also enumerable as a collection.

use crate::node::ComparisonNode;
use crate::options::EquivalencyOptions;
use crate::types::{Type, TypeRef};

#[derive(Debug, Clone)]
pub enum Strategy {
    Scalar,
    Collection { element: TypeRef },
    Dictionary { key: TypeRef, value: TypeRef },
    ComplexObject { ty: TypeRef },
}

#[derive(Debug, Clone)]
pub enum Classification {
    /// Both sides are `<null>`: trivially equal.
    BothAbsent,
    SubjectAbsent,
    ExpectationAbsent,
    /// The type exposes several key-value interfaces with different keys.
    Ambiguous { ty: TypeRef, key_types: Vec<TypeRef> },
    Strategy(Strategy),
}

/// Dictionary-likeness of one type.
#[derive(Debug, Clone)]
pub enum DictionaryShape {
    NotKeyed,
    Keyed { key: TypeRef, value: TypeRef },
    Ambiguous(Vec<TypeRef>),
}

pub fn dictionary_shape(ty: &Type) -> DictionaryShape {
    let mut keyed = ty.keyed();
    match keyed.len() {
        0 => DictionaryShape::NotKeyed,
        1 => {
            let (key, value) = keyed.remove(0);
            DictionaryShape::Keyed { key, value }
        }
        _ => DictionaryShape::Ambiguous(keyed.into_iter().map(|(k, _)| k).collect()),
    }
}

/// Classifies a node. Pure: inspects the pair and options only.
pub fn classify(node: &ComparisonNode, options: &EquivalencyOptions) -> Classification {
    match (node.subject.is_null(), node.expectation.is_null()) {
        (true, true) => return Classification::BothAbsent,
        (true, false) => return Classification::SubjectAbsent,
        (false, true) => return Classification::ExpectationAbsent,
        (false, false) => {}
    }

    let ty = node.relevant_type(options);
    match dictionary_shape(&ty) {
        DictionaryShape::Ambiguous(key_types) => {
            return Classification::Ambiguous { ty, key_types };
        }
        DictionaryShape::Keyed { key, value } => {
            return Classification::Strategy(Strategy::Dictionary { key, value });
        }
        DictionaryShape::NotKeyed => {}
    }

    if let Some(element) = ty.ordered() {
        return Classification::Strategy(Strategy::Collection { element });
    }

    if ty.is_scalar() || options.compares_by_value(&ty) || ty.members().is_empty() {
        Classification::Strategy(Strategy::Scalar)
    } else {
        Classification::Strategy(Strategy::ComplexObject { ty })
    }
}
