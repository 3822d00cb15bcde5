//! Runtime values compared by the engine.
//!
//! Scalars are stored inline. Sequences, dictionaries and objects are shared
//! handles with interior mutability, so graphs may alias and cycle; the
//! handle's pointer is its reference identity.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::deep_equal::deep_equal;
use crate::format::describe;
use crate::types::{self, TypeBuilder, TypeRef};

#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Enum(EnumValue),
    Seq(Seq),
    Dict(Dict),
    Object(Object),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The value's concrete type. `Null` reports the top type.
    pub fn runtime_type(&self) -> TypeRef {
        match self {
            Value::Null => types::any(),
            Value::Bool(_) => types::boolean(),
            Value::Int(_) => types::int(),
            Value::Float(_) => types::float(),
            Value::Str(_) => types::string(),
            Value::Enum(e) => e.ty.clone(),
            Value::Seq(s) => s.ty().clone(),
            Value::Dict(d) => d.ty().clone(),
            Value::Object(o) => o.ty().clone(),
        }
    }

    /// Pointer identity for reference-typed values; `None` for scalars.
    pub fn reference_id(&self) -> Option<usize> {
        match self {
            Value::Seq(s) => Some(Rc::as_ptr(&s.0) as *const () as usize),
            Value::Dict(d) => Some(Rc::as_ptr(&d.0) as *const () as usize),
            Value::Object(o) => Some(Rc::as_ptr(&o.0) as *const () as usize),
            _ => None,
        }
    }

    /// Both sides are the same reference-typed instance.
    pub fn same_reference(&self, other: &Value) -> bool {
        match (self.reference_id(), other.reference_id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn as_seq(&self) -> Option<&Seq> {
        match self {
            Value::Seq(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Dictionary key equality: scalars by value, references by identity.
    pub fn key_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a.ty.same_as(&b.ty) && a.value == b.value,
            _ => self.same_reference(other),
        }
    }

    /// Natural ordering between scalars; `None` when the pair is not
    /// comparable.
    pub fn compare_scalar(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Enum(a), Value::Enum(b)) if a.ty.same_as(&b.ty) => Some(a.value.cmp(&b.value)),
            _ => None,
        }
    }

    /// Converts any serializable value through its JSON form.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Value, serde_json::Error> {
        Ok(serde_json::to_value(value)?.into())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        deep_equal(self, other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe(self))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe(self))
    }
}

/// An enum member: its type, symbolic name and underlying number.
#[derive(Debug, Clone)]
pub struct EnumValue {
    ty: TypeRef,
    name: String,
    value: i64,
}

impl EnumValue {
    pub fn new(ty: TypeRef, name: impl Into<String>, value: i64) -> Self {
        Self {
            ty,
            name: name.into(),
            value,
        }
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

type Producer = Box<dyn Fn() -> Vec<Value>>;
type Counter = Box<dyn Fn() -> usize>;

enum SeqItems {
    Materialized(RefCell<Vec<Value>>),
    Deferred {
        source: Producer,
        count: Option<Counter>,
    },
}

struct SeqData {
    ty: TypeRef,
    items: SeqItems,
    enumerations: Cell<usize>,
}

/// Shared handle to an ordered sequence.
#[derive(Clone)]
pub struct Seq(Rc<SeqData>);

impl Seq {
    pub fn new(element: TypeRef, items: Vec<Value>) -> Self {
        Self::with_type(types::sequence_of(element), items)
    }

    /// A sequence of `object` elements.
    pub fn of<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::new(types::any(), items.into_iter().map(Into::into).collect())
    }

    pub fn with_type(ty: TypeRef, items: Vec<Value>) -> Self {
        Self(Rc::new(SeqData {
            ty,
            items: SeqItems::Materialized(RefCell::new(items)),
            enumerations: Cell::new(0),
        }))
    }

    /// A sequence produced on every enumeration, without a native count.
    pub fn deferred(element: TypeRef, source: impl Fn() -> Vec<Value> + 'static) -> Self {
        Self::build_deferred(element, Box::new(source), None)
    }

    /// A deferred sequence that can report its length without enumerating.
    pub fn deferred_with_count(
        element: TypeRef,
        source: impl Fn() -> Vec<Value> + 'static,
        count: impl Fn() -> usize + 'static,
    ) -> Self {
        Self::build_deferred(element, Box::new(source), Some(Box::new(count)))
    }

    fn build_deferred(element: TypeRef, source: Producer, count: Option<Counter>) -> Self {
        Self(Rc::new(SeqData {
            ty: types::sequence_of(element),
            items: SeqItems::Deferred { source, count },
            enumerations: Cell::new(0),
        }))
    }

    pub fn ty(&self) -> &TypeRef {
        &self.0.ty
    }

    /// Appends to a materialized sequence. Deferred sequences are read-only
    /// and ignore the call.
    pub fn push(&self, value: impl Into<Value>) {
        if let SeqItems::Materialized(items) = &self.0.items {
            items.borrow_mut().push(value.into());
        }
    }

    pub fn has_native_count(&self) -> bool {
        match &self.0.items {
            SeqItems::Materialized(_) => true,
            SeqItems::Deferred { count, .. } => count.is_some(),
        }
    }

    /// Length through the native count when available, otherwise by
    /// enumerating once.
    pub fn count(&self) -> usize {
        match &self.0.items {
            SeqItems::Materialized(items) => items.borrow().len(),
            SeqItems::Deferred {
                count: Some(count), ..
            } => count(),
            SeqItems::Deferred { count: None, .. } => self.items().len(),
        }
    }

    /// Enumerates the sequence into a vector.
    pub fn items(&self) -> Vec<Value> {
        self.0.enumerations.set(self.0.enumerations.get() + 1);
        match &self.0.items {
            SeqItems::Materialized(items) => items.borrow().clone(),
            SeqItems::Deferred { source, .. } => source(),
        }
    }

    /// How many times [`Seq::items`] ran.
    pub fn enumerations(&self) -> usize {
        self.0.enumerations.get()
    }

    pub fn ptr_eq(&self, other: &Seq) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Seq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe(&Value::Seq(self.clone())))
    }
}

struct DictData {
    ty: TypeRef,
    entries: RefCell<Vec<(Value, Value)>>,
}

/// Shared handle to a dictionary. Entries keep insertion order; key order
/// never affects comparison.
#[derive(Clone)]
pub struct Dict(Rc<DictData>);

impl Dict {
    pub fn new(key: TypeRef, value: TypeRef) -> Self {
        Self::with_type(types::dictionary_of(key, value))
    }

    /// A dictionary whose type is supplied directly, e.g. one exposing
    /// several key-value interfaces.
    pub fn with_type(ty: TypeRef) -> Self {
        Self(Rc::new(DictData {
            ty,
            entries: RefCell::new(Vec::new()),
        }))
    }

    pub fn ty(&self) -> &TypeRef {
        &self.0.ty
    }

    /// Inserts or replaces the entry for `key`.
    pub fn insert(&self, key: impl Into<Value>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        let mut entries = self.0.entries.borrow_mut();
        match entries.iter_mut().find(|(k, _)| k.key_eq(&key)) {
            Some(entry) => entry.1 = value,
            None => entries.push((key, value)),
        }
    }

    pub fn with(self, key: impl Into<Value>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.0.entries.borrow().clone()
    }

    pub fn keys(&self) -> Vec<Value> {
        self.0.entries.borrow().iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.0
            .entries
            .borrow()
            .iter()
            .find(|(k, _)| k.key_eq(key))
            .map(|(_, v)| v.clone())
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.0.entries.borrow().iter().any(|(k, _)| k.key_eq(key))
    }

    pub fn ptr_eq(&self, other: &Dict) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Dict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe(&Value::Dict(self.clone())))
    }
}

struct ObjectData {
    ty: TypeRef,
    fields: RefCell<IndexMap<String, Value>>,
}

/// Shared handle to a member-bearing object.
#[derive(Clone)]
pub struct Object(Rc<ObjectData>);

pub(crate) const ANONYMOUS_TYPE_NAME: &str = "<anonymous>";

impl Object {
    /// An instance of `ty` with every declared member set to `Null`.
    pub fn new(ty: TypeRef) -> Self {
        let fields = ty
            .members()
            .into_iter()
            .map(|m| (m.name, Value::Null))
            .collect();
        Self(Rc::new(ObjectData {
            ty,
            fields: RefCell::new(fields),
        }))
    }

    /// An object whose type is synthesized from its field names, every
    /// member declared as `object`.
    pub fn anonymous<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let fields: IndexMap<String, Value> = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let ty = fields
            .keys()
            .fold(TypeBuilder::object(ANONYMOUS_TYPE_NAME), |builder, name| {
                builder.member(name.clone(), types::any())
            })
            .build();
        Self(Rc::new(ObjectData {
            ty,
            fields: RefCell::new(fields),
        }))
    }

    pub fn ty(&self) -> &TypeRef {
        &self.0.ty
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.fields.borrow_mut().insert(name.into(), value.into());
    }

    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.fields.borrow().get(name).cloned()
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.0.fields.borrow().contains_key(name)
    }

    pub fn fields(&self) -> Vec<(String, Value)> {
        self.0
            .fields
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.ty.name() == ANONYMOUS_TYPE_NAME
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe(&Value::Object(self.clone())))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<EnumValue> for Value {
    fn from(v: EnumValue) -> Self {
        Value::Enum(v)
    }
}

impl From<Seq> for Value {
    fn from(v: Seq) -> Self {
        Value::Seq(v)
    }
}

impl From<Dict> for Value {
    fn from(v: Dict) -> Self {
        Value::Dict(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Value::Object(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Seq(Seq::new(types::any(), v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// JSON arrays become `object` sequences and JSON objects become
/// `string -> object` dictionaries.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::Seq(Seq::of(items.into_iter().map(Value::from)))
            }
            serde_json::Value::Object(map) => {
                let dict = Dict::new(types::string(), types::any());
                for (key, value) in map {
                    dict.insert(key, Value::from(value));
                }
                Value::Dict(dict)
            }
        }
    }
}
