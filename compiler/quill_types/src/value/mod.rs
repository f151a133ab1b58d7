//! Runtime values as seen by the type engine.
//!
//! The engine never evaluates expressions; it only needs enough of a value to
//! report its runtime type, inspect container element types, and build the
//! coerced replacement a non-exact accept entry produces.
//!
//! All heap payloads live behind [`Heap`], whose constructor is private to
//! this module:
//!
//! ```text
//! let s = Value::string("hello");              // OK
//! let l = Value::typed_list(Some(int), items); // OK
//! let s = Value::String(Heap::new(..));        // ERROR: Heap::new is pub(super)
//! ```

mod convert;
mod heap;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::descriptor::TypeRef;
use crate::hierarchy::{ClassHierarchyView, ClassId};
use crate::record::RecordDecl;
use crate::tag::TypeTag;

pub use heap::Heap;

/// Arbitrary-precision number.
///
/// Backed by `f64`; the engine only needs the type distinction from `float`
/// and lossless round-trips for the coercions it performs.
#[derive(Copy, Clone, PartialEq, PartialOrd, Default, Debug)]
pub struct Number(f64);

impl Number {
    pub const ZERO: Self = Number(0.0);

    #[inline]
    pub const fn new(value: f64) -> Self {
        Number(value)
    }

    #[inline]
    pub const fn to_f64(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A date/time value.
///
/// Absolute dates count milliseconds from the Unix epoch; relative dates are
/// durations in milliseconds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug)]
pub struct DateValue {
    pub millis: i64,
    pub relative: bool,
}

impl DateValue {
    pub const EPOCH: Self = DateValue {
        millis: 0,
        relative: false,
    };

    pub const fn absolute_seconds(secs: i64) -> Self {
        DateValue {
            millis: secs.saturating_mul(1000),
            relative: false,
        }
    }

    pub const fn relative_millis(millis: i64) -> Self {
        DateValue {
            millis,
            relative: true,
        }
    }

    #[inline]
    pub const fn seconds(self) -> i64 {
        self.millis.div_euclid(1000)
    }
}

/// A list, optionally tagged with its element type.
#[derive(Clone, Debug)]
pub struct ListValue {
    pub element_type: Option<TypeRef>,
    pub items: Vec<Value>,
}

impl PartialEq for ListValue {
    fn eq(&self, other: &Self) -> bool {
        self.element_type == other.element_type && self.items == other.items
    }
}

/// A hash with ordered string keys.
///
/// A hash is either untyped, typed by value type (`hash<string, T>`), or an
/// instance of a declared record.
#[derive(Clone, Debug)]
pub struct HashValue {
    pub record: Option<Arc<RecordDecl>>,
    pub value_type: Option<TypeRef>,
    pub entries: IndexMap<String, Value>,
}

impl PartialEq for HashValue {
    fn eq(&self, other: &Self) -> bool {
        let same_record = match (&self.record, &other.record) {
            (Some(a), Some(b)) => a.id == b.id,
            (None, None) => true,
            _ => false,
        };
        same_record && self.value_type == other.value_type && self.entries == other.entries
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ObjectValue {
    pub class: ClassId,
}

/// A closure or call reference. Only the name is kept for diagnostics.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CodeValue {
    pub name: String,
}

/// An lvalue reference.
///
/// Clones share the referenced cell. `lvalue_type` is the declared type of
/// the referenced slot, `None` when untyped.
#[derive(Clone, Debug)]
pub struct ReferenceValue {
    cell: Arc<RwLock<Value>>,
    pub lvalue_type: Option<TypeRef>,
}

impl ReferenceValue {
    /// Current value of the referenced slot.
    pub fn get(&self) -> Value {
        self.cell.read().clone()
    }

    /// Overwrite the referenced slot.
    pub fn set(&self, value: Value) {
        *self.cell.write() = value;
    }

    /// The same cell viewed through a different declared type.
    pub fn retyped(&self, lvalue_type: Option<TypeRef>) -> Self {
        ReferenceValue {
            cell: Arc::clone(&self.cell),
            lvalue_type,
        }
    }

    pub fn same_cell(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl PartialEq for ReferenceValue {
    fn eq(&self, other: &Self) -> bool {
        self.same_cell(other) && self.lvalue_type == other.lvalue_type
    }
}

/// A value of a type added through
/// [`TypeRegistry::register_external_type`](crate::TypeRegistry::register_external_type).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OpaqueValue {
    pub tag: TypeTag,
    pub type_name: String,
}

/// Runtime value.
#[derive(Clone, PartialEq, Debug, Default)]
pub enum Value {
    /// No value.
    #[default]
    Nothing,
    /// SQL-style null.
    Null,
    Int(i64),
    Float(f64),
    Number(Number),
    Bool(bool),
    String(Heap<String>),
    Binary(Heap<Vec<u8>>),
    Date(DateValue),
    List(Heap<ListValue>),
    Hash(Heap<HashValue>),
    Object(Heap<ObjectValue>),
    Closure(Heap<CodeValue>),
    CallRef(Heap<CodeValue>),
    Reference(ReferenceValue),
    Opaque(Heap<OpaqueValue>),
}

// Factory methods
impl Value {
    #[inline]
    pub const fn int(n: i64) -> Self {
        Value::Int(n)
    }

    #[inline]
    pub const fn float(f: f64) -> Self {
        Value::Float(f)
    }

    #[inline]
    pub const fn number(f: f64) -> Self {
        Value::Number(Number::new(f))
    }

    #[inline]
    pub const fn bool(b: bool) -> Self {
        Value::Bool(b)
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(Heap::new(s.into()))
    }

    pub fn binary(bytes: Vec<u8>) -> Self {
        Value::Binary(Heap::new(bytes))
    }

    #[inline]
    pub const fn date(date: DateValue) -> Self {
        Value::Date(date)
    }

    /// Untyped list.
    pub fn list(items: Vec<Value>) -> Self {
        Self::typed_list(None, items)
    }

    pub fn typed_list(element_type: Option<TypeRef>, items: Vec<Value>) -> Self {
        Value::List(Heap::new(ListValue {
            element_type,
            items,
        }))
    }

    /// Untyped hash.
    pub fn hash(entries: IndexMap<String, Value>) -> Self {
        Self::typed_hash(None, entries)
    }

    pub fn typed_hash(value_type: Option<TypeRef>, entries: IndexMap<String, Value>) -> Self {
        Value::Hash(Heap::new(HashValue {
            record: None,
            value_type,
            entries,
        }))
    }

    pub fn record_hash(record: Arc<RecordDecl>, entries: IndexMap<String, Value>) -> Self {
        Value::Hash(Heap::new(HashValue {
            record: Some(record),
            value_type: None,
            entries,
        }))
    }

    pub fn object(class: ClassId) -> Self {
        Value::Object(Heap::new(ObjectValue { class }))
    }

    pub fn closure(name: impl Into<String>) -> Self {
        Value::Closure(Heap::new(CodeValue { name: name.into() }))
    }

    pub fn call_ref(name: impl Into<String>) -> Self {
        Value::CallRef(Heap::new(CodeValue { name: name.into() }))
    }

    /// A fresh reference cell holding `initial`.
    pub fn reference(lvalue_type: Option<TypeRef>, initial: Value) -> Self {
        Value::Reference(ReferenceValue {
            cell: Arc::new(RwLock::new(initial)),
            lvalue_type,
        })
    }

    pub fn opaque(tag: TypeTag, type_name: impl Into<String>) -> Self {
        Value::Opaque(Heap::new(OpaqueValue {
            tag,
            type_name: type_name.into(),
        }))
    }
}

// Inspection
impl Value {
    /// The runtime tag of this value.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Nothing => TypeTag::NOTHING,
            Value::Null => TypeTag::NULL,
            Value::Int(_) => TypeTag::INT,
            Value::Float(_) => TypeTag::FLOAT,
            Value::Number(_) => TypeTag::NUMBER,
            Value::Bool(_) => TypeTag::BOOL,
            Value::String(_) => TypeTag::STRING,
            Value::Binary(_) => TypeTag::BINARY,
            Value::Date(_) => TypeTag::DATE,
            Value::List(_) => TypeTag::LIST,
            Value::Hash(_) => TypeTag::HASH,
            Value::Object(_) => TypeTag::OBJECT,
            Value::Closure(_) => TypeTag::CLOSURE,
            Value::CallRef(_) => TypeTag::CALLREF,
            Value::Reference(_) => TypeTag::REFERENCE,
            Value::Opaque(o) => o.tag,
        }
    }

    #[inline]
    pub fn is_nothing(&self) -> bool {
        matches!(self, Value::Nothing)
    }

    /// Full type name including container parameters, e.g. `list<int>`.
    pub fn type_name(&self) -> String {
        match self {
            Value::List(list) => match &list.element_type {
                Some(ty) => format!("list<{}>", ty.name()),
                None => "list".to_owned(),
            },
            Value::Hash(hash) => match (&hash.record, &hash.value_type) {
                (Some(record), _) => format!("hash<{}>", record.name),
                (None, Some(ty)) => format!("hash<string, {}>", ty.name()),
                (None, None) => "hash".to_owned(),
            },
            Value::Reference(r) => match &r.lvalue_type {
                Some(ty) => format!("reference<{}>", ty.name()),
                None => "reference".to_owned(),
            },
            Value::Opaque(o) => o.type_name.clone(),
            other => other.type_tag().to_string(),
        }
    }

    /// How this value is named in type error messages.
    pub fn describe(&self, classes: &dyn ClassHierarchyView) -> String {
        match self {
            Value::Nothing => "no value".to_owned(),
            Value::Object(obj) => match classes.class_name(obj.class) {
                Some(name) => format!("an object of class '{name}'"),
                None => "an object".to_owned(),
            },
            other => format!("type '{}'", other.type_name()),
        }
    }

    pub fn as_list(&self) -> Option<&ListValue> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&HashValue> {
        match self {
            Value::Hash(hash) => Some(hash),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Untyped copy of a typed list or hash, recursively.
///
/// Record hashes lose their record identity. Other values are returned as-is.
pub fn strip_type_info(value: &Value) -> Value {
    match value {
        Value::List(list) if needs_strip(value) => {
            Value::list(list.items.iter().map(strip_type_info).collect())
        }
        Value::Hash(hash) if needs_strip(value) => Value::hash(
            hash.entries
                .iter()
                .map(|(k, v)| (k.clone(), strip_type_info(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn needs_strip(value: &Value) -> bool {
    match value {
        Value::List(list) => list.element_type.is_some() || list.items.iter().any(needs_strip),
        Value::Hash(hash) => {
            hash.record.is_some()
                || hash.value_type.is_some()
                || hash.entries.values().any(needs_strip)
        }
        _ => false,
    }
}
