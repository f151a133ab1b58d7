//! Declared record ("hashdecl") types.

use std::fmt;

use indexmap::IndexMap;

use crate::descriptor::{TypeDescriptor, TypeRef};
use crate::value::Value;

/// Record identity, assigned by the registry.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct RecordId(u32);

impl RecordId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        RecordId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record#{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct RecordMember {
    pub name: String,
    pub ty: TypeRef,
    /// Explicit initializer; falls back to the member type's default.
    pub default: Option<Value>,
}

impl RecordMember {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        RecordMember {
            name: name.into(),
            ty,
            default: None,
        }
    }

    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// A named, structurally declared key set.
#[derive(Debug)]
pub struct RecordDecl {
    pub id: RecordId,
    pub name: String,
    pub members: Vec<RecordMember>,
}

impl RecordDecl {
    /// Records are equal when they are the same declaration, or declare the
    /// same name with member-wise equal types.
    pub fn equal(&self, other: &RecordDecl) -> bool {
        if self.id == other.id {
            return true;
        }
        self.name == other.name
            && self.members.len() == other.members.len()
            && self
                .members
                .iter()
                .zip(&other.members)
                .all(|(a, b)| a.name == b.name && TypeDescriptor::equal(&a.ty, &b.ty))
    }

    pub fn member(&self, name: &str) -> Option<&RecordMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Entries of a freshly initialized instance.
    ///
    /// Members without an initializer or type default are left out.
    pub fn default_entries(&self) -> IndexMap<String, Value> {
        self.members
            .iter()
            .filter_map(|m| {
                let value = m.default.clone().or_else(|| m.ty.default_value())?;
                Some((m.name.clone(), value))
            })
            .collect()
    }
}
