//! Atomic type specs and match outcomes.

use std::fmt;
use std::sync::Arc;

use crate::descriptor::{TypeDescriptor, TypeRef};
use crate::hierarchy::ClassId;
use crate::record::RecordDecl;
use crate::tag::TypeTag;

/// Outcome of comparing an expected type with an offered one.
///
/// Variants are ordered from worst to best, so `max` picks the better match.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum MatchResult {
    /// Definitely incompatible.
    NotEqual,
    /// The expected side places no constraint.
    Wildcard,
    /// Compatibility cannot be decided statically; check the value at run time.
    Ambiguous,
    /// Outer shape matches, element types must be re-verified.
    Near,
    /// Definitely compatible; no runtime check needed.
    Ident,
}

impl MatchResult {
    #[inline]
    pub fn is_match(self) -> bool {
        self != MatchResult::NotEqual
    }

    /// Weight used when ranking overload candidates.
    pub fn rank(self) -> u32 {
        match self {
            MatchResult::NotEqual => 0,
            MatchResult::Wildcard => 1,
            MatchResult::Ambiguous => 2,
            MatchResult::Near => 3,
            MatchResult::Ident => 4,
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchResult::NotEqual => "NOT_EQUAL",
            MatchResult::Wildcard => "WILDCARD",
            MatchResult::Ambiguous => "AMBIGUOUS",
            MatchResult::Near => "NEAR",
            MatchResult::Ident => "IDENT",
        })
    }
}

/// Kind of parameterized container.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ParamKind {
    Hash,
    List,
    SoftList,
    Reference,
}

/// One concrete type.
#[derive(Clone, Debug)]
pub enum TypeSpec {
    /// A builtin or external tag. `Simple(TypeTag::ALL)` means no constraint.
    Simple(TypeTag),
    /// An exact class identity.
    Class(ClassId),
    /// An exact declared record identity.
    Record(Arc<RecordDecl>),
    /// `hash<string, E>`.
    Hash(TypeRef),
    /// `list<E>`.
    List(TypeRef),
    /// `softlist<E>`.
    SoftList(TypeRef),
    /// `reference<E>`.
    Reference(TypeRef),
}

impl TypeSpec {
    pub const ALL: Self = TypeSpec::Simple(TypeTag::ALL);
    pub const NOTHING: Self = TypeSpec::Simple(TypeTag::NOTHING);

    /// The runtime tag a value matching this spec carries.
    pub fn tag(&self) -> TypeTag {
        match self {
            TypeSpec::Simple(t) => *t,
            TypeSpec::Class(_) => TypeTag::OBJECT,
            TypeSpec::Record(_) | TypeSpec::Hash(_) => TypeTag::HASH,
            TypeSpec::List(_) | TypeSpec::SoftList(_) => TypeTag::LIST,
            TypeSpec::Reference(_) => TypeTag::REFERENCE,
        }
    }

    #[inline]
    pub fn is_all(&self) -> bool {
        matches!(self, TypeSpec::Simple(TypeTag::ALL))
    }

    #[inline]
    pub fn is_simple(&self) -> bool {
        matches!(self, TypeSpec::Simple(_))
    }

    /// Container kind and element type of a parameterized spec.
    pub fn param(&self) -> Option<(ParamKind, &TypeRef)> {
        match self {
            TypeSpec::Hash(e) => Some((ParamKind::Hash, e)),
            TypeSpec::List(e) => Some((ParamKind::List, e)),
            TypeSpec::SoftList(e) => Some((ParamKind::SoftList, e)),
            TypeSpec::Reference(e) => Some((ParamKind::Reference, e)),
            _ => None,
        }
    }

    /// Match against a bare runtime tag.
    ///
    /// Only simple specs can match a tag exactly; everything else carries more
    /// information than a tag can express.
    pub fn match_tag(&self, tag: TypeTag) -> MatchResult {
        match self {
            TypeSpec::Simple(TypeTag::ALL) => MatchResult::Ambiguous,
            TypeSpec::Simple(t) if *t == tag => MatchResult::Ident,
            TypeSpec::Simple(_) => MatchResult::NotEqual,
            other if other.tag() == tag => MatchResult::Ambiguous,
            _ => MatchResult::NotEqual,
        }
    }

    /// Human-readable name, as used in descriptor names.
    pub fn name(&self, class_name: impl Fn(ClassId) -> Option<String>) -> String {
        match self {
            TypeSpec::Simple(t) => t.to_string(),
            TypeSpec::Class(id) => class_name(*id).unwrap_or_else(|| id.to_string()),
            TypeSpec::Record(r) => format!("hash<{}>", r.name),
            TypeSpec::Hash(e) => format!("hash<string, {}>", e.name()),
            TypeSpec::List(e) => format!("list<{}>", e.name()),
            TypeSpec::SoftList(e) => format!("softlist<{}>", e.name()),
            TypeSpec::Reference(e) => format!("reference<{}>", e.name()),
        }
    }
}

/// Spec equality: same kind and same identity, with containers compared by
/// structural descriptor equality.
impl PartialEq for TypeSpec {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeSpec::Simple(a), TypeSpec::Simple(b)) => a == b,
            (TypeSpec::Class(a), TypeSpec::Class(b)) => a == b,
            (TypeSpec::Record(a), TypeSpec::Record(b)) => a.equal(b),
            (TypeSpec::Hash(a), TypeSpec::Hash(b))
            | (TypeSpec::List(a), TypeSpec::List(b))
            | (TypeSpec::SoftList(a), TypeSpec::SoftList(b))
            | (TypeSpec::Reference(a), TypeSpec::Reference(b)) => TypeDescriptor::equal(a, b),
            _ => false,
        }
    }
}

impl From<TypeTag> for TypeSpec {
    fn from(tag: TypeTag) -> Self {
        TypeSpec::Simple(tag)
    }
}

#[cfg(test)]
mod tests;
