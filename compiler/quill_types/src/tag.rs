//! Runtime value tags.
//!
//! Every runtime value reports one `TypeTag`. Builtin tags have fixed values
//! below [`TypeTag::FIRST_EXTERNAL`]; tags at or above it belong to types
//! added by embedding code through the registry.

use std::fmt;

/// A 16-bit runtime type tag.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeTag(u16);

impl TypeTag {
    pub const NOTHING: Self = Self(0);
    pub const NULL: Self = Self(1);
    pub const INT: Self = Self(2);
    pub const FLOAT: Self = Self(3);
    /// Arbitrary-precision number.
    pub const NUMBER: Self = Self(4);
    pub const STRING: Self = Self(5);
    pub const BOOL: Self = Self(6);
    pub const DATE: Self = Self(7);
    pub const BINARY: Self = Self(8);
    pub const LIST: Self = Self(9);
    pub const HASH: Self = Self(10);
    pub const OBJECT: Self = Self(11);
    pub const CLOSURE: Self = Self(12);
    pub const CALLREF: Self = Self(13);
    pub const REFERENCE: Self = Self(14);

    /// The "no constraint" tag. No value carries it; as an expected spec it
    /// absorbs everything.
    pub const ALL: Self = Self(u16::MAX);

    /// First tag available to external types.
    pub const FIRST_EXTERNAL: u16 = 256;

    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn is_external(self) -> bool {
        self.0 >= Self::FIRST_EXTERNAL && self.0 != u16::MAX
    }

    /// Name of a builtin tag, `None` for external tags.
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("nothing"),
            1 => Some("null"),
            2 => Some("int"),
            3 => Some("float"),
            4 => Some("number"),
            5 => Some("string"),
            6 => Some("bool"),
            7 => Some("date"),
            8 => Some("binary"),
            9 => Some("list"),
            10 => Some("hash"),
            11 => Some("object"),
            12 => Some("closure"),
            13 => Some("callref"),
            14 => Some("reference"),
            u16::MAX => Some("any"),
            _ => None,
        }
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "TypeTag({name})"),
            None => write!(f, "TypeTag(#{})", self.0),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "external#{}", self.0),
        }
    }
}
