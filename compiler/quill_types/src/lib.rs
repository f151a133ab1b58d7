//! Type compatibility and coercion engine for Quill.
//!
//! Answers, for every parameter binding, member assignment and overload
//! decision, whether a value or expression of one type can occupy a slot
//! declared as another, and which conversion must run when it does.
//!
//! # Layers
//!
//! - [`TypeSpec`]: one concrete type (builtin tag, class, record, or a
//!   container parameterized by an element [`TypeRef`]).
//! - [`TypeDescriptor`]: a named type with ordered accept and return lists.
//! - [`Matcher`]: pairwise and aggregate matching at parse time, value
//!   matching at run time, and the accept/coercion pipeline.
//! - [`TypeRegistry`]: builtin catalogue, name resolution, class and record
//!   types, external types and the memoized parameterized-type factory.
//! - [`VariantSet`]: overload selection built on the matcher.
//!
//! # Identity
//!
//! Descriptors are compared by identity first ([`TypeRef`] equality is
//! pointer equality) with [`TypeDescriptor::equal`] as the structural
//! fallback. The registry hands out exactly one descriptor per builtin name,
//! class, record and element type.

mod accept;
mod catalogue;
mod complex;
mod descriptor;
mod error;
mod hierarchy;
mod matcher;
mod options;
mod record;
mod registry;
mod resolve;
mod spec;
mod tag;
pub mod value;
mod variant;
mod warnings;

pub use accept::{AcceptCx, AcceptSite};
pub use catalogue::BuiltinType;
pub use descriptor::{
    AcceptEntry, Coercion, DescriptorFlags, ReturnEntry, TypeDescriptor, TypeDescriptorBuilder,
    TypeRef,
};
pub use error::{ParseTypeError, RegistryError, ResolveError, RuntimeTypeError};
pub use hierarchy::{ClassHierarchyView, ClassId, ClassTable, Inheritance};
pub use matcher::{MatchFlags, Matcher, ParseAccepts};
pub use options::TypeOptions;
pub use record::{RecordDecl, RecordId, RecordMember};
pub use registry::TypeRegistry;
pub use spec::{MatchResult, ParamKind, TypeSpec};
pub use tag::TypeTag;
pub use value::Value;
pub use variant::{Selection, VariantSet};
pub use warnings::{
    check_member_redeclaration, check_non_boolean_warning, check_non_numeric_warning,
    check_non_string_warning,
};

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{MatchResult, TypeTag};
    quill_ir::static_assert_size!(TypeTag, 2);
    quill_ir::static_assert_size!(MatchResult, 1);
}
