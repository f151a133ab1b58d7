//! Parameterized container descriptors.
//!
//! These build fresh descriptors; memoization lives in the registry so that
//! one element type maps to exactly one container descriptor.

use indexmap::IndexMap;

use crate::descriptor::{Coercion, DescriptorFlags, TypeDescriptor, TypeRef};
use crate::spec::TypeSpec;
use crate::tag::TypeTag;
use crate::value::Value;

/// `hash<string, E>`.
pub(crate) fn hash_of(element: &TypeRef) -> TypeRef {
    let spec = TypeSpec::Hash(element.clone());
    let name = format!("hash<string, {}>", element.name());
    let element = element.clone();
    TypeDescriptor::builder(name)
        .accept_exact(spec)
        .flags(DescriptorFlags::NEEDS_SCAN)
        .default_value(move || Value::typed_hash(Some(element.clone()), IndexMap::new()))
        .build()
}

/// `list<E>`.
pub(crate) fn list_of(element: &TypeRef) -> TypeRef {
    let spec = TypeSpec::List(element.clone());
    let name = format!("list<{}>", element.name());
    let element = element.clone();
    TypeDescriptor::builder(name)
        .accept_exact(spec)
        .flags(DescriptorFlags::NEEDS_SCAN)
        .default_value(move || Value::typed_list(Some(element.clone()), Vec::new()))
        .build()
}

/// `softlist<E>`: lists fold through `E`, no value becomes an empty list and
/// any other value `E` accepts is wrapped in a one-element list.
///
/// Always returns `list<E>`.
pub(crate) fn soft_list_of(element: &TypeRef) -> TypeRef {
    let name = format!("softlist<{}>", element.name());
    let empty = {
        let element = element.clone();
        Coercion::map(move |_| Value::typed_list(Some(element.clone()), Vec::new()))
    };
    let default_element = element.clone();
    TypeDescriptor::builder(name)
        .accept_with(TypeTag::NOTHING, empty)
        .accept_exact(TypeSpec::SoftList(element.clone()))
        .returns_exact(TypeSpec::List(element.clone()))
        .flags(DescriptorFlags::NEEDS_SCAN)
        .default_value(move || Value::typed_list(Some(default_element.clone()), Vec::new()))
        .build()
}

/// `reference<E>`.
pub(crate) fn reference_to(element: &TypeRef) -> TypeRef {
    TypeDescriptor::builder(format!("reference<{}>", element.name()))
        .accept_exact(TypeSpec::Reference(element.clone()))
        .build()
}
