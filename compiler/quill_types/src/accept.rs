//! The input acceptance pipeline.
//!
//! Accepting a value walks the target's accept list in order. The first entry
//! whose spec does not reject the value wins: parameterized containers are
//! re-typed (on a copy), soft lists wrap scalars, references are re-checked
//! through their element type, and finally the entry's coercion runs.

use std::fmt;

use indexmap::IndexMap;
use quill_stack::ensure_sufficient_stack;

use crate::descriptor::{AcceptEntry, TypeDescriptor, TypeRef};
use crate::error::RuntimeTypeError;
use crate::hierarchy::ClassId;
use crate::matcher::Matcher;
use crate::spec::TypeSpec;
use crate::value::{ReferenceValue, Value};

/// Where a value is being bound. Renders as the prefix of type error
/// messages, including the trailing space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AcceptSite {
    /// A call argument; `num` is 1-based, 0 when only the name is known.
    Param { num: usize, name: Option<String> },
    /// A class or record member.
    Member(String),
    /// A hash key with a declared value type.
    Key(String),
    /// An assignment, described by a bracketed text such as `<lvalue>`.
    Assignment(String),
}

impl AcceptSite {
    pub fn param(num: usize, name: impl Into<String>) -> Self {
        AcceptSite::Param {
            num,
            name: Some(name.into()),
        }
    }

    pub fn member(name: impl Into<String>) -> Self {
        AcceptSite::Member(name.into())
    }
}

impl fmt::Display for AcceptSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcceptSite::Param { num: 0, name: Some(name) } => write!(f, "parameter '{name}' "),
            AcceptSite::Param { num: 0, name: None } => f.write_str("parameter "),
            AcceptSite::Param { num, name: Some(name) } => write!(f, "parameter {num} ('{name}') "),
            AcceptSite::Param { num, name: None } => write!(f, "parameter {num} "),
            AcceptSite::Member(name) => write!(f, "member '{name}' "),
            AcceptSite::Key(name) => write!(f, "key '{name}' "),
            AcceptSite::Assignment(text) => write!(f, "{text} "),
        }
    }
}

/// Context for one acceptance, handed to coercions so they can accept nested
/// values through other descriptors.
#[derive(Copy, Clone)]
pub struct AcceptCx<'a> {
    matcher: Matcher<'a>,
    site: &'a AcceptSite,
    context: Option<ClassId>,
}

impl<'a> AcceptCx<'a> {
    pub fn new(matcher: Matcher<'a>, site: &'a AcceptSite) -> Self {
        AcceptCx {
            matcher,
            site,
            context: None,
        }
    }

    /// Accept as code running inside `class`, which may see its own private
    /// base classes.
    #[must_use]
    pub fn in_class(mut self, class: ClassId) -> Self {
        self.context = Some(class);
        self
    }

    #[inline]
    pub fn matcher(&self) -> Matcher<'a> {
        self.matcher
    }

    #[inline]
    pub fn site(&self) -> &'a AcceptSite {
        self.site
    }

    /// Accept `value` into a slot of type `ty`.
    ///
    /// Returns the value to store, which may be a coerced replacement. The
    /// input is never modified in place.
    pub fn accept(&self, ty: &TypeDescriptor, value: Value) -> Result<Value, RuntimeTypeError> {
        ensure_sufficient_stack(|| self.accept_inner(ty, value))
    }

    fn accept_inner(&self, ty: &TypeDescriptor, value: Value) -> Result<Value, RuntimeTypeError> {
        if !ty.has_type() {
            return Ok(value);
        }
        for entry in ty.accepts() {
            match self.check(entry, &value) {
                Check::Reject => {}
                Check::Private => return Err(self.private_error(ty)),
                Check::Accept => {
                    let value = self.retype(ty, &entry.spec, value)?;
                    return match &entry.coercion {
                        Some(coercion) => coercion.apply(value, self),
                        None => Ok(value),
                    };
                }
            }
        }
        Err(self.mismatch(ty, &value))
    }

    fn check(&self, entry: &AcceptEntry, value: &Value) -> Check {
        if let (TypeSpec::Class(class), Value::Object(obj)) = (&entry.spec, value) {
            let classes = self.matcher.classes();
            return match classes.relation(*class, obj.class) {
                None => Check::Reject,
                Some(inh) if !inh.private => Check::Accept,
                Some(_) if classes.can_access_private(*class, self.context) => Check::Accept,
                Some(_) => Check::Private,
            };
        }
        if self
            .matcher
            .runtime_accepts_spec(&entry.spec, value, entry.exact)
            .is_match()
        {
            Check::Accept
        } else {
            Check::Reject
        }
    }

    fn retype(
        &self,
        ty: &TypeDescriptor,
        spec: &TypeSpec,
        value: Value,
    ) -> Result<Value, RuntimeTypeError> {
        match (spec, value) {
            (TypeSpec::Hash(element), Value::Hash(hash)) => {
                if hash.value_type.as_ref().is_some_and(|ti| TypeDescriptor::equal(element, ti)) {
                    return Ok(Value::Hash(hash));
                }
                let entries = hash
                    .entries
                    .iter()
                    .map(|(k, v)| self.accept(element, v.clone()).map(|v| (k.clone(), v)))
                    .collect::<Result<IndexMap<_, _>, _>>()?;
                Ok(Value::typed_hash(Some(element.clone()), entries))
            }
            (TypeSpec::List(element) | TypeSpec::SoftList(element), Value::List(list)) => {
                if list.element_type.as_ref().is_some_and(|ti| TypeDescriptor::equal(element, ti)) {
                    return Ok(Value::List(list));
                }
                let items = self.fold_items(element, &list.items)?;
                Ok(Value::typed_list(Some(element.clone()), items))
            }
            (TypeSpec::SoftList(element), value) => {
                let item = self
                    .accept(element, value)
                    .map_err(|err| Self::in_slot(ty, err))?;
                Ok(Value::typed_list(Some(element.clone()), vec![item]))
            }
            (TypeSpec::Reference(element), Value::Reference(r)) => {
                self.retype_reference(element, &r)?;
                Ok(Value::Reference(r.retyped(Some(element.clone()))))
            }
            (_, value) => Ok(value),
        }
    }

    fn fold_items(
        &self,
        element: &TypeRef,
        items: &[Value],
    ) -> Result<Vec<Value>, RuntimeTypeError> {
        items.iter().map(|v| self.accept(element, v.clone())).collect()
    }

    /// Re-check the referenced value through `element` and store the result.
    fn retype_reference(
        &self,
        element: &TypeRef,
        r: &ReferenceValue,
    ) -> Result<(), RuntimeTypeError> {
        let current = r.get();
        if current.is_nothing() {
            return Ok(());
        }
        let accepted = self.accept(element, current)?;
        r.set(accepted);
        Ok(())
    }

    fn mismatch(&self, ty: &TypeDescriptor, value: &Value) -> RuntimeTypeError {
        RuntimeTypeError::Mismatch {
            site: self.site.to_string(),
            expected: ty.description(),
            found: value.describe(self.matcher.classes()),
        }
    }

    /// Report an element mismatch against the declared slot type.
    fn in_slot(ty: &TypeDescriptor, err: RuntimeTypeError) -> RuntimeTypeError {
        match err {
            RuntimeTypeError::Mismatch { site, found, .. } => RuntimeTypeError::Mismatch {
                site,
                expected: ty.description(),
                found,
            },
            err => err,
        }
    }

    fn private_error(&self, ty: &TypeDescriptor) -> RuntimeTypeError {
        RuntimeTypeError::PrivateClass {
            site: self.site.to_string(),
            expected: ty.description(),
        }
    }
}

enum Check {
    Accept,
    Reject,
    Private,
}

impl Matcher<'_> {
    /// Accept `value` into a slot of type `ty` bound at `site`.
    pub fn accept_input(
        &self,
        ty: &TypeDescriptor,
        value: Value,
        site: &AcceptSite,
    ) -> Result<Value, RuntimeTypeError> {
        AcceptCx::new(*self, site).accept(ty, value)
    }
}
