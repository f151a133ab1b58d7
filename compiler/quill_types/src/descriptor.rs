//! Named types with accept and return lists.
//!
//! A [`TypeDescriptor`] describes what may flow into a slot of this type (the
//! accept list, first match wins) and what an expression of this type may
//! produce (the return list). Descriptors are immutable once built and are
//! shared through [`TypeRef`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use bitflags::bitflags;

use crate::accept::AcceptCx;
use crate::error::RuntimeTypeError;
use crate::hierarchy::ClassId;
use crate::record::RecordDecl;
use crate::spec::{ParamKind, TypeSpec};
use crate::tag::TypeTag;
use crate::value::Value;

type CoercionFn = dyn Fn(Value, &AcceptCx<'_>) -> Result<Value, RuntimeTypeError> + Send + Sync;
type DefaultFn = dyn Fn() -> Value + Send + Sync;

/// A value transform attached to a non-exact accept entry.
#[derive(Clone)]
pub struct Coercion(Arc<CoercionFn>);

impl Coercion {
    /// A coercion that may fail or recurse into other descriptors.
    pub fn new(
        f: impl Fn(Value, &AcceptCx<'_>) -> Result<Value, RuntimeTypeError> + Send + Sync + 'static,
    ) -> Self {
        Coercion(Arc::new(f))
    }

    /// An infallible value-to-value transform.
    pub fn map(f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        Coercion(Arc::new(move |v, _| Ok(f(v))))
    }

    #[inline]
    pub fn apply(&self, value: Value, cx: &AcceptCx<'_>) -> Result<Value, RuntimeTypeError> {
        (self.0)(value, cx)
    }
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Coercion(..)")
    }
}

/// One way a value may be supplied to a type.
#[derive(Clone, Debug)]
pub struct AcceptEntry {
    pub spec: TypeSpec,
    pub coercion: Option<Coercion>,
    /// A match on this entry needs no further runtime disambiguation.
    pub exact: bool,
}

/// One way an expression of a type may manifest at run time.
#[derive(Clone, Debug)]
pub struct ReturnEntry {
    pub spec: TypeSpec,
    pub exact: bool,
}

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct DescriptorFlags: u8 {
        /// Values may transitively reference objects or closures.
        const NEEDS_SCAN = 1 << 0;
        /// Values can be read as a numeric, boolean or string scalar.
        const CONVERTS_TO_SCALAR = 1 << 1;
    }
}

/// A named, possibly compound type.
pub struct TypeDescriptor {
    name: String,
    description: Option<String>,
    accepts: Vec<AcceptEntry>,
    returns: Vec<ReturnEntry>,
    flags: DescriptorFlags,
    default: Option<Arc<DefaultFn>>,
}

impl TypeDescriptor {
    pub fn builder(name: impl Into<String>) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder {
            name: name.into(),
            description: None,
            accepts: Vec::new(),
            returns: Vec::new(),
            flags: DescriptorFlags::empty(),
            default: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How this type is named in error messages, e.g. `type 'int'`.
    pub fn description(&self) -> String {
        match &self.description {
            Some(d) => d.clone(),
            None => format!("type '{}'", self.name),
        }
    }

    pub(crate) fn custom_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[inline]
    pub fn accepts(&self) -> &[AcceptEntry] {
        &self.accepts
    }

    #[inline]
    pub fn returns(&self) -> &[ReturnEntry] {
        &self.returns
    }

    #[inline]
    pub fn flags(&self) -> DescriptorFlags {
        self.flags
    }

    /// False only for the unconstrained type, whose sole accept entry is
    /// `Simple(ALL)`.
    pub fn has_type(&self) -> bool {
        !(self.accepts.len() == 1 && self.accepts[0].spec.is_all())
    }

    pub fn returns_single(&self) -> bool {
        self.returns.len() == 1
    }

    pub fn accepts_single(&self) -> bool {
        self.accepts.len() == 1
    }

    /// The tag of the single return spec, `ALL` for union or untyped types.
    pub fn single_tag(&self) -> TypeTag {
        match self.returns.as_slice() {
            [only] if self.has_type() => only.spec.tag(),
            _ => TypeTag::ALL,
        }
    }

    pub fn unique_return_class(&self) -> Option<ClassId> {
        match self.returns.as_slice() {
            [ReturnEntry {
                spec: TypeSpec::Class(id),
                ..
            }] => Some(*id),
            _ => None,
        }
    }

    pub fn unique_return_record(&self) -> Option<&Arc<RecordDecl>> {
        match self.returns.as_slice() {
            [ReturnEntry {
                spec: TypeSpec::Record(r),
                ..
            }] => Some(r),
            _ => None,
        }
    }

    /// Element type when this type always returns one container kind.
    pub fn unique_return_param(&self, kind: ParamKind) -> Option<&TypeRef> {
        match self.returns.as_slice() {
            [only] => only.spec.param().filter(|(k, _)| *k == kind).map(|(_, e)| e),
            _ => None,
        }
    }

    /// Whether some return entry has exactly this tag.
    pub fn parse_accepts_returns(&self, tag: TypeTag) -> bool {
        !self.has_type() || self.returns.iter().any(|r| r.spec.tag() == tag)
    }

    /// Whether accepting `value` may run a coercion.
    ///
    /// False when the first entry the value's tag lands on is exact.
    pub fn may_require_coercion(&self, value: &Value) -> bool {
        let tag = value.type_tag();
        self.accepts
            .iter()
            .find(|a| a.spec.is_all() || a.spec.tag() == tag)
            .is_some_and(|a| a.coercion.is_some() || !a.exact)
    }

    /// Structural equality: both untyped, or the same accept and return specs.
    pub fn equal(a: &TypeDescriptor, b: &TypeDescriptor) -> bool {
        if std::ptr::eq(a, b) {
            return true;
        }
        match (a.has_type(), b.has_type()) {
            (false, false) => true,
            (true, true) => Self::is_input_identical(a, b) && Self::is_output_identical(a, b),
            _ => false,
        }
    }

    pub fn is_input_identical(a: &TypeDescriptor, b: &TypeDescriptor) -> bool {
        a.accepts.len() == b.accepts.len()
            && a.accepts.iter().zip(&b.accepts).all(|(x, y)| x.spec == y.spec)
    }

    pub fn is_output_identical(a: &TypeDescriptor, b: &TypeDescriptor) -> bool {
        a.returns.len() == b.returns.len()
            && a.returns.iter().zip(&b.returns).all(|(x, y)| x.spec == y.spec)
    }

    pub fn can_convert_to_scalar(&self) -> bool {
        self.flags.contains(DescriptorFlags::CONVERTS_TO_SCALAR)
    }

    pub fn needs_scan(&self) -> bool {
        self.flags.contains(DescriptorFlags::NEEDS_SCAN)
    }

    pub fn has_default_value(&self) -> bool {
        self.default.is_some()
    }

    /// A fresh default value, or `None` when the type has no default.
    pub fn default_value(&self) -> Option<Value> {
        self.default.as_ref().map(|f| f())
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("accepts", &self.accepts.len())
            .field("returns", &self.returns.len())
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// Builder for [`TypeDescriptor`].
pub struct TypeDescriptorBuilder {
    name: String,
    description: Option<String>,
    accepts: Vec<AcceptEntry>,
    returns: Vec<ReturnEntry>,
    flags: DescriptorFlags,
    default: Option<Arc<DefaultFn>>,
}

impl TypeDescriptorBuilder {
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Accept `spec` as-is, requiring no runtime disambiguation.
    #[must_use]
    pub fn accept_exact(mut self, spec: impl Into<TypeSpec>) -> Self {
        self.accepts.push(AcceptEntry {
            spec: spec.into(),
            coercion: None,
            exact: true,
        });
        self
    }

    /// Accept `spec` as-is, non-exact.
    #[must_use]
    pub fn accept(mut self, spec: impl Into<TypeSpec>) -> Self {
        self.accepts.push(AcceptEntry {
            spec: spec.into(),
            coercion: None,
            exact: false,
        });
        self
    }

    /// Accept `spec` and run `coercion` on the value.
    #[must_use]
    pub fn accept_with(mut self, spec: impl Into<TypeSpec>, coercion: Coercion) -> Self {
        self.accepts.push(AcceptEntry {
            spec: spec.into(),
            coercion: Some(coercion),
            exact: false,
        });
        self
    }

    #[must_use]
    pub fn push_accept(mut self, entry: AcceptEntry) -> Self {
        self.accepts.push(entry);
        self
    }

    #[must_use]
    pub fn push_return(mut self, entry: ReturnEntry) -> Self {
        self.returns.push(entry);
        self
    }

    #[must_use]
    pub fn returns_exact(mut self, spec: impl Into<TypeSpec>) -> Self {
        self.returns.push(ReturnEntry {
            spec: spec.into(),
            exact: true,
        });
        self
    }

    #[must_use]
    pub fn returns(mut self, spec: impl Into<TypeSpec>) -> Self {
        self.returns.push(ReturnEntry {
            spec: spec.into(),
            exact: false,
        });
        self
    }

    #[must_use]
    pub fn flags(mut self, flags: DescriptorFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[must_use]
    pub fn default_value(mut self, f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default = Some(Arc::new(f));
        self
    }

    /// Finish the descriptor.
    ///
    /// A descriptor with no return entries returns what it accepts.
    pub fn build(mut self) -> TypeRef {
        debug_assert!(!self.accepts.is_empty(), "descriptor '{}' accepts nothing", self.name);
        if self.returns.is_empty() {
            self.returns = self
                .accepts
                .iter()
                .map(|a| ReturnEntry {
                    spec: a.spec.clone(),
                    exact: a.exact,
                })
                .collect();
        }
        TypeRef(Arc::new(TypeDescriptor {
            name: self.name,
            description: self.description,
            accepts: self.accepts,
            returns: self.returns,
            flags: self.flags,
            default: self.default,
        }))
    }
}

/// Shared handle to an immutable descriptor.
///
/// Equality and hashing are by identity; use [`TypeDescriptor::equal`] for
/// structural comparison.
#[derive(Clone)]
pub struct TypeRef(Arc<TypeDescriptor>);

impl TypeRef {
    #[inline]
    pub fn ptr_eq(a: &TypeRef, b: &TypeRef) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Stable identity key for caches.
    #[inline]
    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl Deref for TypeRef {
    type Target = TypeDescriptor;

    #[inline]
    fn deref(&self) -> &TypeDescriptor {
        &self.0
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.0.name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}
