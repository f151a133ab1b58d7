//! The type registry.
//!
//! Owns every descriptor the engine hands out: the builtin catalogue, one
//! descriptor (plus twin) per registered class and declared record, external
//! types added by embedders, and the memoized parameterized containers.
//!
//! # Thread Safety
//!
//! The catalogue is built once in [`TypeRegistry::init`] and never changes.
//! Everything else is behind a `parking_lot::RwLock`: lookups take the read
//! lock, misses build the descriptor without holding any lock and publish it
//! under the write lock, keeping whichever instance got there first. Callers
//! racing on the same miss therefore all observe one descriptor.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::catalogue::{admits_nothing, derive_or_nothing, BuiltinType, Catalogue};
use crate::complex;
use crate::descriptor::{DescriptorFlags, TypeDescriptor, TypeRef};
use crate::error::RegistryError;
use crate::hierarchy::{ClassHierarchyView, ClassId};
use crate::matcher::Matcher;
use crate::options::TypeOptions;
use crate::record::{RecordDecl, RecordId, RecordMember};
use crate::spec::{ParamKind, TypeSpec};
use crate::tag::TypeTag;
use crate::value::Value;

/// A descriptor together with its `*T` twin.
#[derive(Clone)]
struct Pair {
    plain: TypeRef,
    or_nothing: TypeRef,
}

impl Pair {
    fn new(plain: TypeRef) -> Self {
        let or_nothing = derive_or_nothing(&plain);
        Pair { plain, or_nothing }
    }

    fn pick(&self, or_nothing: bool) -> &TypeRef {
        if or_nothing {
            &self.or_nothing
        } else {
            &self.plain
        }
    }
}

#[derive(Default)]
struct ExternalTypes {
    by_tag: FxHashMap<TypeTag, Pair>,
    by_name: FxHashMap<String, TypeTag>,
}

#[derive(Default)]
struct ClassTypes {
    by_id: FxHashMap<ClassId, Pair>,
    by_name: FxHashMap<String, ClassId>,
}

#[derive(Default)]
struct Records {
    decls: Vec<Arc<RecordDecl>>,
    types: Vec<Pair>,
    by_name: FxHashMap<String, RecordId>,
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct ContainerKey {
    kind: ParamKind,
    element: TypeRef,
}

/// Memoized parameterized containers and derived twins. Keys hold their
/// element descriptor, so an identity key is never reused while cached.
#[derive(Default)]
struct ComplexCaches {
    containers: FxHashMap<ContainerKey, TypeRef>,
    twins: FxHashMap<TypeRef, TypeRef>,
}

/// Instance-scoped type registry.
pub struct TypeRegistry {
    options: TypeOptions,
    classes: Arc<dyn ClassHierarchyView>,
    catalogue: Catalogue,
    builtin_names: FxHashMap<&'static str, BuiltinType>,
    builtin_by_ref: FxHashMap<TypeRef, BuiltinType>,
    external: RwLock<ExternalTypes>,
    class_types: RwLock<ClassTypes>,
    records: RwLock<Records>,
    complex: RwLock<ComplexCaches>,
}

impl TypeRegistry {
    /// Build the builtin catalogue and an empty set of user types.
    pub fn init(options: TypeOptions, classes: Arc<dyn ClassHierarchyView>) -> Self {
        let catalogue = Catalogue::build();
        let mut builtin_names = FxHashMap::default();
        let mut builtin_by_ref = FxHashMap::default();
        for (builtin, plain, _) in catalogue.iter() {
            builtin_names.insert(builtin.name(), builtin);
            builtin_by_ref.insert(plain.clone(), builtin);
        }
        tracing::debug!(
            builtins = builtin_names.len(),
            options = ?options,
            "type registry initialized"
        );
        TypeRegistry {
            options,
            classes,
            catalogue,
            builtin_names,
            builtin_by_ref,
            external: RwLock::default(),
            class_types: RwLock::default(),
            records: RwLock::default(),
            complex: RwLock::default(),
        }
    }

    /// Release all descriptors owned by the registry.
    ///
    /// Descriptors still held elsewhere stay valid; they are just no longer
    /// reachable through this registry.
    pub fn shutdown(self) {
        tracing::debug!(
            classes = self.class_types.read().by_id.len(),
            records = self.records.read().decls.len(),
            external = self.external.read().by_tag.len(),
            containers = self.complex.read().containers.len(),
            "type registry shut down"
        );
    }

    #[inline]
    pub fn options(&self) -> TypeOptions {
        self.options
    }

    #[inline]
    pub fn classes(&self) -> &dyn ClassHierarchyView {
        &*self.classes
    }

    /// A matcher over this registry's class hierarchy and options.
    pub fn matcher(&self) -> Matcher<'_> {
        Matcher::new(&*self.classes, self.options)
    }

    pub fn builtin(&self, builtin: BuiltinType) -> TypeRef {
        self.catalogue.plain(builtin).clone()
    }

    pub fn builtin_or_nothing(&self, builtin: BuiltinType) -> TypeRef {
        self.catalogue.or_nothing(builtin).clone()
    }

    /// The untyped descriptor (`any`).
    pub fn any(&self) -> TypeRef {
        self.builtin(BuiltinType::Any)
    }

    /// The descriptor for no value (`nothing`).
    pub fn nothing(&self) -> TypeRef {
        self.builtin(BuiltinType::Nothing)
    }

    /// Look up a bare, unparameterized type name.
    ///
    /// Builtins shadow external types, which shadow classes, which shadow
    /// records.
    pub fn lookup_name(&self, name: &str, or_nothing: bool) -> Option<TypeRef> {
        if let Some(builtin) = self.builtin_by_name(name) {
            return Some(if or_nothing {
                self.builtin_or_nothing(builtin)
            } else {
                self.builtin(builtin)
            });
        }
        {
            let external = self.external.read();
            if let Some(pair) = external.by_name.get(name).and_then(|t| external.by_tag.get(t)) {
                return Some(pair.pick(or_nothing).clone());
            }
        }
        {
            let class_types = self.class_types.read();
            if let Some(pair) = class_types
                .by_name
                .get(name)
                .and_then(|id| class_types.by_id.get(id))
            {
                return Some(pair.pick(or_nothing).clone());
            }
        }
        self.record_type(name, or_nothing)
    }

    pub(crate) fn builtin_by_name(&self, name: &str) -> Option<BuiltinType> {
        match name {
            "closure" | "callref" => Some(BuiltinType::Code),
            "reference" if self.options.contains(TypeOptions::BROKEN_REFERENCES) => {
                Some(BuiltinType::Any)
            }
            _ => self.builtin_names.get(name).copied(),
        }
    }

    /// Add a builtin-like type under a tag at or above
    /// [`TypeTag::FIRST_EXTERNAL`].
    pub fn register_external_type(
        &self,
        tag: TypeTag,
        descriptor: TypeRef,
    ) -> Result<(), RegistryError> {
        if !tag.is_external() {
            return Err(RegistryError::ReservedTag(tag));
        }
        let name = descriptor.name().to_owned();
        if self.builtin_by_name(&name).is_some() {
            return Err(RegistryError::DuplicateName(name));
        }
        let pair = Pair::new(descriptor);

        let mut external = self.external.write();
        if external.by_tag.contains_key(&tag) {
            return Err(RegistryError::DuplicateTag(tag));
        }
        if external.by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        tracing::debug!(%tag, name = %name, "registered external type");
        external.by_name.insert(name, tag);
        external.by_tag.insert(tag, pair);
        Ok(())
    }

    pub fn external_type(&self, tag: TypeTag, or_nothing: bool) -> Option<TypeRef> {
        self.external
            .read()
            .by_tag
            .get(&tag)
            .map(|pair| pair.pick(or_nothing).clone())
    }

    /// The descriptor for objects of `class` and its subclasses.
    ///
    /// Registering the same class again returns the existing descriptor.
    pub fn register_class(&self, class: ClassId) -> Result<TypeRef, RegistryError> {
        if let Some(pair) = self.class_types.read().by_id.get(&class) {
            return Ok(pair.plain.clone());
        }
        let name = self
            .classes
            .class_name(class)
            .ok_or(RegistryError::UnknownClass(class))?;
        let plain = TypeDescriptor::builder(name.clone())
            .description(format!("an object of class '{name}'"))
            .accept_exact(TypeSpec::Class(class))
            .flags(DescriptorFlags::NEEDS_SCAN)
            .build();
        let pair = Pair::new(plain);

        let mut class_types = self.class_types.write();
        if let Some(existing) = class_types.by_id.get(&class) {
            return Ok(existing.plain.clone());
        }
        tracing::debug!(%class, name = %name, "registered class type");
        class_types.by_name.insert(name, class);
        Ok(class_types.by_id.entry(class).or_insert(pair).plain.clone())
    }

    pub fn class_type(&self, class: ClassId, or_nothing: bool) -> Option<TypeRef> {
        self.class_types
            .read()
            .by_id
            .get(&class)
            .map(|pair| pair.pick(or_nothing).clone())
    }

    /// Declare a record type and build its descriptor.
    pub fn declare_record(
        &self,
        name: impl Into<String>,
        members: Vec<RecordMember>,
    ) -> Result<Arc<RecordDecl>, RegistryError> {
        let name = name.into();
        let mut records = self.records.write();
        if records.by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        let raw = u32::try_from(records.decls.len()).map_err(|_| RegistryError::Exhausted)?;
        let decl = Arc::new(RecordDecl {
            id: RecordId::from_raw(raw),
            name: name.clone(),
            members,
        });

        let for_default = Arc::clone(&decl);
        let plain = TypeDescriptor::builder(format!("hash<{name}>"))
            .accept_exact(TypeSpec::Record(Arc::clone(&decl)))
            .flags(DescriptorFlags::NEEDS_SCAN)
            .default_value(move || {
                Value::record_hash(Arc::clone(&for_default), for_default.default_entries())
            })
            .build();

        tracing::debug!(record = %name, members = decl.members.len(), "declared record type");
        records.by_name.insert(name, decl.id);
        records.decls.push(Arc::clone(&decl));
        records.types.push(Pair::new(plain));
        Ok(decl)
    }

    pub fn record(&self, name: &str) -> Option<Arc<RecordDecl>> {
        let records = self.records.read();
        let id = records.by_name.get(name)?;
        records.decls.get(id.raw() as usize).cloned()
    }

    /// The descriptor of the record declared as `name`.
    pub fn record_type(&self, name: &str, or_nothing: bool) -> Option<TypeRef> {
        let records = self.records.read();
        let id = records.by_name.get(name)?;
        records
            .types
            .get(id.raw() as usize)
            .map(|pair| pair.pick(or_nothing).clone())
    }

    fn record_type_by_id(&self, id: RecordId) -> Option<TypeRef> {
        self.records
            .read()
            .types
            .get(id.raw() as usize)
            .map(|pair| pair.plain.clone())
    }

    pub fn get_complex_hash_type(&self, element: &TypeRef) -> TypeRef {
        self.container(ParamKind::Hash, element)
    }

    pub fn get_complex_hash_or_nothing_type(&self, element: &TypeRef) -> TypeRef {
        self.twin(&self.get_complex_hash_type(element))
    }

    pub fn get_complex_list_type(&self, element: &TypeRef) -> TypeRef {
        self.container(ParamKind::List, element)
    }

    pub fn get_complex_list_or_nothing_type(&self, element: &TypeRef) -> TypeRef {
        self.twin(&self.get_complex_list_type(element))
    }

    pub fn get_complex_soft_list_type(&self, element: &TypeRef) -> TypeRef {
        self.container(ParamKind::SoftList, element)
    }

    pub fn get_complex_soft_list_or_nothing_type(&self, element: &TypeRef) -> TypeRef {
        self.twin(&self.get_complex_soft_list_type(element))
    }

    pub fn get_complex_reference_type(&self, element: &TypeRef) -> TypeRef {
        self.container(ParamKind::Reference, element)
    }

    pub fn get_complex_reference_or_nothing_type(&self, element: &TypeRef) -> TypeRef {
        self.twin(&self.get_complex_reference_type(element))
    }

    fn container(&self, kind: ParamKind, element: &TypeRef) -> TypeRef {
        let key = ContainerKey {
            kind,
            element: element.clone(),
        };
        let cached = self.complex.read().containers.get(&key).cloned();
        if let Some(ty) = cached {
            return ty;
        }

        let built = match kind {
            ParamKind::Hash => complex::hash_of(element),
            ParamKind::List => complex::list_of(element),
            ParamKind::SoftList => complex::soft_list_of(element),
            ParamKind::Reference => complex::reference_to(element),
        };
        let mut caches = self.complex.write();
        caches
            .containers
            .entry(key)
            .or_insert_with(|| {
                tracing::debug!(?kind, element = element.name(), "built parameterized type");
                built
            })
            .clone()
    }

    /// Memoized `*T` twin of a descriptor the catalogue does not own.
    fn twin(&self, ty: &TypeRef) -> TypeRef {
        let cached = self.complex.read().twins.get(ty).cloned();
        if let Some(twin) = cached {
            return twin;
        }
        let built = derive_or_nothing(ty);
        let mut caches = self.complex.write();
        caches.twins.entry(ty.clone()).or_insert(built).clone()
    }

    /// The `*T` twin of any descriptor.
    ///
    /// Descriptors that already admit no value are returned as-is.
    pub fn get_or_nothing_type(&self, ty: &TypeRef) -> TypeRef {
        if admits_nothing(ty) {
            return ty.clone();
        }
        if let Some(builtin) = self.builtin_by_ref.get(ty) {
            return self.builtin_or_nothing(*builtin);
        }
        if let Some(class) = ty.unique_return_class() {
            if let Some(pair) = self.class_types.read().by_id.get(&class) {
                if pair.plain == *ty {
                    return pair.or_nothing.clone();
                }
            }
        }
        if let Some(record) = ty.unique_return_record() {
            if let Some(pair) = self.records.read().types.get(record.id.raw() as usize) {
                if pair.plain == *ty {
                    return pair.or_nothing.clone();
                }
            }
        }
        {
            let external = self.external.read();
            if let Some(pair) = external.by_tag.values().find(|pair| pair.plain == *ty) {
                return pair.or_nothing.clone();
            }
        }
        self.twin(ty)
    }

    /// The most specific registered descriptor for a concrete value.
    pub fn type_for_value(&self, value: &Value) -> TypeRef {
        match value {
            Value::Object(obj) => self
                .class_type(obj.class, false)
                .unwrap_or_else(|| self.builtin(BuiltinType::Object)),
            Value::Hash(hash) => match (&hash.record, &hash.value_type) {
                (Some(record), _) => self
                    .record_type_by_id(record.id)
                    .unwrap_or_else(|| self.builtin(BuiltinType::Hash)),
                (None, Some(element)) => self.get_complex_hash_type(element),
                (None, None) => self.builtin(BuiltinType::Hash),
            },
            Value::List(list) => match &list.element_type {
                Some(element) => self.get_complex_list_type(element),
                None => self.builtin(BuiltinType::List),
            },
            Value::Reference(r) => match &r.lvalue_type {
                Some(element) => self.get_complex_reference_type(element),
                None => self.builtin(BuiltinType::Reference),
            },
            Value::Opaque(o) => self.external_type(o.tag, false).unwrap_or_else(|| self.any()),
            other => BuiltinType::for_tag(other.type_tag())
                .map_or_else(|| self.any(), |builtin| self.builtin(builtin)),
        }
    }

    /// The name `ty` resolves back from.
    pub fn get_type_name(&self, ty: &TypeDescriptor) -> String {
        ty.name().to_owned()
    }

    /// A fresh default value for a slot of type `ty`.
    pub fn get_default_value(&self, ty: &TypeDescriptor) -> Option<Value> {
        ty.default_value()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("options", &self.options)
            .field("builtins", &self.builtin_names.len())
            .finish_non_exhaustive()
    }
}
