//! The builtin type catalogue.
//!
//! Every builtin name maps to exactly one descriptor, plus an "or nothing"
//! twin (`*int`, `*softlist`, ...) that also accepts no value and folds
//! `NULL` to no value. `any`, `auto` and `nothing` are their own twins.

use indexmap::IndexMap;

use crate::descriptor::{
    AcceptEntry, Coercion, DescriptorFlags, ReturnEntry, TypeDescriptor, TypeDescriptorBuilder,
    TypeRef,
};
use crate::spec::TypeSpec;
use crate::tag::TypeTag;
use crate::value::{DateValue, Value};

/// Names of all builtin types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum BuiltinType {
    Any,
    Auto,
    Int,
    Float,
    Number,
    Bool,
    String,
    Date,
    Binary,
    Object,
    Hash,
    List,
    Nothing,
    Null,
    Code,
    Data,
    Reference,
    Timeout,
    SoftInt,
    SoftFloat,
    SoftNumber,
    SoftBool,
    SoftString,
    SoftDate,
    SoftList,
    IntOrFloat,
    IntFloatOrNumber,
    FloatOrNumber,
    AutoHash,
    AutoList,
    SoftAutoList,
}

impl BuiltinType {
    /// All builtins, in discriminant order.
    pub const ALL: &'static [BuiltinType] = &[
        BuiltinType::Any,
        BuiltinType::Auto,
        BuiltinType::Int,
        BuiltinType::Float,
        BuiltinType::Number,
        BuiltinType::Bool,
        BuiltinType::String,
        BuiltinType::Date,
        BuiltinType::Binary,
        BuiltinType::Object,
        BuiltinType::Hash,
        BuiltinType::List,
        BuiltinType::Nothing,
        BuiltinType::Null,
        BuiltinType::Code,
        BuiltinType::Data,
        BuiltinType::Reference,
        BuiltinType::Timeout,
        BuiltinType::SoftInt,
        BuiltinType::SoftFloat,
        BuiltinType::SoftNumber,
        BuiltinType::SoftBool,
        BuiltinType::SoftString,
        BuiltinType::SoftDate,
        BuiltinType::SoftList,
        BuiltinType::IntOrFloat,
        BuiltinType::IntFloatOrNumber,
        BuiltinType::FloatOrNumber,
        BuiltinType::AutoHash,
        BuiltinType::AutoList,
        BuiltinType::SoftAutoList,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            BuiltinType::Any => "any",
            BuiltinType::Auto => "auto",
            BuiltinType::Int => "int",
            BuiltinType::Float => "float",
            BuiltinType::Number => "number",
            BuiltinType::Bool => "bool",
            BuiltinType::String => "string",
            BuiltinType::Date => "date",
            BuiltinType::Binary => "binary",
            BuiltinType::Object => "object",
            BuiltinType::Hash => "hash",
            BuiltinType::List => "list",
            BuiltinType::Nothing => "nothing",
            BuiltinType::Null => "null",
            BuiltinType::Code => "code",
            BuiltinType::Data => "data",
            BuiltinType::Reference => "reference",
            BuiltinType::Timeout => "timeout",
            BuiltinType::SoftInt => "softint",
            BuiltinType::SoftFloat => "softfloat",
            BuiltinType::SoftNumber => "softnumber",
            BuiltinType::SoftBool => "softbool",
            BuiltinType::SoftString => "softstring",
            BuiltinType::SoftDate => "softdate",
            BuiltinType::SoftList => "softlist",
            BuiltinType::IntOrFloat => "int|float",
            BuiltinType::IntFloatOrNumber => "int|float|number",
            BuiltinType::FloatOrNumber => "float|number",
            BuiltinType::AutoHash => "hash<auto>",
            BuiltinType::AutoList => "list<auto>",
            BuiltinType::SoftAutoList => "softlist<auto>",
        }
    }

    /// Builtins that already admit no value and so are their own twin.
    pub const fn is_own_twin(self) -> bool {
        matches!(self, BuiltinType::Any | BuiltinType::Auto | BuiltinType::Nothing)
    }

    /// The builtin describing values with this tag.
    pub fn for_tag(tag: TypeTag) -> Option<BuiltinType> {
        Some(match tag {
            TypeTag::NOTHING => BuiltinType::Nothing,
            TypeTag::NULL => BuiltinType::Null,
            TypeTag::INT => BuiltinType::Int,
            TypeTag::FLOAT => BuiltinType::Float,
            TypeTag::NUMBER => BuiltinType::Number,
            TypeTag::STRING => BuiltinType::String,
            TypeTag::BOOL => BuiltinType::Bool,
            TypeTag::DATE => BuiltinType::Date,
            TypeTag::BINARY => BuiltinType::Binary,
            TypeTag::LIST => BuiltinType::List,
            TypeTag::HASH => BuiltinType::Hash,
            TypeTag::OBJECT => BuiltinType::Object,
            TypeTag::CLOSURE | TypeTag::CALLREF => BuiltinType::Code,
            TypeTag::REFERENCE => BuiltinType::Reference,
            TypeTag::ALL => BuiltinType::Any,
            _ => return None,
        })
    }
}

const SCALAR: DescriptorFlags = DescriptorFlags::CONVERTS_TO_SCALAR;
const SCAN: DescriptorFlags = DescriptorFlags::NEEDS_SCAN;

/// Builtin descriptors indexed by [`BuiltinType`].
pub(crate) struct Catalogue {
    plain: Vec<TypeRef>,
    or_nothing: Vec<TypeRef>,
}

impl Catalogue {
    pub(crate) fn build() -> Self {
        let plain: Vec<TypeRef> = BuiltinType::ALL.iter().map(|b| build_plain(*b)).collect();
        let or_nothing = BuiltinType::ALL
            .iter()
            .zip(&plain)
            .map(|(b, ty)| {
                if b.is_own_twin() {
                    ty.clone()
                } else {
                    derive_or_nothing(ty)
                }
            })
            .collect();
        Catalogue { plain, or_nothing }
    }

    #[inline]
    pub(crate) fn plain(&self, builtin: BuiltinType) -> &TypeRef {
        &self.plain[builtin as usize]
    }

    #[inline]
    pub(crate) fn or_nothing(&self, builtin: BuiltinType) -> &TypeRef {
        &self.or_nothing[builtin as usize]
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (BuiltinType, &TypeRef, &TypeRef)> {
        BuiltinType::ALL
            .iter()
            .zip(self.plain.iter().zip(&self.or_nothing))
            .map(|(b, (p, o))| (*b, p, o))
    }
}

fn to_int() -> Coercion {
    Coercion::map(|v| Value::int(v.as_int()))
}

fn to_float() -> Coercion {
    Coercion::map(|v| Value::float(v.as_float()))
}

fn to_number() -> Coercion {
    Coercion::map(|v| Value::Number(v.as_number()))
}

fn to_bool() -> Coercion {
    Coercion::map(|v| Value::bool(v.as_bool()))
}

fn to_text() -> Coercion {
    Coercion::map(|v| Value::string(v.to_text()))
}

fn to_date() -> Coercion {
    Coercion::map(|v| Value::date(v.as_date()))
}

fn constant(value: Value) -> Coercion {
    Coercion::map(move |_| value.clone())
}

fn wrap_in_list() -> Coercion {
    Coercion::map(|v| Value::list(vec![v]))
}

/// A single-tag type accepting and returning exactly `tag`.
fn base(name: &str, tag: TypeTag, flags: DescriptorFlags) -> TypeDescriptorBuilder {
    TypeDescriptor::builder(name)
        .accept_exact(tag)
        .returns_exact(tag)
        .flags(flags)
}

/// A soft scalar: `exact` as-is, every tag in `from` through `convert`, and
/// `NULL` to `zero`.
fn soft(
    name: &str,
    exact: TypeTag,
    from: &[TypeTag],
    convert: fn() -> Coercion,
    zero: Value,
) -> TypeRef {
    let mut builder = TypeDescriptor::builder(name).accept_exact(exact);
    for tag in from {
        builder = builder.accept_with(*tag, convert());
    }
    let default = zero.clone();
    builder
        .accept_with(TypeTag::NULL, constant(zero))
        .returns_exact(exact)
        .flags(SCALAR)
        .default_value(move || default.clone())
        .build()
}

fn union(name: &str, tags: &[TypeTag]) -> TypeRef {
    tags.iter()
        .fold(TypeDescriptor::builder(name), |b, t| b.accept(*t).returns(*t))
        .flags(SCALAR)
        .build()
}

fn build_plain(builtin: BuiltinType) -> TypeRef {
    use BuiltinType as B;
    use TypeTag as T;

    let name = builtin.name();
    match builtin {
        B::Any | B::Auto => TypeDescriptor::builder(name)
            .accept_exact(T::ALL)
            .returns(T::ALL)
            .flags(SCALAR | SCAN)
            .build(),
        B::Int => base(name, T::INT, SCALAR).default_value(|| Value::int(0)).build(),
        B::Float => TypeDescriptor::builder(name)
            .accept_exact(T::FLOAT)
            .accept_with(T::INT, to_float())
            .returns_exact(T::FLOAT)
            .flags(SCALAR)
            .default_value(|| Value::float(0.0))
            .build(),
        B::Number => TypeDescriptor::builder(name)
            .accept_exact(T::NUMBER)
            .accept_with(T::FLOAT, to_number())
            .accept_with(T::INT, to_number())
            .returns_exact(T::NUMBER)
            .flags(SCALAR)
            .default_value(|| Value::number(0.0))
            .build(),
        B::Bool => base(name, T::BOOL, SCALAR).default_value(|| Value::bool(false)).build(),
        B::String => base(name, T::STRING, SCALAR).default_value(|| Value::string("")).build(),
        B::Date => base(name, T::DATE, SCALAR)
            .default_value(|| Value::date(DateValue::EPOCH))
            .build(),
        B::Binary => base(name, T::BINARY, DescriptorFlags::empty())
            .default_value(|| Value::binary(Vec::new()))
            .build(),
        B::Object => base(name, T::OBJECT, SCAN).build(),
        B::Hash | B::AutoHash => base(name, T::HASH, SCAN)
            .default_value(|| Value::hash(IndexMap::new()))
            .build(),
        B::List | B::AutoList => base(name, T::LIST, SCAN)
            .default_value(|| Value::list(Vec::new()))
            .build(),
        B::Nothing => base(name, T::NOTHING, DescriptorFlags::empty()).build(),
        B::Null => base(name, T::NULL, DescriptorFlags::empty())
            .default_value(|| Value::Null)
            .build(),
        B::Code => TypeDescriptor::builder(name)
            .accept(T::CLOSURE)
            .accept(T::CALLREF)
            .returns(T::CLOSURE)
            .returns(T::CALLREF)
            .flags(SCAN)
            .build(),
        B::Data => TypeDescriptor::builder(name)
            .accept(T::STRING)
            .accept(T::BINARY)
            .returns(T::STRING)
            .returns(T::BINARY)
            .flags(SCALAR)
            .build(),
        B::Reference => base(name, T::REFERENCE, DescriptorFlags::empty()).build(),
        B::Timeout => TypeDescriptor::builder(name)
            .accept_exact(T::INT)
            .accept_with(T::DATE, Coercion::map(|v| Value::int(v.as_timeout_millis())))
            .returns_exact(T::INT)
            .flags(SCALAR)
            .default_value(|| Value::int(0))
            .build(),
        B::SoftInt => soft(
            name,
            T::INT,
            &[T::FLOAT, T::STRING, T::DATE, T::BOOL, T::NUMBER],
            to_int,
            Value::int(0),
        ),
        B::SoftFloat => soft(
            name,
            T::FLOAT,
            &[T::INT, T::STRING, T::DATE, T::BOOL, T::NUMBER],
            to_float,
            Value::float(0.0),
        ),
        B::SoftNumber => soft(
            name,
            T::NUMBER,
            &[T::FLOAT, T::INT, T::STRING, T::DATE, T::BOOL],
            to_number,
            Value::number(0.0),
        ),
        B::SoftBool => soft(
            name,
            T::BOOL,
            &[T::FLOAT, T::INT, T::STRING, T::DATE, T::NUMBER],
            to_bool,
            Value::bool(false),
        ),
        B::SoftString => soft(
            name,
            T::STRING,
            &[T::BOOL, T::INT, T::FLOAT, T::DATE, T::NUMBER],
            to_text,
            Value::string(""),
        ),
        B::SoftDate => soft(
            name,
            T::DATE,
            &[T::STRING, T::NUMBER, T::BOOL, T::FLOAT, T::INT],
            to_date,
            Value::date(DateValue::EPOCH),
        ),
        B::SoftList | B::SoftAutoList => TypeDescriptor::builder(name)
            .accept_exact(T::LIST)
            .accept_with(T::NOTHING, Coercion::map(|_| Value::list(Vec::new())))
            .accept_with(T::ALL, wrap_in_list())
            .returns_exact(T::LIST)
            .flags(SCAN)
            .default_value(|| Value::list(Vec::new()))
            .build(),
        B::IntOrFloat => union(name, &[T::INT, T::FLOAT]),
        B::IntFloatOrNumber => union(name, &[T::INT, T::FLOAT, T::NUMBER]),
        B::FloatOrNumber => union(name, &[T::FLOAT, T::NUMBER]),
    }
}

/// Derive the `*T` twin of a descriptor.
///
/// The twin accepts what `base` accepts (non-exact, without `base`'s own
/// handling of `NOTHING` and `NULL`), then no value as-is and `NULL` folded to
/// no value. Catch-all and soft list entries stay last. It returns what `base`
/// returns plus no value, and has no default.
pub(crate) fn derive_or_nothing(base: &TypeDescriptor) -> TypeRef {
    let name = format!("*{}", base.name());
    let mut builder = TypeDescriptor::builder(name).flags(base.flags());
    if let Some(desc) = base.custom_description() {
        builder = builder.description(format!("{desc} or no value (NOTHING)"));
    }

    let kept: Vec<&AcceptEntry> = base
        .accepts()
        .iter()
        .filter(|a| !matches!(a.spec, TypeSpec::Simple(TypeTag::NOTHING | TypeTag::NULL)))
        .collect();
    let (specific, catch_all): (Vec<&AcceptEntry>, Vec<&AcceptEntry>) = kept
        .into_iter()
        .partition(|a| !a.spec.is_all() && !matches!(a.spec, TypeSpec::SoftList(_)));

    for entry in specific {
        builder = builder.push_accept(AcceptEntry {
            exact: false,
            ..entry.clone()
        });
    }
    builder = builder
        .accept(TypeTag::NOTHING)
        .accept_with(TypeTag::NULL, Coercion::map(|_| Value::Nothing));
    for entry in catch_all {
        builder = builder.push_accept(entry.clone());
    }

    for ret in base.returns() {
        builder = builder.push_return(ReturnEntry {
            exact: false,
            ..ret.clone()
        });
    }
    builder.returns(TypeTag::NOTHING).build()
}

/// Whether a descriptor already admits no value.
pub(crate) fn admits_nothing(ty: &TypeDescriptor) -> bool {
    !ty.has_type()
        || ty
            .returns()
            .iter()
            .any(|r| matches!(r.spec, TypeSpec::Simple(TypeTag::NOTHING)))
}

#[cfg(test)]
mod tests;
