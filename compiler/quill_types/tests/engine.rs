//! End-to-end tests for the type engine.
//!
//! Each test drives the public API the way a front end and runtime would:
//! resolve annotations, decide at parse time, then accept concrete values.
//! Set `RUST_LOG=quill_types=debug` to see registry and selection traces.

use std::sync::{Arc, Once};

use pretty_assertions::assert_eq;
use quill_types::{
    AcceptSite, BuiltinType, ClassTable, MatchResult, RecordMember, Selection, TypeOptions,
    TypeRef, TypeRegistry, Value, VariantSet,
};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_test_writer())
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

struct Engine {
    registry: TypeRegistry,
    base: quill_types::ClassId,
    derived: quill_types::ClassId,
}

fn engine(options: TypeOptions) -> Engine {
    init_tracing();
    let classes = Arc::new(ClassTable::new());
    let base = classes.declare("Base", &[]).unwrap();
    let derived = classes.declare("Derived", &[(base, false)]).unwrap();
    let registry = TypeRegistry::init(options, classes);
    registry.register_class(base).unwrap();
    registry.register_class(derived).unwrap();
    Engine {
        registry,
        base,
        derived,
    }
}

// =============================================================================
// Parse time, then run time
// =============================================================================

#[test]
fn subclass_argument_is_checked_at_runtime() {
    let e = engine(TypeOptions::empty());
    let r = &e.registry;
    let base = r.resolve_type_name("Base", false).unwrap();
    let derived = r.resolve_type_name("Derived", false).unwrap();

    let parse = r.matcher().parse_accepts(&base, &derived);
    assert_eq!(parse.result, MatchResult::Ambiguous);
    assert_eq!(
        r.matcher().runtime_accepts(&base, &Value::object(e.derived)),
        MatchResult::Ident
    );

    assert_eq!(
        r.matcher().parse_accepts(&derived, &base).result,
        MatchResult::NotEqual
    );
    assert_eq!(
        r.matcher().runtime_accepts(&derived, &Value::object(e.base)),
        MatchResult::NotEqual
    );
}

#[test]
fn optional_argument_may_not_match() {
    let e = engine(TypeOptions::empty());
    let r = &e.registry;
    let string = r.resolve_type_name("string", false).unwrap();
    let maybe = r.resolve_type_name("*string", false).unwrap();

    let parse = r.matcher().parse_accepts(&string, &maybe);
    assert_eq!(parse.result, MatchResult::Ambiguous);
    assert!(parse.may_not_match);

    let strict = engine(TypeOptions::STRICT_TYPES);
    let r = &strict.registry;
    let string = r.resolve_type_name("string", false).unwrap();
    let maybe = r.resolve_type_name("*string", false).unwrap();
    assert_eq!(
        r.matcher().parse_accepts(&string, &maybe).result,
        MatchResult::NotEqual
    );
}

#[test]
fn incompatible_declaration_is_reported() {
    let e = engine(TypeOptions::empty());
    let r = &e.registry;
    let int = r.resolve_type_name("int", false).unwrap();
    let string = r.resolve_type_name("string", false).unwrap();
    let err = r
        .matcher()
        .check_parse_accepts(&int, &string, "parameter 1 ('x') of f()")
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "parameter 1 ('x') of f() expects type 'int', but got type 'string' instead"
    );
}

// =============================================================================
// Acceptance and coercion
// =============================================================================

#[test]
fn soft_list_binding() {
    let e = engine(TypeOptions::empty());
    let r = &e.registry;
    let ty = r.resolve_type_name("softlist<int>", false).unwrap();
    let site = AcceptSite::param(1, "xs");

    let wrapped = r.matcher().accept_input(&ty, Value::int(5), &site).unwrap();
    assert_eq!(wrapped.type_name(), "list<int>");
    assert_eq!(wrapped.as_list().map(|l| l.items.clone()), Some(vec![Value::int(5)]));

    let original = Value::list(vec![Value::int(1), Value::int(2), Value::int(3)]);
    let tagged = r.matcher().accept_input(&ty, original.clone(), &site).unwrap();
    assert_eq!(tagged.type_name(), "list<int>");
    assert_eq!(original.type_name(), "list");
    assert_eq!(
        tagged.as_list().map(|l| l.items.len()),
        original.as_list().map(|l| l.items.len())
    );
}

#[test]
fn record_member_defaults_and_acceptance() {
    let e = engine(TypeOptions::empty());
    let r = &e.registry;
    let float = r.builtin(BuiltinType::Float);
    let decl = r
        .declare_record("Sample", vec![RecordMember::new("weight", float)])
        .unwrap();
    let ty = r.resolve_type_name("hash<Sample>", false).unwrap();

    let instance = r.get_default_value(&ty).unwrap();
    assert_eq!(instance.type_name(), "hash<Sample>");
    assert_eq!(
        instance.as_hash().and_then(|h| h.entries.get("weight").cloned()),
        Some(Value::float(0.0))
    );

    let member = &decl.members[0];
    let site = AcceptSite::member("weight");
    assert_eq!(
        r.matcher().accept_input(&member.ty, Value::int(2), &site).unwrap(),
        Value::float(2.0)
    );
}

// =============================================================================
// Registry identity
// =============================================================================

#[test]
fn repeated_resolution_is_identical() {
    let e = engine(TypeOptions::empty());
    let r = &e.registry;
    let first = r.resolve_type_name("hash<string, int>", false).unwrap();
    let second = r.resolve_type_name("hash<string, int>", false).unwrap();
    assert_eq!(first, second);
}

#[test]
fn every_builtin_name_round_trips() {
    let e = engine(TypeOptions::empty());
    let r = &e.registry;
    for builtin in BuiltinType::ALL {
        for ty in [r.builtin(*builtin), r.builtin_or_nothing(*builtin)] {
            let name = r.get_type_name(&ty);
            assert_eq!(r.resolve_type_name(&name, false).unwrap(), ty, "{name}");
        }
    }
}

#[test]
fn concurrent_factory_calls_agree() {
    let e = engine(TypeOptions::empty());
    let r = &e.registry;
    let elements: Vec<_> = [BuiltinType::Int, BuiltinType::String, BuiltinType::Float]
        .iter()
        .map(|b| r.builtin(*b))
        .collect();

    let elements = elements.as_slice();
    let per_thread: Vec<Vec<_>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..6)
            .map(|_| {
                s.spawn(move || {
                    elements
                        .iter()
                        .flat_map(|el| {
                            [
                                r.get_complex_list_type(el),
                                r.get_complex_hash_or_nothing_type(el),
                                r.resolve_type_name(&format!("softlist<{}>", el.name()), false)
                                    .unwrap(),
                            ]
                        })
                        .collect::<Vec<TypeRef>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for types in &per_thread[1..] {
        assert_eq!(types, &per_thread[0]);
    }
}

// =============================================================================
// Overloads
// =============================================================================

#[test]
fn overload_resolution_end_to_end() {
    let e = engine(TypeOptions::empty());
    let r = &e.registry;
    let mut set = VariantSet::new("describe");
    let derived_variant = set
        .add(vec![r.resolve_type_name("Derived", false).unwrap()])
        .unwrap();
    let base_variant = set.add(vec![r.resolve_type_name("Base", false).unwrap()]).unwrap();
    let int_variant = set.add(vec![r.resolve_type_name("int", false).unwrap()]).unwrap();

    let int = r.builtin(BuiltinType::Int);
    assert_eq!(set.parse_select(r, &[int]), Selection::Resolved(int_variant));
    let derived = r.resolve_type_name("Derived", false).unwrap();
    assert_eq!(set.parse_select(r, &[derived]), Selection::Resolved(derived_variant));

    let object = r.builtin(BuiltinType::Object);
    let Selection::Deferred(candidates) = set.parse_select(r, &[object]) else {
        panic!("an untyped object argument must be checked at run time");
    };
    assert_eq!(candidates, vec![derived_variant, base_variant]);

    let args = [Value::object(e.derived)];
    assert_eq!(
        set.runtime_select_among(r, candidates.iter().copied(), &args),
        Some(derived_variant)
    );
    assert_eq!(
        set.runtime_select(r, &[Value::object(e.base)]),
        Some(base_variant)
    );
}

#[test]
fn shutdown_after_use() {
    let e = engine(TypeOptions::empty());
    let list = e.registry.resolve_type_name("list<Base>", false).unwrap();
    e.registry.shutdown();
    assert_eq!(list.name(), "list<Base>");
}
