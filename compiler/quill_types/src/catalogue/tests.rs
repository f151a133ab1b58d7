use pretty_assertions::assert_eq;

use super::*;

fn accept_tags(ty: &TypeDescriptor) -> Vec<TypeTag> {
    ty.accepts().iter().map(|a| a.spec.tag()).collect()
}

#[test]
fn every_builtin_is_indexed_by_discriminant() {
    for (index, builtin) in BuiltinType::ALL.iter().enumerate() {
        assert_eq!(*builtin as usize, index, "{builtin:?}");
    }
}

#[test]
fn names_are_unique_and_match_descriptors() {
    let catalogue = Catalogue::build();
    let mut seen = rustc_hash::FxHashSet::default();
    for (builtin, plain, or_nothing) in catalogue.iter() {
        assert!(seen.insert(builtin.name()), "duplicate name {}", builtin.name());
        assert_eq!(plain.name(), builtin.name());
        if builtin.is_own_twin() {
            assert_eq!(plain, or_nothing);
        } else {
            assert_eq!(or_nothing.name(), format!("*{}", builtin.name()));
        }
    }
}

#[test]
fn for_tag_maps_value_tags() {
    assert_eq!(BuiltinType::for_tag(TypeTag::INT), Some(BuiltinType::Int));
    assert_eq!(BuiltinType::for_tag(TypeTag::CALLREF), Some(BuiltinType::Code));
    assert_eq!(BuiltinType::for_tag(TypeTag::ALL), Some(BuiltinType::Any));
    assert_eq!(BuiltinType::for_tag(TypeTag::from_raw(400)), None);
}

#[test]
fn soft_scalar_entries() {
    let catalogue = Catalogue::build();
    let soft_int = catalogue.plain(BuiltinType::SoftInt);
    assert_eq!(
        accept_tags(soft_int),
        vec![
            TypeTag::INT,
            TypeTag::FLOAT,
            TypeTag::STRING,
            TypeTag::DATE,
            TypeTag::BOOL,
            TypeTag::NUMBER,
            TypeTag::NULL,
        ]
    );
    assert!(soft_int.accepts()[0].exact);
    assert!(soft_int.accepts()[1..].iter().all(|a| a.coercion.is_some()));
    assert_eq!(soft_int.default_value(), Some(Value::int(0)));
    assert!(soft_int.can_convert_to_scalar());
}

#[test]
fn or_nothing_twin_entries() {
    let catalogue = Catalogue::build();
    let twin = catalogue.or_nothing(BuiltinType::SoftInt);
    assert_eq!(
        accept_tags(twin),
        vec![
            TypeTag::INT,
            TypeTag::FLOAT,
            TypeTag::STRING,
            TypeTag::DATE,
            TypeTag::BOOL,
            TypeTag::NUMBER,
            TypeTag::NOTHING,
            TypeTag::NULL,
        ]
    );
    assert!(twin.accepts().iter().all(|a| !a.exact));
    assert!(twin.returns().iter().all(|r| !r.exact));
    assert_eq!(twin.returns().last().map(|r| r.spec.tag()), Some(TypeTag::NOTHING));
    assert!(!twin.has_default_value());
    assert_eq!(twin.flags(), catalogue.plain(BuiltinType::SoftInt).flags());
}

#[test]
fn soft_list_twin_keeps_catch_all_last() {
    let catalogue = Catalogue::build();
    let plain = catalogue.plain(BuiltinType::SoftList);
    assert_eq!(
        accept_tags(plain),
        vec![TypeTag::LIST, TypeTag::NOTHING, TypeTag::ALL]
    );
    let twin = catalogue.or_nothing(BuiltinType::SoftList);
    assert_eq!(
        accept_tags(twin),
        vec![TypeTag::LIST, TypeTag::NOTHING, TypeTag::NULL, TypeTag::ALL]
    );
}

#[test]
fn twin_keeps_custom_description() {
    let widget = TypeDescriptor::builder("Widget")
        .description("an object of class 'Widget'")
        .accept_exact(TypeTag::OBJECT)
        .build();
    let twin = derive_or_nothing(&widget);
    assert_eq!(twin.name(), "*Widget");
    assert_eq!(
        twin.description(),
        "an object of class 'Widget' or no value (NOTHING)"
    );

    let catalogue = Catalogue::build();
    assert_eq!(
        catalogue.or_nothing(BuiltinType::Int).description(),
        "type '*int'"
    );
}

#[test]
fn admits_nothing_queries() {
    let catalogue = Catalogue::build();
    assert!(admits_nothing(catalogue.plain(BuiltinType::Any)));
    assert!(admits_nothing(catalogue.plain(BuiltinType::Nothing)));
    assert!(admits_nothing(catalogue.or_nothing(BuiltinType::Int)));
    assert!(!admits_nothing(catalogue.plain(BuiltinType::Int)));
    assert!(!admits_nothing(catalogue.plain(BuiltinType::SoftList)));
}

#[test]
fn unions_have_no_exact_entries() {
    let catalogue = Catalogue::build();
    let ty = catalogue.plain(BuiltinType::IntFloatOrNumber);
    assert_eq!(
        accept_tags(ty),
        vec![TypeTag::INT, TypeTag::FLOAT, TypeTag::NUMBER]
    );
    assert!(ty.accepts().iter().all(|a| !a.exact && a.coercion.is_none()));
    assert!(!ty.returns_single());
}

#[test]
fn defaults() {
    let catalogue = Catalogue::build();
    let cases = [
        (BuiltinType::Int, Some(Value::int(0))),
        (BuiltinType::Float, Some(Value::float(0.0))),
        (BuiltinType::Bool, Some(Value::bool(false))),
        (BuiltinType::String, Some(Value::string(""))),
        (BuiltinType::List, Some(Value::list(Vec::new()))),
        (BuiltinType::Null, Some(Value::Null)),
        (BuiltinType::Object, None),
        (BuiltinType::Code, None),
        (BuiltinType::Any, None),
    ];
    for (builtin, expected) in cases {
        assert_eq!(catalogue.plain(builtin).default_value(), expected, "{builtin:?}");
    }
}

#[test]
fn timeout_coerces_dates() {
    let catalogue = Catalogue::build();
    let timeout = catalogue.plain(BuiltinType::Timeout);
    assert_eq!(accept_tags(timeout), vec![TypeTag::INT, TypeTag::DATE]);
    assert!(timeout.may_require_coercion(&Value::date(DateValue::relative_millis(5))));
    assert!(!timeout.may_require_coercion(&Value::int(5)));
}
