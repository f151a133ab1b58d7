use super::*;
use crate::descriptor::TypeDescriptor;

fn simple(name: &str, tag: TypeTag) -> TypeRef {
    TypeDescriptor::builder(name).accept_exact(tag).build()
}

#[test]
fn results_order_from_worst_to_best() {
    assert!(MatchResult::NotEqual < MatchResult::Wildcard);
    assert!(MatchResult::Wildcard < MatchResult::Ambiguous);
    assert!(MatchResult::Ambiguous < MatchResult::Near);
    assert!(MatchResult::Near < MatchResult::Ident);
    assert_eq!(MatchResult::Near.max(MatchResult::Ambiguous), MatchResult::Near);
}

#[test]
fn ranks_follow_order() {
    let ranks: Vec<u32> = [
        MatchResult::NotEqual,
        MatchResult::Wildcard,
        MatchResult::Ambiguous,
        MatchResult::Near,
        MatchResult::Ident,
    ]
    .iter()
    .map(|r| r.rank())
    .collect();
    assert_eq!(ranks, vec![0, 1, 2, 3, 4]);
    assert!(!MatchResult::NotEqual.is_match());
    assert!(MatchResult::Wildcard.is_match());
}

#[test]
fn display_names() {
    assert_eq!(MatchResult::Ident.to_string(), "IDENT");
    assert_eq!(MatchResult::NotEqual.to_string(), "NOT_EQUAL");
    assert_eq!(MatchResult::Wildcard.to_string(), "WILDCARD");
}

#[test]
fn spec_tags() {
    let int = simple("int", TypeTag::INT);
    assert_eq!(TypeSpec::Class(ClassId::from_raw(1)).tag(), TypeTag::OBJECT);
    assert_eq!(TypeSpec::Hash(int.clone()).tag(), TypeTag::HASH);
    assert_eq!(TypeSpec::SoftList(int.clone()).tag(), TypeTag::LIST);
    assert_eq!(TypeSpec::Reference(int).tag(), TypeTag::REFERENCE);
    assert!(TypeSpec::ALL.is_all());
    assert!(!TypeSpec::NOTHING.is_all());
}

#[test]
fn params() {
    let int = simple("int", TypeTag::INT);
    let spec = TypeSpec::List(int.clone());
    let (kind, element) = spec.param().unwrap();
    assert_eq!(kind, ParamKind::List);
    assert!(TypeRef::ptr_eq(element, &int));
    assert!(TypeSpec::Simple(TypeTag::LIST).param().is_none());
}

#[test]
fn match_against_tags() {
    let int = simple("int", TypeTag::INT);
    assert_eq!(TypeSpec::Simple(TypeTag::INT).match_tag(TypeTag::INT), MatchResult::Ident);
    assert_eq!(TypeSpec::Simple(TypeTag::INT).match_tag(TypeTag::FLOAT), MatchResult::NotEqual);
    assert_eq!(TypeSpec::ALL.match_tag(TypeTag::DATE), MatchResult::Ambiguous);
    assert_eq!(TypeSpec::List(int).match_tag(TypeTag::LIST), MatchResult::Ambiguous);
    assert_eq!(
        TypeSpec::Class(ClassId::from_raw(0)).match_tag(TypeTag::HASH),
        MatchResult::NotEqual
    );
}

#[test]
fn names() {
    let int = simple("int", TypeTag::INT);
    let no_classes = |_| None;
    assert_eq!(TypeSpec::Simple(TypeTag::STRING).name(no_classes), "string");
    assert_eq!(TypeSpec::Hash(int.clone()).name(no_classes), "hash<string, int>");
    assert_eq!(TypeSpec::SoftList(int).name(no_classes), "softlist<int>");
    assert_eq!(TypeSpec::Class(ClassId::from_raw(4)).name(no_classes), "class#4");
    assert_eq!(
        TypeSpec::Class(ClassId::from_raw(4)).name(|_| Some("Widget".to_owned())),
        "Widget"
    );
}

#[test]
fn container_specs_compare_structurally() {
    let a = simple("int", TypeTag::INT);
    let b = simple("int", TypeTag::INT);
    let s = simple("string", TypeTag::STRING);
    assert!(!TypeRef::ptr_eq(&a, &b));
    assert_eq!(TypeSpec::List(a.clone()), TypeSpec::List(b));
    assert_ne!(TypeSpec::List(a.clone()), TypeSpec::List(s));
    assert_ne!(TypeSpec::List(a.clone()), TypeSpec::SoftList(a));
}
