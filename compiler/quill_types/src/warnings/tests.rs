use std::sync::Arc;

use pretty_assertions::assert_eq;
use quill_diagnostic::Severity;

use super::*;
use crate::catalogue::BuiltinType;
use crate::hierarchy::ClassTable;
use crate::options::TypeOptions;
use crate::registry::TypeRegistry;

fn registry() -> TypeRegistry {
    TypeRegistry::init(TypeOptions::empty(), Arc::new(ClassTable::new()))
}

const PREFACE: &str = "the left-hand operand of '+' is ";

#[test]
fn numeric_warning() {
    let r = registry();
    let mut queue = DiagnosticQueue::new();
    let list = r.builtin(BuiltinType::List);
    assert!(check_non_numeric_warning(&list, Span::new(3, 7), PREFACE, &mut queue));

    let diags = queue.flush();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, ErrorCode::W1001);
    assert_eq!(diags[0].severity, Severity::Warning);
    assert_eq!(diags[0].primary_span(), Some(Span::new(3, 7)));
    assert_eq!(
        diags[0].message,
        "the left-hand operand of '+' is type 'list', which does not evaluate to a numeric \
         type, therefore will always evaluate to 0 at runtime"
    );
}

#[test]
fn boolean_warning() {
    let r = registry();
    let mut queue = DiagnosticQueue::new();
    let hash = r.builtin(BuiltinType::Hash);
    assert!(check_non_boolean_warning(&hash, Span::new(0, 1), "", &mut queue));
    let diags = queue.flush();
    assert_eq!(diags[0].code, ErrorCode::W1002);
    assert_eq!(
        diags[0].message,
        "type 'hash', which does not evaluate to a numeric or boolean type, therefore will \
         always evaluate to False at runtime"
    );
}

#[test]
fn string_warning() {
    let r = registry();
    let mut queue = DiagnosticQueue::new();
    let code = r.builtin(BuiltinType::Code);
    assert!(check_non_string_warning(&code, Span::new(0, 1), "", &mut queue));
    assert_eq!(queue.warning_count(), 1);
    assert_eq!(queue.error_count(), 0);
    assert!(queue.has_errors().is_none());
}

#[test]
fn scalar_and_untyped_operands_are_quiet() {
    let r = registry();
    let mut queue = DiagnosticQueue::new();
    for builtin in [
        BuiltinType::Int,
        BuiltinType::SoftString,
        BuiltinType::Data,
        BuiltinType::IntOrFloat,
        BuiltinType::Any,
        BuiltinType::Auto,
    ] {
        let ty = r.builtin(builtin);
        assert!(!check_non_numeric_warning(&ty, Span::DUMMY, "", &mut queue));
        assert!(!check_non_boolean_warning(&ty, Span::DUMMY, "", &mut queue));
        assert!(!check_non_string_warning(&ty, Span::DUMMY, "", &mut queue));
    }
    assert_eq!(queue.peek().count(), 0);
}

#[test]
fn or_nothing_twin_warns_like_its_base() {
    let r = registry();
    let mut queue = DiagnosticQueue::new();
    let twin = r.builtin_or_nothing(BuiltinType::List);
    assert!(check_non_numeric_warning(&twin, Span::DUMMY, "", &mut queue));
    let twin = r.builtin_or_nothing(BuiltinType::Int);
    assert!(!check_non_numeric_warning(&twin, Span::DUMMY, "", &mut queue));
}

mod redeclaration {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn same_type_is_allowed() {
        let r = registry();
        let int = r.builtin(BuiltinType::Int);
        assert_eq!(check_member_redeclaration("x", &int, &int), Ok(()));

        let list = r.get_complex_list_type(&int);
        let rebuilt = crate::complex::list_of(&int);
        assert_eq!(check_member_redeclaration("xs", &list, &rebuilt), Ok(()));
    }

    #[test]
    fn different_type_is_rejected() {
        let r = registry();
        let err = check_member_redeclaration(
            "x",
            &r.builtin(BuiltinType::Int),
            &r.builtin(BuiltinType::String),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "member 'x' was already declared with type 'int'; cannot redeclare it with type \
             'string'"
        );
        assert_eq!(err.code(), ErrorCode::E2003);
    }

    #[test]
    fn or_nothing_is_a_different_type() {
        let r = registry();
        assert!(check_member_redeclaration(
            "x",
            &r.builtin(BuiltinType::Int),
            &r.builtin_or_nothing(BuiltinType::Int),
        )
        .is_err());
    }
}
