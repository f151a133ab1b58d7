use pretty_assertions::assert_eq;
use quill_diagnostic::Severity;

use super::*;

#[test]
fn mismatch_message() {
    let err = RuntimeTypeError::Mismatch {
        site: "parameter 1 ('x') ".to_owned(),
        expected: "type 'int'".to_owned(),
        found: "type 'string'".to_owned(),
    };
    assert_eq!(
        err.to_string(),
        "parameter 1 ('x') expects type 'int', but got type 'string' instead"
    );
    assert_eq!(err.code(), ErrorCode::E3001);
    assert_eq!(err.category(), ErrorCategory::RuntimeTypeError);
    assert!(!err.is_private_access());
}

#[test]
fn private_class_message() {
    let err = RuntimeTypeError::PrivateClass {
        site: "member 'owner' ".to_owned(),
        expected: "an object of class 'Base'".to_owned(),
    };
    assert_eq!(
        err.to_string(),
        "member 'owner' expects an object of class 'Base', but got an object where this class \
         is privately inherited instead"
    );
    assert!(err.is_private_access());
    assert_eq!(err.code(), ErrorCode::E3002);
}

#[test]
fn runtime_diagnostic() {
    let err = RuntimeTypeError::PrivateClass {
        site: String::new(),
        expected: "an object of class 'Base'".to_owned(),
    };
    let diag = err.to_diagnostic(Span::new(4, 9));
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(diag.primary_span(), Some(Span::new(4, 9)));
    assert_eq!(diag.notes.len(), 1);
}

#[test]
fn parse_error_codes() {
    let cases = [
        (
            ParseTypeError::UnknownType {
                name: "Foo".to_owned(),
            },
            ErrorCode::E1001,
        ),
        (
            ParseTypeError::NoSubtypes {
                text: "int<string>".to_owned(),
                base: "int".to_owned(),
            },
            ErrorCode::E1002,
        ),
        (
            ParseTypeError::InvalidHashKey {
                text: "hash<int, int>".to_owned(),
                key: "int".to_owned(),
            },
            ErrorCode::E1003,
        ),
        (
            ParseTypeError::Malformed {
                text: "list<".to_owned(),
                reason: "expected a type name".to_owned(),
            },
            ErrorCode::E1004,
        ),
        (
            ParseTypeError::DuplicateVariant {
                name: "f".to_owned(),
                signature: "int".to_owned(),
            },
            ErrorCode::E2002,
        ),
    ];
    for (err, code) in cases {
        assert_eq!(err.code(), code, "{err}");
        assert_eq!(code.category(), ErrorCategory::ParseTypeError);
    }
}

#[test]
fn parse_error_messages() {
    let arity = ParseTypeError::SubtypeArity {
        text: "list<int, int>".to_owned(),
        count: 2,
        base: "list".to_owned(),
        takes: "a single type name giving list element value type",
    };
    assert_eq!(
        arity.to_string(),
        "cannot resolve 'list<int, int>' with 2 type arguments; base type 'list' takes a single \
         type name giving list element value type"
    );

    let incompatible = ParseTypeError::Incompatible {
        context: "parameter 1 ('x') of f()".to_owned(),
        expected: "type 'int'".to_owned(),
        found: "type 'string'".to_owned(),
    };
    assert_eq!(
        incompatible.to_string(),
        "parameter 1 ('x') of f() expects type 'int', but got type 'string' instead"
    );
}

#[test]
fn incompatible_diagnostic() {
    let err = ParseTypeError::Incompatible {
        context: "member 'count'".to_owned(),
        expected: "type 'int'".to_owned(),
        found: "no value".to_owned(),
    };
    let diag = err.to_diagnostic(Span::new(2, 7));
    assert_eq!(diag.code, ErrorCode::E2001);
    assert_eq!(diag.message, err.to_string());
    assert_eq!(diag.primary_span(), Some(Span::new(2, 7)));
    assert_eq!(diag.labels[0].message, "expected type 'int'");
}

#[test]
fn unknown_type_diagnostic_suggests_declaring() {
    let err = ParseTypeError::UnknownType {
        name: "Widget".to_owned(),
    };
    let diag = err.to_diagnostic(Span::new(0, 6));
    assert_eq!(diag.code, ErrorCode::E1001);
    assert!(diag.message.contains("Widget"));
    assert_eq!(diag.suggestions.len(), 1);
}

#[test]
fn resolve_error_keeps_span() {
    let err = ResolveError::new(
        ParseTypeError::UnknownType {
            name: "Nope".to_owned(),
        },
        Span::new(5, 9),
    );
    assert_eq!(err.to_string(), "cannot resolve type 'Nope'");
    assert_eq!(err.to_diagnostic().primary_span(), Some(Span::new(5, 9)));
}

#[test]
fn registry_errors() {
    assert_eq!(
        RegistryError::DuplicateTag(TypeTag::from_raw(300)).to_string(),
        "type tag external#300 is already registered"
    );
    assert_eq!(
        RegistryError::ReservedTag(TypeTag::INT).to_string(),
        "type tag int is reserved for builtin types"
    );
}
