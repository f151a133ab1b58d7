use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_diagnostic_builder() {
    let diag = Diagnostic::error(ErrorCode::E1002)
        .with_message("test error")
        .with_label(Span::new(0, 5), "here")
        .with_note("some context")
        .with_suggestion("try this");

    assert_eq!(diag.code, ErrorCode::E1002);
    assert_eq!(diag.message, "test error");
    assert!(diag.is_error());
    assert_eq!(diag.labels.len(), 1);
    assert!(diag.labels[0].is_primary);
    assert_eq!(diag.notes.len(), 1);
    assert_eq!(diag.suggestions.len(), 1);
}

#[test]
fn test_type_mismatch_helper() {
    let diag = type_mismatch(
        Span::new(10, 15),
        "parameter 1 ('x')",
        "type 'int'",
        "type 'string'",
    );

    assert_eq!(diag.code, ErrorCode::E2001);
    assert_eq!(
        diag.message,
        "parameter 1 ('x') expects type 'int', but got type 'string' instead"
    );
    assert_eq!(diag.primary_span(), Some(Span::new(10, 15)));
    assert_eq!(diag.labels[0].message, "expected type 'int'");
    assert_eq!(diag.category(), ErrorCategory::ParseTypeError);
}

#[test]
fn test_unknown_type_helper() {
    let diag = unknown_type(Span::new(5, 11), "Widget");
    assert_eq!(diag.code, ErrorCode::E1001);
    assert!(diag.message.contains("'Widget'"));
}

#[test]
fn test_diagnostic_display_format() {
    let diag = Diagnostic::warning(ErrorCode::W1001)
        .with_message("test warning")
        .with_label(Span::new(0, 5), "primary")
        .with_secondary_label(Span::new(10, 15), "secondary")
        .with_note("a note")
        .with_suggestion("a suggestion");

    let output = diag.to_string();
    assert!(output.starts_with("warning [W1001] INVALID-OPERATION: test warning"));
    assert!(output.contains("--> 0..5: primary"));
    assert!(output.contains("secondary"));
    assert!(output.contains("= note: a note"));
    assert!(output.contains("= help: a suggestion"));
}

#[test]
fn test_primary_span_skips_secondary() {
    let diag = Diagnostic::error(ErrorCode::E2003)
        .with_secondary_label(Span::new(1, 2), "previous")
        .with_label(Span::new(7, 9), "redeclared");
    assert_eq!(diag.primary_span(), Some(Span::new(7, 9)));
}
