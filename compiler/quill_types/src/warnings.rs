//! Operand warnings and member redeclaration checks.
//!
//! An operand whose declared type can never be read as a scalar still
//! evaluates, just to a fixed result. That is almost always a mistake, so it
//! is reported as a warning rather than an error.

use quill_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use quill_ir::Span;

use crate::descriptor::TypeDescriptor;
use crate::error::ParseTypeError;

fn never_scalar(ty: &TypeDescriptor) -> bool {
    ty.has_type() && !ty.can_convert_to_scalar()
}

fn warn(queue: &mut DiagnosticQueue, code: ErrorCode, span: Span, message: String) -> bool {
    queue.add(
        Diagnostic::warning(code)
            .with_message(message)
            .with_label(span, "operand used here"),
    )
}

/// Warn when `ty` never evaluates to a number. `preface` names the operand,
/// e.g. `"the left-hand operand of '+' is "`.
///
/// Returns whether a warning was emitted.
pub fn check_non_numeric_warning(
    ty: &TypeDescriptor,
    span: Span,
    preface: &str,
    queue: &mut DiagnosticQueue,
) -> bool {
    if !never_scalar(ty) {
        return false;
    }
    let message = format!(
        "{preface}{}, which does not evaluate to a numeric type, \
         therefore will always evaluate to 0 at runtime",
        ty.description()
    );
    warn(queue, ErrorCode::W1001, span, message)
}

/// Warn when `ty` never evaluates to a number or boolean.
pub fn check_non_boolean_warning(
    ty: &TypeDescriptor,
    span: Span,
    preface: &str,
    queue: &mut DiagnosticQueue,
) -> bool {
    if !never_scalar(ty) {
        return false;
    }
    let message = format!(
        "{preface}{}, which does not evaluate to a numeric or boolean type, \
         therefore will always evaluate to False at runtime",
        ty.description()
    );
    warn(queue, ErrorCode::W1002, span, message)
}

/// Warn when `ty` can never be converted to a string.
pub fn check_non_string_warning(
    ty: &TypeDescriptor,
    span: Span,
    preface: &str,
    queue: &mut DiagnosticQueue,
) -> bool {
    if !never_scalar(ty) {
        return false;
    }
    let message = format!(
        "{preface}{}, which cannot be converted to a string, \
         therefore will always evaluate to an empty string at runtime",
        ty.description()
    );
    warn(queue, ErrorCode::W1003, span, message)
}

/// Reject redeclaring `member` with a type not `equal` to its first
/// declaration.
pub fn check_member_redeclaration(
    member: &str,
    previous: &TypeDescriptor,
    new: &TypeDescriptor,
) -> Result<(), ParseTypeError> {
    if TypeDescriptor::equal(previous, new) {
        return Ok(());
    }
    Err(ParseTypeError::MemberRedeclared {
        member: member.to_owned(),
        previous: previous.name().to_owned(),
        new: new.name().to_owned(),
    })
}

#[cfg(test)]
mod tests;
