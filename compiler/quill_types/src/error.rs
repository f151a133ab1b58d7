//! Type errors and diagnostics.
//!
//! Parse-time failures ([`ParseTypeError`]) are reported into a
//! [`DiagnosticQueue`](quill_diagnostic::DiagnosticQueue) through
//! `to_diagnostic`. Runtime failures ([`RuntimeTypeError`]) are returned to
//! the caller, which raises them as language-level exceptions.

use quill_diagnostic::{Diagnostic, ErrorCategory, ErrorCode};
use quill_ir::Span;

use crate::hierarchy::ClassId;
use crate::tag::TypeTag;

/// A value was rejected by [`Matcher::accept_input`](crate::Matcher::accept_input).
///
/// `site` is the rendered slot prefix including its trailing space, e.g.
/// `"parameter 1 ('x') "`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeTypeError {
    #[error("{site}expects {expected}, but got {found} instead")]
    Mismatch {
        site: String,
        expected: String,
        found: String,
    },
    #[error(
        "{site}expects {expected}, but got an object where this class is privately inherited instead"
    )]
    PrivateClass { site: String, expected: String },
}

impl RuntimeTypeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RuntimeTypeError::Mismatch { .. } => ErrorCode::E3001,
            RuntimeTypeError::PrivateClass { .. } => ErrorCode::E3002,
        }
    }

    #[inline]
    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }

    pub fn is_private_access(&self) -> bool {
        matches!(self, RuntimeTypeError::PrivateClass { .. })
    }

    pub fn to_diagnostic(&self, span: Span) -> Diagnostic {
        let diag = Diagnostic::error(self.code()).with_message(self.to_string());
        match self {
            RuntimeTypeError::Mismatch { expected, .. } => {
                diag.with_label(span, format!("expected {expected}"))
            }
            RuntimeTypeError::PrivateClass { .. } => diag
                .with_label(span, "class is not accessible here")
                .with_note("private inheritance is only visible inside the inheriting class"),
        }
    }
}

/// A parse-time type error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseTypeError {
    #[error("cannot resolve type '{name}'")]
    UnknownType { name: String },
    #[error("cannot resolve '{text}'; '{name}' is not a declared hash type")]
    UnknownRecord { text: String, name: String },
    #[error("cannot resolve '{text}'; type '{base}' does not take subtype declarations")]
    NoSubtypes { text: String, base: String },
    #[error("cannot resolve '{text}' with {count} type arguments; base type '{base}' takes {takes}")]
    SubtypeArity {
        text: String,
        count: usize,
        base: String,
        takes: &'static str,
    },
    #[error(
        "invalid complex hash type '{text}'; hash key type must be 'string'; cannot declare a hash with key type '{key}'"
    )]
    InvalidHashKey { text: String, key: String },
    #[error("malformed type annotation '{text}': {reason}")]
    Malformed { text: String, reason: String },
    #[error("{context} expects {expected}, but got {found} instead")]
    Incompatible {
        context: String,
        expected: String,
        found: String,
    },
    #[error("variant '{name}({signature})' is already declared")]
    DuplicateVariant { name: String, signature: String },
    #[error(
        "member '{member}' was already declared with type '{previous}'; cannot redeclare it with type '{new}'"
    )]
    MemberRedeclared {
        member: String,
        previous: String,
        new: String,
    },
}

impl ParseTypeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ParseTypeError::UnknownType { .. } | ParseTypeError::UnknownRecord { .. } => {
                ErrorCode::E1001
            }
            ParseTypeError::NoSubtypes { .. } => ErrorCode::E1002,
            ParseTypeError::SubtypeArity { .. } | ParseTypeError::InvalidHashKey { .. } => {
                ErrorCode::E1003
            }
            ParseTypeError::Malformed { .. } => ErrorCode::E1004,
            ParseTypeError::Incompatible { .. } => ErrorCode::E2001,
            ParseTypeError::DuplicateVariant { .. } => ErrorCode::E2002,
            ParseTypeError::MemberRedeclared { .. } => ErrorCode::E2003,
        }
    }

    /// Convert to a diagnostic with helpful suggestions.
    pub fn to_diagnostic(&self, span: Span) -> Diagnostic {
        let diag = Diagnostic::error(self.code()).with_message(self.to_string());
        match self {
            ParseTypeError::UnknownType { name } => {
                quill_diagnostic::unknown_type(span, name).with_suggestion(format!(
                    "check spelling, or declare a class or hashdecl named '{name}'"
                ))
            }
            ParseTypeError::UnknownRecord { name, .. } => diag
                .with_label(span, format!("'{name}' is not a hashdecl"))
                .with_suggestion("use 'hash<string, T>' for a hash with typed values"),
            ParseTypeError::NoSubtypes { base, .. } => diag
                .with_label(span, format!("'{base}' is not a container type"))
                .with_suggestion(format!("use plain '{base}'")),
            ParseTypeError::SubtypeArity { base, .. } => {
                diag.with_label(span, format!("wrong number of arguments for '{base}'"))
            }
            ParseTypeError::InvalidHashKey { key, .. } => diag
                .with_label(span, format!("key type '{key}' is not allowed"))
                .with_suggestion("hash keys are always strings; use 'hash<string, T>'"),
            ParseTypeError::Malformed { .. } => diag.with_label(span, "in this annotation"),
            ParseTypeError::Incompatible {
                context,
                expected,
                found,
            } => quill_diagnostic::type_mismatch(span, context, expected, found),
            ParseTypeError::DuplicateVariant { .. } => {
                diag.with_label(span, "this signature duplicates an earlier variant")
            }
            ParseTypeError::MemberRedeclared { previous, .. } => diag
                .with_label(span, "redeclared here")
                .with_note(format!("the first declaration has type '{previous}'")),
        }
    }
}

/// A resolution failure, located relative to the resolved text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{error}")]
pub struct ResolveError {
    pub error: ParseTypeError,
    pub span: Span,
}

impl ResolveError {
    pub fn new(error: ParseTypeError, span: Span) -> Self {
        ResolveError { error, span }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        self.error.to_diagnostic(self.span)
    }
}

/// A registry mutation was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("type tag {0} is already registered")]
    DuplicateTag(TypeTag),
    #[error("type tag {0} is reserved for builtin types")]
    ReservedTag(TypeTag),
    #[error("the name '{0}' is already declared")]
    DuplicateName(String),
    #[error("unknown class {0}")]
    UnknownClass(ClassId),
    #[error("identifier space exhausted")]
    Exhausted,
}

#[cfg(test)]
mod tests;
