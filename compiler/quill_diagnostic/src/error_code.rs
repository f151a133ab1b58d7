//! Error codes for all type-engine diagnostics.
//!
//! Each code is a unique identifier (e.g., `E1001`) whose first digit names
//! the phase that raised it. Codes map onto the category strings the host
//! language exposes as exception and warning names.

use std::fmt;

/// The language-level name a diagnostic is reported under.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCategory {
    /// Compile-time decidable mismatch or bad annotation.
    ParseTypeError,
    /// No accept entry matched a concrete value.
    RuntimeTypeError,
    /// Non-fatal misuse of a value whose type never converts.
    InvalidOperation,
}

impl ErrorCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::ParseTypeError => "PARSE-TYPE-ERROR",
            ErrorCategory::RuntimeTypeError => "RUNTIME-TYPE-ERROR",
            ErrorCategory::InvalidOperation => "INVALID-OPERATION",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error codes for all type-engine diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E1xxx: type annotation resolution
/// - E2xxx: parse-time compatibility and redeclaration
/// - E3xxx: runtime acceptance
/// - W1xxx: operand warnings
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Resolution (E1xxx)
    /// Unknown type name
    E1001,
    /// Type does not take subtype declarations
    E1002,
    /// Invalid subtype declaration
    E1003,
    /// Malformed type annotation
    E1004,

    // Parse-time compatibility (E2xxx)
    /// Incompatible types
    E2001,
    /// Duplicate variant signature
    E2002,
    /// Member redeclared with a different type
    E2003,

    // Runtime acceptance (E3xxx)
    /// Value does not match the declared type
    E3001,
    /// Object's class is privately inherited
    E3002,

    // Warnings
    /// Operand never evaluates to a number
    W1001,
    /// Operand never evaluates to a boolean
    W1002,
    /// Operand never converts to a string
    W1003,
}

impl ErrorCode {
    /// All codes, in declaration order.
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::W1001,
        ErrorCode::W1002,
        ErrorCode::W1003,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::W1001 => "W1001",
            ErrorCode::W1002 => "W1002",
            ErrorCode::W1003 => "W1003",
        }
    }

    /// The category this code is reported under.
    pub const fn category(self) -> ErrorCategory {
        match self {
            ErrorCode::E1001
            | ErrorCode::E1002
            | ErrorCode::E1003
            | ErrorCode::E1004
            | ErrorCode::E2001
            | ErrorCode::E2002
            | ErrorCode::E2003 => ErrorCategory::ParseTypeError,
            ErrorCode::E3001 | ErrorCode::E3002 => ErrorCategory::RuntimeTypeError,
            ErrorCode::W1001 | ErrorCode::W1002 | ErrorCode::W1003 => {
                ErrorCategory::InvalidOperation
            }
        }
    }

    /// Check if this is an annotation resolution error (E1xxx range).
    pub fn is_resolution_error(self) -> bool {
        matches!(
            self,
            ErrorCode::E1001 | ErrorCode::E1002 | ErrorCode::E1003 | ErrorCode::E1004
        )
    }

    /// Check if this is a warning code (Wxxxx range).
    pub fn is_warning(self) -> bool {
        matches!(self.category(), ErrorCategory::InvalidOperation)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse an error code string like `"E2001"` or `"w1001"`.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
