//! Diagnostic system for type annotation and coercion errors.
//!
//! Every diagnostic carries:
//! - An error code with a category (`PARSE-TYPE-ERROR`, `RUNTIME-TYPE-ERROR`,
//!   `INVALID-OPERATION`)
//! - A message stating what went wrong
//! - A primary span pointing into the annotation or expression
//! - Optional notes and suggestions
//!
//! # Error Guarantees
//!
//! [`ErrorGuaranteed`] is type-level proof that at least one error was
//! emitted into a [`DiagnosticQueue`]. Resolution code that returns
//! `Result<_, ErrorGuaranteed>` cannot fail silently.
//!
//! ```text
//! let guarantee = queue.emit_error(diagnostic);
//! fn resolve(..) -> Result<TypeRef, ErrorGuaranteed> { ... }
//! ```

mod diagnostic;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{type_mismatch, unknown_type, Diagnostic, Label, Severity};
pub use error_code::{ErrorCategory, ErrorCode};
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
