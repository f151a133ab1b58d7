//! Source-location types shared by the Quill runtime crates.
//!
//! Type annotations are resolved while a program is being parsed, so every
//! parse-time diagnostic carries a [`Span`] into the annotation text or the
//! enclosing source file.

/// Compile-time size assertion.
///
/// Fails to compile if `size_of::<$ty>() != $size`.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod span;

pub use span::{Span, SpanError};
