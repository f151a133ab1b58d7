//! Stack growth for the recursive parts of the type engine.
//!
//! Annotation parsing, name resolution, spec matching and value acceptance
//! all recurse once per level of container nesting. Annotations such as
//! `list<list<...>>` come from user programs and have no depth limit, so each
//! recursive entry point runs inside [`ensure_sufficient_stack`].
//!
//! On native targets the stack is grown with `stacker`; on `wasm32` the
//! closure is called directly.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, first switching to a fresh stack segment if the current one is
/// nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
