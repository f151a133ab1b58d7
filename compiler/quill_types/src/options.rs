//! Engine-wide parse options.

use bitflags::bitflags;

bitflags! {
    /// Options fixed when a [`TypeRegistry`](crate::TypeRegistry) is created.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeOptions: u32 {
        /// A parse-time match that may not hold at run time is rejected
        /// instead of deferred.
        const STRICT_TYPES = 1 << 0;
        /// `reference` and `*reference` resolve to the untyped `any` type.
        const BROKEN_REFERENCES = 1 << 1;
    }
}
