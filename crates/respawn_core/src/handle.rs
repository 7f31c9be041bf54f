//! # Instance Handles
//!
//! Handles are lightweight identifiers consisting of:
//! - An index into the host's slot storage
//! - A generation counter for safe reuse

/// Opaque handle to a host-owned instance.
///
/// The handle is split into two parts:
/// - Lower 32 bits: Index into the host's slot storage
/// - Upper 32 bits: Generation counter for detecting stale references
///
/// A handle stays cheap to validate even after the host destroys the
/// instance out-of-band: the slot's generation no longer matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct InstanceHandle(u64);

impl InstanceHandle {
    /// Creates a new handle from index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The index into slot storage (0 to 2^32-1)
    /// * `generation` - The generation counter (0 to 2^32-1)
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the handle.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the handle.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Null/invalid handle.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this handle is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for InstanceHandle {
    fn default() -> Self {
        Self::NULL
    }
}

/// Identity of a registered prototype (the template instances are created
/// from).
///
/// Obtained from [`Stage::register_prototype`](crate::Stage::register_prototype)
/// or an equivalent host registry. Prototypes are registered explicitly by
/// name once; after that, all dispatch is by this compact id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct PrototypeId(u32);

impl PrototypeId {
    /// Creates a prototype id from a raw registry index.
    #[inline]
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw registry index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}
