//! # Identifiers
//!
//! Entities and pooled instances are named by 64-bit ids split into:
//! - Lower 32 bits: a serial number
//! - Upper 32 bits: a namespace (session generation or issuing pool)

use std::fmt;

/// Unique identifier for a tracked simulation entity.
///
/// - Lower 32 bits: serial within the session
/// - Upper 32 bits: session generation, bumped on every reset so ids from a
///   torn-down session never alias live ones
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new entity ID from serial and generation.
    #[inline]
    #[must_use]
    pub const fn new(serial: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (serial as u64))
    }

    /// Returns the serial portion of the ID.
    #[inline]
    #[must_use]
    pub const fn serial(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Returns the raw 64-bit value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Null/invalid entity ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}g{}", self.serial(), self.generation())
    }
}

/// Identity of a pooled instance, stable across acquire/release cycles.
///
/// The upper half names the issuing pool, so two pools in one registry can
/// never hand out the same id. Standalone pools use tag `0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Creates an instance ID from a serial and the issuing pool's tag.
    #[inline]
    #[must_use]
    pub const fn new(serial: u32, pool_tag: u32) -> Self {
        Self(((pool_tag as u64) << 32) | (serial as u64))
    }

    /// Serial within the issuing pool.
    #[inline]
    #[must_use]
    pub const fn serial(self) -> u32 {
        self.0 as u32
    }

    /// Tag of the issuing pool.
    #[inline]
    #[must_use]
    pub const fn pool_tag(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}#{}", self.pool_tag(), self.serial())
    }
}

/// Hands out entity ids for one session.
#[derive(Clone, Debug, Default)]
pub struct EntityIdAllocator {
    next_serial: u32,
    generation: u32,
}

impl EntityIdAllocator {
    /// Creates an allocator starting at serial 0, generation 0.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_serial: 0,
            generation: 0,
        }
    }

    /// Returns the next unused id.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId::new(self.next_serial, self.generation);
        self.next_serial = self.next_serial.wrapping_add(1);
        id
    }

    /// Starts a new generation; ids issued before the call are never reissued.
    pub fn advance_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.next_serial = 0;
    }

    /// Current generation.
    #[inline]
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}
