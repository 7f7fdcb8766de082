//! # Simulation Constants
//!
//! Reference tuning shared by the gameplay systems.
//!
//! **NOTE:** Values that designers tune per deployment live in the TOML
//! config instead. These are the fixed rules of the simulation.

// =============================================================================
// TIMING
// =============================================================================

/// Tick rate (updates per second)
pub const TICK_RATE: u32 = 60;

/// Seconds per fixed tick.
pub const FIXED_TIMESTEP: f32 = 1.0 / TICK_RATE as f32;

// =============================================================================
// SPAWNING
// =============================================================================

/// Floor for the spawn interval in the reference configuration (seconds).
pub const REFERENCE_MIN_SPAWN_INTERVAL: f32 = 0.5;

/// How far outside the field perimeter spawns land, as a fraction of the
/// field dimension along the spawn axis.
pub const SPAWN_EDGE_MARGIN: f32 = 0.1;

/// Weight of the uniformly random component of a travel direction.
pub const DIRECTION_RANDOM_WEIGHT: f32 = 0.7;

/// Weight of the toward-center component of a travel direction.
pub const DIRECTION_CENTER_WEIGHT: f32 = 0.3;

/// Perimeter samples tried before falling back to an unconstrained one.
pub const MAX_SPAWN_POSITION_ATTEMPTS: u32 = 16;

/// Size-tier draw below this is Small.
pub const SMALL_TIER_THRESHOLD: f32 = 0.10;

/// Size-tier draw below this (and not Small) is Medium.
pub const MEDIUM_TIER_THRESHOLD: f32 = 0.40;

/// Relative speed jitter (±) when jitter is enabled.
pub const SPEED_JITTER: f32 = 0.2;

// =============================================================================
// FRAGMENTATION
// =============================================================================

/// Children produced by one fragmenting entity.
pub const FRAGMENT_COUNT: usize = 2;

/// Perpendicular spread when Large splits into Medium.
pub const LARGE_FRAGMENT_SPREAD: f32 = 0.5;

/// Perpendicular spread when Medium splits into Small.
pub const MEDIUM_FRAGMENT_SPREAD: f32 = 0.7;

/// Spawn offset of Medium children from a Large parent.
pub const LARGE_FRAGMENT_RADIUS: f32 = 0.5;

/// Spawn offset of Small children from a Medium parent.
pub const MEDIUM_FRAGMENT_RADIUS: f32 = 0.3;
