//! # Gameplay
//!
//! Entities, the split-on-destruction rule, and population control.
//!
//! ## Structure
//!
//! - `body`: the poolable physical part of an entity
//! - `asteroid`: tiers, health and the one-way destruction state
//! - `fragmentation`: children derived from a destroyed entity
//! - `factory`: materializes bodies through pools or directly
//! - `random`: injectable uniform random source
//! - `spawner`: population growth, spawn placement, destruction protocol
//! - `score`: running score and high score

mod asteroid;
mod body;
mod factory;
mod fragmentation;
mod random;
mod score;
mod spawner;

pub use asteroid::{Asteroid, DamageOutcome, EntityRef, LifeState, Tier};
pub use body::{Body, ResourceKind};
pub use factory::{BodyHandle, DirectAsteroidFactory, EntityFactory, PooledAsteroidFactory};
pub use fragmentation::{FragmentPlan, FragmentationPolicy};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use score::ScoreKeeper;
pub use spawner::{SpawnState, Spawner, SpawnerCounters, StaticWorld, WorldView};
