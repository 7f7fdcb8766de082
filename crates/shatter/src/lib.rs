//! # SHATTER
//!
//! Gameplay runtime for an asteroid field: an adaptive spawner, the
//! split-on-destruction rule, and the event bus that ties score, effects and
//! the host together.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────── Session ───────────────────────────────┐
//! │                                                                       │
//! │  ┌──────────┐  create/dispose  ┌────────────────────┐                 │
//! │  │ Spawner  │─────────────────>│ PooledAsteroid-    │──> PoolRegistry │
//! │  │          │                  │ Factory            │                 │
//! │  └────┬─────┘                  └────────────────────┘                 │
//! │       │ publish                                                       │
//! │       v                                                               │
//! │  ┌──────────┐──> ScoreKeeper                                          │
//! │  │ EventBus │──> EffectsDirector ──> PoolRegistry + TimerTable        │
//! │  └──────────┘──> host (audio, UI)                                     │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Architecture Rules
//!
//! 1. **Explicit ownership** - the session owns every subsystem; no globals
//! 2. **One thread** - pools, bus and spawner are driven from the tick only
//! 3. **Deterministic** - same seed + same tick sequence = same game
//! 4. **No sleeping** - deferred work is a timer entry advanced per tick

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod effects;
pub mod error;
pub mod events;
pub mod gameplay;
pub mod session;
pub mod stats;
pub mod timers;

pub use config::{
    EffectConfig, GameConfig, PoolConfig, SessionConfig, SpawnConfig, TierConfig, TierTable,
};
pub use effects::{Effect, EffectKind, EffectsDirector, EffectsUpdate};
pub use error::{ConfigError, ConfigResult, DeliveryError, HandlerError};
pub use events::{Channel, DeliveryReport, EventBus, GameEvent, SubscriptionHandle, Subscriptions};
pub use gameplay::{
    Asteroid, BodyHandle, DamageOutcome, EntityFactory, EntityRef, FragmentPlan,
    FragmentationPolicy, PooledAsteroidFactory, RandomSource, ScoreKeeper, SeededRandom, Spawner,
    StaticWorld, Tier, WorldView,
};
pub use session::{GameState, Session, SharedSession};
pub use stats::{TickStats, TickStatsAccumulator};
pub use timers::{TimerId, TimerTable};

/// Re-export pooling primitives.
pub use shatter_core as core;

/// Re-export shared math.
pub use shatter_shared as shared;
