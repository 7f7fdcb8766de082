//! # SHATTER Core
//!
//! Bounded resource reuse for short-lived simulation objects.
//!
//! ## Architecture Rules
//!
//! 1. **Bounded idle memory** - a pool never keeps more than `max_size` idle instances
//! 2. **Neutral on return** - every instance is reset before it can be handed out again
//! 3. **Routed release** - callers return instances without knowing which pool issued them
//!
//! ## Example
//!
//! ```rust,ignore
//! use shatter_core::{PoolRegistry, ReleaseOutcome};
//!
//! let mut registry = PoolRegistry::new();
//! registry.register_pool("sparks", SparkKind::Small, Box::new(|k| Ok(Spark::new(k))), 8, 32)?;
//!
//! let spark = registry.acquire("sparks", SparkKind::Small)?;
//! // ...
//! let _ = registry.release(spark);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod ids;
pub mod memory;

pub use error::{FactoryError, PoolError, PoolResult};
pub use ids::{EntityId, EntityIdAllocator, InstanceId};
pub use memory::{
    Disposition, Factory, PoolRegistry, Poolable, Pooled, ReleaseOutcome, ResourcePool,
};
