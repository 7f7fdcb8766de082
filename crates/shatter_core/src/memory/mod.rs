//! # Memory Management
//!
//! Pre-warmed pools for objects that are created and discarded constantly.
//!
//! ## Design Philosophy
//!
//! Instances are built once and recycled. During gameplay:
//! - Acquire pops an idle instance, constructing only when the free-list is empty
//! - Release resets and parks the instance, or discards it when the pool is full
//! - The registry remembers which pool issued each live instance

mod pool;
mod registry;

pub use pool::{Disposition, Factory, Poolable, Pooled, ResourcePool};
pub use registry::{PoolRegistry, ReleaseOutcome};
