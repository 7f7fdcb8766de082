//! # Pool Error Types
//!
//! All errors that can occur while acquiring, releasing or registering pools.

use thiserror::Error;

/// Errors that can occur in the pooling layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Acquire or clear against a name that was never registered.
    #[error("pool not found: {0}")]
    PoolNotFound(String),

    /// The pool's factory could not produce an instance.
    #[error("factory failure in pool '{pool}': {reason}")]
    FactoryFailure {
        /// Pool whose factory failed.
        pool: String,
        /// What the factory reported.
        reason: String,
    },

    /// A pool with this name is already registered.
    #[error("duplicate pool name: {0}")]
    DuplicatePool(String),

    /// Initial population larger than the idle bound.
    #[error("invalid capacity for pool '{pool}': initial size {initial} exceeds max size {max}")]
    InvalidCapacity {
        /// Pool being configured.
        pool: String,
        /// Requested pre-warmed population.
        initial: usize,
        /// Requested idle bound.
        max: usize,
    },
}

impl PoolError {
    /// Returns `true` for errors that indicate a broken deployment rather
    /// than a runtime condition.
    #[inline]
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(self, Self::DuplicatePool(_) | Self::InvalidCapacity { .. })
    }
}

/// Failure reported by a pool's factory function.
///
/// Typically a missing template resource for the requested kind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct FactoryError {
    /// Human-readable cause.
    pub reason: String,
}

impl FactoryError {
    /// Creates a factory error with the given cause.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
