//! # Error Types
//!
//! Startup failures (fatal) and per-subscriber delivery failures (isolated).

use std::path::PathBuf;

use shatter_core::PoolError;
use thiserror::Error;

/// Errors raised while loading or applying configuration.
///
/// Every variant is fatal: it means the deployment is broken, not that
/// something went wrong mid-game.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`crate::GameConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of its allowed range.
    #[error("invalid config: {0}")]
    Invalid(String),

    /// Pool setup was rejected.
    #[error("pool setup failed: {0}")]
    Pool(#[from] PoolError),
}

/// Result type for configuration and startup.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failure reported by a bus subscriber.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct HandlerError {
    /// Human-readable cause.
    pub reason: String,
}

impl HandlerError {
    /// Creates a handler error with the given cause.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Why one subscriber missed (or failed) a delivery.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The subscriber returned an error.
    #[error("handler failed: {0}")]
    Handler(#[from] HandlerError),

    /// The subscriber was already running further up the stack (it published
    /// an event on a channel it listens to). It is skipped for the nested
    /// publish.
    #[error("handler re-entered during its own delivery")]
    Reentrant,

    /// The subscriber panicked. The panic is contained to its delivery.
    #[error("handler panicked: {0}")]
    Panicked(String),
}
