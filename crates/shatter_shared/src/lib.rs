//! # SHATTER Shared
//!
//! Common types used by the core and gameplay crates.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on a renderer, a physics engine or a
//! windowing crate. The host owns those; we only agree on the shapes.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{FIXED_TIMESTEP, TICK_RATE};
pub use math::{PlayField, Vec2};
