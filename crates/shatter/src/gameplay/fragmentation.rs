//! # Fragmentation Policy
//!
//! Where the two children of a destroyed Large or Medium entity go.
//!
//! With `d` the parent's normalized travel direction and `p` its
//! counter-clockwise perpendicular:
//!
//! ```text
//!   child 1 direction = normalize(d + spread * p)
//!   child 2 direction = normalize(d - spread * p)
//!   child i position  = parent position + radius * child i direction
//! ```
//!
//! Smaller fragments scatter more (larger spread) and start closer to the
//! parent (smaller radius).

use shatter_shared::constants::{
    FRAGMENT_COUNT, LARGE_FRAGMENT_RADIUS, LARGE_FRAGMENT_SPREAD, MEDIUM_FRAGMENT_RADIUS,
    MEDIUM_FRAGMENT_SPREAD,
};
use shatter_shared::Vec2;

use super::asteroid::Tier;

/// One child to materialize.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FragmentPlan {
    /// Child tier (one below the parent).
    pub tier: Tier,
    /// Spawn position.
    pub position: Vec2,
    /// Unit travel direction.
    pub direction: Vec2,
}

/// Split rule per parent tier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FragmentationPolicy {
    /// Perpendicular spread when a Large parent splits.
    pub large_spread: f32,
    /// Perpendicular spread when a Medium parent splits.
    pub medium_spread: f32,
    /// Child offset from a Large parent.
    pub large_radius: f32,
    /// Child offset from a Medium parent.
    pub medium_radius: f32,
}

impl Default for FragmentationPolicy {
    fn default() -> Self {
        Self {
            large_spread: LARGE_FRAGMENT_SPREAD,
            medium_spread: MEDIUM_FRAGMENT_SPREAD,
            large_radius: LARGE_FRAGMENT_RADIUS,
            medium_radius: MEDIUM_FRAGMENT_RADIUS,
        }
    }
}

impl FragmentationPolicy {
    /// Children of a `tier` entity destroyed at `position` while moving with
    /// `velocity`. `None` for Small.
    ///
    /// A parent at rest splits as if it were moving along +X.
    #[must_use]
    pub fn plan(
        &self,
        tier: Tier,
        position: Vec2,
        velocity: Vec2,
    ) -> Option<[FragmentPlan; FRAGMENT_COUNT]> {
        let child = tier.smaller()?;
        let (spread, radius) = match tier {
            Tier::Large => (self.large_spread, self.large_radius),
            Tier::Medium => (self.medium_spread, self.medium_radius),
            Tier::Small => return None,
        };

        let direction = if velocity.is_near_zero() {
            Vec2::X
        } else {
            velocity.normalized()
        };
        let side = direction.perpendicular() * spread;

        let fragment = |offset: Vec2| {
            let direction = (direction + offset).normalized();
            FragmentPlan {
                tier: child,
                position: position + direction * radius,
                direction,
            }
        };

        Some([fragment(side), fragment(-side)])
    }
}
