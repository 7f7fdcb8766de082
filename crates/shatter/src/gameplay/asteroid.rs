//! # Asteroid
//!
//! Size tiers and the health/destruction state of one entity.
//!
//! An asteroid is `Alive` until its health reaches zero or it is destroyed
//! outright, then `Destroyed` forever. Everything that happens on
//! destruction (fragments, notification, body release) is driven by the
//! spawner exactly once, gated on [`Asteroid::mark_destroyed`].

use shatter_core::EntityId;
use shatter_shared::constants::{MEDIUM_TIER_THRESHOLD, SMALL_TIER_THRESHOLD};
use shatter_shared::Vec2;

use super::body::{Body, ResourceKind};
use super::factory::BodyHandle;
use crate::config::TierConfig;

/// Ordered size class: `Large > Medium > Small`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    /// Never fragments.
    Small,
    /// Splits into two Small.
    Medium,
    /// Splits into two Medium.
    Large,
}

impl Tier {
    /// Every tier, largest first.
    pub const ALL: [Self; 3] = [Self::Large, Self::Medium, Self::Small];

    /// Tier fragments are born with, `None` for Small.
    #[must_use]
    pub const fn smaller(self) -> Option<Self> {
        match self {
            Self::Large => Some(Self::Medium),
            Self::Medium => Some(Self::Small),
            Self::Small => None,
        }
    }

    /// Pool template for this tier.
    #[must_use]
    pub const fn resource_kind(self) -> ResourceKind {
        match self {
            Self::Large => ResourceKind::LargeAsteroid,
            Self::Medium => ResourceKind::MediumAsteroid,
            Self::Small => ResourceKind::SmallAsteroid,
        }
    }

    /// Maps a uniform draw on `[0, 1)` to a tier: 10% Small, 30% Medium,
    /// 60% Large.
    #[must_use]
    pub fn sample(draw: f32) -> Self {
        if draw < SMALL_TIER_THRESHOLD {
            Self::Small
        } else if draw < MEDIUM_TIER_THRESHOLD {
            Self::Medium
        } else {
            Self::Large
        }
    }
}

/// Lightweight description of an entity carried by events.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityRef {
    /// Entity identity.
    pub id: EntityId,
    /// Size tier.
    pub tier: Tier,
    /// Last known position.
    pub position: Vec2,
    /// Last known velocity.
    pub velocity: Vec2,
    /// Points awarded on destruction.
    pub score_value: i32,
}

/// One-way lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifeState {
    /// Taking damage.
    Alive,
    /// Terminal.
    Destroyed,
}

/// Result of applying damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Already destroyed, or a non-positive amount.
    Ignored,
    /// Survived with this much health left.
    Hit {
        /// Health after the hit.
        remaining: i32,
    },
    /// Health reached zero with this hit.
    Depleted,
}

/// A tracked, fragmentable entity.
#[derive(Debug)]
pub struct Asteroid {
    id: EntityId,
    tier: Tier,
    body: BodyHandle,
    health: i32,
    max_health: i32,
    score_value: i32,
    state: LifeState,
}

impl Asteroid {
    /// Wraps a freshly created body with the tier's stats.
    #[must_use]
    pub fn new(id: EntityId, tier: Tier, body: BodyHandle, stats: &TierConfig) -> Self {
        Self {
            id,
            tier,
            body,
            health: stats.health,
            max_health: stats.health,
            score_value: stats.score_value,
            state: LifeState::Alive,
        }
    }

    /// Places the body and sets it moving.
    pub fn launch(&mut self, position: Vec2, velocity: Vec2) {
        let body = self.body.body_mut();
        body.position = position;
        body.velocity = velocity;
    }

    /// Applies `amount` damage, clamping health at zero.
    pub fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        if self.state == LifeState::Destroyed || amount <= 0 || self.health == 0 {
            return DamageOutcome::Ignored;
        }

        self.health = (self.health - amount).max(0);
        if self.health == 0 {
            DamageOutcome::Depleted
        } else {
            DamageOutcome::Hit {
                remaining: self.health,
            }
        }
    }

    /// Enters the terminal state. Returns `false` if it already had.
    pub fn mark_destroyed(&mut self) -> bool {
        if self.state == LifeState::Destroyed {
            return false;
        }
        self.state = LifeState::Destroyed;
        true
    }

    /// Event payload describing the entity right now.
    #[must_use]
    pub fn snapshot(&self) -> EntityRef {
        let body = self.body.body();
        EntityRef {
            id: self.id,
            tier: self.tier,
            position: body.position,
            velocity: body.velocity,
            score_value: self.score_value,
        }
    }

    /// Gives up the body for disposal.
    #[must_use]
    pub fn into_body(self) -> BodyHandle {
        self.body
    }

    /// Entity identity.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Size tier.
    #[inline]
    #[must_use]
    pub const fn tier(&self) -> Tier {
        self.tier
    }

    /// Current health.
    #[inline]
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Health at spawn.
    #[inline]
    #[must_use]
    pub const fn max_health(&self) -> i32 {
        self.max_health
    }

    /// Points awarded on destruction.
    #[inline]
    #[must_use]
    pub const fn score_value(&self) -> i32 {
        self.score_value
    }

    /// Lifecycle state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> LifeState {
        self.state
    }

    /// Physical state.
    #[must_use]
    pub fn body(&self) -> &Body {
        self.body.body()
    }

    /// Physical state, for the host's integrator.
    pub fn body_mut(&mut self) -> &mut Body {
        self.body.body_mut()
    }
}
