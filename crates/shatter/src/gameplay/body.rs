//! Poolable body of an asteroid.

use serde::{Deserialize, Serialize};
use shatter_core::Poolable;
use shatter_shared::Vec2;

/// Template an entity pool builds from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Large asteroid template.
    LargeAsteroid,
    /// Medium asteroid template.
    MediumAsteroid,
    /// Small asteroid template.
    SmallAsteroid,
}

/// Physical state the host integrates and renders.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    /// Template this body was built from.
    pub kind: ResourceKind,
    /// World position.
    pub position: Vec2,
    /// Units per second.
    pub velocity: Vec2,
    /// Radians.
    pub rotation: f32,
    /// Live flag.
    pub active: bool,
}

impl Body {
    /// Creates an inactive body at the origin.
    #[must_use]
    pub const fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            active: false,
        }
    }
}

impl Poolable for Body {
    type Kind = ResourceKind;

    fn kind(&self) -> ResourceKind {
        self.kind
    }

    fn activate(&mut self) {
        self.active = true;
    }

    fn reset(&mut self) {
        self.position = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
        self.rotation = 0.0;
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
