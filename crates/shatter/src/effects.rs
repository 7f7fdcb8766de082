//! # Effects Director
//!
//! Pooled one-shot visual effects with timed return.
//!
//! Hits and destructions seen on the bus are queued; [`EffectsDirector::update`]
//! first returns effects whose time is up, then starts the queued ones. Each
//! playing effect has one timer entry that hands it back to its pool.

use std::collections::HashMap;

use crossbeam_channel::{unbounded, Receiver};
use serde::{Deserialize, Serialize};
use shatter_core::{PoolRegistry, PoolResult, Poolable, Pooled, ReleaseOutcome};
use shatter_shared::Vec2;
use tracing::{debug, warn};

use crate::config::EffectConfig;
use crate::events::{Channel, EventBus, GameEvent, Subscriptions};
use crate::gameplay::Tier;
use crate::timers::TimerTable;

/// Effect templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Flash on a non-lethal hit.
    AsteroidHit,
    /// Small asteroid explosion.
    SmallExplosion,
    /// Medium asteroid explosion.
    MediumExplosion,
    /// Large asteroid explosion.
    LargeExplosion,
}

impl EffectKind {
    /// Pool name for this effect.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AsteroidHit => "asteroid_hit",
            Self::SmallExplosion => "small_asteroid_explosion",
            Self::MediumExplosion => "medium_asteroid_explosion",
            Self::LargeExplosion => "large_asteroid_explosion",
        }
    }

    /// Explosion played when an entity of `tier` is destroyed.
    #[must_use]
    pub const fn explosion_for(tier: Tier) -> Self {
        match tier {
            Tier::Small => Self::SmallExplosion,
            Tier::Medium => Self::MediumExplosion,
            Tier::Large => Self::LargeExplosion,
        }
    }

    /// Visual scale the host renders the effect at.
    #[must_use]
    pub const fn scale(self) -> f32 {
        match self {
            Self::AsteroidHit | Self::SmallExplosion => 0.15,
            Self::MediumExplosion => 0.25,
            Self::LargeExplosion => 0.4,
        }
    }
}

/// A playing (or parked) effect instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Effect {
    /// Template.
    pub kind: EffectKind,
    /// Where it plays.
    pub position: Vec2,
    /// Live flag.
    pub active: bool,
}

impl Effect {
    /// Creates a parked effect.
    #[must_use]
    pub const fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            position: Vec2::ZERO,
            active: false,
        }
    }
}

impl Poolable for Effect {
    type Kind = EffectKind;

    fn kind(&self) -> EffectKind {
        self.kind
    }

    fn activate(&mut self) {
        self.active = true;
    }

    fn reset(&mut self) {
        self.position = Vec2::ZERO;
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Clone, Copy, Debug)]
struct EffectRequest {
    kind: EffectKind,
    position: Vec2,
}

/// What one [`EffectsDirector::update`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EffectsUpdate {
    /// Effects started.
    pub started: usize,
    /// Effects returned to their pools.
    pub finished: usize,
    /// Requests dropped (no pool, or the pool could not build one).
    pub dropped: usize,
}

/// Plays pooled effects in response to bus events.
pub struct EffectsDirector {
    registry: PoolRegistry<Effect>,
    durations: HashMap<EffectKind, f32>,
    inbox: Receiver<EffectRequest>,
    timers: TimerTable<Pooled<Effect>>,
    _subscriptions: Subscriptions,
}

impl EffectsDirector {
    /// Registers one pool per effect and subscribes to hits and destructions.
    ///
    /// Each pool pre-warms a quarter of its `pool_size`.
    ///
    /// # Errors
    ///
    /// Any [`shatter_core::PoolError`] from pool registration.
    pub fn new(bus: &EventBus, effects: &[EffectConfig]) -> PoolResult<Self> {
        let mut registry = PoolRegistry::new();
        let mut durations = HashMap::new();
        for effect in effects {
            registry.register_pool(
                effect.effect.name(),
                effect.effect,
                Box::new(|kind| Ok(Effect::new(kind))),
                effect.pool_size / 4,
                effect.pool_size,
            )?;
            durations.insert(effect.effect, effect.duration);
        }

        let (requests, inbox) = unbounded();
        let mut subscriptions = Subscriptions::new(bus);
        {
            let requests = requests.clone();
            subscriptions.add(Channel::EntityDestroyed, move |event| {
                if let GameEvent::EntityDestroyed(entity) = event {
                    let _ = requests.send(EffectRequest {
                        kind: EffectKind::explosion_for(entity.tier),
                        position: entity.position,
                    });
                }
                Ok(())
            });
        }
        subscriptions.add(Channel::EntityHit, move |event| {
            if let GameEvent::EntityHit { position, .. } = event {
                let _ = requests.send(EffectRequest {
                    kind: EffectKind::AsteroidHit,
                    position: *position,
                });
            }
            Ok(())
        });

        Ok(Self {
            registry,
            durations,
            inbox,
            timers: TimerTable::new(),
            _subscriptions: subscriptions,
        })
    }

    /// Returns finished effects, then starts queued ones.
    pub fn update(&mut self, dt: f32) -> EffectsUpdate {
        let mut update = EffectsUpdate::default();

        for effect in self.timers.advance(dt) {
            self.give_back(effect);
            update.finished += 1;
        }

        let requests: Vec<EffectRequest> = self.inbox.try_iter().collect();
        for request in requests {
            if self.start(request) {
                update.started += 1;
            } else {
                update.dropped += 1;
            }
        }

        update
    }

    fn start(&mut self, request: EffectRequest) -> bool {
        let Some(&duration) = self.durations.get(&request.kind) else {
            debug!(effect = request.kind.name(), "no pool configured for effect");
            return false;
        };

        match self.registry.acquire(request.kind.name(), request.kind) {
            Ok(mut effect) => {
                effect.position = request.position;
                self.timers.schedule(duration, effect);
                true
            }
            Err(err) => {
                warn!(effect = request.kind.name(), error = %err, "effect dropped");
                false
            }
        }
    }

    fn give_back(&mut self, effect: Pooled<Effect>) {
        if let ReleaseOutcome::Unrouted(effect) = self.registry.release(effect) {
            debug!(id = %effect.id(), "dropping effect with no pool provenance");
        }
    }

    /// Returns every playing effect immediately and drops queued requests.
    pub fn clear(&mut self) -> usize {
        let dropped = self.inbox.try_iter().count();
        debug!(dropped, "queued effects dropped");
        let playing = self.timers.clear();
        let count = playing.len();
        for effect in playing {
            self.give_back(effect);
        }
        count
    }

    /// Effects currently playing.
    #[must_use]
    pub fn playing(&self) -> usize {
        self.timers.len()
    }

    /// Requests waiting for the next update.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.inbox.len()
    }

    /// The backing registry, for inspection.
    #[must_use]
    pub const fn registry(&self) -> &PoolRegistry<Effect> {
        &self.registry
    }
}

impl std::fmt::Debug for EffectsDirector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectsDirector")
            .field("pools", &self.registry.pool_names())
            .field("playing", &self.timers.len())
            .finish_non_exhaustive()
    }
}
