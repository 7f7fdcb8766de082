//! # Spawner
//!
//! Population growth, spawn placement and the destruction protocol.
//!
//! ## Per-tick behavior
//!
//! While running, a countdown runs down by the tick delta. When it expires
//! and the population is below the cap, one entity is spawned on the field
//! perimeter and the interval shrinks by `decay_step * dt`, never below the
//! floor. The countdown then restarts from the current interval.
//!
//! ## Destruction protocol
//!
//! 1. the entity enters `Destroyed` (a second call is a no-op)
//! 2. Large and Medium entities spawn two children one tier down
//! 3. exactly one `EntityDestroyed` goes out on the bus
//! 4. the body goes back to its factory
//!
//! ## Bus wiring
//!
//! The spawner listens for `EntitySpawned`/`EntityDestroyed` to keep the
//! population set (membership is idempotent), and queues `GameStarted`,
//! `GamePaused`, `GameResumed` and `GameOver` until the owner calls
//! [`Spawner::process_lifecycle`] between ticks.

use std::collections::{BTreeMap, BTreeSet};
use std::f32::consts::TAU;
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver};
use parking_lot::Mutex;
use shatter_core::{EntityId, EntityIdAllocator};
use shatter_shared::constants::{
    DIRECTION_CENTER_WEIGHT, DIRECTION_RANDOM_WEIGHT, MAX_SPAWN_POSITION_ATTEMPTS, SPEED_JITTER,
};
use shatter_shared::{PlayField, Vec2};
use tracing::{debug, info, warn};

use super::asteroid::{Asteroid, DamageOutcome, Tier};
use super::factory::EntityFactory;
use super::fragmentation::FragmentationPolicy;
use super::random::RandomSource;
use crate::config::{SpawnConfig, TierTable};
use crate::events::{Channel, EventBus, GameEvent, Subscriptions};

/// What the spawner needs to know about the world each tick.
pub trait WorldView {
    /// Visible play field.
    fn play_field(&self) -> PlayField;

    /// Position spawns must keep their distance from (the player ship).
    fn protected_position(&self) -> Option<Vec2>;
}

/// A fixed world, for headless runs and tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticWorld {
    /// Visible play field.
    pub field: PlayField,
    /// Protected entity position, if any.
    pub protected: Option<Vec2>,
}

impl StaticWorld {
    /// Creates a world with a protected entity at the field center.
    #[must_use]
    pub fn new(field: PlayField) -> Self {
        Self {
            field,
            protected: Some(field.center()),
        }
    }
}

impl WorldView for StaticWorld {
    fn play_field(&self) -> PlayField {
        self.field
    }

    fn protected_position(&self) -> Option<Vec2> {
        self.protected
    }
}

/// Spawning state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnState {
    /// Not ticking.
    Stopped,
    /// Ticking.
    Running,
    /// Frozen; resumes with the interval and countdown it had.
    Paused,
}

/// Lifetime totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpawnerCounters {
    /// Entities created, perimeter spawns and fragments alike.
    pub spawned: u64,
    /// Of `spawned`, how many were fragments.
    pub fragments: u64,
    /// Entities that went through the destruction protocol.
    pub destroyed: u64,
    /// Spawns skipped because the factory failed.
    pub skipped: u64,
    /// Perimeter samples that gave up on the distance constraint.
    pub position_fallbacks: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LifecycleSignal {
    Started,
    Paused,
    Resumed,
    Over,
}

/// Drives population growth and destruction.
pub struct Spawner {
    config: SpawnConfig,
    tiers: TierTable,
    policy: FragmentationPolicy,
    factory: Box<dyn EntityFactory>,
    rng: Box<dyn RandomSource>,
    bus: EventBus,
    /// Entities this spawner created and still owns.
    entities: BTreeMap<EntityId, Asteroid>,
    /// Active population as seen through spawn/destroy notifications.
    population: Arc<Mutex<BTreeSet<EntityId>>>,
    /// Game-state signals waiting for `process_lifecycle`.
    lifecycle: Receiver<LifecycleSignal>,
    ids: EntityIdAllocator,
    interval: f32,
    countdown: f32,
    state: SpawnState,
    counters: SpawnerCounters,
    _subscriptions: Subscriptions,
}

impl Spawner {
    /// Creates a stopped spawner wired to `bus`.
    #[must_use]
    pub fn new(
        config: SpawnConfig,
        tiers: TierTable,
        factory: Box<dyn EntityFactory>,
        rng: Box<dyn RandomSource>,
        bus: &EventBus,
    ) -> Self {
        let population = Arc::new(Mutex::new(BTreeSet::new()));
        let (lifecycle_tx, lifecycle) = unbounded();
        let mut subscriptions = Subscriptions::new(bus);

        {
            let population = Arc::clone(&population);
            subscriptions.add(Channel::EntitySpawned, move |event| {
                if let GameEvent::EntitySpawned(entity) = event {
                    population.lock().insert(entity.id);
                }
                Ok(())
            });
        }
        {
            let population = Arc::clone(&population);
            subscriptions.add(Channel::EntityDestroyed, move |event| {
                if let GameEvent::EntityDestroyed(entity) = event {
                    population.lock().remove(&entity.id);
                }
                Ok(())
            });
        }
        for (channel, signal) in [
            (Channel::GameStarted, LifecycleSignal::Started),
            (Channel::GamePaused, LifecycleSignal::Paused),
            (Channel::GameResumed, LifecycleSignal::Resumed),
            (Channel::GameOver, LifecycleSignal::Over),
        ] {
            let sender = lifecycle_tx.clone();
            subscriptions.add(channel, move |_| {
                // Only fails once the spawner is gone.
                let _ = sender.send(signal);
                Ok(())
            });
        }

        let interval = config.initial_interval.max(config.min_interval);
        Self {
            config,
            tiers,
            policy: FragmentationPolicy::default(),
            factory,
            rng,
            bus: bus.clone(),
            entities: BTreeMap::new(),
            population,
            lifecycle,
            ids: EntityIdAllocator::new(),
            interval,
            countdown: 0.0,
            state: SpawnState::Stopped,
            counters: SpawnerCounters::default(),
            _subscriptions: subscriptions,
        }
    }

    /// Replaces the split rule.
    #[must_use]
    pub fn with_policy(mut self, policy: FragmentationPolicy) -> Self {
        self.policy = policy;
        self
    }

    // =========================================================================
    // Spawning control
    // =========================================================================

    /// Starts ticking from the initial interval. No-op while running.
    pub fn start_spawning(&mut self) -> bool {
        if self.state == SpawnState::Running {
            return false;
        }
        self.interval = self.config.initial_interval.max(self.config.min_interval);
        self.countdown = 0.0;
        self.state = SpawnState::Running;
        debug!(interval = self.interval, "spawning started");
        true
    }

    /// Stops ticking. Existing entities are kept.
    pub fn stop_spawning(&mut self) -> bool {
        if self.state == SpawnState::Stopped {
            return false;
        }
        self.state = SpawnState::Stopped;
        debug!("spawning stopped");
        true
    }

    /// Drops unapplied game-state signals, stops spawning and clears every
    /// entity. Returns how many entities were cleared.
    pub fn halt(&mut self) -> usize {
        let dropped = self.lifecycle.try_iter().count();
        self.stop_spawning();
        let cleared = self.clear_all();
        debug!(dropped, cleared, "spawner halted");
        cleared
    }

    /// Freezes a running spawner.
    pub fn pause(&mut self) -> bool {
        if self.state != SpawnState::Running {
            return false;
        }
        self.state = SpawnState::Paused;
        true
    }

    /// Continues a paused spawner with the interval it had.
    pub fn resume(&mut self) -> bool {
        if self.state != SpawnState::Paused {
            return false;
        }
        self.state = SpawnState::Running;
        true
    }

    /// Applies queued game-state signals in arrival order.
    pub fn process_lifecycle(&mut self, world: &dyn WorldView) {
        while let Ok(signal) = self.lifecycle.try_recv() {
            match signal {
                LifecycleSignal::Started => {
                    self.clear_all();
                    self.ids.advance_generation();
                    for _ in 0..self.config.initial_burst_count {
                        let _ = self.spawn_random(world);
                    }
                    self.state = SpawnState::Stopped;
                    self.start_spawning();
                    info!(population = self.population(), "spawner armed for new game");
                }
                LifecycleSignal::Paused => {
                    self.pause();
                }
                LifecycleSignal::Resumed => {
                    self.resume();
                }
                LifecycleSignal::Over => {
                    self.stop_spawning();
                    let cleared = self.clear_all();
                    info!(cleared, "spawner cleared after game over");
                }
            }
        }
    }

    /// Advances the spawn countdown by `dt` and spawns if it expired.
    ///
    /// Returns the entity spawned this tick, if any.
    pub fn tick(&mut self, dt: f32, world: &dyn WorldView) -> Option<EntityId> {
        if self.state != SpawnState::Running {
            return None;
        }

        self.countdown -= dt;
        if self.countdown > 0.0 {
            return None;
        }

        let spawned = if self.population() < self.config.max_population {
            let spawned = self.spawn_random(world);
            if spawned.is_some() {
                self.interval = (self.interval - self.config.interval_decay_step * dt)
                    .max(self.config.min_interval);
            }
            spawned
        } else {
            None
        };

        self.countdown = self.interval;
        spawned
    }

    // =========================================================================
    // Entity creation
    // =========================================================================

    /// Spawns one entity of a random tier on the field perimeter.
    pub fn spawn_random(&mut self, world: &dyn WorldView) -> Option<EntityId> {
        let field = world.play_field();
        let position = self.sample_spawn_position(&field, world.protected_position());
        let direction = self.sample_direction(&field, position);
        let tier = Tier::sample(self.rng.next_unit());
        self.spawn_entity(tier, position, direction)
    }

    /// Creates and tracks one entity. The only way entities come to exist.
    ///
    /// Returns `None` (and logs) if the factory could not produce a body.
    pub fn spawn_entity(
        &mut self,
        tier: Tier,
        position: Vec2,
        direction: Vec2,
    ) -> Option<EntityId> {
        let body = match self.factory.create(tier, position) {
            Ok(body) => body,
            Err(err) => {
                warn!(?tier, error = %err, "spawn skipped");
                self.counters.skipped += 1;
                return None;
            }
        };

        let stats = *self.tiers.for_tier(tier);
        let speed = self.sample_speed(stats.speed);
        let id = self.ids.allocate();

        let mut asteroid = Asteroid::new(id, tier, body, &stats);
        asteroid.launch(position, direction.normalized() * speed);
        let snapshot = asteroid.snapshot();

        self.entities.insert(id, asteroid);
        self.population.lock().insert(id);
        self.counters.spawned += 1;
        debug!(%id, ?tier, x = position.x, y = position.y, "entity spawned");

        let _ = self.bus.publish(GameEvent::EntitySpawned(snapshot));
        Some(id)
    }

    fn sample_spawn_position(&mut self, field: &PlayField, protected: Option<Vec2>) -> Vec2 {
        let min_distance = self.config.min_distance_from_protected;
        for _ in 0..MAX_SPAWN_POSITION_ATTEMPTS {
            let candidate = self.sample_perimeter(field);
            match protected {
                Some(protected) if candidate.distance(protected) < min_distance => {}
                _ => return candidate,
            }
        }

        self.counters.position_fallbacks += 1;
        warn!(
            attempts = MAX_SPAWN_POSITION_ATTEMPTS,
            min_distance, "no perimeter point clears the protected entity, spawning anyway"
        );
        self.sample_perimeter(field)
    }

    fn sample_perimeter(&mut self, field: &PlayField) -> Vec2 {
        let margin = self.config.spawn_margin;
        let edge = self.rng.index(4);
        let along = self.rng.next_unit();
        let (u, v) = match edge {
            0 => (-margin, along),
            1 => (1.0 + margin, along),
            2 => (along, -margin),
            _ => (along, 1.0 + margin),
        };
        field.viewport_to_world(u, v)
    }

    /// 70% uniformly random heading blended with 30% toward the field center.
    fn sample_direction(&mut self, field: &PlayField, position: Vec2) -> Vec2 {
        let random = Vec2::from_angle(self.rng.range(0.0, TAU));
        let to_center = (field.center() - position).normalized();
        let blended = random * DIRECTION_RANDOM_WEIGHT + to_center * DIRECTION_CENTER_WEIGHT;

        // Unequal weights keep the blend at least 0.4 long; zero needs equal ones.
        if blended.is_near_zero() {
            random
        } else {
            blended.normalized()
        }
    }

    fn sample_speed(&mut self, base: f32) -> f32 {
        if self.tiers.speed_jitter {
            base * self.rng.range(1.0 - SPEED_JITTER, 1.0 + SPEED_JITTER)
        } else {
            base
        }
    }

    // =========================================================================
    // Damage and destruction
    // =========================================================================

    /// Applies damage; runs the destruction protocol if health ran out.
    pub fn damage(&mut self, id: EntityId, amount: i32) -> DamageOutcome {
        let Some(asteroid) = self.entities.get_mut(&id) else {
            return DamageOutcome::Ignored;
        };

        let outcome = asteroid.take_damage(amount);
        match outcome {
            DamageOutcome::Hit { .. } => {
                let position = asteroid.body().position;
                let _ = self.bus.publish(GameEvent::EntityHit { id, position });
            }
            DamageOutcome::Depleted => {
                self.destroy(id);
            }
            DamageOutcome::Ignored => {}
        }
        outcome
    }

    /// Runs the destruction protocol. Returns `false` if `id` is unknown or
    /// already destroyed.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        let Some(asteroid) = self.entities.get_mut(&id) else {
            return false;
        };
        if !asteroid.mark_destroyed() {
            return false;
        }
        let snapshot = asteroid.snapshot();

        if let Some(children) = self
            .policy
            .plan(snapshot.tier, snapshot.position, snapshot.velocity)
        {
            for child in children {
                if self
                    .spawn_entity(child.tier, child.position, child.direction)
                    .is_some()
                {
                    self.counters.fragments += 1;
                }
            }
        }

        self.counters.destroyed += 1;
        debug!(%id, tier = ?snapshot.tier, "entity destroyed");
        let _ = self.bus.publish(GameEvent::EntityDestroyed(snapshot));

        self.retire(id);
        true
    }

    /// Removes an entity without fragments or notification.
    pub fn instant_destroy(&mut self, id: EntityId) -> bool {
        let Some(mut asteroid) = self.entities.remove(&id) else {
            return false;
        };
        asteroid.mark_destroyed();
        self.population.lock().remove(&id);
        self.factory.dispose(asteroid.into_body());
        true
    }

    /// Instantly destroys every tracked entity. Returns how many there were.
    pub fn clear_all(&mut self) -> usize {
        let ids: Vec<EntityId> = self.entities.keys().copied().collect();
        for id in &ids {
            self.instant_destroy(*id);
        }
        self.population.lock().clear();
        ids.len()
    }

    /// Drops idle pooled bodies. Call after [`Spawner::clear_all`].
    pub fn clear_pools(&mut self) {
        self.factory.clear_pools();
    }

    fn retire(&mut self, id: EntityId) {
        if let Some(asteroid) = self.entities.remove(&id) {
            self.population.lock().remove(&id);
            self.factory.dispose(asteroid.into_body());
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Spawning state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> SpawnState {
        self.state
    }

    /// Current spawn interval (seconds).
    #[inline]
    #[must_use]
    pub const fn interval(&self) -> f32 {
        self.interval
    }

    /// Seconds until the next spawn attempt.
    #[inline]
    #[must_use]
    pub const fn countdown(&self) -> f32 {
        self.countdown
    }

    /// Active population size.
    #[must_use]
    pub fn population(&self) -> usize {
        self.population.lock().len()
    }

    /// Whether `id` is in the active population.
    #[must_use]
    pub fn is_active(&self, id: EntityId) -> bool {
        self.population.lock().contains(&id)
    }

    /// A tracked entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Asteroid> {
        self.entities.get(&id)
    }

    /// A tracked entity, for the host's physics.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Asteroid> {
        self.entities.get_mut(&id)
    }

    /// Tracked entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = &Asteroid> {
        self.entities.values()
    }

    /// Tracked entity ids in order.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// Lifetime totals.
    #[inline]
    #[must_use]
    pub const fn counters(&self) -> SpawnerCounters {
        self.counters
    }

    /// Game-state signals not yet applied.
    #[must_use]
    pub fn pending_signals(&self) -> usize {
        self.lifecycle.len()
    }
}

impl std::fmt::Debug for Spawner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spawner")
            .field("state", &self.state)
            .field("interval", &self.interval)
            .field("countdown", &self.countdown)
            .field("entities", &self.entities.len())
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::factory::{BodyHandle, DirectAsteroidFactory};
    use crate::gameplay::random::ScriptedRandom;
    use shatter_core::FactoryError;

    fn steady_tiers() -> TierTable {
        TierTable {
            speed_jitter: false,
            ..TierTable::default()
        }
    }

    fn spawner(config: SpawnConfig, draws: Vec<f32>, bus: &EventBus) -> Spawner {
        Spawner::new(
            config,
            steady_tiers(),
            Box::new(DirectAsteroidFactory::new()),
            Box::new(ScriptedRandom::new(draws)),
            bus,
        )
    }

    fn world() -> StaticWorld {
        StaticWorld::new(PlayField::centered(10.0, 5.0))
    }

    fn record(bus: &EventBus, channel: Channel) -> Arc<Mutex<Vec<GameEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        bus.subscribe(channel, move |event| {
            sink.lock().push(event.clone());
            Ok(())
        });
        log
    }

    #[test]
    fn test_start_stop_idempotent() {
        let bus = EventBus::new();
        let mut spawner = spawner(SpawnConfig::default(), vec![0.5], &bus);

        assert!(spawner.start_spawning());
        assert!(!spawner.start_spawning());
        assert_eq!(spawner.state(), SpawnState::Running);
        assert_eq!(spawner.interval(), 2.0);

        assert!(spawner.stop_spawning());
        assert!(!spawner.stop_spawning());
        assert!(spawner.tick(10.0, &world()).is_none());
    }

    #[test]
    fn test_interval_decays_to_floor() {
        let bus = EventBus::new();
        let config = SpawnConfig {
            max_population: 100,
            ..SpawnConfig::default()
        };
        let mut spawner = spawner(config, vec![0.5, 0.5, 0.5, 0.9], &bus);
        spawner.start_spawning();

        let mut seen = Vec::new();
        for _ in 0..6 {
            assert!(spawner.tick(5.0, &world()).is_some());
            seen.push(spawner.interval());
        }
        assert_eq!(seen, vec![1.5, 1.0, 0.5, 0.5, 0.5, 0.5]);
        assert!(seen.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_waits_for_countdown() {
        let bus = EventBus::new();
        let mut spawner = spawner(SpawnConfig::default(), vec![0.5, 0.5, 0.5, 0.9], &bus);
        spawner.start_spawning();

        assert!(spawner.tick(0.1, &world()).is_some());
        assert!(spawner.tick(1.0, &world()).is_none());
        assert!(spawner.tick(0.5, &world()).is_none());
        assert!(spawner.tick(0.5, &world()).is_some());
    }

    #[test]
    fn test_population_cap() {
        let bus = EventBus::new();
        let config = SpawnConfig {
            max_population: 2,
            ..SpawnConfig::default()
        };
        let mut spawner = spawner(config, vec![0.5, 0.5, 0.5, 0.05], &bus);
        spawner.start_spawning();

        assert!(spawner.tick(5.0, &world()).is_some());
        assert!(spawner.tick(5.0, &world()).is_some());
        let interval = spawner.interval();
        assert!(spawner.tick(5.0, &world()).is_none());
        assert_eq!(spawner.population(), 2);
        assert_eq!(spawner.interval(), interval);

        let first = spawner.entity_ids()[0];
        assert!(spawner.destroy(first));
        assert!(spawner.tick(5.0, &world()).is_some());
    }

    #[test]
    fn test_pause_keeps_interval() {
        let bus = EventBus::new();
        let config = SpawnConfig {
            max_population: 100,
            ..SpawnConfig::default()
        };
        let mut spawner = spawner(config, vec![0.5, 0.5, 0.5, 0.9], &bus);
        spawner.start_spawning();
        spawner.tick(5.0, &world());
        let interval = spawner.interval();
        let countdown = spawner.countdown();

        assert!(spawner.pause());
        assert!(spawner.tick(100.0, &world()).is_none());
        assert!(spawner.resume());
        assert_eq!(spawner.interval(), interval);
        assert_eq!(spawner.countdown(), countdown);
    }

    #[test]
    fn test_perimeter_spawn_avoids_protected() {
        let bus = EventBus::new();
        let mut spawner = spawner(
            SpawnConfig::default(),
            // left edge middle (rejected), right edge middle, heading 0, Large
            vec![0.0, 0.5, 0.3, 0.5, 0.0, 0.9],
            &bus,
        );
        let world = StaticWorld {
            field: PlayField::centered(10.0, 5.0),
            protected: Some(Vec2::new(-12.0, 0.0)),
        };

        let id = spawner.spawn_random(&world).unwrap();
        let rock = spawner.entity(id).unwrap();
        assert_eq!(rock.tier(), Tier::Large);
        assert!(rock.body().position.distance(Vec2::new(12.0, 0.0)) < 1e-4);
        assert!(rock.body().velocity.distance(Vec2::new(1.5, 0.0)) < 1e-4);
        assert_eq!(spawner.counters().position_fallbacks, 0);
    }

    #[test]
    fn test_unsatisfiable_distance_falls_back() {
        let bus = EventBus::new();
        let config = SpawnConfig {
            min_distance_from_protected: 1_000.0,
            ..SpawnConfig::default()
        };
        let mut spawner = spawner(config, vec![0.3, 0.6, 0.9], &bus);

        assert!(spawner.spawn_random(&world()).is_some());
        assert_eq!(spawner.counters().position_fallbacks, 1);
    }

    #[test]
    fn test_direction_points_inward() {
        let bus = EventBus::new();
        let mut spawner = spawner(SpawnConfig::default(), vec![0.9, 0.5, 0.75, 0.9], &bus);
        let id = spawner.spawn_random(&world()).unwrap();
        let rock = spawner.entity(id).unwrap();

        // Top edge, random heading straight down, blended with "toward center".
        assert!(rock.body().position.y > 5.0);
        let heading = rock.body().velocity.normalized();
        assert!((heading.length() - 1.0).abs() < 1e-5);
        assert!(heading.y < 0.0);
    }

    #[test]
    fn test_direction_blends_heading_with_center() {
        let bus = EventBus::new();
        // Right edge middle, heading straight up (perpendicular to center), Large.
        let mut spawner = spawner(SpawnConfig::default(), vec![0.3, 0.5, 0.25, 0.9], &bus);
        let world = StaticWorld {
            field: PlayField::centered(10.0, 5.0),
            protected: None,
        };

        let id = spawner.spawn_random(&world).unwrap();
        let rock = spawner.entity(id).unwrap();
        assert!(rock.body().position.distance(Vec2::new(12.0, 0.0)) < 1e-4);

        let heading = Vec2::new(0.0, 1.0);
        let to_center = Vec2::new(-1.0, 0.0);
        let expected = (heading * 0.7 + to_center * 0.3).normalized();
        let actual = rock.body().velocity.normalized();
        assert!(actual.distance(expected) < 1e-5, "{actual:?} != {expected:?}");
        assert!((rock.body().velocity.length() - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_direction_at_center_keeps_heading() {
        let bus = EventBus::new();
        let mut spawner = spawner(SpawnConfig::default(), vec![0.5], &bus);
        let field = PlayField::centered(10.0, 5.0);

        // Heading PI: pointing along -X.
        let direction = spawner.sample_direction(&field, field.center());
        assert!(direction.distance(Vec2::new(-1.0, 0.0)) < 1e-5);
    }

    #[test]
    fn test_destroy_large_spawns_two_medium() {
        let bus = EventBus::new();
        let spawned = record(&bus, Channel::EntitySpawned);
        let destroyed = record(&bus, Channel::EntityDestroyed);
        let mut spawner = spawner(SpawnConfig::default(), vec![0.5], &bus);

        let id = spawner.spawn_entity(Tier::Large, Vec2::ZERO, Vec2::X).unwrap();
        assert!(spawner.destroy(id));
        assert!(!spawner.destroy(id));

        assert_eq!(destroyed.lock().len(), 1);
        assert_eq!(spawned.lock().len(), 3);
        assert!(spawner.entity(id).is_none());
        assert!(!spawner.is_active(id));

        let children: Vec<&Asteroid> = spawner.entities().collect();
        assert_eq!(children.len(), 2);
        for child in &children {
            assert_eq!(child.tier(), Tier::Medium);
            assert!((child.body().position.length() - 0.5).abs() < 1e-5);
        }
        let (a, b) = (children[0].body().velocity, children[1].body().velocity);
        assert!((a.y + b.y).abs() < 1e-5);
        assert_eq!(spawner.counters().fragments, 2);
    }

    #[test]
    fn test_children_spawn_before_notification() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for channel in [Channel::EntitySpawned, Channel::EntityDestroyed] {
            let order = Arc::clone(&order);
            bus.subscribe(channel, move |event| {
                order.lock().push(event.channel());
                Ok(())
            });
        }
        let mut spawner = spawner(SpawnConfig::default(), vec![0.5], &bus);
        let id = spawner.spawn_entity(Tier::Medium, Vec2::ZERO, Vec2::Y).unwrap();
        order.lock().clear();

        spawner.destroy(id);
        assert_eq!(
            *order.lock(),
            vec![Channel::EntitySpawned, Channel::EntitySpawned, Channel::EntityDestroyed]
        );
    }

    #[test]
    fn test_small_has_no_children() {
        let bus = EventBus::new();
        let mut spawner = spawner(SpawnConfig::default(), vec![0.5], &bus);
        let id = spawner.spawn_entity(Tier::Small, Vec2::ZERO, Vec2::X).unwrap();

        assert_eq!(spawner.damage(id, 1), DamageOutcome::Depleted);
        assert_eq!(spawner.population(), 0);
        assert_eq!(spawner.counters().destroyed, 1);
    }

    #[test]
    fn test_hit_publishes_and_survives() {
        let bus = EventBus::new();
        let hits = record(&bus, Channel::EntityHit);
        let mut spawner = spawner(SpawnConfig::default(), vec![0.5], &bus);
        let id = spawner.spawn_entity(Tier::Large, Vec2::new(1.0, 1.0), Vec2::X).unwrap();

        assert_eq!(spawner.damage(id, 1), DamageOutcome::Hit { remaining: 2 });
        assert_eq!(
            *hits.lock(),
            vec![GameEvent::EntityHit {
                id,
                position: Vec2::new(1.0, 1.0)
            }]
        );
        assert_eq!(spawner.damage(EntityId::NULL, 1), DamageOutcome::Ignored);
    }

    #[test]
    fn test_instant_destroy_is_silent() {
        let bus = EventBus::new();
        let destroyed = record(&bus, Channel::EntityDestroyed);
        let mut spawner = spawner(SpawnConfig::default(), vec![0.5], &bus);
        let id = spawner.spawn_entity(Tier::Large, Vec2::ZERO, Vec2::X).unwrap();

        assert!(spawner.instant_destroy(id));
        assert!(!spawner.instant_destroy(id));
        assert!(destroyed.lock().is_empty());
        assert_eq!(spawner.population(), 0);
        assert!(!spawner.destroy(id));
    }

    #[test]
    fn test_duplicate_notifications_are_idempotent() {
        let bus = EventBus::new();
        let mut spawner = spawner(SpawnConfig::default(), vec![0.5], &bus);
        let id = spawner.spawn_entity(Tier::Small, Vec2::ZERO, Vec2::X).unwrap();
        let snapshot = spawner.entity(id).unwrap().snapshot();

        let _ = bus.publish(GameEvent::EntitySpawned(snapshot));
        let _ = bus.publish(GameEvent::EntitySpawned(snapshot));
        assert_eq!(spawner.population(), 1);

        let _ = bus.publish(GameEvent::EntityDestroyed(snapshot));
        let _ = bus.publish(GameEvent::EntityDestroyed(snapshot));
        assert_eq!(spawner.population(), 0);
    }

    #[test]
    fn test_lifecycle_signals() {
        let bus = EventBus::new();
        let mut spawner = spawner(SpawnConfig::default(), vec![0.5, 0.5, 0.5, 0.9], &bus);

        let _ = bus.publish(GameEvent::GameStarted);
        assert_eq!(spawner.pending_signals(), 1);
        spawner.process_lifecycle(&world());
        assert_eq!(spawner.population(), 3);
        assert_eq!(spawner.state(), SpawnState::Running);
        assert!(spawner.entity_ids().iter().all(|id| id.generation() == 1));

        let _ = bus.publish(GameEvent::GamePaused);
        spawner.process_lifecycle(&world());
        assert_eq!(spawner.state(), SpawnState::Paused);

        let _ = bus.publish(GameEvent::GameResumed);
        let _ = bus.publish(GameEvent::GameOver);
        spawner.process_lifecycle(&world());
        assert_eq!(spawner.state(), SpawnState::Stopped);
        assert_eq!(spawner.population(), 0);
        assert_eq!(spawner.entities().count(), 0);
    }

    #[test]
    fn test_halt_discards_pending_signals() {
        let bus = EventBus::new();
        let mut spawner = spawner(SpawnConfig::default(), vec![0.5, 0.5, 0.5, 0.9], &bus);
        spawner.spawn_entity(Tier::Large, Vec2::ZERO, Vec2::X);
        let _ = bus.publish(GameEvent::GameStarted);

        assert_eq!(spawner.halt(), 1);
        assert_eq!(spawner.pending_signals(), 0);
        spawner.process_lifecycle(&world());
        assert_eq!(spawner.state(), SpawnState::Stopped);
        assert_eq!(spawner.population(), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        {
            let _spawner = spawner(SpawnConfig::default(), vec![0.5], &bus);
            assert_eq!(bus.subscriber_count(Channel::GameStarted), 1);
        }
        assert_eq!(bus.subscriber_count(Channel::GameStarted), 0);
        assert_eq!(bus.subscriber_count(Channel::EntityDestroyed), 0);
    }

    struct BrokenFactory;

    impl EntityFactory for BrokenFactory {
        fn create(&mut self, tier: Tier, _position: Vec2) -> Result<BodyHandle, FactoryError> {
            Err(FactoryError::new(format!("no template for {tier:?}")))
        }

        fn dispose(&mut self, _body: BodyHandle) {}
    }

    #[test]
    fn test_factory_failure_skips_spawn() {
        let bus = EventBus::new();
        let mut spawner = Spawner::new(
            SpawnConfig::default(),
            steady_tiers(),
            Box::new(BrokenFactory),
            Box::new(ScriptedRandom::new(vec![0.5])),
            &bus,
        );
        spawner.start_spawning();

        assert!(spawner.tick(5.0, &world()).is_none());
        assert_eq!(spawner.counters().skipped, 1);
        assert_eq!(spawner.interval(), 2.0);
        assert_eq!(spawner.population(), 0);
    }
}
