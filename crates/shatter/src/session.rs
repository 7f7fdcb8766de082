//! # Session
//!
//! Composition root for one game: builds the bus, spawner, score keeper and
//! effects director from a [`GameConfig`] and drives them once per tick.
//!
//! ## Tick order
//!
//! ```text
//! ┌───────────────┐   ┌─────────────┐   ┌──────────────────┐   ┌────────────────┐
//! │ 1. lifecycle  │──>│ 2. spawning │──>│ 3. damage and    │──>│ 4. effects and │
//! │    signals    │   │    decision │   │    destruction   │   │    timers      │
//! └───────────────┘   └─────────────┘   └──────────────────┘   └────────────────┘
//! ```
//!
//! Bus delivery is synchronous, so each step's notifications are handled
//! before the next step starts. Same seed + same tick sequence gives the
//! same game.

use std::sync::Arc;

use parking_lot::Mutex;
use shatter_core::EntityId;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::effects::EffectsDirector;
use crate::error::ConfigResult;
use crate::events::{EventBus, GameEvent};
use crate::gameplay::{
    EntityFactory, PooledAsteroidFactory, RandomSource, ScoreKeeper, SeededRandom, Spawner,
    WorldView,
};
use crate::stats::{TickStats, TickStatsAccumulator};
use crate::timers::{TimerId, TimerTable};

/// Top-level game state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameState {
    /// Before the first game.
    Menu,
    /// In play.
    Playing,
    /// Frozen; nothing advances.
    Paused,
    /// Finished; waiting for a restart or a return to the menu.
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionAction {
    EndGame,
}

/// A session shared with another thread (e.g. an input handler).
pub type SharedSession = Arc<Mutex<Session>>;

/// One game's worth of runtime state.
pub struct Session {
    config: GameConfig,
    bus: EventBus,
    spawner: Spawner,
    score: ScoreKeeper,
    effects: EffectsDirector,
    state: GameState,
    timers: TimerTable<SessionAction>,
    pending_game_over: Option<TimerId>,
    pending_damage: Vec<(EntityId, i32)>,
    tick_count: u64,
    stats: TickStatsAccumulator,
}

impl Session {
    /// Builds a session with pooled entities and a seeded random source.
    ///
    /// # Errors
    ///
    /// Any [`crate::ConfigError`]: the config is invalid or a pool could not
    /// be set up.
    pub fn new(config: GameConfig) -> ConfigResult<Self> {
        config.validate()?;
        let factory = PooledAsteroidFactory::from_config(&config.pools)?;
        let rng = SeededRandom::new(config.session.seed);
        Self::with_parts(config, Box::new(factory), Box::new(rng))
    }

    /// Builds a session around a host-supplied factory and random source.
    ///
    /// # Errors
    ///
    /// As [`Session::new`].
    pub fn with_parts(
        config: GameConfig,
        factory: Box<dyn EntityFactory>,
        rng: Box<dyn RandomSource>,
    ) -> ConfigResult<Self> {
        config.validate()?;

        let bus = EventBus::new();
        let spawner = Spawner::new(
            config.spawn.clone(),
            config.tiers.clone(),
            factory,
            rng,
            &bus,
        );
        let score = ScoreKeeper::new(&bus, 0);
        let effects = EffectsDirector::new(&bus, &config.effects)?;

        info!(seed = config.session.seed, "session ready");
        Ok(Self {
            config,
            bus,
            spawner,
            score,
            effects,
            state: GameState::Menu,
            timers: TimerTable::new(),
            pending_game_over: None,
            pending_damage: Vec::new(),
            tick_count: 0,
            stats: TickStatsAccumulator::new(),
        })
    }

    /// Wraps the session for sharing across threads.
    #[must_use]
    pub fn shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    // =========================================================================
    // State machine
    // =========================================================================

    /// Starts (or restarts) a game. Ignored while already playing.
    pub fn start_game(&mut self) -> bool {
        if self.state == GameState::Playing {
            return false;
        }
        self.cancel_game_over();
        self.pending_damage.clear();
        self.transition(GameState::Playing, GameEvent::GameStarted);
        true
    }

    /// Pauses a running game.
    pub fn pause(&mut self) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        self.transition(GameState::Paused, GameEvent::GamePaused);
        true
    }

    /// Resumes a paused game.
    pub fn resume(&mut self) -> bool {
        if self.state != GameState::Paused {
            return false;
        }
        self.transition(GameState::Playing, GameEvent::GameResumed);
        true
    }

    /// Pauses when playing, resumes when paused.
    pub fn toggle_pause(&mut self) -> bool {
        match self.state {
            GameState::Playing => self.pause(),
            GameState::Paused => self.resume(),
            GameState::Menu | GameState::GameOver => false,
        }
    }

    /// Ends the game now.
    pub fn end_game(&mut self) -> bool {
        if !matches!(self.state, GameState::Playing | GameState::Paused) {
            return false;
        }
        self.cancel_game_over();
        self.transition(GameState::GameOver, GameEvent::GameOver);
        true
    }

    /// Leaves a paused or finished game for the menu.
    ///
    /// Clears entities, effects and any pending game over. The high score is
    /// kept.
    pub fn return_to_menu(&mut self) -> bool {
        if !matches!(self.state, GameState::Paused | GameState::GameOver) {
            return false;
        }
        self.cancel_game_over();
        self.pending_damage.clear();
        let cleared = self.spawner.halt();
        self.effects.clear();

        let previous = self.state;
        self.state = GameState::Menu;
        info!(?previous, next = ?GameState::Menu, cleared, "game state changed");
        let _ = self.bus.publish(GameEvent::GameStateChanged(GameState::Menu));
        true
    }

    /// Schedules game over after the configured delay.
    pub fn player_died(&mut self) -> bool {
        if self.state != GameState::Playing || self.pending_game_over.is_some() {
            return false;
        }
        let delay = self.config.session.game_over_delay;
        self.pending_game_over = Some(self.timers.schedule(delay, SessionAction::EndGame));
        debug!(delay, "player died, game over scheduled");
        true
    }

    /// Queues damage for the next tick's destruction step.
    pub fn queue_damage(&mut self, id: EntityId, amount: i32) {
        self.pending_damage.push((id, amount));
    }

    fn transition(&mut self, next: GameState, event: GameEvent) {
        let previous = self.state;
        self.state = next;
        info!(?previous, ?next, "game state changed");
        let _ = self.bus.publish(GameEvent::GameStateChanged(next));
        let _ = self.bus.publish(event);
    }

    fn cancel_game_over(&mut self) {
        if let Some(timer) = self.pending_game_over.take() {
            self.timers.cancel(timer);
        }
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Runs one simulation step.
    pub fn tick(&mut self, dt: f32, world: &dyn WorldView) -> TickStats {
        let published_before = self.bus.published_count();
        let failures_before = self.bus.failure_count();
        let counters_before = self.spawner.counters();
        let mut effects_started = 0;

        self.spawner.process_lifecycle(world);

        if self.state != GameState::Paused {
            self.spawner.tick(dt, world);

            for (id, amount) in std::mem::take(&mut self.pending_damage) {
                self.spawner.damage(id, amount);
            }

            effects_started = self.effects.update(dt).started;

            for action in self.timers.advance(dt) {
                match action {
                    SessionAction::EndGame => {
                        self.pending_game_over = None;
                        self.end_game();
                    }
                }
            }

            // Apply a game over raised this tick before the host sees the world.
            self.spawner.process_lifecycle(world);
        }

        self.tick_count += 1;
        let counters = self.spawner.counters();
        let stats = TickStats {
            tick: self.tick_count,
            spawned: delta(counters.spawned, counters_before.spawned),
            destroyed: delta(counters.destroyed, counters_before.destroyed),
            fragments: delta(counters.fragments, counters_before.fragments),
            effects_started: u32::try_from(effects_started).unwrap_or(u32::MAX),
            events_published: delta(self.bus.published_count(), published_before),
            handler_failures: delta(self.bus.failure_count(), failures_before),
            population: u32::try_from(self.spawner.population()).unwrap_or(u32::MAX),
        };
        self.stats.record(stats);
        stats
    }

    /// Clears every entity, effect and timer and drops all subscribers.
    ///
    /// Returns the session's accumulated statistics.
    pub fn teardown(mut self) -> TickStatsAccumulator {
        self.cancel_game_over();
        let _ = self.timers.clear();
        self.pending_damage.clear();
        let cleared = self.spawner.halt();
        self.spawner.clear_pools();
        self.effects.clear();
        self.bus.reset();
        info!(cleared, ticks = self.tick_count, "session torn down");
        self.stats
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Current game state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// The session's bus, for host subscribers (audio, UI).
    #[must_use]
    pub const fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Population control.
    #[must_use]
    pub const fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    /// Population control, for the host's physics step.
    pub fn spawner_mut(&mut self) -> &mut Spawner {
        &mut self.spawner
    }

    /// Score keeping.
    #[must_use]
    pub const fn score(&self) -> &ScoreKeeper {
        &self.score
    }

    /// Pooled effects.
    #[must_use]
    pub const fn effects(&self) -> &EffectsDirector {
        &self.effects
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Ticks run so far.
    #[inline]
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Whether a delayed game over is pending.
    #[must_use]
    pub const fn game_over_pending(&self) -> bool {
        self.pending_game_over.is_some()
    }

    /// Accumulated statistics.
    #[must_use]
    pub const fn stats(&self) -> &TickStatsAccumulator {
        &self.stats
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("tick", &self.tick_count)
            .field("spawner", &self.spawner)
            .finish_non_exhaustive()
    }
}

fn delta(after: u64, before: u64) -> u32 {
    u32::try_from(after.saturating_sub(before)).unwrap_or(u32::MAX)
}
