//! # Game Configuration
//!
//! Everything a deployment tunes, loaded once at startup from TOML.
//!
//! Every section falls back to the reference configuration, so an empty file
//! is a valid config:
//!
//! ```toml
//! [spawn]
//! initial_interval = 1.5
//! max_population = 14
//!
//! [tiers.large]
//! speed = 1.2
//! health = 4
//! score_value = 25
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shatter_core::PoolError;
use shatter_shared::PlayField;

use crate::effects::EffectKind;
use crate::error::{ConfigError, ConfigResult};
use crate::gameplay::{ResourceKind, Tier};

/// Top-level configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Visible play field used when the host does not supply one.
    pub play_field: PlayField,
    /// Entity pools, registered once at startup.
    pub pools: Vec<PoolConfig>,
    /// Population control.
    pub spawn: SpawnConfig,
    /// Per-tier speed, health and score.
    pub tiers: TierTable,
    /// Pooled visual effects.
    pub effects: Vec<EffectConfig>,
    /// Session-level timing and seeding.
    pub session: SessionConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            play_field: PlayField::default(),
            pools: vec![
                PoolConfig::new("asteroid_large", ResourceKind::LargeAsteroid, 4, 16),
                PoolConfig::new("asteroid_medium", ResourceKind::MediumAsteroid, 8, 32),
                PoolConfig::new("asteroid_small", ResourceKind::SmallAsteroid, 16, 64),
            ],
            spawn: SpawnConfig::default(),
            tiers: TierTable::default(),
            effects: vec![
                EffectConfig::new(EffectKind::AsteroidHit, 0.1, 20),
                EffectConfig::new(EffectKind::SmallExplosion, 1.0, 12),
                EffectConfig::new(EffectKind::MediumExplosion, 1.0, 12),
                EffectConfig::new(EffectKind::LargeExplosion, 1.0, 8),
            ],
            session: SessionConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed TOML, otherwise whatever
    /// [`GameConfig::validate`] rejects.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, then as
    /// [`GameConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks every range constraint.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Pool`] for duplicate pool names or `max_size < initial_size`
    /// - [`ConfigError::Invalid`] for any other out-of-range value
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.play_field.is_valid() {
            return Err(invalid("play_field must have a positive width and height"));
        }

        let mut names = HashSet::new();
        for pool in &self.pools {
            if !names.insert(pool.name.as_str()) {
                return Err(PoolError::DuplicatePool(pool.name.clone()).into());
            }
            if pool.max_size < pool.initial_size {
                return Err(PoolError::InvalidCapacity {
                    pool: pool.name.clone(),
                    initial: pool.initial_size,
                    max: pool.max_size,
                }
                .into());
            }
        }

        self.spawn.validate()?;

        for tier in Tier::ALL {
            let stats = self.tiers.for_tier(tier);
            if stats.health <= 0 {
                return Err(invalid(format!("{tier:?} health must be positive")));
            }
            if stats.score_value <= 0 {
                return Err(invalid(format!("{tier:?} score_value must be positive")));
            }
            if !is_non_negative(stats.speed) {
                return Err(invalid(format!("{tier:?} speed must not be negative")));
            }
        }

        let mut effects = HashSet::new();
        for effect in &self.effects {
            if !effects.insert(effect.effect) {
                return Err(PoolError::DuplicatePool(effect.effect.name().to_owned()).into());
            }
            if !is_positive(effect.duration) {
                return Err(invalid(format!("{} duration must be positive", effect.effect.name())));
            }
        }

        if !is_positive(self.session.game_over_delay) {
            return Err(invalid("session.game_over_delay must be positive"));
        }

        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(reason.into())
}

// NaN fails both checks.
fn is_positive(value: f32) -> bool {
    value > 0.0
}

fn is_non_negative(value: f32) -> bool {
    value >= 0.0
}

/// One entity pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Unique pool name.
    pub name: String,
    /// Kind of instance the pool builds.
    pub template_kind: ResourceKind,
    /// Pre-warmed population.
    pub initial_size: usize,
    /// Idle bound.
    pub max_size: usize,
}

impl PoolConfig {
    /// Creates a pool entry.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        template_kind: ResourceKind,
        initial_size: usize,
        max_size: usize,
    ) -> Self {
        Self {
            name: name.into(),
            template_kind,
            initial_size,
            max_size,
        }
    }
}

/// Population control.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Seconds between spawns right after spawning starts.
    pub initial_interval: f32,
    /// Interval shrink per successful spawn, scaled by the tick delta.
    pub interval_decay_step: f32,
    /// Interval floor.
    pub min_interval: f32,
    /// Population cap checked before each spawn.
    pub max_population: usize,
    /// Perimeter samples closer than this to the protected entity are resampled.
    pub min_distance_from_protected: f32,
    /// Entities spawned at once when a game starts.
    pub initial_burst_count: usize,
    /// How far outside the field edge spawns land (fraction of the field size).
    pub spawn_margin: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            initial_interval: 2.0,
            interval_decay_step: 0.1,
            min_interval: shatter_shared::constants::REFERENCE_MIN_SPAWN_INTERVAL,
            max_population: 10,
            min_distance_from_protected: 3.0,
            initial_burst_count: 3,
            spawn_margin: shatter_shared::constants::SPAWN_EDGE_MARGIN,
        }
    }
}

impl SpawnConfig {
    fn validate(&self) -> ConfigResult<()> {
        if !is_positive(self.initial_interval) {
            return Err(invalid("spawn.initial_interval must be positive"));
        }
        if !is_non_negative(self.interval_decay_step) {
            return Err(invalid("spawn.interval_decay_step must not be negative"));
        }
        if !is_non_negative(self.min_interval) {
            return Err(invalid("spawn.min_interval must not be negative"));
        }
        if !is_non_negative(self.min_distance_from_protected) {
            return Err(invalid("spawn.min_distance_from_protected must not be negative"));
        }
        if !is_non_negative(self.spawn_margin) {
            return Err(invalid("spawn.spawn_margin must not be negative"));
        }
        Ok(())
    }
}

/// Stats for one size tier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Base travel speed (units per second).
    pub speed: f32,
    /// Hit points at spawn.
    pub health: i32,
    /// Points awarded on destruction.
    pub score_value: i32,
}

impl TierConfig {
    /// Creates a tier entry.
    #[must_use]
    pub const fn new(speed: f32, health: i32, score_value: i32) -> Self {
        Self {
            speed,
            health,
            score_value,
        }
    }
}

/// Stats for every tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierTable {
    /// Large tier.
    pub large: TierConfig,
    /// Medium tier.
    pub medium: TierConfig,
    /// Small tier.
    pub small: TierConfig,
    /// Randomize spawn speed by ±20%.
    pub speed_jitter: bool,
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            large: TierConfig::new(1.5, 3, 20),
            medium: TierConfig::new(2.5, 2, 50),
            small: TierConfig::new(3.5, 1, 100),
            speed_jitter: true,
        }
    }
}

impl TierTable {
    /// Stats for one tier.
    #[must_use]
    pub const fn for_tier(&self, tier: Tier) -> &TierConfig {
        match tier {
            Tier::Large => &self.large,
            Tier::Medium => &self.medium,
            Tier::Small => &self.small,
        }
    }
}

/// One pooled effect.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectConfig {
    /// Which effect.
    pub effect: EffectKind,
    /// Seconds before the instance goes back to its pool.
    pub duration: f32,
    /// Idle bound; a quarter of it is pre-warmed.
    pub pool_size: usize,
}

impl EffectConfig {
    /// Creates an effect entry.
    #[must_use]
    pub const fn new(effect: EffectKind, duration: f32, pool_size: usize) -> Self {
        Self {
            effect,
            duration,
            pool_size,
        }
    }
}

/// Session-level settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seconds between the player's death and game over.
    pub game_over_delay: f32,
    /// Seed for the spawner's random source.
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            game_over_delay: 2.0,
            seed: 0x5EED,
        }
    }
}
