//! Realm configuration
//!
//! Read once at realm start. Every field has a default, so an empty JSON
//! object (or no file at all) is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::boss::BossKind;
use crate::sim::modifiers::ModifierConfig;
use crate::upgrades::UpgradeFlags;

/// Gravity flip period for a world that doesn't set one (seconds)
pub const WORLD_GRAV_FLIP_DEFAULT: f32 = 20.0;
/// Time pulse period for a world that doesn't set one (seconds)
pub const WORLD_TIME_PULSE_DEFAULT: f32 = 8.0;

/// Errors raised while loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config field `{field}` {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// A world definition: a named encounter with its own modifier schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub name: String,
    /// Realm to enter (by name); unknown names fall back to the first realm
    pub realm: Option<String>,
    /// Boss to face (by name); unset picks one at random
    pub boss: Option<String>,
    /// Gravity flip period override (seconds)
    pub grav_flip: Option<f32>,
    /// Time pulse period override (seconds)
    pub time_pulse: Option<f32>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: "Skirmish".to_string(),
            realm: None,
            boss: None,
            grav_flip: None,
            time_pulse: None,
        }
    }
}

impl WorldConfig {
    /// The forced boss, if one is named and recognized
    pub fn forced_boss(&self) -> Option<BossKind> {
        let name = self.boss.as_deref()?;
        let kind = BossKind::from_name(name);
        if kind.is_none() {
            log::warn!("Unknown boss '{}' in world '{}', picking at random", name, self.name);
        }
        kind
    }
}

/// Top-level game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for the simulation RNG
    pub seed: u64,
    pub arena_width: f32,
    pub arena_height: f32,
    /// Assist mode: sturdier platforms
    pub assist: bool,
    /// Cosmetic screen shake on impacts
    pub screen_shake: bool,
    /// Spawn a second player
    pub coop: bool,
    /// World definition; `None` plays a free skirmish with default schedules
    pub world: Option<WorldConfig>,
    /// Upgrades owned at the start of the run
    pub upgrades: UpgradeFlags,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            arena_width: DEFAULT_ARENA_WIDTH,
            arena_height: DEFAULT_ARENA_HEIGHT,
            assist: false,
            screen_shake: true,
            coop: false,
            world: None,
            upgrades: UpgradeFlags::default(),
        }
    }
}

fn positive_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be positive and finite, got {}", value),
        })
    }
}

impl GameConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_finite("arena_width", self.arena_width)?;
        positive_finite("arena_height", self.arena_height)?;
        if let Some(world) = &self.world {
            if let Some(secs) = world.grav_flip {
                positive_finite("world.grav_flip", secs)?;
            }
            if let Some(secs) = world.time_pulse {
                positive_finite("world.time_pulse", secs)?;
            }
        }
        if !(0.0..=4.0).contains(&self.upgrades.aerial_damage) {
            return Err(ConfigError::Invalid {
                field: "upgrades.aerial_damage",
                reason: format!("must be within [0, 4], got {}", self.upgrades.aerial_damage),
            });
        }
        Ok(())
    }

    /// Modifier schedule for this configuration. Worlds run faster schedules
    /// than a free skirmish unless they override them.
    pub fn modifier_config(&self) -> ModifierConfig {
        let mut config = ModifierConfig::default();
        if let Some(world) = &self.world {
            config.grav_flip_every = world.grav_flip.unwrap_or(WORLD_GRAV_FLIP_DEFAULT);
            config.time_pulse_every = world.time_pulse.unwrap_or(WORLD_TIME_PULSE_DEFAULT);
        }
        config
    }

    pub fn forced_boss(&self) -> Option<BossKind> {
        self.world.as_ref().and_then(WorldConfig::forced_boss)
    }
}
