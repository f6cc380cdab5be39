//! Player settings: ladder threshold and speed tier.
//!
//! Persisted as JSON next to the high score. CLI flags override for one run.

use crate::storage::Store;
use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Key of the settings file inside the config directory.
pub const SETTINGS_KEY: &str = "settings.json";

pub const DEFAULT_LADDER_THRESHOLD: u32 = 50;

/// Lowest threshold the settings screen accepts.
pub const MIN_LADDER_THRESHOLD: u32 = 20;

/// Snake speed; each tier is a fixed tick interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SpeedTier {
    Slow,
    #[default]
    Normal,
    Fast,
    Impossible,
}

impl SpeedTier {
    pub const ALL: [Self; 4] = [Self::Slow, Self::Normal, Self::Fast, Self::Impossible];

    pub fn tick_interval(self) -> Duration {
        Duration::from_millis(match self {
            Self::Slow => 200,
            Self::Normal => 150,
            Self::Fast => 100,
            Self::Impossible => 60,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Normal => "normal",
            Self::Fast => "fast",
            Self::Impossible => "impossible",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Normal => "Normal",
            Self::Fast => "Fast",
            Self::Impossible => "Impossible",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Slow => Self::Normal,
            Self::Normal => Self::Fast,
            Self::Fast => Self::Impossible,
            Self::Impossible => Self::Slow,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Slow => Self::Impossible,
            Self::Normal => Self::Slow,
            Self::Fast => Self::Normal,
            Self::Impossible => Self::Fast,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Points between ladders. 0 disables ladders (CLI only).
    pub ladder_threshold: u32,
    pub speed: SpeedTier,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ladder_threshold: DEFAULT_LADDER_THRESHOLD,
            speed: SpeedTier::Normal,
        }
    }
}

impl Settings {
    /// Load from the store. Missing or malformed file → defaults.
    pub fn load(store: &Store) -> Self {
        let Some(raw) = store.get(SETTINGS_KEY) else {
            log::info!("no settings file, using defaults");
            return Self::default();
        };
        match serde_json::from_str(&raw) {
            Ok(settings) => {
                log::info!("loaded settings from {}", store.path_for(SETTINGS_KEY).display());
                settings
            }
            Err(e) => {
                log::warn!("ignoring malformed settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &Store) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        store.set(SETTINGS_KEY, &json)?;
        log::info!("settings saved");
        Ok(())
    }
}

/// Clamp a threshold to the settings-screen minimum.
pub fn clamp_threshold(value: u32) -> u32 {
    value.max(MIN_LADDER_THRESHOLD)
}

/// Parse the settings threshold field. Empty or non-numeric input → minimum.
pub fn parse_threshold_input(input: &str) -> u32 {
    match input.trim().parse::<i64>() {
        Ok(v) if v > 0 => clamp_threshold(u32::try_from(v).unwrap_or(u32::MAX)),
        _ => MIN_LADDER_THRESHOLD,
    }
}

/// Threshold from the command line: 0 keeps ladders off, anything else is clamped.
pub fn cli_threshold(value: u32) -> u32 {
    if value == 0 { 0 } else { clamp_threshold(value) }
}
