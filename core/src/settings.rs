use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const SPEED_ENV: &str = "SHORTCUT_SPEED";
pub const ACTION_DELAY_ENV: &str = "SHORTCUT_ACTION_DELAY_MS";
pub const APP_SWITCH_DELAY_ENV: &str = "SHORTCUT_APP_SWITCH_DELAY_MS";
pub const KEY_EVENT_DELAY_ENV: &str = "SHORTCUT_KEY_EVENT_DELAY_US";
pub const CHARACTER_DELAY_ENV: &str = "SHORTCUT_CHARACTER_DELAY_US";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedPreset {
    Slow,
    Normal,
    Fast,
}

impl FromStr for SpeedPreset {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "slow" => Ok(SpeedPreset::Slow),
            "normal" | "default" => Ok(SpeedPreset::Normal),
            "fast" => Ok(SpeedPreset::Fast),
            other => Err(EngineError::Config(format!("unknown speed preset '{}'", other))),
        }
    }
}

/// Pacing between and within actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    pub action_delay_ms: u64,
    pub app_switch_delay_ms: u64,
    pub key_event_delay_us: u64,
    pub character_delay_us: u64,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self::preset(SpeedPreset::Normal)
    }
}

impl ExecutionSettings {
    pub fn preset(speed: SpeedPreset) -> Self {
        match speed {
            SpeedPreset::Slow => Self {
                action_delay_ms: 300,
                app_switch_delay_ms: 1_000,
                key_event_delay_us: 20_000,
                character_delay_us: 16_000,
            },
            SpeedPreset::Normal => Self {
                action_delay_ms: 150,
                app_switch_delay_ms: 500,
                key_event_delay_us: 10_000,
                character_delay_us: 8_000,
            },
            SpeedPreset::Fast => Self {
                action_delay_ms: 50,
                app_switch_delay_ms: 250,
                key_event_delay_us: 5_000,
                character_delay_us: 3_000,
            },
        }
    }

    pub fn action_delay(&self) -> Duration {
        Duration::from_millis(self.action_delay_ms)
    }

    pub fn app_switch_delay(&self) -> Duration {
        Duration::from_millis(self.app_switch_delay_ms)
    }

    pub fn key_event_delay(&self) -> Duration {
        Duration::from_micros(self.key_event_delay_us)
    }

    pub fn character_delay(&self) -> Duration {
        Duration::from_micros(self.character_delay_us)
    }

    /// Default settings file: `<config dir>/shortcut-engine/settings.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("shortcut-engine").join("settings.json"))
    }

    /// Reads settings from a JSON file. Missing fields keep the normal preset.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Applies `SHORTCUT_SPEED` and the per-field overrides from the process
    /// environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(speed) = lookup(SPEED_ENV) {
            self = Self::preset(speed.parse()?);
        }
        if let Some(v) = parse_u64(&lookup, ACTION_DELAY_ENV)? {
            self.action_delay_ms = v;
        }
        if let Some(v) = parse_u64(&lookup, APP_SWITCH_DELAY_ENV)? {
            self.app_switch_delay_ms = v;
        }
        if let Some(v) = parse_u64(&lookup, KEY_EVENT_DELAY_ENV)? {
            self.key_event_delay_us = v;
        }
        if let Some(v) = parse_u64(&lookup, CHARACTER_DELAY_ENV)? {
            self.character_delay_us = v;
        }
        Ok(self)
    }

    /// Normal preset, then the default settings file if present, then the
    /// environment.
    pub fn resolve() -> Result<Self> {
        let mut settings = Self::default();
        if let Some(path) = Self::default_path() {
            if path.exists() {
                settings = Self::load(&path)?;
            }
        }
        settings.with_env_overrides()
    }
}

fn parse_u64<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| EngineError::Config(format!("{} must be a non-negative integer, got '{}'", key, raw))),
        None => Ok(None),
    }
}

/// Fixed timing of the activation protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationTiming {
    pub poll_interval: Duration,
    pub unhide_settle: Duration,
    pub restore_settle: Duration,
    pub default_timeout: Duration,
}

impl Default for ActivationTiming {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            unhide_settle: Duration::from_millis(100),
            restore_settle: Duration::from_millis(300),
            default_timeout: Duration::from_secs(3),
        }
    }
}
