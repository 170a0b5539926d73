//! Config Store - The TOML settings snapshot
//!
//! Every field carries a serde default so a missing or partial file
//! loads cleanly; unknown keys are ignored rather than rejected.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::StoreError;

/// Recorded hotkey chords, in canonical chord-string form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hotkeys {
    pub toggle: Option<String>,
    pub push_to_talk: Option<String>,
}

/// The settings snapshot the panels edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub device_id: Option<String>,
    pub model_id: Option<String>,
    pub sample_rate: u32,
    pub silence_timeout_ms: u64,
    pub punctuation: bool,
    pub launch_at_login: bool,
    pub hotkeys: Hotkeys,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device_id: None,
            model_id: None,
            sample_rate: 16_000,
            silence_timeout_ms: 1_500,
            punctuation: true,
            launch_at_login: false,
            hotkeys: Hotkeys::default(),
        }
    }
}

/// TOML-backed settings store.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Platform config location: `<config dir>/murmur/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("murmur").join("config.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the settings snapshot. A missing file is the default
    /// snapshot, not an error.
    pub fn load(&self) -> Result<Settings, StoreError> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Persist the settings snapshot, creating parent directories as
    /// needed.
    pub fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(settings)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}
