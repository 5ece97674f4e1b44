//! Configuration management for the application.
//!
//! Settings live in a TOML file under the platform config directory, or under
//! `$OPENBOARD_CONFIG_DIR` when that variable is set.

use crate::constants::{APP_NAME, CONFIG_DIR_ENV, DEFAULT_MASTER_VOLUME, DEFAULT_SOUND_VOLUME};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File system locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Directory holding the `ambient`, `music` and `effects` folders.
    ///
    /// The working directory is used when unset.
    pub sounds_root: Option<PathBuf>,
}

/// Audio mixing defaults, in percent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_master_volume")]
    pub master_volume: u8,
    /// Initial slider value for every sound on the board.
    #[serde(default = "default_sound_volume")]
    pub sound_volume: u8,
}

fn default_master_volume() -> u8 {
    DEFAULT_MASTER_VOLUME
}

fn default_sound_volume() -> u8 {
    DEFAULT_SOUND_VOLUME
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            master_volume: default_master_volume(),
            sound_volume: default_sound_volume(),
        }
    }
}

/// Window preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_window_width")]
    pub window_width: f32,
    #[serde(default = "default_window_height")]
    pub window_height: f32,
}

fn default_window_width() -> f32 {
    1400.0
}

fn default_window_height() -> f32 {
    900.0
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/OpenBoard/config.toml`
/// - macOS: `~/Library/Application Support/OpenBoard/config.toml`
/// - Windows: `%APPDATA%\OpenBoard\config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the config directory, honoring `$OPENBOARD_CONFIG_DIR`.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(APP_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the config file, defaults if it doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from `path`, defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .context(format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to `path` using a temp file + rename for atomic writes.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .context(format!("Failed to create config directory: {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let temp_path = path.with_extension("toml.tmp");
        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, path).context(format!(
            "Failed to rename temp config file to: {}",
            path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.audio.master_volume > 100 {
            anyhow::bail!(
                "master_volume must be between 0 and 100, got {}",
                self.audio.master_volume
            );
        }
        if self.audio.sound_volume > 100 {
            anyhow::bail!(
                "sound_volume must be between 0 and 100, got {}",
                self.audio.sound_volume
            );
        }
        if !(self.ui.window_width > 0.0 && self.ui.window_height > 0.0) {
            anyhow::bail!(
                "window size must be positive, got {}x{}",
                self.ui.window_width,
                self.ui.window_height
            );
        }
        Ok(())
    }

    /// Sounds root to use when none is given on the command line.
    #[must_use]
    pub fn sounds_root(&self) -> PathBuf {
        self.paths
            .sounds_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
