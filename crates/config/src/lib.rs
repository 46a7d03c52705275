//! Tilawah configuration
//!
//! Settings for the recitation player, stored as TOML in the platform config
//! directory. New sections implement the `ConfigSection` trait and are added
//! to [`Config`].
//!
//! - **Graceful degradation**: invalid values are logged and kept, callers
//!   decide whether to fall back to defaults
//! - **Atomic writes**: the file is written through a temp file and renamed
//! - **Versioned**: older files are migrated on load
//!
//! # Example
//!
//! ```rust,no_run
//! use tilawah_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("Failed to initialize config");
//! let config = manager.load().unwrap_or_else(|e| {
//!     eprintln!("Config error: {}, using defaults", e);
//!     Config::default()
//! });
//!
//! println!("Auto-advance: {}", config.player.auto_advance);
//! ```

mod error;
mod manager;
mod migration;
mod persistence;
mod validation;

// Config sections
mod app_config;
mod audio_config;
mod player_config;
mod storage_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::{apply_env_overrides, ConfigManager, ENV_PREFIX};
pub use validation::{ConfigSection, Validator};

pub use app_config::{AppConfig, LogLevel};
pub use audio_config::{AudioConfig, DEFAULT_URL_TEMPLATE};
pub use player_config::PlayerConfig;
pub use storage_config::StorageConfig;

use serde::{Deserialize, Serialize};

/// Current config file format version for migrations
pub const CONFIG_VERSION: u32 = 2;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Application-level settings
    pub app: AppConfig,

    /// Playback coordinator and reader behaviour
    pub player: PlayerConfig,

    /// Audio URL resolution
    pub audio: AudioConfig,

    /// Local and remote storage tuning
    pub storage: StorageConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.player.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.audio.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.storage.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges this config with another, preferring values from `other`
    ///
    /// Override chain: defaults < file < env vars < CLI args
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.player.merge(other.player);
        self.audio.merge(other.audio);
        self.storage.merge(other.storage);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            player: PlayerConfig::default(),
            audio: AudioConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}
