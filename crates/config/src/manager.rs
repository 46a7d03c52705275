//! Configuration manager - main API for config operations

use crate::persistence::ConfigPersistence;
use crate::{Config, ConfigError, ConfigResult, LogLevel};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "TILAWAH";

/// Main configuration manager
///
/// Handles file paths, defaults, environment overrides and validation.
pub struct ConfigManager {
    persistence: ConfigPersistence,
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager using the default config directory
    ///
    /// - Linux: `~/.config/tilawah/`
    /// - macOS: `~/Library/Application Support/tilawah/`
    /// - Windows: `%APPDATA%\tilawah\`
    pub fn new() -> ConfigResult<Self> {
        let config_dir = Self::project_dirs()?.config_dir().to_path_buf();
        Self::with_directory(config_dir)
    }

    /// Creates a config manager with a custom config directory
    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        let config_path = config_dir.join("config.toml");
        let persistence = ConfigPersistence::new(config_path);

        Ok(Self {
            persistence,
            config_dir,
        })
    }

    fn project_dirs() -> ConfigResult<ProjectDirs> {
        ProjectDirs::from("", "", "tilawah").ok_or_else(|| ConfigError::PathResolutionError {
            reason: "Could not determine user config directory".to_string(),
        })
    }

    /// Resolves the local storage directory
    ///
    /// `app.data_dir` wins; otherwise the platform data directory is used.
    pub fn data_dir(config: &Config) -> ConfigResult<PathBuf> {
        match &config.app.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.data_dir().to_path_buf()),
        }
    }

    /// Returns the config directory path
    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }

    /// Returns the full config file path
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Loads the configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file is corrupted, returns an error.
    pub fn load(&self) -> ConfigResult<Config> {
        self.persistence.load()
    }

    /// Loads the configuration, falling back to defaults on any error
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config: {}, using defaults", e);
                Config::default()
            }
        }
    }

    /// Saves the configuration to file
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.persistence.save(config)
    }

    /// Updates the configuration using a closure
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use tilawah_config::ConfigManager;
    /// # let manager = ConfigManager::new().unwrap();
    /// manager.update(|config| {
    ///     config.player.auto_advance = false;
    /// }).expect("Failed to update config");
    /// ```
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        update_fn(&mut config);
        self.save(&config)
    }

    /// Generates a default config file if one doesn't exist
    ///
    /// Returns Ok(true) if a new file was created, Ok(false) if one already exists.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.config_path().exists() {
            log::info!(
                "Config file already exists at {}",
                self.config_path().display()
            );
            return Ok(false);
        }

        self.persistence.generate_default_with_comments()?;
        Ok(true)
    }

    /// Resets the configuration to defaults
    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Validates the current configuration file
    ///
    /// Returns all validation errors found, or an empty list if valid.
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let config = self.load()?;

        match config.validate() {
            Ok(()) => Ok(Vec::new()),
            Err(errors) => Ok(errors.iter().map(|e| e.to_string()).collect()),
        }
    }

    /// Loads the config and applies `TILAWAH_<SECTION>_<FIELD>` overrides
    /// from the process environment
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_env_overrides(&mut config, |key| std::env::var(key).ok());

        if let Err(errors) = config.validate() {
            log::warn!(
                "Config validation warnings after env overrides: {:?}",
                errors
            );
        }

        Ok(config)
    }
}

/// Applies overrides from `lookup` to `config`
///
/// Values that fail to parse are logged and ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |suffix: &str| {
        let key = format!("{}_{}", ENV_PREFIX, suffix);
        lookup(&key).map(|value| (key, value))
    };

    if let Some((key, value)) = var("PLAYER_AUTO_ADVANCE") {
        match value.trim().parse::<bool>() {
            Ok(v) => config.player.auto_advance = v,
            Err(_) => log::warn!("Ignoring {}={}: expected true or false", key, value),
        }
    }

    if let Some((key, value)) = var("PLAYER_ADVANCE_DELAY_MS") {
        match value.trim().parse::<u64>() {
            Ok(v) => config.player.advance_delay_ms = v,
            Err(_) => log::warn!("Ignoring {}={}: expected milliseconds", key, value),
        }
    }

    if let Some((_, value)) = var("AUDIO_DEFAULT_URL_TEMPLATE") {
        config.audio.default_url_template = value;
    }

    if let Some((key, value)) = var("APP_LOG_LEVEL") {
        match value.parse::<LogLevel>() {
            Ok(level) => config.app.log_level = level,
            Err(e) => log::warn!("Ignoring {}: {}", key, e),
        }
    }

    if let Some((_, value)) = var("APP_DATA_DIR") {
        config.app.data_dir = Some(PathBuf::from(value));
    }

    if let Some((_, value)) = var("APP_BUNDLE_DIR") {
        config.app.bundle_dir = Some(PathBuf::from(value));
    }
}
