//! File system persistence for configuration
//!
//! - Atomic writes through a temp file in the same directory
//! - Backup of the previous file before every overwrite
//! - Migration of older versions on load, written back immediately

use crate::{Config, ConfigError, ConfigResult};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use toml::{Table, Value};

/// Handles configuration file persistence
pub struct ConfigPersistence {
    config_path: PathBuf,
}

impl ConfigPersistence {
    /// Creates a new persistence handler for the given config file path
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Path of the backup written before each overwrite
    pub fn backup_path(&self) -> PathBuf {
        self.config_path.with_extension("toml.backup")
    }

    /// Loads configuration from file
    ///
    /// A missing file yields the default config. An empty or unparsable file
    /// is an error.
    pub fn load(&self) -> ConfigResult<Config> {
        if !self.config_path.exists() {
            log::info!(
                "Config file not found at {}, using defaults",
                self.config_path.display()
            );
            return Ok(Config::default());
        }

        let contents =
            fs::read_to_string(&self.config_path).map_err(|e| ConfigError::ReadError {
                path: self.config_path.clone(),
                source: e,
            })?;

        // Empty files are treated as corrupted, not as valid defaults
        if contents.trim().is_empty() {
            return Err(ConfigError::ReadError {
                path: self.config_path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "Config file is empty or contains only whitespace",
                ),
            });
        }

        let mut table: Table = toml::from_str(&contents).map_err(|e| self.parse_error(e))?;
        let migrated = crate::migration::migrate_to_latest(&mut table)?;

        let config: Config = Value::Table(table)
            .try_into()
            .map_err(|e| self.parse_error(e))?;

        if migrated {
            log::info!("Saving migrated config");
            if let Err(e) = self.save(&config) {
                log::warn!("Could not write migrated config: {}", e);
            }
        }

        // Invalid values are kept so the user can fix them without losing data
        if let Err(errors) = config.validate() {
            let error_msg = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            log::warn!("Config validation warnings: {}", error_msg);
        }

        Ok(config)
    }

    /// Saves configuration to file atomically
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        if let Err(errors) = config.validate() {
            let error_msg = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ConfigError::ValidationError(error_msg));
        }

        if let Some(parent) = self.config_path.parent() {
            self.ensure_directory_exists(parent)?;
        }

        if self.config_path.exists() {
            self.backup_config()?;
        }

        let toml_string = toml::to_string_pretty(config).map_err(ConfigError::SerializeError)?;

        let temp_file = self.create_temp_file()?;
        self.write_atomic(temp_file, &toml_string)?;

        log::info!("Config saved to {}", self.config_path.display());
        Ok(())
    }

    /// Writes the default config with explanatory comments
    ///
    /// Used by `ConfigManager::initialize` for first-run setup.
    pub fn generate_default_with_comments(&self) -> ConfigResult<()> {
        if let Some(parent) = self.config_path.parent() {
            self.ensure_directory_exists(parent)?;
        }

        let body = toml::to_string_pretty(&Config::default()).map_err(ConfigError::SerializeError)?;
        let content = format!(
            "# Tilawah configuration\n\
             #\n\
             # [player] controls auto-advance and reader timing (milliseconds).\n\
             # [audio] default_url_template must contain {{chapter}} and {{verse}};\n\
             # both are zero-padded to three digits.\n\
             # Environment variables TILAWAH_<SECTION>_<FIELD> override this file.\n\n{}",
            body
        );

        let temp_file = self.create_temp_file()?;
        self.write_atomic(temp_file, &content)?;
        log::info!("Generated default config at {}", self.config_path.display());
        Ok(())
    }

    fn parse_error(&self, source: toml::de::Error) -> ConfigError {
        ConfigError::ParseError {
            path: self.config_path.clone(),
            source,
        }
    }

    fn ensure_directory_exists(&self, path: &Path) -> ConfigResult<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(|e| ConfigError::DirectoryCreationError {
                path: path.to_path_buf(),
                source: e,
            })?;
            log::info!("Created config directory: {}", path.display());
        }
        Ok(())
    }

    fn backup_config(&self) -> ConfigResult<()> {
        let backup_path = self.backup_path();
        fs::copy(&self.config_path, &backup_path)
            .map_err(|e| ConfigError::BackupError { source: e })?;
        log::debug!("Backed up config to {}", backup_path.display());
        Ok(())
    }

    fn create_temp_file(&self) -> ConfigResult<NamedTempFile> {
        let dir = self
            .config_path
            .parent()
            .ok_or_else(|| ConfigError::PathResolutionError {
                reason: "Config path has no parent directory".to_string(),
            })?;

        NamedTempFile::new_in(dir).map_err(ConfigError::IoError)
    }

    fn write_atomic(&self, mut temp_file: NamedTempFile, content: &str) -> ConfigResult<()> {
        temp_file
            .write_all(content.as_bytes())
            .map_err(ConfigError::IoError)?;
        temp_file.flush().map_err(ConfigError::IoError)?;

        temp_file
            .persist(&self.config_path)
            .map_err(|e| ConfigError::WriteError {
                path: self.config_path.clone(),
                source: e.error,
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CONFIG_VERSION;
    use tempfile::TempDir;

    fn setup_test_dir() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");
        (temp_dir, config_path)
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let (_temp_dir, config_path) = setup_test_dir();
        let persistence = ConfigPersistence::new(config_path);

        let config = persistence.load().expect("Should load default config");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let (_temp_dir, config_path) = setup_test_dir();
        let persistence = ConfigPersistence::new(config_path);

        let mut config = Config::default();
        config.player.advance_delay_ms = 450;
        config.app.data_dir = Some(PathBuf::from("/tmp/tilawah"));

        persistence.save(&config).expect("Should save config");
        let loaded = persistence.load().expect("Should load config");

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_creates_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("subdir").join("config.toml");
        let persistence = ConfigPersistence::new(config_path.clone());

        persistence
            .save(&Config::default())
            .expect("Should create directory and save");

        assert!(config_path.exists());
    }

    #[test]
    fn test_backup_created_on_overwrite() {
        let (_temp_dir, config_path) = setup_test_dir();
        let persistence = ConfigPersistence::new(config_path);

        persistence.save(&Config::default()).expect("Should save config");
        persistence.save(&Config::default()).expect("Should save config again");

        assert!(persistence.backup_path().exists());
    }

    #[test]
    fn test_invalid_toml_returns_parse_error() {
        let (_temp_dir, config_path) = setup_test_dir();
        fs::write(&config_path, "this is not valid TOML {{{").expect("Should write file");

        let persistence = ConfigPersistence::new(config_path);
        let result = persistence.load();

        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_empty_file_is_error() {
        let (_temp_dir, config_path) = setup_test_dir();
        fs::write(&config_path, "   \n").expect("Should write file");

        let persistence = ConfigPersistence::new(config_path);
        assert!(matches!(persistence.load(), Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_validate_before_save() {
        let (_temp_dir, config_path) = setup_test_dir();
        let persistence = ConfigPersistence::new(config_path);

        let mut config = Config::default();
        config.player.advance_delay_ms = 60_000;

        let result = persistence.save(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_generated_default_loads_back() {
        let (_temp_dir, config_path) = setup_test_dir();
        let persistence = ConfigPersistence::new(config_path.clone());

        persistence
            .generate_default_with_comments()
            .expect("Should generate");

        let content = fs::read_to_string(&config_path).expect("Should read");
        assert!(content.starts_with("# Tilawah configuration"));
        assert_eq!(persistence.load().expect("Should load"), Config::default());
    }

    #[test]
    fn test_old_file_is_migrated_and_rewritten() {
        let (_temp_dir, config_path) = setup_test_dir();
        fs::write(
            &config_path,
            "version = 1\n[player]\nautoplay_next = false\n",
        )
        .expect("Should write file");

        let persistence = ConfigPersistence::new(config_path.clone());
        let config = persistence.load().expect("Should migrate");
        assert!(!config.player.auto_advance);
        assert_eq!(config.version, CONFIG_VERSION);

        let rewritten = fs::read_to_string(&config_path).expect("Should read");
        assert!(rewritten.contains("auto_advance = false"));
        assert!(!rewritten.contains("autoplay_next"));
    }
}
