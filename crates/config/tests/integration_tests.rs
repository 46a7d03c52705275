//! Integration tests for the configuration system

use std::path::PathBuf;
use tilawah_config::{
    AppConfig, Config, ConfigManager, ConfigSection, PlayerConfig, CONFIG_VERSION,
    DEFAULT_URL_TEMPLATE,
};
use tempfile::TempDir;

fn setup_test_manager() -> Result<(TempDir, ConfigManager), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;
    Ok((temp_dir, manager))
}

#[test]
fn test_full_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    assert!(manager.initialize()?);

    let config = manager.load()?;
    assert_eq!(config.version, CONFIG_VERSION);
    assert_eq!(config.audio.default_url_template, DEFAULT_URL_TEMPLATE);

    let mut modified = config.clone();
    modified.player.auto_advance = false;
    modified.storage.remote_failure_threshold = 5;
    manager.save(&modified)?;

    let reloaded = manager.load()?;
    assert!(!reloaded.player.auto_advance);
    assert_eq!(reloaded.storage.remote_failure_threshold, 5);

    manager.reset()?;
    assert_eq!(manager.load()?, Config::default());

    Ok(())
}

#[test]
fn test_config_validation_integration() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    manager.save(&Config::default())?;
    assert!(manager.validate()?.is_empty());

    let mut invalid = Config::default();
    invalid.audio.default_url_template = "everyayah.com/{chapter}.mp3".to_string();
    assert!(manager.save(&invalid).is_err());

    Ok(())
}

#[test]
fn test_atomic_save_keeps_backup() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    let mut config = Config::default();
    manager.save(&config)?;
    config.player.advance_delay_ms = 900;
    manager.save(&config)?;

    let backup_path = manager.config_path().with_extension("toml.backup");
    let backup = std::fs::read_to_string(backup_path)?;
    assert!(backup.contains("advance_delay_ms = 300"));

    Ok(())
}

#[test]
fn test_partial_file_fills_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    std::fs::write(
        manager.config_path(),
        "version = 2\n[app]\nbundle_dir = \"/usr/share/tilawah\"\n",
    )?;

    let config = manager.load()?;
    assert_eq!(config.app.bundle_dir, Some(PathBuf::from("/usr/share/tilawah")));
    assert_eq!(config.player, PlayerConfig::default());

    Ok(())
}

#[test]
fn test_v1_file_upgraded_on_load() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    std::fs::write(
        manager.config_path(),
        "[player]\nautoplay_next = true\nadvance_delay_secs = 1\n",
    )?;

    let config = manager.load()?;
    assert!(config.player.auto_advance);
    assert_eq!(config.player.advance_delay_ms, 1000);

    let second = manager.load()?;
    assert_eq!(second, config);

    Ok(())
}

#[test]
fn test_merge_functionality() {
    let mut base = Config::default();
    let mut override_config = Config::default();

    override_config.player.scroll_tolerance_px = 12.0;
    override_config.app = AppConfig {
        data_dir: Some(PathBuf::from("/data")),
        ..AppConfig::default()
    };

    base.merge(override_config);

    assert_eq!(base.player.scroll_tolerance_px, 12.0);
    assert_eq!(base.app.data_dir, Some(PathBuf::from("/data")));
}

#[test]
fn test_section_names() {
    let config = Config::default();
    assert_eq!(config.app.section_name(), "app");
    assert_eq!(config.player.section_name(), "player");
    assert_eq!(config.audio.section_name(), "audio");
    assert_eq!(config.storage.section_name(), "storage");
}
