//! Configuration migration system
//!
//! Migrations run on the raw TOML table before it is deserialized, so keys
//! that were renamed are still visible. When `CONFIG_VERSION` is incremented,
//! add a `Migration` and register it in `get_migration`.

use crate::{ConfigError, ConfigResult, CONFIG_VERSION};
use toml::{Table, Value};

/// Trait for config migrations
pub trait Migration {
    /// Returns the version this migration upgrades TO
    fn target_version(&self) -> u32;

    /// Performs the migration in place
    fn migrate(&self, table: &mut Table) -> ConfigResult<()>;
}

/// Reads the version field of a raw config table
///
/// Files written before versioning existed are treated as version 1.
pub fn file_version(table: &Table) -> u32 {
    table
        .get("version")
        .and_then(Value::as_integer)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(1)
}

/// Migrates a raw config table from its current version to the latest version
///
/// Returns true if anything changed.
pub fn migrate_to_latest(table: &mut Table) -> ConfigResult<bool> {
    let version = file_version(table);

    if version == CONFIG_VERSION {
        return Ok(false);
    }

    if version > CONFIG_VERSION {
        log::warn!(
            "Config version {} is newer than supported version {}. Attempting to use as-is.",
            version,
            CONFIG_VERSION
        );
        return Ok(false);
    }

    log::info!("Migrating config from version {} to {}", version, CONFIG_VERSION);

    for next_version in (version + 1)..=CONFIG_VERSION {
        match get_migration(next_version) {
            Some(migration) => {
                migration.migrate(table)?;
                log::info!("Applied migration to version {}", migration.target_version());
            }
            None => log::warn!("No migration defined for version {}, skipping", next_version),
        }
    }

    table.insert("version".to_string(), Value::Integer(i64::from(CONFIG_VERSION)));
    Ok(true)
}

/// Returns the migration for a specific version, if one exists
fn get_migration(version: u32) -> Option<Box<dyn Migration>> {
    match version {
        2 => Some(Box::new(MigrationV2)),
        _ => None,
    }
}

/// Version 2 renamed `player.autoplay_next` and moved the advance delay
/// from fractional seconds to milliseconds.
struct MigrationV2;

impl Migration for MigrationV2 {
    fn target_version(&self) -> u32 {
        2
    }

    fn migrate(&self, table: &mut Table) -> ConfigResult<()> {
        let Some(player) = table.get_mut("player") else {
            return Ok(());
        };

        let player = player
            .as_table_mut()
            .ok_or_else(|| ConfigError::MigrationError {
                version: 2,
                reason: "player is not a table".to_string(),
            })?;

        if let Some(autoplay) = player.remove("autoplay_next") {
            player.entry("auto_advance").or_insert(autoplay);
        }

        if let Some(delay) = player.remove("advance_delay_secs") {
            let secs = delay
                .as_float()
                .or_else(|| delay.as_integer().map(|i| i as f64))
                .ok_or_else(|| ConfigError::MigrationError {
                    version: 2,
                    reason: format!("advance_delay_secs is not a number: {}", delay),
                })?;
            let millis = (secs * 1000.0).round().max(0.0) as i64;
            player
                .entry("advance_delay_ms")
                .or_insert(Value::Integer(millis));
        }

        Ok(())
    }
}
