//! Storage configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Local storage and remote store tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Capacity of local key-value storage in bytes
    pub local_quota_bytes: usize,

    /// Consecutive remote failures before the remote store is skipped
    pub remote_failure_threshold: u32,

    /// How long the remote store is skipped once the threshold is hit, in seconds
    pub remote_cooldown_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            local_quota_bytes: 5 * 1024 * 1024,
            remote_failure_threshold: 3,
            remote_cooldown_secs: 30,
        }
    }
}

impl ConfigSection for StorageConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::in_range(
                self.local_quota_bytes,
                64 * 1024,
                64 * 1024 * 1024,
                "storage.local_quota_bytes",
            ),
            Validator::in_range(
                self.remote_failure_threshold,
                1,
                20,
                "storage.remote_failure_threshold",
            ),
            Validator::in_range(self.remote_cooldown_secs, 1, 3600, "storage.remote_cooldown_secs"),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.local_quota_bytes = other.local_quota_bytes;
        self.remote_failure_threshold = other.remote_failure_threshold;
        self.remote_cooldown_secs = other.remote_cooldown_secs;
    }

    fn section_name(&self) -> &'static str {
        "storage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(StorageConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_threshold_invalid() {
        let config = StorageConfig {
            remote_failure_threshold: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
