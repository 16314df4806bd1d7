//! Cleanup job configuration

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Periodic cleanup job settings
///
/// Rows older than the retention window are deleted and the store is
/// checkpointed, both on the configured schedule and on demand via the
/// cleanup endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Seconds between cleanup runs
    pub interval_secs: u64,

    /// Rows older than this many seconds are deleted
    pub retention_secs: u64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            retention_secs: 600,
        }
    }
}

impl CleanupConfig {
    /// Interval between cleanup runs
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Retention window for stored rows
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "cleanup.interval_secs must be > 0".into(),
            ));
        }
        Ok(())
    }
}
