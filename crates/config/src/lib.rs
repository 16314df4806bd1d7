//! Pulse configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! A minimal config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use pulse_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[server]\naddr = \"127.0.0.1:7070\"").unwrap();
//! assert_eq!(config.server.addr, "127.0.0.1:7070");
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [server]
//! addr = "0.0.0.0:7070"
//!
//! [store]
//! data_dir = "data"
//!
//! [ingest]
//! max_batch_size = 100
//! flush_interval_ms = 1000
//! ```
//!
//! See `configs/example.toml` for all available options.

mod cleanup;
mod error;
mod ingest;
mod logging;
mod server;
mod store;

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

pub use cleanup::CleanupConfig;
pub use error::{ConfigError, Result};
pub use ingest::IngestConfig;
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use server::ServerConfig;
pub use store::StoreConfig;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Store settings (DuckDB location)
    pub store: StoreConfig,

    /// Ingestion pipeline settings (queue sizes, batching)
    pub ingest: IngestConfig,

    /// Cleanup job settings (retention window, schedule)
    pub cleanup: CleanupConfig,

    /// Logging configuration
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        raw.parse()
    }

    /// Validate the configuration
    ///
    /// Called automatically by `from_file`/`from_str`; exposed for configs
    /// built programmatically.
    pub fn validate(&self) -> Result<()> {
        self.ingest.validate()?;
        self.cleanup.validate()?;
        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.addr, "0.0.0.0:7070");
        assert_eq!(config.ingest.max_batch_size, 100);
        assert_eq!(config.ingest.queue_size, 1024);
    }

    #[test]
    fn test_parse_empty() {
        let config: Config = "".parse().unwrap();
        assert_eq!(config.cleanup.retention_secs, 600);
    }

    #[test]
    fn test_parse_partial() {
        let toml = r#"
            [server]
            addr = "127.0.0.1:9000"

            [ingest]
            max_batch_size = 250
        "#;
        let config: Config = toml.parse().unwrap();
        assert_eq!(config.server.addr, "127.0.0.1:9000");
        assert_eq!(config.ingest.max_batch_size, 250);
        // untouched sections keep defaults
        assert_eq!(config.ingest.flush_interval_ms, 1000);
        assert_eq!(config.store.data_dir.to_str().unwrap(), "data");
    }

    #[test]
    fn test_invalid_batch_size_rejected() {
        let err = "[ingest]\nmax_batch_size = 0".parse::<Config>().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
