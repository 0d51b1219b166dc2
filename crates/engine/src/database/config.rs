//! Index configuration via `nameindex.toml`
//!
//! On first open of a directory, a default `nameindex.toml` is created. To
//! change settings, edit the file and reopen.

use super::transactions::RetryConfig;
use nameindex_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::Level;

/// Config file name placed in the data directory.
pub const CONFIG_FILE_NAME: &str = "nameindex.toml";

/// Index configuration loaded from `nameindex.toml`.
///
/// # Example
///
/// ```toml
/// log_level = "info"
/// reconcile_on_open = false
///
/// [retry]
/// max_retries = 3
/// base_delay_ms = 10
/// max_delay_ms = 100
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Log level: `"trace"`, `"debug"`, `"info"`, `"warn"` or `"error"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Recount every word counter from its index entries when an
    /// `IndexSet` is opened.
    #[serde(default)]
    pub reconcile_on_open: bool,
    /// Retry policy for conflicting read-modify-write transactions.
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            reconcile_on_open: false,
            retry: RetryConfig::default(),
        }
    }
}

impl IndexConfig {
    /// Parse the log level string.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the string is not a tracing level.
    pub fn level(&self) -> Result<Level> {
        Level::from_str(&self.log_level).map_err(|_| {
            Error::config(format!(
                "Invalid log_level '{}' in {}. Expected one of trace, debug, info, warn, error.",
                self.log_level, CONFIG_FILE_NAME
            ))
        })
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# nameindex configuration
#
# Log level: "trace", "debug", "info" (default), "warn" or "error"
log_level = "info"

# Recount the distinct-word counters from the stored index entries every
# time the index is opened (default: false).
reconcile_on_open = false

# Retry policy for conflicting index updates.
[retry]
max_retries = 3
base_delay_ms = 10
max_delay_ms = 100
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds an
    /// invalid value.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: IndexConfig = toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.level()?;
        Ok(config)
    }

    /// Load `nameindex.toml` from `dir`, creating the default file first if
    /// it is missing.
    pub fn load_or_create(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        Self::write_default_if_missing(&path)?;
        Self::from_file(&path)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
