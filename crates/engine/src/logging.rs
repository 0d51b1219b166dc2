//! Log subscriber initialisation
//!
//! Library code only emits `tracing` events under `nameindex::*` targets.
//! Binaries and tests that want them printed call [`init`] once.

use crate::database::IndexConfig;
use nameindex_core::{Error, Result};

/// Install a global `fmt` subscriber at the configured level
///
/// # Errors
/// - `Error::Config` if the level is invalid
/// - `Error::Config` if a global subscriber is already installed
pub fn init(config: &IndexConfig) -> Result<()> {
    let level = config.level()?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .try_init()
        .map_err(|e| Error::config(format!("Failed to install log subscriber: {}", e)))
}
