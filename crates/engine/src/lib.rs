//! Database engine for nameindex
//!
//! This crate orchestrates the lower layers:
//! - Database: store + transaction coordination + configuration
//! - Transaction closures with retry on conflict
//! - `nameindex.toml` configuration
//! - Log subscriber initialisation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coordinator;
pub mod database;
pub mod logging;

pub use coordinator::{TransactionCoordinator, TransactionMetrics};
pub use database::{Database, IndexConfig, RetryConfig, CONFIG_FILE_NAME};
pub use nameindex_concurrency::TransactionContext;
