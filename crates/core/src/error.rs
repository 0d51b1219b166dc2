//! Error types for nameindex
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Absence is never an error: lookups return `Option<T>` and only
//! genuine persistence or decoding failures surface as [`Error`].

use std::io;
use thiserror::Error;

/// Result type alias for nameindex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the keyword index and its document store
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (config file, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Underlying persistence operation failed
    #[error("Store error: {0}")]
    Store(String),

    /// Transaction aborted, usually because of a conflicting commit
    #[error("Transaction aborted: {reason}")]
    TransactionAborted {
        /// Why the transaction was aborted
        reason: String,
    },

    /// Persisted record could not be decoded
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// Caller supplied an invalid argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be read or validated
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new store error
    pub fn store<S: Into<String>>(msg: S) -> Self {
        Error::Store(msg.into())
    }

    /// Create a new corruption error
    pub fn corruption<S: Into<String>>(msg: S) -> Self {
        Error::Corruption(msg.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a new transaction aborted error
    pub fn aborted<S: Into<String>>(reason: S) -> Self {
        Error::TransactionAborted {
            reason: reason.into(),
        }
    }

    /// Whether retrying the failed operation could succeed
    ///
    /// True for optimistic-concurrency conflicts only. Store failures are
    /// not retried.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::TransactionAborted { .. })
    }
}
