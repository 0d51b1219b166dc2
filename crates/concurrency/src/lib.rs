//! Concurrency layer for nameindex
//!
//! This crate implements optimistic concurrency control (OCC) over any
//! [`DocumentStore`](nameindex_core::DocumentStore):
//! - TransactionContext: read set, field-query reads and buffered writes
//! - Conflict detection at commit time (first-committer-wins)
//! - TransactionManager: serialized validate-and-apply

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod manager;
pub mod transaction;
pub mod validation;

pub use manager::TransactionManager;
pub use transaction::{
    ApplyResult, CommitError, QueryRead, TransactionContext, TransactionStatus,
};
pub use validation::{validate_transaction, ConflictType, ValidationResult};
