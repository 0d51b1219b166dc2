//! Core traits for storage abstraction
//!
//! This module defines the DocumentStore trait that the index engine
//! consumes. Swapping the in-memory store for a remote document database
//! does not touch upper layers (concurrency, engine, search).

use crate::contract::VersionedDocument;
use crate::error::Result;
use crate::types::Key;
use crate::value::{Document, Value};

/// Keyed document store with exact-match field queries
///
/// Thread safety: All methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync).
///
/// Every successful write assigns a new version from a single
/// monotonically increasing sequence. Version 0 is never assigned.
pub trait DocumentStore: Send + Sync {
    /// Allocate a fresh numeric id for records of `kind`
    ///
    /// Ids start at 1 and are never handed out twice for the same kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn allocate_id(&self, kind: &str) -> Result<u64>;

    /// Get the current document for key
    ///
    /// Returns None if the key doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get(&self, key: &Key) -> Result<Option<VersionedDocument>>;

    /// Put a document, creating or overwriting it
    ///
    /// Returns the version assigned to this write.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn put(&self, key: Key, document: Document) -> Result<u64>;

    /// Delete key
    ///
    /// Returns the deleted document if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn delete(&self, key: &Key) -> Result<Option<VersionedDocument>>;

    /// Find documents of `kind` whose `field` equals `value`
    ///
    /// Results are in key order, truncated to `limit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn query_by_field(
        &self,
        kind: &str,
        field: &str,
        value: &Value,
        limit: usize,
    ) -> Result<Vec<(Key, VersionedDocument)>>;

    /// All documents of `kind`, in key order
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn scan_kind(&self, kind: &str) -> Result<Vec<(Key, VersionedDocument)>>;

    /// Highest version assigned so far
    fn current_version(&self) -> u64;
}
