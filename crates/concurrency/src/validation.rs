//! Transaction validation for OCC
//!
//! Conflict detection rules:
//! - First-committer-wins based on the READ-SET, not the write-set
//! - Blind writes (write without read) do NOT conflict
//! - Field queries are re-evaluated; any change in the matching keys or
//!   their versions is a conflict (this covers phantom inserts)
//! - Write skew outside what was read is allowed

use crate::transaction::{QueryRead, TransactionContext};
use nameindex_core::{DocumentStore, Key, Result, Value};
use std::collections::HashMap;

/// Types of conflicts that can occur during transaction validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictType {
    /// Key was read at one version but its current version differs
    ReadWriteConflict {
        /// The key that has a conflict
        key: Key,
        /// Version recorded in read_set when read (0 = absent)
        read_version: u64,
        /// Current version in storage at validation time (0 = absent)
        current_version: u64,
    },

    /// A field query now returns different records than when it was run
    QueryConflict {
        /// Record kind queried
        kind: String,
        /// Field compared
        field: String,
        /// Value compared against
        value: Value,
    },
}

/// Result of transaction validation
///
/// Accumulates all conflicts found during validation.
/// A transaction commits only if is_valid() returns true.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// All conflicts detected during validation
    pub conflicts: Vec<ConflictType>,
}

impl ValidationResult {
    /// Create a successful validation result (no conflicts)
    pub fn ok() -> Self {
        ValidationResult {
            conflicts: Vec::new(),
        }
    }

    /// Create a validation result with a single conflict
    pub fn conflict(conflict: ConflictType) -> Self {
        ValidationResult {
            conflicts: vec![conflict],
        }
    }

    /// Check if validation passed (no conflicts)
    pub fn is_valid(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Merge another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.conflicts.extend(other.conflicts);
    }

    /// Get the number of conflicts
    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }
}

/// Validate the read-set against current storage state
///
/// For each key read, the current version must equal the version observed.
/// An absent key counts as version 0 on both sides.
pub fn validate_read_set(
    read_set: &HashMap<Key, u64>,
    store: &dyn DocumentStore,
) -> Result<ValidationResult> {
    let mut result = ValidationResult::ok();

    for (key, read_version) in read_set {
        let current_version = store.get(key)?.map_or(0, |v| v.version);
        if current_version != *read_version {
            result.conflicts.push(ConflictType::ReadWriteConflict {
                key: key.clone(),
                read_version: *read_version,
                current_version,
            });
        }
    }

    Ok(result)
}

/// Re-run every recorded field query and compare with what was observed
pub fn validate_query_reads(
    query_reads: &[QueryRead],
    store: &dyn DocumentStore,
) -> Result<ValidationResult> {
    let mut result = ValidationResult::ok();

    for read in query_reads {
        let now = store.query_by_field(&read.kind, &read.field, &read.value, read.limit)?;
        let unchanged = now.len() == read.observed.len()
            && now
                .iter()
                .zip(&read.observed)
                .all(|((key, doc), (seen_key, seen_version))| {
                    key == seen_key && doc.version == *seen_version
                });
        if !unchanged {
            result.conflicts.push(ConflictType::QueryConflict {
                kind: read.kind.clone(),
                field: read.field.clone(),
                value: read.value.clone(),
            });
        }
    }

    Ok(result)
}

/// Validate a transaction against current storage state
///
/// Read-only transactions always validate: they have nothing to publish.
///
/// # Errors
/// Propagates store errors; a failed read during validation must never
/// let the transaction commit.
pub fn validate_transaction(
    txn: &TransactionContext,
    store: &dyn DocumentStore,
) -> Result<ValidationResult> {
    if txn.is_read_only() {
        return Ok(ValidationResult::ok());
    }

    let mut result = ValidationResult::ok();
    result.merge(validate_read_set(txn.read_set(), store)?);
    result.merge(validate_query_reads(txn.query_reads(), store)?);
    Ok(result)
}
