//! Transaction context for OCC
//!
//! This module implements the core transaction data structure for optimistic
//! concurrency control. TransactionContext tracks all reads, field queries,
//! writes and deletes of a transaction, enabling validation at commit time.
//!
//! Reads go straight to the live store (there are no snapshots); isolation
//! comes from validating every observed version under the commit lock.

use crate::validation::{validate_transaction, ValidationResult};
use nameindex_core::{Document, DocumentStore, Error, Key, Result, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Error type for commit failures
///
/// - All-or-nothing validation: a transaction either passes validation or
///   writes nothing
/// - First-committer-wins: conflicts are detected from the read set and
///   the query reads
#[derive(Debug, Clone)]
pub enum CommitError {
    /// Transaction aborted due to validation conflicts
    ValidationFailed(ValidationResult),

    /// Transaction was not in correct state for commit
    InvalidState(String),

    /// The store failed while validating or applying writes
    StorageFailed(String),
}

impl std::fmt::Display for CommitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitError::ValidationFailed(result) => {
                write!(f, "Commit failed: {} conflict(s)", result.conflict_count())
            }
            CommitError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            CommitError::StorageFailed(msg) => write!(f, "Storage failed: {}", msg),
        }
    }
}

impl std::error::Error for CommitError {}

impl From<CommitError> for Error {
    fn from(e: CommitError) -> Self {
        match e {
            CommitError::ValidationFailed(result) => Error::TransactionAborted {
                reason: format!("Validation failed: {} conflict(s)", result.conflict_count()),
            },
            CommitError::InvalidState(msg) => Error::InvalidInput(msg),
            CommitError::StorageFailed(msg) => Error::Store(msg),
        }
    }
}

/// Result of applying transaction writes to storage
#[derive(Debug, Clone, Default)]
pub struct ApplyResult {
    /// Highest version assigned while applying (0 for read-only commits)
    pub commit_version: u64,
    /// Number of puts applied
    pub puts_applied: usize,
    /// Number of deletes applied
    pub deletes_applied: usize,
}

impl ApplyResult {
    /// Total number of operations applied
    pub fn total_operations(&self) -> usize {
        self.puts_applied + self.deletes_applied
    }
}

/// Status of a transaction in its lifecycle
///
/// State transitions:
/// - `Active` → `Validating` (begin commit)
/// - `Validating` → `Committed` (validation passed)
/// - `Validating` → `Aborted` (conflict detected)
/// - `Active` → `Aborted` (user abort or error)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Transaction is executing, can read/write
    Active,
    /// Transaction is being validated for conflicts
    Validating,
    /// Transaction committed successfully
    Committed,
    /// Transaction aborted
    Aborted {
        /// Why the transaction was aborted
        reason: String,
    },
}

/// A field query evaluated inside a transaction
///
/// Validation re-runs the query and compares the matching keys and their
/// versions, which catches records created, changed or deleted by other
/// transactions (phantoms included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRead {
    /// Record kind queried
    pub kind: String,
    /// Field compared
    pub field: String,
    /// Value the field had to equal
    pub value: Value,
    /// Result limit used
    pub limit: usize,
    /// Keys and versions observed, in key order
    pub observed: Vec<(Key, u64)>,
}

/// Transaction context
///
/// Buffers writes until commit and records what it read:
/// - `read_set`: key → version observed (0 = absent)
/// - `query_reads`: field queries and their observed results
/// - `write_set` / `delete_set`: buffered mutations, applied at commit
pub struct TransactionContext {
    /// Unique transaction identifier
    pub txn_id: u64,
    /// Current transaction status
    pub status: TransactionStatus,

    store: Arc<dyn DocumentStore>,
    read_set: HashMap<Key, u64>,
    query_reads: Vec<QueryRead>,
    write_set: BTreeMap<Key, Document>,
    delete_set: BTreeSet<Key>,
    start_time: Instant,
}

impl std::fmt::Debug for TransactionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionContext")
            .field("txn_id", &self.txn_id)
            .field("status", &self.status)
            .field("reads", &self.read_set.len())
            .field("query_reads", &self.query_reads.len())
            .field("writes", &self.write_set.len())
            .field("deletes", &self.delete_set.len())
            .finish()
    }
}

impl TransactionContext {
    /// Create a new transaction context over `store`
    pub fn new(txn_id: u64, store: Arc<dyn DocumentStore>) -> Self {
        TransactionContext {
            txn_id,
            status: TransactionStatus::Active,
            store,
            read_set: HashMap::new(),
            query_reads: Vec::new(),
            write_set: BTreeMap::new(),
            delete_set: BTreeSet::new(),
            start_time: Instant::now(),
        }
    }

    // === Read Operations ===

    /// Get a document from the transaction
    ///
    /// Implements read-your-writes semantics:
    /// 1. Check write_set (uncommitted writes from this txn) - NO read_set entry
    /// 2. Check delete_set (uncommitted deletes from this txn) - NO read_set entry
    /// 3. Read from the store - tracks in read_set
    ///
    /// A key absent from the store is tracked with version 0: if someone
    /// creates it before we commit, that is a conflict.
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` if transaction is not active, or the
    /// store's error if the read fails.
    pub fn get(&mut self, key: &Key) -> Result<Option<Document>> {
        self.ensure_active()?;

        if let Some(doc) = self.write_set.get(key) {
            return Ok(Some(doc.clone()));
        }
        if self.delete_set.contains(key) {
            return Ok(None);
        }

        let versioned = self.store.get(key)?;
        let version = versioned.as_ref().map_or(0, |v| v.version);
        // Keep the first observation; later reads must not hide a change
        self.read_set.entry(key.clone()).or_insert(version);
        Ok(versioned.map(|v| v.value))
    }

    /// Find documents of `kind` whose `field` equals `value`
    ///
    /// The store result is recorded as a [`QueryRead`]; buffered writes and
    /// deletes of this transaction are then overlaid on it.
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` if transaction is not active, or the
    /// store's error if the query fails.
    pub fn query_by_field(
        &mut self,
        kind: &str,
        field: &str,
        value: &Value,
        limit: usize,
    ) -> Result<Vec<(Key, Document)>> {
        self.ensure_active()?;

        let hits = self.store.query_by_field(kind, field, value, limit)?;
        self.query_reads.push(QueryRead {
            kind: kind.to_string(),
            field: field.to_string(),
            value: value.clone(),
            limit,
            observed: hits.iter().map(|(k, v)| (k.clone(), v.version)).collect(),
        });

        let mut merged: BTreeMap<Key, Document> = hits
            .into_iter()
            .filter(|(k, _)| !self.delete_set.contains(k) && !self.write_set.contains_key(k))
            .map(|(k, v)| (k, v.value))
            .collect();
        for (key, doc) in &self.write_set {
            if key.kind == kind && doc.matches(field, value) {
                merged.insert(key.clone(), doc.clone());
            }
        }
        Ok(merged.into_iter().take(limit).collect())
    }

    /// Allocate a fresh id from the store
    ///
    /// Id allocation is not transactional: an aborted transaction simply
    /// leaves a gap.
    pub fn allocate_id(&mut self, kind: &str) -> Result<u64> {
        self.ensure_active()?;
        self.store.allocate_id(kind)
    }

    /// Version recorded in the read set for a key
    pub fn get_read_version(&self, key: &Key) -> Option<u64> {
        self.read_set.get(key).copied()
    }

    // === Write Operations ===

    /// Buffer a put
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` if transaction is not active.
    pub fn put(&mut self, key: Key, document: Document) -> Result<()> {
        self.ensure_active()?;
        self.delete_set.remove(&key);
        self.write_set.insert(key, document);
        Ok(())
    }

    /// Buffer a delete
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` if transaction is not active.
    pub fn delete(&mut self, key: Key) -> Result<()> {
        self.ensure_active()?;
        self.write_set.remove(&key);
        self.delete_set.insert(key);
        Ok(())
    }

    // === State ===

    /// Check if transaction is active
    pub fn is_active(&self) -> bool {
        matches!(self.status, TransactionStatus::Active)
    }

    /// Check if transaction committed
    pub fn is_committed(&self) -> bool {
        matches!(self.status, TransactionStatus::Committed)
    }

    /// Check if transaction aborted
    pub fn is_aborted(&self) -> bool {
        matches!(self.status, TransactionStatus::Aborted { .. })
    }

    /// Time since the transaction started
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Check if transaction can accept operations
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` if transaction is not in `Active` state.
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(Error::invalid_input(format!(
                "Transaction {} is not active: {:?}",
                self.txn_id, self.status
            )))
        }
    }

    /// Abort the transaction, discarding buffered writes
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` if already `Committed` or `Aborted`.
    pub fn mark_aborted(&mut self, reason: String) -> Result<()> {
        match &self.status {
            TransactionStatus::Committed => Err(Error::invalid_input(format!(
                "Cannot abort committed transaction {}",
                self.txn_id
            ))),
            TransactionStatus::Aborted { .. } => Err(Error::invalid_input(format!(
                "Transaction {} already aborted",
                self.txn_id
            ))),
            _ => {
                self.status = TransactionStatus::Aborted { reason };
                self.write_set.clear();
                self.delete_set.clear();
                Ok(())
            }
        }
    }

    // === Commit ===

    /// Validate the transaction against the current store state
    ///
    /// Performs `Active` → `Validating` → `Committed` or `Aborted`.
    /// Read-only transactions skip validation.
    ///
    /// Must be called with the manager's commit lock held, followed by
    /// [`apply_writes`](Self::apply_writes).
    pub fn validate(&mut self) -> std::result::Result<(), CommitError> {
        if !self.is_active() {
            return Err(CommitError::InvalidState(format!(
                "Cannot commit transaction {} from {:?} state - must be Active",
                self.txn_id, self.status
            )));
        }
        self.status = TransactionStatus::Validating;

        if self.is_read_only() {
            self.status = TransactionStatus::Committed;
            return Ok(());
        }

        let result = match validate_transaction(self, self.store.as_ref()) {
            Ok(result) => result,
            Err(e) => {
                self.status = TransactionStatus::Aborted {
                    reason: format!("Validation read failed: {}", e),
                };
                return Err(CommitError::StorageFailed(e.to_string()));
            }
        };

        if !result.is_valid() {
            self.status = TransactionStatus::Aborted {
                reason: format!(
                    "Commit failed: {} conflict(s) detected",
                    result.conflict_count()
                ),
            };
            return Err(CommitError::ValidationFailed(result));
        }

        self.status = TransactionStatus::Committed;
        Ok(())
    }

    /// Apply all buffered writes to the store
    ///
    /// A store failure part-way leaves the earlier writes applied; the
    /// store offers no multi-key atomicity to fall back on.
    ///
    /// # Errors
    /// - `Error::InvalidInput` if transaction is not in Committed state
    /// - Error from store operations if they fail
    pub fn apply_writes(&self) -> Result<ApplyResult> {
        if !self.is_committed() {
            return Err(Error::invalid_input(format!(
                "Cannot apply writes: transaction {} is {:?}, must be Committed",
                self.txn_id, self.status
            )));
        }

        let mut result = ApplyResult::default();
        for (key, doc) in &self.write_set {
            let version = self.store.put(key.clone(), doc.clone())?;
            result.commit_version = result.commit_version.max(version);
            result.puts_applied += 1;
        }
        for key in &self.delete_set {
            self.store.delete(key)?;
            result.deletes_applied += 1;
        }
        result.commit_version = result.commit_version.max(self.store.current_version());
        Ok(result)
    }

    // === Introspection ===

    /// Keys read from the store with the versions observed
    pub fn read_set(&self) -> &HashMap<Key, u64> {
        &self.read_set
    }

    /// Field queries evaluated against the store
    pub fn query_reads(&self) -> &[QueryRead] {
        &self.query_reads
    }

    /// Number of keys read
    pub fn read_count(&self) -> usize {
        self.read_set.len()
    }

    /// Number of buffered puts
    pub fn write_count(&self) -> usize {
        self.write_set.len()
    }

    /// Number of buffered deletes
    pub fn delete_count(&self) -> usize {
        self.delete_set.len()
    }

    /// Whether nothing would be written on commit
    pub fn is_read_only(&self) -> bool {
        self.write_set.is_empty() && self.delete_set.is_empty()
    }

    /// Abort reason, if aborted
    pub fn abort_reason(&self) -> Option<&str> {
        match &self.status {
            TransactionStatus::Aborted { reason } => Some(reason),
            _ => None,
        }
    }
}
