//! Transaction manager for coordinating commit operations
//!
//! Provides atomic commit by orchestrating:
//! 1. Validation (first-committer-wins)
//! 2. Storage application (visibility)
//!
//! ## Commit Sequence
//!
//! ```text
//! 1. acquire commit lock
//! 2. validate() - Active → Validating → Committed | Aborted
//! 3. IF conflicts: return error, nothing written
//! 4. apply_writes() to storage
//! 5. release commit lock, return ApplyResult
//! ```
//!
//! Validation and application happen under one lock, so no other
//! transaction can commit between the check and the writes.

use crate::transaction::{ApplyResult, CommitError, TransactionContext};
use nameindex_core::{DocumentStore, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

/// Manages transaction lifecycle and atomic commits
pub struct TransactionManager {
    /// Serializes validate-and-apply
    commit_lock: Mutex<()>,

    /// Next transaction ID
    next_txn_id: AtomicU64,
}

impl TransactionManager {
    /// Create a new transaction manager
    pub fn new() -> Self {
        TransactionManager {
            commit_lock: Mutex::new(()),
            next_txn_id: AtomicU64::new(1),
        }
    }

    /// Allocate next transaction ID
    pub fn next_txn_id(&self) -> u64 {
        self.next_txn_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Start a transaction over `store`
    pub fn begin(&self, store: Arc<dyn DocumentStore>) -> TransactionContext {
        TransactionContext::new(self.next_txn_id(), store)
    }

    /// Commit a transaction atomically
    ///
    /// # Returns
    /// - Ok(ApplyResult) on success
    /// - Err(CommitError) if validation fails or a store operation fails
    pub fn commit(
        &self,
        txn: &mut TransactionContext,
    ) -> std::result::Result<ApplyResult, CommitError> {
        if txn.is_active() && txn.is_read_only() {
            txn.validate()?;
            return Ok(ApplyResult::default());
        }

        let _guard = self.commit_lock.lock();
        txn.validate()?;

        match txn.apply_writes() {
            Ok(result) => {
                debug!(
                    target: "nameindex::txn",
                    txn_id = txn.txn_id,
                    commit_version = result.commit_version,
                    puts = result.puts_applied,
                    deletes = result.deletes_applied,
                    "Transaction committed"
                );
                Ok(result)
            }
            Err(e) => {
                error!(
                    target: "nameindex::txn",
                    txn_id = txn.txn_id,
                    error = %e,
                    "Storage application failed after validation"
                );
                Err(CommitError::StorageFailed(e.to_string()))
            }
        }
    }

    /// Explicitly abort a transaction
    pub fn abort(&self, txn: &mut TransactionContext, reason: String) -> Result<()> {
        txn.mark_aborted(reason)
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new()
    }
}
