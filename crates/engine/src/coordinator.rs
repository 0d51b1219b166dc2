//! Transaction coordinator for managing transaction lifecycle
//!
//! The TransactionCoordinator wraps TransactionManager and adds:
//! - Active transaction tracking
//! - Transaction metrics (started, committed, aborted)
//! - Conversion of commit failures into the crate error type

use nameindex_concurrency::{TransactionContext, TransactionManager};
use nameindex_core::{DocumentStore, Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Transaction coordinator for the database
///
/// The metric counters use Relaxed ordering: they are observational only
/// and synchronize nothing else.
pub struct TransactionCoordinator {
    manager: TransactionManager,
    active_count: AtomicU64,
    total_started: AtomicU64,
    total_committed: AtomicU64,
    total_aborted: AtomicU64,
}

impl TransactionCoordinator {
    /// Create a coordinator with zeroed metrics
    pub fn new() -> Self {
        Self {
            manager: TransactionManager::new(),
            active_count: AtomicU64::new(0),
            total_started: AtomicU64::new(0),
            total_committed: AtomicU64::new(0),
            total_aborted: AtomicU64::new(0),
        }
    }

    /// Start a new transaction over `store`
    pub fn start_transaction(&self, store: Arc<dyn DocumentStore>) -> TransactionContext {
        let txn = self.manager.begin(store);
        self.record_start();
        trace!(target: "nameindex::txn", txn_id = txn.txn_id, "Transaction started");
        txn
    }

    /// Commit a transaction through the concurrency layer
    ///
    /// # Returns
    /// * `Ok(commit_version)` - Transaction committed successfully
    /// * `Err(Error)` - Validation conflict, store failure, or invalid state
    pub fn commit(&self, txn: &mut TransactionContext) -> Result<u64> {
        match self.manager.commit(txn) {
            Ok(applied) => {
                self.record_commit();
                Ok(applied.commit_version)
            }
            Err(e) => {
                self.record_abort();
                debug!(target: "nameindex::txn", txn_id = txn.txn_id, error = %e, "Transaction aborted");
                Err(Error::from(e))
            }
        }
    }

    /// Abort a transaction that will not be committed
    pub fn abort(&self, txn: &mut TransactionContext, reason: String) {
        // Already-finished transactions have nothing left to discard
        let _ = self.manager.abort(txn, reason);
        self.record_abort();
    }

    /// Record transaction start
    pub fn record_start(&self) {
        self.active_count.fetch_add(1, Ordering::Relaxed);
        self.total_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record transaction commit
    pub fn record_commit(&self) {
        self.finish();
        self.total_committed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record transaction abort
    pub fn record_abort(&self) {
        self.finish();
        self.total_aborted.fetch_add(1, Ordering::Relaxed);
    }

    fn finish(&self) {
        // Saturating decrement
        let _ = self
            .active_count
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |x| {
                Some(x.saturating_sub(1))
            });
    }

    /// Get transaction metrics
    pub fn metrics(&self) -> TransactionMetrics {
        let started = self.total_started.load(Ordering::Relaxed);
        let committed = self.total_committed.load(Ordering::Relaxed);

        TransactionMetrics {
            active_count: self.active_count.load(Ordering::Relaxed),
            total_started: started,
            total_committed: committed,
            total_aborted: self.total_aborted.load(Ordering::Relaxed),
            commit_rate: if started > 0 {
                committed as f64 / started as f64
            } else {
                0.0
            },
        }
    }
}

impl Default for TransactionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Transaction metrics
#[derive(Debug, Clone)]
pub struct TransactionMetrics {
    /// Number of currently active transactions
    pub active_count: u64,
    /// Total number of transactions started
    pub total_started: u64,
    /// Total number of transactions committed
    pub total_committed: u64,
    /// Total number of transactions aborted
    pub total_aborted: u64,
    /// Commit success rate (committed / started)
    pub commit_rate: f64,
}

impl TransactionMetrics {
    /// Total transactions that completed (committed + aborted)
    pub fn total_completed(&self) -> u64 {
        self.total_committed + self.total_aborted
    }

    /// Abort rate (aborted / started)
    pub fn abort_rate(&self) -> f64 {
        if self.total_started > 0 {
            self.total_aborted as f64 / self.total_started as f64
        } else {
            0.0
        }
    }
}
