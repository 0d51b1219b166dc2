//! Database: the main entry point for index storage
//!
//! The Database struct ties together:
//! - The document store (any [`DocumentStore`])
//! - Transaction coordination (optimistic, first-committer-wins)
//! - Configuration loaded from `nameindex.toml`
//!
//! Index code never writes the store directly; every read-modify-write goes
//! through [`Database::transaction`] or [`Database::transaction_with_retry`].

mod config;
mod transactions;

pub use config::{IndexConfig, CONFIG_FILE_NAME};
pub use transactions::RetryConfig;

use crate::coordinator::{TransactionCoordinator, TransactionMetrics};
use nameindex_concurrency::TransactionContext;
use nameindex_core::{DocumentStore, Error, Result};
use nameindex_storage::MemoryStore;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Store, transaction coordinator and configuration
pub struct Database {
    store: Arc<dyn DocumentStore>,
    coordinator: TransactionCoordinator,
    config: IndexConfig,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("version", &self.store.current_version())
            .field("config", &self.config)
            .finish()
    }
}

impl Database {
    /// Create a database over an existing store
    pub fn new(store: Arc<dyn DocumentStore>, config: IndexConfig) -> Self {
        Self {
            store,
            coordinator: TransactionCoordinator::new(),
            config,
        }
    }

    /// Create an in-memory database with default configuration
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), IndexConfig::default())
    }

    /// Open an in-memory database configured from `dir/nameindex.toml`
    ///
    /// The directory must exist; a default config file is written on first
    /// open.
    ///
    /// # Errors
    /// Returns `Error::Config` for an unreadable or invalid config file and
    /// `Error::Io` if the default file cannot be written.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let config = IndexConfig::load_or_create(dir)?;
        info!(
            target: "nameindex::store",
            dir = %dir.display(),
            log_level = %config.log_level,
            "Opened database"
        );
        Ok(Self::new(Arc::new(MemoryStore::new()), config))
    }

    /// The underlying document store
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Configuration this database was opened with
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Retry policy from the configuration
    pub fn retry_config(&self) -> &RetryConfig {
        &self.config.retry
    }

    /// Transaction statistics
    pub fn metrics(&self) -> TransactionMetrics {
        self.coordinator.metrics()
    }

    /// Begin a new transaction (for manual control)
    ///
    /// Returns a TransactionContext that must be committed with
    /// [`commit_transaction`](Self::commit_transaction) or dropped.
    /// Prefer the closure API.
    pub fn begin_transaction(&self) -> TransactionContext {
        self.coordinator.start_transaction(Arc::clone(&self.store))
    }

    /// Commit a transaction started with [`begin_transaction`](Self::begin_transaction)
    pub fn commit_transaction(&self, txn: &mut TransactionContext) -> Result<u64> {
        self.coordinator.commit(txn)
    }

    fn run_single_attempt<T>(
        &self,
        txn: &mut TransactionContext,
        result: Result<T>,
    ) -> Result<(T, u64)> {
        match result {
            Ok(value) => {
                let commit_version = self.commit_transaction(txn)?;
                Ok((value, commit_version))
            }
            Err(e) => {
                self.coordinator
                    .abort(txn, format!("Closure error: {}", e));
                Err(e)
            }
        }
    }

    /// Execute a transaction with the given closure
    ///
    /// - Executes closure with a fresh transaction
    /// - Validates and commits on success
    /// - Aborts on error, writing nothing
    ///
    /// # Example
    /// ```
    /// use nameindex_core::{Document, Key};
    /// use nameindex_engine::Database;
    ///
    /// let db = Database::in_memory();
    /// let key = Key::named("WordCountUser", "singleton");
    /// db.transaction(|txn| txn.put(key.clone(), Document::new().with("Count", 1i64)))
    ///     .unwrap();
    /// assert!(db.store().get(&key).unwrap().is_some());
    /// ```
    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut TransactionContext) -> Result<T>,
    {
        let mut txn = self.begin_transaction();
        let result = f(&mut txn);
        self.run_single_attempt(&mut txn, result)
            .map(|(value, _)| value)
    }

    /// Execute a transaction with automatic retry on conflict
    ///
    /// The closure is called repeatedly until either:
    /// - The transaction commits successfully
    /// - A non-conflict error occurs (not retried)
    /// - Maximum retries are exceeded
    ///
    /// The closure must be `Fn`: it is re-run from scratch on every attempt.
    pub fn transaction_with_retry<F, T>(&self, config: &RetryConfig, f: F) -> Result<T>
    where
        F: Fn(&mut TransactionContext) -> Result<T>,
    {
        let mut last_error = None;

        for attempt in 0..=config.max_retries {
            let mut txn = self.begin_transaction();
            let result = f(&mut txn);

            match self.run_single_attempt(&mut txn, result) {
                Ok((value, _)) => {
                    if attempt > 0 {
                        debug!(target: "nameindex::txn", attempt, "Transaction committed after retry");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_conflict() && attempt < config.max_retries => {
                    debug!(target: "nameindex::txn", attempt, error = %e, "Conflict, retrying");
                    last_error = Some(e);
                    std::thread::sleep(config.calculate_delay(attempt));
                    continue;
                }
                Err(e) => {
                    if e.is_conflict() {
                        warn!(
                            target: "nameindex::txn",
                            retries = config.max_retries,
                            error = %e,
                            "Transaction retries exhausted"
                        );
                    }
                    return Err(e);
                }
            }
        }

        // The loop returns on its final attempt
        Err(last_error.unwrap_or_else(|| Error::aborted("retry loop exited without a result")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nameindex_core::{Document, Key};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use tempfile::TempDir;

    fn counter_key() -> Key {
        Key::named("WordCountTeam", "singleton")
    }

    fn read_count(txn: &mut TransactionContext) -> Result<i64> {
        Ok(txn
            .get(&counter_key())?
            .and_then(|doc| doc.get_int("Count"))
            .unwrap_or(0))
    }

    #[test]
    fn test_transaction_commits_on_ok() {
        let db = Database::in_memory();
        let out = db
            .transaction(|txn| {
                txn.put(counter_key(), Document::new().with("Count", 4i64))?;
                Ok(42)
            })
            .unwrap();
        assert_eq!(out, 42);
        assert_eq!(db.metrics().total_committed, 1);
    }

    #[test]
    fn test_transaction_aborts_on_err() {
        let db = Database::in_memory();
        let result: Result<()> = db.transaction(|txn| {
            txn.put(counter_key(), Document::new())?;
            Err(Error::invalid_input("nope"))
        });
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(db.store().get(&counter_key()).unwrap().is_none());
        assert_eq!(db.metrics().total_aborted, 1);
    }

    #[test]
    fn test_retry_recovers_from_conflict() {
        let db = Database::in_memory();
        let attempts = AtomicUsize::new(0);

        db.transaction_with_retry(&RetryConfig::default(), |txn| {
            let count = read_count(txn)?;
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                // Interfering writer lands between our read and commit
                db.store()
                    .put(counter_key(), Document::new().with("Count", 10i64))?;
            }
            txn.put(counter_key(), Document::new().with("Count", count + 1))
        })
        .unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        let doc = db.store().get(&counter_key()).unwrap().unwrap();
        assert_eq!(doc.value.get_int("Count"), Some(11));
    }

    #[test]
    fn test_no_retry_surfaces_conflict() {
        let db = Database::in_memory();
        let result = db.transaction_with_retry(&RetryConfig::no_retry(), |txn| {
            let count = read_count(txn)?;
            db.store()
                .put(counter_key(), Document::new().with("Count", count + 100))?;
            txn.put(counter_key(), Document::new().with("Count", count + 1))
        });
        assert!(result.unwrap_err().is_conflict());
    }

    #[test]
    fn test_non_conflict_error_is_not_retried() {
        let db = Database::in_memory();
        let attempts = AtomicUsize::new(0);
        let result: Result<()> = db.transaction_with_retry(&RetryConfig::default(), |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(Error::corruption("bad blob"))
        });
        assert!(matches!(result, Err(Error::Corruption(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_retrying_increments() {
        let db = Arc::new(Database::in_memory());
        let config = RetryConfig::default()
            .with_max_retries(1000)
            .with_base_delay_ms(0);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let db = Arc::clone(&db);
                let config = config.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        db.transaction_with_retry(&config, |txn| {
                            let count = read_count(txn)?;
                            txn.put(counter_key(), Document::new().with("Count", count + 1))
                        })
                        .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let doc = db.store().get(&counter_key()).unwrap().unwrap();
        assert_eq!(doc.value.get_int("Count"), Some(200));
    }

    #[test]
    fn test_open_writes_default_config() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path()).unwrap();
        assert_eq!(db.config(), &IndexConfig::default());
        assert!(dir.path().join(CONFIG_FILE_NAME).exists());
    }

    #[test]
    fn test_open_reads_existing_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "log_level = \"debug\"\n[retry]\nmax_retries = 1\n",
        )
        .unwrap();
        let db = Database::open(dir.path()).unwrap();
        assert_eq!(db.config().log_level, "debug");
        assert_eq!(db.retry_config().max_retries, 1);
    }
}
