//! WordCounter: distinct indexed words per entity kind
//!
//! A singleton record (`WordCountUser` / `WordCountTeam` /
//! `WordCountTournament`, key `"singleton"`, field `Count`). A missing record
//! reads as 0. Each adjustment is its own read-modify-write transaction on
//! that record alone, retried on conflict.
//!
//! The counter is adjusted after the paired entry change has committed, so a
//! failed adjustment leaves it off by one until [`WordCounter::reconcile`]
//! runs.

use crate::entry::EntryStore;
use nameindex_core::{Document, DocumentStore, EntityKind, Error, Key, Result};
use nameindex_engine::{Database, TransactionContext};
use serde::Serialize;
use tracing::info;

/// Key name of the counter record
pub const SINGLETON: &str = "singleton";
/// Field holding the count
pub const COUNT_FIELD: &str = "Count";

/// Counter value before and after a reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Stored value before
    pub previous: i64,
    /// Number of live entries, now stored
    pub current: i64,
}

impl Reconciliation {
    /// Whether the stored value was wrong
    pub fn drifted(&self) -> bool {
        self.previous != self.current
    }
}

/// Counter of distinct words for one entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordCounter {
    kind: EntityKind,
}

impl WordCounter {
    /// Counter of `kind`
    pub fn new(kind: EntityKind) -> Self {
        Self { kind }
    }

    /// Record key of the counter
    pub fn key(&self) -> Key {
        Key::named(self.kind.counter_kind(), SINGLETON)
    }

    fn decode(&self, document: Option<Document>) -> Result<i64> {
        match document {
            None => Ok(0),
            Some(doc) => doc.get_int(COUNT_FIELD).ok_or_else(|| {
                Error::corruption(format!("{} missing integer field {}", self.key(), COUNT_FIELD))
            }),
        }
    }

    fn read(&self, txn: &mut TransactionContext) -> Result<i64> {
        let document = txn.get(&self.key())?;
        self.decode(document)
    }

    fn write(&self, txn: &mut TransactionContext, count: i64) -> Result<()> {
        txn.put(self.key(), Document::new().with(COUNT_FIELD, count))
    }

    /// Current value
    pub fn get(&self, store: &dyn DocumentStore) -> Result<i64> {
        self.decode(store.get(&self.key())?.map(|v| v.value))
    }

    /// Add `delta` atomically; returns the new value
    ///
    /// The value may go negative if decrements outnumber increments.
    pub fn adjust(&self, db: &Database, delta: i64) -> Result<i64> {
        db.transaction_with_retry(db.retry_config(), |txn| {
            let count = self.read(txn)? + delta;
            self.write(txn, count)?;
            Ok(count)
        })
    }

    /// Count one more distinct word
    pub fn increment(&self, db: &Database) -> Result<i64> {
        self.adjust(db, 1)
    }

    /// Count one fewer distinct word
    pub fn decrement(&self, db: &Database) -> Result<i64> {
        self.adjust(db, -1)
    }

    /// Reset the counter to the number of live entries
    ///
    /// The entry scan is a plain store read and is not validated at commit.
    /// Run it with no index maintenance in flight: an entry created before
    /// the scan whose counter increment lands after it is counted twice.
    pub fn reconcile(&self, db: &Database, entries: &EntryStore) -> Result<Reconciliation> {
        let result = db.transaction_with_retry(db.retry_config(), |txn| {
            let previous = self.read(txn)?;
            let live = entries.scan(db.store().as_ref())?.len();
            let current = i64::try_from(live)
                .map_err(|_| Error::invalid_input(format!("{} entries overflow", live)))?;
            if current != previous {
                self.write(txn, current)?;
            }
            Ok(Reconciliation { previous, current })
        })?;

        if result.drifted() {
            info!(
                target: "nameindex::counter",
                kind = %self.kind,
                previous = result.previous,
                current = result.current,
                "Word counter reconciled"
            );
        }
        Ok(result)
    }
}
