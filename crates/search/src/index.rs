//! Keyword index facade
//!
//! [`KeywordIndex`] is what entity lifecycle handlers and search handlers
//! call for one entity kind. [`IndexSet`] holds one per kind.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use nameindex_engine::Database;
//! use nameindex_search::IndexSet;
//!
//! let db = Arc::new(Database::in_memory());
//! let indexes = IndexSet::open(db).unwrap();
//!
//! indexes.users().on_entity_created("Jon Snow", 1);
//! indexes.users().on_entity_created("Jon Stark", 2);
//!
//! assert_eq!(indexes.users().search("jon").sorted_ids(), vec![1, 2]);
//! assert_eq!(indexes.users().search("Jon Snow").sorted_ids(), vec![1]);
//! assert_eq!(indexes.users().word_frequency("jon").unwrap(), 2);
//! assert_eq!(indexes.users().distinct_word_count().unwrap(), 3);
//! ```

use crate::counter::{Reconciliation, WordCounter};
use crate::entry::{EntryStore, IndexEntry};
use crate::maintenance::IndexMaintainer;
use crate::query::{LookupResult, QueryEngine};
use crate::report::IndexReport;
use crate::tokenizer::{normalize_word, tokenize};
use nameindex_core::{EntityKind, Result};
use nameindex_engine::Database;
use std::sync::Arc;
use tracing::info;

// ============================================================================
// KeywordIndex
// ============================================================================

/// Inverted index from name words to entity ids, for one entity kind
#[derive(Debug, Clone)]
pub struct KeywordIndex {
    kind: EntityKind,
    db: Arc<Database>,
    entries: EntryStore,
    counter: WordCounter,
    maintainer: IndexMaintainer,
    query: QueryEngine,
}

impl KeywordIndex {
    /// Index of `kind` stored in `db`
    pub fn new(db: Arc<Database>, kind: EntityKind) -> Self {
        let entries = EntryStore::new(kind);
        let counter = WordCounter::new(kind);
        Self {
            kind,
            maintainer: IndexMaintainer::new(Arc::clone(&db), entries, counter),
            query: QueryEngine::new(Arc::clone(db.store()), entries, counter),
            db,
            entries,
            counter,
        }
    }

    /// Entity kind indexed
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Index a newly created entity's name
    pub fn on_entity_created(&self, name: &str, id: u64) -> IndexReport {
        self.maintainer.add_entity(name, id)
    }

    /// Re-index an entity whose name changed
    pub fn on_entity_renamed(&self, old_name: &str, new_name: &str, id: u64) -> IndexReport {
        self.maintainer.rename_entity(old_name, new_name, id)
    }

    /// Drop a destroyed entity from the index
    pub fn on_entity_destroyed(&self, name: &str, id: u64) -> IndexReport {
        self.maintainer.remove_entity(name, id)
    }

    /// Ids of entities whose name holds every word of `query_text`
    pub fn search(&self, query_text: &str) -> LookupResult {
        self.query.lookup_ids(&tokenize(query_text))
    }

    /// Number of entities whose name holds `word`
    pub fn word_frequency(&self, word: &str) -> Result<u64> {
        self.query.frequency(word)
    }

    /// Stored number of distinct indexed words
    pub fn distinct_word_count(&self) -> Result<i64> {
        self.query.distinct_word_count()
    }

    /// Recount the distinct words from the live entries
    ///
    /// Only exact while no maintenance call on this kind is running.
    pub fn reconcile_word_count(&self) -> Result<Reconciliation> {
        self.counter.reconcile(&self.db, &self.entries)
    }

    /// The entry for `word`, if indexed
    pub fn entry(&self, word: &str) -> Result<Option<IndexEntry>> {
        match normalize_word(word) {
            Some(word) => self.entries.lookup(self.db.store().as_ref(), &word),
            None => Ok(None),
        }
    }

    /// Every live entry, in creation order
    pub fn entries(&self) -> Result<Vec<IndexEntry>> {
        self.entries.scan(self.db.store().as_ref())
    }
}

// ============================================================================
// IndexSet
// ============================================================================

/// One [`KeywordIndex`] per entity kind over a shared database
#[derive(Debug, Clone)]
pub struct IndexSet {
    users: KeywordIndex,
    teams: KeywordIndex,
    tournaments: KeywordIndex,
}

impl IndexSet {
    /// Open the indexes of every kind
    ///
    /// With `reconcile_on_open` set in the database configuration, each
    /// kind's word counter is recounted first.
    pub fn open(db: Arc<Database>) -> Result<Self> {
        let set = Self {
            users: KeywordIndex::new(Arc::clone(&db), EntityKind::User),
            teams: KeywordIndex::new(Arc::clone(&db), EntityKind::Team),
            tournaments: KeywordIndex::new(Arc::clone(&db), EntityKind::Tournament),
        };

        if db.config().reconcile_on_open {
            for kind in EntityKind::ALL {
                let result = set.for_kind(kind).reconcile_word_count()?;
                info!(
                    target: "nameindex::counter",
                    kind = %kind,
                    count = result.current,
                    drifted = result.drifted(),
                    "Word counter checked on open"
                );
            }
        }
        Ok(set)
    }

    /// User name index
    pub fn users(&self) -> &KeywordIndex {
        &self.users
    }

    /// Team name index
    pub fn teams(&self) -> &KeywordIndex {
        &self.teams
    }

    /// Tournament name index
    pub fn tournaments(&self) -> &KeywordIndex {
        &self.tournaments
    }

    /// Index of `kind`
    pub fn for_kind(&self, kind: EntityKind) -> &KeywordIndex {
        match kind {
            EntityKind::User => &self.users,
            EntityKind::Team => &self.teams,
            EntityKind::Tournament => &self.tournaments,
        }
    }
}
