//! Query engine: multi-word AND lookup, per-word frequency, word count
//!
//! Queries are read-only and never fail as a whole. A word whose entry
//! cannot be read contributes an empty set (so the AND result is empty)
//! and its error is recorded in the [`LookupResult`].

use crate::counter::WordCounter;
use crate::entry::EntryStore;
use crate::tokenizer::{normalize_word, WordSet};
use nameindex_core::{DocumentStore, Result};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::sync::Arc;
use tracing::{trace, warn};

/// A word whose entry could not be read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordError {
    /// The word looked up
    pub word: String,
    /// Error message
    pub error: String,
}

/// Ids matching every queried word, plus any per-word read errors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LookupResult {
    /// Matching entity ids, unordered
    pub ids: FxHashSet<u64>,
    /// Words that failed to load
    pub errors: Vec<WordError>,
}

impl LookupResult {
    /// Whether any word failed to load
    pub fn is_degraded(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Matching ids in ascending order
    pub fn sorted_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}

/// Read side of one kind's index
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<dyn DocumentStore>,
    entries: EntryStore,
    counter: WordCounter,
}

impl std::fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("kind", &self.entries.kind())
            .finish()
    }
}

impl QueryEngine {
    /// Query engine over `entries` and `counter`, both of the same kind
    pub fn new(store: Arc<dyn DocumentStore>, entries: EntryStore, counter: WordCounter) -> Self {
        Self {
            store,
            entries,
            counter,
        }
    }

    fn ids_for(&self, word: &str) -> Result<FxHashSet<u64>> {
        match self.entries.lookup(self.store.as_ref(), word)? {
            Some(entry) => Ok(entry.ids()?.to_set()),
            None => Ok(FxHashSet::default()),
        }
    }

    /// Ids present in the entry of every word
    ///
    /// Each word's list is decoded once. Intersection starts from the
    /// smallest set and probes the others. No words means no ids.
    pub fn lookup_ids(&self, words: &WordSet) -> LookupResult {
        let mut result = LookupResult::default();
        if words.is_empty() {
            return result;
        }

        let mut sets = Vec::with_capacity(words.len());
        for word in words {
            match self.ids_for(word) {
                Ok(ids) => sets.push(ids),
                Err(e) => {
                    warn!(
                        target: "nameindex::query",
                        kind = %self.entries.kind(),
                        word = word.as_str(),
                        error = %e,
                        "Index lookup failed; word treated as unmatched"
                    );
                    result.errors.push(WordError {
                        word: word.clone(),
                        error: e.to_string(),
                    });
                    sets.push(FxHashSet::default());
                }
            }
        }

        sets.sort_by_key(|s| s.len());
        let mut sets = sets.into_iter();
        let mut ids = sets.next().unwrap_or_default();
        for other in sets {
            if ids.is_empty() {
                break;
            }
            ids.retain(|id| other.contains(id));
        }

        trace!(
            target: "nameindex::query",
            kind = %self.entries.kind(),
            words = words.len(),
            matches = ids.len(),
            "Lookup complete"
        );
        result.ids = ids;
        result
    }

    /// Number of entities whose name holds `word`
    ///
    /// `word` is normalized as names are, so case does not matter. Input
    /// that is not exactly one word, or a word not indexed, counts 0.
    pub fn frequency(&self, word: &str) -> Result<u64> {
        let Some(word) = normalize_word(word) else {
            return Ok(0);
        };
        match self.entries.lookup(self.store.as_ref(), &word)? {
            Some(entry) => Ok(entry.frequency()? as u64),
            None => Ok(0),
        }
    }

    /// Stored number of distinct indexed words
    pub fn distinct_word_count(&self) -> Result<i64> {
        self.counter.get(self.store.as_ref())
    }
}
