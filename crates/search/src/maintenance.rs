//! Index maintenance: keeping entries in step with entity names
//!
//! Each word is handled in its own retried transaction:
//! 1. Find the word's entry (a query read, so concurrent changes conflict)
//! 2. Stage create / update / delete
//! 3. Commit; on conflict re-run from step 1
//!
//! After a commit that created or deleted an entry, the word counter is
//! adjusted in a separate transaction. A counter failure is logged and
//! reported as `counter_synced: false`; the entry change stands.
//!
//! A rename only visits the symmetric difference of the old and new word
//! sets; words common to both names are never read or written.

use crate::counter::WordCounter;
use crate::entry::EntryStore;
use crate::id_list::{self, IdList, MergeOutcome};
use crate::report::{IndexReport, WordOutcome};
use crate::tokenizer::{tokenize, WordDiff, WordSet};
use nameindex_core::Result;
use nameindex_engine::Database;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// What a committed entry transaction did
enum Applied {
    Created,
    Added,
    AlreadyPresent,
    Removed,
    Deleted,
    Missing,
    NotMember,
}

/// Applies entity lifecycle changes to one kind's entries and counter
#[derive(Debug, Clone)]
pub struct IndexMaintainer {
    db: Arc<Database>,
    entries: EntryStore,
    counter: WordCounter,
}

impl IndexMaintainer {
    /// Maintainer over `entries` and `counter`, both of the same kind
    pub fn new(db: Arc<Database>, entries: EntryStore, counter: WordCounter) -> Self {
        Self {
            db,
            entries,
            counter,
        }
    }

    /// Index every word of `name` under `entity_id`
    ///
    /// Idempotent: a repeat call reports `AlreadyPresent` for every word
    /// and writes nothing.
    pub fn add_entity(&self, name: &str, entity_id: u64) -> IndexReport {
        self.add_words(&tokenize(name), entity_id)
    }

    /// Remove `entity_id` from the entry of every word of `name`
    pub fn remove_entity(&self, name: &str, entity_id: u64) -> IndexReport {
        self.remove_words(&tokenize(name), entity_id)
    }

    /// Move `entity_id` from the words of `old_name` to those of `new_name`
    ///
    /// Removals run first, then additions.
    pub fn rename_entity(&self, old_name: &str, new_name: &str, entity_id: u64) -> IndexReport {
        let diff = WordDiff::between(old_name, new_name);
        debug!(
            target: "nameindex::index",
            kind = %self.entries.kind(),
            entity_id,
            removed = diff.removed.len(),
            added = diff.added.len(),
            "Renaming entity"
        );
        let mut report = self.remove_words(&diff.removed, entity_id);
        report.extend(self.add_words(&diff.added, entity_id));
        report
    }

    fn add_words(&self, words: &WordSet, entity_id: u64) -> IndexReport {
        let mut report = IndexReport::new(entity_id);
        for word in words {
            let applied = self.add_word(word, entity_id);
            report.push(word.as_str(), self.finish(word, entity_id, applied));
        }
        report
    }

    fn remove_words(&self, words: &WordSet, entity_id: u64) -> IndexReport {
        let mut report = IndexReport::new(entity_id);
        for word in words {
            let applied = self.remove_word(word, entity_id);
            report.push(word.as_str(), self.finish(word, entity_id, applied));
        }
        report
    }

    fn add_word(&self, word: &str, entity_id: u64) -> Result<Applied> {
        self.db
            .transaction_with_retry(self.db.retry_config(), |txn| {
                match self.entries.find_by_word(txn, word)? {
                    None => {
                        self.entries
                            .create(txn, word, &IdList::single(entity_id))?;
                        Ok(Applied::Created)
                    }
                    Some(mut entry) => match id_list::merge(&entry.id_list, entity_id)? {
                        MergeOutcome::Unchanged => Ok(Applied::AlreadyPresent),
                        MergeOutcome::Appended(blob) => {
                            entry.id_list = blob;
                            self.entries.update(txn, &entry)?;
                            Ok(Applied::Added)
                        }
                    },
                }
            })
    }

    fn remove_word(&self, word: &str, entity_id: u64) -> Result<Applied> {
        self.db
            .transaction_with_retry(self.db.retry_config(), |txn| {
                let Some(mut entry) = self.entries.find_by_word(txn, word)? else {
                    return Ok(Applied::Missing);
                };
                let mut ids = entry.ids()?;
                if !ids.remove(entity_id) {
                    return Ok(Applied::NotMember);
                }
                if ids.is_empty() {
                    self.entries.delete(txn, &entry)?;
                    Ok(Applied::Deleted)
                } else {
                    entry.id_list = ids.encode();
                    self.entries.update(txn, &entry)?;
                    Ok(Applied::Removed)
                }
            })
    }

    /// Turn a committed (or failed) entry change into its reported outcome,
    /// following up with the counter adjustment
    fn finish(&self, word: &str, entity_id: u64, applied: Result<Applied>) -> WordOutcome {
        let outcome = match applied {
            Ok(Applied::Created) => WordOutcome::Created {
                counter_synced: self.sync_counter(word, 1),
            },
            Ok(Applied::Deleted) => WordOutcome::Deleted {
                counter_synced: self.sync_counter(word, -1),
            },
            Ok(Applied::Added) => WordOutcome::Added,
            Ok(Applied::AlreadyPresent) => WordOutcome::AlreadyPresent,
            Ok(Applied::Removed) => WordOutcome::Removed,
            Ok(Applied::Missing) => WordOutcome::Missing,
            Ok(Applied::NotMember) => WordOutcome::NotMember,
            Err(e) => {
                warn!(
                    target: "nameindex::index",
                    kind = %self.entries.kind(),
                    word,
                    entity_id,
                    error = %e,
                    "Failed to update index entry"
                );
                return WordOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };
        debug!(
            target: "nameindex::index",
            kind = %self.entries.kind(),
            word,
            entity_id,
            outcome = ?outcome,
            "Index entry updated"
        );
        outcome
    }

    fn sync_counter(&self, word: &str, delta: i64) -> bool {
        match self.counter.adjust(&self.db, delta) {
            Ok(_) => true,
            Err(e) => {
                error!(
                    target: "nameindex::counter",
                    kind = %self.entries.kind(),
                    word,
                    delta,
                    error = %e,
                    "Word counter update failed; counter no longer matches live entries"
                );
                false
            }
        }
    }
}
