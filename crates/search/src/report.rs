//! Per-word outcomes of index maintenance
//!
//! Maintenance is best-effort over a name's words: every word is attempted
//! and each gets its own [`WordOutcome`]. A failed word never stops the rest.

use serde::Serialize;

/// What happened to one word's entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WordOutcome {
    /// A new entry was created; `counter_synced` is false when the counter
    /// increment failed afterwards
    Created {
        /// Whether the word counter was incremented
        counter_synced: bool,
    },
    /// The id was appended to an existing entry
    Added,
    /// The id was already a member; nothing written
    AlreadyPresent,
    /// The id was removed and other ids remain
    Removed,
    /// The id was the last one and the entry was deleted
    Deleted {
        /// Whether the word counter was decremented
        counter_synced: bool,
    },
    /// No entry exists for the word; nothing written
    Missing,
    /// The entry does not hold the id; nothing written
    NotMember,
    /// The entry could not be read or written
    Failed {
        /// Error message
        error: String,
    },
}

impl WordOutcome {
    /// Whether the entry change failed
    pub fn is_failure(&self) -> bool {
        matches!(self, WordOutcome::Failed { .. })
    }

    /// Whether an entry record was written
    pub fn wrote_entry(&self) -> bool {
        matches!(
            self,
            WordOutcome::Created { .. }
                | WordOutcome::Added
                | WordOutcome::Removed
                | WordOutcome::Deleted { .. }
        )
    }

    /// False only when an entry was created or deleted but the counter
    /// could not follow
    pub fn counter_synced(&self) -> bool {
        match self {
            WordOutcome::Created { counter_synced } | WordOutcome::Deleted { counter_synced } => {
                *counter_synced
            }
            _ => true,
        }
    }
}

/// Outcome for one word
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordReport {
    /// The word
    pub word: String,
    /// What happened to its entry
    #[serde(flatten)]
    pub outcome: WordOutcome,
}

/// Outcomes of one maintenance operation, in the order words were processed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    /// Entity whose name was (un)indexed
    pub entity_id: u64,
    /// One entry per word attempted
    pub outcomes: Vec<WordReport>,
}

impl IndexReport {
    /// Empty report for `entity_id`
    pub fn new(entity_id: u64) -> Self {
        Self {
            entity_id,
            outcomes: Vec::new(),
        }
    }

    /// Record the outcome for `word`
    pub fn push(&mut self, word: impl Into<String>, outcome: WordOutcome) {
        self.outcomes.push(WordReport {
            word: word.into(),
            outcome,
        });
    }

    /// Append another report's outcomes
    pub fn extend(&mut self, other: IndexReport) {
        self.outcomes.extend(other.outcomes);
    }

    /// Words whose entry change succeeded
    pub fn succeeded(&self) -> Vec<&WordReport> {
        self.outcomes
            .iter()
            .filter(|r| !r.outcome.is_failure())
            .collect()
    }

    /// Words whose entry change failed
    pub fn failed(&self) -> Vec<&WordReport> {
        self.outcomes
            .iter()
            .filter(|r| r.outcome.is_failure())
            .collect()
    }

    /// Every entry change succeeded and every counter followed
    pub fn is_complete(&self) -> bool {
        self.outcomes
            .iter()
            .all(|r| !r.outcome.is_failure() && r.outcome.counter_synced())
    }

    /// Words whose entry record was written
    pub fn touched_words(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|r| r.outcome.wrote_entry())
            .map(|r| r.word.as_str())
            .collect()
    }

    /// Outcome for `word`, if it was processed
    pub fn outcome_for(&self, word: &str) -> Option<&WordOutcome> {
        self.outcomes
            .iter()
            .find(|r| r.word == word)
            .map(|r| &r.outcome)
    }

    /// Number of words processed
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether no word was processed
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
