//! Name tokenizer
//!
//! Names are split on whitespace and lower-cased. Nothing else: no
//! punctuation stripping, no stemming, no minimum length. A name's words
//! form a set, so repeated words collapse.

use std::collections::BTreeSet;

/// Distinct lowercase words of a name
///
/// Ordered, so iteration (and therefore the order in which maintenance
/// touches entries) is deterministic.
pub type WordSet = BTreeSet<String>;

/// Tokenize a name into its set of words
///
/// # Example
///
/// ```
/// use nameindex_search::tokenizer::tokenize;
///
/// let words = tokenize("Jon  SNOW jon");
/// assert_eq!(words.into_iter().collect::<Vec<_>>(), vec!["jon", "snow"]);
/// ```
pub fn tokenize(name: &str) -> WordSet {
    name.split_whitespace().map(str::to_lowercase).collect()
}

/// Normalize a single word the way [`tokenize`] would
///
/// Returns `None` unless the input holds exactly one word.
pub fn normalize_word(word: &str) -> Option<String> {
    let mut words = word.split_whitespace();
    match (words.next(), words.next()) {
        (Some(only), None) => Some(only.to_lowercase()),
        _ => None,
    }
}

/// Words gained and lost between two names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordDiff {
    /// Words of the old name missing from the new one
    pub removed: WordSet,
    /// Words of the new name missing from the old one
    pub added: WordSet,
}

impl WordDiff {
    /// Symmetric difference of the word sets of `old_name` and `new_name`
    pub fn between(old_name: &str, new_name: &str) -> Self {
        let old_words = tokenize(old_name);
        let new_words = tokenize(new_name);
        WordDiff {
            removed: old_words.difference(&new_words).cloned().collect(),
            added: new_words.difference(&old_words).cloned().collect(),
        }
    }

    /// Whether the two names share the same word set
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}
