//! IdList: the set of entity ids stored in an index entry
//!
//! In memory an [`IdList`] is an insertion-ordered, duplicate-free list of
//! `u64`. On disk it is text: decimal ids joined by single spaces, the empty
//! set being the empty string. Existing records written that way decode
//! unchanged.
//!
//! Membership is decided per token, never by substring: removing `1` from
//! `"11 1"` leaves `"11"`.
//!
//! The free functions work on the persisted text directly and are what the
//! maintenance code calls:
//! - [`merge`]: tri-state add ([`MergeOutcome::Unchanged`] or
//!   [`MergeOutcome::Appended`], or an error for a malformed blob)
//! - [`remove`]: drop an id, keeping survivor order
//! - [`decode`], [`contains`]

use nameindex_core::{Error, Result};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fmt;

/// Ordered set of entity ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IdList {
    ids: Vec<u64>,
}

impl IdList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// A list holding one id
    pub fn single(id: u64) -> Self {
        IdList { ids: vec![id] }
    }

    /// Parse the persisted text form
    ///
    /// Tolerates repeated, leading and trailing whitespace, and drops
    /// repeated ids (first occurrence wins).
    ///
    /// # Errors
    /// `Error::Corruption` if a token is not a non-negative decimal integer.
    pub fn decode(blob: &str) -> Result<Self> {
        let mut list = IdList::new();
        for token in blob.split_whitespace() {
            let id = token
                .bytes()
                .all(|b| b.is_ascii_digit())
                .then(|| token.parse::<u64>().ok())
                .flatten()
                .ok_or_else(|| {
                    Error::corruption(format!("invalid id token {:?} in id list", token))
                })?;
            list.insert(id);
        }
        Ok(list)
    }

    /// Persisted text form
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Whether `id` is a member
    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    /// Append `id` unless already present; returns whether it was added
    pub fn insert(&mut self, id: u64) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Remove `id` if present; returns whether it was removed
    pub fn remove(&mut self, id: u64) -> bool {
        match self.ids.iter().position(|&x| x == id) {
            Some(pos) => {
                self.ids.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Number of ids
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in insertion order
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.ids.iter().copied()
    }

    /// Ids as a hash set, for intersection
    pub fn to_set(&self) -> FxHashSet<u64> {
        self.iter().collect()
    }
}

impl fmt::Display for IdList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.ids.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", id)?;
        }
        Ok(())
    }
}

impl FromIterator<u64> for IdList {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut list = IdList::new();
        for id in iter {
            list.insert(id);
        }
        list
    }
}

/// Result of merging an id into a persisted id list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The id was already a member; nothing needs to be written
    Unchanged,
    /// The id was appended; the new text to persist
    Appended(String),
}

/// Decode a persisted id list
pub fn decode(blob: &str) -> Result<IdList> {
    IdList::decode(blob)
}

/// Whether a persisted id list contains `id`
pub fn contains(blob: &str, id: u64) -> Result<bool> {
    Ok(IdList::decode(blob)?.contains(id))
}

/// Add `id` to a persisted id list
pub fn merge(blob: &str, id: u64) -> Result<MergeOutcome> {
    let mut list = IdList::decode(blob)?;
    if list.insert(id) {
        Ok(MergeOutcome::Appended(list.encode()))
    } else {
        Ok(MergeOutcome::Unchanged)
    }
}

/// Remove `id` from a persisted id list
///
/// Absent ids are not an error. The result is `""` when no id survives.
pub fn remove(blob: &str, id: u64) -> Result<String> {
    let mut list = IdList::decode(blob)?;
    list.remove(id);
    Ok(list.encode())
}
