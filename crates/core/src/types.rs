//! Core types for nameindex
//!
//! This module defines:
//! - Key: Composite record key (record kind + identifier)
//! - KeyId: Numeric (allocated) or named (singleton) identifier
//! - EntityKind: The entity types whose names are indexed

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier part of a [`Key`]
///
/// Allocated records use `Int`; singletons such as word counters use a
/// fixed `Name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyId {
    /// Store-allocated numeric identifier
    Int(u64),
    /// Application-chosen string identifier
    Name(String),
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyId::Int(id) => write!(f, "{}", id),
            KeyId::Name(name) => write!(f, "{:?}", name),
        }
    }
}

/// Unified key for all stored records
///
/// # Ordering
///
/// Keys are ordered by: kind → id. All records of a kind are grouped
/// together, which keeps kind scans contiguous in ordered storage.
///
/// # Examples
///
/// ```
/// use nameindex_core::Key;
///
/// let entry = Key::numeric("UserInvertedIndex", 7);
/// let counter = Key::named("WordCountUser", "singleton");
/// assert_eq!(entry.kind, "UserInvertedIndex");
/// assert!(counter.is_named());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key {
    /// Record kind (the store's "table")
    pub kind: String,
    /// Identifier within the kind
    pub id: KeyId,
}

impl Key {
    /// Create a key with an allocated numeric id
    pub fn numeric(kind: impl Into<String>, id: u64) -> Self {
        Self {
            kind: kind.into(),
            id: KeyId::Int(id),
        }
    }

    /// Create a key with a string id
    pub fn named(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: KeyId::Name(name.into()),
        }
    }

    /// Numeric id, if this key has one
    pub fn as_int(&self) -> Option<u64> {
        match self.id {
            KeyId::Int(id) => Some(id),
            KeyId::Name(_) => None,
        }
    }

    /// Whether this key uses a string id
    pub fn is_named(&self) -> bool {
        matches!(self.id, KeyId::Name(_))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.id)
    }
}

/// Entity types whose names are searchable
///
/// Each kind owns its own set of index entries and its own word counter.
/// The protocol is identical for all of them; only the record kinds and
/// the id-list field name differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// Registered users
    User,
    /// Teams
    Team,
    /// Tournaments
    Tournament,
}

impl EntityKind {
    /// All entity kinds, in declaration order
    pub const ALL: [EntityKind; 3] = [EntityKind::User, EntityKind::Team, EntityKind::Tournament];

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Team => "Team",
            EntityKind::Tournament => "Tournament",
        }
    }

    /// Record kind holding this entity's index entries
    pub fn index_kind(&self) -> &'static str {
        match self {
            EntityKind::User => "UserInvertedIndex",
            EntityKind::Team => "TeamInvertedIndex",
            EntityKind::Tournament => "TournamentInvertedIndex",
        }
    }

    /// Record kind holding this entity's word counter singleton
    pub fn counter_kind(&self) -> &'static str {
        match self {
            EntityKind::User => "WordCountUser",
            EntityKind::Team => "WordCountTeam",
            EntityKind::Tournament => "WordCountTournament",
        }
    }

    /// Name of the index entry field that stores the id list
    pub fn ids_field(&self) -> &'static str {
        match self {
            EntityKind::User => "UserIds",
            EntityKind::Team => "TeamIds",
            EntityKind::Tournament => "TournamentIds",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_key_ordering_groups_kinds() {
        let a = Key::numeric("TeamInvertedIndex", 9);
        let b = Key::numeric("UserInvertedIndex", 1);
        let c = Key::numeric("UserInvertedIndex", 2);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_numeric_keys_sort_numerically() {
        let k2 = Key::numeric("UserInvertedIndex", 2);
        let k10 = Key::numeric("UserInvertedIndex", 10);
        assert!(k2 < k10);
    }

    #[test]
    fn test_key_accessors() {
        let k = Key::numeric("UserInvertedIndex", 5);
        assert_eq!(k.as_int(), Some(5));
        assert!(!k.is_named());

        let s = Key::named("WordCountUser", "singleton");
        assert_eq!(s.as_int(), None);
        assert!(s.is_named());
    }

    #[test]
    fn test_key_display() {
        assert_eq!(
            Key::numeric("UserInvertedIndex", 3).to_string(),
            "UserInvertedIndex(3)"
        );
        assert_eq!(
            Key::named("WordCountTeam", "singleton").to_string(),
            "WordCountTeam(\"singleton\")"
        );
    }

    #[test]
    fn test_entity_kinds_use_distinct_record_kinds() {
        let index_kinds: HashSet<_> = EntityKind::ALL.iter().map(|k| k.index_kind()).collect();
        let counter_kinds: HashSet<_> = EntityKind::ALL.iter().map(|k| k.counter_kind()).collect();
        assert_eq!(index_kinds.len(), 3);
        assert_eq!(counter_kinds.len(), 3);
        assert!(index_kinds.is_disjoint(&counter_kinds));
    }

    #[test]
    fn test_ids_field_names() {
        assert_eq!(EntityKind::User.ids_field(), "UserIds");
        assert_eq!(EntityKind::Team.ids_field(), "TeamIds");
        assert_eq!(EntityKind::Tournament.ids_field(), "TournamentIds");
    }
}
