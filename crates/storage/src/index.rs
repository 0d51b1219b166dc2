//! Secondary indices for efficient query patterns
//!
//! This module provides secondary indices that enable efficient queries
//! without scanning the entire BTreeMap:
//! - KindIndex: Maps kind → Set<Key> for kind scans
//! - FieldIndex: Maps (kind, field, value) → Set<Key> for exact-match field queries

use nameindex_core::{Document, Key, Value};
use std::collections::{BTreeSet, HashMap};

/// Secondary index: kind → Keys
///
/// Keys are kept ordered so scans return results in key order.
#[derive(Debug, Default)]
pub struct KindIndex {
    index: HashMap<String, BTreeSet<Key>>,
}

impl KindIndex {
    /// Create a new empty KindIndex
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
        }
    }

    /// Add key to its kind's set
    pub fn insert(&mut self, key: Key) {
        self.index.entry(key.kind.clone()).or_default().insert(key);
    }

    /// Remove key from its kind's set
    ///
    /// If the set becomes empty, removes the kind entry entirely.
    pub fn remove(&mut self, key: &Key) {
        if let Some(keys) = self.index.get_mut(&key.kind) {
            keys.remove(key);
            if keys.is_empty() {
                self.index.remove(&key.kind);
            }
        }
    }

    /// Get all keys for a kind
    pub fn get(&self, kind: &str) -> Option<&BTreeSet<Key>> {
        self.index.get(kind)
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Get the number of kinds in the index
    pub fn len(&self) -> usize {
        self.index.len()
    }
}

/// Composite lookup key of the field index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FieldKey {
    kind: String,
    field: String,
    value: Value,
}

/// Secondary index: (kind, field, value) → Keys
///
/// Every field of every stored document is indexed, so any exact-match
/// query is answered without touching unrelated documents.
#[derive(Debug, Default)]
pub struct FieldIndex {
    index: HashMap<FieldKey, BTreeSet<Key>>,
}

impl FieldIndex {
    /// Create a new empty FieldIndex
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
        }
    }

    /// Index every field of `document` under `key`
    pub fn insert(&mut self, key: &Key, document: &Document) {
        for (field, value) in document.iter() {
            self.index
                .entry(FieldKey {
                    kind: key.kind.clone(),
                    field: field.clone(),
                    value: value.clone(),
                })
                .or_default()
                .insert(key.clone());
        }
    }

    /// Remove every field of `document` stored under `key`
    pub fn remove(&mut self, key: &Key, document: &Document) {
        for (field, value) in document.iter() {
            let field_key = FieldKey {
                kind: key.kind.clone(),
                field: field.clone(),
                value: value.clone(),
            };
            if let Some(keys) = self.index.get_mut(&field_key) {
                keys.remove(key);
                if keys.is_empty() {
                    self.index.remove(&field_key);
                }
            }
        }
    }

    /// Keys of `kind` whose `field` equals `value`
    pub fn get(&self, kind: &str, field: &str, value: &Value) -> Option<&BTreeSet<Key>> {
        self.index.get(&FieldKey {
            kind: kind.to_string(),
            field: field.to_string(),
            value: value.clone(),
        })
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
