//! MemoryStore: in-process document store with version management
//!
//! This module implements the DocumentStore trait using:
//! - `BTreeMap<Key, VersionedDocument>` for ordered key storage
//! - `parking_lot::RwLock` for thread-safe access
//! - `AtomicU64` for monotonically increasing version numbers
//! - `DashMap` for per-kind id allocation
//! - Secondary indices for kind scans and exact-match field queries
//!
//! # Design Notes
//!
//! - **No version history**: Each key stores only its latest document
//! - **Version allocation before write lock**: Keeps the lock hold short
//! - **Secondary indices**: kind_index and field_index are updated within
//!   the same write lock as the data map

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::trace;

use nameindex_core::{Document, DocumentStore, Key, Result, Value, Versioned, VersionedDocument};

use crate::index::{FieldIndex, KindIndex};

/// Data map and its secondary indices, guarded by one lock
#[derive(Debug, Default)]
struct Tables {
    data: BTreeMap<Key, VersionedDocument>,
    kind_index: KindIndex,
    field_index: FieldIndex,
}

impl Tables {
    fn insert(&mut self, key: Key, document: VersionedDocument) {
        if let Some(old) = self.data.get(&key) {
            self.field_index.remove(&key, &old.value);
        }
        self.field_index.insert(&key, &document.value);
        self.kind_index.insert(key.clone());
        self.data.insert(key, document);
    }

    fn remove(&mut self, key: &Key) -> Option<VersionedDocument> {
        let removed = self.data.remove(key)?;
        self.field_index.remove(key, &removed.value);
        self.kind_index.remove(key);
        Some(removed)
    }
}

/// In-memory document store
///
/// Thread-safe through `parking_lot::RwLock`, `AtomicU64` and `DashMap`.
/// Readers never observe a document without its index entries or vice versa.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    /// Global version counter for monotonically increasing versions
    version: AtomicU64,
    /// Last id handed out per kind
    ids: DashMap<String, u64>,
}

impl MemoryStore {
    /// Create a new empty MemoryStore
    ///
    /// Initial version is 0 (no writes have occurred).
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next version atomically
    fn next_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Number of documents stored
    pub fn len(&self) -> usize {
        self.tables.read().data.len()
    }

    /// Whether the store holds no documents
    pub fn is_empty(&self) -> bool {
        self.tables.read().data.is_empty()
    }

    /// Number of documents of a kind
    pub fn count_kind(&self, kind: &str) -> usize {
        self.tables
            .read()
            .kind_index
            .get(kind)
            .map_or(0, |keys| keys.len())
    }
}

impl DocumentStore for MemoryStore {
    fn allocate_id(&self, kind: &str) -> Result<u64> {
        let mut last = self.ids.entry(kind.to_string()).or_insert(0);
        *last += 1;
        Ok(*last)
    }

    fn get(&self, key: &Key) -> Result<Option<VersionedDocument>> {
        Ok(self.tables.read().data.get(key).cloned())
    }

    fn put(&self, key: Key, document: Document) -> Result<u64> {
        let version = self.next_version();
        trace!(target: "nameindex::store", key = %key, version, "put");
        self.tables
            .write()
            .insert(key, Versioned::new(document, version));
        Ok(version)
    }

    fn delete(&self, key: &Key) -> Result<Option<VersionedDocument>> {
        let removed = self.tables.write().remove(key);
        if removed.is_some() {
            // Deletes advance the version so read-set validation sees them
            let version = self.next_version();
            trace!(target: "nameindex::store", key = %key, version, "delete");
        }
        Ok(removed)
    }

    fn query_by_field(
        &self,
        kind: &str,
        field: &str,
        value: &Value,
        limit: usize,
    ) -> Result<Vec<(Key, VersionedDocument)>> {
        let tables = self.tables.read();
        let results = match tables.field_index.get(kind, field, value) {
            Some(keys) => keys
                .iter()
                .filter_map(|key| tables.data.get(key).map(|doc| (key.clone(), doc.clone())))
                .take(limit)
                .collect(),
            None => Vec::new(),
        };
        Ok(results)
    }

    fn scan_kind(&self, kind: &str) -> Result<Vec<(Key, VersionedDocument)>> {
        let tables = self.tables.read();
        let results = match tables.kind_index.get(kind) {
            Some(keys) => keys
                .iter()
                .filter_map(|key| tables.data.get(key).map(|doc| (key.clone(), doc.clone())))
                .collect(),
            None => Vec::new(),
        };
        Ok(results)
    }

    fn current_version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn entry(word: &str, ids: &str) -> Document {
        Document::new().with("KeyName", word).with("UserIds", ids)
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.current_version(), 0);
    }

    #[test]
    fn test_put_get_delete() {
        let store = MemoryStore::new();
        let key = Key::numeric("UserInvertedIndex", 1);

        let v = store.put(key.clone(), entry("john", "1")).unwrap();
        assert_eq!(v, 1);

        let got = store.get(&key).unwrap().unwrap();
        assert_eq!(got.version, 1);
        assert_eq!(got.value.get_str("KeyName"), Some("john"));

        let removed = store.delete(&key).unwrap();
        assert!(removed.is_some());
        assert!(store.get(&key).unwrap().is_none());
        assert!(store.delete(&key).unwrap().is_none());
    }

    #[test]
    fn test_versions_increase_on_every_write() {
        let store = MemoryStore::new();
        let key = Key::numeric("UserInvertedIndex", 1);
        let v1 = store.put(key.clone(), entry("john", "1")).unwrap();
        let v2 = store.put(key.clone(), entry("john", "1 2")).unwrap();
        assert!(v2 > v1);

        store.delete(&key).unwrap();
        assert!(store.current_version() > v2);
    }

    #[test]
    fn test_allocate_id_is_per_kind() {
        let store = MemoryStore::new();
        assert_eq!(store.allocate_id("UserInvertedIndex").unwrap(), 1);
        assert_eq!(store.allocate_id("UserInvertedIndex").unwrap(), 2);
        assert_eq!(store.allocate_id("TeamInvertedIndex").unwrap(), 1);
    }

    #[test]
    fn test_allocate_id_unique_across_threads() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..100)
                        .map(|_| store.allocate_id("UserInvertedIndex").unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 800);
    }

    #[test]
    fn test_query_by_field_exact_and_limited() {
        let store = MemoryStore::new();
        store
            .put(Key::numeric("UserInvertedIndex", 1), entry("john", "1"))
            .unwrap();
        store
            .put(Key::numeric("UserInvertedIndex", 2), entry("johnny", "2"))
            .unwrap();
        store
            .put(Key::numeric("TeamInvertedIndex", 1), entry("john", "9"))
            .unwrap();

        let hits = store
            .query_by_field("UserInvertedIndex", "KeyName", &Value::from("john"), 10)
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, Key::numeric("UserInvertedIndex", 1));

        store
            .put(Key::numeric("UserInvertedIndex", 3), entry("john", "3"))
            .unwrap();
        let limited = store
            .query_by_field("UserInvertedIndex", "KeyName", &Value::from("john"), 1)
            .unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].0, Key::numeric("UserInvertedIndex", 1));
    }

    #[test]
    fn test_query_sees_overwrites() {
        let store = MemoryStore::new();
        let key = Key::numeric("UserInvertedIndex", 1);
        store.put(key.clone(), entry("john", "1")).unwrap();
        store.put(key.clone(), entry("snow", "1")).unwrap();

        assert!(store
            .query_by_field("UserInvertedIndex", "KeyName", &Value::from("john"), 1)
            .unwrap()
            .is_empty());
        assert_eq!(
            store
                .query_by_field("UserInvertedIndex", "KeyName", &Value::from("snow"), 1)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_scan_kind() {
        let store = MemoryStore::new();
        for id in [3, 1, 2] {
            store
                .put(Key::numeric("UserInvertedIndex", id), entry("w", "1"))
                .unwrap();
        }
        store
            .put(
                Key::named("WordCountUser", "singleton"),
                Document::new().with("Count", 3i64),
            )
            .unwrap();

        let scanned = store.scan_kind("UserInvertedIndex").unwrap();
        let ids: Vec<_> = scanned.iter().filter_map(|(k, _)| k.as_int()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(store.count_kind("WordCountUser"), 1);
        assert!(store.scan_kind("Missing").unwrap().is_empty());
    }
}
