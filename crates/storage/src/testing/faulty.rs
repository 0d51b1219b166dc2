//! Fault-injecting store wrapper
//!
//! `FaultyStore` wraps any [`DocumentStore`] and fails selected operations
//! with `Error::Store`, so callers' partial-failure handling can be tested
//! deterministically. It also counts writes per key, which lets tests assert
//! that an operation left a record untouched.
//!
//! # Example
//!
//! ```
//! use nameindex_core::{DocumentStore, Key, Document};
//! use nameindex_storage::testing::{FaultRule, FaultyStore, StoreOp};
//! use nameindex_storage::MemoryStore;
//!
//! let store = FaultyStore::new(MemoryStore::new());
//! store.inject(FaultRule::new(StoreOp::Put).kind("WordCountUser").times(1));
//!
//! let key = Key::named("WordCountUser", "singleton");
//! assert!(store.put(key.clone(), Document::new()).is_err());
//! assert!(store.put(key.clone(), Document::new()).is_ok());
//! assert_eq!(store.writes_to(&key), 1);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;

use nameindex_core::{Document, DocumentStore, Error, Key, Result, Value, VersionedDocument};

/// Store operation a fault rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// `allocate_id`
    AllocateId,
    /// `get`
    Get,
    /// `put`
    Put,
    /// `delete`
    Delete,
    /// `query_by_field`
    Query,
    /// `scan_kind`
    Scan,
}

/// A rule describing which operations fail
///
/// Unset filters match everything. A rule with `times(n)` is removed after
/// failing `n` operations; otherwise it stays until cleared.
#[derive(Debug, Clone)]
pub struct FaultRule {
    op: StoreOp,
    kind: Option<String>,
    value: Option<Value>,
    remaining: Option<usize>,
}

impl FaultRule {
    /// Fail every `op`
    pub fn new(op: StoreOp) -> Self {
        Self {
            op,
            kind: None,
            value: None,
            remaining: None,
        }
    }

    /// Only fail operations on records of `kind`
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Only fail operations involving `value`
    ///
    /// Matches a query whose value equals it, or a put/get/delete of a
    /// document holding it in any field.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Fail at most `n` operations
    pub fn times(mut self, n: usize) -> Self {
        self.remaining = Some(n);
        self
    }
}

/// What an operation touched, for rule matching
struct Probe<'a> {
    op: StoreOp,
    kind: &'a str,
    query_value: Option<&'a Value>,
    document: Option<&'a Document>,
}

impl FaultRule {
    fn matches(&self, probe: &Probe<'_>) -> bool {
        if self.op != probe.op {
            return false;
        }
        if let Some(kind) = &self.kind {
            if kind != probe.kind {
                return false;
            }
        }
        match &self.value {
            None => true,
            Some(wanted) => {
                probe.query_value == Some(wanted)
                    || probe
                        .document
                        .map_or(false, |doc| doc.iter().any(|(_, v)| v == wanted))
            }
        }
    }
}

/// Store wrapper with fault injection and write accounting
pub struct FaultyStore<S> {
    inner: S,
    rules: Mutex<Vec<FaultRule>>,
    /// Successful puts + deletes per key
    writes: DashMap<Key, usize>,
    /// Operations attempted per kind of operation
    attempts: Mutex<HashMap<StoreOp, u64>>,
    /// Operations failed by injection
    injected: AtomicU64,
}

impl<S: DocumentStore> FaultyStore<S> {
    /// Wrap `inner` with no faults configured
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            rules: Mutex::new(Vec::new()),
            writes: DashMap::new(),
            attempts: Mutex::new(HashMap::new()),
            injected: AtomicU64::new(0),
        }
    }

    /// Add a fault rule
    pub fn inject(&self, rule: FaultRule) {
        self.rules.lock().push(rule);
    }

    /// Remove all fault rules
    pub fn clear_faults(&self) {
        self.rules.lock().clear();
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Successful writes (puts and deletes) to `key`
    pub fn writes_to(&self, key: &Key) -> usize {
        self.writes.get(key).map_or(0, |n| *n)
    }

    /// Successful writes to records of `kind`
    pub fn writes_to_kind(&self, kind: &str) -> usize {
        self.writes
            .iter()
            .filter(|e| e.key().kind == kind)
            .map(|e| *e.value())
            .sum()
    }

    /// Forget all write counts
    pub fn reset_counts(&self) {
        self.writes.clear();
        self.attempts.lock().clear();
    }

    /// Number of attempted operations of a type
    pub fn attempts(&self, op: StoreOp) -> u64 {
        self.attempts.lock().get(&op).copied().unwrap_or(0)
    }

    /// Number of operations failed by injection
    pub fn injected_failures(&self) -> u64 {
        self.injected.load(Ordering::Relaxed)
    }

    fn check(&self, probe: Probe<'_>) -> Result<()> {
        *self.attempts.lock().entry(probe.op).or_insert(0) += 1;

        let mut rules = self.rules.lock();
        let Some(pos) = rules.iter().position(|r| r.matches(&probe)) else {
            return Ok(());
        };
        if let Some(remaining) = rules[pos].remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                rules.remove(pos);
            }
        }
        self.injected.fetch_add(1, Ordering::Relaxed);
        Err(Error::store(format!(
            "injected {:?} failure on {}",
            probe.op, probe.kind
        )))
    }

    fn record_write(&self, key: &Key) {
        *self.writes.entry(key.clone()).or_insert(0) += 1;
    }
}

impl<S: DocumentStore> DocumentStore for FaultyStore<S> {
    fn allocate_id(&self, kind: &str) -> Result<u64> {
        self.check(Probe {
            op: StoreOp::AllocateId,
            kind,
            query_value: None,
            document: None,
        })?;
        self.inner.allocate_id(kind)
    }

    fn get(&self, key: &Key) -> Result<Option<VersionedDocument>> {
        let current = self.inner.get(key)?;
        self.check(Probe {
            op: StoreOp::Get,
            kind: &key.kind,
            query_value: None,
            document: current.as_ref().map(|d| &d.value),
        })?;
        Ok(current)
    }

    fn put(&self, key: Key, document: Document) -> Result<u64> {
        self.check(Probe {
            op: StoreOp::Put,
            kind: &key.kind,
            query_value: None,
            document: Some(&document),
        })?;
        let version = self.inner.put(key.clone(), document)?;
        self.record_write(&key);
        Ok(version)
    }

    fn delete(&self, key: &Key) -> Result<Option<VersionedDocument>> {
        let current = self.inner.get(key)?;
        self.check(Probe {
            op: StoreOp::Delete,
            kind: &key.kind,
            query_value: None,
            document: current.as_ref().map(|d| &d.value),
        })?;
        let removed = self.inner.delete(key)?;
        if removed.is_some() {
            self.record_write(key);
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
        self.check(Probe {
            op: StoreOp::Query,
            kind,
            query_value: Some(value),
            document: None,
        })?;
        self.inner.query_by_field(kind, field, value, limit)
    }

    fn scan_kind(&self, kind: &str) -> Result<Vec<(Key, VersionedDocument)>> {
        self.check(Probe {
            op: StoreOp::Scan,
            kind,
            query_value: None,
            document: None,
        })?;
        self.inner.scan_kind(kind)
    }

    fn current_version(&self) -> u64 {
        self.inner.current_version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn test_no_rules_passes_through() {
        let store = FaultyStore::new(MemoryStore::new());
        let key = Key::numeric("UserInvertedIndex", 1);
        store.put(key.clone(), Document::new().with("KeyName", "a")).unwrap();
        assert!(store.get(&key).unwrap().is_some());
        assert_eq!(store.injected_failures(), 0);
        assert_eq!(store.attempts(StoreOp::Put), 1);
    }

    #[test]
    fn test_rule_filters_by_kind() {
        let store = FaultyStore::new(MemoryStore::new());
        store.inject(FaultRule::new(StoreOp::Put).kind("WordCountUser"));

        assert!(store
            .put(Key::numeric("UserInvertedIndex", 1), Document::new())
            .is_ok());
        let err = store
            .put(Key::named("WordCountUser", "singleton"), Document::new())
            .unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[test]
    fn test_rule_filters_by_query_value() {
        let store = FaultyStore::new(MemoryStore::new());
        store.inject(FaultRule::new(StoreOp::Query).value("snow"));

        assert!(store
            .query_by_field("UserInvertedIndex", "KeyName", &Value::from("john"), 1)
            .is_ok());
        assert!(store
            .query_by_field("UserInvertedIndex", "KeyName", &Value::from("snow"), 1)
            .is_err());
    }

    #[test]
    fn test_rule_filters_by_document_value() {
        let store = FaultyStore::new(MemoryStore::new());
        store.inject(FaultRule::new(StoreOp::Put).value("snow"));

        assert!(store
            .put(
                Key::numeric("UserInvertedIndex", 1),
                Document::new().with("KeyName", "john")
            )
            .is_ok());
        assert!(store
            .put(
                Key::numeric("UserInvertedIndex", 2),
                Document::new().with("KeyName", "snow")
            )
            .is_err());
    }

    #[test]
    fn test_times_expires_rule() {
        let store = FaultyStore::new(MemoryStore::new());
        store.inject(FaultRule::new(StoreOp::AllocateId).times(2));

        assert!(store.allocate_id("K").is_err());
        assert!(store.allocate_id("K").is_err());
        assert_eq!(store.allocate_id("K").unwrap(), 1);
        assert_eq!(store.injected_failures(), 2);
    }

    #[test]
    fn test_failed_writes_are_not_counted() {
        let store = FaultyStore::new(MemoryStore::new());
        let key = Key::numeric("UserInvertedIndex", 1);
        store.inject(FaultRule::new(StoreOp::Put).times(1));

        assert!(store.put(key.clone(), Document::new()).is_err());
        assert_eq!(store.writes_to(&key), 0);

        store.put(key.clone(), Document::new()).unwrap();
        store.delete(&key).unwrap();
        assert_eq!(store.writes_to(&key), 2);
        assert_eq!(store.writes_to_kind("UserInvertedIndex"), 2);

        store.reset_counts();
        assert_eq!(store.writes_to(&key), 0);
    }

    #[test]
    fn test_clear_faults() {
        let store = FaultyStore::new(MemoryStore::new());
        store.inject(FaultRule::new(StoreOp::Scan));
        assert!(store.scan_kind("K").is_err());
        store.clear_faults();
        assert!(store.scan_kind("K").is_ok());
    }
}
