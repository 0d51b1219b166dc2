//! IndexEntry store
//!
//! One persisted record per (entity kind, word):
//!
//! | field | value |
//! |---|---|
//! | `Id` | allocated id, also the record key |
//! | `KeyName` | the lowercase word |
//! | `UserIds` / `TeamIds` / `TournamentIds` | [`IdList`](crate::id_list::IdList) text |
//!
//! Mutations are staged on a [`TransactionContext`]; nothing here commits.
//! Lookups used by queries read the store directly.

use crate::id_list::IdList;
use nameindex_core::{
    Document, DocumentStore, EntityKind, Error, Key, KeyId, Result, Value,
};
use nameindex_engine::TransactionContext;
use serde::Serialize;

/// Field holding the word
pub const KEY_NAME_FIELD: &str = "KeyName";
/// Field holding the record id
pub const ID_FIELD: &str = "Id";

/// A word's record: the word and the ids of the entities whose name holds it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    /// Record id, immutable once allocated
    pub id: u64,
    /// The lowercase word
    pub key_name: String,
    /// Persisted id list text
    pub id_list: String,
}

impl IndexEntry {
    /// Decoded id list
    pub fn ids(&self) -> Result<IdList> {
        IdList::decode(&self.id_list)
    }

    /// Number of entities holding the word
    pub fn frequency(&self) -> Result<usize> {
        Ok(self.ids()?.len())
    }
}

/// Typed access to the index entries of one entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryStore {
    kind: EntityKind,
}

impl EntryStore {
    /// Entries of `kind`
    pub fn new(kind: EntityKind) -> Self {
        Self { kind }
    }

    /// Entity kind served
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Record key of entry `id`
    pub fn key(&self, id: u64) -> Key {
        Key::numeric(self.kind.index_kind(), id)
    }

    fn to_document(&self, entry: &IndexEntry) -> Result<Document> {
        let id = i64::try_from(entry.id)
            .map_err(|_| Error::invalid_input(format!("entry id {} out of range", entry.id)))?;
        Ok(Document::new()
            .with(ID_FIELD, id)
            .with(KEY_NAME_FIELD, entry.key_name.as_str())
            .with(self.kind.ids_field(), entry.id_list.as_str()))
    }

    fn from_document(&self, key: &Key, document: &Document) -> Result<IndexEntry> {
        let id = match &key.id {
            KeyId::Int(id) => *id,
            KeyId::Name(name) => {
                return Err(Error::corruption(format!(
                    "{} record keyed by name {:?}",
                    self.kind.index_kind(),
                    name
                )))
            }
        };
        let field = |name: &str| {
            document.get_str(name).ok_or_else(|| {
                Error::corruption(format!("{} missing string field {}", key, name))
            })
        };
        Ok(IndexEntry {
            id,
            key_name: field(KEY_NAME_FIELD)?.to_string(),
            id_list: field(self.kind.ids_field())?.to_string(),
        })
    }

    fn first_match(&self, hits: Vec<(Key, Document)>) -> Result<Option<IndexEntry>> {
        hits.into_iter()
            .next()
            .map(|(key, doc)| self.from_document(&key, &doc))
            .transpose()
    }

    /// Find the entry for `word` inside a transaction
    ///
    /// The lookup is recorded as a query read, so the transaction conflicts
    /// if another one creates, changes or deletes the word's entry first.
    pub fn find_by_word(
        &self,
        txn: &mut TransactionContext,
        word: &str,
    ) -> Result<Option<IndexEntry>> {
        let hits = txn.query_by_field(
            self.kind.index_kind(),
            KEY_NAME_FIELD,
            &Value::from(word),
            1,
        )?;
        self.first_match(hits)
    }

    /// Find the entry for `word` outside any transaction
    pub fn lookup(&self, store: &dyn DocumentStore, word: &str) -> Result<Option<IndexEntry>> {
        let hits = store.query_by_field(
            self.kind.index_kind(),
            KEY_NAME_FIELD,
            &Value::from(word),
            1,
        )?;
        self.first_match(hits.into_iter().map(|(k, v)| (k, v.value)).collect())
    }

    /// Stage a new entry for `word`
    pub fn create(
        &self,
        txn: &mut TransactionContext,
        word: &str,
        ids: &IdList,
    ) -> Result<IndexEntry> {
        let entry = IndexEntry {
            id: txn.allocate_id(self.kind.index_kind())?,
            key_name: word.to_string(),
            id_list: ids.encode(),
        };
        txn.put(self.key(entry.id), self.to_document(&entry)?)?;
        Ok(entry)
    }

    /// Stage an overwrite of an existing entry
    pub fn update(&self, txn: &mut TransactionContext, entry: &IndexEntry) -> Result<()> {
        txn.put(self.key(entry.id), self.to_document(entry)?)
    }

    /// Stage removal of an entry
    pub fn delete(&self, txn: &mut TransactionContext, entry: &IndexEntry) -> Result<()> {
        txn.delete(self.key(entry.id))
    }

    /// Every live entry of the kind, in id order
    pub fn scan(&self, store: &dyn DocumentStore) -> Result<Vec<IndexEntry>> {
        store
            .scan_kind(self.kind.index_kind())?
            .iter()
            .map(|(key, doc)| self.from_document(key, &doc.value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nameindex_engine::Database;

    fn users() -> EntryStore {
        EntryStore::new(EntityKind::User)
    }

    #[test]
    fn test_create_persists_record_shape() {
        let db = Database::in_memory();
        let entry = db
            .transaction(|txn| users().create(txn, "john", &IdList::single(1)))
            .unwrap();
        assert_eq!(entry.id, 1);

        let doc = db.store().get(&users().key(1)).unwrap().unwrap().value;
        assert_eq!(doc.get_int("Id"), Some(1));
        assert_eq!(doc.get_str("KeyName"), Some("john"));
        assert_eq!(doc.get_str("UserIds"), Some("1"));
    }

    #[test]
    fn test_find_by_word_exact_match() {
        let db = Database::in_memory();
        db.transaction(|txn| users().create(txn, "john", &IdList::single(1)))
            .unwrap();

        let store = db.store().as_ref();
        assert_eq!(users().lookup(store, "john").unwrap().unwrap().key_name, "john");
        assert!(users().lookup(store, "jo").unwrap().is_none());
        assert!(users().lookup(store, "John").unwrap().is_none());
        assert!(EntryStore::new(EntityKind::Team)
            .lookup(store, "john")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_update_and_delete() {
        let db = Database::in_memory();
        let mut entry = db
            .transaction(|txn| users().create(txn, "snow", &IdList::single(1)))
            .unwrap();

        entry.id_list = "1 2".to_string();
        db.transaction(|txn| users().update(txn, &entry)).unwrap();
        let found = users().lookup(db.store().as_ref(), "snow").unwrap().unwrap();
        assert_eq!(found.frequency().unwrap(), 2);

        db.transaction(|txn| users().delete(txn, &found)).unwrap();
        assert!(users().lookup(db.store().as_ref(), "snow").unwrap().is_none());
    }

    #[test]
    fn test_find_by_word_sees_staged_create() {
        let db = Database::in_memory();
        db.transaction(|txn| {
            users().create(txn, "stark", &IdList::single(4))?;
            let found = users().find_by_word(txn, "stark")?;
            assert_eq!(found.map(|e| e.id_list), Some("4".to_string()));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_malformed_record_is_corruption() {
        let db = Database::in_memory();
        db.store()
            .put(users().key(9), Document::new().with("KeyName", "john"))
            .unwrap();
        assert!(matches!(
            users().lookup(db.store().as_ref(), "john"),
            Err(Error::Corruption(_))
        ));
    }

    #[test]
    fn test_scan_in_id_order() {
        let db = Database::in_memory();
        for word in ["b", "a", "c"] {
            db.transaction(|txn| users().create(txn, word, &IdList::single(1)))
                .unwrap();
        }
        let words: Vec<_> = users()
            .scan(db.store().as_ref())
            .unwrap()
            .into_iter()
            .map(|e| e.key_name)
            .collect();
        assert_eq!(words, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_entry_json_view() {
        let entry = IndexEntry {
            id: 3,
            key_name: "jon".into(),
            id_list: "1 2".into(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["key_name"], "jon");
        assert_eq!(json["id_list"], "1 2");
    }
}
