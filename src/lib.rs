//! nameindex - keyword inverted index for entity name search
//!
//! Users, teams and tournaments are indexed by the lower-cased words of
//! their names. Each word maps to one index entry holding the ids of every
//! entity whose name contains it, and a per-kind counter tracks how many
//! distinct words are indexed.
//!
//! # Quick Start
//!
//! ```
//! use nameindex::{Database, IndexSet};
//! use std::sync::Arc;
//!
//! let indexes = IndexSet::open(Arc::new(Database::in_memory())).unwrap();
//! let users = indexes.users();
//!
//! users.on_entity_created("John Snow", 1);
//! users.on_entity_created("John Stark", 2);
//! assert_eq!(users.search("john").sorted_ids(), vec![1, 2]);
//! assert_eq!(users.search("JOHN snow").sorted_ids(), vec![1]);
//! assert_eq!(users.word_frequency("john").unwrap(), 2);
//! assert_eq!(users.distinct_word_count().unwrap(), 3);
//! ```
//!
//! # Architecture
//!
//! Index maintenance runs on the engine's optimistic transactions, one per
//! word, over any [`DocumentStore`]. Storage, concurrency and engine
//! internals stay in their own crates; this crate re-exports what callers
//! need.

pub use nameindex_core::{Document, DocumentStore, EntityKind, Error, Key, Result, Value};
pub use nameindex_engine::{logging, Database, IndexConfig, RetryConfig, CONFIG_FILE_NAME};
pub use nameindex_search::*;
pub use nameindex_storage::MemoryStore;
