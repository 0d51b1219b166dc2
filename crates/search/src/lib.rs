//! Keyword inverted index over entity names
//!
//! This crate provides:
//! - Tokenizer: names to lowercase word sets, rename diffs
//! - IdList: entity id sets and their persisted text form
//! - EntryStore: one record per (entity kind, word)
//! - WordCounter: distinct words per entity kind
//! - IndexMaintainer: create / rename / destroy bookkeeping with per-word reports
//! - QueryEngine: multi-word AND lookup and word frequency
//! - KeywordIndex / IndexSet: the facade handlers call
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use nameindex_core::EntityKind;
//! use nameindex_engine::Database;
//! use nameindex_search::KeywordIndex;
//!
//! let index = KeywordIndex::new(Arc::new(Database::in_memory()), EntityKind::User);
//! index.on_entity_created("John Snow", 1);
//! let report = index.on_entity_renamed("John Snow", "John Stark", 1);
//! assert_eq!(report.touched_words(), vec!["snow", "stark"]);
//! assert_eq!(index.search("john stark").sorted_ids(), vec![1]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod counter;
pub mod entry;
pub mod id_list;
pub mod index;
pub mod maintenance;
pub mod query;
pub mod report;
pub mod tokenizer;

pub use counter::{Reconciliation, WordCounter};
pub use entry::{EntryStore, IndexEntry};
pub use id_list::{IdList, MergeOutcome};
pub use index::{IndexSet, KeywordIndex};
pub use maintenance::IndexMaintainer;
pub use query::{LookupResult, QueryEngine, WordError};
pub use report::{IndexReport, WordOutcome, WordReport};
pub use tokenizer::{tokenize, WordDiff, WordSet};
