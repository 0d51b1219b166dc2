//! Storage layer for nameindex
//!
//! This crate implements the document store backend with:
//! - MemoryStore: BTreeMap-based storage with RwLock
//! - Secondary indices (kind_index, field_index)
//! - Per-kind id allocation
//! - Version management with AtomicU64
//! - Fault injection wrapper for tests (`testing`)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod index;
pub mod memory;
pub mod testing;

pub use index::{FieldIndex, KindIndex};
pub use memory::MemoryStore;
