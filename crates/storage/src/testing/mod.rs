//! Testing utilities for code built on the document store
//!
//! - **FaultyStore**: Wraps a store, fails chosen operations on demand and
//!   counts writes per key
//!
//! # Example
//!
//! ```ignore
//! use nameindex_storage::testing::{FaultRule, FaultyStore, StoreOp};
//!
//! let store = FaultyStore::new(MemoryStore::new());
//! store.inject(FaultRule::new(StoreOp::Query).value("snow"));
//! ```

mod faulty;

pub use faulty::{FaultRule, FaultyStore, StoreOp};
