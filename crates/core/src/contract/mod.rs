//! Contract types shared by the store and its callers
//!
//! - `versioned`: Generic versioned wrapper returned by every read
//!
//! ## The Contract
//!
//! ```text
//! fn get(&self, ...) -> Result<Option<Versioned<T>>>
//! fn put(&self, ...) -> Result<u64>
//! ```

pub mod versioned;

pub use versioned::{Versioned, VersionedDocument};
