//! Core types and traits for nameindex
//!
//! This crate defines the foundational types used throughout the system:
//! - Key / KeyId: Composite record keys
//! - EntityKind: Searchable entity types (User, Team, Tournament)
//! - Value / Document: Schemaless stored records
//! - Versioned: Version-tagged read results
//! - Error: Error type hierarchy
//! - Traits: The DocumentStore persistence contract

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod contract;
pub mod error;
pub mod traits;
pub mod types;
pub mod value;

pub use contract::{Versioned, VersionedDocument};
pub use error::{Error, Result};
pub use traits::DocumentStore;
pub use types::{EntityKind, Key, KeyId};
pub use value::{Document, Value};
