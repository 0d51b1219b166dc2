//! Generic versioned wrapper type
//!
//! Every read returns data wrapped in `Versioned<T>`; every write returns
//! the version it created. Optimistic transactions validate against these
//! versions at commit time.

use crate::value::Document;
use serde::{Deserialize, Serialize};

/// A value with its version information
///
/// ## Invariants
///
/// - `version` always matches the write that created this data
/// - Versions are assigned by the store and increase monotonically
/// - Version 0 is never assigned; it stands for "absent" in read sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned<T> {
    /// The actual value
    pub value: T,

    /// Version assigned by the store
    pub version: u64,
}

impl<T> Versioned<T> {
    /// Create a new versioned value
    pub fn new(value: T, version: u64) -> Self {
        Versioned { value, version }
    }

    /// Map the inner value to a new type
    pub fn map<U, F>(self, f: F) -> Versioned<U>
    where
        F: FnOnce(T) -> U,
    {
        Versioned {
            value: f(self.value),
            version: self.version,
        }
    }

    /// Get a reference to the inner value
    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Consume and return the inner value
    #[inline]
    pub fn into_value(self) -> T {
        self.value
    }

    /// Get the version
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl<T> AsRef<T> for Versioned<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

/// Versioned stored document
pub type VersionedDocument = Versioned<Document>;
