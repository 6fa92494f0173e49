//! Keyed record collection with create-once semantics.

use super::RecordKey;
use std::collections::HashMap;
use std::hash::Hash;
use thiserror::Error;

/// Result type for record collection operations.
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors returned by record collection operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    /// A record already occupies the key.
    #[error("record already exists at key {0}")]
    Duplicate(RecordKey),

    /// No record occupies the key.
    #[error("no record exists at key {0}")]
    NotFound(RecordKey),
}

/// Keyed collection of records of one entity family.
///
/// Records are created exactly once per key and thereafter mutated in place;
/// keys are never reassigned. `K` is a typed key wrapper convertible to the
/// underlying [`RecordKey`] for error reporting.
#[derive(Debug, Clone, Default)]
pub struct Records<K, V> {
    entries: HashMap<K, V>,
}

impl<K, V> Records<K, V>
where
    K: Copy + Eq + Hash + Into<RecordKey>,
{
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Stores a new record at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Duplicate`] when the key is already occupied.
    pub fn create(&mut self, key: K, record: V) -> RecordResult<()> {
        if self.entries.contains_key(&key) {
            return Err(RecordError::Duplicate(key.into()));
        }
        self.entries.insert(key, record);
        Ok(())
    }

    /// Returns the record at `key`, if any.
    #[must_use]
    pub fn get(&self, key: K) -> Option<&V> {
        self.entries.get(&key)
    }

    /// Returns a mutable reference to the record at `key`, if any.
    #[must_use]
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.entries.get_mut(&key)
    }

    /// Returns the record at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] when the key is unoccupied.
    pub fn fetch(&self, key: K) -> RecordResult<&V> {
        self.entries
            .get(&key)
            .ok_or_else(|| RecordError::NotFound(key.into()))
    }

    /// Returns a mutable reference to the record at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] when the key is unoccupied.
    pub fn fetch_mut(&mut self, key: K) -> RecordResult<&mut V> {
        self.entries
            .get_mut(&key)
            .ok_or_else(|| RecordError::NotFound(key.into()))
    }

    /// Returns whether a record occupies `key`.
    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.entries.contains_key(&key)
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
