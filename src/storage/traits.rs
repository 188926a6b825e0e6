//! Storage traits and error types
//!
//! This module defines the trait interface for record store backends and
//! associated error types.

use crate::storage::Record;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// One stored partition and how many records it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSummary {
    pub query: String,
    pub records: u64,
}

/// Trait for record store backends
///
/// Implementations own their records once appended. Concurrent access is
/// arranged by the caller (see [`crate::storage::SharedStore`]).
pub trait RecordStore {
    /// Appends records under a query term
    ///
    /// Appending is additive: records already stored under `query` are
    /// kept and the new batch is added after them. A batch is stored
    /// entirely or not at all.
    ///
    /// # Errors
    ///
    /// * `StoreError::WriteFailed` - a record has an empty title or belongs
    ///   to a different query term, or the backend rejected the write
    /// * `StoreError::Unavailable` - the backend could not be reached
    fn append(&mut self, query: &str, records: &[Record]) -> StoreResult<()>;

    /// Returns every record ever appended under exactly `query`
    ///
    /// An unknown query term yields an empty vector, never an error.
    fn query(&self, query: &str) -> StoreResult<Vec<Record>>;

    /// Lists every stored query term with its record count, sorted by term
    fn queries(&self) -> StoreResult<Vec<PartitionSummary>>;

    /// Counts all stored records across partitions
    fn count_records(&self) -> StoreResult<u64> {
        Ok(self.queries()?.iter().map(|p| p.records).sum())
    }
}

/// Checks a batch before any of it is written
pub(crate) fn check_batch(query: &str, records: &[Record]) -> StoreResult<()> {
    if query.is_empty() {
        return Err(StoreError::WriteFailed(
            "query term cannot be empty".to_string(),
        ));
    }

    for record in records {
        if record.title.trim().is_empty() {
            return Err(StoreError::WriteFailed(format!(
                "record under '{}' has an empty title",
                query
            )));
        }

        if record.query != query {
            return Err(StoreError::WriteFailed(format!(
                "record for query '{}' cannot be stored under '{}'",
                record.query, query
            )));
        }
    }

    Ok(())
}
