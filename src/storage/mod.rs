//! Storage module for persisting harvested records
//!
//! Records are partitioned by the query term that produced them. Every
//! backend implements the same narrow [`RecordStore`] interface:
//! - append a batch of records under a query term
//! - read back every record stored under a query term
//!
//! Appends never replace or merge: submitting the same query twice stores
//! two copies.

mod json_file;
mod memory;
mod schema;
mod sqlite;
mod traits;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{PartitionSummary, RecordStore, StoreError, StoreResult};

use crate::config::{StorageBackend, StorageConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// A store shared between concurrently running jobs
pub type SharedStore = Arc<Mutex<dyn RecordStore + Send>>;

/// The persisted output of one successful job
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Page title, never empty
    pub title: String,

    /// Page summary, may be empty
    pub summary: String,

    /// Canonical URL from the lookup API, if one was found
    pub url: Option<String>,

    /// The query term that produced this record
    pub query: String,
}

/// Opens the backend named in the storage configuration
///
/// # Arguments
///
/// * `config` - The storage section of the configuration
///
/// # Returns
///
/// * `Ok(SharedStore)` - The opened store, ready to share between jobs
/// * `Err(StoreError)` - The backend could not be opened
pub fn open_store(config: &StorageConfig) -> StoreResult<SharedStore> {
    let store: SharedStore = match config.backend {
        StorageBackend::Sqlite => Arc::new(Mutex::new(SqliteStore::new(Path::new(&config.path))?)),
        StorageBackend::Json => Arc::new(Mutex::new(JsonFileStore::new(Path::new(&config.path))?)),
        StorageBackend::Memory => Arc::new(Mutex::new(MemoryStore::new())),
    };

    tracing::debug!("Opened {:?} store at '{}'", config.backend, config.path);
    Ok(store)
}
