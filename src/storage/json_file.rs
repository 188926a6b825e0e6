//! JSON file storage implementation
//!
//! Each query term gets its own file holding a JSON array of records.
//! File names are the form-urlencoded query term plus `.json`, so any term
//! maps to a single file inside the store directory. Terms whose encoding
//! would not fit in a file name are stored under `~<sha256>.json` instead;
//! `~` never appears in an encoded term, so the two schemes cannot collide.

use crate::storage::traits::{
    check_batch, PartitionSummary, RecordStore, StoreError, StoreResult,
};
use crate::storage::Record;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// Longest encoded term used verbatim as a file stem
const MAX_ENCODED_LEN: usize = 200;

const HASHED_PREFIX: char = '~';

/// Directory of per-query JSON files
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Opens a store directory, creating it if needed
    pub fn new(dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Path of the file holding the partition for `query`
    pub fn partition_path(&self, query: &str) -> PathBuf {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        let stem = if encoded.len() > MAX_ENCODED_LEN {
            format!("{}{}", HASHED_PREFIX, hex::encode(Sha256::digest(query.as_bytes())))
        } else {
            encoded
        };
        self.dir.join(format!("{}.{}", stem, EXTENSION))
    }

    fn read_partition(&self, path: &Path) -> StoreResult<Vec<Record>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl RecordStore for JsonFileStore {
    fn append(&mut self, query: &str, records: &[Record]) -> StoreResult<()> {
        check_batch(query, records)?;

        let path = self.partition_path(query);
        let mut stored = self.read_partition(&path)?;
        stored.extend_from_slice(records);

        let json = serde_json::to_string_pretty(&stored)?;

        // Write beside the target then rename so readers never see a torn file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        Ok(())
    }

    fn query(&self, query: &str) -> StoreResult<Vec<Record>> {
        self.read_partition(&self.partition_path(query))
    }

    fn queries(&self) -> StoreResult<Vec<PartitionSummary>> {
        let mut partitions = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let stored = self.read_partition(&path)?;

            // Hashed names cannot be decoded; the records carry their term
            let query = if stem.starts_with(HASHED_PREFIX) {
                match stored.first() {
                    Some(record) => record.query.clone(),
                    None => continue,
                }
            } else {
                url::form_urlencoded::parse(format!("q={}", stem).as_bytes())
                    .map(|(_, value)| value.into_owned())
                    .next()
                    .unwrap_or_default()
            };

            partitions.push(PartitionSummary {
                query,
                records: stored.len() as u64,
            });
        }

        partitions.sort_by(|a, b| a.query.cmp(&b.query));
        Ok(partitions)
    }
}
