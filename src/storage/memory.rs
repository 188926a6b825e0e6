//! In-memory storage implementation

use crate::storage::traits::{check_batch, PartitionSummary, RecordStore, StoreResult};
use crate::storage::Record;
use std::collections::HashMap;

/// Process-local record store; contents are lost when dropped
#[derive(Debug, Default)]
pub struct MemoryStore {
    partitions: HashMap<String, Vec<Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn append(&mut self, query: &str, records: &[Record]) -> StoreResult<()> {
        check_batch(query, records)?;
        self.partitions
            .entry(query.to_string())
            .or_default()
            .extend_from_slice(records);
        Ok(())
    }

    fn query(&self, query: &str) -> StoreResult<Vec<Record>> {
        Ok(self.partitions.get(query).cloned().unwrap_or_default())
    }

    fn queries(&self) -> StoreResult<Vec<PartitionSummary>> {
        let mut partitions: Vec<PartitionSummary> = self
            .partitions
            .iter()
            .map(|(query, records)| PartitionSummary {
                query: query.clone(),
                records: records.len() as u64,
            })
            .collect();
        partitions.sort_by(|a, b| a.query.cmp(&b.query));
        Ok(partitions)
    }
}
