//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the RecordStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{
    check_batch, PartitionSummary, RecordStore, StoreError, StoreResult,
};
use crate::storage::Record;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates a database file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StoreError::Unavailable)` - Failed to open database
    pub fn new(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl RecordStore for SqliteStore {
    fn append(&mut self, query: &str, records: &[Record]) -> StoreResult<()> {
        check_batch(query, records)?;

        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (query, title, summary, url, stored_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;

            for record in records {
                stmt.execute(params![
                    query,
                    record.title,
                    record.summary,
                    record.url,
                    now
                ])
                .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
            }
        }
        tx.commit()
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        Ok(())
    }

    fn query(&self, query: &str) -> StoreResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, summary, url, query FROM records WHERE query = ?1 ORDER BY id",
        )?;

        let records = stmt
            .query_map(params![query], |row| {
                Ok(Record {
                    title: row.get(0)?,
                    summary: row.get(1)?,
                    url: row.get(2)?,
                    query: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn queries(&self) -> StoreResult<Vec<PartitionSummary>> {
        let mut stmt = self
            .conn
            .prepare("SELECT query, COUNT(*) FROM records GROUP BY query ORDER BY query")?;

        let partitions = stmt
            .query_map([], |row| {
                Ok(PartitionSummary {
                    query: row.get(0)?,
                    records: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(partitions)
    }

    fn count_records(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
