//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the PageStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{PageStore, StorageError, StorageResult};
use crate::storage::{PageRecord, StoredPage};
use crate::TrawlerError;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite storage backend
///
/// The connection sits behind a mutex so one store can serve every job
/// running in the process.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path` and ensures the schema exists
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(TrawlerError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, TrawlerError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database whose contents vanish on drop
    pub fn open_in_memory() -> Result<Self, TrawlerError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

#[async_trait]
impl PageStore for SqliteStorage {
    async fn save(&self, record: &PageRecord) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO sites (job_id, url, title, image_count, link_count, saved_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.job_id,
                record.url,
                record.title,
                record.image_count,
                record.link_count,
                now
            ],
        )?;
        Ok(())
    }

    async fn pages_for_job(&self, job_id: &str) -> StorageResult<Vec<StoredPage>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, job_id, url, title, image_count, link_count, saved_at
             FROM sites WHERE job_id = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![job_id], |row| {
            Ok(StoredPage {
                id: row.get(0)?,
                record: PageRecord {
                    job_id: row.get(1)?,
                    url: row.get(2)?,
                    title: row.get(3)?,
                    image_count: row.get(4)?,
                    link_count: row.get(5)?,
                },
                saved_at: row.get(6)?,
            })
        })?;

        let mut pages = Vec::new();
        for row in rows {
            pages.push(row?);
        }

        Ok(pages)
    }

    async fn count_pages(&self, job_id: &str) -> StorageResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sites WHERE job_id = ?1",
            params![job_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
