//! In-process page store
//!
//! Keeps records in a vector. Handy for embedding the engine where nothing
//! has to outlive the process, and for tests.

use crate::storage::traits::{PageStore, StorageError, StorageResult};
use crate::storage::{PageRecord, StoredPage};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: Mutex<Vec<StoredPage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record saved so far, across all jobs, oldest first
    pub fn records(&self) -> StorageResult<Vec<PageRecord>> {
        let pages = self.pages.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(pages.iter().map(|page| page.record.clone()).collect())
    }
}

#[async_trait]
impl PageStore for MemoryStore {
    async fn save(&self, record: &PageRecord) -> StorageResult<()> {
        let mut pages = self.pages.lock().map_err(|_| StorageError::LockPoisoned)?;
        let id = pages.len() as i64 + 1;
        pages.push(StoredPage {
            id,
            record: record.clone(),
            saved_at: Utc::now().to_rfc3339(),
        });
        Ok(())
    }

    async fn pages_for_job(&self, job_id: &str) -> StorageResult<Vec<StoredPage>> {
        let pages = self.pages.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(pages
            .iter()
            .filter(|page| page.record.job_id == job_id)
            .cloned()
            .collect())
    }

    async fn count_pages(&self, job_id: &str) -> StorageResult<u64> {
        let pages = self.pages.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(pages
            .iter()
            .filter(|page| page.record.job_id == job_id)
            .count() as u64)
    }
}
