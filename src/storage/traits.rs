//! Storage traits and error types
//!
//! This module defines the trait interface for page record stores and
//! associated error types.

use crate::storage::{PageRecord, StoredPage};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable sink for page records
///
/// `save` is treated as synchronous and durable by the crawl loop: once it
/// returns `Ok`, the record belongs to the store. Implementations must be
/// shareable across concurrently running jobs.
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Stores one page record
    async fn save(&self, record: &PageRecord) -> StorageResult<()>;

    /// Returns every record saved for `job_id`, oldest first
    async fn pages_for_job(&self, job_id: &str) -> StorageResult<Vec<StoredPage>>;

    /// Counts the records saved for `job_id`
    async fn count_pages(&self, job_id: &str) -> StorageResult<u64>;
}
