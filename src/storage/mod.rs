//! Storage module for persisting page records
//!
//! This module handles durable storage of the per-page metadata produced by
//! crawl jobs:
//! - SQLite database initialization and schema management
//! - Saving page records tagged with their job id
//! - Reading back a job's pages for reporting
//!
//! Crawl jobs themselves are never persisted, only the records they derive.

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStorage;
pub use traits::{PageStore, StorageError, StorageResult};

/// Longest title kept on a page record, in characters
pub const MAX_TITLE_CHARS: usize = 100;

/// Metadata for one successfully fetched page, handed to a [`PageStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub job_id: String,
    pub url: String,
    /// Trimmed title, at most [`MAX_TITLE_CHARS`] characters, empty if absent
    pub title: String,
    pub image_count: u32,
    pub link_count: u32,
}

/// A page record as read back from storage
#[derive(Debug, Clone)]
pub struct StoredPage {
    pub id: i64,
    pub record: PageRecord,
    /// RFC 3339 timestamp of the save
    pub saved_at: String,
}
