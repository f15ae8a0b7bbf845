//! State module for tracking crawl job lifecycles
//!
//! # Components
//!
//! - `JobStatus`: The lifecycle state of one crawl job (processing, completed, stopped, failed)
//! - `StatusTracker`: The concurrent job id → status registry queried by callers

mod job_status;
mod tracker;

// Re-export main types
pub use job_status::JobStatus;
pub use tracker::StatusTracker;
