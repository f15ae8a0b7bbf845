//! Concurrent job status registry
//!
//! One `StatusTracker` is constructed by the service that owns the crawl
//! engine and shared by cloning. Every clone points at the same map, so
//! independently running jobs and status readers never need their own
//! locking.

use crate::state::JobStatus;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Shared mapping from job id to lifecycle state
///
/// Entries live for the lifetime of the tracker. There is no expiry, so a
/// long-running service that starts many jobs grows this map without bound.
#[derive(Debug, Clone, Default)]
pub struct StatusTracker {
    statuses: Arc<DashMap<String, JobStatus>>,
}

impl StatusTracker {
    /// Creates an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditionally records `status` for `job_id`
    ///
    /// Overwrites terminal states too; the engine uses
    /// [`StatusTracker::register`] and [`StatusTracker::transition`] instead.
    pub fn set(&self, job_id: &str, status: JobStatus) {
        self.statuses.insert(job_id.to_string(), status);
    }

    /// Records `job_id` as `Processing` if the tracker has never seen it
    ///
    /// Returns false, leaving the entry untouched, for a known id.
    pub fn register(&self, job_id: &str) -> bool {
        match self.statuses.entry(job_id.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(JobStatus::Processing);
                true
            }
        }
    }

    /// Returns the current status of `job_id`, if the job is known
    pub fn get(&self, job_id: &str) -> Option<JobStatus> {
        self.statuses.get(job_id).map(|entry| *entry.value())
    }

    /// Moves `job_id` to `status` unless it already sits in a terminal state
    ///
    /// Returns true if the entry now holds `status`.
    pub fn transition(&self, job_id: &str, status: JobStatus) -> bool {
        let mut entry = self
            .statuses
            .entry(job_id.to_string())
            .or_insert(status);

        if entry.is_terminal() && *entry != status {
            tracing::debug!(
                "Refusing status change {} -> {} for job {}",
                *entry,
                status,
                job_id
            );
            return false;
        }

        *entry = status;
        true
    }

    /// Number of jobs the tracker knows about
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    /// Returns true if no job has been registered yet
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}
