/// Job status definitions for tracking crawl lifecycle
///
/// This module defines every state a crawl job can report to status callers.
use std::fmt;

/// Represents the lifecycle state of a crawl job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    // ===== Active States =====
    /// The job's crawl loop is running
    Processing,

    // ===== Terminal States =====
    /// The budget was reached or the frontier ran dry
    Completed,

    /// The job was cancelled during a pause; the frontier may still hold URLs
    Stopped,

    /// An unexpected error ended the job early
    Failed,
}

impl JobStatus {
    /// Returns true if no further transitions are allowed from this state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing)
    }

    /// Returns true if the job ran to its natural end
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Upper-case form reported to status callers
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Stopped => "STOPPED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
