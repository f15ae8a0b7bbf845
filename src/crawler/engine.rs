//! Crawl entry points
//!
//! `CrawlEngine` is what a surrounding service holds on to. Each call to
//! [`CrawlEngine::start_crawl`] spawns one independent job on the tokio
//! runtime and hands back a [`CrawlHandle`]. The number of jobs running at
//! once is not bounded here.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::coordinator::Coordinator;
use crate::crawler::dedup::HashDeduplicator;
use crate::crawler::fetcher::HttpFetcher;
use crate::crawler::job::CrawlJob;
use crate::crawler::parser::HtmlParser;
use crate::crawler::processor::PageProcessor;
use crate::state::{JobStatus, StatusTracker};
use crate::storage::{PageStore, SqliteStorage};
use crate::TrawlerError;
use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Tunables applied to every job an engine starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSettings {
    /// Wait after each successfully processed page
    pub pause: Duration,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            pause: Duration::from_millis(200),
        }
    }
}

impl From<&CrawlerConfig> for CrawlSettings {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            pause: Duration::from_millis(config.pause_ms),
        }
    }
}

/// Starts crawl jobs and answers status queries
#[derive(Clone)]
pub struct CrawlEngine {
    coordinator: Arc<Coordinator>,
    store: Arc<dyn PageStore>,
    tracker: StatusTracker,
    running: Arc<DashMap<String, CancellationToken>>,
}

impl CrawlEngine {
    /// Wires an engine from its collaborators
    pub fn new(
        processor: PageProcessor,
        store: Arc<dyn PageStore>,
        tracker: StatusTracker,
        settings: CrawlSettings,
    ) -> Self {
        let coordinator = Coordinator::new(
            processor,
            Arc::clone(&store),
            tracker.clone(),
            settings.pause,
        );

        Self {
            coordinator: Arc::new(coordinator),
            store,
            tracker,
            running: Arc::new(DashMap::new()),
        }
    }

    /// Builds the production stack: HTTP fetcher, HTML parser, SQLite store
    pub fn from_config(config: &Config, tracker: StatusTracker) -> Result<Self, TrawlerError> {
        let fetcher = HttpFetcher::new(&config.user_agent, &config.crawler)?;
        let store = SqliteStorage::new(Path::new(&config.output.database_path))?;

        let processor = PageProcessor::new(
            Arc::new(fetcher),
            Arc::new(HtmlParser),
            Arc::new(HashDeduplicator),
        );

        Ok(Self::new(
            processor,
            Arc::new(store),
            tracker,
            CrawlSettings::from(&config.crawler),
        ))
    }

    /// Starts a crawl job and returns without waiting for it
    ///
    /// The job's status reads `Processing` as soon as this returns. Job ids
    /// are single-use: an id the tracker already knows, running or finished,
    /// is rejected with [`TrawlerError::DuplicateJob`]. Must be called from
    /// within a tokio runtime.
    pub fn start_crawl(
        &self,
        seed_url: impl Into<String>,
        budget: u32,
        job_id: impl Into<String>,
    ) -> Result<CrawlHandle, TrawlerError> {
        let job_id = job_id.into();

        if !self.tracker.register(&job_id) {
            tracing::warn!("Refusing to start job {}: id already in use", job_id);
            return Err(TrawlerError::DuplicateJob(job_id));
        }

        let cancel = CancellationToken::new();
        self.running.insert(job_id.clone(), cancel.clone());

        let job = CrawlJob::new(job_id.clone(), seed_url, budget);
        let coordinator = Arc::clone(&self.coordinator);
        let guard = RunGuard {
            job_id: job_id.clone(),
            running: Arc::clone(&self.running),
            tracker: self.tracker.clone(),
            finished: false,
        };
        let task_cancel = cancel.clone();

        let join = tokio::spawn(async move {
            // Owned by the task so it drops when the task ends, not here
            let mut guard = guard;
            let outcome = coordinator.execute(job, task_cancel).await;
            guard.finish();
            outcome.job_id
        });

        Ok(CrawlHandle {
            job_id,
            cancel,
            join,
        })
    }

    /// Current status of `job_id`, or `None` for an unknown job
    pub fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.tracker.get(job_id)
    }

    /// Requests that a running job stop at its next pause
    ///
    /// Returns false if no job with this id is running.
    pub fn cancel(&self, job_id: &str) -> bool {
        match self.running.get(job_id) {
            Some(cancel) => {
                cancel.cancel();
                tracing::info!("Cancellation requested for job {}", job_id);
                true
            }
            None => false,
        }
    }

    /// Number of jobs currently running
    pub fn active_jobs(&self) -> usize {
        self.running.len()
    }

    pub fn tracker(&self) -> &StatusTracker {
        &self.tracker
    }

    pub fn store(&self) -> Arc<dyn PageStore> {
        Arc::clone(&self.store)
    }
}

/// Unregisters a run when its task ends, however it ends
///
/// A task that panics or is dropped before the loop returns never writes a
/// terminal status itself; the guard does it instead.
struct RunGuard {
    job_id: String,
    running: Arc<DashMap<String, CancellationToken>>,
    tracker: StatusTracker,
    finished: bool,
}

impl RunGuard {
    /// Marks the loop as having written its own terminal status
    fn finish(&mut self) {
        self.finished = true;
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.running.remove(&self.job_id);

        if !self.finished {
            let status = if std::thread::panicking() {
                JobStatus::Failed
            } else {
                JobStatus::Stopped
            };
            tracing::error!(
                "Crawl job {} ended abnormally, marking it {}",
                self.job_id,
                status
            );
            self.tracker.transition(&self.job_id, status);
        }
    }
}

/// Handle to a spawned crawl job
///
/// Dropping the handle does not stop the job.
#[derive(Debug)]
pub struct CrawlHandle {
    job_id: String,
    cancel: CancellationToken,
    join: JoinHandle<String>,
}

impl CrawlHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Requests that the job stop at its next pause
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the job and returns its id
    ///
    /// Resolves to the job id even if the task panicked; the job's status is
    /// `Failed` in that case.
    pub async fn wait(self) -> String {
        match self.join.await {
            Ok(job_id) => job_id,
            Err(e) => {
                tracing::error!("Crawl job {} task failed: {}", self.job_id, e);
                self.job_id
            }
        }
    }
}
