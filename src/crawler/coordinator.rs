//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that drives one job:
//! - Popping URLs from the job's FIFO frontier
//! - Delegating each URL to the page processor
//! - Enqueuing discovered links and persisting page records
//! - Enforcing the page budget
//! - Pacing between pages and honoring cancellation
//! - Reporting lifecycle changes to the status tracker

use crate::crawler::job::CrawlJob;
use crate::crawler::processor::{PageOutcome, PageProcessor};
use crate::state::{JobStatus, StatusTracker};
use crate::storage::PageStore;
use crate::TrawlerError;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Summary of a finished job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub job_id: String,
    /// Terminal status written to the tracker
    pub status: JobStatus,
    /// URLs popped from the frontier
    pub processed: u32,
    /// Page records persisted
    pub saved: u32,
    /// URLs still in the frontier when the loop ended
    pub pending: usize,
}

/// Runs crawl jobs against a shared processor, store and tracker
pub struct Coordinator {
    processor: PageProcessor,
    store: Arc<dyn PageStore>,
    tracker: StatusTracker,
    pause: Duration,
}

impl Coordinator {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `processor` - Fetch/parse/dedupe pipeline
    /// * `store` - Destination for page records
    /// * `tracker` - Registry that receives status updates
    /// * `pause` - Wait after each successfully processed page
    pub fn new(
        processor: PageProcessor,
        store: Arc<dyn PageStore>,
        tracker: StatusTracker,
        pause: Duration,
    ) -> Self {
        Self {
            processor,
            store,
            tracker,
            pause,
        }
    }

    /// Runs `job` to its end and records the terminal status
    ///
    /// Never fails: loop errors end the job as `Failed`, a cancelled pause
    /// ends it as `Stopped`.
    pub async fn execute(&self, mut job: CrawlJob, cancel: CancellationToken) -> JobOutcome {
        let status = match self.run(&mut job, &cancel).await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!("Crawl job {} failed: {}", job.id(), e);
                JobStatus::Failed
            }
        };

        self.tracker.transition(job.id(), status);

        match status {
            JobStatus::Completed => tracing::info!(
                "Finished crawling sites for {} (job {}): {} processed, {} saved",
                job.seed_url(),
                job.id(),
                job.processed(),
                job.saved()
            ),
            JobStatus::Stopped => tracing::info!(
                "Crawl job {} stopped after {} pages, {} URLs left unvisited",
                job.id(),
                job.processed(),
                job.frontier().len()
            ),
            _ => {}
        }

        JobOutcome {
            job_id: job.id().to_string(),
            status,
            processed: job.processed(),
            saved: job.saved(),
            pending: job.frontier().len(),
        }
    }

    /// Runs the main crawl loop
    ///
    /// Each iteration:
    /// 1. Re-asserts `Processing`
    /// 2. Pops the oldest frontier URL
    /// 3. Processes it; a skipped page only consumes budget
    /// 4. Enqueues the deduplicated links and saves the record
    /// 5. Pauses, returning `Stopped` if cancelled meanwhile
    ///
    /// Returns `Completed` once the budget is spent or the frontier is empty.
    pub async fn run(
        &self,
        job: &mut CrawlJob,
        cancel: &CancellationToken,
    ) -> Result<JobStatus, TrawlerError> {
        tracing::info!(
            "Starting crawl job {} from {} (budget {})",
            job.id(),
            job.seed_url(),
            job.budget()
        );

        while job.has_work() {
            self.tracker.transition(job.id(), JobStatus::Processing);

            let url = match job.next_url() {
                Some(url) => url,
                None => break,
            };

            match self.processor.process(job.id(), &url).await {
                PageOutcome::Skipped(reason) => {
                    job.record_processed();
                    tracing::debug!(
                        "Skipped {} ({:?}), {} of {} for {}",
                        url,
                        reason,
                        job.processed(),
                        job.budget(),
                        job.id()
                    );
                    continue;
                }
                PageOutcome::Fetched { links, record } => {
                    job.enqueue(links);
                    tracing::debug!("Queue size: {}", job.frontier().len());

                    self.store.save(&record).await?;
                    job.record_saved();
                    job.record_processed();

                    tracing::info!(
                        "Saved {} ({:?}), {} of {} for {}",
                        url,
                        record.title,
                        job.processed(),
                        job.budget(),
                        job.id()
                    );
                }
            }

            if !self.pause(cancel).await {
                return Ok(JobStatus::Stopped);
            }
        }

        if job.budget_exhausted() {
            tracing::info!("Budget of {} pages reached for {}", job.budget(), job.id());
        } else {
            tracing::info!("Frontier is empty for {}", job.id());
        }

        Ok(JobStatus::Completed)
    }

    /// Waits out the pause; returns false if the job was cancelled meanwhile
    async fn pause(&self, cancel: &CancellationToken) -> bool {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(self.pause) => true,
        }
    }
}
