//! Single page processing
//!
//! Runs one fetch → parse → dedupe cycle for a URL and builds the page
//! record. Storage and frontier updates are left to the coordinator.

use crate::crawler::dedup::{compact, Deduplicator};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::Parser;
use crate::storage::{PageRecord, MAX_TITLE_CHARS};
use std::sync::Arc;

/// Why a page produced neither links nor a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The fetcher returned no content
    EmptyResponse,
    /// The content could not be parsed
    ParseFailed(String),
}

/// Result of processing one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Page fetched and parsed
    Fetched {
        /// Deduplicated links in first-occurrence order
        links: Vec<String>,
        record: PageRecord,
    },
    /// Nothing to enqueue or persist; the URL still counts against the budget
    Skipped(SkipReason),
}

/// Fetch, parse and dedupe pipeline shared by every job
#[derive(Clone)]
pub struct PageProcessor {
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<dyn Parser>,
    deduplicator: Arc<dyn Deduplicator>,
}

impl PageProcessor {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        parser: Arc<dyn Parser>,
        deduplicator: Arc<dyn Deduplicator>,
    ) -> Self {
        Self {
            fetcher,
            parser,
            deduplicator,
        }
    }

    /// Processes `url` on behalf of `job_id`
    pub async fn process(&self, job_id: &str, url: &str) -> PageOutcome {
        tracing::debug!("Making request: {}", url);
        let content = self.fetcher.fetch(url).await;

        if content.is_empty() {
            tracing::debug!("Empty response from {}", url);
            return PageOutcome::Skipped(SkipReason::EmptyResponse);
        }

        let parsed = match self.parser.parse(&content, url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", url, e);
                return PageOutcome::Skipped(SkipReason::ParseFailed(e.to_string()));
            }
        };

        let links = self.dedupe_links(parsed.links);

        let record = PageRecord {
            job_id: job_id.to_string(),
            url: url.to_string(),
            title: sanitize_title(parsed.title.as_deref()),
            image_count: parsed.image_count,
            link_count: parsed.link_count,
        };

        PageOutcome::Fetched { links, record }
    }

    /// Deduplicates a link batch, passing it through untouched on failure
    fn dedupe_links(&self, links: Vec<String>) -> Vec<String> {
        match self.deduplicator.dedupe(links.clone()) {
            Ok(marked) => compact(marked),
            Err(e) => {
                tracing::warn!(
                    "Deduplication failed, keeping all {} links: {}",
                    links.len(),
                    e
                );
                links
            }
        }
    }
}

/// Normalizes a page title for storage
///
/// Absent titles become empty; present ones are trimmed and cut to the first
/// [`MAX_TITLE_CHARS`] characters.
pub fn sanitize_title(title: Option<&str>) -> String {
    title
        .map(|t| t.trim().chars().take(MAX_TITLE_CHARS).collect())
        .unwrap_or_default()
}
