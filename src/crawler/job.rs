//! Per-invocation crawl state
//!
//! A `CrawlJob` owns its frontier and budget counter outright. It is built
//! when a crawl starts, mutated only by the coordinator running it, and
//! dropped when the loop ends.

use std::collections::VecDeque;

/// One crawl invocation
///
/// `budget` caps the number of URLs popped from the frontier, failed
/// fetches included. It is a total page budget, not a link-distance limit.
#[derive(Debug, Clone)]
pub struct CrawlJob {
    id: String,
    seed_url: String,
    budget: u32,
    frontier: VecDeque<String>,
    processed: u32,
    saved: u32,
}

impl CrawlJob {
    /// Creates a job whose frontier holds only the seed
    pub fn new(id: impl Into<String>, seed_url: impl Into<String>, budget: u32) -> Self {
        let seed_url = seed_url.into();
        let mut frontier = VecDeque::new();
        frontier.push_back(seed_url.clone());

        Self {
            id: id.into(),
            seed_url,
            budget,
            frontier,
            processed: 0,
            saved: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn seed_url(&self) -> &str {
        &self.seed_url
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// URLs popped so far, failed fetches included
    pub fn processed(&self) -> u32 {
        self.processed
    }

    /// Page records handed to storage so far
    pub fn saved(&self) -> u32 {
        self.saved
    }

    /// Pending URLs, oldest first
    pub fn frontier(&self) -> &VecDeque<String> {
        &self.frontier
    }

    /// True once the processed counter has reached the budget
    pub fn budget_exhausted(&self) -> bool {
        self.processed >= self.budget
    }

    /// True while there is budget left and something to visit
    pub fn has_work(&self) -> bool {
        !self.frontier.is_empty() && !self.budget_exhausted()
    }

    /// Pops the oldest pending URL
    pub(crate) fn next_url(&mut self) -> Option<String> {
        self.frontier.pop_front()
    }

    /// Appends discovered links at the back of the frontier
    pub(crate) fn enqueue<I>(&mut self, links: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.frontier.extend(links);
    }

    pub(crate) fn record_processed(&mut self) {
        self.processed += 1;
    }

    pub(crate) fn record_saved(&mut self) {
        self.saved += 1;
    }
}
