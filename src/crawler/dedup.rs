//! Link batch deduplication
//!
//! A batch is the set of links discovered on one page. Deduplication is
//! scoped to that batch only; nothing is remembered between pages or jobs,
//! so a URL seen earlier in the crawl can re-enter the frontier.
//!
//! Duplicates are exact string matches: no case folding, no trailing-slash
//! collapsing, no scheme or host canonicalization.

use std::collections::HashSet;
use std::time::Instant;
use thiserror::Error;

/// Errors a deduplicator may report instead of a marked batch
#[derive(Debug, Error)]
pub enum DedupError {
    #[error("Deduplication failed: {0}")]
    Failed(String),
}

/// Counters describing one deduplication pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DedupStats {
    /// Strings looked at
    pub inspected: usize,
    /// Occurrences replaced by a marker
    pub duplicates: usize,
    /// Total byte length of the strings that were kept
    pub retained_bytes: usize,
}

impl DedupStats {
    /// Share of the batch that was duplicate, in percent
    pub fn duplicate_percentage(&self) -> f64 {
        if self.inspected == 0 {
            return 0.0;
        }
        self.duplicates as f64 / self.inspected as f64 * 100.0
    }
}

/// Removes repeated links from a batch
pub trait Deduplicator: Send + Sync {
    /// Returns a sequence of the same length as `batch`
    ///
    /// The first occurrence of every value is kept at its position; later
    /// occurrences are replaced by `None`.
    fn dedupe(&self, batch: Vec<String>) -> Result<Vec<Option<String>>, DedupError>;
}

/// Hash-set deduplicator
#[derive(Debug, Clone, Copy, Default)]
pub struct HashDeduplicator;

impl HashDeduplicator {
    /// Marks duplicates and reports what was removed
    pub fn dedupe_with_stats(&self, batch: Vec<String>) -> (Vec<Option<String>>, DedupStats) {
        let mut seen: HashSet<String> = HashSet::with_capacity(batch.len());
        let mut stats = DedupStats::default();

        let marked = batch
            .into_iter()
            .map(|link| {
                stats.inspected += 1;
                if seen.contains(&link) {
                    stats.duplicates += 1;
                    None
                } else {
                    stats.retained_bytes += link.len();
                    seen.insert(link.clone());
                    Some(link)
                }
            })
            .collect();

        (marked, stats)
    }
}

impl Deduplicator for HashDeduplicator {
    fn dedupe(&self, batch: Vec<String>) -> Result<Vec<Option<String>>, DedupError> {
        let started = Instant::now();
        let (marked, stats) = self.dedupe_with_stats(batch);

        tracing::debug!(
            "Deduplicated {} links: {} duplicates ({:.2}%), {} bytes kept, took {:?}",
            stats.inspected,
            stats.duplicates,
            stats.duplicate_percentage(),
            stats.retained_bytes,
            started.elapsed()
        );

        Ok(marked)
    }
}

/// Drops the markers left by [`Deduplicator::dedupe`]
///
/// The result holds the distinct links in first-occurrence order.
pub fn compact(marked: Vec<Option<String>>) -> Vec<String> {
    marked.into_iter().flatten().collect()
}
