//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching that collapses failures to empty content
//! - HTML parsing and link extraction
//! - Per-page link deduplication
//! - The per-job crawl loop with budget, pacing and cancellation
//! - The engine that spawns jobs and answers status queries

mod coordinator;
mod dedup;
mod engine;
mod fetcher;
mod job;
mod parser;
mod processor;

pub use coordinator::{Coordinator, JobOutcome};
pub use dedup::{compact, DedupError, DedupStats, Deduplicator, HashDeduplicator};
pub use engine::{CrawlEngine, CrawlHandle, CrawlSettings};
pub use fetcher::{build_http_client, fetch_url, FetchResult, Fetcher, HttpFetcher};
pub use job::CrawlJob;
pub use parser::{parse_html, HtmlParser, ParseError, ParsedPage, Parser};
pub use processor::{sanitize_title, PageOutcome, PageProcessor, SkipReason};
