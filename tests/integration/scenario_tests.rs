//! Crawl loop behavior with scripted collaborators
//!
//! The fetcher serves canned bodies from a map and the parser reads each
//! body as a small script, so every test controls exactly which links a
//! page yields.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use trawler::crawler::{
    Coordinator, CrawlEngine, CrawlJob, CrawlSettings, Fetcher, HashDeduplicator, PageProcessor,
    ParseError, ParsedPage, Parser,
};
use trawler::storage::{MemoryStore, PageRecord};
use trawler::{JobStatus, StatusTracker};

/// Serves canned bodies; unknown URLs come back empty
#[derive(Default)]
struct ScriptedFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> String {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().unwrap_or_default()
    }
}

/// Body format: `title|images|links|url url url...`
struct ScriptParser;

impl Parser for ScriptParser {
    fn parse(&self, content: &str, _url: &str) -> Result<ParsedPage, ParseError> {
        let mut parts = content.splitn(4, '|');
        let title = parts.next().filter(|t| !t.is_empty()).map(str::to_string);
        let image_count = parts.next().and_then(|n| n.parse().ok()).unwrap_or(0);
        let link_count = parts.next().and_then(|n| n.parse().ok()).unwrap_or(0);
        let links = parts
            .next()
            .map(|l| l.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        Ok(ParsedPage {
            title,
            links,
            image_count,
            link_count,
        })
    }
}

fn processor(fetcher: Arc<ScriptedFetcher>) -> PageProcessor {
    PageProcessor::new(fetcher, Arc::new(ScriptParser), Arc::new(HashDeduplicator))
}

fn home_site() -> ScriptedFetcher {
    ScriptedFetcher::default().page("A", "Home|3|2|B C B")
}

#[tokio::test]
async fn test_first_iteration_enqueues_deduplicated_links() {
    let fetcher = Arc::new(home_site());
    let store = Arc::new(MemoryStore::new());
    let tracker = StatusTracker::new();
    let coordinator = Coordinator::new(
        processor(fetcher.clone()),
        store.clone(),
        tracker.clone(),
        Duration::ZERO,
    );

    let mut job = CrawlJob::new("job", "A", 1);
    let status = coordinator
        .run(&mut job, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(status, JobStatus::Completed);
    assert_eq!(job.frontier().iter().collect::<Vec<_>>(), vec!["B", "C"]);
    assert_eq!(
        store.records().unwrap(),
        vec![PageRecord {
            job_id: "job".to_string(),
            url: "A".to_string(),
            title: "Home".to_string(),
            image_count: 3,
            link_count: 2,
        }]
    );
}

#[tokio::test]
async fn test_budget_two_leaves_unvisited_link_pending() {
    let fetcher = Arc::new(home_site());
    let store = Arc::new(MemoryStore::new());
    let tracker = StatusTracker::new();
    let coordinator = Coordinator::new(
        processor(fetcher.clone()),
        store.clone(),
        tracker.clone(),
        Duration::ZERO,
    );

    let mut job = CrawlJob::new("job", "A", 2);
    let status = coordinator
        .run(&mut job, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(status, JobStatus::Completed);
    assert_eq!(fetcher.requests(), vec!["A", "B"]);
    assert_eq!(job.processed(), 2);
    assert_eq!(job.frontier().iter().collect::<Vec<_>>(), vec!["C"]);
    assert_eq!(store.records().unwrap().len(), 1);
}

#[tokio::test]
async fn test_scenario_through_engine() {
    let fetcher = Arc::new(home_site());
    let store = Arc::new(MemoryStore::new());
    let engine = CrawlEngine::new(
        processor(fetcher.clone()),
        store.clone(),
        StatusTracker::new(),
        CrawlSettings {
            pause: Duration::from_millis(1),
        },
    );

    let handle = engine
        .start_crawl("A", 2, "job-scenario")
        .expect("Failed to start crawl");
    assert_eq!(engine.status("job-scenario"), Some(JobStatus::Processing));

    assert_eq!(handle.wait().await, "job-scenario");
    assert_eq!(engine.status("job-scenario"), Some(JobStatus::Completed));

    let records = store.records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Home");
    assert_eq!(fetcher.requests(), vec!["A", "B"]);
}

#[tokio::test]
async fn test_dead_links_stop_at_exactly_the_budget() {
    let fetcher = Arc::new(
        ScriptedFetcher::default().page("seed", "|0|10|d0 d1 d2 d3 d4 d5 d6 d7 d8 d9"),
    );
    let store = Arc::new(MemoryStore::new());
    let coordinator = Coordinator::new(
        processor(fetcher.clone()),
        store.clone(),
        StatusTracker::new(),
        Duration::ZERO,
    );

    let outcome = coordinator
        .execute(CrawlJob::new("job", "seed", 6), CancellationToken::new())
        .await;

    assert_eq!(outcome.status, JobStatus::Completed);
    assert_eq!(outcome.processed, 6);
    assert_eq!(outcome.saved, 1);
    assert_eq!(outcome.pending, 5);
    assert_eq!(fetcher.requests().len(), 6);
}

#[tokio::test]
async fn test_always_empty_fetcher_completes_without_records() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let store = Arc::new(MemoryStore::new());
    let tracker = StatusTracker::new();
    let coordinator = Coordinator::new(
        processor(fetcher.clone()),
        store.clone(),
        tracker.clone(),
        Duration::ZERO,
    );

    let outcome = coordinator
        .execute(CrawlJob::new("job", "seed", 5), CancellationToken::new())
        .await;

    assert_eq!(outcome.status, JobStatus::Completed);
    assert!(outcome.processed <= 5);
    assert!(store.records().unwrap().is_empty());
    assert_eq!(tracker.get("job"), Some(JobStatus::Completed));
}

#[tokio::test]
async fn test_concurrent_jobs_are_isolated() {
    // Both sites link into each other's URLs and to a shared page
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .page("a0", "A0|0|3|a1 shared b1")
            .page("a1", "A1|0|1|a2")
            .page("a2", "A2|0|0|")
            .page("b0", "B0|0|3|b1 shared a1")
            .page("b1", "B1|0|1|b2")
            .page("b2", "B2|0|0|")
            .page("shared", "Shared|0|2|a0 b0"),
    );
    let store = Arc::new(MemoryStore::new());
    let engine = CrawlEngine::new(
        processor(fetcher.clone()),
        store.clone(),
        StatusTracker::new(),
        CrawlSettings {
            pause: Duration::from_millis(2),
        },
    );

    let job_a = engine
        .start_crawl("a0", 4, "job-a")
        .expect("Failed to start crawl");
    let job_b = engine
        .start_crawl("b0", 6, "job-b")
        .expect("Failed to start crawl");

    let (id_a, id_b) = tokio::join!(job_a.wait(), job_b.wait());
    assert_eq!((id_a.as_str(), id_b.as_str()), ("job-a", "job-b"));
    assert_eq!(engine.status("job-a"), Some(JobStatus::Completed));
    assert_eq!(engine.status("job-b"), Some(JobStatus::Completed));

    let urls_for = |job_id: &str| -> Vec<String> {
        store
            .records()
            .unwrap()
            .into_iter()
            .filter(|r| r.job_id == job_id)
            .map(|r| r.url)
            .collect()
    };

    // Each job follows its own frontier in discovery order, unaffected by the other
    assert_eq!(urls_for("job-a"), vec!["a0", "a1", "shared", "b1"]);
    assert_eq!(
        urls_for("job-b"),
        vec!["b0", "b1", "shared", "a1", "b2", "a0"]
    );
    assert_eq!(store.records().unwrap().len(), 10);
}

#[tokio::test]
async fn test_status_never_regresses_after_completion() {
    let fetcher = Arc::new(home_site());
    let tracker = StatusTracker::new();
    let engine = CrawlEngine::new(
        processor(fetcher),
        Arc::new(MemoryStore::new()),
        tracker.clone(),
        CrawlSettings {
            pause: Duration::ZERO,
        },
    );

    engine
        .start_crawl("A", 3, "job")
        .expect("Failed to start crawl")
        .wait()
        .await;
    assert_eq!(tracker.get("job"), Some(JobStatus::Completed));

    assert!(!tracker.transition("job", JobStatus::Processing));
    assert_eq!(engine.status("job"), Some(JobStatus::Completed));

    // Starting the same id again is refused rather than reopening the job
    assert!(engine.start_crawl("A", 3, "job").is_err());
    assert_eq!(engine.status("job"), Some(JobStatus::Completed));
}
