//! End-to-end crawls over HTTP
//!
//! These tests use wiremock to create mock HTTP servers and run the real
//! fetcher, parser and SQLite store through full jobs.

use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};
use trawler::config::load_config;
use trawler::storage::{PageStore, SqliteStorage};
use trawler::{CrawlEngine, JobStatus, StatusTracker};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Writes a config pointing at `db_path` with a very short pause
fn write_config(db_path: &Path) -> NamedTempFile {
    let content = format!(
        r#"
[crawler]
default-budget = 10
pause-ms = 5
request-timeout = 5
connect-timeout = 2

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[output]
database-path = "{}"
"#,
        db_path.display()
    );

    let mut file = NamedTempFile::new().expect("Failed to create config file");
    file.write_all(content.as_bytes())
        .expect("Failed to write config file");
    file.flush().expect("Failed to flush config file");
    file
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

fn engine_for(dir: &TempDir) -> (CrawlEngine, std::path::PathBuf) {
    let db_path = dir.path().join("pages.db");
    let config_file = write_config(&db_path);
    let config = load_config(config_file.path()).expect("Failed to load config");
    let engine =
        CrawlEngine::from_config(&config, StatusTracker::new()).expect("Failed to build engine");
    (engine, db_path)
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        format!(
            r#"<html><head><title>Home</title></head><body>
            <img src="/logo.png"><img src="/banner.png">
            <a href="{0}/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            <a href="{0}/page1">Page 1 again</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;
    mount_html(
        &mock_server,
        "/page1",
        r#"<html><head><title>Page 1</title></head><body>Content 1</body></html>"#.to_string(),
    )
    .await;
    mount_html(
        &mock_server,
        "/page2",
        r#"<html><head><title>Page 2</title></head><body><img src="x.png"></body></html>"#
            .to_string(),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let (engine, db_path) = engine_for(&dir);

    let handle = engine
        .start_crawl(format!("{}/", base_url), 10, "job-http")
        .expect("Failed to start crawl");
    assert_eq!(engine.status("job-http"), Some(JobStatus::Processing));

    let job_id = handle.wait().await;
    assert_eq!(job_id, "job-http");
    assert_eq!(engine.status("job-http"), Some(JobStatus::Completed));

    // Reopen the database to check the records were durably written
    let storage = SqliteStorage::new(&db_path).expect("Failed to open DB");
    let pages = storage.pages_for_job("job-http").await.unwrap();

    let urls: Vec<&str> = pages.iter().map(|p| p.record.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/", base_url),
            format!("{}/page1", base_url),
            format!("{}/page2", base_url),
        ]
    );

    let home = &pages[0].record;
    assert_eq!(home.title, "Home");
    assert_eq!(home.image_count, 2);
    assert_eq!(home.link_count, 3);

    assert_eq!(pages[1].record.title, "Page 1");
    assert_eq!(pages[2].record.image_count, 1);
}

#[tokio::test]
async fn test_budget_limits_http_requests() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Every page links to two deeper pages, so only the budget ends the job
    for i in 0..8 {
        mount_html(
            &mock_server,
            &format!("/p{}", i),
            format!(
                r#"<html><body><a href="/p{}">a</a><a href="/p{}">b</a></body></html>"#,
                2 * i + 1,
                2 * i + 2
            ),
        )
        .await;
    }

    let dir = TempDir::new().unwrap();
    let (engine, _db_path) = engine_for(&dir);

    let job_id = engine
        .start_crawl(format!("{}/p0", base_url), 4, "job-budget")
        .expect("Failed to start crawl")
        .wait()
        .await;

    assert_eq!(engine.status(&job_id), Some(JobStatus::Completed));
    assert_eq!(engine.store().count_pages(&job_id).await.unwrap(), 4);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);
}

#[tokio::test]
async fn test_failed_fetches_consume_budget_without_records() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<html><body>
            <a href="/missing">404</a>
            <a href="/broken">500</a>
            <a href="/image">PNG</a>
            <a href="/ok">OK</a>
        </body></html>"#
            .to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/image"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("not really a png")
                .insert_header("content-type", "image/png"),
        )
        .mount(&mock_server)
        .await;
    mount_html(
        &mock_server,
        "/ok",
        "<html><head><title>OK</title></head></html>".to_string(),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let (engine, _db_path) = engine_for(&dir);

    let job_id = engine
        .start_crawl(format!("{}/", base_url), 10, "job-errors")
        .expect("Failed to start crawl")
        .wait()
        .await;

    assert_eq!(engine.status(&job_id), Some(JobStatus::Completed));

    let titles: Vec<String> = engine
        .store()
        .pages_for_job(&job_id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.record.title)
        .collect();
    assert_eq!(titles, vec!["", "OK"]);

    // Seed plus all four links were requested exactly once
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 5);
}

#[tokio::test]
async fn test_long_titles_are_truncated_in_storage() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        format!(
            "<html><head><title>  {}  </title></head></html>",
            "a".repeat(150)
        ),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let (engine, _db_path) = engine_for(&dir);

    let job_id = engine
        .start_crawl(format!("{}/", base_url), 1, "job-title")
        .expect("Failed to start crawl")
        .wait()
        .await;

    let pages = engine.store().pages_for_job(&job_id).await.unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].record.title, "a".repeat(100));
}

#[tokio::test]
async fn test_unreachable_seed_completes_with_no_records() {
    let dir = TempDir::new().unwrap();
    let (engine, _db_path) = engine_for(&dir);

    let job_id = engine
        .start_crawl("http://127.0.0.1:9/", 5, "job-offline")
        .expect("Failed to start crawl")
        .wait()
        .await;

    assert_eq!(engine.status(&job_id), Some(JobStatus::Completed));
    assert_eq!(engine.store().count_pages(&job_id).await.unwrap(), 0);
}
