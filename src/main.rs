//! Trawler main entry point
//!
//! Runs a single crawl job from the command line and prints what it stored.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use trawler::config::{load_config_with_hash, Config};
use trawler::{CrawlEngine, StatusTracker};
use tracing_subscriber::EnvFilter;

/// Trawler: a budgeted single-job web crawler
///
/// Starting from a seed URL, Trawler visits pages breadth-first in discovery
/// order until the page budget is spent or no links remain, storing each
/// page's title, image count and link count.
#[derive(Parser, Debug)]
#[command(name = "trawler")]
#[command(version = "1.0.0")]
#[command(about = "A budgeted single-job web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// URL to start crawling from
    #[arg(value_name = "SEED_URL")]
    seed_url: String,

    /// Maximum number of URLs to process (defaults to the config value)
    #[arg(short, long)]
    budget: Option<u32>,

    /// Identifier used to tag stored pages (defaults to a timestamp)
    #[arg(long)]
    job_id: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    url::Url::parse(&cli.seed_url)
        .with_context(|| format!("Invalid seed URL {}", cli.seed_url))?;

    let budget = cli.budget.unwrap_or(config.crawler.default_budget);
    let job_id = cli
        .job_id
        .clone()
        .unwrap_or_else(|| format!("job-{}", chrono::Utc::now().format("%Y%m%d%H%M%S")));

    if cli.dry_run {
        print_dry_run(&config, &cli.seed_url, budget, &job_id);
        return Ok(());
    }

    handle_crawl(&config, &cli.seed_url, budget, &job_id).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("trawler=info,warn"),
            1 => EnvFilter::new("trawler=debug,info"),
            2 => EnvFilter::new("trawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn print_dry_run(config: &Config, seed_url: &str, budget: u32, job_id: &str) {
    println!("=== Trawler Dry Run ===\n");

    println!("Job:");
    println!("  Id: {}", job_id);
    println!("  Seed: {}", seed_url);
    println!("  Budget: {} pages", budget);

    println!("\nCrawler Configuration:");
    println!("  Pause between pages: {}ms", config.crawler.pause_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!("  Connect timeout: {}s", config.crawler.connect_timeout);

    println!("\nUser Agent: {}", config.user_agent.header_value());
    println!("Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");
}

/// Runs one job to completion, cancelling it on Ctrl-C
async fn handle_crawl(
    config: &Config,
    seed_url: &str,
    budget: u32,
    job_id: &str,
) -> anyhow::Result<()> {
    let engine = CrawlEngine::from_config(config, StatusTracker::new())
        .context("Failed to initialize crawl engine")?;

    let handle = engine
        .start_crawl(seed_url, budget, job_id)
        .context("Failed to start crawl job")?;

    let interrupt_engine = engine.clone();
    let interrupt_job = job_id.to_string();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!(
                "Interrupt received, stopping job {} at its next pause",
                interrupt_job
            );
            interrupt_engine.cancel(&interrupt_job);
        }
    });

    let job_id = handle.wait().await;

    let status = engine
        .status(&job_id)
        .with_context(|| format!("No status recorded for job {}", job_id))?;

    let pages = engine
        .store()
        .pages_for_job(&job_id)
        .await
        .context("Failed to read stored pages")?;

    println!("\nJob {} finished with status {}", job_id, status);
    println!("{} pages stored:", pages.len());
    for page in &pages {
        println!(
            "  {} | {} | {} images | {} links",
            page.record.url, page.record.title, page.record.image_count, page.record.link_count
        );
    }

    if !status.is_success() {
        anyhow::bail!("Job {} did not complete (status {})", job_id, status);
    }

    Ok(())
}
