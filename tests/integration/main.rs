//! Integration tests for the crawl engine
//!
//! `crawl_tests` drives the production stack against wiremock servers;
//! `scenario_tests` uses scripted collaborators to pin down loop behavior.

mod crawl_tests;
mod scenario_tests;
