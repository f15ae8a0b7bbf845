//! HTML parser for extracting links and metadata
//!
//! This module handles parsing HTML content to extract:
//! - Links to follow (from <a> tags and canonical links)
//! - Page title
//! - Image and anchor counts

use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

/// Errors raised while turning page content into a [`ParsedPage`]
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid page URL {url}: {source}")]
    InvalidUrl { url: String, source: url::ParseError },

    #[error("Invalid selector {0}")]
    Selector(String),
}

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Links found on the page (absolute URLs, document order, may repeat)
    pub links: Vec<String>,

    /// Number of <img> elements
    pub image_count: u32,

    /// Number of <a href> elements
    pub link_count: u32,
}

/// Extracts links, title and counts from page content
pub trait Parser: Send + Sync {
    /// Parses `content` fetched from `url`
    ///
    /// `url` is the base for resolving relative links.
    fn parse(&self, content: &str, url: &str) -> Result<ParsedPage, ParseError>;
}

/// Production parser backed by `scraper`
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl Parser for HtmlParser {
    fn parse(&self, content: &str, url: &str) -> Result<ParsedPage, ParseError> {
        let base_url = Url::parse(url).map_err(|source| ParseError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        parse_html(content, &base_url)
    }
}

/// Parses HTML content and extracts links and metadata
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only links
///
/// # Example
///
/// ```
/// use trawler::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url).unwrap();
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> Result<ParsedPage, ParseError> {
    let document = Html::parse_document(html);

    let anchors = selector("a[href]")?;
    let canonical = selector("link[rel='canonical'][href]")?;
    let images = selector("img")?;

    let mut links = Vec::new();
    let mut link_count = 0u32;

    for element in document.select(&anchors) {
        link_count += 1;

        if element.value().attr("download").is_some() {
            continue;
        }

        if let Some(absolute_url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        {
            links.push(absolute_url);
        }
    }

    for element in document.select(&canonical) {
        if let Some(absolute_url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        {
            links.push(absolute_url);
        }
    }

    Ok(ParsedPage {
        title: extract_title(&document)?,
        links,
        image_count: document.select(&images).count() as u32,
        link_count,
    })
}

fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css.to_string()))
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Result<Option<String>, ParseError> {
    let title_selector = selector("title")?;

    Ok(document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Resolves a link href to an absolute http(s) URL
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}
