//! Scraper trait and common types for the novel site.
//!
//! A scraper only fetches pages and pulls raw strings out of the DOM.
//! Decoding the obfuscated text and parsing the footer happen in the
//! pipeline, so the same scraper output can be checked against any table.

mod fanqie;

pub use fanqie::FanqieScraper;

use crate::error::ScraperError;
use crate::novel::NovelInfo;
use async_trait::async_trait;
use std::time::Duration;

/// Raw strings extracted from a chapter page, before decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawChapter {
    /// Chapter heading as shown on the reader page.
    pub title: String,

    /// Word-count / update line, if the page has one.
    pub footer: Option<String>,

    /// Trimmed paragraph texts, still obfuscated.
    pub paragraphs: Vec<String>,
}

/// Trait for novel site scrapers.
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Returns the human-readable name of this scraper.
    fn name(&self) -> &'static str;

    /// Checks if this scraper can handle the given URL.
    fn can_handle(&self, url: &str) -> bool;

    /// Fetches novel metadata and its table of contents.
    async fn get_novel_info(&self, url: &str) -> Result<NovelInfo, ScraperError>;

    /// Fetches the raw content of a single chapter.
    async fn get_chapter(&self, chapter_url: &str) -> Result<RawChapter, ScraperError>;

    /// Collects the novel page URLs linked from a listing page.
    async fn list_novel_urls(&self, listing_url: &str) -> Result<Vec<String>, ScraperError>;
}

/// Common HTTP client configuration for scrapers.
pub fn create_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36")
        .cookie_store(true)
        .timeout(Duration::from_secs(30))
        .build()
}

/// Applies rate limiting delay.
///
/// Values that cannot be a `Duration` (NaN, infinite, negative) mean no delay.
pub async fn rate_limit(delay_sec: f64) {
    if let Ok(delay) = Duration::try_from_secs_f64(delay_sec)
        && !delay.is_zero()
    {
        tokio::time::sleep(delay).await;
    }
}

/// Resolves a possibly relative link against a base URL.
pub fn resolve_url(base: &str, relative: &str) -> String {
    if relative.starts_with("http://") || relative.starts_with("https://") {
        return relative.to_string();
    }

    if let Ok(base_url) = url::Url::parse(base)
        && let Ok(resolved) = base_url.join(relative)
    {
        return resolved.to_string();
    }

    let base = base.trim_end_matches('/');
    format!("{}/{}", base, relative.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url("https://fanqienovel.com", "/page/7143038691944959011"),
            "https://fanqienovel.com/page/7143038691944959011"
        );
        assert_eq!(
            resolve_url("https://fanqienovel.com/page/1", "/reader/2"),
            "https://fanqienovel.com/reader/2"
        );
        assert_eq!(
            resolve_url("https://fanqienovel.com", "https://other.com/page"),
            "https://other.com/page"
        );
    }

    #[test]
    fn test_resolve_url_unparseable_base() {
        assert_eq!(resolve_url("not-a-url/", "/reader/2"), "not-a-url/reader/2");
    }

    #[tokio::test]
    async fn test_rate_limit_zero_returns_immediately() {
        let start = std::time::Instant::now();
        rate_limit(0.0).await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_rate_limit_non_finite_does_not_panic() {
        let start = std::time::Instant::now();
        rate_limit(f64::INFINITY).await;
        rate_limit(f64::NAN).await;
        rate_limit(-3.0).await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
