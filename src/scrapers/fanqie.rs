//! Fanqie (fanqienovel.com) scraper implementation.
//!
//! The site serves chapter text through an obfuscating web font; this
//! scraper returns the text as-is and leaves decoding to the caller.

use super::{RawChapter, Scraper, create_http_client, rate_limit, resolve_url};
use crate::config::ScrapingConfig;
use crate::console::Console;
use crate::error::ScraperError;
use crate::novel::{ChapterRecord, NovelInfo};
use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Compiled regex for URLs on the site.
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://(?:www\.)?fanqienovel\.com(?:/|$)").unwrap());

/// Relative links to novel pages on listing pages.
static NOVEL_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/page/\d+$").unwrap());

/// Title used when the info page has no name heading.
const UNKNOWN_TITLE: &str = "Unknown title";

/// CSS selectors used for parsing.
struct Selectors {
    /// Novel name heading.
    name: Selector,
    /// Synopsis paragraph.
    abstract_content: Selector,
    /// Table of contents container.
    chapter_list: Selector,
    /// One table of contents row.
    chapter_item: Selector,
    /// Chapter link inside a row.
    chapter_link: Selector,
    /// Paywall marker inside a row.
    chapter_lock: Selector,
    /// Reader page heading.
    reader_title: Selector,
    /// Word count / update line under the heading.
    reader_subtitle: Selector,
    /// Reader content container.
    reader_content: Selector,
    /// Content paragraphs.
    reader_paragraph: Selector,
    /// Any link.
    link: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            name: Selector::parse(".info-name h1").unwrap(),
            abstract_content: Selector::parse(".page-abstract-content p").unwrap(),
            chapter_list: Selector::parse(".chapter").unwrap(),
            chapter_item: Selector::parse(".chapter-item").unwrap(),
            chapter_link: Selector::parse("a.chapter-item-title").unwrap(),
            chapter_lock: Selector::parse("span.chapter-item-lock").unwrap(),
            reader_title: Selector::parse(".muye-reader-title").unwrap(),
            reader_subtitle: Selector::parse(".muye-reader-subtitle").unwrap(),
            reader_content: Selector::parse(".muye-reader-content").unwrap(),
            reader_paragraph: Selector::parse(".muye-reader-content div p").unwrap(),
            link: Selector::parse("a[href]").unwrap(),
        }
    }
}

/// Scraper for fanqienovel.com.
pub struct FanqieScraper {
    client: reqwest::Client,
    config: ScrapingConfig,
    selectors: Selectors,
    console: Console,
}

impl FanqieScraper {
    /// Creates a new scraper with the given configuration.
    pub fn new(config: ScrapingConfig) -> Result<Self, ScraperError> {
        let client = create_http_client()?;
        let console = Console::new().with_debug(config.debug);

        Ok(Self {
            client,
            config,
            selectors: Selectors::new(),
            console,
        })
    }

    /// Fetches a page and returns the HTML document.
    async fn fetch_page(&self, url: &str) -> Result<Html, ScraperError> {
        rate_limit(self.config.delay_between_requests_sec).await;
        self.console.debug(&format!("GET {}", url));

        let response = self.client.get(url).send().await?.error_for_status()?;

        let text = response.text().await?;
        self.console
            .debug(&format!("Received {} bytes from {}", text.len(), url));
        Ok(Html::parse_document(&text))
    }

    /// Extracts the novel name, synopsis and table of contents.
    fn extract_novel_info(&self, doc: &Html) -> Result<NovelInfo, ScraperError> {
        let name = doc
            .select(&self.selectors.name)
            .next()
            .map(element_text)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        let abstract_content = doc
            .select(&self.selectors.abstract_content)
            .next()
            .map(element_text)
            .unwrap_or_default();

        if doc.select(&self.selectors.chapter_list).next().is_none() {
            return Err(ScraperError::ElementNotFound("chapter list".to_string()));
        }

        let chapters = doc
            .select(&self.selectors.chapter_item)
            .map(|item| self.extract_chapter_record(item))
            .collect();

        Ok(NovelInfo {
            name,
            abstract_content,
            chapters,
        })
    }

    /// Extracts one table of contents row.
    fn extract_chapter_record(&self, item: ElementRef) -> ChapterRecord {
        let link = item.select(&self.selectors.chapter_link).next();

        let title = link.map(element_text).unwrap_or_default();
        let href = link
            .and_then(|a| a.value().attr("href"))
            .map(|href| resolve_url(&self.config.base_url, href))
            .unwrap_or_default();
        let is_locked = item.select(&self.selectors.chapter_lock).next().is_some();

        ChapterRecord::new(title, href, is_locked)
    }

    /// Extracts the heading, footer line and paragraphs of a reader page.
    fn extract_chapter(&self, doc: &Html) -> Result<RawChapter, ScraperError> {
        let title = doc
            .select(&self.selectors.reader_title)
            .next()
            .map(element_text)
            .ok_or_else(|| ScraperError::ElementNotFound("chapter title".to_string()))?;

        let footer = doc
            .select(&self.selectors.reader_subtitle)
            .next()
            .map(element_text);

        if doc.select(&self.selectors.reader_content).next().is_none() {
            return Err(ScraperError::ElementNotFound("chapter content".to_string()));
        }

        let paragraphs = doc
            .select(&self.selectors.reader_paragraph)
            .map(element_text)
            .collect();

        Ok(RawChapter {
            title,
            footer,
            paragraphs,
        })
    }

    /// Collects novel page links from a listing page, in page order.
    fn extract_novel_links(&self, doc: &Html) -> Vec<String> {
        let mut seen = HashSet::new();

        doc.select(&self.selectors.link)
            .filter_map(|a| a.value().attr("href"))
            .filter(|href| NOVEL_LINK_REGEX.is_match(href))
            .filter(|href| seen.insert(href.to_string()))
            .map(|href| resolve_url(&self.config.base_url, href))
            .collect()
    }
}

/// Concatenated, trimmed text content of an element.
fn element_text(elem: ElementRef) -> String {
    elem.text().collect::<String>().trim().to_string()
}

#[async_trait]
impl Scraper for FanqieScraper {
    fn name(&self) -> &'static str {
        "Fanqie"
    }

    fn can_handle(&self, url: &str) -> bool {
        URL_PATTERN.is_match(url)
    }

    async fn get_novel_info(&self, url: &str) -> Result<NovelInfo, ScraperError> {
        if !self.can_handle(url) {
            return Err(ScraperError::UnsupportedUrl(url.to_string()));
        }

        let doc = self.fetch_page(url).await?;
        self.extract_novel_info(&doc)
    }

    async fn get_chapter(&self, chapter_url: &str) -> Result<RawChapter, ScraperError> {
        if chapter_url.is_empty() {
            return Err(ScraperError::InvalidUrl("empty chapter link".to_string()));
        }

        let doc = self.fetch_page(chapter_url).await?;
        self.extract_chapter(&doc)
    }

    async fn list_novel_urls(&self, listing_url: &str) -> Result<Vec<String>, ScraperError> {
        if !self.can_handle(listing_url) {
            return Err(ScraperError::UnsupportedUrl(listing_url.to_string()));
        }

        let doc = self.fetch_page(listing_url).await?;
        Ok(self.extract_novel_links(&doc))
    }
}
