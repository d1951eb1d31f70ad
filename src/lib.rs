//! Fanqie - Chinese web novel scraper and translator.
//!
//! This library provides functionality for:
//! - Scraping novel metadata and chapters from fanqienovel.com
//! - Decoding chapter text rendered through the site's obfuscating font
//! - Parsing chapter word-count / update-date footers
//! - Translating scraped chapters using OpenAI-compatible APIs

pub mod config;
pub mod console;
pub mod decoder;
pub mod error;
pub mod footer;
pub mod novel;
pub mod output;
pub mod pipeline;
pub mod remap;
pub mod scrapers;
pub mod translator;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use console::Console;
pub use decoder::{decode, decode_paragraph};
pub use error::{ConfigError, MappingError, OutputError, ScraperError, TranslationError};
pub use footer::parse_chapter_footer;
pub use novel::{BookSummary, ChapterFooterInfo, ChapterRecord, NovelDocument, NovelInfo};
pub use pipeline::Pipeline;
pub use remap::{RemapEntry, RemapTable};
pub use scrapers::{FanqieScraper, RawChapter, Scraper};
pub use translator::Translator;
