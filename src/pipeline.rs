//! Sequential scrape of a novel: table of contents, then each unlocked
//! chapter in order, decoded and stamped with its footer info.

use crate::console::Console;
use crate::decoder;
use crate::error::ScraperError;
use crate::footer::parse_chapter_footer;
use crate::novel::{BookSummary, ChapterFooterInfo, NovelDocument};
use crate::remap::RemapTable;
use crate::scrapers::Scraper;

/// Drives a scraper and applies the text transforms to what it returns.
pub struct Pipeline<'a> {
    scraper: &'a dyn Scraper,
    table: &'a RemapTable,
    console: &'a Console,
}

impl<'a> Pipeline<'a> {
    pub fn new(scraper: &'a dyn Scraper, table: &'a RemapTable, console: &'a Console) -> Self {
        Self {
            scraper,
            table,
            console,
        }
    }

    /// Scrapes a novel page and every unlocked chapter it lists.
    ///
    /// Locked chapters stay in the table of contents without content.
    pub async fn scrape_novel(&self, url: &str) -> Result<NovelDocument, ScraperError> {
        self.console.step("Fetching novel information...");
        let mut info = self.scraper.get_novel_info(url).await?;

        let total = info.unlocked_chapters().count();
        self.console.success(&format!(
            "Found: {} ({} chapters, {} locked)",
            info.name,
            info.chapters.len(),
            info.locked_count()
        ));

        let mut position = 0;
        for chapter in info.chapters.iter_mut().filter(|ch| !ch.is_locked) {
            position += 1;
            self.console.step(&format!(
                "{} Processing chapter: {}",
                self.console.chapter_position(position, total),
                chapter.title
            ));

            let raw = self.scraper.get_chapter(&chapter.href).await?;
            chapter.update = self.footer_info(raw.footer.as_deref());
            chapter.content = Some(decoder::decode(self.table, &raw.paragraphs));
        }

        Ok(NovelDocument::new(info))
    }

    /// Fetches the info of every novel linked from a listing page.
    pub async fn collect_books(&self, listing_url: &str) -> Result<Vec<BookSummary>, ScraperError> {
        self.console.step("Collecting novel links...");
        let urls = self.scraper.list_novel_urls(listing_url).await?;
        self.console
            .success(&format!("Found {} novels", self.console.count(urls.len())));

        let mut books = Vec::with_capacity(urls.len());
        for url in urls {
            self.console.step(&format!("Fetching {}", url));
            let info = self.scraper.get_novel_info(&url).await?;
            books.push(BookSummary { info, url });
        }

        Ok(books)
    }

    /// Parses the footer line, warning instead of failing when it is
    /// missing or has an unexpected shape.
    fn footer_info(&self, footer: Option<&str>) -> Option<ChapterFooterInfo> {
        let Some(line) = footer else {
            self.console.warning("Subtitle not found");
            return None;
        };

        let parsed = parse_chapter_footer(line);
        if parsed.is_none() {
            self.console
                .warning(&format!("Unrecognized chapter subtitle: {}", line));
        }
        parsed
    }
}
