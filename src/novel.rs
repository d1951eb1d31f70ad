//! Novel and chapter records produced by a scrape run.
//!
//! Field names serialize in camelCase so documents written here can be read
//! by the translation pass or any other tool expecting the same layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Word count and last update parsed from a chapter's footer line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterFooterInfo {
    /// Number of characters the site reports for the chapter.
    pub words: u64,
    /// Local midnight of the update date.
    pub updated_at: DateTime<Utc>,
}

/// A chapter as listed in the novel's table of contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRecord {
    pub title: String,
    pub href: String,
    /// Paywalled chapters are listed but never downloaded.
    pub is_locked: bool,
    /// Decoded paragraphs, present once the chapter has been downloaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<ChapterFooterInfo>,
}

impl ChapterRecord {
    /// Creates a table-of-contents entry with no content yet.
    pub fn new(title: impl Into<String>, href: impl Into<String>, is_locked: bool) -> Self {
        Self {
            title: title.into(),
            href: href.into(),
            is_locked,
            content: None,
            update: None,
        }
    }

    /// Returns true if the chapter has downloaded, non-empty content.
    pub fn has_content(&self) -> bool {
        self.content.as_ref().is_some_and(|c| !c.is_empty())
    }
}

/// Metadata and chapters of a novel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelInfo {
    pub name: String,
    #[serde(default)]
    pub abstract_content: String,
    #[serde(default)]
    pub chapters: Vec<ChapterRecord>,
}

impl NovelInfo {
    /// Iterates over chapters that can be downloaded.
    pub fn unlocked_chapters(&self) -> impl Iterator<Item = &ChapterRecord> {
        self.chapters.iter().filter(|ch| !ch.is_locked)
    }

    /// Number of paywalled chapters.
    pub fn locked_count(&self) -> usize {
        self.chapters.iter().filter(|ch| ch.is_locked).count()
    }
}

/// The document written to disk at the end of a scrape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelDocument {
    pub info: NovelInfo,
    /// When the scrape finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<DateTime<Utc>>,
}

impl NovelDocument {
    /// Wraps scraped info, stamping it with the current time.
    pub fn new(info: NovelInfo) -> Self {
        Self {
            info,
            update_at: Some(Utc::now()),
        }
    }
}

/// One novel found while crawling a listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    #[serde(flatten)]
    pub info: NovelInfo,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_info() -> NovelInfo {
        NovelInfo {
            name: "测试小说".to_string(),
            abstract_content: "简介".to_string(),
            chapters: vec![
                ChapterRecord::new("第1章", "https://fanqienovel.com/reader/1", false),
                ChapterRecord::new("第2章", "https://fanqienovel.com/reader/2", true),
            ],
        }
    }

    #[test]
    fn test_unlocked_and_locked_counts() {
        let info = sample_info();
        assert_eq!(info.unlocked_chapters().count(), 1);
        assert_eq!(info.locked_count(), 1);
    }

    #[test]
    fn test_chapter_serializes_camel_case_without_absent_fields() {
        let chapter = ChapterRecord::new("第1章", "/reader/1", false);
        let json = serde_json::to_value(&chapter).unwrap();
        assert_eq!(json["isLocked"], false);
        assert!(json.get("content").is_none());
        assert!(json.get("update").is_none());
    }

    #[test]
    fn test_footer_info_serialization() {
        let info = ChapterFooterInfo {
            words: 1234,
            updated_at: Utc.with_ymd_and_hms(2023, 5, 5, 16, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["words"], 1234);
        assert_eq!(json["updatedAt"], "2023-05-05T16:00:00Z");
    }

    #[test]
    fn test_document_layout() {
        let mut info = sample_info();
        info.chapters[0].content = Some(vec!["第一段".to_string()]);
        let doc = NovelDocument::new(info);

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["info"]["name"], "测试小说");
        assert_eq!(json["info"]["abstractContent"], "简介");
        assert_eq!(json["info"]["chapters"][0]["content"][0], "第一段");
        assert!(json["updateAt"].is_string());

        let back: NovelDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_book_summary_is_flat() {
        let summary = BookSummary {
            info: sample_info(),
            url: "https://fanqienovel.com/page/1".to_string(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["name"], "测试小说");
        assert_eq!(json["url"], "https://fanqienovel.com/page/1");
        assert_eq!(json["chapters"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_has_content() {
        let mut chapter = ChapterRecord::new("t", "h", false);
        assert!(!chapter.has_content());
        chapter.content = Some(Vec::new());
        assert!(!chapter.has_content());
        chapter.content = Some(vec!["x".to_string()]);
        assert!(chapter.has_content());
    }
}
