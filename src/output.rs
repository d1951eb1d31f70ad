//! Reading and writing JSON documents in the output directory.

use crate::error::OutputError;
use crate::novel::NovelDocument;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Writes `value` as pretty-printed JSON to `dir/file_name`.
///
/// The directory is created if needed. Returns the written path.
pub fn save_json_to<T: Serialize>(
    value: &T,
    dir: &Path,
    file_name: &str,
) -> Result<PathBuf, OutputError> {
    std::fs::create_dir_all(dir).map_err(|source| OutputError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(file_name);
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(&path, json).map_err(|source| OutputError::Io {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

/// Loads a scraped novel document.
pub fn load_document(path: &Path) -> Result<NovelDocument, OutputError> {
    let content = std::fs::read_to_string(path).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// File name for a translated copy: `<input stem>.<language>.json`.
pub fn translated_file_name(input: &Path, language: &str) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "novel".to_string());
    format!("{}.{}.json", stem, language)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::novel::{ChapterRecord, NovelInfo};
    use tempfile::TempDir;

    fn sample_document() -> NovelDocument {
        let mut chapter = ChapterRecord::new("第1章", "https://fanqienovel.com/reader/1", false);
        chapter.content = Some(vec!["正文".to_string()]);
        NovelDocument::new(NovelInfo {
            name: "书".to_string(),
            abstract_content: String::new(),
            chapters: vec![chapter],
        })
    }

    #[test]
    fn test_save_creates_directory_and_reloads() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("a").join("b");
        let doc = sample_document();

        let path = save_json_to(&doc, &out, "书.json").unwrap();
        assert_eq!(path, out.join("书.json"));

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n  \"info\""));

        let loaded = load_document(&path).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{\"info\": 3}").unwrap();

        assert!(matches!(load_document(&path), Err(OutputError::Json(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_document(&dir.path().join("missing.json")),
            Err(OutputError::Io { .. })
        ));
    }

    #[test]
    fn test_translated_file_name() {
        assert_eq!(
            translated_file_name(Path::new("output/十日终焉.json"), "en"),
            "十日终焉.en.json"
        );
    }
}
