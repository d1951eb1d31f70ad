//! Codepoint remap table for the site's obfuscated chapter font.
//!
//! Chapter text is served with a custom font whose glyphs are assigned to
//! unrelated codepoints. The table maps each such codepoint, written as its
//! decimal string, back to the text the glyph actually shows.

use crate::error::MappingError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// A single entry of the mapping data file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemapEntry {
    /// Decimal codepoint as observed in the obfuscated text.
    pub key: String,
    /// Real character(s) the glyph stands for.
    pub value: String,
}

/// Accepted layouts of the mapping data file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MappingFile {
    /// `{ "codes": [{ "key": "58344", "value": "的" }, ...] }`
    Codes { codes: Vec<RemapEntry> },
    /// `{ "58344": "的", ... }` as written by the glyph OCR tool.
    Flat(HashMap<String, String>),
}

/// Immutable lookup table from obfuscated codepoint to real text.
#[derive(Debug, Clone, Default)]
pub struct RemapTable {
    codes: HashMap<String, String>,
}

impl RemapTable {
    /// Builds a table from entries. Later entries win on duplicate keys.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = RemapEntry>,
    {
        let codes = entries
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect();
        Self { codes }
    }

    /// Parses a table from the JSON contents of a mapping file.
    ///
    /// The file must hold at least one entry, and every key must be the
    /// canonical decimal form of a Unicode scalar value.
    pub fn from_json_str(json: &str) -> Result<Self, MappingError> {
        let table = match serde_json::from_str::<MappingFile>(json)? {
            MappingFile::Codes { codes } => Self::from_entries(codes),
            MappingFile::Flat(codes) => Self { codes },
        };
        table.validate()?;
        Ok(table)
    }

    /// Checks that the table is non-empty and keyed by decimal codepoints.
    fn validate(&self) -> Result<(), MappingError> {
        if self.codes.is_empty() {
            return Err(MappingError::InvalidData("no entries".to_string()));
        }

        if let Some(key) = self.codes.keys().find(|key| !is_decimal_codepoint(key)) {
            return Err(MappingError::InvalidData(format!(
                "key '{}' is not a decimal codepoint",
                key
            )));
        }

        Ok(())
    }

    /// Loads a table from a mapping file on disk.
    pub fn load(path: &Path) -> Result<Self, MappingError> {
        let content = std::fs::read_to_string(path).map_err(|source| MappingError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Looks up the replacement for a decimal codepoint string.
    pub fn lookup(&self, codepoint: &str) -> Option<&str> {
        self.codes.get(codepoint).map(String::as_str)
    }

    /// Looks up the replacement for a character.
    pub fn lookup_char(&self, ch: char) -> Option<&str> {
        self.lookup(&u32::from(ch).to_string())
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// True for a string of ASCII digits, without leading zeros, naming a
/// Unicode scalar value. Only that form can match a lookup key.
fn is_decimal_codepoint(key: &str) -> bool {
    !key.is_empty()
        && key.bytes().all(|b| b.is_ascii_digit())
        && (key == "0" || !key.starts_with('0'))
        && key.parse::<u32>().ok().and_then(char::from_u32).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn entry(key: &str, value: &str) -> RemapEntry {
        RemapEntry {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_lookup_hit_and_miss() {
        let table = RemapTable::from_entries(vec![entry("58344", "的")]);
        assert_eq!(table.lookup("58344"), Some("的"));
        assert_eq!(table.lookup("58345"), None);
        assert_eq!(table.lookup_char('\u{e3e8}'), Some("的"));
        assert_eq!(table.lookup_char('a'), None);
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let table = RemapTable::from_entries(vec![entry("1", "a"), entry("1", "b")]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("1"), Some("b"));
    }

    #[test]
    fn test_parse_codes_layout() {
        let json = r#"{"codes":[{"key":"58344","value":"的"},{"key":"58345","value":"一"}]}"#;
        let table = RemapTable::from_json_str(json).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("58345"), Some("一"));
    }

    #[test]
    fn test_parse_flat_layout() {
        let json = r#"{"58344":"的","58400":""}"#;
        let table = RemapTable::from_json_str(json).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("58344"), Some("的"));
        assert_eq!(table.lookup("58400"), Some(""));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(RemapTable::from_json_str("not json").is_err());
        assert!(RemapTable::from_json_str(r#"{"codes":[{"key":"1"}]}"#).is_err());
        assert!(RemapTable::from_json_str("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_wrong_shape_rejected() {
        for json in [
            "{}",
            r#"{"codes":[]}"#,
            r#"{"codes":"oops"}"#,
            r#"{"58344":"的","abc":"x"}"#,
            r#"{"codes":[{"key":"U+E3E8","value":"的"}]}"#,
            r#"{"-1":"x"}"#,
            r#"{"55296":"x"}"#,
            r#"{"058344":"的"}"#,
        ] {
            let err = RemapTable::from_json_str(json).unwrap_err();
            assert!(
                matches!(err, MappingError::InvalidData(_)),
                "expected InvalidData for {}: {:?}",
                json,
                err
            );
        }
    }

    #[test]
    fn test_empty_file_on_disk_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();
        assert!(matches!(
            RemapTable::load(file.path()),
            Err(MappingError::InvalidData(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"codes":[{{"key":"20013","value":"中"}}]}}"#).unwrap();

        let table = RemapTable::load(file.path()).unwrap();
        assert_eq!(table.lookup("20013"), Some("中"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RemapTable::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, MappingError::ReadError { .. }));
    }
}
