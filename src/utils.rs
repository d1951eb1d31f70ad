//! Utility functions for common operations.

use crate::error::TranslationError;

/// Characters that cannot appear in file names on common platforms.
const FORBIDDEN_FILE_NAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Splits text into chunks by lines, respecting a maximum chunk size.
///
/// Sizes are counted in characters, not bytes, so CJK text gets the same
/// budget as Latin text. A single line longer than `chunk_size` becomes its
/// own chunk.
pub fn split_text_into_line_chunks(text: &str, chunk_size: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current_chunk: Vec<&str> = Vec::new();
    let mut current_size: usize = 0;

    for line in text.lines() {
        let line_chars = line.chars().count();
        let line_size = line_chars + if current_chunk.is_empty() { 0 } else { 1 };

        if current_size + line_size > chunk_size && !current_chunk.is_empty() {
            chunks.push(current_chunk.join("\n"));
            current_chunk = vec![line];
            current_size = line_chars;
        } else {
            current_chunk.push(line);
            current_size += line_size;
        }
    }

    if !current_chunk.is_empty() {
        chunks.push(current_chunk.join("\n"));
    }

    chunks
}

/// Checks if an HTTP response is successful, and if not, returns a detailed error.
///
/// This helper extracts both the status code and response body for better error messages.
pub async fn check_response_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, TranslationError> {
    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(TranslationError::ApiError(format!(
            "HTTP {}: {}",
            status, text
        )));
    }
    Ok(response)
}

/// Turns a novel title into a safe file name stem.
///
/// Path separators and other reserved characters become `_`; an empty
/// result falls back to `novel`.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if FORBIDDEN_FILE_NAME_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches('.').trim();
    if cleaned.is_empty() {
        "novel".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_empty_text() {
        let chunks = split_text_into_line_chunks("", 100);
        assert_eq!(chunks.len(), 0);
    }

    #[test]
    fn test_split_multiple_lines_fits() {
        let text = "Line 1\nLine 2\nLine 3";
        let chunks = split_text_into_line_chunks(text, 100);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], text);
    }

    #[test]
    fn test_split_multiple_chunks_needed() {
        let text = "Line 1\nLine 2\nLine 3\nLine 4";
        let chunks = split_text_into_line_chunks(text, 15);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "Line 1\nLine 2");
        assert_eq!(chunks[1], "Line 3\nLine 4");
    }

    #[test]
    fn test_split_counts_characters_not_bytes() {
        // Each line is 4 chars but 12 bytes.
        let text = "第一段落\n第二段落";
        let chunks = split_text_into_line_chunks(text, 9);
        assert_eq!(chunks.len(), 1);

        let chunks = split_text_into_line_chunks(text, 8);
        assert_eq!(chunks, vec!["第一段落", "第二段落"]);
    }

    #[test]
    fn test_split_single_long_line() {
        let text = "This is a very long line that exceeds the chunk size limit";
        let chunks = split_text_into_line_chunks(text, 20);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], text);
    }

    #[test]
    fn test_split_with_empty_lines() {
        let text = "Line 1\n\nLine 3";
        let chunks = split_text_into_line_chunks(text, 100);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], text);
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("十日终焉"), "十日终焉");
        assert_eq!(sanitize_file_name("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_file_name("  title?  "), "title_");
        assert_eq!(sanitize_file_name("../etc"), "_etc");
        assert_eq!(sanitize_file_name(""), "novel");
        assert_eq!(sanitize_file_name(".."), "novel");
    }
}
