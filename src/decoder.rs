//! Chapter text de-obfuscation.

use crate::remap::RemapTable;

/// Decodes every paragraph of a chapter, preserving order and count.
pub fn decode<S: AsRef<str>>(table: &RemapTable, paragraphs: &[S]) -> Vec<String> {
    paragraphs
        .iter()
        .map(|p| decode_paragraph(table, p.as_ref()))
        .collect()
}

/// Decodes a single paragraph.
///
/// Each `char` is looked up by its decimal codepoint; characters with no
/// table entry are kept as they are.
pub fn decode_paragraph(table: &RemapTable, paragraph: &str) -> String {
    let mut decoded = String::with_capacity(paragraph.len());
    for ch in paragraph.chars() {
        match table.lookup_char(ch) {
            Some(real) => decoded.push_str(real),
            None => decoded.push(ch),
        }
    }
    decoded
}
