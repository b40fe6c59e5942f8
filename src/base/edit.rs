//! Byte-range replacements over an immutable source string.
//!
//! Edits are collected while scanning a document and spliced in one pass,
//! so untouched regions are copied byte-for-byte.

use text_size::TextRange;

/// Replace the text in `range` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(range: TextRange, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    pub fn delete(range: TextRange) -> Self {
        Self {
            range,
            replacement: String::new(),
        }
    }
}

/// Apply `edits` to `text`.
///
/// Edits are sorted by start offset. An edit that overlaps one already
/// applied is skipped.
pub fn apply_edits(text: &str, mut edits: Vec<TextEdit>) -> String {
    edits.sort_by_key(|edit| (edit.range.start(), edit.range.end()));

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for edit in edits {
        let start = usize::from(edit.range.start());
        let end = usize::from(edit.range.end());
        if start < cursor || end > text.len() {
            tracing::trace!(range = ?edit.range, "skipping overlapping edit");
            continue;
        }
        out.push_str(&text[cursor..start]);
        out.push_str(&edit.replacement);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}
