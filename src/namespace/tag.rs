//! Byte spans of names and attribute values inside a single tag.
//!
//! The XML reader decides where a tag starts and ends and whether it is
//! well-formed. This scanner only locates the pieces inside it so the
//! rewriter can replace them in place.

use text_size::{TextRange, TextSize};

/// Spans of one attribute, absolute in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpan {
    /// Qualified attribute name, e.g. `camunda:class`.
    pub name: TextRange,
    /// Leading whitespace plus the whole `name="value"` text.
    pub full: TextRange,
    /// Value between the quotes, still escaped.
    pub value: TextRange,
}

/// Spans of a start or empty tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTagSpans {
    pub name: TextRange,
    pub attributes: Vec<AttributeSpan>,
}

/// Split `<name attr="v" ...>` or `<name .../>` starting at `offset`.
///
/// Returns `None` when `raw` does not have the expected shape.
pub fn scan_start_tag(raw: &str, offset: usize) -> Option<StartTagSpans> {
    let bytes = raw.as_bytes();
    if bytes.first() != Some(&b'<') {
        return None;
    }

    let mut pos = 1;
    let name_start = pos;
    while pos < bytes.len() && !is_name_end(bytes[pos]) {
        pos += 1;
    }
    if pos == name_start {
        return None;
    }
    let name = range(offset, name_start, pos)?;

    let mut attributes = Vec::new();
    loop {
        let ws_start = pos;
        pos = skip_whitespace(bytes, pos);
        match bytes.get(pos)? {
            b'>' | b'/' => break,
            _ if pos == ws_start => return None,
            _ => {}
        }

        let attr_name_start = pos;
        while pos < bytes.len() && !is_name_end(bytes[pos]) && bytes[pos] != b'=' {
            pos += 1;
        }
        let attr_name_end = pos;
        pos = skip_whitespace(bytes, pos);
        if bytes.get(pos)? != &b'=' {
            return None;
        }
        pos = skip_whitespace(bytes, pos + 1);

        let quote = *bytes.get(pos)?;
        if quote != b'"' && quote != b'\'' {
            return None;
        }
        let value_start = pos + 1;
        let value_len = bytes[value_start..].iter().position(|&b| b == quote)?;
        let value_end = value_start + value_len;
        pos = value_end + 1;

        attributes.push(AttributeSpan {
            name: range(offset, attr_name_start, attr_name_end)?,
            full: range(offset, ws_start, pos)?,
            value: range(offset, value_start, value_end)?,
        });
    }

    Some(StartTagSpans { name, attributes })
}

/// Span of the name in `</name>` starting at `offset`.
pub fn scan_end_tag(raw: &str, offset: usize) -> Option<TextRange> {
    let name = raw.strip_prefix("</")?;
    let len = name.bytes().position(is_name_end)?;
    if len == 0 {
        return None;
    }
    range(offset, 2, 2 + len)
}

fn is_name_end(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'>' || b == b'/'
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

/// `None` once an offset no longer fits a [`TextSize`].
fn range(offset: usize, start: usize, end: usize) -> Option<TextRange> {
    let size = |at: usize| {
        let at = offset.checked_add(at)?;
        u32::try_from(at).ok().map(TextSize::new)
    };
    Some(TextRange::new(size(start)?, size(end)?))
}
