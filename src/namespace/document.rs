//! Streaming walk over the tags of an XML document.
//!
//! The walk is driven by [`quick_xml::Reader`], which owns all
//! well-formedness decisions. For every start, empty and end tag the walker
//! recovers the byte spans of the tag name and its attributes, updates the
//! [`NamespaceScope`] and hands the tag to a [`TagVisitor`]. Text, comments,
//! CDATA sections and processing instructions are never visited.

use quick_xml::Reader;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use smol_str::SmolStr;
use text_size::TextRange;

use super::error::NamespaceError;
use super::scope::{DEFAULT_PREFIX, NamespaceScope, split_qname};
use super::tag::{AttributeSpan, scan_end_tag, scan_start_tag};

/// What an attribute declares, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration<'a> {
    /// `xmlns="..."`
    Default,
    /// `xmlns:prefix="..."`
    Prefixed(&'a str),
}

/// An attribute with its decoded value.
#[derive(Debug, Clone)]
pub struct Attribute<'a> {
    /// Qualified name as written.
    pub name: &'a str,
    /// Value with entities resolved.
    pub value: String,
    pub span: AttributeSpan,
}

impl<'a> Attribute<'a> {
    pub fn declaration(&self) -> Option<Declaration<'a>> {
        if self.name == "xmlns" {
            Some(Declaration::Default)
        } else {
            self.name.strip_prefix("xmlns:").map(Declaration::Prefixed)
        }
    }

    pub fn is_declaration(&self) -> bool {
        self.declaration().is_some()
    }

    /// Prefix of a non-declaration attribute name.
    pub fn prefix(&self) -> Option<&'a str> {
        if self.is_declaration() {
            return None;
        }
        split_qname(self.name).map(|(prefix, _)| prefix)
    }
}

/// A start tag, or an empty-element tag.
#[derive(Debug, Clone)]
pub struct StartTag<'a> {
    pub name: &'a str,
    pub name_range: TextRange,
    pub attributes: Vec<Attribute<'a>>,
    /// `<name/>`: no [`TagVisitor::end_tag`] follows.
    pub is_empty: bool,
}

impl<'a> StartTag<'a> {
    pub fn prefix(&self) -> Option<&'a str> {
        split_qname(self.name).map(|(prefix, _)| prefix)
    }

    /// `xmlns:prefix` bindings declared on this tag.
    pub fn bindings(&self) -> impl Iterator<Item = (&'a str, &str)> + '_ {
        self.attributes.iter().filter_map(|attr| match attr.declaration() {
            Some(Declaration::Prefixed(prefix)) => Some((prefix, attr.value.as_str())),
            _ => None,
        })
    }
}

/// An end tag.
#[derive(Debug, Clone, Copy)]
pub struct EndTag<'a> {
    pub name: &'a str,
    pub name_range: TextRange,
}

impl<'a> EndTag<'a> {
    pub fn prefix(&self) -> Option<&'a str> {
        split_qname(self.name).map(|(prefix, _)| prefix)
    }
}

/// Receives the tags of a document in order.
///
/// The scope passed along already contains the bindings declared on the
/// tag itself.
pub trait TagVisitor {
    fn start_tag(&mut self, tag: &StartTag<'_>, scope: &NamespaceScope);

    fn end_tag(&mut self, _tag: &EndTag<'_>, _scope: &NamespaceScope) {}
}

/// Walk every tag of `xml`, failing on the first well-formedness error.
///
/// A document without any element, or with elements still open at the end
/// of input, is rejected as well.
pub fn walk<V: TagVisitor>(xml: &str, visitor: &mut V) -> Result<(), NamespaceError> {
    let mut reader = Reader::from_str(xml);
    let mut scope = NamespaceScope::new();
    let mut open: Vec<&str> = Vec::new();
    let mut seen_root = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            NamespaceError::xml(xml, reader.error_position() as usize, e.to_string())
        })?;
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(ref e) => {
                let tag = read_start_tag(xml, e, end, false)?;
                scope.push(owned_bindings(&tag));
                visitor.start_tag(&tag, &scope);
                open.push(tag.name);
                seen_root = true;
            }
            Event::Empty(ref e) => {
                let tag = read_start_tag(xml, e, end, true)?;
                scope.push(owned_bindings(&tag));
                visitor.start_tag(&tag, &scope);
                scope.pop();
                seen_root = true;
            }
            Event::End(ref e) => {
                let tag = read_end_tag(xml, e, end)?;
                visitor.end_tag(&tag, &scope);
                scope.pop();
                open.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(name) = open.last() {
        return Err(NamespaceError::unclosed(*name));
    }
    if !seen_root {
        return Err(NamespaceError::MissingRoot);
    }
    Ok(())
}

/// Scope frame of `tag`, the default namespace under the empty prefix.
fn owned_bindings(tag: &StartTag<'_>) -> Vec<(SmolStr, String)> {
    tag.attributes
        .iter()
        .filter_map(|attr| {
            let prefix = match attr.declaration()? {
                Declaration::Default => DEFAULT_PREFIX,
                Declaration::Prefixed(prefix) => prefix,
            };
            Some((SmolStr::new(prefix), attr.value.clone()))
        })
        .collect()
}

fn read_start_tag<'a>(
    xml: &'a str,
    e: &BytesStart<'_>,
    end: usize,
    is_empty: bool,
) -> Result<StartTag<'a>, NamespaceError> {
    // `e` holds the bytes between `<` and `>` (or `/>` for empty tags)
    let closing = if is_empty { 2 } else { 1 };
    let start = end
        .checked_sub(e.len() + closing + 1)
        .filter(|&start| xml.as_bytes().get(start) == Some(&b'<'))
        .ok_or_else(|| NamespaceError::malformed_tag(xml, end, "cannot locate tag start"))?;
    let raw = xml
        .get(start..end)
        .ok_or_else(|| NamespaceError::malformed_tag(xml, start, "tag is not on a char boundary"))?;
    let spans = scan_start_tag(raw, start)
        .ok_or_else(|| NamespaceError::malformed_tag(xml, start, "cannot split tag attributes"))?;

    let mut attributes = Vec::with_capacity(spans.attributes.len());
    let mut decoded = e.attributes();
    for span in spans.attributes {
        let attr = decoded
            .next()
            .ok_or_else(|| NamespaceError::malformed_tag(xml, start, "attribute count mismatch"))?
            .map_err(|err| NamespaceError::xml(xml, start, err.to_string()))?;
        let name = &xml[span.name];
        if attr.key.as_ref() != name.as_bytes() {
            return Err(NamespaceError::malformed_tag(
                xml,
                usize::from(span.name.start()),
                format!("unexpected attribute `{name}`"),
            ));
        }
        let value = match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            // unknown entities are compared literally
            Err(_) => xml[span.value].to_string(),
        };
        attributes.push(Attribute { name, value, span });
    }
    if let Some(extra) = decoded.next() {
        let message = match extra {
            Ok(_) => "attribute count mismatch".to_string(),
            Err(err) => err.to_string(),
        };
        return Err(NamespaceError::malformed_tag(xml, start, message));
    }

    Ok(StartTag {
        name: &xml[spans.name],
        name_range: spans.name,
        attributes,
        is_empty,
    })
}

fn read_end_tag<'a>(
    xml: &'a str,
    e: &BytesEnd<'_>,
    end: usize,
) -> Result<EndTag<'a>, NamespaceError> {
    let start = xml
        .get(..end)
        .and_then(|head| head.rfind("</"))
        .ok_or_else(|| NamespaceError::malformed_tag(xml, end, "cannot locate end tag"))?;
    let name_range = scan_end_tag(&xml[start..end], start)
        .ok_or_else(|| NamespaceError::malformed_tag(xml, start, "cannot read end tag name"))?;
    let name = &xml[name_range];
    if e.name().as_ref() != name.as_bytes() {
        return Err(NamespaceError::malformed_tag(
            xml,
            start,
            format!("unexpected end tag `{name}`"),
        ));
    }
    Ok(EndTag { name, name_range })
}
