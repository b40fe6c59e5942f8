//! Error types for namespace detection and rewriting.

use thiserror::Error;

use crate::base::Position;

/// Errors that can occur while interpreting a document.
///
/// [`find_usages`](super::find_usages) and
/// [`replace_usages`](super::replace_usages) never surface these; the
/// `try_` variants do.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamespaceError {
    /// The XML reader rejected the input.
    #[error("XML error at {position}: {message}")]
    Xml { position: Position, message: String },

    /// A start or empty tag could not be split into name and attributes.
    #[error("Malformed tag at {position}: {message}")]
    MalformedTag { position: Position, message: String },

    /// Input ended while elements were still open.
    #[error("Unclosed element `{name}` at end of input")]
    UnclosedElement { name: String },

    /// The input contains no element at all.
    #[error("Document has no root element")]
    MissingRoot,

    /// The target binding would clash with another binding of its prefix,
    /// either on the same element or across nesting levels.
    #[error("Declaration `{name}` already binds `{existing}`")]
    ConflictingDeclaration { name: String, existing: String },

    /// Renaming would leave two attributes with the same name on one tag.
    #[error("Rewritten attribute `{name}` would appear twice on one element")]
    DuplicateAttribute { name: String },

    /// Target prefix is not a usable XML prefix.
    #[error("Invalid namespace prefix `{0}`")]
    InvalidPrefix(String),
}

impl NamespaceError {
    /// Create an XML reader error at a byte offset of `text`.
    pub fn xml(text: &str, offset: usize, message: impl Into<String>) -> Self {
        Self::Xml {
            position: Position::of_offset(text, offset),
            message: message.into(),
        }
    }

    /// Create a malformed tag error at a byte offset of `text`.
    pub fn malformed_tag(text: &str, offset: usize, message: impl Into<String>) -> Self {
        Self::MalformedTag {
            position: Position::of_offset(text, offset),
            message: message.into(),
        }
    }

    /// Create an unclosed element error.
    pub fn unclosed(name: impl Into<String>) -> Self {
        Self::UnclosedElement { name: name.into() }
    }

    /// Create a conflicting declaration error.
    pub fn conflicting_declaration(name: impl Into<String>, existing: impl Into<String>) -> Self {
        Self::ConflictingDeclaration {
            name: name.into(),
            existing: existing.into(),
        }
    }

    /// Create a duplicate attribute error.
    pub fn duplicate_attribute(name: impl Into<String>) -> Self {
        Self::DuplicateAttribute { name: name.into() }
    }

    /// Create an invalid prefix error.
    pub fn invalid_prefix(prefix: impl Into<String>) -> Self {
        Self::InvalidPrefix(prefix.into())
    }
}
