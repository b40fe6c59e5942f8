//! Usage descriptors and rewrite targets.

use smol_str::SmolStr;

use super::error::NamespaceError;
use super::known;

/// How a namespace URI is used in a document.
///
/// `prefixes` lists every distinct prefix declared for `uri`, in order of
/// first declaration. It is empty when the URI only appears as an attribute
/// value (e.g. `targetNamespace`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamespaceUsage {
    pub uri: String,
    pub prefixes: Vec<SmolStr>,
}

impl NamespaceUsage {
    pub fn new<P>(uri: impl Into<String>, prefixes: impl IntoIterator<Item = P>) -> Self
    where
        P: Into<SmolStr>,
    {
        Self {
            uri: uri.into(),
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Usage through attribute values only.
    pub fn value_only(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            prefixes: Vec::new(),
        }
    }

    /// Whether any prefix is declared for the URI.
    pub fn has_prefixes(&self) -> bool {
        !self.prefixes.is_empty()
    }

    pub fn contains_prefix(&self, prefix: &str) -> bool {
        self.prefixes.iter().any(|p| p == prefix)
    }
}

/// The namespace usages are rewritten to.
///
/// An empty `prefix` targets the default namespace: prefixed names lose
/// their prefix and declarations become `xmlns="..."`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetNamespace {
    pub prefix: SmolStr,
    pub uri: String,
}

impl TargetNamespace {
    /// Create a target, rejecting prefixes that cannot appear in a
    /// qualified name.
    pub fn new(prefix: impl Into<SmolStr>, uri: impl Into<String>) -> Result<Self, NamespaceError> {
        let target = Self {
            prefix: prefix.into(),
            uri: uri.into(),
        };
        target.validate()?;
        Ok(target)
    }

    /// Target the default (unprefixed) namespace.
    pub fn default_namespace(uri: impl Into<String>) -> Self {
        Self {
            prefix: SmolStr::default(),
            uri: uri.into(),
        }
    }

    pub fn camunda() -> Self {
        Self {
            prefix: SmolStr::new_static(known::CAMUNDA_PREFIX),
            uri: known::CAMUNDA.to_string(),
        }
    }

    pub fn activiti() -> Self {
        Self {
            prefix: SmolStr::new_static(known::ACTIVITI_PREFIX),
            uri: known::ACTIVITI.to_string(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Check that the prefix is empty or a valid, non-reserved NCName.
    pub fn validate(&self) -> Result<(), NamespaceError> {
        if self.prefix.is_empty() || is_valid_prefix(&self.prefix) {
            Ok(())
        } else {
            Err(NamespaceError::invalid_prefix(self.prefix.as_str()))
        }
    }
}

/// Whether `prefix` is an NCName usable as a namespace prefix.
///
/// Dots and dashes are allowed after the first char, so `a.b` is valid.
pub fn is_valid_prefix(prefix: &str) -> bool {
    if prefix.eq_ignore_ascii_case("xml") || prefix.eq_ignore_ascii_case("xmlns") {
        return false;
    }
    let mut chars = prefix.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || unicode_ident::is_xid_start(first))
        && chars.all(|c| c == '.' || c == '-' || unicode_ident::is_xid_continue(c))
}
