//! Prefix bindings visible at the current element.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// Prefix under which the default namespace (`xmlns="..."`) is bound.
pub const DEFAULT_PREFIX: &str = "";

/// Stack of namespace bindings, one frame per open element.
///
/// `xmlns:prefix` declarations bind `prefix`; `xmlns` binds
/// [`DEFAULT_PREFIX`]. An undeclaration (`xmlns=""`) binds the empty URI.
#[derive(Debug, Default)]
pub struct NamespaceScope {
    frames: Vec<FxHashMap<SmolStr, String>>,
}

impl NamespaceScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an element declaring `bindings`.
    pub fn push<I>(&mut self, bindings: I)
    where
        I: IntoIterator<Item = (SmolStr, String)>,
    {
        self.frames.push(bindings.into_iter().collect());
    }

    /// Close the innermost element.
    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// URI bound to `prefix`, innermost declaration winning.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(prefix))
            .map(String::as_str)
    }

    /// Whether `prefix` currently resolves to `uri`.
    pub fn is_bound_to(&self, prefix: &str, uri: &str) -> bool {
        self.resolve(prefix) == Some(uri)
    }
}

/// Split a qualified name into `(prefix, local)`.
///
/// The prefix is everything before the first colon, so `a.b:x` yields
/// `a.b`. Unprefixed names yield `None`.
pub fn split_qname(name: &str) -> Option<(&str, &str)> {
    name.split_once(':')
}
