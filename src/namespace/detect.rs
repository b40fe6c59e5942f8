//! Usage detection: is a namespace URI used in a document, and under which
//! prefixes.

use indexmap::IndexSet;
use smol_str::SmolStr;

use super::document::{Declaration, StartTag, TagVisitor, walk};
use super::error::NamespaceError;
use super::model::NamespaceUsage;
use super::scope::NamespaceScope;

/// Find how `namespace_uri` is used in `xml`.
///
/// Returns `None` when the URI is neither declared nor referenced as an
/// attribute value, and also when `xml` is not well-formed. Use
/// [`try_find_usages`] to tell the two apart.
///
/// ```
/// use nsmigrate::namespace::{find_usages, known};
///
/// let xml = r#"<definitions xmlns:camunda="http://camunda.org/schema/1.0/bpmn">
///   <process camunda:versionTag="1"/>
/// </definitions>"#;
///
/// let used = find_usages(xml, known::CAMUNDA).expect("camunda is used");
/// assert_eq!(used.prefixes, ["camunda"]);
/// assert_eq!(find_usages("error>", known::CAMUNDA), None);
/// ```
pub fn find_usages(xml: &str, namespace_uri: &str) -> Option<NamespaceUsage> {
    match try_find_usages(xml, namespace_uri) {
        Ok(usage) => usage,
        Err(err) => {
            tracing::debug!(%err, "cannot detect namespace usage");
            None
        }
    }
}

/// Like [`find_usages`], reporting unparsable input as an error.
///
/// `Ok(None)` means the document is well-formed and does not use the URI.
pub fn try_find_usages(
    xml: &str,
    namespace_uri: &str,
) -> Result<Option<NamespaceUsage>, NamespaceError> {
    let mut detector = UsageDetector::new(namespace_uri);
    walk(xml, &mut detector)?;
    Ok(detector.finish())
}

struct UsageDetector<'u> {
    uri: &'u str,
    prefixes: IndexSet<SmolStr>,
    value_references: usize,
}

impl<'u> UsageDetector<'u> {
    fn new(uri: &'u str) -> Self {
        Self {
            uri,
            prefixes: IndexSet::new(),
            value_references: 0,
        }
    }

    fn finish(self) -> Option<NamespaceUsage> {
        tracing::trace!(
            uri = self.uri,
            prefixes = ?self.prefixes,
            value_references = self.value_references,
            "namespace detection finished"
        );
        if self.prefixes.is_empty() && self.value_references == 0 {
            return None;
        }
        Some(NamespaceUsage {
            uri: self.uri.to_string(),
            prefixes: self.prefixes.into_iter().collect(),
        })
    }
}

impl TagVisitor for UsageDetector<'_> {
    fn start_tag(&mut self, tag: &StartTag<'_>, _scope: &NamespaceScope) {
        for (prefix, uri) in tag.bindings() {
            if uri == self.uri {
                self.prefixes.insert(SmolStr::new(prefix));
            }
        }
        // a default declaration uses the URI without a prefix
        self.value_references += tag
            .attributes
            .iter()
            .filter(|attr| match attr.declaration() {
                None | Some(Declaration::Default) => attr.value == self.uri,
                Some(Declaration::Prefixed(_)) => false,
            })
            .count();
    }
}
