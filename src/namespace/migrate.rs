//! Detect-then-rewrite in one step, for single documents and batches.

use rayon::prelude::*;

use super::detect::find_usages;
use super::model::{NamespaceUsage, TargetNamespace};
use super::rewrite::replace_usages;

/// Move `xml` from `from_uri` to `target`.
///
/// Returns `None` when the document does not use `from_uri` (or cannot be
/// read), so callers can skip saving an unchanged file.
pub fn migrate(xml: &str, from_uri: &str, target: &TargetNamespace) -> Option<String> {
    let used = find_usages(xml, from_uri)?;
    Some(replace_usages(xml, &used, target))
}

/// [`find_usages`] over many documents on the rayon pool.
///
/// Results are in input order.
pub fn find_usages_par<S>(documents: &[S], namespace_uri: &str) -> Vec<Option<NamespaceUsage>>
where
    S: AsRef<str> + Sync,
{
    documents
        .par_iter()
        .map(|xml| find_usages(xml.as_ref(), namespace_uri))
        .collect()
}

/// [`migrate`] over many documents on the rayon pool.
///
/// Results are in input order.
pub fn migrate_par<S>(documents: &[S], from_uri: &str, target: &TargetNamespace) -> Vec<Option<String>>
where
    S: AsRef<str> + Sync,
{
    let migrated: Vec<_> = documents
        .par_iter()
        .map(|xml| migrate(xml.as_ref(), from_uri, target))
        .collect();
    tracing::debug!(
        documents = documents.len(),
        migrated = migrated.iter().filter(|doc| doc.is_some()).count(),
        "batch namespace migration finished"
    );
    migrated
}
