//! Usage rewriting: move every usage of one namespace to another.
//!
//! The rewriter never re-serializes the document. It records [`TextEdit`]s
//! against the original text while walking the tags and splices them in a
//! single pass, so everything it does not touch stays byte-for-byte equal.
//!
//! Per tag, in document order:
//!
//! ```text
//! <camunda:taskListener xmlns:camunda="U" camunda:class="x" ns="U">
//!  ^^^^^^^ prefix        ^^^^^^^^^^^^^^^^ ^^^^^^^            ^
//!  qualified name        declaration      qualified name     value == U
//! ```

use std::borrow::Cow;

use quick_xml::escape::escape;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::document::{Attribute, Declaration, EndTag, StartTag, TagVisitor, walk};
use super::error::NamespaceError;
use super::model::{NamespaceUsage, TargetNamespace};
use super::scope::{DEFAULT_PREFIX, NamespaceScope};
use crate::base::{TextEdit, apply_edits};

/// Rewrite every usage of `used.uri` in `xml` to `target`.
///
/// Malformed input and unusable targets leave the document unchanged; use
/// [`try_replace_usages`] to observe those errors.
///
/// ```
/// use nsmigrate::namespace::{NamespaceUsage, TargetNamespace, known, replace_usages};
///
/// let xml = r#"<definitions xmlns:camunda="http://camunda.org/schema/1.0/bpmn"><camunda:a/></definitions>"#;
/// let used = NamespaceUsage::new(known::CAMUNDA, ["camunda"]);
///
/// assert_eq!(
///     replace_usages(xml, &used, &TargetNamespace::activiti()),
///     r#"<definitions xmlns:activiti="http://activiti.org/bpmn"><activiti:a/></definitions>"#
/// );
/// ```
pub fn replace_usages(xml: &str, used: &NamespaceUsage, target: &TargetNamespace) -> String {
    match try_replace_usages(xml, used, target) {
        Ok(rewritten) => rewritten,
        Err(err) => {
            tracing::warn!(%err, uri = %used.uri, "leaving document unchanged");
            xml.to_string()
        }
    }
}

/// Like [`replace_usages`], reporting malformed input, an invalid target
/// prefix, and rewrites that would change what an untouched name means (or
/// bind a renamed one elsewhere) as errors.
pub fn try_replace_usages(
    xml: &str,
    used: &NamespaceUsage,
    target: &TargetNamespace,
) -> Result<String, NamespaceError> {
    target.validate()?;

    let mut rewriter = UsageRewriter::new(used, target);
    walk(xml, &mut rewriter)?;
    if let Some(conflict) = rewriter.conflict {
        return Err(conflict);
    }

    tracing::debug!(
        from = %used.uri,
        to = %target.uri,
        edits = rewriter.edits.len(),
        "rewriting namespace usages"
    );
    Ok(apply_edits(xml, rewriter.edits))
}

struct UsageRewriter<'u> {
    used: &'u NamespaceUsage,
    prefixes: FxHashSet<&'u str>,
    target: &'u TargetNamespace,
    declaration_name: String,
    escaped_uri: Cow<'u, str>,
    edits: Vec<TextEdit>,
    /// Bindings as they read once the edits are applied.
    rewritten: NamespaceScope,
    conflict: Option<NamespaceError>,
}

impl<'u> UsageRewriter<'u> {
    fn new(used: &'u NamespaceUsage, target: &'u TargetNamespace) -> Self {
        let declaration_name = if target.is_default() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", target.prefix)
        };
        Self {
            used,
            prefixes: used.prefixes.iter().map(SmolStr::as_str).collect(),
            target,
            declaration_name,
            escaped_uri: escape(target.uri.as_str()),
            edits: Vec::new(),
            rewritten: NamespaceScope::new(),
            conflict: None,
        }
    }

    /// Whether `prefix` is one being migrated and means `used.uri` here.
    fn migrates(&self, prefix: &str, scope: &NamespaceScope) -> bool {
        self.prefixes.contains(prefix) && scope.is_bound_to(prefix, &self.used.uri)
    }

    fn record_conflict(&mut self, error: NamespaceError) {
        if self.conflict.is_none() {
            self.conflict = Some(error);
        }
    }

    /// Replace the `prefix` of the qualified name at `name`.
    fn rename_prefix(&mut self, name: TextRange, prefix: &str) {
        let prefix_len = TextSize::of(prefix);
        if self.target.is_default() {
            // drop `prefix:` entirely
            let range = TextRange::at(name.start(), prefix_len + TextSize::of(':'));
            self.edits.push(TextEdit::delete(range));
        } else if prefix != self.target.prefix {
            let range = TextRange::at(name.start(), prefix_len);
            self.edits
                .push(TextEdit::replace(range, self.target.prefix.as_str()));
        }
    }

    /// `name` with its migrated `prefix` swapped for the target's.
    fn renamed<'a>(&self, name: &'a str, prefix: &str) -> Cow<'a, str> {
        let local = &name[prefix.len() + 1..];
        if self.target.is_default() {
            Cow::Borrowed(local)
        } else {
            Cow::Owned(format!("{}:{local}", self.target.prefix))
        }
    }

    /// A renamed name has to resolve to the target URI after the rewrite.
    fn check_renamed(&mut self) {
        let bound = self.rewritten.resolve(self.target.prefix.as_str());
        if bound != Some(self.target.uri.as_str()) {
            let error = NamespaceError::conflicting_declaration(
                self.declaration_name.as_str(),
                bound.unwrap_or_default(),
            );
            self.record_conflict(error);
        }
    }

    /// A name left as written keeps its URI, unless that URI is the one
    /// being migrated and it now resolves to the target.
    fn check_unchanged(&mut self, prefix: &str, scope: &NamespaceScope) {
        let Some(before) = scope.resolve(prefix) else {
            return;
        };
        let after = self.rewritten.resolve(prefix);
        let migrated = before == self.used.uri && after == Some(self.target.uri.as_str());
        if after != Some(before) && !migrated {
            let error =
                NamespaceError::conflicting_declaration(self.declaration_name.as_str(), before);
            self.record_conflict(error);
        }
    }

    fn replace_value(&mut self, value: TextRange, current: &str) {
        if current != self.target.uri {
            self.edits
                .push(TextEdit::replace(value, self.escaped_uri.as_ref()));
        }
    }

    /// Rewrite the declarations of `tag`, returning its bindings as they
    /// read afterwards.
    fn rewrite_declarations(&mut self, tag: &StartTag<'_>) -> Vec<(SmolStr, String)> {
        let (used, target) = (self.used, self.target);
        let mut frame = Vec::new();
        let mut migrated = Vec::new();
        for (index, attr) in tag.attributes.iter().enumerate() {
            match attr.declaration() {
                Some(Declaration::Prefixed(prefix))
                    if self.prefixes.contains(prefix) && attr.value == used.uri =>
                {
                    migrated.push(index);
                }
                Some(Declaration::Prefixed(prefix)) => {
                    frame.push((SmolStr::new(prefix), attr.value.clone()));
                }
                Some(Declaration::Default) if attr.value == used.uri => {
                    self.replace_value(attr.span.value, &attr.value);
                    frame.push((SmolStr::new(DEFAULT_PREFIX), target.uri.clone()));
                }
                Some(Declaration::Default) => {
                    frame.push((SmolStr::new(DEFAULT_PREFIX), attr.value.clone()));
                }
                None => {}
            }
        }
        let Some((&first, rest)) = migrated.split_first() else {
            return frame;
        };

        // what the target declaration name already binds on this tag
        let existing = tag
            .attributes
            .iter()
            .enumerate()
            .find(|(index, attr)| !migrated.contains(index) && attr.name == self.declaration_name)
            .map(|(_, attr)| match attr.declaration() {
                Some(Declaration::Default) if attr.value == used.uri => target.uri.as_str(),
                _ => attr.value.as_str(),
            });
        match existing {
            Some(uri) if uri != target.uri => {
                let error =
                    NamespaceError::conflicting_declaration(self.declaration_name.as_str(), uri);
                self.record_conflict(error);
                return frame;
            }
            Some(_) => self.edits.push(TextEdit::delete(tag.attributes[first].span.full)),
            None => self.rewrite_declaration(&tag.attributes[first]),
        }
        for &index in rest {
            // an earlier declaration on this tag already became the target
            self.edits.push(TextEdit::delete(tag.attributes[index].span.full));
        }

        frame.push((target.prefix.clone(), target.uri.clone()));
        frame
    }

    fn rewrite_declaration(&mut self, attr: &Attribute<'_>) {
        if attr.name != self.declaration_name {
            self.edits
                .push(TextEdit::replace(attr.span.name, self.declaration_name.as_str()));
        }
        self.replace_value(attr.span.value, &attr.value);
    }
}

impl TagVisitor for UsageRewriter<'_> {
    fn start_tag(&mut self, tag: &StartTag<'_>, scope: &NamespaceScope) {
        let frame = self.rewrite_declarations(tag);
        self.rewritten.push(frame);

        match tag.prefix() {
            Some(prefix) if self.migrates(prefix, scope) => {
                self.rename_prefix(tag.name_range, prefix);
                self.check_renamed();
            }
            prefix => self.check_unchanged(prefix.unwrap_or(DEFAULT_PREFIX), scope),
        }

        let mut names: FxHashSet<Cow<'_, str>> = FxHashSet::default();
        for attr in tag.attributes.iter().filter(|attr| !attr.is_declaration()) {
            let name = match attr.prefix() {
                Some(prefix) if self.migrates(prefix, scope) => {
                    self.rename_prefix(attr.span.name, prefix);
                    // unprefixed attributes belong to no namespace
                    if !self.target.is_default() {
                        self.check_renamed();
                    }
                    self.renamed(attr.name, prefix)
                }
                Some(prefix) => {
                    self.check_unchanged(prefix, scope);
                    Cow::Borrowed(attr.name)
                }
                None => Cow::Borrowed(attr.name),
            };
            if names.contains(&name) {
                self.record_conflict(NamespaceError::duplicate_attribute(name.as_ref()));
            } else {
                names.insert(name);
            }

            if attr.value == self.used.uri {
                self.replace_value(attr.span.value, &attr.value);
            }
        }

        if tag.is_empty {
            self.rewritten.pop();
        }
    }

    fn end_tag(&mut self, tag: &EndTag<'_>, scope: &NamespaceScope) {
        if let Some(prefix) = tag.prefix().filter(|p| self.migrates(p, scope)) {
            self.rename_prefix(tag.name_range, prefix);
        }
        self.rewritten.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FROM: &str = "urn:from";
    const TO: &str = "urn:to";

    fn rewrite(xml: &str, prefixes: &[&str], prefix: &str) -> String {
        let used = NamespaceUsage::new(FROM, prefixes.iter().copied());
        let target = TargetNamespace::new(prefix, TO).expect("valid target");
        try_replace_usages(xml, &used, &target).expect("rewrite")
    }

    #[test]
    fn test_rewrites_declaration_names_and_end_tags() {
        let xml = r#"<r xmlns:f="urn:from"><f:a f:b="1">t</f:a></r>"#;
        assert_eq!(
            rewrite(xml, &["f"], "t"),
            r#"<r xmlns:t="urn:to"><t:a t:b="1">t</t:a></r>"#
        );
    }

    #[test]
    fn test_empty_target_prefix_strips_prefix() {
        let xml = r#"<r xmlns:f="urn:from"><f:a f:b="1"/></r>"#;
        assert_eq!(
            rewrite(xml, &["f"], ""),
            r#"<r xmlns="urn:to"><a b="1"/></r>"#
        );
    }

    #[test]
    fn test_shadowed_prefix_is_left_alone() {
        let xml = r#"<r xmlns:f="urn:from"><f:a xmlns:f="urn:other"><f:b/></f:a><f:c/></r>"#;
        assert_eq!(
            rewrite(xml, &["f"], "t"),
            r#"<r xmlns:t="urn:to"><f:a xmlns:f="urn:other"><f:b/></f:a><t:c/></r>"#
        );
    }

    #[test]
    fn test_duplicate_target_declaration_is_collapsed() {
        let xml = r#"<r xmlns:f="urn:from" xmlns:g="urn:from"><g:a/></r>"#;
        assert_eq!(
            rewrite(xml, &["f", "g"], "t"),
            r#"<r xmlns:t="urn:to"><t:a/></r>"#
        );
    }

    #[test]
    fn test_existing_target_declaration_is_kept() {
        let xml = r#"<r xmlns:t="urn:to" xmlns:f="urn:from"><f:a/></r>"#;
        assert_eq!(
            rewrite(xml, &["f"], "t"),
            r#"<r xmlns:t="urn:to"><t:a/></r>"#
        );
    }

    #[test]
    fn test_conflicting_target_declaration_is_error() {
        let xml = r#"<r xmlns:t="urn:elsewhere" xmlns:f="urn:from"><f:a/></r>"#;
        let used = NamespaceUsage::new(FROM, ["f"]);
        let target = TargetNamespace::new("t", TO).expect("valid target");
        assert_eq!(
            try_replace_usages(xml, &used, &target),
            Err(NamespaceError::conflicting_declaration("xmlns:t", "urn:elsewhere"))
        );
        assert_eq!(replace_usages(xml, &used, &target), xml);
    }

    fn try_rewrite(xml: &str, prefixes: &[&str], prefix: &str) -> Result<String, NamespaceError> {
        let used = NamespaceUsage::new(FROM, prefixes.iter().copied());
        let target = TargetNamespace::new(prefix, TO).expect("valid target");
        try_replace_usages(xml, &used, &target)
    }

    #[test]
    fn test_renamed_name_under_nested_target_binding_is_error() {
        let xml = r#"<r xmlns:c="urn:from"><x xmlns:t="urn:other"><c:a/><t:keep/></x></r>"#;
        assert_eq!(
            try_rewrite(xml, &["c"], "t"),
            Err(NamespaceError::conflicting_declaration("xmlns:t", "urn:other"))
        );

        let xml = r#"<r xmlns:c="urn:from"><x xmlns="urn:other"><c:a/></x></r>"#;
        assert_eq!(
            try_rewrite(xml, &["c"], ""),
            Err(NamespaceError::conflicting_declaration("xmlns", "urn:other"))
        );
    }

    #[test]
    fn test_rewritten_declaration_shadowing_outer_target_is_error() {
        let xml = r#"<r xmlns:t="urn:other"><x xmlns:c="urn:from"><c:a/><t:keep/></x></r>"#;
        assert_eq!(
            try_rewrite(xml, &["c"], "t"),
            Err(NamespaceError::conflicting_declaration("xmlns:t", "urn:other"))
        );

        let used = NamespaceUsage::new(FROM, ["c"]);
        let target = TargetNamespace::new("t", TO).expect("valid target");
        assert_eq!(replace_usages(xml, &used, &target), xml);
    }

    #[test]
    fn test_outer_target_binding_to_same_uri_is_fine() {
        let xml = r#"<r xmlns:t="urn:to"><x xmlns:c="urn:from"><c:a/><t:keep/></x></r>"#;
        assert_eq!(
            try_rewrite(xml, &["c"], "t"),
            Ok(r#"<r xmlns:t="urn:to"><x xmlns:t="urn:to"><t:a/><t:keep/></x></r>"#.to_string())
        );
    }

    #[test]
    fn test_default_declaration_of_uri_is_rewritten() {
        let xml = r#"<r xmlns:c="urn:from"><c:a/><b xmlns="urn:from"><task/></b></r>"#;
        let rewritten = rewrite(xml, &["c"], "t");
        assert_eq!(
            rewritten,
            r#"<r xmlns:t="urn:to"><t:a/><b xmlns="urn:to"><task/></b></r>"#
        );
        assert_eq!(crate::namespace::find_usages(&rewritten, FROM), None);
    }

    #[test]
    fn test_default_declaration_merges_with_default_target() {
        let xml = r#"<r xmlns="urn:from" xmlns:c="urn:from"><c:a/><b/></r>"#;
        assert_eq!(rewrite(xml, &["c"], ""), r#"<r xmlns="urn:to"><a/><b/></r>"#);
    }

    #[test]
    fn test_stripped_prefix_clashing_with_attribute_is_error() {
        let xml = r#"<r xmlns:c="urn:from"><a class="x" c:class="y"/></r>"#;
        assert_eq!(
            try_rewrite(xml, &["c"], ""),
            Err(NamespaceError::duplicate_attribute("class"))
        );

        let xml = r#"<r xmlns:c="urn:from" xmlns:d="urn:from"><a c:x="1" d:x="2"/></r>"#;
        assert_eq!(
            try_rewrite(xml, &["c", "d"], "t"),
            Err(NamespaceError::duplicate_attribute("t:x"))
        );
    }

    #[test]
    fn test_value_reference_escaped() {
        let used = NamespaceUsage::value_only(FROM);
        let target = TargetNamespace::new("t", "urn:a&b").expect("valid target");
        let xml = r#"<r ns="urn:from" other="urn:from:x"/>"#;
        assert_eq!(
            replace_usages(xml, &used, &target),
            r#"<r ns="urn:a&amp;b" other="urn:from:x"/>"#
        );
    }

    #[test]
    fn test_same_target_is_identity() {
        let xml = "<r xmlns:f='urn:from' a='urn:from'>\n  <f:a f:x=\"&apos;\"/>\n</r>";
        let used = NamespaceUsage::new(FROM, ["f"]);
        let target = TargetNamespace::new("f", FROM).expect("valid target");
        assert_eq!(replace_usages(xml, &used, &target), xml);
    }

    #[test]
    fn test_invalid_target_prefix_is_error() {
        let used = NamespaceUsage::new(FROM, ["f"]);
        let target = TargetNamespace {
            prefix: SmolStr::new("1bad"),
            uri: TO.to_string(),
        };
        let xml = r#"<r xmlns:f="urn:from"/>"#;
        assert!(try_replace_usages(xml, &used, &target).is_err());
        assert_eq!(replace_usages(xml, &used, &target), xml);
    }
}
