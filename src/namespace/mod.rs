//! Namespace usage detection and rewriting for XML documents.
//!
//! Process-model documents declare vendor extension namespaces once and
//! then use the prefix all over the document. Moving a document from one
//! vendor namespace to another means rewriting the declaration, every
//! qualified element and attribute name, and any attribute whose value is
//! the namespace URI itself (such as `targetNamespace`).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   XML text   │
//! └──────┬───────┘
//!        ▼
//! ┌──────────────────────────────────────────────┐
//! │  document::walk  (quick-xml reader)          │
//! │  - tag + attribute spans                     │
//! │  - NamespaceScope per element                │
//! └──────┬──────────────────────────┬────────────┘
//!        ▼                          ▼
//! ┌────────────────┐       ┌─────────────────────┐
//! │  find_usages   │──────▶│  replace_usages     │
//! │  NamespaceUsage│       │  TextEdits, spliced │
//! └────────────────┘       └─────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```
//! use nsmigrate::namespace::{TargetNamespace, find_usages, known, replace_usages};
//!
//! let xml = r#"<definitions xmlns:camunda="http://camunda.org/schema/1.0/bpmn">
//!   <serviceTask camunda:class="com.example.Delegate"/>
//! </definitions>"#;
//!
//! if let Some(used) = find_usages(xml, known::CAMUNDA) {
//!     let migrated = replace_usages(xml, &used, &TargetNamespace::activiti());
//!     assert!(migrated.contains(r#"activiti:class="com.example.Delegate""#));
//! }
//! ```

mod detect;
mod document;
mod error;
pub mod known;
mod migrate;
mod model;
mod rewrite;
mod scope;
mod tag;

pub use detect::{find_usages, try_find_usages};
pub use error::NamespaceError;
pub use migrate::{find_usages_par, migrate, migrate_par};
pub use model::{NamespaceUsage, TargetNamespace, is_valid_prefix};
pub use rewrite::{replace_usages, try_replace_usages};
