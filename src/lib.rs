//! # nsmigrate
//!
//! Detect and rewrite XML namespace usages in process-model documents.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! namespace → usage detection, rewriting, batch migration
//!   ↓
//! base      → Primitives (TextRange, Position, TextEdit)
//! ```

/// Foundation types: TextRange, Position, TextEdit
pub mod base;

/// Namespace usage detection and rewriting
pub mod namespace;

// Re-export the detect/rewrite entry points
pub use namespace::{
    NamespaceError, NamespaceUsage, TargetNamespace, find_usages, migrate, replace_usages,
    try_find_usages, try_replace_usages,
};
