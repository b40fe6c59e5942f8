//! Foundation types shared by the namespace detector and rewriter.
//!
//! This module provides:
//! - [`TextRange`], [`TextSize`] - byte offsets into a document
//! - [`Position`] - 0-indexed line/column for diagnostics
//! - [`TextEdit`], [`apply_edits`] - splicing replacements into source text
//!
//! This module has NO dependencies on other nsmigrate modules.

mod edit;
mod position;

pub use edit::{TextEdit, apply_edits};
pub use position::Position;

// Re-export text-size types for convenience
pub use text_size;
pub use text_size::{TextRange, TextSize};
