//! odtmark-ast - Intermediate tag tree
//!
//! This crate provides the mutable tree that sits between the typed
//! OpenDocument model and the final Markdown text. The converter builds it,
//! the normalization passes rewrite it in place, and the renderer reads it.
//!
//! # Example
//!
//! ```
//! use odtmark_ast::{Payload, Tag, TagTree};
//!
//! let mut tree = TagTree::new();
//! let para = tree.append_tag(tree.root(), Tag::P, Payload::default());
//! tree.append_text(para, "Hello");
//!
//! assert_eq!(tree.text_content(para), "Hello");
//! assert!(tree.check_consistency().is_ok());
//! ```

pub mod tag;
pub mod tree;

pub use tag::{Geometry, NumberFormat, Payload, Tag};
pub use tree::{NodeId, NodeKind, TagTree};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
