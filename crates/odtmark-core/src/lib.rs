//! odtmark-core - OpenDocument to Markdown conversion
//!
//! Turns a parsed [`OdfDocument`] into Markdown in three stages:
//!
//! 1. [`converter`] walks the document model and builds a tag tree
//! 2. [`pipeline`] normalizes the tree through a fixed sequence of passes
//! 3. [`render`] serializes the tree and spaces out block macros
//!
//! # Example
//!
//! ```
//! use odtmark_core::{convert_document, ConvertOptions};
//! use odtmark_odf::test_utils::content_xml;
//! use odtmark_odf::{AssetMap, OdfDocument};
//!
//! let xml = content_xml("", r#"<text:h text:outline-level="1">Hello</text:h><text:p>World</text:p>"#);
//! let document = OdfDocument::parse(xml.as_bytes(), None)?;
//! let output = convert_document(&document, &ConvertOptions::default(), &AssetMap::new())?;
//!
//! assert_eq!(output.markdown, "# Hello\n\nWorld\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod converter;
pub mod diagnostics;
pub mod error;
pub mod macros;
pub mod pipeline;
pub mod render;
pub mod rewrite;
pub mod shape;
pub mod slug;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use odtmark_odf::{AssetExtractor, AssetMap, OdfArchive, OdfDocument};
use serde::Serialize;

pub use config::{ConfigError, ConvertOptions, RewriteRule};
pub use converter::{Conversion, Converter};
pub use diagnostics::{Diagnostic, Severity};
pub use error::{ConvertError, Result};
pub use pipeline::{PassContext, PASSES};

/// Everything a conversion produces
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutput {
    pub markdown: String,
    /// External link targets found in the document
    pub links: BTreeSet<String>,
    /// Heading bookmark id → anchor slug
    pub headings: BTreeMap<String, String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Convert an already parsed document
///
/// `assets` maps package image paths to the links written in the output;
/// images without an entry keep their package path.
pub fn convert_document(
    document: &OdfDocument,
    options: &ConvertOptions,
    assets: &AssetMap,
) -> std::result::Result<ConversionOutput, ConfigError> {
    let rules = options.compile_rules()?;
    let Conversion {
        mut tree,
        links,
        diagnostics,
    } = Converter::new(document, assets).convert();

    let mut ctx = PassContext::new(options, &rules);
    ctx.diagnostics = diagnostics;
    pipeline::run(&mut tree, &mut ctx);

    for diagnostic in &ctx.diagnostics {
        log::warn!("{diagnostic}");
    }
    Ok(ConversionOutput {
        markdown: render::to_markdown(&tree),
        links,
        headings: ctx.headings,
        diagnostics: ctx.diagnostics,
    })
}

/// Convert an archive, extracting images next to the output
///
/// With `output_dir`, images go to `output_dir/<assets_dir>` and are linked
/// relative to it. Without one nothing is written.
pub fn convert_archive(
    archive: &OdfArchive,
    options: &ConvertOptions,
    output_dir: Option<&Path>,
) -> Result<ConversionOutput> {
    let document = OdfDocument::from_archive(archive)?;
    let assets = match output_dir {
        Some(dir) => AssetExtractor::new(
            dir.join(&options.assets_dir),
            format!("{}/", options.assets_dir.trim_end_matches('/')),
        )
        .content_addressable(options.content_addressable_assets)
        .extract(archive)?,
        None => AssetMap::new(),
    };
    Ok(convert_document(&document, options, &assets)?)
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.1.0");
    }
}
