//! OpenDocument text package reading for odtmark
//!
//! Unpacks `.odt` archives, deserializes `content.xml`, `styles.xml` and
//! formula objects into a typed document model through a declarative schema
//! registry, resolves styles, and extracts embedded images.
//!
//! # Example
//!
//! ```no_run
//! use odtmark_odf::{OdfArchive, OdfDocument, StyleResolver};
//!
//! let archive = OdfArchive::open("notes.odt")?;
//! let document = OdfDocument::from_archive(&archive)?;
//! let styles = StyleResolver::new(&document);
//! let heading = styles.resolve("Heading_20_1");
//! # Ok::<(), odtmark_odf::OdfError>(())
//! ```

pub mod archive;
pub mod assets;
pub mod document;
pub mod error;
pub mod model;
pub mod schema;
pub mod styles;
pub mod unmarshal;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use archive::OdfArchive;
pub use assets::{AssetExtractor, AssetMap};
pub use document::OdfDocument;
pub use error::{OdfError, Result};
pub use schema::{ElementSchema, Record, SchemaRegistry};
pub use styles::StyleResolver;
pub use unmarshal::Unmarshaller;
