//! Shared test utilities for odtmark-odf
//!
//! Builds ODT packages in memory so tests can exercise the archive reader
//! and the parsers without fixture files on disk.

use std::io::{Cursor, Write};

use zip::result::ZipResult;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const NAMESPACES: &str = concat!(
    r#"xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" "#,
    r#"xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0" "#,
    r#"xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" "#,
    r#"xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" "#,
    r#"xmlns:draw="urn:oasis:names:tc:opendocument:xmlns:drawing:1.0" "#,
    r#"xmlns:fo="urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0" "#,
    r#"xmlns:xlink="http://www.w3.org/1999/xlink" "#,
    r#"xmlns:svg="urn:oasis:names:tc:opendocument:xmlns:svg-compatible:1.0" "#,
    r#"xmlns:math="http://www.w3.org/1998/Math/MathML""#,
);

/// Wrap automatic styles and body content into a `content.xml` document
///
/// # Example
/// ```
/// use odtmark_odf::test_utils::content_xml;
/// let xml = content_xml("", "<text:p>Hello</text:p>");
/// assert!(xml.contains("<office:text><text:p>Hello</text:p></office:text>"));
/// ```
pub fn content_xml(automatic_styles: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><office:document-content {NAMESPACES} office:version="1.2"><office:automatic-styles>{automatic_styles}</office:automatic-styles><office:body><office:text>{body}</office:text></office:body></office:document-content>"#
    )
}

/// Wrap named styles into a `styles.xml` document
pub fn styles_xml(font_faces: &str, styles: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><office:document-styles {NAMESPACES} office:version="1.2"><office:font-face-decls>{font_faces}</office:font-face-decls><office:styles>{styles}</office:styles></office:document-styles>"#
    )
}

/// In-memory ODT package builder
#[derive(Debug, Clone)]
pub struct OdtBuilder {
    content: Option<String>,
    styles: Option<String>,
    files: Vec<(String, Vec<u8>)>,
}

impl OdtBuilder {
    /// Package with an empty body and an empty style catalog
    pub fn new() -> Self {
        Self {
            content: Some(content_xml("", "")),
            styles: Some(styles_xml("", "")),
            files: Vec::new(),
        }
    }

    /// Replace `content.xml`
    pub fn content(mut self, xml: impl Into<String>) -> Self {
        self.content = Some(xml.into());
        self
    }

    /// Replace `styles.xml`
    pub fn styles(mut self, xml: impl Into<String>) -> Self {
        self.styles = Some(xml.into());
        self
    }

    /// Leave `content.xml` out of the package
    pub fn without_content(mut self) -> Self {
        self.content = None;
        self
    }

    /// Leave `styles.xml` out of the package
    pub fn without_styles(mut self) -> Self {
        self.styles = None;
        self
    }

    /// Add an arbitrary entry
    pub fn file(mut self, path: impl Into<String>, bytes: &[u8]) -> Self {
        self.files.push((path.into(), bytes.to_vec()));
        self
    }

    /// Produce the zip bytes
    pub fn build(self) -> ZipResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        zip.start_file("mimetype", options)?;
        zip.write_all(b"application/vnd.oasis.opendocument.text")?;

        if let Some(content) = &self.content {
            zip.start_file("content.xml", options)?;
            zip.write_all(content.as_bytes())?;
        }
        if let Some(styles) = &self.styles {
            zip.start_file("styles.xml", options)?;
            zip.write_all(styles.as_bytes())?;
        }
        for (path, bytes) in &self.files {
            zip.start_file(path.as_str(), options)?;
            zip.write_all(bytes)?;
        }

        zip.finish()?;
        Ok(buffer.into_inner())
    }
}

impl Default for OdtBuilder {
    fn default() -> Self {
        Self::new()
    }
}
