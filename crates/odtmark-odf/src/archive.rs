//! Archive handling for ODT files
//!
//! ODT files are ZIP archives containing `content.xml`, `styles.xml`,
//! embedded formula objects (`Object 1/content.xml`) and binary assets
//! (usually under `Pictures/`).

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use zip::read::ZipArchive;

use crate::error::{OdfError, Result};

/// Entry holding the document body
pub const CONTENT_XML: &str = "content.xml";

/// Entry holding the named style catalog
pub const STYLES_XML: &str = "styles.xml";

/// Represents an unpacked ODT package
#[derive(Debug)]
pub struct OdfArchive {
    /// All files in the archive, keyed by path
    files: HashMap<String, Vec<u8>>,
}

impl OdfArchive {
    /// Open and unpack an ODT file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Unpack an ODT held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(std::io::Cursor::new(bytes))
    }

    /// Create from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut files = HashMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            // Skip directories
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)
                .map_err(|_| OdfError::CorruptedEntry(name.clone()))?;
            files.insert(name, contents);
        }

        Ok(Self { files })
    }

    /// Get a file's contents by path
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    /// Get the document body (content.xml)
    pub fn content_xml(&self) -> Result<&[u8]> {
        self.get(CONTENT_XML)
            .ok_or_else(|| OdfError::MissingFile(CONTENT_XML.to_string()))
    }

    /// Get the style catalog (styles.xml), absent in some minimal exports
    pub fn styles_xml(&self) -> Option<&[u8]> {
        self.get(STYLES_XML)
    }

    /// Embedded objects that carry their own `content.xml`
    ///
    /// Returns `(object name, content.xml bytes)` pairs, e.g. `("Object 1", ..)`.
    pub fn objects(&self) -> Vec<(&str, &[u8])> {
        let mut objects: Vec<(&str, &[u8])> = self
            .files
            .iter()
            .filter_map(|(path, bytes)| {
                let dir = path.strip_suffix("/content.xml")?;
                (!dir.contains('/')).then_some((dir, bytes.as_slice()))
            })
            .collect();
        objects.sort_by(|a, b| a.0.cmp(b.0));
        objects
    }

    /// Binary assets embedded in the package, sorted by path
    pub fn assets(&self) -> Vec<(&str, &[u8])> {
        let mut assets: Vec<(&str, &[u8])> = self
            .files
            .iter()
            .filter(|(path, _)| is_asset_path(path))
            .map(|(path, bytes)| (path.as_str(), bytes.as_slice()))
            .collect();
        assets.sort_by(|a, b| a.0.cmp(b.0));
        assets
    }

    /// Check if a file exists in the archive
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// List all files in the archive
    pub fn file_list(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|s| s.as_str())
    }
}

fn is_asset_path(path: &str) -> bool {
    const EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "svg", "webp", "bmp", "tiff"];
    if !(path.starts_with("Pictures/") || path.starts_with("media/")) {
        return false;
    }
    path.rsplit_once('.')
        .map(|(_, ext)| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::OdtBuilder;

    #[test]
    fn test_missing_content_xml() {
        let bytes = OdtBuilder::new().without_content().build().unwrap();
        let archive = OdfArchive::from_bytes(&bytes).unwrap();
        let err = archive.content_xml().unwrap_err();
        assert!(matches!(err, OdfError::MissingFile(_)));
    }

    #[test]
    fn test_garbage_is_reported_as_corrupted() {
        let err = OdfArchive::from_bytes(b"definitely not a zip file").unwrap_err();
        assert!(err.is_corrupted());
        assert!(err.to_string().contains("corrupted archive"));
    }

    #[test]
    fn test_assets_and_objects_are_listed() {
        let bytes = OdtBuilder::new()
            .file("Pictures/b.png", b"png-bytes")
            .file("Pictures/a.jpg", b"jpg-bytes")
            .file("Pictures/readme.txt", b"not an image")
            .file("Object 1/content.xml", b"<math/>")
            .build()
            .unwrap();
        let archive = OdfArchive::from_bytes(&bytes).unwrap();

        let assets: Vec<_> = archive.assets().into_iter().map(|(p, _)| p).collect();
        assert_eq!(assets, vec!["Pictures/a.jpg", "Pictures/b.png"]);

        let objects: Vec<_> = archive.objects().into_iter().map(|(n, _)| n).collect();
        assert_eq!(objects, vec!["Object 1"]);
    }
}
