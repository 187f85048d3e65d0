//! Embedded image extraction
//!
//! Raster images under `Pictures/` are written to an assets directory. In
//! content-addressable mode each file is named after the SHA-256 of its
//! bytes, so identical images share one file and concurrent conversions
//! never overwrite each other's output with different content.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::archive::OdfArchive;
use crate::error::Result;

/// Archive path → link used in the rendered document
pub type AssetMap = BTreeMap<String, String>;

/// Writes package images to disk
#[derive(Debug, Clone)]
pub struct AssetExtractor {
    dir: PathBuf,
    link_prefix: String,
    content_addressable: bool,
}

impl AssetExtractor {
    /// Extract into `dir`; links are `link_prefix` followed by the file name
    pub fn new(dir: impl Into<PathBuf>, link_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            link_prefix: link_prefix.into(),
            content_addressable: false,
        }
    }

    /// Name files after a hash of their content
    pub fn content_addressable(mut self, enabled: bool) -> Self {
        self.content_addressable = enabled;
        self
    }

    /// Write every image in `archive`, returning how to link to each one
    pub fn extract(&self, archive: &OdfArchive) -> Result<AssetMap> {
        let mut map = AssetMap::new();
        let assets = archive.assets();
        if assets.is_empty() {
            return Ok(map);
        }

        fs::create_dir_all(&self.dir)?;
        for (path, bytes) in assets {
            let file_name = if self.content_addressable {
                content_hash_name(path, bytes)
            } else {
                base_name(path).to_string()
            };
            let target = self.dir.join(&file_name);

            if self.content_addressable && target.exists() {
                log::debug!("asset {path} already present as {file_name}");
            } else {
                write_atomic(&target, bytes)?;
            }
            map.insert(path.to_string(), format!("{}{}", self.link_prefix, file_name));
        }
        Ok(map)
    }
}

/// SHA-256 hex of `bytes` plus the extension of `path`
///
/// ```
/// use odtmark_odf::assets::content_hash_name;
/// let name = content_hash_name("Pictures/image1.PNG", b"abc");
/// assert_eq!(
///     name,
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad.png"
/// );
/// ```
pub fn content_hash_name(path: &str, bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let hex: String = hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();

    match extension(path) {
        Some(ext) => format!("{hex}.{}", ext.to_ascii_lowercase()),
        None => hex,
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn extension(path: &str) -> Option<&str> {
    base_name(path)
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

/// Write to a sibling temporary file, then rename into place
fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = target.as_os_str().to_owned();
    tmp.push(format!(".tmp{}", std::process::id()));
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes)?;
    if let Err(err) = fs::rename(&tmp, target) {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::OdtBuilder;
    use tempfile::TempDir;

    fn archive() -> OdfArchive {
        let bytes = OdtBuilder::new()
            .file("Pictures/first.png", b"same")
            .file("Pictures/second.png", b"same")
            .file("Pictures/photo.JPG", b"other")
            .build()
            .unwrap();
        OdfArchive::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_extract_keeps_names() {
        let dir = TempDir::new().unwrap();
        let map = AssetExtractor::new(dir.path(), "assets/")
            .extract(&archive())
            .unwrap();

        assert_eq!(map["Pictures/first.png"], "assets/first.png");
        assert_eq!(map["Pictures/photo.JPG"], "assets/photo.JPG");
        assert_eq!(fs::read(dir.path().join("second.png")).unwrap(), b"same");
    }

    #[test]
    fn test_content_addressable_deduplicates() {
        let dir = TempDir::new().unwrap();
        let map = AssetExtractor::new(dir.path(), "")
            .content_addressable(true)
            .extract(&archive())
            .unwrap();

        assert_eq!(map["Pictures/first.png"], map["Pictures/second.png"]);
        assert!(map["Pictures/photo.JPG"].ends_with(".jpg"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_no_images_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("assets");
        let map = AssetExtractor::new(&target, "assets/")
            .extract(&OdfArchive::from_bytes(&OdtBuilder::new().build().unwrap()).unwrap())
            .unwrap();

        assert!(map.is_empty());
        assert!(!target.exists());
    }
}
