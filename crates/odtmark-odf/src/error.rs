//! Error types for OpenDocument operations

use thiserror::Error;

/// Errors that can occur while reading an OpenDocument package
#[derive(Error, Debug)]
pub enum OdfError {
    /// The zip container could not be read
    #[error("corrupted archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// An archive entry could not be decompressed
    #[error("corrupted archive: entry {0} is unreadable")]
    CorruptedEntry(String),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Required file not found in archive
    #[error("Required file not found: {0}")]
    MissingFile(String),

    /// The document does not start with the expected root element
    #[error("Missing root element: expected <{0}>")]
    MissingRoot(String),

    /// A schema refers to a type that was never registered
    #[error("Unknown schema type: {0}")]
    UnknownType(String),
}

impl OdfError {
    /// Whether the source file itself is damaged and should not be retried
    pub fn is_corrupted(&self) -> bool {
        matches!(self, OdfError::Archive(_) | OdfError::CorruptedEntry(_))
    }
}

/// Result type for OpenDocument operations
pub type Result<T> = std::result::Result<T, OdfError>;
