//! Error types for conversions

use odtmark_odf::OdfError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that abort a conversion
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The package could not be read or parsed
    #[error(transparent)]
    Odf(#[from] OdfError),

    /// The conversion options are invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ConvertError {
    /// Whether the source file is damaged beyond conversion
    pub fn is_corrupted(&self) -> bool {
        matches!(self, ConvertError::Odf(err) if err.is_corrupted())
    }
}

/// Result type for conversions
pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corruption_passes_through() {
        let err = ConvertError::from(OdfError::CorruptedEntry("content.xml".into()));
        assert!(err.is_corrupted());
        assert!(err.to_string().contains("corrupted archive"));

        let err = ConvertError::from(OdfError::MissingFile("content.xml".into()));
        assert!(!err.is_corrupted());
        let err = ConvertError::from(ConfigError::UnknownTag("p".into()));
        assert!(!err.is_corrupted());
    }
}
