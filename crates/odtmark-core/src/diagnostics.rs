//! Conversion diagnostics
//!
//! Non-fatal problems found while converting a document. They are returned
//! alongside a successful conversion; the document itself usually carries a
//! visible warning marker as well.

use serde::{Deserialize, Serialize};

/// A diagnostic message from the converter
///
/// # Example
///
/// ```
/// use odtmark_core::diagnostics::{Diagnostic, Severity};
///
/// let diag = Diagnostic::warning("Grouped drawing flattened")
///     .with_code("W0101")
///     .with_help("Export the drawing as an image instead");
/// assert_eq!(diag.severity, Severity::Warning);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level of the diagnostic
    pub severity: Severity,

    /// The diagnostic message
    pub message: String,

    /// Optional code (e.g., "W0101")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Additional help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning, part of the document was degraded
    Warning,

    /// Error, part of the document was dropped
    Error,
}

/// Codes used by the converter
pub mod codes {
    /// A grouped drawing was flattened into one SVG
    pub const GROUPED_DRAWING: &str = "W0101";
    /// A shape transform was ignored
    pub const SHAPE_TRANSFORM: &str = "W0102";
    /// A formula name could not be resolved
    pub const UNRESOLVED_FORMULA: &str = "W0103";
    /// A path command has no SVG equivalent
    pub const UNSUPPORTED_PATH_COMMAND: &str = "W0104";
    /// A formula object could not be found
    pub const MISSING_FORMULA_OBJECT: &str = "W0105";
    /// An image is not part of the package
    pub const MISSING_IMAGE: &str = "W0106";
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            code: None,
            help: None,
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create an info diagnostic
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// Set the diagnostic code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        match &self.code {
            Some(code) => write!(f, "{level}[{code}]: {}", self.message)?,
            None => write!(f, "{level}: {}", self.message)?,
        }
        if let Some(help) = &self.help {
            write!(f, "\n  = help: {help}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let diag = Diagnostic::warning("Shape transform ignored")
            .with_code(codes::SHAPE_TRANSFORM)
            .with_help("Rotate the shape in the source document");
        assert_eq!(
            diag.to_string(),
            "warning[W0102]: Shape transform ignored\n  = help: Rotate the shape in the source document"
        );
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let json = serde_json::to_string(&Diagnostic::info("done")).unwrap();
        assert_eq!(json, r#"{"severity":"info","message":"done"}"#);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Diagnostic::error("x").is_error());
    }
}
