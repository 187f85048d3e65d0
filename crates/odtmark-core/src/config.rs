//! Conversion options
//!
//! Options are plain serde structs so they can be loaded from an
//! `odtmark.toml` file or passed inline through the worker protocol.
//!
//! ```toml
//! content_addressable_assets = true
//!
//! [[rewrite_rules]]
//! tag = "a"
//! match = "^https://jira\\.example\\.com/browse/"
//! capture = "([A-Z]+-[0-9]+)$"
//! replace = "{{< jira \"$value\" >}}"
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rewrite::CompiledRule;

/// Errors in user-supplied configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML document is malformed or has wrong types
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// A rewrite rule regex does not compile
    #[error("invalid rewrite rule pattern: {0}")]
    Regex(#[from] regex::Error),

    /// A rewrite rule filters on a tag that is not rewritable
    #[error("rewrite rules apply to `a` and `img`, not `{0}`")]
    UnknownTag(String),
}

/// Options for one conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Link/image rewrite rules, first match wins
    pub rewrite_rules: Vec<RewriteRule>,
    /// Paragraph text that opens a code block; empty disables detection
    pub code_block_start: String,
    /// Paragraph text that closes a code block; empty disables detection
    pub code_block_end: String,
    /// Directory for extracted images, relative to the output file
    pub assets_dir: String,
    /// Name extracted images after a hash of their content
    pub content_addressable_assets: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            rewrite_rules: Vec::new(),
            code_block_start: String::new(),
            code_block_end: String::new(),
            assets_dir: "assets".to_string(),
            content_addressable_assets: false,
        }
    }
}

impl ConvertOptions {
    /// Parse options from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Compile the rewrite rules, rejecting bad patterns up front
    pub fn compile_rules(&self) -> Result<Vec<CompiledRule>, ConfigError> {
        self.rewrite_rules.iter().map(CompiledRule::new).collect()
    }

    /// Whether the code-block sentinel merge is active
    pub fn code_sentinels(&self) -> Option<(&str, &str)> {
        let start = self.code_block_start.trim();
        let end = self.code_block_end.trim();
        (!start.is_empty() && !end.is_empty()).then_some((start, end))
    }
}

/// One user rewrite rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    /// `a` or `img`; any rewritable tag when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Regex tested against the target URL
    #[serde(rename = "match")]
    pub pattern: String,
    /// Regex whose first group (or whole match) becomes `$value`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<String>,
    /// Replacement template with `$href`, `$basename`, `$label`, `$value`
    pub replace: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let options = ConvertOptions::from_toml_str("").unwrap();
        assert_eq!(options, ConvertOptions::default());
        assert_eq!(options.assets_dir, "assets");
        assert!(options.code_sentinels().is_none());
    }

    #[test]
    fn test_rules_parse() {
        let toml = r#"
content_addressable_assets = true

[[rewrite_rules]]
tag = "img"
match = "\\.svg$"
replace = "{{< figure src=\"$href\" >}}"

[[rewrite_rules]]
match = "^https://"
replace = "$label"
"#;
        let options = ConvertOptions::from_toml_str(toml).unwrap();
        assert!(options.content_addressable_assets);
        assert_eq!(options.rewrite_rules.len(), 2);
        assert_eq!(options.rewrite_rules[0].tag.as_deref(), Some("img"));
        assert_eq!(options.rewrite_rules[1].pattern, "^https://");
        assert_eq!(options.compile_rules().unwrap().len(), 2);
    }

    #[test]
    fn test_bad_rules_are_rejected() {
        let mut options = ConvertOptions::default();
        options.rewrite_rules.push(RewriteRule {
            tag: None,
            pattern: "(unclosed".to_string(),
            capture: None,
            replace: String::new(),
        });
        assert!(matches!(options.compile_rules(), Err(ConfigError::Regex(_))));

        options.rewrite_rules[0].pattern = ".".to_string();
        options.rewrite_rules[0].tag = Some("p".to_string());
        assert!(matches!(options.compile_rules(), Err(ConfigError::UnknownTag(_))));
    }

    #[test]
    fn test_wrong_type_is_a_toml_error() {
        let err = ConvertOptions::from_toml_str("content_addressable_assets = \"yes\"").unwrap_err();
        assert!(err.to_string().starts_with("invalid configuration"));
    }

    #[test]
    fn test_sentinels() {
        let options = ConvertOptions {
            code_block_start: "```".to_string(),
            code_block_end: "```".to_string(),
            ..Default::default()
        };
        assert_eq!(options.code_sentinels(), Some(("```", "```")));
    }
}
