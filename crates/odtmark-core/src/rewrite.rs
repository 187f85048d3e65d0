//! User rewrite rules for links and images

use std::sync::OnceLock;

use odtmark_ast::Tag;
use regex::{Captures, Regex};

use crate::config::{ConfigError, RewriteRule};

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$(href|basename|label|value)").unwrap())
}

/// A rewrite rule with its patterns compiled
#[derive(Debug, Clone)]
pub struct CompiledRule {
    tag: Option<Tag>,
    pattern: Regex,
    capture: Option<Regex>,
    template: String,
}

impl CompiledRule {
    pub fn new(rule: &RewriteRule) -> Result<Self, ConfigError> {
        let tag = match rule.tag.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None => None,
            Some("a") => Some(Tag::A),
            Some("img") => Some(Tag::Img),
            Some(other) => return Err(ConfigError::UnknownTag(other.to_string())),
        };
        Ok(Self {
            tag,
            pattern: Regex::new(&rule.pattern)?,
            capture: rule.capture.as_deref().map(Regex::new).transpose()?,
            template: rule.replace.clone(),
        })
    }

    /// Replacement text for a node, or `None` when the rule does not apply
    pub fn apply(&self, tag: Tag, href: &str, label: &str) -> Option<String> {
        if self.tag.is_some_and(|t| t != tag) {
            return None;
        }
        let matched = self.pattern.captures(href)?;
        let value = match &self.capture {
            Some(capture) => first_group(&capture.captures(href)?),
            None => first_group(&matched),
        };

        let basename = basename(href);
        let text = placeholder_regex().replace_all(&self.template, |caps: &Captures| {
            match &caps[1] {
                "href" => href.to_string(),
                "basename" => basename.to_string(),
                "label" => label.to_string(),
                _ => value.clone(),
            }
        });
        Some(text.into_owned())
    }
}

fn first_group(caps: &Captures) -> String {
    caps.get(1)
        .or_else(|| caps.get(0))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Last path segment of a URL, without query or fragment
fn basename(href: &str) -> &str {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
}
