//! Shortcode macros
//!
//! Documents may embed `{{...}}` templating directives such as
//! `{{% note %}}`, `{{< figure src="x" >}}` or `{{% /note %}}`. They pass
//! through conversion verbatim; these helpers recognise them so the
//! normalization passes and the final line pass can keep them intact.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

/// Macro names whose body is passed through without Markdown styling
const PASSTHROUGH: [&str; 2] = ["markdown", "raw"];

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{.*?\}\}").unwrap())
}

fn shortcode_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\{\{\s*([%<])\s*(/)?\s*([A-Za-z0-9_.\-]+)(.*?)\s*[%>]\s*\}\}$").unwrap()
    })
}

fn opener_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*[%<]").unwrap())
}

fn closer_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[%>]\s*\}\}").unwrap())
}

/// A parsed shortcode token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcode {
    pub name: String,
    /// `{{% /name %}}`
    pub closing: bool,
    /// `{{% name /%}}`
    pub self_closing: bool,
}

impl Shortcode {
    /// Parse a single macro token, surrounding whitespace allowed
    pub fn parse(token: &str) -> Option<Self> {
        let caps = shortcode_regex().captures(token.trim())?;
        let args = caps.get(4).map_or("", |m| m.as_str()).trim_end();
        Some(Self {
            name: caps[3].to_string(),
            closing: caps.get(2).is_some(),
            self_closing: args.ends_with('/'),
        })
    }

    /// Whether the macro body must not be styled
    pub fn is_passthrough(&self) -> bool {
        PASSTHROUGH.contains(&self.name.as_str())
    }
}

/// Whether `text` (trimmed) is exactly one macro token
///
/// ```
/// use odtmark_core::macros::is_macro;
/// assert!(is_macro(" {{% note %}} "));
/// assert!(!is_macro("see {{% note %}}"));
/// ```
pub fn is_macro(text: &str) -> bool {
    let text = text.trim();
    token_regex()
        .find(text)
        .is_some_and(|m| m.start() == 0 && m.end() == text.len())
}

/// Whether `text` contains any macro token
pub fn contains_macro(text: &str) -> bool {
    token_regex().is_match(text)
}

/// Byte ranges of every macro token in `text`
pub fn macro_spans(text: &str) -> Vec<(usize, usize)> {
    token_regex()
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect()
}

/// Whether the last shortcode opened in `text` (`{{<` or `{{%`) is left
/// without its `>}}` / `%}}`
///
/// Plain `{{` in prose is not a shortcode and never counts as open.
///
/// ```
/// use odtmark_core::macros::has_open_macro;
/// assert!(has_open_macro("{{< figure src=\"a.png\""));
/// assert!(!has_open_macro("templates use {{ .Title }} or {{ here"));
/// ```
pub fn has_open_macro(text: &str) -> bool {
    opener_regex()
        .find_iter(text)
        .last()
        .is_some_and(|open| !closer_regex().is_match(&text[open.end()..]))
}

/// Whether `text` holds a shortcode terminator (`>}}` or `%}}`)
pub fn has_macro_close(text: &str) -> bool {
    closer_regex().is_match(text)
}

/// Names of macros that appear with a closing tag somewhere in `text`
pub fn paired_names(text: &str) -> HashSet<String> {
    token_regex()
        .find_iter(text)
        .filter_map(|m| Shortcode::parse(m.as_str()))
        .filter(|s| s.closing)
        .map(|s| s.name)
        .collect()
}

/// Shortcode on a line that holds nothing but one macro token
pub fn line_macro(line: &str) -> Option<Shortcode> {
    is_macro(line).then(|| Shortcode::parse(line)).flatten()
}

/// Whether a node starting with `text` is the opening of a passthrough block
pub fn opens_passthrough(text: &str) -> Option<String> {
    let code = line_macro(text)?;
    (code.is_passthrough() && !code.closing && !code.self_closing).then_some(code.name)
}

/// Whether `text` closes the passthrough block `name`
pub fn closes_passthrough(text: &str, name: &str) -> bool {
    line_macro(text).is_some_and(|code| code.closing && code.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shortcodes() {
        let open = Shortcode::parse("{{% note title=\"x\" %}}").unwrap();
        assert_eq!(open.name, "note");
        assert!(!open.closing);

        let close = Shortcode::parse("{{< /tabs >}}").unwrap();
        assert_eq!(close.name, "tabs");
        assert!(close.closing);

        let inline = Shortcode::parse("{{< icon \"x\" />}}").unwrap();
        assert!(inline.self_closing);

        assert!(Shortcode::parse("{{ plain }}").is_none());
    }

    #[test]
    fn test_open_macro_detection() {
        assert!(has_open_macro("{{< figure src=\"a.png\""));
        assert!(!has_open_macro("{{< figure >}} done"));
        assert!(!has_open_macro("no macro } here"));
        assert!(!has_open_macro("use {{ in prose"));
        assert!(has_open_macro("{{% note %}} then {{% tabs"));
        assert!(has_macro_close("title=\"A\" >}}"));
        assert!(!has_macro_close("just }} braces"));
    }

    #[test]
    fn test_paired_names() {
        let names = paired_names("{{% note %}}\ntext\n{{% /note %}}\n{{< ref \"x\" >}}");
        assert!(names.contains("note"));
        assert!(!names.contains("ref"));
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(opens_passthrough("{{% markdown %}}").as_deref(), Some("markdown"));
        assert_eq!(opens_passthrough("{{% note %}}"), None);
        assert!(closes_passthrough("{{% /markdown %}}", "markdown"));
        assert!(!closes_passthrough("{{% /raw %}}", "markdown"));
    }

    #[test]
    fn test_macro_spans() {
        assert_eq!(macro_spans("a {{x}} b {{y}}"), vec![(2, 7), (10, 15)]);
        assert!(contains_macro("a {{x}}"));
    }
}
