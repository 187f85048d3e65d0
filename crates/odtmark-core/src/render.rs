//! Tag tree renderer
//!
//! Serializes a normalized [`TagTree`] to text. Rendering is a pure,
//! recursive walk: the same tree always yields the same text, and nothing
//! in the tree is changed.
//!
//! The walk is mode-aware. Markdown is the default; tables, drawings and
//! list items Markdown cannot express switch their subtree to inline HTML,
//! and code content switches to raw mode where text passes unchanged.
//!
//! # Example
//!
//! ```
//! use odtmark_ast::{Payload, Tag, TagTree};
//! use odtmark_core::render::to_markdown;
//!
//! let mut tree = TagTree::new();
//! let para = tree.append_tag(tree.root(), Tag::P, Payload::default());
//! let bold = tree.append_tag(para, Tag::B, Payload::default());
//! tree.append_text(bold, "Hello");
//! tree.append_tag(tree.root(), Tag::Eol, Payload::default());
//!
//! assert_eq!(to_markdown(&tree), "**Hello**\n");
//! ```

use odtmark_ast::{Geometry, NodeId, NodeKind, Payload, Tag, TagTree};

use crate::macros::{line_macro, macro_spans, paired_names};
use crate::shape::fmt_num;

const INDENT: &str = "    ";
const FENCE: &str = "```";
const TEXT_LINE_HEIGHT: f64 = 16.0;

/// Serialization mode of a subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Markdown,
    Html,
    Raw,
}

/// Render the whole tree as Markdown, without the final line pass
pub fn render(tree: &TagTree) -> String {
    children(tree, tree.root(), Mode::Markdown)
}

/// Render the tree and normalize spacing around block macros
pub fn to_markdown(tree: &TagTree) -> String {
    space_block_macros(&render(tree))
}

/// Whether a list item must render its content as HTML
///
/// True when the item holds several paragraphs, or a line break, code block
/// or table outside its nested lists.
pub fn is_html_item(tree: &TagTree, li: NodeId) -> bool {
    let paragraphs = tree
        .children(li)
        .iter()
        .filter(|&&c| tree.tag(c).is_some_and(Tag::is_paragraph_like))
        .count();
    paragraphs > 1 || has_html_content(tree, li)
}

fn has_html_content(tree: &TagTree, node: NodeId) -> bool {
    tree.children(node).iter().any(|&child| match tree.tag(child) {
        Some(Tag::Br | Tag::Pre | Tag::Table) => true,
        Some(Tag::Ul) | None => false,
        Some(_) => has_html_content(tree, child),
    })
}

fn children(tree: &TagTree, node: NodeId, mode: Mode) -> String {
    tree.children(node)
        .iter()
        .map(|&child| render_node(tree, child, mode))
        .collect()
}

fn render_node(tree: &TagTree, node: NodeId, mode: Mode) -> String {
    match tree.kind(node) {
        NodeKind::Text(text) => match mode {
            Mode::Html => escape_html(text),
            Mode::Markdown | Mode::Raw => text.clone(),
        },
        NodeKind::Tag(tag, payload) => render_tag(tree, node, *tag, payload, mode),
    }
}

fn render_tag(tree: &TagTree, node: NodeId, tag: Tag, payload: &Payload, mode: Mode) -> String {
    match tag {
        Tag::Body => children(tree, node, mode),
        Tag::P => match mode {
            Mode::Html => format!("<p>{}</p>", children(tree, node, mode)),
            Mode::Markdown => paragraph(tree, node),
            Mode::Raw => children(tree, node, mode),
        },
        Tag::H1 | Tag::H2 | Tag::H3 | Tag::H4 => {
            let level = tag.heading_level().unwrap_or(1);
            let content = children(tree, node, mode);
            match mode {
                Mode::Html => format!("<h{level}>{content}</h{level}>"),
                Mode::Markdown => format!("{} {content}", "#".repeat(level)),
                Mode::Raw => content,
            }
        }
        Tag::Pre => {
            let content = children(tree, node, Mode::Raw);
            let content = content.trim_end_matches('\n');
            match mode {
                Mode::Html => format!("<pre><code>{}</code></pre>", escape_html(content)),
                _ => {
                    let lang = payload.lang.as_deref().unwrap_or("");
                    format!("{FENCE}{lang}\n{content}\n{FENCE}")
                }
            }
        }
        Tag::Code => {
            let content = children(tree, node, Mode::Raw);
            match mode {
                Mode::Html => format!("<code>{}</code>", escape_html(&content)),
                Mode::Markdown if content.contains('`') => format!("`` {content} ``"),
                Mode::Markdown => format!("`{content}`"),
                Mode::Raw => content,
            }
        }
        Tag::B | Tag::I | Tag::BI => {
            let content = children(tree, node, mode);
            let (md, open, close) = match tag {
                Tag::B => ("**", "<strong>", "</strong>"),
                Tag::I => ("*", "<em>", "</em>"),
                _ => ("***", "<strong><em>", "</em></strong>"),
            };
            match mode {
                Mode::Markdown => format!("{md}{content}{md}"),
                Mode::Html => format!("{open}{content}{close}"),
                Mode::Raw => content,
            }
        }
        Tag::A => {
            let label = children(tree, node, mode);
            match (mode, payload.href.as_deref()) {
                (Mode::Markdown, Some(href)) => format!("[{label}]({href})"),
                (Mode::Html, Some(href)) => {
                    format!("<a href=\"{}\">{label}</a>", escape_attr(href))
                }
                _ => label,
            }
        }
        Tag::Img => {
            let href = payload.href.as_deref().unwrap_or("");
            let alt = payload.alt.as_deref().unwrap_or("");
            match mode {
                Mode::Html => format!(
                    "<img src=\"{}\" alt=\"{}\" />",
                    escape_attr(href),
                    escape_attr(alt)
                ),
                _ => format!("![{alt}]({href})"),
            }
        }
        Tag::Ul => list(tree, node, mode),
        Tag::Li => list_item(tree, node, payload, mode),
        Tag::Table => table(tree, node),
        Tag::Tr | Tag::Td => children(tree, node, Mode::Html),
        Tag::Toc => children(tree, node, mode),
        Tag::Br => match mode {
            Mode::Html => "<br />".to_string(),
            _ => "\n".to_string(),
        },
        Tag::Eol | Tag::Blank => "\n".to_string(),
        Tag::Svg => svg(tree, node, payload),
        Tag::SvgPath => payload.geometry.as_ref().map(svg_path).unwrap_or_default(),
        Tag::SvgText => svg_text(payload),
        Tag::MathMl => format!("$${}$$", payload.text.as_deref().unwrap_or("")),
        Tag::Raw => payload.text.clone().unwrap_or_default(),
        Tag::Warning => format!("[WARNING: {}]", payload.text.as_deref().unwrap_or("")),
        Tag::ChangeStart | Tag::ChangeEnd | Tag::Bookmark => String::new(),
    }
}

/// Markdown paragraph whose text lines cannot be read as block syntax
fn paragraph(tree: &TagTree, node: NodeId) -> String {
    let mut out = String::new();
    let mut line_start = true;
    for &child in tree.children(node) {
        let rendered = render_node(tree, child, Mode::Markdown);
        if line_start && tree.is_text(child) {
            out.push_str(&escape_block_marker(&rendered));
        } else {
            out.push_str(&rendered);
        }
        line_start = tree.is_tag(child, Tag::Br);
    }
    out
}

/// Backslash-escape a heading, quote, list or rule marker opening `text`
///
/// ```
/// use odtmark_core::render::escape_block_marker;
/// assert_eq!(escape_block_marker("# not heading"), "\\# not heading");
/// assert_eq!(escape_block_marker("1. not a list"), "1\\. not a list");
/// assert_eq!(escape_block_marker("#hashtag"), "#hashtag");
/// ```
pub fn escape_block_marker(text: &str) -> String {
    let Some(first) = text.chars().next() else {
        return String::new();
    };
    let after = |skip: usize| text[skip..].chars().next().map_or(true, char::is_whitespace);

    let escape_at = match first {
        '#' => {
            let hashes = text.len() - text.trim_start_matches('#').len();
            (hashes <= 6 && after(hashes)).then_some(0)
        }
        '>' => Some(0),
        '*' | '-' | '+' | '_' => {
            let rule = text.trim().len() >= 3
                && text.trim().chars().all(|c| c == first || c == ' ');
            ((first != '_' && after(1)) || rule).then_some(0)
        }
        '0'..='9' => {
            let digits = text.len() - text.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            let delimiter = text[digits..].starts_with(['.', ')']);
            (digits <= 9 && delimiter && after(digits + 1)).then_some(digits)
        }
        _ => None,
    };
    match escape_at {
        Some(index) => format!("{}\\{}", &text[..index], &text[index..]),
        None => text.to_string(),
    }
}

fn list(tree: &TagTree, node: NodeId, mode: Mode) -> String {
    match mode {
        Mode::Html => {
            let ordered = tree
                .children(node)
                .iter()
                .filter(|&&c| tree.is_tag(c, Tag::Li))
                .filter_map(|&li| tree.payload(li))
                .find(|payload| !payload.list_header)
                .is_some_and(Payload::is_numbered);
            let name = if ordered { "ol" } else { "ul" };
            format!("<{name}>{}</{name}>", children(tree, node, mode))
        }
        _ => children(tree, node, mode),
    }
}

fn list_item(tree: &TagTree, node: NodeId, payload: &Payload, mode: Mode) -> String {
    if mode == Mode::Html {
        return format!("<li>{}</li>", children(tree, node, mode));
    }

    let level = payload.list_level.unwrap_or(0);
    let marker = match payload.number_format {
        _ if payload.list_header => String::new(),
        Some(format) => format!("{}. ", format.format(payload.number.unwrap_or(1))),
        None => "* ".to_string(),
    };
    let mut out = format!("{}{marker}", INDENT.repeat(level));

    let inner = if is_html_item(tree, node) {
        Mode::Html
    } else {
        Mode::Markdown
    };
    for &child in tree.children(node) {
        if tree.is_tag(child, Tag::Ul) {
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&render_node(tree, child, Mode::Markdown));
        } else {
            out.push_str(&render_node(tree, child, inner));
        }
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn table(tree: &TagTree, node: NodeId) -> String {
    let mut out = String::from("<table>\n");
    for &row in tree.children(node) {
        if !tree.is_tag(row, Tag::Tr) {
            continue;
        }
        out.push_str("<tr>\n");
        for &cell in tree.children(row) {
            let Some(payload) = tree.payload(cell) else {
                continue;
            };
            out.push_str("<td");
            if let Some(span) = payload.colspan {
                out.push_str(&format!(" colspan=\"{span}\""));
            }
            if let Some(span) = payload.rowspan {
                out.push_str(&format!(" rowspan=\"{span}\""));
            }
            out.push('>');
            out.push_str(&children(tree, cell, Mode::Html));
            out.push_str("</td>\n");
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>");
    out
}

fn svg(tree: &TagTree, node: NodeId, payload: &Payload) -> String {
    let geometry = payload.geometry.clone().unwrap_or_default();
    let view_box = geometry
        .view_box
        .unwrap_or([0.0, 0.0, geometry.width, geometry.height]);
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"{}\">{}</svg>",
        fmt_num(geometry.width),
        fmt_num(geometry.height),
        view_box.map(fmt_num).join(" "),
        children(tree, node, Mode::Html)
    )
}

fn svg_path(geometry: &Geometry) -> String {
    let (sx, sy) = match geometry.view_box {
        Some([_, _, w, h]) if w != 0.0 && h != 0.0 => (geometry.width / w, geometry.height / h),
        _ => (1.0, 1.0),
    };
    let (ox, oy) = match geometry.view_box {
        Some([x, y, _, _]) => (x, y),
        None => (0.0, 0.0),
    };
    let mut out = format!(
        "<g transform=\"translate({} {}) scale({} {}) translate({} {})\">",
        fmt_num(geometry.x),
        fmt_num(geometry.y),
        fmt_num(sx),
        fmt_num(sy),
        fmt_num(-ox),
        fmt_num(-oy),
    );
    out.push_str(&format!(
        "<path d=\"{}\" fill=\"{}\" stroke=\"{}\"",
        escape_attr(&geometry.path),
        escape_attr(geometry.fill.as_deref().unwrap_or("none")),
        escape_attr(geometry.stroke.as_deref().unwrap_or("none")),
    ));
    if let Some(width) = geometry.stroke_width {
        out.push_str(&format!(" stroke-width=\"{}\"", fmt_num(width)));
    }
    out.push_str(" vector-effect=\"non-scaling-stroke\"/></g>");
    out
}

/// Shape text, centred in the shape box, one `<text>` per line
fn svg_text(payload: &Payload) -> String {
    let (Some(geometry), Some(text)) = (payload.geometry.as_ref(), payload.text.as_deref()) else {
        return String::new();
    };
    let lines: Vec<&str> = text.lines().collect();
    let cx = geometry.x + geometry.width / 2.0;
    let cy = geometry.y + geometry.height / 2.0;
    let first = cy - (lines.len().saturating_sub(1) as f64) * TEXT_LINE_HEIGHT / 2.0;
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            format!(
                "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>",
                fmt_num(cx),
                fmt_num(first + i as f64 * TEXT_LINE_HEIGHT),
                escape_html(line)
            )
        })
        .collect()
}

/// Escape `&`, `<` and `>`, leaving macro tokens intact
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, end) in macro_spans(text) {
        out.push_str(&escape(&text[last..start]));
        out.push_str(&text[start..end]);
        last = end;
    }
    out.push_str(&escape(&text[last..]));
    out
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape(text).replace('"', "&quot;")
}

// =============================================================================
// Final line pass
// =============================================================================

/// Put paired block macros on their own lines, one blank line around them
///
/// A macro is a block macro when the document also closes it somewhere, so
/// `{{% note %}}` paired with `{{% /note %}}` qualifies while a standalone
/// `{{< figure ... >}}` does not. Fenced code is left alone.
pub fn space_block_macros(text: &str) -> String {
    let paired = paired_names(text);
    if paired.is_empty() {
        return text.to_string();
    }
    let is_block = |line: &str| {
        line_macro(line).is_some_and(|m| !m.self_closing && paired.contains(&m.name))
    };

    // Split macro tokens off prose at line edges
    let mut lines: Vec<(String, bool)> = Vec::new();
    let mut in_fence = false;
    for line in text.lines() {
        if line.trim_start().starts_with(FENCE) {
            in_fence = !in_fence;
            lines.push((line.to_string(), false));
            continue;
        }
        if in_fence {
            lines.push((line.to_string(), false));
            continue;
        }
        for piece in split_block_macros(line, &is_block) {
            let block = is_block(&piece);
            lines.push((piece, block));
        }
    }

    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    // Whether the last non-blank line kept is a block macro
    let mut after_block = false;
    for (index, (line, block)) in lines.iter().enumerate() {
        let last_blank = out.last().is_some_and(|l| l.trim().is_empty());
        if line.trim().is_empty() {
            if last_blank && (after_block || next_is_block(&lines, index)) {
                continue;
            }
            out.push(line);
            continue;
        }
        if (*block || after_block) && out.last().is_some() && !last_blank {
            out.push("");
        }
        out.push(line);
        after_block = *block;
    }

    let mut result = out.join("\n");
    if text.ends_with('\n') {
        result.push('\n');
    }
    result
}

fn next_is_block(lines: &[(String, bool)], index: usize) -> bool {
    lines[index + 1..]
        .iter()
        .find(|(line, _)| !line.trim().is_empty())
        .is_some_and(|(_, block)| *block)
}

/// Split a leading block macro or a trailing closing block macro off `line`
fn split_block_macros(line: &str, is_block: &dyn Fn(&str) -> bool) -> Vec<String> {
    let spans = macro_spans(line);
    let (Some(&(first_start, first_end)), Some(&(last_start, last_end))) =
        (spans.first(), spans.last())
    else {
        return vec![line.to_string()];
    };

    let mut pieces = Vec::new();
    let mut rest = line;
    let mut offset = 0;
    if line[..first_start].trim().is_empty()
        && !line[first_end..].trim().is_empty()
        && is_block(&line[first_start..first_end])
    {
        pieces.push(line[first_start..first_end].to_string());
        rest = line[first_end..].trim_start();
        offset = line.len() - rest.len();
    }

    if last_start >= offset
        && line[last_end..].trim().is_empty()
        && !line[offset..last_start].trim().is_empty()
        && line_macro(&line[last_start..last_end]).is_some_and(|m| m.closing)
        && is_block(&line[last_start..last_end])
    {
        pieces.push(line[offset..last_start].trim_end().to_string());
        pieces.push(line[last_start..last_end].to_string());
    } else {
        pieces.push(rest.to_string());
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use odtmark_ast::NumberFormat;

    fn item(
        tree: &mut TagTree,
        ul: NodeId,
        level: usize,
        number: Option<u32>,
        text: &str,
    ) -> NodeId {
        let li = tree.append_tag(
            ul,
            Tag::Li,
            Payload {
                list_level: Some(level),
                number,
                number_format: number.map(|_| NumberFormat::Decimal),
                ..Default::default()
            },
        );
        let p = tree.append_tag(li, Tag::P, Payload::default());
        tree.append_text(p, text);
        tree.append_tag(li, Tag::Eol, Payload::default());
        li
    }

    #[test]
    fn test_blocks_and_inline() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let h = tree.append_tag(root, Tag::H2, Payload::default());
        tree.append_text(h, "Title");
        tree.append_tag(root, Tag::Eol, Payload::default());
        tree.append_tag(root, Tag::Blank, Payload::default());
        let p = tree.append_tag(root, Tag::P, Payload::default());
        tree.append_text(p, "see ");
        let a = tree.append_tag(p, Tag::A, Payload::href("https://x.test"));
        tree.append_text(a, "x");
        tree.append_text(p, " and ");
        let code = tree.append_tag(p, Tag::Code, Payload::default());
        tree.append_text(code, "a<b");
        tree.append_tag(root, Tag::Eol, Payload::default());
        tree.append_tag(root, Tag::Blank, Payload::default());
        let pre = tree.append_tag(root, Tag::Pre, Payload::lang("rust"));
        tree.append_text(pre, "fn main() {}\n");
        tree.append_tag(root, Tag::Eol, Payload::default());

        assert_eq!(
            render(&tree),
            "## Title\n\nsee [x](https://x.test) and `a<b`\n\n```rust\nfn main() {}\n```\n"
        );
    }

    #[test]
    fn test_nested_numbered_list() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let ul = tree.append_tag(root, Tag::Ul, Payload::default());
        let li = item(&mut tree, ul, 0, Some(1), "one");
        let nested = tree.append_tag(li, Tag::Ul, Payload::default());
        item(&mut tree, nested, 1, None, "sub");
        item(&mut tree, ul, 0, Some(2), "two");

        assert_eq!(render(&tree), "1. one\n    * sub\n2. two\n");
    }

    #[test]
    fn test_list_header_has_no_marker() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let ul = tree.append_tag(root, Tag::Ul, Payload::default());
        let header = tree.append_tag(
            ul,
            Tag::Li,
            Payload {
                list_level: Some(0),
                list_header: true,
                ..Default::default()
            },
        );
        let p = tree.append_tag(header, Tag::P, Payload::default());
        tree.append_text(p, "Steps");
        tree.append_tag(header, Tag::Eol, Payload::default());
        item(&mut tree, ul, 0, Some(1), "one");

        assert_eq!(render(&tree), "Steps\n1. one\n");
    }

    #[test]
    fn test_block_markers_escaped_at_line_start() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let p = tree.append_tag(root, Tag::P, Payload::default());
        tree.append_text(p, "> quoted");
        tree.append_tag(p, Tag::Br, Payload::default());
        tree.append_text(p, "- dash");
        let b = tree.append_tag(p, Tag::B, Payload::default());
        tree.append_text(b, " # mid");
        tree.append_tag(root, Tag::Eol, Payload::default());

        assert_eq!(render(&tree), "\\> quoted\n\\- dash** # mid**\n");
        assert_eq!(escape_block_marker("---"), "\\---");
        assert_eq!(escape_block_marker("-5 degrees"), "-5 degrees");
        assert_eq!(escape_block_marker("10) ten"), "10\\) ten");
    }

    #[test]
    fn test_html_forced_item() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let ul = tree.append_tag(root, Tag::Ul, Payload::default());
        let li = tree.append_tag(ul, Tag::Li, Payload::default());
        tree.append_text(li, "a & b");
        tree.append_tag(li, Tag::Br, Payload::default());
        let b = tree.append_tag(li, Tag::B, Payload::default());
        tree.append_text(b, "c");

        assert!(is_html_item(&tree, li));
        assert_eq!(render(&tree), "* a &amp; b<br /><strong>c</strong>\n");
    }

    #[test]
    fn test_table_is_html() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let table = tree.append_tag(root, Tag::Table, Payload::default());
        let tr = tree.append_tag(table, Tag::Tr, Payload::default());
        let td = tree.append_tag(
            tr,
            Tag::Td,
            Payload {
                colspan: Some(2),
                ..Default::default()
            },
        );
        let b = tree.append_tag(td, Tag::B, Payload::default());
        tree.append_text(b, "{{< x >}} <y>");

        assert_eq!(
            render(&tree),
            "<table>\n<tr>\n<td colspan=\"2\"><strong>{{< x >}} &lt;y&gt;</strong></td>\n</tr>\n</table>"
        );
    }

    #[test]
    fn test_render_is_pure() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let p = tree.append_tag(root, Tag::P, Payload::default());
        tree.append_tag(p, Tag::Warning, Payload::text("grouped drawing"));
        let before = tree.dump();
        let first = to_markdown(&tree);
        assert_eq!(first, to_markdown(&tree));
        assert_eq!(before, tree.dump());
        assert_eq!(first, "[WARNING: grouped drawing]");
    }

    #[test]
    fn test_space_block_macros() {
        let input = "intro\n{{% note %}}Body text\nmore\n{{% /note %}}\noutro\n";
        assert_eq!(
            space_block_macros(input),
            "intro\n\n{{% note %}}\n\nBody text\nmore\n\n{{% /note %}}\n\noutro\n"
        );
    }

    #[test]
    fn test_space_block_macros_trailing_close_and_edges() {
        let input = "{{% note %}}\n\n\nText {{% /note %}}\n";
        assert_eq!(space_block_macros(input), "{{% note %}}\n\nText\n\n{{% /note %}}\n");
    }

    #[test]
    fn test_unpaired_and_fenced_macros_untouched() {
        let input = "{{< figure src=\"a.png\" >}}\ntext\n```\n{{% note %}}x\n```\n";
        assert_eq!(space_block_macros(input), input);
    }
}
