//! Document model to tag tree conversion
//!
//! A single depth-first walk over the parsed body. Styles decide what each
//! paragraph and span becomes; drawings are resolved into images, formulas
//! and inline SVG. Structural cleanup is left to the pipeline.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use odtmark_ast::{Geometry, NodeId, NumberFormat, Payload, Tag, TagTree};
use odtmark_odf::model::{
    Block, DrawCustomShape, DrawFrame, DrawGroup, EnhancedGeometry, Inline, Link, List,
    ListLevelKind, ListLevelStyle, Paragraph, Span, Table, TableOfContents, TextProperties,
};
use odtmark_odf::{AssetMap, OdfDocument, StyleResolver};
use regex::Regex;

use crate::diagnostics::{codes, Diagnostic};
use crate::shape::resolve_path;

/// Glyph used when a list level declares none
const DEFAULT_BULLET: &str = "•";

fn drive_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^https?://(?:docs|drive)\.google\.com/(?:a/[^/]+/)?(?:(?:document|spreadsheets|presentation|drawings|file)/d/|open\?id=)([A-Za-z0-9_-]+)",
        )
        .unwrap()
    })
}

/// Identifier of a Google Drive document URL
///
/// ```
/// use odtmark_core::converter::drive_id;
/// assert_eq!(drive_id("https://docs.google.com/document/d/abc-1/edit"), Some("abc-1"));
/// assert_eq!(drive_id("https://drive.google.com/open?id=XyZ"), Some("XyZ"));
/// assert_eq!(drive_id("https://example.com/document/d/abc"), None);
/// ```
pub fn drive_id(href: &str) -> Option<&str> {
    drive_regex()
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Convert an ODF length (`2.5cm`, `12pt`, `1in`) to CSS pixels
pub fn length_px(value: &str) -> Option<f64> {
    let value = value.trim();
    let split = value
        .find(|c: char| c.is_ascii_alphabetic() || c == '%')
        .unwrap_or(value.len());
    let number: f64 = value[..split].trim().parse().ok()?;
    let factor = match &value[split..] {
        "in" => 96.0,
        "cm" => 96.0 / 2.54,
        "mm" => 96.0 / 25.4,
        "pt" => 96.0 / 72.0,
        "pc" => 16.0,
        "px" | "" => 1.0,
        _ => return None,
    };
    Some(number * factor)
}

/// Result of converting one document
#[derive(Debug)]
pub struct Conversion {
    pub tree: TagTree,
    /// Absolute `http(s)` link targets, sorted
    pub links: BTreeSet<String>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    /// Inside a fenced block: no styling, line breaks are newlines
    Pre,
    /// Inside inline code: no styling
    Code,
}

/// Walks an [`OdfDocument`] and builds the tag tree
pub struct Converter<'a> {
    document: &'a OdfDocument,
    styles: StyleResolver<'a>,
    assets: &'a AssetMap,
    tree: TagTree,
    list_level: usize,
    links: BTreeSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Converter<'a> {
    /// `assets` maps archive paths of embedded images to their output links
    pub fn new(document: &'a OdfDocument, assets: &'a AssetMap) -> Self {
        Self {
            document,
            styles: StyleResolver::new(document),
            assets,
            tree: TagTree::new(),
            list_level: 0,
            links: BTreeSet::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn convert(mut self) -> Conversion {
        let document = self.document;
        let root = self.tree.root();
        self.blocks(root, &document.content.body.text.blocks, None);
        Conversion {
            tree: self.tree,
            links: self.links,
            diagnostics: self.diagnostics,
        }
    }

    // =========================================================================
    // Blocks
    // =========================================================================

    fn blocks(&mut self, parent: NodeId, blocks: &[Block], list_style: Option<&str>) {
        for block in blocks {
            match block {
                Block::Paragraph(paragraph) => self.paragraph(parent, paragraph),
                Block::List(list) => self.list(parent, list, list_style),
                Block::Table(table) => self.table(parent, table),
                Block::TableOfContents(toc) => self.toc(parent, toc),
                Block::Section(section) => self.blocks(parent, &section.blocks, list_style),
            }
        }
    }

    fn paragraph(&mut self, parent: NodeId, paragraph: &Paragraph) {
        let props = self.span_props(paragraph.style_name.as_deref(), &TextProperties::default());

        if let Some(level) = self.heading_level(paragraph) {
            let node = self
                .tree
                .append_tag(parent, Tag::heading(level), Payload::default());
            self.inlines(node, &paragraph.children, &props, Mode::Normal);
            return;
        }

        // Outside lists a blank monospace paragraph is an empty code line;
        // it joins the neighbouring code blocks or is dropped as an empty PRE
        let mut seen = false;
        let code = self.is_code(&paragraph.children, &props, &mut seen);
        let blank_code = self.list_level == 0 && self.styles.is_monospace(&props);
        if code && (seen || blank_code) {
            let node = self.tree.append_tag(parent, Tag::Pre, Payload::default());
            self.inlines(node, &paragraph.children, &props, Mode::Pre);
            return;
        }

        let node = self.tree.append_tag(parent, Tag::P, Payload::default());
        // Emphasis from the paragraph style covers every run; spans only add
        // what the paragraph does not already set
        let target = match emphasis_tag(props.is_bold(), props.is_italic()) {
            Some(tag) => self.tree.append_tag(node, tag, Payload::default()),
            None => node,
        };
        self.inlines(target, &paragraph.children, &props, Mode::Normal);
    }

    fn heading_level(&self, paragraph: &Paragraph) -> Option<u8> {
        if paragraph.heading {
            if let Some(level) = paragraph.outline_level.filter(|l| *l > 0) {
                return Some(level);
            }
        }
        let level = paragraph
            .style_name
            .as_deref()
            .map(|name| self.styles.ancestry(name))
            .and_then(|chain| chain.iter().find_map(|name| style_heading_level(name)));
        match level {
            Some(level) => Some(level),
            None if paragraph.heading => Some(1),
            None => None,
        }
    }

    /// Whether every non-blank run is set in a monospace font
    fn is_code(&self, children: &[Inline], props: &TextProperties, seen: &mut bool) -> bool {
        children.iter().all(|inline| match inline {
            Inline::Text(text) if text.trim().is_empty() => true,
            Inline::Text(_) => {
                *seen = true;
                self.styles.is_monospace(props)
            }
            Inline::Span(span) => {
                let props = self.span_props(span.style_name.as_deref(), props);
                self.is_code(&span.children, &props, seen)
            }
            Inline::Link(link) => self.is_code(&link.children, props, seen),
            Inline::Frame(_) | Inline::CustomShape(_) | Inline::Group(_) => false,
            _ => true,
        })
    }

    fn list(&mut self, parent: NodeId, list: &List, inherited_style: Option<&str>) {
        let level = self.list_level;
        self.list_level += 1;

        let style_name = list.style_name.as_deref().or(inherited_style);
        let rule = style_name
            .and_then(|name| self.styles.list_style(name))
            .and_then(|style| style.level(level + 1));

        let ul = self.tree.append_tag(
            parent,
            Tag::Ul,
            Payload {
                list_level: Some(level),
                list_style: style_name.map(str::to_string),
                continue_numbering: list.continues(),
                ..Default::default()
            },
        );

        for item in &list.items {
            let mut payload = if item.header {
                Payload {
                    list_header: true,
                    ..Default::default()
                }
            } else {
                let mut payload = item_payload(rule);
                // An explicit start value restarts the counter at this item
                payload.number = item.start_value;
                payload
            };
            payload.list_level = Some(level);
            payload.list_style = style_name.map(str::to_string);
            let li = self.tree.append_tag(ul, Tag::Li, payload);
            self.blocks(li, &item.blocks, style_name);
        }

        self.list_level -= 1;
    }

    fn table(&mut self, parent: NodeId, table: &Table) {
        // Lists inside cells start a fresh nesting
        let outer_level = std::mem::replace(&mut self.list_level, 0);
        let node = self.tree.append_tag(parent, Tag::Table, Payload::default());
        for row in &table.rows {
            let tr = self.tree.append_tag(node, Tag::Tr, Payload::default());
            for cell in &row.cells {
                let payload = Payload {
                    colspan: cell.column_span.filter(|span| *span > 1),
                    rowspan: cell.row_span.filter(|span| *span > 1),
                    ..Default::default()
                };
                let td = self.tree.append_tag(tr, Tag::Td, payload);
                self.blocks(td, &cell.blocks, None);
            }
        }
        self.list_level = outer_level;
    }

    fn toc(&mut self, parent: NodeId, toc: &TableOfContents) {
        for title in &toc.title {
            self.paragraph(parent, title);
        }
        let node = self.tree.append_tag(parent, Tag::Toc, Payload::default());
        for entry in &toc.entries {
            let props = self.span_props(entry.style_name.as_deref(), &TextProperties::default());
            let level = entry
                .style_name
                .as_deref()
                .map(|name| self.styles.ancestry(name))
                .and_then(|chain| chain.iter().find_map(|name| contents_level(name)))
                .unwrap_or(1);
            let p = self.tree.append_tag(
                node,
                Tag::P,
                Payload {
                    list_level: Some(level - 1),
                    ..Default::default()
                },
            );
            self.inlines(p, &entry.children, &props, Mode::Normal);
        }
    }

    // =========================================================================
    // Inlines
    // =========================================================================

    fn inlines(&mut self, parent: NodeId, children: &[Inline], props: &TextProperties, mode: Mode) {
        for inline in children {
            self.inline(parent, inline, props, mode);
        }
    }

    fn inline(&mut self, parent: NodeId, inline: &Inline, props: &TextProperties, mode: Mode) {
        match inline {
            Inline::Text(text) => {
                self.tree.append_text(parent, text.as_str());
            }
            Inline::Span(span) => self.span(parent, span, props, mode),
            Inline::Link(link) => self.link(parent, link, props, mode),
            Inline::Space(count) => {
                self.tree.append_text(parent, " ".repeat(*count as usize));
            }
            Inline::Tab => {
                self.tree.append_text(parent, "\t");
            }
            Inline::LineBreak if mode == Mode::Pre => {
                self.tree.append_text(parent, "\n");
            }
            Inline::LineBreak => {
                self.tree.append_tag(parent, Tag::Br, Payload::default());
            }
            Inline::Frame(frame) => self.frame(parent, frame),
            Inline::CustomShape(shape) => self.custom_shape(parent, shape),
            Inline::Group(group) => self.group(parent, group),
            Inline::Bookmark(name) => {
                self.tree.append_tag(parent, Tag::Bookmark, Payload::id(name.as_str()));
            }
            Inline::ChangeStart(id) => {
                self.tree
                    .append_tag(parent, Tag::ChangeStart, Payload::id(id.as_str()));
            }
            Inline::ChangeEnd(id) => {
                self.tree.append_tag(parent, Tag::ChangeEnd, Payload::id(id.as_str()));
            }
        }
    }

    fn span(&mut self, parent: NodeId, span: &Span, outer: &TextProperties, mode: Mode) {
        let props = self.span_props(span.style_name.as_deref(), outer);
        if mode != Mode::Normal {
            self.inlines(parent, &span.children, &props, mode);
            return;
        }

        let emphasis = emphasis_tag(
            props.is_bold() && !outer.is_bold(),
            props.is_italic() && !outer.is_italic(),
        );

        let mut target = parent;
        if let Some(tag) = emphasis {
            target = self.tree.append_tag(target, tag, Payload::default());
        }
        let mut mode = mode;
        if self.styles.is_monospace(&props) && !self.styles.is_monospace(outer) {
            target = self.tree.append_tag(target, Tag::Code, Payload::default());
            mode = Mode::Code;
        }
        self.inlines(target, &span.children, &props, mode);
    }

    fn link(&mut self, parent: NodeId, link: &Link, props: &TextProperties, mode: Mode) {
        let href = match link.href.as_deref() {
            Some(href) if mode != Mode::Pre => href,
            _ => {
                self.inlines(parent, &link.children, props, mode);
                return;
            }
        };
        let target = self.link_target(href);
        let node = self.tree.append_tag(parent, Tag::A, Payload::href(target));
        self.inlines(node, &link.children, props, mode);
    }

    fn link_target(&mut self, href: &str) -> String {
        if let Some(id) = drive_id(href) {
            return format!("gdoc:{id}");
        }
        if href.starts_with("http://") || href.starts_with("https://") {
            self.links.insert(href.to_string());
        }
        href.to_string()
    }

    /// Text properties of a style layered over the enclosing ones
    fn span_props(&self, style_name: Option<&str>, outer: &TextProperties) -> TextProperties {
        let mut props = style_name
            .and_then(|name| self.styles.resolve(name))
            .map(|style| style.text)
            .unwrap_or_default();
        props.inherit(outer);
        props
    }

    // =========================================================================
    // Drawings
    // =========================================================================

    fn frame(&mut self, parent: NodeId, frame: &DrawFrame) {
        if let Some(image) = &frame.image {
            let Some(href) = image.href.as_deref() else {
                self.diagnostics.push(
                    Diagnostic::warning("Image without a source was dropped")
                        .with_code(codes::MISSING_IMAGE),
                );
                return;
            };
            let href = self
                .assets
                .get(href)
                .cloned()
                .unwrap_or_else(|| href.to_string());
            let alt = frame
                .title
                .clone()
                .or_else(|| frame.name.clone())
                .unwrap_or_default();
            let mut payload = Payload::href(href);
            payload.alt = Some(alt);
            self.tree.append_tag(parent, Tag::Img, payload);
            return;
        }

        if let Some(object) = &frame.object {
            let document = self.document;
            let annotation = object
                .math
                .as_ref()
                .and_then(|math| math.annotation.clone())
                .or_else(|| {
                    object
                        .object_name()
                        .and_then(|name| document.objects.get(name))
                        .and_then(|math| math.annotation.clone())
                });
            match annotation {
                Some(formula) => {
                    self.tree
                        .append_tag(parent, Tag::MathMl, Payload::text(formula.trim()));
                }
                None => {
                    let name = object.href.as_deref().unwrap_or("unnamed object");
                    self.diagnostics.push(
                        Diagnostic::warning(format!("Formula object `{name}` has no annotation"))
                            .with_code(codes::MISSING_FORMULA_OBJECT),
                    );
                }
            }
        }
    }

    fn custom_shape(&mut self, parent: NodeId, shape: &DrawCustomShape) {
        let part = self.shape_part(shape);
        let svg = self.tree.append_tag(parent, Tag::Svg, Payload::default());
        self.fill_svg(svg, vec![part]);
    }

    fn group(&mut self, parent: NodeId, group: &DrawGroup) {
        let name = group.name.as_deref().unwrap_or("drawing");
        self.diagnostics.push(
            Diagnostic::warning(format!("Grouped drawing `{name}` was flattened"))
                .with_code(codes::GROUPED_DRAWING)
                .with_help("ungroup the drawing in the source document to keep its layout"),
        );
        self.tree.append_tag(
            parent,
            Tag::Warning,
            Payload::text(format!("grouped drawing `{name}` flattened")),
        );

        let mut shapes = Vec::new();
        let mut frames = Vec::new();
        collect_members(&group.members, &mut shapes, &mut frames);

        let parts = shapes.into_iter().map(|shape| self.shape_part(shape)).collect();
        let svg = self.tree.append_tag(parent, Tag::Svg, Payload::default());
        self.fill_svg(svg, parts);
        for frame in frames {
            self.frame(parent, frame);
        }
    }

    fn shape_part(&mut self, shape: &DrawCustomShape) -> ShapePart {
        let graphic = shape
            .style_name
            .as_deref()
            .and_then(|name| self.styles.resolve(name))
            .map(|style| style.graphic)
            .unwrap_or_default();
        let fill = match graphic.fill.as_deref() {
            Some("none") => "none".to_string(),
            _ => graphic.fill_color.unwrap_or_else(|| "none".to_string()),
        };
        let stroke = match graphic.stroke.as_deref() {
            Some("none") => "none".to_string(),
            _ => graphic.stroke_color.unwrap_or_else(|| "#000000".to_string()),
        };

        let empty = EnhancedGeometry::default();
        let resolved = resolve_path(
            shape.geometry.as_ref().unwrap_or(&empty),
            fill != "none",
            stroke != "none",
        );
        self.diagnostics.extend(resolved.diagnostics);

        if let Some(transform) = &shape.transform {
            let name = shape.name.as_deref().unwrap_or("shape");
            self.diagnostics.push(
                Diagnostic::warning(format!("Transform `{transform}` on `{name}` was ignored"))
                    .with_code(codes::SHAPE_TRANSFORM),
            );
        }

        let px = |value: &Option<String>| value.as_deref().and_then(length_px).unwrap_or(0.0);
        let text = shape
            .paragraphs
            .iter()
            .map(Paragraph::plain_text)
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        ShapePart {
            geometry: Geometry {
                x: px(&shape.x),
                y: px(&shape.y),
                width: px(&shape.width),
                height: px(&shape.height),
                view_box: Some(resolved.view_box),
                path: resolved.path,
                fill: Some(fill),
                stroke: Some(stroke),
                stroke_width: graphic.stroke_width.as_deref().and_then(length_px),
            },
            text,
        }
    }

    /// Lay shapes out inside one SVG whose origin is their common top-left
    fn fill_svg(&mut self, svg: NodeId, parts: Vec<ShapePart>) {
        let (min_x, min_y, max_x, max_y) = if parts.is_empty() {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            parts.iter().fold(
                (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
                |(x0, y0, x1, y1), part| {
                    let g = &part.geometry;
                    (
                        x0.min(g.x),
                        y0.min(g.y),
                        x1.max(g.x + g.width),
                        y1.max(g.y + g.height),
                    )
                },
            )
        };

        for part in parts {
            let mut geometry = part.geometry;
            geometry.x -= min_x;
            geometry.y -= min_y;
            let text_box = Geometry {
                x: geometry.x,
                y: geometry.y,
                width: geometry.width,
                height: geometry.height,
                ..Default::default()
            };
            self.tree.append_tag(
                svg,
                Tag::SvgPath,
                Payload {
                    geometry: Some(geometry),
                    ..Default::default()
                },
            );
            if !part.text.is_empty() {
                self.tree.append_tag(
                    svg,
                    Tag::SvgText,
                    Payload {
                        geometry: Some(text_box),
                        text: Some(part.text),
                        ..Default::default()
                    },
                );
            }
        }

        let width = max_x - min_x;
        let height = max_y - min_y;
        if let Some(payload) = self.tree.payload_mut(svg) {
            payload.geometry = Some(Geometry {
                width,
                height,
                view_box: Some([0.0, 0.0, width, height]),
                ..Default::default()
            });
        }
    }
}

struct ShapePart {
    geometry: Geometry,
    text: String,
}

fn collect_members<'g>(
    members: &'g [Inline],
    shapes: &mut Vec<&'g DrawCustomShape>,
    frames: &mut Vec<&'g DrawFrame>,
) {
    for member in members {
        match member {
            Inline::CustomShape(shape) => shapes.push(shape),
            Inline::Frame(frame) => frames.push(frame),
            Inline::Group(group) => collect_members(&group.members, shapes, frames),
            _ => {}
        }
    }
}

/// Marker fields of a list item from its level rule
fn emphasis_tag(bold: bool, italic: bool) -> Option<Tag> {
    match (bold, italic) {
        (true, true) => Some(Tag::BI),
        (true, false) => Some(Tag::B),
        (false, true) => Some(Tag::I),
        (false, false) => None,
    }
}

fn item_payload(rule: Option<&ListLevelStyle>) -> Payload {
    let mut payload = Payload::default();
    let format = rule
        .filter(|rule| rule.kind == ListLevelKind::Number)
        .and_then(|rule| rule.num_format.as_deref())
        .and_then(NumberFormat::from_odf);
    match format {
        Some(format) => {
            payload.number_format = Some(format);
            payload.start_value = Some(rule.and_then(|r| r.start_value).unwrap_or(1));
        }
        None => {
            let glyph = rule
                .and_then(|rule| rule.bullet_char.clone())
                .unwrap_or_else(|| DEFAULT_BULLET.to_string());
            payload.bullet = Some(glyph);
        }
    }
    payload
}

/// `Heading_20_2` and `Heading 2` are level 2; `Title` is level 1
fn style_heading_level(name: &str) -> Option<u8> {
    if name == "Title" {
        return Some(1);
    }
    name.strip_prefix("Heading_20_")
        .or_else(|| name.strip_prefix("Heading "))?
        .parse()
        .ok()
        .filter(|level| *level > 0)
}

/// `Contents_20_3` is entry level 3
fn contents_level(name: &str) -> Option<usize> {
    name.strip_prefix("Contents_20_")
        .or_else(|| name.strip_prefix("Contents "))?
        .parse()
        .ok()
        .filter(|level| *level > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use odtmark_odf::test_utils::{content_xml, styles_xml};

    fn convert(automatic: &str, named: &str, body: &str) -> Conversion {
        let content = content_xml(automatic, body);
        let styles = styles_xml("", named);
        let document = OdfDocument::parse(content.as_bytes(), Some(styles.as_bytes())).unwrap();
        let assets = AssetMap::new();
        let conversion = Converter::new(&document, &assets).convert();
        conversion.tree.check_consistency().unwrap();
        conversion
    }

    fn tags(tree: &TagTree, node: NodeId) -> Vec<Tag> {
        tree.children(node)
            .iter()
            .filter_map(|&c| tree.tag(c))
            .collect()
    }

    const MONO: &str = r#"<style:style style:name="T1" style:family="text"><style:text-properties style:font-name="Courier New"/></style:style>"#;
    const BOLD: &str = r#"<style:style style:name="T2" style:family="text"><style:text-properties fo:font-weight="bold"/></style:style>"#;
    const BOLD_ITALIC: &str = r#"<style:style style:name="T3" style:family="text"><style:text-properties fo:font-weight="700" fo:font-style="italic"/></style:style>"#;

    #[test]
    fn test_headings_from_outline_and_styles() {
        let named = r#"<style:style style:name="Heading_20_2" style:family="paragraph"/><style:style style:name="Title" style:family="paragraph"/>"#;
        let automatic = r#"<style:style style:name="P1" style:family="paragraph" style:parent-style-name="Heading_20_2"/>"#;
        let body = r#"<text:h text:outline-level="3">A</text:h><text:p text:style-name="P1">B</text:p><text:p text:style-name="Title">C</text:p><text:h text:outline-level="6">D</text:h>"#;
        let out = convert(automatic, named, body);
        let root = out.tree.root();
        assert_eq!(tags(&out.tree, root), vec![Tag::H3, Tag::H2, Tag::H1, Tag::H4]);
    }

    #[test]
    fn test_monospace_paragraph_becomes_pre() {
        let automatic = format!(
            r#"{MONO}<style:style style:name="P1" style:family="paragraph"><style:text-properties style:font-name="Consolas"/></style:style>"#
        );
        let body = r#"<text:p text:style-name="P1">let x = 1;<text:line-break/>x</text:p><text:p><text:span text:style-name="T1">code</text:span> </text:p><text:p>use <text:span text:style-name="T1">grep</text:span></text:p>"#;
        let out = convert(&automatic, "", body);
        let tree = &out.tree;
        let root = tree.root();
        assert_eq!(tags(tree, root), vec![Tag::Pre, Tag::Pre, Tag::P]);
        assert_eq!(tree.text_content(tree.children(root)[0]), "let x = 1;\nx");
        let p = tree.children(root)[2];
        assert_eq!(tags(tree, p), vec![Tag::Code]);
    }

    #[test]
    fn test_emphasis_spans() {
        let automatic = format!("{BOLD}{BOLD_ITALIC}");
        let body = r#"<text:p><text:span text:style-name="T2">b</text:span><text:span text:style-name="T3">bi</text:span><text:span>plain</text:span></text:p>"#;
        let out = convert(&automatic, "", body);
        let tree = &out.tree;
        let p = tree.children(tree.root())[0];
        assert_eq!(tags(tree, p), vec![Tag::B, Tag::BI]);
        assert_eq!(tree.text_content(p), "bbiplain");
    }

    #[test]
    fn test_links_and_drive_ids() {
        let body = r##"<text:p><text:a xlink:href="https://docs.google.com/document/d/DOC1/edit">doc</text:a> <text:a xlink:href="https://example.com/x">ext</text:a> <text:a xlink:href="#h.abc">local</text:a></text:p>"##;
        let out = convert("", "", body);
        let tree = &out.tree;
        let hrefs: Vec<_> = tree
            .find_all(tree.root(), Tag::A)
            .into_iter()
            .filter_map(|a| tree.payload(a).and_then(|p| p.href.clone()))
            .collect();
        assert_eq!(hrefs, vec!["gdoc:DOC1", "https://example.com/x", "#h.abc"]);
        assert_eq!(out.links.into_iter().collect::<Vec<_>>(), vec!["https://example.com/x"]);
    }

    #[test]
    fn test_lists_carry_style_levels() {
        let automatic = r#"<text:list-style style:name="L1"><text:list-level-style-number text:level="1" style:num-format="1" text:start-value="3"/><text:list-level-style-bullet text:level="2" text:bullet-char="◦"/></text:list-style>"#;
        let body = r#"<text:list text:style-name="L1"><text:list-item><text:p>one</text:p><text:list><text:list-item><text:p>nested</text:p></text:list-item></text:list></text:list-item></text:list>"#;
        let out = convert(automatic, "", body);
        let tree = &out.tree;
        let items = tree.find_all(tree.root(), Tag::Li);
        assert_eq!(items.len(), 2);

        let outer = tree.payload(items[0]).unwrap();
        assert_eq!(outer.list_level, Some(0));
        assert_eq!(outer.number_format, Some(NumberFormat::Decimal));
        assert_eq!(outer.start_value, Some(3));

        let inner = tree.payload(items[1]).unwrap();
        assert_eq!(inner.list_level, Some(1));
        assert_eq!(inner.list_style.as_deref(), Some("L1"));
        assert_eq!(inner.bullet.as_deref(), Some("◦"));
    }

    #[test]
    fn test_table_spans() {
        let body = r#"<table:table><table:table-row><table:table-cell table:number-columns-spanned="2"><text:p>a</text:p></table:table-cell></table:table-row></table:table>"#;
        let out = convert("", "", body);
        let tree = &out.tree;
        let td = tree.find_all(tree.root(), Tag::Td)[0];
        assert_eq!(tree.payload(td).unwrap().colspan, Some(2));
        assert_eq!(tree.payload(td).unwrap().rowspan, None);
    }

    #[test]
    fn test_toc_entry_levels() {
        let named = r#"<style:style style:name="Contents_20_2" style:family="paragraph"/>"#;
        let body = r#"<text:table-of-content text:name="toc"><text:index-body><text:p text:style-name="Contents_20_2">Sub	4</text:p></text:index-body></text:table-of-content>"#;
        let out = convert("", named, body);
        let tree = &out.tree;
        let toc = tree.find_all(tree.root(), Tag::Toc)[0];
        let entry = tree.children(toc)[0];
        assert_eq!(tree.payload(entry).unwrap().list_level, Some(1));
    }

    #[test]
    fn test_group_warns_and_flattens() {
        let body = r#"<text:p><draw:g draw:name="Diagram"><draw:custom-shape svg:x="1in" svg:y="0in" svg:width="1in" svg:height="1in"><draw:enhanced-geometry svg:viewBox="0 0 10 10" draw:enhanced-path="M 0 0 L 10 10 Z"/></draw:custom-shape><draw:custom-shape svg:x="0in" svg:y="1in" svg:width="1in" svg:height="1in" draw:transform="rotate (1)"/></draw:g></text:p>"#;
        let out = convert("", "", body);
        let tree = &out.tree;
        assert_eq!(tree.find_all(tree.root(), Tag::Warning).len(), 1);
        let svg = tree.find_all(tree.root(), Tag::Svg);
        assert_eq!(svg.len(), 1);
        let geometry = tree.payload(svg[0]).unwrap().geometry.clone().unwrap();
        assert_eq!(geometry.width, 192.0);
        assert_eq!(geometry.height, 192.0);

        let paths = tree.find_all(svg[0], Tag::SvgPath);
        let first = tree.payload(paths[0]).unwrap().geometry.clone().unwrap();
        assert_eq!(first.x, 96.0);
        assert_eq!(first.path, "M 0 0 L 10 10 Z");

        let codes: Vec<_> = out.diagnostics.iter().filter_map(|d| d.code.as_deref()).collect();
        assert!(codes.contains(&codes::GROUPED_DRAWING));
        assert!(codes.contains(&codes::SHAPE_TRANSFORM));
    }

    #[test]
    fn test_inline_formula_and_markers() {
        let body = r#"<text:p><text:bookmark text:name="id.1"/><text:change-start text:change-id="c1"/>x<text:s text:c="2"/>y<text:tab/><text:change-end text:change-id="c1"/><draw:frame><draw:object><math:math><math:semantics><math:annotation> a^2 </math:annotation></math:semantics></math:math></draw:object></draw:frame></text:p>"#;
        let out = convert("", "", body);
        let tree = &out.tree;
        let p = tree.children(tree.root())[0];
        assert_eq!(
            tags(tree, p),
            vec![Tag::Bookmark, Tag::ChangeStart, Tag::ChangeEnd, Tag::MathMl]
        );
        let math = tree.find_all(p, Tag::MathMl)[0];
        assert_eq!(tree.payload(math).unwrap().text.as_deref(), Some("a^2"));
        assert_eq!(tree.text_content(p), "x  y\t");
    }

    #[test]
    fn test_length_px() {
        assert_eq!(length_px("1in"), Some(96.0));
        assert_eq!(length_px("72pt"), Some(96.0));
        assert_eq!(length_px("10"), Some(10.0));
        assert!((length_px("2.54cm").unwrap() - 96.0).abs() < 1e-9);
        assert_eq!(length_px("5em"), None);
    }
}
