//! Paragraph, inline, list and table-of-contents records

use super::document::Block;
use super::draw::{DrawCustomShape, DrawFrame, DrawGroup};
use super::{parse_bool, parse_number, Element, Fields};

/// Inline content of a paragraph, span or link
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Span(Span),
    Link(Link),
    /// `text:s`, a run of spaces
    Space(u32),
    Tab,
    LineBreak,
    Frame(DrawFrame),
    CustomShape(DrawCustomShape),
    Group(DrawGroup),
    Bookmark(String),
    ChangeStart(String),
    ChangeEnd(String),
}

impl Inline {
    /// Convert a finished child record, if it is inline content
    pub fn from_element(element: Element) -> Option<Self> {
        Some(match element {
            Element::Span(v) => Inline::Span(v),
            Element::Link(v) => Inline::Link(v),
            Element::Space(v) => Inline::Space(v.count),
            Element::Tab(_) => Inline::Tab,
            Element::LineBreak(_) => Inline::LineBreak,
            Element::DrawFrame(v) => Inline::Frame(v),
            Element::DrawCustomShape(v) => Inline::CustomShape(v),
            Element::DrawGroup(v) => Inline::Group(v),
            Element::Bookmark(v) => Inline::Bookmark(v.name),
            Element::ChangeStart(v) => Inline::ChangeStart(v.change_id),
            Element::ChangeEnd(v) => Inline::ChangeEnd(v.change_id),
            _ => return None,
        })
    }
}

pub(crate) fn push_inline(children: &mut Vec<Inline>, child: Element) {
    match Inline::from_element(child) {
        Some(inline) => children.push(inline),
        None => log::debug!("ignoring non-inline child"),
    }
}

/// Append character data, merging with a preceding text run
pub(crate) fn push_text(children: &mut Vec<Inline>, text: &str) {
    if let Some(Inline::Text(last)) = children.last_mut() {
        last.push_str(text);
    } else {
        children.push(Inline::Text(text.to_string()));
    }
}

/// `text:p` or `text:h`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub style_name: Option<String>,
    /// True for `text:h`
    pub heading: bool,
    pub outline_level: Option<u8>,
    pub children: Vec<Inline>,
}

impl Paragraph {
    /// Concatenated text of all runs, spaces and tabs included
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(children: &[Inline], out: &mut String) {
    for child in children {
        match child {
            Inline::Text(text) => out.push_str(text),
            Inline::Span(span) => collect_text(&span.children, out),
            Inline::Link(link) => collect_text(&link.children, out),
            Inline::Space(n) => out.extend(std::iter::repeat(' ').take(*n as usize)),
            Inline::Tab => out.push('\t'),
            _ => {}
        }
    }
}

impl Fields for Paragraph {
    fn set_field(&mut self, field: &str, value: String) {
        match field {
            "style_name" => self.style_name = Some(value),
            "outline_level" => self.outline_level = parse_number(&value),
            _ => {}
        }
    }

    fn attach_child(&mut self, field: &str, child: Element) {
        if field == "children" {
            push_inline(&mut self.children, child);
        }
    }

    fn push_text(&mut self, field: &str, text: &str) {
        if field == "children" {
            push_text(&mut self.children, text);
        }
    }
}

/// `text:span`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Span {
    pub style_name: Option<String>,
    pub children: Vec<Inline>,
}

impl Fields for Span {
    fn set_field(&mut self, field: &str, value: String) {
        if field == "style_name" {
            self.style_name = Some(value);
        }
    }

    fn attach_child(&mut self, field: &str, child: Element) {
        if field == "children" {
            push_inline(&mut self.children, child);
        }
    }

    fn push_text(&mut self, field: &str, text: &str) {
        if field == "children" {
            push_text(&mut self.children, text);
        }
    }
}

/// `text:a`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Link {
    pub href: Option<String>,
    pub style_name: Option<String>,
    pub children: Vec<Inline>,
}

impl Fields for Link {
    fn set_field(&mut self, field: &str, value: String) {
        match field {
            "href" => self.href = Some(value),
            "style_name" => self.style_name = Some(value),
            _ => {}
        }
    }

    fn attach_child(&mut self, field: &str, child: Element) {
        if field == "children" {
            push_inline(&mut self.children, child);
        }
    }

    fn push_text(&mut self, field: &str, text: &str) {
        if field == "children" {
            push_text(&mut self.children, text);
        }
    }
}

/// `text:s`
#[derive(Debug, Clone, PartialEq)]
pub struct Space {
    pub count: u32,
}

impl Default for Space {
    fn default() -> Self {
        Self { count: 1 }
    }
}

impl Fields for Space {
    fn set_field(&mut self, field: &str, value: String) {
        if field == "count" {
            self.count = parse_number(&value).unwrap_or(1);
        }
    }
}

/// `text:tab`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tab;

impl Fields for Tab {}

/// `text:line-break`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineBreak;

impl Fields for LineBreak {}

/// `text:bookmark` or `text:bookmark-start`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bookmark {
    pub name: String,
}

impl Fields for Bookmark {
    fn set_field(&mut self, field: &str, value: String) {
        if field == "name" {
            self.name = value;
        }
    }
}

/// `text:change-start`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeStart {
    pub change_id: String,
}

impl Fields for ChangeStart {
    fn set_field(&mut self, field: &str, value: String) {
        if field == "change_id" {
            self.change_id = value;
        }
    }
}

/// `text:change-end`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeEnd {
    pub change_id: String,
}

impl Fields for ChangeEnd {
    fn set_field(&mut self, field: &str, value: String) {
        if field == "change_id" {
            self.change_id = value;
        }
    }
}

/// `text:list`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct List {
    pub style_name: Option<String>,
    pub continue_numbering: bool,
    /// `text:continue-list`, the id of the list this one continues
    pub continue_list: Option<String>,
    pub id: Option<String>,
    pub items: Vec<ListItem>,
}

impl List {
    /// Whether numbering carries on from an earlier list
    pub fn continues(&self) -> bool {
        self.continue_numbering || self.continue_list.is_some()
    }
}

impl Fields for List {
    fn set_field(&mut self, field: &str, value: String) {
        match field {
            "style_name" => self.style_name = Some(value),
            "continue_numbering" => self.continue_numbering = parse_bool(&value),
            "continue_list" => self.continue_list = Some(value),
            "id" => self.id = Some(value),
            _ => {}
        }
    }

    fn attach_child(&mut self, field: &str, child: Element) {
        if let ("items", Element::ListItem(item)) = (field, child) {
            self.items.push(item);
        }
    }
}

/// `text:list-item` or `text:list-header`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListItem {
    /// `text:list-header`: an unnumbered leading item
    pub header: bool,
    pub start_value: Option<u32>,
    pub blocks: Vec<Block>,
}

impl Fields for ListItem {
    fn set_field(&mut self, field: &str, value: String) {
        if field == "start_value" {
            self.start_value = parse_number(&value);
        }
    }

    fn attach_child(&mut self, field: &str, child: Element) {
        if field == "blocks" {
            if let Some(block) = Block::from_element(child) {
                self.blocks.push(block);
            }
        }
    }
}

/// `text:table-of-content`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableOfContents {
    pub name: Option<String>,
    /// Paragraphs of `text:index-title`
    pub title: Vec<Paragraph>,
    /// One paragraph per entry
    pub entries: Vec<Paragraph>,
}

impl Fields for TableOfContents {
    fn set_field(&mut self, field: &str, value: String) {
        if field == "name" {
            self.name = Some(value);
        }
    }

    fn attach_child(&mut self, field: &str, child: Element) {
        if let ("body", Element::IndexBody(body)) = (field, child) {
            self.title.extend(body.title);
            self.entries.extend(body.paragraphs);
        }
    }
}

/// `text:index-body`, also used for the nested `text:index-title`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexBody {
    pub title: Vec<Paragraph>,
    pub paragraphs: Vec<Paragraph>,
}

impl Fields for IndexBody {
    fn attach_child(&mut self, field: &str, child: Element) {
        match (field, child) {
            ("paragraphs", Element::Paragraph(p)) => self.paragraphs.push(p),
            ("title", Element::IndexBody(title)) => {
                self.title.extend(title.title);
                self.title.extend(title.paragraphs);
            }
            _ => {}
        }
    }
}
