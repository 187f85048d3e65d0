//! Document roots, body and block-level records

use super::style::StyleCatalog;
use super::table::Table;
use super::text::{List, Paragraph, TableOfContents};
use super::{Element, Fields};

/// Root of `content.xml`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentContent {
    pub font_faces: Vec<FontFace>,
    pub automatic_styles: StyleCatalog,
    pub body: Body,
}

impl Fields for DocumentContent {
    fn attach_child(&mut self, field: &str, child: Element) {
        match (field, child) {
            ("font_faces", Element::FontFaceDecls(decls)) => self.font_faces.extend(decls.faces),
            ("automatic_styles", Element::StyleCatalog(catalog)) => self.automatic_styles = catalog,
            ("body", Element::Body(body)) => self.body = body,
            _ => {}
        }
    }
}

/// Root of `styles.xml`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentStyles {
    pub font_faces: Vec<FontFace>,
    pub styles: StyleCatalog,
    pub automatic_styles: StyleCatalog,
}

impl Fields for DocumentStyles {
    fn attach_child(&mut self, field: &str, child: Element) {
        match (field, child) {
            ("font_faces", Element::FontFaceDecls(decls)) => self.font_faces.extend(decls.faces),
            ("styles", Element::StyleCatalog(catalog)) => self.styles = catalog,
            ("automatic_styles", Element::StyleCatalog(catalog)) => self.automatic_styles = catalog,
            _ => {}
        }
    }
}

/// `office:font-face-decls`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontFaceDecls {
    pub faces: Vec<FontFace>,
}

impl Fields for FontFaceDecls {
    fn attach_child(&mut self, field: &str, child: Element) {
        if let ("faces", Element::FontFace(face)) = (field, child) {
            self.faces.push(face);
        }
    }
}

/// `style:font-face`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontFace {
    pub name: String,
    pub family: Option<String>,
    /// `fixed` or `variable`
    pub pitch: Option<String>,
    /// `modern` marks monospace families
    pub generic: Option<String>,
}

impl Fields for FontFace {
    fn set_field(&mut self, field: &str, value: String) {
        match field {
            "name" => self.name = value,
            "family" => self.family = Some(value),
            "pitch" => self.pitch = Some(value),
            "generic" => self.generic = Some(value),
            _ => {}
        }
    }
}

/// `office:body`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    pub text: OfficeText,
}

impl Fields for Body {
    fn attach_child(&mut self, field: &str, child: Element) {
        if let ("text", Element::OfficeText(text)) = (field, child) {
            self.text = text;
        }
    }
}

/// `office:text`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfficeText {
    pub blocks: Vec<Block>,
}

impl Fields for OfficeText {
    fn attach_child(&mut self, field: &str, child: Element) {
        if field == "blocks" {
            if let Some(block) = Block::from_element(child) {
                self.blocks.push(block);
            }
        }
    }
}

/// `text:section`, a transparent container
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub name: Option<String>,
    pub blocks: Vec<Block>,
}

impl Fields for Section {
    fn set_field(&mut self, field: &str, value: String) {
        if field == "name" {
            self.name = Some(value);
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

/// Block-level content
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    List(List),
    Table(Table),
    TableOfContents(TableOfContents),
    Section(Section),
}

impl Block {
    /// Convert a finished child record, if it is block content
    pub fn from_element(element: Element) -> Option<Self> {
        Some(match element {
            Element::Paragraph(v) => Block::Paragraph(v),
            Element::List(v) => Block::List(v),
            Element::Table(v) => Block::Table(v),
            Element::TableOfContents(v) => Block::TableOfContents(v),
            Element::Section(v) => Block::Section(v),
            _ => return None,
        })
    }
}
