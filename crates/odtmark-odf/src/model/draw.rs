//! Drawing records: frames, images, formula objects and vector shapes

use super::text::{push_inline, Inline, Paragraph};
use super::{Element, Fields};

/// `draw:frame`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawFrame {
    pub name: Option<String>,
    pub style_name: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub image: Option<DrawImage>,
    pub object: Option<DrawObject>,
    /// `svg:title`, used as alternative text
    pub title: Option<String>,
    pub desc: Option<String>,
}

impl Fields for DrawFrame {
    fn set_field(&mut self, field: &str, value: String) {
        match field {
            "name" => self.name = Some(value),
            "style_name" => self.style_name = Some(value),
            "x" => self.x = Some(value),
            "y" => self.y = Some(value),
            "width" => self.width = Some(value),
            "height" => self.height = Some(value),
            _ => {}
        }
    }

    fn attach_child(&mut self, field: &str, child: Element) {
        match (field, child) {
            ("image", Element::DrawImage(image)) => self.image = Some(image),
            ("object", Element::DrawObject(object)) => self.object = Some(object),
            ("title", Element::TextContent(t)) => self.title = Some(t.text),
            ("desc", Element::TextContent(t)) => self.desc = Some(t.text),
            _ => {}
        }
    }
}

/// `draw:image`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawImage {
    pub href: Option<String>,
}

impl Fields for DrawImage {
    fn set_field(&mut self, field: &str, value: String) {
        if field == "href" {
            self.href = Some(value);
        }
    }
}

/// `draw:object`, an embedded formula either inline or in `Object N/`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawObject {
    pub href: Option<String>,
    pub math: Option<Math>,
}

impl DrawObject {
    /// Object directory name referenced by `xlink:href`, e.g. `Object 1`
    pub fn object_name(&self) -> Option<&str> {
        let href = self.href.as_deref()?;
        let name = href.trim_start_matches("./").trim_end_matches('/');
        (!name.is_empty()).then_some(name)
    }
}

impl Fields for DrawObject {
    fn set_field(&mut self, field: &str, value: String) {
        if field == "href" {
            self.href = Some(value);
        }
    }

    fn attach_child(&mut self, field: &str, child: Element) {
        if let ("math", Element::Math(math)) = (field, child) {
            self.math = Some(math);
        }
    }
}

/// `math:math` and its `semantics` wrapper
///
/// Only the formula annotation is kept; the presentation markup is
/// regenerated downstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Math {
    pub annotation: Option<String>,
}

impl Fields for Math {
    fn attach_child(&mut self, field: &str, child: Element) {
        match (field, child) {
            ("semantics", Element::Math(inner)) => {
                if inner.annotation.is_some() {
                    self.annotation = inner.annotation;
                }
            }
            ("annotation", Element::TextContent(t)) => self.annotation = Some(t.text),
            _ => {}
        }
    }
}

/// Character data of a leaf element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextContent {
    pub text: String,
}

impl Fields for TextContent {
    fn push_text(&mut self, field: &str, text: &str) {
        if field == "text" {
            self.text.push_str(text);
        }
    }
}

/// `draw:custom-shape`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawCustomShape {
    pub name: Option<String>,
    pub style_name: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub transform: Option<String>,
    pub geometry: Option<EnhancedGeometry>,
    /// Text typed into the shape
    pub paragraphs: Vec<Paragraph>,
}

impl Fields for DrawCustomShape {
    fn set_field(&mut self, field: &str, value: String) {
        match field {
            "name" => self.name = Some(value),
            "style_name" => self.style_name = Some(value),
            "x" => self.x = Some(value),
            "y" => self.y = Some(value),
            "width" => self.width = Some(value),
            "height" => self.height = Some(value),
            "transform" => self.transform = Some(value),
            _ => {}
        }
    }

    fn attach_child(&mut self, field: &str, child: Element) {
        match (field, child) {
            ("geometry", Element::EnhancedGeometry(g)) => self.geometry = Some(g),
            ("paragraphs", Element::Paragraph(p)) => self.paragraphs.push(p),
            _ => {}
        }
    }
}

/// `draw:enhanced-geometry`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnhancedGeometry {
    pub view_box: Option<String>,
    pub enhanced_path: Option<String>,
    /// Space separated `$N` modifier values
    pub modifiers: Option<String>,
    pub shape_type: Option<String>,
    pub equations: Vec<Equation>,
}

impl Fields for EnhancedGeometry {
    fn set_field(&mut self, field: &str, value: String) {
        match field {
            "view_box" => self.view_box = Some(value),
            "enhanced_path" => self.enhanced_path = Some(value),
            "modifiers" => self.modifiers = Some(value),
            "shape_type" => self.shape_type = Some(value),
            _ => {}
        }
    }

    fn attach_child(&mut self, field: &str, child: Element) {
        if let ("equations", Element::Equation(eq)) = (field, child) {
            self.equations.push(eq);
        }
    }
}

/// `draw:equation`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Equation {
    pub name: String,
    pub formula: String,
}

impl Fields for Equation {
    fn set_field(&mut self, field: &str, value: String) {
        match field {
            "name" => self.name = value,
            "formula" => self.formula = value,
            _ => {}
        }
    }
}

/// `draw:g`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawGroup {
    pub name: Option<String>,
    /// Frames, shapes and nested groups
    pub members: Vec<Inline>,
}

impl Fields for DrawGroup {
    fn set_field(&mut self, field: &str, value: String) {
        if field == "name" {
            self.name = Some(value);
        }
    }

    fn attach_child(&mut self, field: &str, child: Element) {
        if field == "members" {
            push_inline(&mut self.members, child);
        }
    }
}
