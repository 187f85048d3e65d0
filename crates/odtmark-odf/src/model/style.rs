//! Style records and their property bags

use super::{parse_number, Element, Fields};

/// `office:styles` or `office:automatic-styles`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleCatalog {
    pub styles: Vec<Style>,
    pub list_styles: Vec<ListStyle>,
}

impl StyleCatalog {
    /// Find a style by name
    pub fn style(&self, name: &str) -> Option<&Style> {
        self.styles.iter().find(|s| s.name == name)
    }

    /// Find a list style by name
    pub fn list_style(&self, name: &str) -> Option<&ListStyle> {
        self.list_styles.iter().find(|s| s.name == name)
    }
}

impl Fields for StyleCatalog {
    fn attach_child(&mut self, field: &str, child: Element) {
        match (field, child) {
            ("styles", Element::Style(style)) => self.styles.push(style),
            ("list_styles", Element::ListStyle(style)) => self.list_styles.push(style),
            _ => {}
        }
    }
}

/// `style:style`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    pub name: String,
    pub family: Option<String>,
    pub parent_style_name: Option<String>,
    pub list_style_name: Option<String>,
    pub display_name: Option<String>,
    pub text: TextProperties,
    pub paragraph: ParagraphProperties,
    pub graphic: GraphicProperties,
}

impl Style {
    /// Fill every unset field from `parent`; fields set here win
    pub fn inherit(&mut self, parent: &Style) {
        inherit(&mut self.family, &parent.family);
        inherit(&mut self.list_style_name, &parent.list_style_name);
        self.text.inherit(&parent.text);
        self.paragraph.inherit(&parent.paragraph);
        self.graphic.inherit(&parent.graphic);
    }
}

impl Fields for Style {
    fn set_field(&mut self, field: &str, value: String) {
        match field {
            "name" => self.name = value,
            "family" => self.family = Some(value),
            "parent_style_name" => self.parent_style_name = Some(value),
            "list_style_name" => self.list_style_name = Some(value),
            "display_name" => self.display_name = Some(value),
            _ => {}
        }
    }

    fn attach_child(&mut self, field: &str, child: Element) {
        match (field, child) {
            ("text", Element::TextProperties(p)) => self.text = p,
            ("paragraph", Element::ParagraphProperties(p)) => self.paragraph = p,
            ("graphic", Element::GraphicProperties(p)) => self.graphic = p,
            _ => {}
        }
    }
}

fn inherit(field: &mut Option<String>, parent: &Option<String>) {
    if field.is_none() {
        field.clone_from(parent);
    }
}

/// `style:text-properties`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextProperties {
    /// `style:font-name`, a font-face declaration name
    pub font_name: Option<String>,
    pub font_family: Option<String>,
    pub font_weight: Option<String>,
    pub font_style: Option<String>,
    pub text_position: Option<String>,
    pub underline_style: Option<String>,
    pub color: Option<String>,
    pub background_color: Option<String>,
}

impl TextProperties {
    pub fn is_bold(&self) -> bool {
        match self.font_weight.as_deref() {
            Some("bold") => true,
            Some(weight) => parse_number::<u32>(weight).is_some_and(|w| w >= 600),
            None => false,
        }
    }

    pub fn is_italic(&self) -> bool {
        matches!(self.font_style.as_deref(), Some("italic" | "oblique"))
    }

    /// Fill every unset property from `parent`
    pub fn inherit(&mut self, parent: &TextProperties) {
        inherit(&mut self.font_name, &parent.font_name);
        inherit(&mut self.font_family, &parent.font_family);
        inherit(&mut self.font_weight, &parent.font_weight);
        inherit(&mut self.font_style, &parent.font_style);
        inherit(&mut self.text_position, &parent.text_position);
        inherit(&mut self.underline_style, &parent.underline_style);
        inherit(&mut self.color, &parent.color);
        inherit(&mut self.background_color, &parent.background_color);
    }
}

impl Fields for TextProperties {
    fn set_field(&mut self, field: &str, value: String) {
        match field {
            "font_name" => self.font_name = Some(value),
            "font_family" => self.font_family = Some(value),
            "font_weight" => self.font_weight = Some(value),
            "font_style" => self.font_style = Some(value),
            "text_position" => self.text_position = Some(value),
            "underline_style" => self.underline_style = Some(value),
            "color" => self.color = Some(value),
            "background_color" => self.background_color = Some(value),
            _ => {}
        }
    }
}

/// `style:paragraph-properties`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphProperties {
    pub margin_left: Option<String>,
    pub text_align: Option<String>,
}

impl ParagraphProperties {
    fn inherit(&mut self, parent: &ParagraphProperties) {
        inherit(&mut self.margin_left, &parent.margin_left);
        inherit(&mut self.text_align, &parent.text_align);
    }
}

impl Fields for ParagraphProperties {
    fn set_field(&mut self, field: &str, value: String) {
        match field {
            "margin_left" => self.margin_left = Some(value),
            "text_align" => self.text_align = Some(value),
            _ => {}
        }
    }
}

/// `style:graphic-properties`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphicProperties {
    /// `none`, `solid`, ...
    pub fill: Option<String>,
    pub fill_color: Option<String>,
    pub stroke: Option<String>,
    pub stroke_color: Option<String>,
    pub stroke_width: Option<String>,
}

impl GraphicProperties {
    fn inherit(&mut self, parent: &GraphicProperties) {
        inherit(&mut self.fill, &parent.fill);
        inherit(&mut self.fill_color, &parent.fill_color);
        inherit(&mut self.stroke, &parent.stroke);
        inherit(&mut self.stroke_color, &parent.stroke_color);
        inherit(&mut self.stroke_width, &parent.stroke_width);
    }
}

impl Fields for GraphicProperties {
    fn set_field(&mut self, field: &str, value: String) {
        match field {
            "fill" => self.fill = Some(value),
            "fill_color" => self.fill_color = Some(value),
            "stroke" => self.stroke = Some(value),
            "stroke_color" => self.stroke_color = Some(value),
            "stroke_width" => self.stroke_width = Some(value),
            _ => {}
        }
    }
}

/// `text:list-style`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListStyle {
    pub name: String,
    pub levels: Vec<ListLevelStyle>,
}

impl ListStyle {
    /// Rule for a 1-based level
    pub fn level(&self, level: usize) -> Option<&ListLevelStyle> {
        self.levels.iter().find(|l| l.level == level)
    }
}

impl Fields for ListStyle {
    fn set_field(&mut self, field: &str, value: String) {
        if field == "name" {
            self.name = value;
        }
    }

    fn attach_child(&mut self, field: &str, child: Element) {
        if let ("levels", Element::ListLevelStyle(level)) = (field, child) {
            self.levels.push(level);
        }
    }
}

/// Whether a list level shows a glyph or a number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListLevelKind {
    #[default]
    Bullet,
    Number,
}

/// `text:list-level-style-bullet`, `-number` or `-image`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListLevelStyle {
    /// 1-based level
    pub level: usize,
    pub kind: ListLevelKind,
    pub bullet_char: Option<String>,
    /// `1`, `a`, `A`, `i` or `I`
    pub num_format: Option<String>,
    pub num_suffix: Option<String>,
    pub start_value: Option<u32>,
}

impl Fields for ListLevelStyle {
    fn set_field(&mut self, field: &str, value: String) {
        match field {
            "level" => self.level = parse_number(&value).unwrap_or(1),
            "bullet_char" => self.bullet_char = Some(value),
            "num_format" => self.num_format = Some(value),
            "num_suffix" => self.num_suffix = Some(value),
            "start_value" => self.start_value = parse_number(&value),
            _ => {}
        }
    }
}
