//! Tags and payloads carried by tag tree nodes
//!
//! The tag set is closed: block markers (paragraphs, headings, lists,
//! tables), inline markers (emphasis, links, images), layout markers
//! (line ends, blank lines) and markers consumed by normalization passes
//! (change tracking, bookmarks).

use serde::{Deserialize, Serialize};

/// Tag of a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tag {
    /// Document root
    Body,
    /// Paragraph
    P,
    /// Heading level 1
    H1,
    /// Heading level 2
    H2,
    /// Heading level 3
    H3,
    /// Heading level 4
    H4,
    /// Fenced code block
    Pre,
    /// Inline code span
    Code,
    /// Bold
    B,
    /// Italic
    I,
    /// Bold and italic as a single marker
    BI,
    /// Hyperlink
    A,
    /// Raster image
    Img,
    /// Inline SVG drawing
    Svg,
    /// One path of an SVG drawing
    SvgPath,
    /// Text placed on an SVG drawing
    SvgText,
    /// Table of contents (listified by a normalization pass)
    Toc,
    /// List (ordered or not; the marker lives on the items)
    Ul,
    /// List item
    Li,
    /// Table
    Table,
    /// Table row
    Tr,
    /// Table cell
    Td,
    /// Line break inside a block
    Br,
    /// End of a block line
    Eol,
    /// Blank line between blocks
    Blank,
    /// Formula
    MathMl,
    /// Start of a suggested edit
    ChangeStart,
    /// End of a suggested edit
    ChangeEnd,
    /// Anchor target
    Bookmark,
    /// Text emitted verbatim in every render mode
    Raw,
    /// Visible conversion warning
    Warning,
}

impl Tag {
    /// Name used in tree dumps
    pub fn name(self) -> &'static str {
        match self {
            Tag::Body => "BODY",
            Tag::P => "P",
            Tag::H1 => "H1",
            Tag::H2 => "H2",
            Tag::H3 => "H3",
            Tag::H4 => "H4",
            Tag::Pre => "PRE",
            Tag::Code => "CODE",
            Tag::B => "B",
            Tag::I => "I",
            Tag::BI => "BI",
            Tag::A => "A",
            Tag::Img => "IMG/",
            Tag::Svg => "SVG",
            Tag::SvgPath => "SVG_PATH/",
            Tag::SvgText => "SVG_TEXT",
            Tag::Toc => "TOC",
            Tag::Ul => "UL",
            Tag::Li => "LI",
            Tag::Table => "TABLE",
            Tag::Tr => "TR",
            Tag::Td => "TD",
            Tag::Br => "BR/",
            Tag::Eol => "EOL/",
            Tag::Blank => "BLANK/",
            Tag::MathMl => "MATHML",
            Tag::ChangeStart => "CHANGE_START/",
            Tag::ChangeEnd => "CHANGE_END/",
            Tag::Bookmark => "BOOKMARK/",
            Tag::Raw => "RAW",
            Tag::Warning => "WARNING",
        }
    }

    /// Heading tag for a level, clamped to 1-4
    pub fn heading(level: u8) -> Tag {
        match level {
            0 | 1 => Tag::H1,
            2 => Tag::H2,
            3 => Tag::H3,
            _ => Tag::H4,
        }
    }

    /// Heading level of a heading tag
    pub fn heading_level(self) -> Option<usize> {
        match self {
            Tag::H1 => Some(1),
            Tag::H2 => Some(2),
            Tag::H3 => Some(3),
            Tag::H4 => Some(4),
            _ => None,
        }
    }

    /// Whether this is a heading tag
    pub fn is_heading(self) -> bool {
        self.heading_level().is_some()
    }

    /// Paragraph or heading
    pub fn is_paragraph_like(self) -> bool {
        self == Tag::P || self.is_heading()
    }

    /// Block-level tags that sit on their own lines
    pub fn is_block(self) -> bool {
        matches!(
            self,
            Tag::P | Tag::H1 | Tag::H2 | Tag::H3 | Tag::H4 | Tag::Pre | Tag::Ul | Tag::Table | Tag::Toc
        )
    }

    /// Emphasis tags
    pub fn is_emphasis(self) -> bool {
        matches!(self, Tag::B | Tag::I | Tag::BI)
    }

    /// Inline tags that only style their children
    pub fn is_inline_format(self) -> bool {
        matches!(self, Tag::B | Tag::I | Tag::BI | Tag::Code)
    }

    /// Marker tags that never carry children
    pub fn is_void(self) -> bool {
        matches!(
            self,
            Tag::Img
                | Tag::SvgPath
                | Tag::Br
                | Tag::Eol
                | Tag::Blank
                | Tag::ChangeStart
                | Tag::ChangeEnd
                | Tag::Bookmark
        )
    }
}

/// Numbering format of an ordered list level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberFormat {
    /// 1, 2, 3
    Decimal,
    /// a, b, c
    LowerAlpha,
    /// A, B, C
    UpperAlpha,
    /// i, ii, iii
    LowerRoman,
    /// I, II, III
    UpperRoman,
}

impl NumberFormat {
    /// Parse an OpenDocument `style:num-format` value
    ///
    /// An empty format means the level is not numbered.
    pub fn from_odf(format: &str) -> Option<Self> {
        match format {
            "1" => Some(NumberFormat::Decimal),
            "a" => Some(NumberFormat::LowerAlpha),
            "A" => Some(NumberFormat::UpperAlpha),
            "i" => Some(NumberFormat::LowerRoman),
            "I" => Some(NumberFormat::UpperRoman),
            _ => None,
        }
    }

    /// Format a counter value
    pub fn format(self, number: u32) -> String {
        match self {
            NumberFormat::Decimal => number.to_string(),
            NumberFormat::LowerAlpha => alpha(number),
            NumberFormat::UpperAlpha => alpha(number).to_uppercase(),
            NumberFormat::LowerRoman => roman(number).to_lowercase(),
            NumberFormat::UpperRoman => roman(number),
        }
    }
}

fn alpha(mut number: u32) -> String {
    if number == 0 {
        return "0".to_string();
    }
    let mut letters = Vec::new();
    while number > 0 {
        number -= 1;
        letters.push((b'a' + (number % 26) as u8) as char);
        number /= 26;
    }
    letters.iter().rev().collect()
}

fn roman(mut number: u32) -> String {
    const NUMERALS: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    if number == 0 {
        return "0".to_string();
    }
    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while number >= value {
            out.push_str(numeral);
            number -= value;
        }
    }
    out
}

/// Resolved geometry of a drawing node, in CSS pixels
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    /// Left offset inside the drawing
    pub x: f64,
    /// Top offset inside the drawing
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
    /// Coordinate system of the path data (`min-x min-y width height`)
    pub view_box: Option<[f64; 4]>,
    /// SVG path data
    pub path: String,
    /// Fill colour, `none` for unfilled shapes
    pub fill: Option<String>,
    /// Stroke colour, `none` for unstroked shapes
    pub stroke: Option<String>,
    /// Stroke width in pixels
    pub stroke_width: Option<f64>,
}

/// Optional data attached to a tag node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Payload {
    /// Code block language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Link or image target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Image alternative text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Bookmark or change id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Nesting level of a list or list item (0 = top level)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_level: Option<usize>,
    /// List style name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_style: Option<String>,
    /// Bullet glyph of an unordered item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullet: Option<String>,
    /// Counter value of an ordered item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    /// Numbering format of an ordered item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<NumberFormat>,
    /// First counter value of an ordered level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_value: Option<u32>,
    /// List continues the numbering of the previous list
    #[serde(default)]
    pub continue_numbering: bool,
    /// List produced from a table of contents
    #[serde(default)]
    pub toc: bool,
    /// Unnumbered list header item, rendered without a marker
    #[serde(default)]
    pub list_header: bool,
    /// Table cell column span
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colspan: Option<u32>,
    /// Table cell row span
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rowspan: Option<u32>,
    /// Drawing geometry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    /// Free text (formula source, warning message)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Payload {
    /// Payload with only a link target
    pub fn href(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Default::default()
        }
    }

    /// Payload with only an id
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Payload with only a code language
    pub fn lang(lang: impl Into<String>) -> Self {
        Self {
            lang: Some(lang.into()),
            ..Default::default()
        }
    }

    /// Payload with only free text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Whether a list item carries a numeric marker
    pub fn is_numbered(&self) -> bool {
        self.number_format.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_levels_clamp() {
        assert_eq!(Tag::heading(1), Tag::H1);
        assert_eq!(Tag::heading(4), Tag::H4);
        assert_eq!(Tag::heading(6), Tag::H4);
        assert_eq!(Tag::H3.heading_level(), Some(3));
        assert_eq!(Tag::P.heading_level(), None);
    }

    #[test]
    fn test_number_formats() {
        assert_eq!(NumberFormat::Decimal.format(12), "12");
        assert_eq!(NumberFormat::LowerAlpha.format(1), "a");
        assert_eq!(NumberFormat::LowerAlpha.format(27), "aa");
        assert_eq!(NumberFormat::UpperAlpha.format(3), "C");
        assert_eq!(NumberFormat::LowerRoman.format(4), "iv");
        assert_eq!(NumberFormat::UpperRoman.format(1994), "MCMXCIV");
    }

    #[test]
    fn test_number_format_from_odf() {
        assert_eq!(NumberFormat::from_odf("1"), Some(NumberFormat::Decimal));
        assert_eq!(NumberFormat::from_odf("I"), Some(NumberFormat::UpperRoman));
        assert_eq!(NumberFormat::from_odf(""), None);
    }

    #[test]
    fn test_payload_serialization_skips_empty_fields() {
        let payload = Payload::href("https://example.com");
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(
            json,
            r#"{"href":"https://example.com","continue_numbering":false,"toc":false,"list_header":false}"#
        );
    }
}
