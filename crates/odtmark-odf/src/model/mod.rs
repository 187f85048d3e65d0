//! Typed OpenDocument object model
//!
//! Records are plain structs filled in by the unmarshaller. [`Element`] is
//! the closed set of record types the ODF registry knows about; each record
//! implements [`Fields`] to accept the attribute, child and text bindings
//! declared for it in [`registry`].

mod document;
mod draw;
pub mod registry;
mod style;
mod table;
mod text;

pub use document::{Block, Body, DocumentContent, DocumentStyles, FontFace, FontFaceDecls, OfficeText, Section};
pub use draw::{
    DrawCustomShape, DrawFrame, DrawGroup, DrawImage, DrawObject, EnhancedGeometry, Equation,
    Math, TextContent,
};
pub use style::{
    GraphicProperties, ListLevelKind, ListLevelStyle, ListStyle, ParagraphProperties, Style,
    StyleCatalog, TextProperties,
};
pub use table::{Table, TableCell, TableRow, TableRowGroup};
pub use text::{
    Bookmark, ChangeEnd, ChangeStart, IndexBody, Inline, LineBreak, Link, List, ListItem,
    Paragraph, Space, Span, Tab, TableOfContents,
};

use crate::schema::Record;

/// Receives the bindings the registry declares for a record
///
/// Unknown field names are ignored, so a record only handles what it stores.
pub trait Fields {
    /// Attribute value bound to `field`
    fn set_field(&mut self, _field: &str, _value: String) {}

    /// Finished child element bound to `field`
    fn attach_child(&mut self, _field: &str, _child: Element) {}

    /// Character data for `field`
    fn push_text(&mut self, _field: &str, _text: &str) {}
}

macro_rules! elements {
    ($($variant:ident),* $(,)?) => {
        /// Any record the ODF registry can produce
        #[derive(Debug, Clone, PartialEq)]
        pub enum Element {
            $($variant($variant),)*
        }

        impl Record for Element {
            fn type_name(&self) -> &'static str {
                match self {
                    $(Element::$variant(_) => stringify!($variant),)*
                }
            }

            fn set_attribute(&mut self, field: &str, value: String) {
                match self {
                    $(Element::$variant(v) => v.set_field(field, value),)*
                }
            }

            fn attach(&mut self, field: &str, child: Element) {
                match self {
                    $(Element::$variant(v) => v.attach_child(field, child),)*
                }
            }

            fn append_text(&mut self, field: &str, text: &str) {
                match self {
                    $(Element::$variant(v) => v.push_text(field, text),)*
                }
            }
        }

        $(
            impl From<$variant> for Element {
                fn from(value: $variant) -> Self {
                    Element::$variant(value)
                }
            }
        )*
    };
}

elements! {
    DocumentContent,
    DocumentStyles,
    FontFaceDecls,
    FontFace,
    Body,
    OfficeText,
    Section,
    Paragraph,
    Span,
    Link,
    Space,
    Tab,
    LineBreak,
    Bookmark,
    ChangeStart,
    ChangeEnd,
    List,
    ListItem,
    TableOfContents,
    IndexBody,
    Table,
    TableRowGroup,
    TableRow,
    TableCell,
    DrawFrame,
    DrawImage,
    DrawObject,
    Math,
    TextContent,
    DrawCustomShape,
    EnhancedGeometry,
    Equation,
    DrawGroup,
    StyleCatalog,
    Style,
    TextProperties,
    ParagraphProperties,
    GraphicProperties,
    ListStyle,
    ListLevelStyle,
}

/// Parse a numeric attribute, ignoring malformed values
pub(crate) fn parse_number<T: std::str::FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}

/// ODF boolean attribute
pub(crate) fn parse_bool(value: &str) -> bool {
    value.trim() == "true"
}
