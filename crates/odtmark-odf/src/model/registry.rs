//! The ODF text dialect as a schema registry

use std::sync::OnceLock;

use super::*;
use crate::schema::{ElementSchema, SchemaRegistry};

/// Shared registry for `content.xml`, `styles.xml` and formula objects
pub fn odf_registry() -> &'static SchemaRegistry<Element> {
    static REGISTRY: OnceLock<SchemaRegistry<Element>> = OnceLock::new();
    REGISTRY.get_or_init(build)
}

/// Child bindings shared by every container of inline content
fn inline_children(schema: ElementSchema<Element>) -> ElementSchema<Element> {
    schema
        .children("text:span", "children", "Span")
        .children("text:a", "children", "Link")
        .children("text:s", "children", "Space")
        .children("text:tab", "children", "Tab")
        .children("text:line-break", "children", "LineBreak")
        .children("draw:frame", "children", "DrawFrame")
        .children("draw:custom-shape", "children", "DrawCustomShape")
        .children("draw:g", "children", "DrawGroup")
        .children("text:bookmark", "children", "Bookmark")
        .children("text:bookmark-start", "children", "Bookmark")
        .children("text:change-start", "children", "ChangeStart")
        .children("text:change-end", "children", "ChangeEnd")
        .text("children")
}

/// Child bindings shared by every container of block content
fn block_children(schema: ElementSchema<Element>, field: &'static str) -> ElementSchema<Element> {
    schema
        .children("text:p", field, "Paragraph")
        .children("text:h", field, "Heading")
        .children("text:list", field, "List")
        .children("table:table", field, "Table")
        .children("text:table-of-content", field, "TableOfContents")
        .children("text:section", field, "Section")
}

fn build() -> SchemaRegistry<Element> {
    let mut registry: SchemaRegistry<Element> = SchemaRegistry::new();

    // Document roots
    registry.register(
        ElementSchema::new("DocumentContent", || DocumentContent::default().into())
            .child("office:font-face-decls", "font_faces", "FontFaceDecls")
            .child("office:automatic-styles", "automatic_styles", "StyleCatalog")
            .child("office:body", "body", "Body"),
    );
    registry.register(
        ElementSchema::new("DocumentStyles", || DocumentStyles::default().into())
            .child("office:font-face-decls", "font_faces", "FontFaceDecls")
            .child("office:styles", "styles", "StyleCatalog")
            .child("office:automatic-styles", "automatic_styles", "StyleCatalog"),
    );
    registry.register(
        ElementSchema::new("FontFaceDecls", || FontFaceDecls::default().into())
            .children("style:font-face", "faces", "FontFace"),
    );
    registry.register(
        ElementSchema::new("FontFace", || FontFace::default().into())
            .attr("style:name", "name")
            .attr("svg:font-family", "family")
            .attr("style:font-pitch", "pitch")
            .attr("style:font-family-generic", "generic"),
    );
    registry.register(
        ElementSchema::new("Body", || Body::default().into())
            .child("office:text", "text", "OfficeText"),
    );
    registry.register(block_children(
        ElementSchema::new("OfficeText", || OfficeText::default().into()),
        "blocks",
    ));
    registry.register(block_children(
        ElementSchema::new("Section", || Section::default().into()).attr("text:name", "name"),
        "blocks",
    ));

    // Paragraphs and inline content
    registry.register(inline_children(
        ElementSchema::new("Paragraph", || Paragraph::default().into())
            .attr("text:style-name", "style_name")
            .attr("text:outline-level", "outline_level"),
    ));
    registry.register(inline_children(
        ElementSchema::new("Heading", || {
            Paragraph {
                heading: true,
                ..Default::default()
            }
            .into()
        })
        .attr("text:style-name", "style_name")
        .attr("text:outline-level", "outline_level"),
    ));
    registry.register(inline_children(
        ElementSchema::new("Span", || Span::default().into()).attr("text:style-name", "style_name"),
    ));
    registry.register(inline_children(
        ElementSchema::new("Link", || Link::default().into())
            .attr("xlink:href", "href")
            .attr("text:style-name", "style_name"),
    ));
    registry.register(ElementSchema::new("Space", || Space::default().into()).attr("text:c", "count"));
    registry.register(ElementSchema::new("Tab", || Tab.into()));
    registry.register(ElementSchema::new("LineBreak", || LineBreak.into()));
    registry.register(
        ElementSchema::new("Bookmark", || Bookmark::default().into()).attr("text:name", "name"),
    );
    registry.register(
        ElementSchema::new("ChangeStart", || ChangeStart::default().into())
            .attr("text:change-id", "change_id"),
    );
    registry.register(
        ElementSchema::new("ChangeEnd", || ChangeEnd::default().into())
            .attr("text:change-id", "change_id"),
    );

    // Lists and indexes
    registry.register(
        ElementSchema::new("List", || List::default().into())
            .attr("text:style-name", "style_name")
            .attr("text:continue-numbering", "continue_numbering")
            .attr("text:continue-list", "continue_list")
            .attr("xml:id", "id")
            .children("text:list-item", "items", "ListItem")
            .children("text:list-header", "items", "ListHeader"),
    );
    registry.register(block_children(
        ElementSchema::new("ListItem", || ListItem::default().into())
            .attr("text:start-value", "start_value"),
        "blocks",
    ));
    registry.register(block_children(
        ElementSchema::new("ListHeader", || {
            ListItem {
                header: true,
                ..Default::default()
            }
            .into()
        }),
        "blocks",
    ));
    registry.register(
        ElementSchema::new("TableOfContents", || TableOfContents::default().into())
            .attr("text:name", "name")
            .child("text:index-body", "body", "IndexBody"),
    );
    registry.register(
        ElementSchema::new("IndexBody", || IndexBody::default().into())
            .children("text:index-title", "title", "IndexBody")
            .children("text:p", "paragraphs", "Paragraph")
            .children("text:h", "paragraphs", "Heading"),
    );

    // Tables
    registry.register(
        ElementSchema::new("Table", || Table::default().into())
            .attr("table:name", "name")
            .attr("table:style-name", "style_name")
            .children("table:table-row", "rows", "TableRow")
            .children("table:table-header-rows", "rows", "TableRowGroup")
            .children("table:table-rows", "rows", "TableRowGroup"),
    );
    registry.register(
        ElementSchema::new("TableRowGroup", || TableRowGroup::default().into())
            .children("table:table-row", "rows", "TableRow"),
    );
    registry.register(
        ElementSchema::new("TableRow", || TableRow::default().into())
            .children("table:table-cell", "cells", "TableCell"),
    );
    registry.register(block_children(
        ElementSchema::new("TableCell", || TableCell::default().into())
            .attr("table:number-columns-spanned", "column_span")
            .attr("table:number-rows-spanned", "row_span"),
        "blocks",
    ));

    // Drawings
    registry.register(
        ElementSchema::new("DrawFrame", || DrawFrame::default().into())
            .attr("draw:name", "name")
            .attr("draw:style-name", "style_name")
            .attr("svg:x", "x")
            .attr("svg:y", "y")
            .attr("svg:width", "width")
            .attr("svg:height", "height")
            .child("draw:image", "image", "DrawImage")
            .child("draw:object", "object", "DrawObject")
            .child("svg:title", "title", "TextContent")
            .child("svg:desc", "desc", "TextContent"),
    );
    registry.register(
        ElementSchema::new("DrawImage", || DrawImage::default().into()).attr("xlink:href", "href"),
    );
    registry.register(
        ElementSchema::new("DrawObject", || DrawObject::default().into())
            .attr("xlink:href", "href")
            .child("math:math", "math", "Math"),
    );
    registry.register(
        ElementSchema::new("Math", || Math::default().into())
            .child("math:semantics", "semantics", "Math")
            .child("semantics", "semantics", "Math")
            .child("math:annotation", "annotation", "TextContent")
            .child("annotation", "annotation", "TextContent"),
    );
    registry.register(ElementSchema::new("TextContent", || TextContent::default().into()).text("text"));
    registry.register(
        ElementSchema::new("DrawCustomShape", || DrawCustomShape::default().into())
            .attr("draw:name", "name")
            .attr("draw:style-name", "style_name")
            .attr("svg:x", "x")
            .attr("svg:y", "y")
            .attr("svg:width", "width")
            .attr("svg:height", "height")
            .attr("draw:transform", "transform")
            .child("draw:enhanced-geometry", "geometry", "EnhancedGeometry")
            .children("text:p", "paragraphs", "Paragraph"),
    );
    registry.register(
        ElementSchema::new("EnhancedGeometry", || EnhancedGeometry::default().into())
            .attr("svg:viewBox", "view_box")
            .attr("draw:enhanced-path", "enhanced_path")
            .attr("draw:modifiers", "modifiers")
            .attr("draw:type", "shape_type")
            .children("draw:equation", "equations", "Equation"),
    );
    registry.register(
        ElementSchema::new("Equation", || Equation::default().into())
            .attr("draw:name", "name")
            .attr("draw:formula", "formula"),
    );
    registry.register(
        ElementSchema::new("DrawGroup", || DrawGroup::default().into())
            .attr("draw:name", "name")
            .children("draw:frame", "members", "DrawFrame")
            .children("draw:custom-shape", "members", "DrawCustomShape")
            .children("draw:g", "members", "DrawGroup"),
    );

    // Styles
    registry.register(
        ElementSchema::new("StyleCatalog", || StyleCatalog::default().into())
            .children("style:style", "styles", "Style")
            .children("text:list-style", "list_styles", "ListStyle"),
    );
    registry.register(
        ElementSchema::new("Style", || Style::default().into())
            .attr("style:name", "name")
            .attr("style:family", "family")
            .attr("style:parent-style-name", "parent_style_name")
            .attr("style:list-style-name", "list_style_name")
            .attr("style:display-name", "display_name")
            .child("style:text-properties", "text", "TextProperties")
            .child("style:paragraph-properties", "paragraph", "ParagraphProperties")
            .child("style:graphic-properties", "graphic", "GraphicProperties"),
    );
    registry.register(
        ElementSchema::new("TextProperties", || TextProperties::default().into())
            .attr("style:font-name", "font_name")
            .attr("fo:font-family", "font_family")
            .attr("fo:font-weight", "font_weight")
            .attr("fo:font-style", "font_style")
            .attr("style:text-position", "text_position")
            .attr("style:text-underline-style", "underline_style")
            .attr("fo:color", "color")
            .attr("fo:background-color", "background_color"),
    );
    registry.register(
        ElementSchema::new("ParagraphProperties", || ParagraphProperties::default().into())
            .attr("fo:margin-left", "margin_left")
            .attr("fo:text-align", "text_align"),
    );
    registry.register(
        ElementSchema::new("GraphicProperties", || GraphicProperties::default().into())
            .attr("draw:fill", "fill")
            .attr("draw:fill-color", "fill_color")
            .attr("draw:stroke", "stroke")
            .attr("svg:stroke-color", "stroke_color")
            .attr("svg:stroke-width", "stroke_width"),
    );
    registry.register(
        ElementSchema::new("ListStyle", || ListStyle::default().into())
            .attr("style:name", "name")
            .children("text:list-level-style-bullet", "levels", "ListLevelStyleBullet")
            .children("text:list-level-style-image", "levels", "ListLevelStyleBullet")
            .children("text:list-level-style-number", "levels", "ListLevelStyleNumber"),
    );
    registry.register(list_level("ListLevelStyleBullet", || {
        ListLevelStyle::default().into()
    }));
    registry.register(list_level("ListLevelStyleNumber", || {
        ListLevelStyle {
            kind: ListLevelKind::Number,
            ..Default::default()
        }
        .into()
    }));

    registry
}

fn list_level(type_name: &'static str, construct: fn() -> Element) -> ElementSchema<Element> {
    ElementSchema::new(type_name, construct)
        .attr("text:level", "level")
        .attr("text:bullet-char", "bullet_char")
        .attr("style:num-format", "num_format")
        .attr("style:num-suffix", "num_suffix")
        .attr("text:start-value", "start_value")
}
