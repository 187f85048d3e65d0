//! Parsed OpenDocument text package

use std::collections::HashMap;

use crate::archive::OdfArchive;
use crate::error::{OdfError, Result};
use crate::model::registry::odf_registry;
use crate::model::{DocumentContent, DocumentStyles, Element, Math};
use crate::schema::Record;
use crate::unmarshal::Unmarshaller;

const CONTENT_ROOT: &str = "office:document-content";
const STYLES_ROOT: &str = "office:document-styles";

/// Typed view of `content.xml`, `styles.xml` and embedded formula objects
#[derive(Debug, Clone, Default)]
pub struct OdfDocument {
    pub content: DocumentContent,
    pub styles: DocumentStyles,
    /// Formula objects keyed by directory name, e.g. `Object 1`
    pub objects: HashMap<String, Math>,
}

impl OdfDocument {
    /// Parse `content.xml` and, when present, `styles.xml`
    pub fn parse(content_xml: &[u8], styles_xml: Option<&[u8]>) -> Result<Self> {
        let unmarshaller = Unmarshaller::new(odf_registry())?;

        let content = match unmarshaller.unmarshal("DocumentContent", CONTENT_ROOT, content_xml)? {
            Element::DocumentContent(content) => content,
            other => return Err(OdfError::UnknownType(other.type_name().to_string())),
        };

        let styles = match styles_xml {
            Some(xml) => match unmarshaller.unmarshal("DocumentStyles", STYLES_ROOT, xml)? {
                Element::DocumentStyles(styles) => styles,
                other => return Err(OdfError::UnknownType(other.type_name().to_string())),
            },
            None => DocumentStyles::default(),
        };

        Ok(Self {
            content,
            styles,
            objects: HashMap::new(),
        })
    }

    /// Parse a whole package, including formula objects
    ///
    /// A formula object that fails to parse is logged and left out; the frame
    /// referring to it degrades to an empty formula.
    pub fn from_archive(archive: &OdfArchive) -> Result<Self> {
        let mut document = Self::parse(archive.content_xml()?, archive.styles_xml())?;
        for (name, xml) in archive.objects() {
            match parse_math(xml) {
                Ok(math) => {
                    document.objects.insert(name.to_string(), math);
                }
                Err(err) => log::warn!("skipping formula object {name}: {err}"),
            }
        }
        Ok(document)
    }
}

/// Parse a formula object, whose root may or may not carry the `math:` prefix
pub fn parse_math(xml: &[u8]) -> Result<Math> {
    let unmarshaller = Unmarshaller::new(odf_registry())?;
    let element = match unmarshaller.unmarshal("Math", "math", xml) {
        Err(OdfError::MissingRoot(_)) => unmarshaller.unmarshal("Math", "math:math", xml)?,
        other => other?,
    };
    match element {
        Element::Math(math) => Ok(math),
        other => Err(OdfError::UnknownType(other.type_name().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Inline};
    use crate::test_utils::{content_xml, styles_xml, OdtBuilder};

    #[test]
    fn test_parse_paragraph_with_span() {
        let xml = content_xml(
            r#"<style:style style:name="T1" style:family="text"><style:text-properties fo:font-weight="bold"/></style:style>"#,
            r#"<text:p text:style-name="P1">Hello <text:span text:style-name="T1">world</text:span><text:s text:c="2"/>!</text:p>"#,
        );
        let doc = OdfDocument::parse(xml.as_bytes(), None).unwrap();

        assert_eq!(doc.content.automatic_styles.styles.len(), 1);
        let Block::Paragraph(p) = &doc.content.body.text.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.style_name.as_deref(), Some("P1"));
        assert_eq!(p.plain_text(), "Hello world  !");
        assert!(matches!(p.children[1], Inline::Span(_)));
        assert_eq!(p.children[2], Inline::Space(2));
    }

    #[test]
    fn test_formula_object_from_archive() {
        let object = br#"<math xmlns="http://www.w3.org/1998/Math/MathML"><semantics><mi>x</mi><annotation encoding="StarMath 5.0">x^2</annotation></semantics></math>"#;
        let body = r#"<text:p><draw:frame draw:name="Object1"><draw:object xlink:href="./Object 1"/></draw:frame></text:p>"#;
        let bytes = OdtBuilder::new()
            .content(content_xml("", body))
            .styles(styles_xml("", ""))
            .file("Object 1/content.xml", object)
            .build()
            .unwrap();
        let archive = OdfArchive::from_bytes(&bytes).unwrap();
        let doc = OdfDocument::from_archive(&archive).unwrap();

        assert_eq!(
            doc.objects["Object 1"].annotation.as_deref(),
            Some("x^2")
        );
    }

    #[test]
    fn test_wrong_root_is_reported() {
        let err = OdfDocument::parse(b"<office:document-styles/>", None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing root element: expected <office:document-content>"
        );
    }
}
