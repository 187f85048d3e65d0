//! Schema-driven XML unmarshaller
//!
//! Walks quick-xml events once, keeping a stack of open frames. Each frame
//! holds the record under construction, the schema it was built from and
//! the element name that closes it. Finished records are attached to the
//! parent frame when their element closes, so siblings land in document
//! order. Elements the current schema does not map are skipped together with
//! everything inside them.

use std::borrow::Cow;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{OdfError, Result};
use crate::schema::{Cardinality, ChildBinding, ElementSchema, Record, SchemaRegistry};

/// Builds typed records from XML using a [`SchemaRegistry`]
#[derive(Debug)]
pub struct Unmarshaller<'r, V> {
    registry: &'r SchemaRegistry<V>,
}

struct Frame<'r, V> {
    value: V,
    schema: &'r ElementSchema<V>,
    tag: Vec<u8>,
    binding: Option<&'r ChildBinding>,
    filled: Vec<&'static str>,
}

impl<'r, V: Record> Unmarshaller<'r, V> {
    /// Create an unmarshaller, rejecting registries with dangling type names
    pub fn new(registry: &'r SchemaRegistry<V>) -> Result<Self> {
        registry.validate()?;
        Ok(Self { registry })
    }

    /// Parse `xml` into a record of type `root_type`
    ///
    /// The first element of the document must be `root_element`.
    pub fn unmarshal(&self, root_type: &str, root_element: &str, xml: &[u8]) -> Result<V> {
        let root_schema = self.registry.get(root_type)?;

        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut stack: Vec<Frame<'r, V>> = Vec::new();
        let mut skip_depth = 0usize;
        let mut root: Option<V> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    if skip_depth > 0 {
                        skip_depth += 1;
                    } else if !self.open(&e, root_schema, root_element, &mut stack, &root)? {
                        skip_depth = 1;
                    }
                }
                Event::Empty(e) => {
                    if skip_depth == 0 && self.open(&e, root_schema, root_element, &mut stack, &root)? {
                        close(&mut stack, &mut root);
                    }
                }
                Event::End(e) => {
                    if skip_depth > 0 {
                        skip_depth -= 1;
                    } else if stack.last().is_some_and(|f| f.tag == e.name().as_ref()) {
                        close(&mut stack, &mut root);
                    }
                }
                Event::Text(e) => {
                    if skip_depth == 0 {
                        let text = e
                            .unescape()
                            .unwrap_or_else(|_| Cow::Owned(String::from_utf8_lossy(&e).into_owned()));
                        append_text(&mut stack, &text);
                    }
                }
                Event::CData(e) => {
                    if skip_depth == 0 {
                        append_text(&mut stack, &String::from_utf8_lossy(&e));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        root.ok_or_else(|| OdfError::MissingRoot(root_element.to_string()))
    }

    /// Push a frame for `e`; returns false when the element is unmapped
    fn open(
        &self,
        e: &BytesStart<'_>,
        root_schema: &'r ElementSchema<V>,
        root_element: &str,
        stack: &mut Vec<Frame<'r, V>>,
        root: &Option<V>,
    ) -> Result<bool> {
        let name = e.name();
        let name = name.as_ref();

        let (schema, binding) = match stack.last() {
            None if root.is_some() => return Ok(false),
            None if name != root_element.as_bytes() => {
                return Err(OdfError::MissingRoot(root_element.to_string()))
            }
            None => (root_schema, None),
            Some(parent) => match parent.schema.child_binding(name) {
                Some(binding) => (self.registry.get(binding.target)?, Some(binding)),
                None => return Ok(false),
            },
        };

        let mut value = (schema.construct)();
        for attr in e.attributes().filter_map(|a| a.ok()) {
            if let Some(bound) = schema.attribute_binding(attr.key.as_ref()) {
                value.set_attribute(bound.field, attribute_value(&attr));
            }
        }

        stack.push(Frame {
            value,
            schema,
            tag: name.to_vec(),
            binding,
            filled: Vec::new(),
        });
        Ok(true)
    }
}

fn attribute_value(attr: &Attribute<'_>) -> String {
    match attr.unescape_value() {
        Ok(value) => value.into_owned(),
        Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
    }
}

fn append_text<V: Record>(stack: &mut [Frame<'_, V>], text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(frame) = stack.last_mut() {
        if let Some(field) = frame.schema.text {
            frame.value.append_text(field, text);
        }
    }
}

/// Pop the innermost frame and hand its value to the parent (or the root slot)
fn close<V: Record>(stack: &mut Vec<Frame<'_, V>>, root: &mut Option<V>) {
    let Some(frame) = stack.pop() else {
        return;
    };
    let Some(parent) = stack.last_mut() else {
        *root = Some(frame.value);
        return;
    };
    let Some(binding) = frame.binding else {
        return;
    };

    if binding.cardinality == Cardinality::One {
        if parent.filled.contains(&binding.field) {
            log::debug!(
                "<{}> replaces an earlier value of {}.{}",
                binding.element,
                parent.value.type_name(),
                binding.field
            );
        } else {
            parent.filled.push(binding.field);
        }
    }
    parent.value.attach(binding.field, frame.value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ElementSchema;

    /// Minimal record type for exercising the walker in isolation
    #[derive(Debug, Default, PartialEq)]
    struct Node {
        kind: &'static str,
        name: Option<String>,
        text: String,
        items: Vec<Node>,
        only: Option<Box<Node>>,
    }

    impl Record for Node {
        fn type_name(&self) -> &'static str {
            self.kind
        }

        fn set_attribute(&mut self, field: &str, value: String) {
            if field == "name" {
                self.name = Some(value);
            }
        }

        fn attach(&mut self, field: &str, child: Self) {
            match field {
                "items" => self.items.push(child),
                "only" => self.only = Some(Box::new(child)),
                _ => {}
            }
        }

        fn append_text(&mut self, field: &str, text: &str) {
            if field == "text" {
                self.text.push_str(text);
            }
        }
    }

    fn registry() -> SchemaRegistry<Node> {
        SchemaRegistry::new()
            .with(
                ElementSchema::new("Root", || Node {
                    kind: "Root",
                    ..Default::default()
                })
                .attr("a:name", "name")
                .children("a:item", "items", "Item")
                .child("a:only", "only", "Item"),
            )
            .with(
                ElementSchema::new("Item", || Node {
                    kind: "Item",
                    ..Default::default()
                })
                .attr("a:name", "name")
                .children("a:item", "items", "Item")
                .text("text"),
            )
    }

    #[test]
    fn test_children_in_document_order() {
        let registry = registry();
        let u = Unmarshaller::new(&registry).unwrap();
        let xml = br#"<a:root a:name="r"><a:item a:name="1">one</a:item><a:item a:name="2"><a:item>inner</a:item></a:item></a:root>"#;

        let root = u.unmarshal("Root", "a:root", xml).unwrap();
        assert_eq!(root.name.as_deref(), Some("r"));
        assert_eq!(root.items.len(), 2);
        assert_eq!(root.items[0].text, "one");
        assert_eq!(root.items[1].name.as_deref(), Some("2"));
        assert_eq!(root.items[1].items[0].text, "inner");
    }

    #[test]
    fn test_unmapped_subtree_is_skipped() {
        let registry = registry();
        let u = Unmarshaller::new(&registry).unwrap();
        let xml = br#"<a:root><a:unknown><a:item>hidden</a:item></a:unknown><a:item>seen<a:junk>no</a:junk> &amp; kept</a:item></a:root>"#;

        let root = u.unmarshal("Root", "a:root", xml).unwrap();
        assert_eq!(root.items.len(), 1);
        assert_eq!(root.items[0].text, "seen & kept");
    }

    #[test]
    fn test_single_field_is_replaced() {
        let registry = registry();
        let u = Unmarshaller::new(&registry).unwrap();
        let xml = br#"<a:root><a:only a:name="first"/><a:only a:name="second"/></a:root>"#;

        let root = u.unmarshal("Root", "a:root", xml).unwrap();
        assert_eq!(root.only.unwrap().name.as_deref(), Some("second"));
    }

    #[test]
    fn test_wrong_root_element() {
        let registry = registry();
        let u = Unmarshaller::new(&registry).unwrap();
        let err = u.unmarshal("Root", "a:root", b"<b:other/>").unwrap_err();
        assert!(matches!(err, OdfError::MissingRoot(ref name) if name == "a:root"));
    }

    #[test]
    fn test_empty_input_has_no_root() {
        let registry = registry();
        let u = Unmarshaller::new(&registry).unwrap();
        let err = u.unmarshal("Root", "a:root", b"").unwrap_err();
        assert!(matches!(err, OdfError::MissingRoot(_)));
    }

    #[test]
    fn test_unknown_root_type() {
        let registry = registry();
        let u = Unmarshaller::new(&registry).unwrap();
        let err = u.unmarshal("Nope", "a:root", b"<a:root/>").unwrap_err();
        assert!(matches!(err, OdfError::UnknownType(_)));
    }

    #[test]
    fn test_dangling_target_rejected_up_front() {
        let registry = registry().with(
            ElementSchema::new("Broken", Node::default).children("a:x", "items", "Ghost"),
        );
        assert!(matches!(
            Unmarshaller::new(&registry),
            Err(OdfError::UnknownType(_))
        ));
    }
}
