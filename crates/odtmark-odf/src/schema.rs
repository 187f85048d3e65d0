//! Declarative element schemas
//!
//! A [`SchemaRegistry`] maps type names to [`ElementSchema`]s. Each schema
//! says how to construct a record, which XML attributes set which fields,
//! which child elements become which (typed) child fields, and which field
//! accumulates character data. The [`crate::unmarshal::Unmarshaller`] walks
//! an XML stream and dispatches through this table.
//!
//! # Example
//!
//! ```
//! use odtmark_odf::schema::{ElementSchema, SchemaRegistry};
//! use odtmark_odf::model::{Element, Paragraph, Span};
//!
//! let registry = SchemaRegistry::new()
//!     .with(
//!         ElementSchema::new("Paragraph", || Element::Paragraph(Paragraph::default()))
//!             .attr("text:style-name", "style_name")
//!             .children("text:span", "children", "Span")
//!             .text("children"),
//!     )
//!     .with(ElementSchema::new("Span", || Element::Span(Span::default())).text("children"));
//!
//! assert!(registry.validate().is_ok());
//! ```

use std::collections::HashMap;

use crate::error::{OdfError, Result};

/// A typed value the unmarshaller can fill in
pub trait Record: Sized {
    /// Registered type name, used in log messages
    fn type_name(&self) -> &'static str;

    /// Store an attribute value in `field`
    fn set_attribute(&mut self, field: &str, value: String);

    /// Attach a finished child record to `field`
    fn attach(&mut self, field: &str, child: Self);

    /// Append character data to `field`
    fn append_text(&mut self, field: &str, text: &str);
}

/// Whether a child field holds one value or many
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// A later element replaces an earlier one
    One,
    /// Elements are appended in document order
    Many,
}

/// XML attribute → record field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrBinding {
    /// Qualified attribute name, e.g. `text:style-name`
    pub attribute: &'static str,
    /// Field that receives the value
    pub field: &'static str,
}

/// Child XML element → record field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildBinding {
    /// Qualified element name, e.g. `text:span`
    pub element: &'static str,
    /// Field that receives the child
    pub field: &'static str,
    /// Registered type the child is built as
    pub target: &'static str,
    /// Single or array-valued field
    pub cardinality: Cardinality,
}

/// Mapping of one record type onto XML
#[derive(Debug, Clone)]
pub struct ElementSchema<V> {
    /// Registered type name
    pub type_name: &'static str,
    /// Builds an empty record of this type
    pub construct: fn() -> V,
    /// Attribute bindings
    pub attributes: Vec<AttrBinding>,
    /// Child element bindings
    pub children: Vec<ChildBinding>,
    /// Field accumulating character data, if any
    pub text: Option<&'static str>,
}

impl<V> ElementSchema<V> {
    /// Schema with no bindings
    pub fn new(type_name: &'static str, construct: fn() -> V) -> Self {
        Self {
            type_name,
            construct,
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Bind an attribute to a field
    pub fn attr(mut self, attribute: &'static str, field: &'static str) -> Self {
        self.attributes.push(AttrBinding { attribute, field });
        self
    }

    /// Bind a child element to a single-valued field
    pub fn child(self, element: &'static str, field: &'static str, target: &'static str) -> Self {
        self.bind(element, field, target, Cardinality::One)
    }

    /// Bind a child element to an array-valued field
    pub fn children(
        self,
        element: &'static str,
        field: &'static str,
        target: &'static str,
    ) -> Self {
        self.bind(element, field, target, Cardinality::Many)
    }

    fn bind(
        mut self,
        element: &'static str,
        field: &'static str,
        target: &'static str,
        cardinality: Cardinality,
    ) -> Self {
        self.children.push(ChildBinding {
            element,
            field,
            target,
            cardinality,
        });
        self
    }

    /// Collect character data into `field`
    pub fn text(mut self, field: &'static str) -> Self {
        self.text = Some(field);
        self
    }

    /// Binding for a qualified attribute name
    pub fn attribute_binding(&self, name: &[u8]) -> Option<&AttrBinding> {
        self.attributes
            .iter()
            .find(|b| b.attribute.as_bytes() == name)
    }

    /// Binding for a qualified child element name
    pub fn child_binding(&self, name: &[u8]) -> Option<&ChildBinding> {
        self.children.iter().find(|b| b.element.as_bytes() == name)
    }
}

/// Table of element schemas keyed by type name
#[derive(Debug, Clone)]
pub struct SchemaRegistry<V> {
    schemas: HashMap<&'static str, ElementSchema<V>>,
}

impl<V> SchemaRegistry<V> {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    /// Register a schema, replacing any schema with the same type name
    pub fn with(mut self, schema: ElementSchema<V>) -> Self {
        self.register(schema);
        self
    }

    /// Register a schema in place
    pub fn register(&mut self, schema: ElementSchema<V>) {
        self.schemas.insert(schema.type_name, schema);
    }

    /// Look up a schema by type name
    pub fn get(&self, type_name: &str) -> Result<&ElementSchema<V>> {
        self.schemas
            .get(type_name)
            .ok_or_else(|| OdfError::UnknownType(type_name.to_string()))
    }

    /// Check that every child binding targets a registered type
    pub fn validate(&self) -> Result<()> {
        let mut names: Vec<&&'static str> = self.schemas.keys().collect();
        names.sort();
        for name in names {
            for binding in &self.schemas[*name].children {
                if !self.schemas.contains_key(binding.target) {
                    return Err(OdfError::UnknownType(format!(
                        "{} (bound from {}.{} for <{}>)",
                        binding.target, name, binding.field, binding.element
                    )));
                }
            }
        }
        Ok(())
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether no type is registered
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl<V> Default for SchemaRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}
