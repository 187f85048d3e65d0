//! Style resolution
//!
//! Styles are looked up in the automatic styles of `content.xml`, then the
//! automatic styles of `styles.xml`, then the named catalog. A resolved style
//! has every unset property filled from its parent chain; results are
//! memoized per resolver.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::document::OdfDocument;
use crate::model::{ListStyle, Style, StyleCatalog, TextProperties};

/// Maximum parent chain length followed before giving up
pub const MAX_STYLE_DEPTH: usize = 16;

/// Font families treated as monospace regardless of font-face declarations
const MONOSPACE_FAMILIES: &[&str] = &[
    "courier",
    "courier new",
    "consolas",
    "roboto mono",
    "source code pro",
    "inconsolata",
    "fira code",
    "fira mono",
    "ubuntu mono",
    "dejavu sans mono",
    "liberation mono",
    "menlo",
    "monaco",
    "lucida console",
    "cousine",
    "space mono",
    "pt mono",
    "anonymous pro",
];

/// Resolves style names against a parsed document
#[derive(Debug)]
pub struct StyleResolver<'a> {
    catalogs: [&'a StyleCatalog; 3],
    monospace_faces: HashSet<String>,
    cache: RefCell<HashMap<String, Style>>,
}

impl<'a> StyleResolver<'a> {
    pub fn new(document: &'a OdfDocument) -> Self {
        let monospace_faces = document
            .content
            .font_faces
            .iter()
            .chain(&document.styles.font_faces)
            .filter(|face| {
                face.pitch.as_deref() == Some("fixed")
                    || face.generic.as_deref() == Some("modern")
                    || face.family.as_deref().is_some_and(is_monospace_family)
            })
            .map(|face| normalize_family(&face.name))
            .collect();

        Self {
            catalogs: [
                &document.content.automatic_styles,
                &document.styles.automatic_styles,
                &document.styles.styles,
            ],
            monospace_faces,
            cache: RefCell::new(HashMap::new()),
        }
    }

    fn lookup(&self, name: &str) -> Option<&'a Style> {
        self.catalogs.iter().copied().find_map(|catalog| catalog.style(name))
    }

    /// Resolve `name` with all inherited properties merged in
    ///
    /// Unknown names resolve to `None`.
    pub fn resolve(&self, name: &str) -> Option<Style> {
        if let Some(style) = self.cache.borrow().get(name) {
            return Some(style.clone());
        }

        let mut resolved = self.lookup(name)?.clone();
        let mut parent = resolved.parent_style_name.clone();
        let mut depth = 1;
        while let Some(parent_name) = parent {
            if depth >= MAX_STYLE_DEPTH {
                log::warn!("style {name}: parent chain deeper than {MAX_STYLE_DEPTH}, truncated");
                break;
            }
            let Some(parent_style) = self.lookup(&parent_name) else {
                break;
            };
            resolved.inherit(parent_style);
            parent = parent_style.parent_style_name.clone();
            depth += 1;
        }

        self.cache
            .borrow_mut()
            .insert(name.to_string(), resolved.clone());
        Some(resolved)
    }

    /// Names along the parent chain, starting with `name` itself
    pub fn ancestry(&self, name: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = Some(name.to_string());
        while let Some(name) = current {
            if chain.len() >= MAX_STYLE_DEPTH {
                log::warn!("style {name}: parent chain deeper than {MAX_STYLE_DEPTH}, truncated");
                break;
            }
            current = self
                .lookup(&name)
                .and_then(|style| style.parent_style_name.clone());
            chain.push(name);
        }
        chain
    }

    /// Find a list style by name
    pub fn list_style(&self, name: &str) -> Option<&'a ListStyle> {
        self.catalogs
            .iter()
            .copied()
            .find_map(|catalog| catalog.list_style(name))
    }

    /// Whether resolved text properties select a monospace font
    pub fn is_monospace(&self, props: &TextProperties) -> bool {
        if let Some(font_name) = &props.font_name {
            let font_name = normalize_family(font_name);
            if self.monospace_faces.contains(&font_name) || is_monospace_family(&font_name) {
                return true;
            }
        }
        props.font_family.as_deref().is_some_and(is_monospace_family)
    }
}

fn normalize_family(name: &str) -> String {
    name.trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .to_lowercase()
}

fn is_monospace_family(family: &str) -> bool {
    let family = normalize_family(family);
    family.contains("mono") || MONOSPACE_FAMILIES.contains(&family.as_str())
}
