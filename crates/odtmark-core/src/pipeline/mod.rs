//! Tag tree normalization
//!
//! The converter produces a faithful but noisy tree. The passes below clean
//! it up one concern at a time. They run in a fixed order: several rely on
//! the invariants established by earlier ones (text leaves are merged before
//! paragraphs are joined, line endings exist before cells are flattened,
//! and so on), so the sequence lives in a static table rather than being
//! assembled at runtime.

mod blocks;
mod code;
mod edits;
mod headings;
mod inline;
mod lists;
mod rules;

use std::collections::BTreeMap;

use odtmark_ast::{NodeId, Tag, TagTree};

use crate::config::ConvertOptions;
use crate::diagnostics::Diagnostic;
use crate::rewrite::CompiledRule;

/// State shared by the passes of one conversion
#[derive(Debug)]
pub struct PassContext<'o> {
    pub options: &'o ConvertOptions,
    pub rules: &'o [CompiledRule],
    /// Heading bookmark id → slug
    pub headings: BTreeMap<String, String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'o> PassContext<'o> {
    pub fn new(options: &'o ConvertOptions, rules: &'o [CompiledRule]) -> Self {
        Self {
            options,
            rules,
            headings: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }
}

/// A named tree rewrite
#[derive(Clone, Copy)]
pub struct Pass {
    pub name: &'static str,
    pub run: fn(&mut TagTree, &mut PassContext<'_>),
}

impl std::fmt::Debug for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pass").field("name", &self.name).finish()
    }
}

/// Every pass, in execution order
pub static PASSES: [Pass; 21] = [
    Pass { name: "toc-listify", run: lists::listify_toc },
    Pass { name: "list-numbering", run: lists::number_lists },
    Pass { name: "header-pruning", run: headings::prune_headings },
    Pass { name: "inline-whitespace", run: inline::hoist_whitespace },
    Pass { name: "emphasis-dedup", run: inline::dedup_emphasis },
    Pass { name: "suggested-edits", run: edits::remove_suggestions },
    Pass { name: "code-and-math", run: code::code_and_math },
    Pass { name: "paragraph-trim", run: inline::trim_paragraphs },
    Pass { name: "header-ids", run: headings::final_heading_ids },
    Pass { name: "post-paragraph-eol", run: blocks::insert_eol },
    Pass { name: "cell-flattening", run: blocks::flatten_cells },
    Pass { name: "text-merge", run: inline::merge_text },
    Pass { name: "paragraph-merge", run: blocks::merge_paragraphs },
    Pass { name: "pre-unwrap", run: code::unwrap_pre },
    Pass { name: "passthrough-unstyle", run: blocks::unstyle_passthrough },
    Pass { name: "double-fence", run: code::collapse_fences },
    Pass { name: "empty-tags", run: blocks::remove_empty },
    Pass { name: "blank-lines", run: blocks::insert_blanks },
    Pass { name: "anchor-hrefs", run: headings::fix_anchors },
    Pass { name: "blank-collapse", run: blocks::collapse_blanks },
    Pass { name: "rewrite-rules", run: rules::apply_rules },
];

/// Names of the passes in execution order
pub fn pass_names() -> impl Iterator<Item = &'static str> {
    PASSES.iter().map(|pass| pass.name)
}

/// Run the whole pipeline over `tree`
pub fn run(tree: &mut TagTree, ctx: &mut PassContext<'_>) {
    for pass in &PASSES {
        log::debug!("running pass {}", pass.name);
        (pass.run)(tree, ctx);
        debug_assert!(
            tree.check_consistency().is_ok(),
            "pass {} broke the tree",
            pass.name
        );
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Attached tag nodes with `tag`, in document order
fn all_tags(tree: &TagTree, tag: Tag) -> Vec<NodeId> {
    tree.find_all(tree.root(), tag)
}

/// Whether a node carries content worth keeping
///
/// Text must hold something other than whitespace; bookmarks and change
/// markers do not count.
fn has_content(tree: &TagTree, node: NodeId) -> bool {
    if let Some(text) = tree.text(node) {
        return !text.trim().is_empty();
    }
    match tree.tag(node) {
        Some(Tag::Bookmark | Tag::ChangeStart | Tag::ChangeEnd | Tag::Eol | Tag::Blank) => false,
        Some(
            Tag::Img
            | Tag::Svg
            | Tag::MathMl
            | Tag::Raw
            | Tag::Warning
            | Tag::Table
            | Tag::Br,
        ) => true,
        _ => tree
            .children(node)
            .iter()
            .any(|&child| has_content(tree, child)),
    }
}

/// Whether a paragraph holds anything besides whitespace and markers
fn is_empty_paragraph(tree: &TagTree, node: NodeId) -> bool {
    !tree
        .children(node)
        .iter()
        .any(|&child| has_content(tree, child))
}

/// Insert a new tag after `sibling` and return it
fn insert_tag_after(tree: &mut TagTree, sibling: NodeId, tag: Tag) -> NodeId {
    let node = tree.create_tag(tag, Default::default());
    tree.insert_after(sibling, node);
    node
}

/// Detach `node` and the EOL that follows it, if any
fn remove_block(tree: &mut TagTree, node: NodeId) {
    if let Some(next) = tree.next_sibling(node) {
        if tree.is_tag(next, Tag::Eol) {
            tree.detach(next);
        }
    }
    tree.detach(node);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_order() {
        let names: Vec<_> = pass_names().collect();
        assert_eq!(names.len(), 21);
        assert_eq!(names[0], "toc-listify");
        assert_eq!(names[2], "header-pruning");
        assert_eq!(names[8], "header-ids");
        assert_eq!(names[20], "rewrite-rules");
        let unique: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_empty_paragraph_detection() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let p = tree.append_tag(root, Tag::P, Default::default());
        tree.append_text(p, "  ");
        tree.append_tag(p, Tag::Bookmark, Default::default());
        assert!(is_empty_paragraph(&tree, p));

        tree.append_tag(p, Tag::Img, Default::default());
        assert!(!is_empty_paragraph(&tree, p));
    }
}
