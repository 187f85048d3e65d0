//! Suggested-edit removal

use std::collections::HashSet;

use odtmark_ast::{NodeId, Tag, TagTree};

use super::PassContext;

/// Delete everything between change-start and change-end markers
///
/// A suggestion may begin in one paragraph and end in another; the walk
/// keeps the set of open change ids across the whole document. Containers
/// holding a marker are descended into, everything else inside an open
/// range is dropped whole. Paragraphs left empty are removed later.
pub(super) fn remove_suggestions(tree: &mut TagTree, _ctx: &mut PassContext<'_>) {
    let mut open = HashSet::new();
    let root = tree.root();
    strip(tree, root, &mut open);
}

fn strip(tree: &mut TagTree, node: NodeId, open: &mut HashSet<String>) {
    for child in tree.children(node).to_vec() {
        match tree.tag(child) {
            Some(tag @ (Tag::ChangeStart | Tag::ChangeEnd)) => {
                let id = tree
                    .payload(child)
                    .and_then(|p| p.id.clone())
                    .unwrap_or_default();
                if tag == Tag::ChangeStart {
                    open.insert(id);
                } else {
                    open.remove(&id);
                }
                tree.detach(child);
            }
            _ if open.is_empty() || has_marker(tree, child) => strip(tree, child, open),
            Some(tag) if is_structural(tag) => strip(tree, child, open),
            _ => tree.detach(child),
        }
    }
}

fn has_marker(tree: &TagTree, node: NodeId) -> bool {
    tree.descendants(node)
        .into_iter()
        .any(|n| matches!(tree.tag(n), Some(Tag::ChangeStart | Tag::ChangeEnd)))
}

/// Containers that outlive a suggestion spanning them
fn is_structural(tag: Tag) -> bool {
    tag.is_block() || matches!(tag, Tag::Li | Tag::Tr | Tag::Td)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConvertOptions;
    use odtmark_ast::Payload;

    #[test]
    fn test_removes_across_paragraphs() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let p1 = tree.append_tag(root, Tag::P, Payload::default());
        tree.append_text(p1, "keep ");
        tree.append_tag(p1, Tag::ChangeStart, Payload::id("c1"));
        let b = tree.append_tag(p1, Tag::B, Payload::default());
        tree.append_text(b, "gone");
        let p2 = tree.append_tag(root, Tag::P, Payload::default());
        tree.append_text(p2, "also gone");
        let p3 = tree.append_tag(root, Tag::P, Payload::default());
        let i = tree.append_tag(p3, Tag::I, Payload::default());
        tree.append_text(i, "x");
        tree.append_tag(i, Tag::ChangeEnd, Payload::id("c1"));
        tree.append_text(i, "y");
        tree.append_text(p3, " tail");

        let options = ConvertOptions::default();
        let mut ctx = PassContext::new(&options, &[]);
        remove_suggestions(&mut tree, &mut ctx);

        assert_eq!(tree.text_content(p1), "keep ");
        assert_eq!(tree.text_content(p2), "");
        assert_eq!(tree.text_content(p3), "y tail");
        assert!(tree.find_all(root, Tag::ChangeStart).is_empty());
        assert!(tree.check_consistency().is_ok());
    }
}
