//! Inline cleanup: emphasis edges, duplicate emphasis, trimming, text merge

use odtmark_ast::{NodeId, Tag, TagTree};

use super::PassContext;
use crate::macros::is_macro;

/// Post-order list of the attached nodes below `node`
fn post_order(tree: &TagTree, node: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    for &child in tree.children(node) {
        out.extend(post_order(tree, child));
        out.push(child);
    }
    out
}

fn emphasis_nodes(tree: &TagTree) -> Vec<NodeId> {
    post_order(tree, tree.root())
        .into_iter()
        .filter(|&n| tree.tag(n).is_some_and(Tag::is_emphasis))
        .collect()
}

// =============================================================================
// Inline whitespace
// =============================================================================

/// Move whitespace and line breaks at the edges of B/I/BI outside them
///
/// Markdown emphasis must not open or close next to whitespace. Inner
/// emphasis is handled first so its whitespace bubbles all the way out.
pub(super) fn hoist_whitespace(tree: &mut TagTree, _ctx: &mut PassContext<'_>) {
    for node in emphasis_nodes(tree) {
        hoist_edge(tree, node, true);
        hoist_edge(tree, node, false);
    }
}

fn hoist_edge(tree: &mut TagTree, node: NodeId, front: bool) {
    loop {
        let edge = if front {
            tree.children(node).first().copied()
        } else {
            tree.children(node).last().copied()
        };
        let Some(edge) = edge else {
            return;
        };

        if tree.is_tag(edge, Tag::Br) {
            if front {
                tree.insert_before(node, edge);
            } else {
                tree.insert_after(node, edge);
            }
            continue;
        }

        let Some(text) = tree.text(edge) else {
            return;
        };
        let kept = if front { text.trim_start() } else { text.trim_end() };
        if kept.len() == text.len() {
            return;
        }
        let (moved, kept) = if front {
            let split = text.len() - kept.len();
            (text[..split].to_string(), text[split..].to_string())
        } else {
            (text[kept.len()..].to_string(), kept.to_string())
        };

        let outside = tree.create_text(moved);
        if front {
            tree.insert_before(node, outside);
        } else {
            tree.insert_after(node, outside);
        }
        if kept.is_empty() {
            tree.detach(edge);
            continue;
        }
        if let Some(text) = tree.text_mut(edge) {
            *text = kept;
        }
        return;
    }
}

// =============================================================================
// Emphasis dedup
// =============================================================================

fn emphasis_bits(tag: Tag) -> (bool, bool) {
    match tag {
        Tag::B => (true, false),
        Tag::I => (false, true),
        Tag::BI => (true, true),
        _ => (false, false),
    }
}

fn emphasis_tag(bold: bool, italic: bool) -> Option<Tag> {
    match (bold, italic) {
        (true, true) => Some(Tag::BI),
        (true, false) => Some(Tag::B),
        (false, true) => Some(Tag::I),
        (false, false) => None,
    }
}

/// Remove redundant emphasis and emphasis around macro tokens
///
/// Emphasis inside an ancestor that already applies the same style loses
/// that style (B in BI disappears, BI in B becomes I). Adjacent siblings
/// with the same emphasis are merged. B/I/BI/CODE whose whole text is one
/// macro token is unwrapped so the token survives verbatim.
pub(super) fn dedup_emphasis(tree: &mut TagTree, _ctx: &mut PassContext<'_>) {
    for node in emphasis_nodes(tree) {
        let Some(tag) = tree.tag(node) else {
            continue;
        };
        let (outer_bold, outer_italic) = tree
            .ancestors(node)
            .filter_map(|a| tree.tag(a))
            .map(emphasis_bits)
            .fold((false, false), |(b, i), (ab, ai)| (b || ab, i || ai));
        let (bold, italic) = emphasis_bits(tag);
        match emphasis_tag(bold && !outer_bold, italic && !outer_italic) {
            Some(new_tag) if new_tag != tag => tree.retag(node, new_tag),
            Some(_) => {}
            None => tree.unwrap(node),
        }
    }

    for node in tree.descendants(tree.root()) {
        if tree.is_attached(node) {
            merge_adjacent(tree, node);
        }
    }

    for node in post_order(tree, tree.root()) {
        if tree.tag(node).is_some_and(Tag::is_inline_format) && is_macro(&tree.text_content(node)) {
            tree.unwrap(node);
        }
    }
}

/// Fold following siblings with the same emphasis into `node`
fn merge_adjacent(tree: &mut TagTree, node: NodeId) {
    let Some(tag) = tree.tag(node).filter(|t| t.is_emphasis()) else {
        return;
    };
    while let Some(next) = tree.next_sibling(node) {
        if tree.tag(next) != Some(tag) {
            break;
        }
        for child in tree.take_children(next) {
            tree.append(node, child);
        }
        tree.detach(next);
    }
}

// =============================================================================
// Paragraph trim
// =============================================================================

/// Strip whitespace at both edges of every P and heading
///
/// Edge text is trimmed; whitespace-only leaves, line breaks and empty
/// inline tags at the edges are removed. Bookmarks are skipped over.
pub(super) fn trim_paragraphs(tree: &mut TagTree, _ctx: &mut PassContext<'_>) {
    let blocks: Vec<_> = tree
        .descendants(tree.root())
        .into_iter()
        .filter(|&n| tree.tag(n).is_some_and(Tag::is_paragraph_like))
        .collect();
    for block in blocks {
        trim_edge(tree, block, true);
        trim_edge(tree, block, false);
    }
}

fn trim_edge(tree: &mut TagTree, block: NodeId, front: bool) {
    while let Some(leaf) = edge_leaf(tree, block, front) {
        if let Some(text) = tree.text(leaf) {
            let trimmed = if front { text.trim_start() } else { text.trim_end() };
            if trimmed.is_empty() {
                tree.detach(leaf);
                continue;
            }
            if trimmed.len() != text.len() {
                let trimmed = trimmed.to_string();
                if let Some(text) = tree.text_mut(leaf) {
                    *text = trimmed;
                }
            }
            return;
        }
        let removable = match tree.tag(leaf) {
            Some(Tag::Br) => true,
            Some(tag) => tag.is_inline_format() && tree.children(leaf).is_empty(),
            None => false,
        };
        if !removable {
            return;
        }
        tree.detach(leaf);
    }
}

/// First (or last) leaf of a block, looking through inline formatting
fn edge_leaf(tree: &TagTree, node: NodeId, front: bool) -> Option<NodeId> {
    let children = tree.children(node);
    let ordered: Box<dyn Iterator<Item = &NodeId>> = if front {
        Box::new(children.iter())
    } else {
        Box::new(children.iter().rev())
    };
    for &child in ordered {
        match tree.tag(child) {
            None => return Some(child),
            Some(Tag::Bookmark) => continue,
            Some(tag) if tag.is_inline_format() || tag == Tag::A => {
                if tree.children(child).is_empty() {
                    return Some(child);
                }
                return edge_leaf(tree, child, front);
            }
            Some(_) => return Some(child),
        }
    }
    None
}

// =============================================================================
// Text merge
// =============================================================================

/// Coalesce neighbouring text leaves and drop empty ones
pub(super) fn merge_text(tree: &mut TagTree, _ctx: &mut PassContext<'_>) {
    let mut parents = vec![tree.root()];
    parents.extend(tree.descendants(tree.root()));
    for parent in parents {
        merge_children(tree, parent);
    }
}

fn merge_children(tree: &mut TagTree, parent: NodeId) {
    let mut previous: Option<NodeId> = None;
    for child in tree.children(parent).to_vec() {
        let Some(text) = tree.text(child).map(str::to_string) else {
            previous = None;
            continue;
        };
        if text.is_empty() {
            tree.detach(child);
            continue;
        }
        match previous.and_then(|p| tree.text_mut(p)) {
            Some(existing) => {
                existing.push_str(&text);
                tree.detach(child);
            }
            None => previous = Some(child),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConvertOptions;
    use odtmark_ast::Payload;

    fn ctx_run(tree: &mut TagTree, pass: fn(&mut TagTree, &mut PassContext<'_>)) {
        let options = ConvertOptions::default();
        let mut ctx = PassContext::new(&options, &[]);
        pass(tree, &mut ctx);
        assert!(tree.check_consistency().is_ok());
    }

    fn texts(tree: &TagTree, node: NodeId) -> Vec<String> {
        tree.children(node)
            .iter()
            .map(|&c| match tree.text(c) {
                Some(t) => t.to_string(),
                None => tree.tag(c).map(|t| t.name().to_string()).unwrap_or_default(),
            })
            .collect()
    }

    #[test]
    fn test_hoists_whitespace_out_of_nested_emphasis() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let p = tree.append_tag(root, Tag::P, Payload::default());
        let b = tree.append_tag(p, Tag::B, Payload::default());
        tree.append_text(b, " bold");
        let i = tree.append_tag(b, Tag::I, Payload::default());
        tree.append_text(i, "both  ");
        tree.append_tag(b, Tag::Br, Payload::default());

        ctx_run(&mut tree, hoist_whitespace);

        assert_eq!(texts(&tree, p), vec![" ", "B", "  ", "BR/"]);
        assert_eq!(tree.text_content(b), "boldboth");
    }

    #[test]
    fn test_whitespace_only_emphasis_is_emptied() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let p = tree.append_tag(root, Tag::P, Payload::default());
        let i = tree.append_tag(p, Tag::I, Payload::default());
        tree.append_text(i, "   ");
        ctx_run(&mut tree, hoist_whitespace);
        assert!(tree.children(i).is_empty());
        assert_eq!(tree.text_content(p), "   ");
    }

    #[test]
    fn test_dedup_nested_and_adjacent() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let p = tree.append_tag(root, Tag::P, Payload::default());
        let bi = tree.append_tag(p, Tag::BI, Payload::default());
        let b = tree.append_tag(bi, Tag::B, Payload::default());
        tree.append_text(b, "x");
        let outer = tree.append_tag(p, Tag::B, Payload::default());
        let inner = tree.append_tag(outer, Tag::BI, Payload::default());
        tree.append_text(inner, "y");
        let next = tree.append_tag(p, Tag::B, Payload::default());
        tree.append_text(next, "z");

        ctx_run(&mut tree, dedup_emphasis);

        assert_eq!(texts(&tree, bi), vec!["x"]);
        assert_eq!(tree.tag(inner), Some(Tag::I));
        assert!(!tree.is_attached(next));
        assert_eq!(tree.text_content(outer), "yz");
    }

    #[test]
    fn test_unwraps_styled_macro() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let p = tree.append_tag(root, Tag::P, Payload::default());
        let b = tree.append_tag(p, Tag::B, Payload::default());
        let code = tree.append_tag(b, Tag::Code, Payload::default());
        tree.append_text(code, "{{% note %}}");
        ctx_run(&mut tree, dedup_emphasis);
        assert_eq!(texts(&tree, p), vec!["{{% note %}}"]);
    }

    #[test]
    fn test_trim_skips_bookmarks_and_drops_edge_breaks() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let h = tree.append_tag(root, Tag::H1, Payload::default());
        tree.append_tag(h, Tag::Bookmark, Payload::id("h.1"));
        tree.append_text(h, "  ");
        let b = tree.append_tag(h, Tag::B, Payload::default());
        tree.append_text(b, " Title ");
        tree.append_tag(h, Tag::Br, Payload::default());
        tree.append_text(h, " ");

        ctx_run(&mut tree, trim_paragraphs);

        assert_eq!(texts(&tree, h), vec!["BOOKMARK/", "B"]);
        assert_eq!(tree.text_content(b), "Title");
    }

    #[test]
    fn test_merge_text() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let p = tree.append_tag(root, Tag::P, Payload::default());
        tree.append_text(p, "a");
        tree.append_text(p, "");
        tree.append_text(p, "b");
        tree.append_tag(p, Tag::Br, Payload::default());
        tree.append_text(p, "c");
        ctx_run(&mut tree, merge_text);
        assert_eq!(texts(&tree, p), vec!["ab", "BR/", "c"]);
    }
}
