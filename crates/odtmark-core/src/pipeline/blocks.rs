//! Block structure: line endings, blank lines, paragraph joins, empties

use odtmark_ast::{NodeId, NodeKind, Payload, Tag, TagTree};

use super::{all_tags, insert_tag_after, is_empty_paragraph, remove_block, PassContext};
use crate::macros::{closes_passthrough, has_macro_close, has_open_macro, opens_passthrough};
use crate::render::is_html_item;

/// Root and every tag node, in document order
fn containers(tree: &TagTree) -> Vec<NodeId> {
    let mut out = vec![tree.root()];
    out.extend(
        tree.descendants(tree.root())
            .into_iter()
            .filter(|&n| !tree.is_text(n)),
    );
    out
}

fn ends_line(tag: Tag) -> bool {
    tag.is_paragraph_like() || matches!(tag, Tag::Pre | Tag::Table)
}

/// EOL after every P, heading, PRE and TABLE
pub(super) fn insert_eol(tree: &mut TagTree, _ctx: &mut PassContext<'_>) {
    for node in tree.descendants(tree.root()) {
        if !tree.tag(node).is_some_and(ends_line) {
            continue;
        }
        let has_eol = tree
            .next_sibling(node)
            .is_some_and(|next| tree.is_tag(next, Tag::Eol));
        if !has_eol {
            insert_tag_after(tree, node, Tag::Eol);
        }
    }
}

/// Flatten paragraphs in cells and HTML list items
///
/// Cell content renders as inline HTML, where paragraph wrappers and line
/// endings only get in the way. Former paragraph boundaries become BR.
pub(super) fn flatten_cells(tree: &mut TagTree, _ctx: &mut PassContext<'_>) {
    for td in all_tags(tree, Tag::Td) {
        flatten(tree, td);
    }
    for li in all_tags(tree, Tag::Li) {
        let in_cell = tree.ancestors(li).any(|a| tree.is_tag(a, Tag::Td));
        if in_cell || is_html_item(tree, li) {
            flatten(tree, li);
        }
    }
}

fn flatten(tree: &mut TagTree, container: NodeId) {
    let mut after_paragraph = false;
    for child in tree.children(container).to_vec() {
        match tree.tag(child) {
            Some(Tag::Eol | Tag::Blank) => tree.detach(child),
            Some(Tag::P) => {
                if after_paragraph {
                    let br = tree.create_tag(Tag::Br, Payload::default());
                    tree.insert_before(child, br);
                }
                tree.unwrap(child);
                after_paragraph = true;
            }
            _ => after_paragraph = false,
        }
    }
}

/// Join, soften or blank out paragraphs
///
/// - A paragraph whose shortcode is still open at its end absorbs the
///   following paragraphs up to the one that closes it. Without such a
///   paragraph before the next non-paragraph block nothing is joined.
/// - Paragraphs inside a passthrough (`markdown`/`raw`) macro block are
///   joined with soft line breaks.
/// - Empty paragraphs become BLANK.
pub(super) fn merge_paragraphs(tree: &mut TagTree, _ctx: &mut PassContext<'_>) {
    for parent in containers(tree) {
        if !tree.is_attached(parent) {
            continue;
        }
        join_open_macros(tree, parent);
        soften_passthrough(tree, parent);
        blank_empty_paragraphs(tree, parent);
    }
}

/// Next paragraph after `node`, skipping line endings
fn next_paragraph(tree: &TagTree, node: NodeId) -> Option<NodeId> {
    let mut current = tree.next_sibling(node)?;
    while tree.is_tag(current, Tag::Eol) {
        current = tree.next_sibling(current)?;
    }
    tree.is_tag(current, Tag::P).then_some(current)
}

fn absorb(tree: &mut TagTree, into: NodeId, from: NodeId, separator: Option<Tag>) {
    match separator {
        Some(tag) => {
            tree.append_tag(into, tag, Payload::default());
        }
        None => {
            tree.append_text(into, " ");
        }
    }
    for child in tree.take_children(from) {
        tree.append(into, child);
    }
    remove_block(tree, from);
}

/// Paragraphs after `node` up to and including the first one holding a
/// shortcode terminator
fn closing_run(tree: &TagTree, node: NodeId) -> Option<Vec<NodeId>> {
    let mut run = Vec::new();
    let mut current = node;
    loop {
        current = next_paragraph(tree, current)?;
        run.push(current);
        if has_macro_close(&tree.text_content(current)) {
            return Some(run);
        }
    }
}

fn join_open_macros(tree: &mut TagTree, parent: NodeId) {
    for p in tree.children(parent).to_vec() {
        if !tree.is_tag(p, Tag::P) || !tree.is_attached(p) {
            continue;
        }
        while has_open_macro(&tree.text_content(p)) {
            let Some(run) = closing_run(tree, p) else {
                break;
            };
            log::debug!("joining {} paragraph(s) into open macro", run.len());
            for next in run {
                absorb(tree, p, next, None);
            }
        }
    }
}

fn soften_passthrough(tree: &mut TagTree, parent: NodeId) {
    let paragraphs: Vec<_> = tree
        .children(parent)
        .iter()
        .copied()
        .filter(|&n| tree.is_tag(n, Tag::P))
        .collect();

    let mut index = 0;
    while index < paragraphs.len() {
        let Some(name) = opens_passthrough(&tree.text_content(paragraphs[index])) else {
            index += 1;
            continue;
        };
        let Some(close) = paragraphs[index + 1..]
            .iter()
            .position(|&p| closes_passthrough(&tree.text_content(p), &name))
            .map(|offset| index + 1 + offset)
        else {
            index += 1;
            continue;
        };

        let inner = &paragraphs[index + 1..close];
        if let Some((&first, rest)) = inner.split_first() {
            for &p in rest {
                absorb(tree, first, p, Some(Tag::Br));
            }
        }
        index = close + 1;
    }
}

fn blank_empty_paragraphs(tree: &mut TagTree, parent: NodeId) {
    for p in tree.children(parent).to_vec() {
        if tree.is_tag(p, Tag::P) && is_empty_paragraph(tree, p) {
            let blank = tree.create_tag(Tag::Blank, Payload::default());
            tree.insert_before(p, blank);
            remove_block(tree, p);
        }
    }
}

/// Strip styling inside passthrough macro blocks
///
/// Everything between `{{% markdown %}}` (or `raw`) and its closing tag is
/// meant to reach the output as typed, so B/I/BI/CODE/A are unwrapped and
/// paragraph text becomes RAW, which the renderer never escapes.
pub(super) fn unstyle_passthrough(tree: &mut TagTree, _ctx: &mut PassContext<'_>) {
    for parent in containers(tree) {
        let mut active: Option<String> = None;
        for child in tree.children(parent).to_vec() {
            let is_paragraph = tree.is_tag(child, Tag::P);
            let text = if is_paragraph {
                tree.text_content(child)
            } else {
                String::new()
            };
            let Some(name) = active.as_deref() else {
                if is_paragraph {
                    active = opens_passthrough(&text);
                }
                continue;
            };
            if is_paragraph && closes_passthrough(&text, name) {
                active = None;
            } else {
                unstyle(tree, child);
            }
        }
    }
}

fn unstyle(tree: &mut TagTree, node: NodeId) {
    for styled in tree.descendants(node) {
        if matches!(
            tree.tag(styled),
            Some(Tag::B | Tag::I | Tag::BI | Tag::Code | Tag::A)
        ) {
            tree.unwrap(styled);
        }
    }
    if !tree.is_tag(node, Tag::P) {
        return;
    }
    for leaf in tree.descendants(node) {
        let Some(text) = tree.text(leaf).map(str::to_string) else {
            continue;
        };
        let raw = tree.create_tag(Tag::Raw, Payload::text(text));
        tree.insert_before(leaf, raw);
        tree.detach(leaf);
    }
}

/// Remove tags left without content
///
/// Children are visited before parents so emptiness cascades upwards. A
/// removed block takes its EOL with it.
pub(super) fn remove_empty(tree: &mut TagTree, _ctx: &mut PassContext<'_>) {
    let root = tree.root();
    remove_empty_below(tree, root);
}

fn remove_empty_below(tree: &mut TagTree, node: NodeId) {
    for child in tree.children(node).to_vec() {
        remove_empty_below(tree, child);
        if is_empty_tag(tree, child) {
            if tree.tag(child).is_some_and(ends_line) {
                remove_block(tree, child);
            } else {
                tree.detach(child);
            }
        }
    }
}

fn is_empty_tag(tree: &TagTree, node: NodeId) -> bool {
    let children = tree.children(node);
    match tree.kind(node) {
        NodeKind::Text(text) => text.is_empty(),
        NodeKind::Tag(tag, _) => match tag {
            Tag::P | Tag::H1 | Tag::H2 | Tag::H3 | Tag::H4 | Tag::Pre => children.is_empty(),
            Tag::B | Tag::I | Tag::BI | Tag::Code | Tag::A => children.is_empty(),
            Tag::Li => children
                .iter()
                .all(|&c| matches!(tree.tag(c), Some(Tag::Eol | Tag::Blank))),
            Tag::Ul => !children.iter().any(|&c| tree.is_tag(c, Tag::Li)),
            _ => false,
        },
    }
}

fn is_separated_block(tag: Tag) -> bool {
    ends_line(tag) || tag == Tag::Ul
}

/// BLANK between top-level blocks that are not already apart
///
/// A list continuing the numbering of the list right before it stays
/// attached to it.
pub(super) fn insert_blanks(tree: &mut TagTree, _ctx: &mut PassContext<'_>) {
    let root = tree.root();
    let mut previous: Option<NodeId> = None;
    let mut separated = false;
    for child in tree.children(root).to_vec() {
        match tree.tag(child) {
            Some(Tag::Blank) => separated = true,
            Some(tag) if is_separated_block(tag) => {
                if let Some(prev) = previous {
                    if !separated && !continues_list(tree, prev, child) {
                        let blank = tree.create_tag(Tag::Blank, Payload::default());
                        tree.insert_before(child, blank);
                    }
                }
                previous = Some(child);
                separated = false;
            }
            _ => {}
        }
    }
}

fn continues_list(tree: &TagTree, previous: NodeId, list: NodeId) -> bool {
    tree.is_tag(previous, Tag::Ul)
        && tree.is_tag(list, Tag::Ul)
        && tree.payload(list).is_some_and(|p| p.continue_numbering)
}

/// Collapse BLANK runs and trim blank edges
///
/// The document loses leading and trailing BLANKs; list items and cells
/// lose BLANK and BR at their edges.
pub(super) fn collapse_blanks(tree: &mut TagTree, _ctx: &mut PassContext<'_>) {
    for parent in containers(tree) {
        let mut previous_blank = false;
        for child in tree.children(parent).to_vec() {
            let blank = tree.is_tag(child, Tag::Blank);
            if blank && previous_blank {
                tree.detach(child);
            }
            previous_blank = blank;
        }
    }

    let root = tree.root();
    trim_edges(tree, root, &[Tag::Blank, Tag::Eol], &[Tag::Blank]);
    for node in containers(tree) {
        if matches!(tree.tag(node), Some(Tag::Li | Tag::Td)) {
            trim_edges(tree, node, &[Tag::Blank, Tag::Br], &[Tag::Blank, Tag::Br]);
        }
    }
}

fn trim_edges(tree: &mut TagTree, node: NodeId, front: &[Tag], back: &[Tag]) {
    let is_any =
        |tree: &TagTree, n: NodeId, tags: &[Tag]| tree.tag(n).is_some_and(|t| tags.contains(&t));
    while let Some(&first) = tree.children(node).first() {
        if !is_any(tree, first, front) {
            break;
        }
        tree.detach(first);
    }
    loop {
        // Look past trailing line endings
        let edge = tree
            .children(node)
            .iter()
            .rev()
            .copied()
            .find(|&c| !tree.is_tag(c, Tag::Eol));
        match edge {
            Some(edge) if is_any(tree, edge, back) => tree.detach(edge),
            _ => break,
        }
    }
}
