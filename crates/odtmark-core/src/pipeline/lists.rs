//! Table-of-contents listification and list numbering

use std::collections::HashMap;

use odtmark_ast::{NodeId, Payload, Tag, TagTree};

use super::{all_tags, PassContext};

/// Turn each TOC into a bullet list with one item per entry
///
/// Entry levels recorded by the converter become item levels. Page numbers
/// (everything from the first tab on) are dropped from the visible text.
pub(super) fn listify_toc(tree: &mut TagTree, _ctx: &mut PassContext<'_>) {
    for toc in all_tags(tree, Tag::Toc) {
        let ul = tree.create_tag(
            Tag::Ul,
            Payload {
                list_level: Some(0),
                toc: true,
                ..Default::default()
            },
        );
        tree.insert_before(toc, ul);

        for entry in tree.take_children(toc) {
            if !tree.is_tag(entry, Tag::P) {
                continue;
            }
            strip_page_number(tree, entry);
            let level = tree.payload(entry).and_then(|p| p.list_level).unwrap_or(0);
            let li = tree.append_tag(
                ul,
                Tag::Li,
                Payload {
                    list_level: Some(level),
                    bullet: Some("*".to_string()),
                    toc: true,
                    ..Default::default()
                },
            );
            if let Some(payload) = tree.payload_mut(entry) {
                payload.list_level = None;
            }
            tree.append(li, entry);
        }
        tree.detach(toc);
    }
}

/// Cut every text leaf of `entry` from the first tab on
fn strip_page_number(tree: &mut TagTree, entry: NodeId) {
    let mut cut = false;
    for node in tree.descendants(entry) {
        let Some(text) = tree.text_mut(node) else {
            continue;
        };
        if cut {
            text.clear();
        } else if let Some(idx) = text.find('\t') {
            text.truncate(idx);
            cut = true;
        }
    }
}

/// Ancestor context of the numbering walk
#[derive(Debug, Clone, Copy, Default)]
struct ListContext {
    /// Lowest level opened by a continuing list; resets at or below it are
    /// suppressed until that list closes
    high_water: Option<usize>,
}

impl ListContext {
    fn suppresses_reset(self, level: usize) -> bool {
        self.high_water.is_some_and(|hw| level >= hw)
    }
}

type Counters = HashMap<(String, usize), u32>;

/// Assign item numbers per (list style, level)
///
/// Counters persist across sibling lists with the same style. A list that
/// does not continue numbering resets its own level and the levels below
/// it, unless an enclosing continuing list suppresses that.
pub(super) fn number_lists(tree: &mut TagTree, _ctx: &mut PassContext<'_>) {
    let mut counters = Counters::new();
    let root = tree.root();
    number_walk(tree, root, ListContext::default(), &mut counters);
}

fn number_walk(tree: &mut TagTree, node: NodeId, ctx: ListContext, counters: &mut Counters) {
    let mut ctx = ctx;
    match tree.tag(node) {
        Some(Tag::Ul) => {
            let payload = tree.payload(node).cloned().unwrap_or_default();
            let level = payload.list_level.unwrap_or(0);
            if payload.continue_numbering {
                ctx.high_water = Some(ctx.high_water.map_or(level, |hw| hw.min(level)));
            } else if !ctx.suppresses_reset(level) {
                if let Some(style) = &payload.list_style {
                    counters.retain(|(s, l), _| s != style || *l < level);
                }
            }
        }
        Some(Tag::Li) => number_item(tree, node, counters),
        _ => {}
    }

    for child in tree.children(node).to_vec() {
        number_walk(tree, child, ctx, counters);
    }
}

fn number_item(tree: &mut TagTree, li: NodeId, counters: &mut Counters) {
    let Some(payload) = tree.payload_mut(li) else {
        return;
    };
    if !payload.is_numbered() {
        return;
    }
    let key = (
        payload.list_style.clone().unwrap_or_default(),
        payload.list_level.unwrap_or(0),
    );
    let start = payload.start_value.unwrap_or(1);
    let counter = counters.entry(key).or_insert(start.saturating_sub(1));
    match payload.number {
        // Explicit restart from the document
        Some(number) => *counter = number,
        None => *counter += 1,
    }
    payload.number = Some(*counter);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConvertOptions;
    use odtmark_ast::NumberFormat;

    fn ul(tree: &mut TagTree, parent: NodeId, level: usize, continues: bool) -> NodeId {
        tree.append_tag(
            parent,
            Tag::Ul,
            Payload {
                list_level: Some(level),
                list_style: Some("L1".into()),
                continue_numbering: continues,
                ..Default::default()
            },
        )
    }

    fn li(tree: &mut TagTree, ul: NodeId, level: usize, numbered: bool) -> NodeId {
        let payload = Payload {
            list_level: Some(level),
            list_style: Some("L1".into()),
            number_format: numbered.then_some(NumberFormat::Decimal),
            start_value: numbered.then_some(1),
            bullet: (!numbered).then(|| "•".to_string()),
            ..Default::default()
        };
        tree.append_tag(ul, Tag::Li, payload)
    }

    fn number(tree: &TagTree, li: NodeId) -> Option<u32> {
        tree.payload(li).and_then(|p| p.number)
    }

    fn run(tree: &mut TagTree) {
        let options = ConvertOptions::default();
        let mut ctx = PassContext::new(&options, &[]);
        number_lists(tree, &mut ctx);
    }

    #[test]
    fn test_sequential_numbering() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let list = ul(&mut tree, root, 0, false);
        let items: Vec<_> = (0..4).map(|_| li(&mut tree, list, 0, true)).collect();
        run(&mut tree);
        let numbers: Vec<_> = items.iter().map(|&i| number(&tree, i)).collect();
        assert_eq!(numbers, vec![Some(1), Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn test_new_list_resets_and_continuing_list_does_not() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let first = ul(&mut tree, root, 0, false);
        li(&mut tree, first, 0, true);
        li(&mut tree, first, 0, true);
        let continued = ul(&mut tree, root, 0, true);
        let third = li(&mut tree, continued, 0, true);
        let fresh = ul(&mut tree, root, 0, false);
        let restarted = li(&mut tree, fresh, 0, true);
        run(&mut tree);
        assert_eq!(number(&tree, third), Some(3));
        assert_eq!(number(&tree, restarted), Some(1));
    }

    #[test]
    fn test_nested_continue_at_three() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let outer = ul(&mut tree, root, 0, false);
        let a = li(&mut tree, outer, 0, false);
        let inner = ul(&mut tree, a, 1, false);
        li(&mut tree, inner, 1, true);
        li(&mut tree, inner, 1, true);
        let b = li(&mut tree, outer, 0, false);
        let resumed = ul(&mut tree, b, 1, true);
        let item = li(&mut tree, resumed, 1, true);
        run(&mut tree);
        assert_eq!(number(&tree, item), Some(3));
    }

    #[test]
    fn test_continuing_list_suppresses_nested_resets() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let first = ul(&mut tree, root, 0, false);
        let a = li(&mut tree, first, 0, false);
        let sub = ul(&mut tree, a, 1, false);
        li(&mut tree, sub, 1, true);

        let continued = ul(&mut tree, root, 0, true);
        let b = li(&mut tree, continued, 0, false);
        let nested = ul(&mut tree, b, 1, false);
        let kept = li(&mut tree, nested, 1, true);

        let later = ul(&mut tree, root, 1, false);
        let reset = li(&mut tree, later, 1, true);
        run(&mut tree);
        assert_eq!(number(&tree, kept), Some(2));
        assert_eq!(number(&tree, reset), Some(1));
    }

    #[test]
    fn test_explicit_restart_and_bullets() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let list = ul(&mut tree, root, 0, false);
        li(&mut tree, list, 0, true);
        let restart = li(&mut tree, list, 0, true);
        tree.payload_mut(restart).unwrap().number = Some(7);
        let next = li(&mut tree, list, 0, true);
        let bullet = li(&mut tree, list, 0, false);
        run(&mut tree);
        assert_eq!(number(&tree, restart), Some(7));
        assert_eq!(number(&tree, next), Some(8));
        assert_eq!(number(&tree, bullet), None);
    }

    #[test]
    fn test_toc_listify() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let toc = tree.append_tag(root, Tag::Toc, Payload::default());
        for (level, text) in [(0, "Intro\t1"), (1, "Details\t2")] {
            let p = tree.append_tag(
                toc,
                Tag::P,
                Payload {
                    list_level: Some(level),
                    ..Default::default()
                },
            );
            let a = tree.append_tag(p, Tag::A, Payload::href("#h.x"));
            tree.append_text(a, text);
        }
        let options = ConvertOptions::default();
        let mut ctx = PassContext::new(&options, &[]);
        listify_toc(&mut tree, &mut ctx);

        assert!(tree.find_all(root, Tag::Toc).is_empty());
        let items = tree.find_all(root, Tag::Li);
        assert_eq!(items.len(), 2);
        assert_eq!(tree.payload(items[1]).unwrap().list_level, Some(1));
        assert_eq!(tree.text_content(items[0]), "Intro");
        assert!(tree.check_consistency().is_ok());
    }
}
