//! Fenced code blocks and formulas

use odtmark_ast::{NodeId, Payload, Tag, TagTree};

use super::{all_tags, has_content, insert_tag_after, remove_block, PassContext};
use crate::macros::is_macro;

const FENCE: &str = "```";

/// Replace the children of `node` with a single text leaf
fn set_text(tree: &mut TagTree, node: NodeId, text: String) {
    tree.take_children(node);
    tree.append_text(node, text);
}

fn lang(tree: &TagTree, node: NodeId) -> Option<String> {
    tree.payload(node).and_then(|p| p.lang.clone())
}

/// Sentinel code blocks, formulas and adjacent PRE merging
///
/// - With both code-block sentinels configured, a paragraph starting with
///   the start sentinel and the blocks up to a paragraph equal to the end
///   sentinel become one PRE; text after the start sentinel is the language.
///   Empty sentinels (the default) leave this off.
/// - A formula alone in its paragraph becomes a `math` PRE; any other
///   formula is inlined as `$$…$$`.
/// - Neighbouring PRE blocks with the same language are joined.
pub(super) fn code_and_math(tree: &mut TagTree, ctx: &mut PassContext<'_>) {
    if let Some((start, end)) = ctx.options.code_sentinels() {
        let (start, end) = (start.to_string(), end.to_string());
        merge_sentinel_blocks(tree, &start, &end);
    }
    convert_math(tree);

    let mut parents = vec![tree.root()];
    parents.extend(tree.descendants(tree.root()));
    for parent in parents {
        merge_adjacent_pre(tree, parent);
    }
}

fn merge_sentinel_blocks(tree: &mut TagTree, start: &str, end: &str) {
    let root = tree.root();
    let mut index = 0;
    while index < tree.children(root).len() {
        let opener = tree.children(root)[index];
        let opener_text = tree.text_content(opener);
        let Some(rest) = opener_text.trim().strip_prefix(start) else {
            index += 1;
            continue;
        };
        let language = rest.trim().to_string();

        let siblings = tree.children(root)[index + 1..].to_vec();
        let Some(close) = siblings
            .iter()
            .position(|&n| tree.text_content(n).trim() == end)
        else {
            index += 1;
            continue;
        };

        let body: Vec<String> = siblings[..close]
            .iter()
            .map(|&n| tree.text_content(n))
            .collect();
        let payload = if language.is_empty() {
            Payload::default()
        } else {
            Payload::lang(language)
        };
        let pre = tree.create_tag(Tag::Pre, payload);
        tree.insert_before(opener, pre);
        tree.append_text(pre, body.join("\n"));
        tree.detach(opener);
        for &node in &siblings[..=close] {
            tree.detach(node);
        }
        index += 1;
    }
}

fn convert_math(tree: &mut TagTree) {
    for math in all_tags(tree, Tag::MathMl) {
        let formula = tree
            .payload(math)
            .and_then(|p| p.text.clone())
            .unwrap_or_default();
        let Some(parent) = tree.parent(math) else {
            continue;
        };
        let alone = tree.is_tag(parent, Tag::P)
            && tree
                .children(parent)
                .iter()
                .all(|&c| c == math || !has_content(tree, c));

        if alone {
            let pre = tree.create_tag(Tag::Pre, Payload::lang("math"));
            tree.insert_before(parent, pre);
            tree.append_text(pre, formula);
            tree.detach(parent);
        } else {
            let text = tree.create_text(format!("$${formula}$$"));
            tree.insert_before(math, text);
            tree.detach(math);
        }
    }
}

fn merge_adjacent_pre(tree: &mut TagTree, parent: NodeId) {
    let mut previous: Option<NodeId> = None;
    for child in tree.children(parent).to_vec() {
        if !tree.is_tag(child, Tag::Pre) {
            previous = None;
            continue;
        }
        match previous {
            Some(first) if lang(tree, first) == lang(tree, child) => {
                tree.append_text(first, "\n");
                for node in tree.take_children(child) {
                    tree.append(first, node);
                }
                tree.detach(child);
            }
            _ => previous = Some(child),
        }
    }
}

/// Drop empty PRE blocks and move macro lines at their edges outside
///
/// A shortcode on the first or last line of a fenced block belongs to the
/// surrounding document, so it becomes its own paragraph.
pub(super) fn unwrap_pre(tree: &mut TagTree, _ctx: &mut PassContext<'_>) {
    for pre in all_tags(tree, Tag::Pre) {
        let content = tree.text_content(pre);
        let mut lines: Vec<&str> = content.split('\n').collect();

        let mut leading = Vec::new();
        let mut trailing = Vec::new();
        loop {
            while lines.first().is_some_and(|l| l.trim().is_empty()) {
                lines.remove(0);
            }
            while lines.last().is_some_and(|l| l.trim().is_empty()) {
                lines.pop();
            }
            if lines.first().is_some_and(|l| is_macro(l)) {
                leading.push(lines.remove(0).trim().to_string());
            } else if lines.last().is_some_and(|l| is_macro(l)) {
                if let Some(line) = lines.pop() {
                    trailing.insert(0, line.trim().to_string());
                }
            } else {
                break;
            }
        }

        for line in leading {
            let p = tree.create_tag(Tag::P, Payload::default());
            tree.append_text(p, line);
            tree.insert_before(pre, p);
            insert_tag_after(tree, p, Tag::Eol);
        }
        let mut anchor = match tree.next_sibling(pre) {
            Some(next) if tree.is_tag(next, Tag::Eol) => next,
            _ => pre,
        };
        for line in trailing {
            let p = tree.create_tag(Tag::P, Payload::default());
            tree.append_text(p, line);
            tree.insert_after(anchor, p);
            anchor = insert_tag_after(tree, p, Tag::Eol);
        }

        if lines.is_empty() {
            remove_block(tree, pre);
        } else {
            let text = lines.join("\n");
            if text != content {
                set_text(tree, pre, text);
            }
        }
    }
}

/// Strip literal fence lines inside PRE, adopting their language
pub(super) fn collapse_fences(tree: &mut TagTree, _ctx: &mut PassContext<'_>) {
    for pre in all_tags(tree, Tag::Pre) {
        let content = tree.text_content(pre);
        if !content.contains(FENCE) {
            continue;
        }
        let mut language = lang(tree, pre);
        let mut kept = Vec::new();
        for line in content.split('\n') {
            match line.trim().strip_prefix(FENCE) {
                Some(info) => {
                    let info = info.trim_start_matches('`').trim();
                    if language.is_none() && !info.is_empty() {
                        language = Some(info.to_string());
                    }
                }
                None => kept.push(line),
            }
        }

        if kept.iter().all(|l| l.trim().is_empty()) {
            remove_block(tree, pre);
            continue;
        }
        let text = kept.join("\n");
        set_text(tree, pre, text);
        if let Some(payload) = tree.payload_mut(pre) {
            payload.lang = language;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConvertOptions;

    fn pre(tree: &mut TagTree, text: &str) -> NodeId {
        let root = tree.root();
        let node = tree.append_tag(root, Tag::Pre, Payload::default());
        tree.append_text(node, text);
        node
    }

    fn paragraph(tree: &mut TagTree, text: &str) -> NodeId {
        let root = tree.root();
        let node = tree.append_tag(root, Tag::P, Payload::default());
        tree.append_text(node, text);
        node
    }

    #[test]
    fn test_adjacent_pre_merge_and_math() {
        let mut tree = TagTree::new();
        let root = tree.root();
        pre(&mut tree, "a()");
        pre(&mut tree, "b()");
        let p = tree.append_tag(root, Tag::P, Payload::default());
        tree.append_tag(p, Tag::MathMl, Payload::text("x^2"));
        let inline = paragraph(&mut tree, "where ");
        tree.append_tag(inline, Tag::MathMl, Payload::text("y"));

        let options = ConvertOptions::default();
        let mut ctx = PassContext::new(&options, &[]);
        code_and_math(&mut tree, &mut ctx);

        let blocks = tree.find_all(root, Tag::Pre);
        assert_eq!(blocks.len(), 2);
        assert_eq!(tree.text_content(blocks[0]), "a()\nb()");
        assert_eq!(lang(&tree, blocks[1]).as_deref(), Some("math"));
        assert_eq!(tree.text_content(blocks[1]), "x^2");
        assert_eq!(tree.text_content(inline), "where $$y$$");
    }

    #[test]
    fn test_sentinels_are_dormant_by_default() {
        let mut tree = TagTree::new();
        paragraph(&mut tree, "BEGIN");
        paragraph(&mut tree, "END");
        let options = ConvertOptions::default();
        let mut ctx = PassContext::new(&options, &[]);
        code_and_math(&mut tree, &mut ctx);
        assert!(tree.find_all(tree.root(), Tag::Pre).is_empty());
    }

    #[test]
    fn test_sentinel_block_merge() {
        let mut tree = TagTree::new();
        paragraph(&mut tree, "before");
        paragraph(&mut tree, "BEGIN rust");
        paragraph(&mut tree, "fn main() {}");
        paragraph(&mut tree, "END");
        let options = ConvertOptions {
            code_block_start: "BEGIN".into(),
            code_block_end: "END".into(),
            ..Default::default()
        };
        let mut ctx = PassContext::new(&options, &[]);
        code_and_math(&mut tree, &mut ctx);

        let root = tree.root();
        assert_eq!(tree.children(root).len(), 2);
        let block = tree.children(root)[1];
        assert_eq!(lang(&tree, block).as_deref(), Some("rust"));
        assert_eq!(tree.text_content(block), "fn main() {}");
    }

    #[test]
    fn test_unwrap_pre_moves_macros_out() {
        let mut tree = TagTree::new();
        let root = tree.root();
        let block = pre(&mut tree, "{{% note %}}\ncode\n{{% /note %}}\n");
        insert_tag_after(&mut tree, block, Tag::Eol);
        let empty = pre(&mut tree, "  \n");

        let options = ConvertOptions::default();
        let mut ctx = PassContext::new(&options, &[]);
        unwrap_pre(&mut tree, &mut ctx);

        assert!(!tree.is_attached(empty));
        let shape: Vec<_> = tree
            .children(root)
            .iter()
            .map(|&n| (tree.tag(n), tree.text_content(n)))
            .collect();
        assert_eq!(
            shape,
            vec![
                (Some(Tag::P), "{{% note %}}".to_string()),
                (Some(Tag::Eol), String::new()),
                (Some(Tag::Pre), "code".to_string()),
                (Some(Tag::Eol), String::new()),
                (Some(Tag::P), "{{% /note %}}".to_string()),
                (Some(Tag::Eol), String::new()),
            ]
        );
    }

    #[test]
    fn test_collapse_fences() {
        let mut tree = TagTree::new();
        let block = pre(&mut tree, "```python\nprint(1)\n```");
        let options = ConvertOptions::default();
        let mut ctx = PassContext::new(&options, &[]);
        collapse_fences(&mut tree, &mut ctx);
        assert_eq!(lang(&tree, block).as_deref(), Some("python"));
        assert_eq!(tree.text_content(block), "print(1)");
    }
}
