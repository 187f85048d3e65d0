//! Heading ids, slugs and intra-document anchors

use std::collections::BTreeMap;

use odtmark_ast::{Tag, TagTree};

use super::{all_tags, is_empty_paragraph, remove_block, PassContext};
use crate::slug::{slugify, strip_page_number};

const HEADINGS: [Tag; 4] = [Tag::H1, Tag::H2, Tag::H3, Tag::H4];

/// Bookmark id → slug for every heading in the tree
fn heading_slugs(tree: &TagTree) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for node in tree.descendants(tree.root()) {
        if !tree.tag(node).is_some_and(|tag| tag.is_heading()) {
            continue;
        }
        let slug = slugify(&tree.text_content(node));
        if slug.is_empty() {
            continue;
        }
        for bookmark in tree.find_all(node, Tag::Bookmark) {
            if let Some(id) = tree.payload(bookmark).and_then(|p| p.id.clone()) {
                map.insert(id, slug.clone());
            }
        }
    }
    map
}

/// Drop headings without content and build a first slug table
pub(super) fn prune_headings(tree: &mut TagTree, ctx: &mut PassContext<'_>) {
    for tag in HEADINGS {
        for heading in all_tags(tree, tag) {
            if is_empty_paragraph(tree, heading) {
                log::debug!("dropping empty {}", tag.name());
                remove_block(tree, heading);
            }
        }
    }
    ctx.headings = heading_slugs(tree);
}

/// Recompute the slug table once heading text has been trimmed
pub(super) fn final_heading_ids(tree: &mut TagTree, ctx: &mut PassContext<'_>) {
    ctx.headings = heading_slugs(tree);
}

/// Point `#id` links at heading slugs
///
/// Known heading ids map through the slug table. Anything else falls back
/// to the slug of the link's own text, which is what table-of-contents
/// entries need once their page numbers are gone.
pub(super) fn fix_anchors(tree: &mut TagTree, ctx: &mut PassContext<'_>) {
    for anchor in all_tags(tree, Tag::A) {
        let Some(id) = tree
            .payload(anchor)
            .and_then(|p| p.href.as_deref())
            .and_then(|href| href.strip_prefix('#'))
            .map(str::to_string)
        else {
            continue;
        };
        let slug = match ctx.headings.get(&id) {
            Some(slug) => slug.clone(),
            None => slugify(strip_page_number(&tree.text_content(anchor))),
        };
        if slug.is_empty() {
            continue;
        }
        if let Some(payload) = tree.payload_mut(anchor) {
            payload.href = Some(format!("#{slug}"));
        }
    }
}
