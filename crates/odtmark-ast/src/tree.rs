//! Arena-backed mutable tag tree
//!
//! Nodes live in a single vector and refer to each other by [`NodeId`].
//! Parents are stored as indices, so the tree can be rewritten in place
//! (removal, retagging, splicing children into a grandparent) without
//! shared ownership. Detached nodes stay in the arena and are simply
//! unreachable from the root.

use std::fmt::Write;

use crate::tag::{Payload, Tag};

/// Index of a node in a [`TagTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// Content of a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Text leaf
    Text(String),
    /// Tag node
    Tag(Tag, Payload),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Mutable tree of tags and text rooted at a BODY node
#[derive(Debug, Clone)]
pub struct TagTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl TagTree {
    /// Create a tree holding only the BODY root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Tag(Tag::Body, Payload::default()),
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    /// The BODY node
    pub fn root(&self) -> NodeId {
        self.root
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Create a detached tag node
    pub fn create_tag(&mut self, tag: Tag, payload: Payload) -> NodeId {
        self.push_node(NodeKind::Tag(tag, payload))
    }

    /// Create a detached text leaf
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push_node(NodeKind::Text(text.into()))
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a tag node as the last child of `parent`
    pub fn append_tag(&mut self, parent: NodeId, tag: Tag, payload: Payload) -> NodeId {
        let id = self.create_tag(tag, payload);
        self.append(parent, id);
        id
    }

    /// Create a text leaf as the last child of `parent`
    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        let id = self.create_text(text);
        self.append(parent, id);
        id
    }

    // =========================================================================
    // Structural edits
    // =========================================================================

    /// Move `child` to the end of `parent`'s children
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let len = self.nodes[parent.0].children.len();
        self.insert(parent, len, child);
    }

    /// Move `child` into `parent` at `index`
    ///
    /// The child is detached from its current parent first; `index` refers
    /// to the parent's children after that detachment.
    pub fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) {
        debug_assert!(
            child != parent && !self.ancestors(parent).any(|a| a == child),
            "inserting a node below itself"
        );
        self.detach(child);
        let index = index.min(self.nodes[parent.0].children.len());
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Move `node` directly before `sibling`
    pub fn insert_before(&mut self, sibling: NodeId, node: NodeId) {
        self.detach(node);
        if let Some((parent, index)) = self.position(sibling) {
            self.insert(parent, index, node);
        }
    }

    /// Move `node` directly after `sibling`
    pub fn insert_after(&mut self, sibling: NodeId, node: NodeId) {
        self.detach(node);
        if let Some((parent, index)) = self.position(sibling) {
            self.insert(parent, index + 1, node);
        }
    }

    /// Remove `node` from its parent; the subtree stays intact
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    /// Replace `node` by its children in the parent, detaching `node`
    pub fn unwrap(&mut self, node: NodeId) {
        let Some((parent, index)) = self.position(node) else {
            return;
        };
        let children = std::mem::take(&mut self.nodes[node.0].children);
        self.nodes[parent.0].children.remove(index);
        self.nodes[node.0].parent = None;
        for (offset, child) in children.iter().enumerate() {
            self.nodes[child.0].parent = Some(parent);
            self.nodes[parent.0].children.insert(index + offset, *child);
        }
    }

    /// Detach all children of `node` and return them in order
    pub fn take_children(&mut self, node: NodeId) -> Vec<NodeId> {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in &children {
            self.nodes[child.0].parent = None;
        }
        children
    }

    /// Change the tag of a tag node, keeping payload and children
    pub fn retag(&mut self, node: NodeId, new_tag: Tag) {
        if let NodeKind::Tag(tag, _) = &mut self.nodes[node.0].kind {
            *tag = new_tag;
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Content of a node
    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    /// Tag of a tag node
    pub fn tag(&self, node: NodeId) -> Option<Tag> {
        match &self.nodes[node.0].kind {
            NodeKind::Tag(tag, _) => Some(*tag),
            NodeKind::Text(_) => None,
        }
    }

    /// Whether `node` is a tag node with the given tag
    pub fn is_tag(&self, node: NodeId, tag: Tag) -> bool {
        self.tag(node) == Some(tag)
    }

    /// Payload of a tag node
    pub fn payload(&self, node: NodeId) -> Option<&Payload> {
        match &self.nodes[node.0].kind {
            NodeKind::Tag(_, payload) => Some(payload),
            NodeKind::Text(_) => None,
        }
    }

    /// Mutable payload of a tag node
    pub fn payload_mut(&mut self, node: NodeId) -> Option<&mut Payload> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Tag(_, payload) => Some(payload),
            NodeKind::Text(_) => None,
        }
    }

    /// Text of a text leaf
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Tag(..) => None,
        }
    }

    /// Mutable text of a text leaf
    pub fn text_mut(&mut self, node: NodeId) -> Option<&mut String> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Tag(..) => None,
        }
    }

    /// Whether `node` is a text leaf
    pub fn is_text(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].kind, NodeKind::Text(_))
    }

    /// Parent of `node`
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// Children of `node` in order
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Parent and index of `node` among its siblings
    pub fn position(&self, node: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.nodes[node.0].parent?;
        let index = self.nodes[parent.0].children.iter().position(|&c| c == node)?;
        Some((parent, index))
    }

    /// Previous sibling of `node`
    pub fn prev_sibling(&self, node: NodeId) -> Option<NodeId> {
        let (parent, index) = self.position(node)?;
        index
            .checked_sub(1)
            .map(|i| self.nodes[parent.0].children[i])
    }

    /// Next sibling of `node`
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let (parent, index) = self.position(node)?;
        self.nodes[parent.0].children.get(index + 1).copied()
    }

    /// Ancestors of `node`, nearest first
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes[node.0].parent, move |&n| self.nodes[n.0].parent)
    }

    /// Whether `node` is reachable from the root
    pub fn is_attached(&self, node: NodeId) -> bool {
        node == self.root || self.ancestors(node).any(|a| a == self.root)
    }

    /// Descendants of `node` in document order, excluding `node`
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[node.0].children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev().copied());
        }
        out
    }

    /// Tag nodes with `tag` below `node`, in document order
    pub fn find_all(&self, node: NodeId, tag: Tag) -> Vec<NodeId> {
        self.descendants(node)
            .into_iter()
            .filter(|&n| self.is_tag(n, tag))
            .collect()
    }

    /// Concatenated text of all leaves below `node`
    pub fn text_content(&self, node: NodeId) -> String {
        if let Some(text) = self.text(node) {
            return text.to_string();
        }
        self.descendants(node)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Verify that every attached node's parent index matches its container
    pub fn check_consistency(&self) -> Result<(), String> {
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            for &child in &self.nodes[node.0].children {
                if self.nodes[child.0].parent != Some(node) {
                    return Err(format!(
                        "node {} is a child of {} but records parent {:?}",
                        child.0, node.0, self.nodes[child.0].parent
                    ));
                }
                stack.push(child);
            }
        }
        Ok(())
    }

    /// Indented outline of the tree, one node per line
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(self.root, 0, &mut out);
        out
    }

    fn dump_node(&self, node: NodeId, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => {
                let _ = writeln!(out, "{}{:?}", indent, text);
            }
            NodeKind::Tag(tag, _) => {
                let _ = writeln!(out, "{}{}", indent, tag.name());
            }
        }
        for &child in &self.nodes[node.0].children {
            self.dump_node(child, depth + 1, out);
        }
    }
}

impl Default for TagTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para_with(tree: &mut TagTree, texts: &[&str]) -> NodeId {
        let root = tree.root();
        let p = tree.append_tag(root, Tag::P, Payload::default());
        for text in texts {
            tree.append_text(p, *text);
        }
        p
    }

    #[test]
    fn test_new_tree_has_body_root() {
        let tree = TagTree::new();
        assert_eq!(tree.tag(tree.root()), Some(Tag::Body));
        assert!(tree.children(tree.root()).is_empty());
    }

    #[test]
    fn test_append_sets_parent() {
        let mut tree = TagTree::new();
        let p = para_with(&mut tree, &["a", "b"]);
        assert_eq!(tree.parent(p), Some(tree.root()));
        assert_eq!(tree.children(p).len(), 2);
        assert!(tree.check_consistency().is_ok());
    }

    #[test]
    fn test_unwrap_splices_children_in_place() {
        let mut tree = TagTree::new();
        let p = para_with(&mut tree, &["a"]);
        let b = tree.append_tag(p, Tag::B, Payload::default());
        tree.append_text(b, "b1");
        tree.append_text(b, "b2");
        tree.append_text(p, "c");

        tree.unwrap(b);

        let texts: Vec<_> = tree
            .children(p)
            .iter()
            .map(|&c| tree.text(c).unwrap().to_string())
            .collect();
        assert_eq!(texts, vec!["a", "b1", "b2", "c"]);
        assert_eq!(tree.parent(b), None);
        assert!(tree.check_consistency().is_ok());
    }

    #[test]
    fn test_insert_moves_attached_node() {
        let mut tree = TagTree::new();
        let first = para_with(&mut tree, &["one"]);
        let second = para_with(&mut tree, &["two"]);
        let moved = tree.children(first)[0];

        tree.append(second, moved);

        assert!(tree.children(first).is_empty());
        assert_eq!(tree.text_content(second), "twoone");
        assert!(tree.check_consistency().is_ok());
    }

    #[test]
    fn test_siblings_and_position() {
        let mut tree = TagTree::new();
        let a = para_with(&mut tree, &[]);
        let b = para_with(&mut tree, &[]);
        assert_eq!(tree.next_sibling(a), Some(b));
        assert_eq!(tree.prev_sibling(b), Some(a));
        assert_eq!(tree.prev_sibling(a), None);
        assert_eq!(tree.position(b), Some((tree.root(), 1)));
    }

    #[test]
    fn test_insert_before_and_after() {
        let mut tree = TagTree::new();
        let p = para_with(&mut tree, &["middle"]);
        let before = tree.create_tag(Tag::Blank, Payload::default());
        let after = tree.create_tag(Tag::Eol, Payload::default());
        tree.insert_before(p, before);
        tree.insert_after(p, after);
        assert_eq!(tree.children(tree.root()), &[before, p, after]);
    }

    #[test]
    fn test_descendants_are_in_document_order() {
        let mut tree = TagTree::new();
        let p = para_with(&mut tree, &["a"]);
        let i = tree.append_tag(p, Tag::I, Payload::default());
        tree.append_text(i, "b");
        tree.append_text(p, "c");
        assert_eq!(tree.text_content(tree.root()), "abc");
        assert_eq!(tree.find_all(tree.root(), Tag::I), vec![i]);
    }

    #[test]
    fn test_detached_nodes_are_unreachable() {
        let mut tree = TagTree::new();
        let p = para_with(&mut tree, &["gone"]);
        tree.detach(p);
        assert!(!tree.is_attached(p));
        assert_eq!(tree.text_content(tree.root()), "");
    }

    #[test]
    fn test_dump_outline() {
        let mut tree = TagTree::new();
        let p = para_with(&mut tree, &["x"]);
        tree.append_tag(p, Tag::Br, Payload::default());
        assert_eq!(tree.dump(), "BODY\n  P\n    \"x\"\n    BR/\n");
    }
}
