//! Document tree for the Sassy style-sheet language.
//!
//! The tree is an arena: every node lives in one `Vec` owned by the [`Tree`]
//! and is addressed by a [`NodeId`]. Parent/child links are indices, so moving
//! a node is a relink and never invalidates ids. Detached nodes stay in the
//! arena but are unreachable from the root; ids are never reused. Expansion
//! leaves such garbage behind (consumed call sites, proxy roots, harvested
//! `@mixin` blocks), bounded by the size of the work done;
//! [`Tree::compact`] rebuilds the arena from the reachable nodes only.
//!
//! A fragment that must outlive the document it came from (a mixin body) is
//! copied into its own `Tree` with [`Tree::extract`] and brought back with
//! [`Tree::import`], which allocates fresh nodes each time.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::SourceContext;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Byte range of a node in its source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Provenance of a node: which source it came from and where.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub context: Arc<SourceContext>,
    pub span: Span,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.context.name, self.line, self.column)
    }
}

/// Index of a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// The four node types of a style sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Rule {
        selector: String,
    },
    /// `@name params;` when `has_block` is false, `@name params { ... }` otherwise.
    AtRule {
        name: String,
        params: String,
        has_block: bool,
    },
    Decl {
        prop: String,
        value: String,
    },
}

impl NodeKind {
    pub fn rule(selector: impl Into<String>) -> Self {
        NodeKind::Rule {
            selector: selector.into(),
        }
    }

    pub fn at_rule(name: impl Into<String>, params: impl Into<String>, has_block: bool) -> Self {
        NodeKind::AtRule {
            name: name.into(),
            params: params.into(),
            has_block,
        }
    }

    pub fn decl(prop: impl Into<String>, value: impl Into<String>) -> Self {
        NodeKind::Decl {
            prop: prop.into(),
            value: value.into(),
        }
    }

    /// True for an at-rule with the given name.
    pub fn is_at_rule(&self, wanted: &str) -> bool {
        matches!(self, NodeKind::AtRule { name, .. } if name == wanted)
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    source: Option<Source>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An arena-backed document tree with a single root.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Creates a tree holding only an empty root node.
    pub fn new() -> Self {
        Self::with_root_source(None)
    }

    pub fn with_root_source(source: Option<Source>) -> Self {
        let root = NodeData {
            kind: NodeKind::Root,
            source,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Allocates a detached node.
    pub fn create(&mut self, kind: NodeKind, source: Option<Source>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            source,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0].kind
    }

    pub fn source(&self, id: NodeId) -> Option<&Source> {
        self.nodes[id.0].source.as_ref()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Appends `child` as the last child of `parent`, detaching it first.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Inserts `node` as the sibling immediately before `anchor`.
    ///
    /// Returns false, leaving `node` untouched, when `anchor` has no parent.
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) -> bool {
        if anchor == node || self.parent(anchor).is_none() {
            return false;
        }
        self.detach(node);
        let Some(parent) = self.parent(anchor) else {
            return false;
        };
        let siblings = &mut self.nodes[parent.0].children;
        let index = siblings
            .iter()
            .position(|&sibling| sibling == anchor)
            .unwrap_or(siblings.len());
        siblings.insert(index, node);
        self.nodes[node.0].parent = Some(parent);
        true
    }

    /// Removes `id` from its parent. Its own subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != id);
        }
    }

    /// True if walking up from `id` reaches `ancestor`.
    pub fn is_attached(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// All descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Descendant at-rules named `name`, in document order.
    pub fn at_rules(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&node| self.kind(node).is_at_rule(name))
            .collect()
    }

    /// The first descendant at-rule named `name`; stops at the first match.
    pub fn first_at_rule(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if self.kind(node).is_at_rule(name) {
                return Some(node);
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        None
    }

    /// Copies the subtree at `id` into fresh, detached nodes of this tree.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let data = &self.nodes[id.0];
        let (kind, source, children) = (data.kind.clone(), data.source.clone(), data.children.clone());
        let copy = self.create(kind, source);
        for child in children {
            let child_copy = self.deep_clone(child);
            self.append(copy, child_copy);
        }
        copy
    }

    /// Copies the subtree at `src_id` of another tree into this one, detached.
    pub fn import(&mut self, src: &Tree, src_id: NodeId) -> NodeId {
        let copy = self.create(src.kind(src_id).clone(), src.source(src_id).cloned());
        for &child in src.children(src_id) {
            let child_copy = self.import(src, child);
            self.append(copy, child_copy);
        }
        copy
    }

    /// Copies the children of `id` into a new, independently owned tree whose
    /// root carries `id`'s provenance.
    pub fn extract(&self, id: NodeId) -> Tree {
        let mut fragment = Tree::with_root_source(self.source(id).cloned());
        let root = fragment.root();
        for &child in self.children(id) {
            let copy = fragment.import(self, child);
            fragment.append(root, copy);
        }
        fragment
    }

    /// Rebuilds the arena with only the nodes reachable from the root, in
    /// document order. Every previously handed out id is invalidated.
    pub fn compact(&mut self) {
        *self = self.extract(self.root);
    }

    /// Number of nodes allocated in the arena, detached ones included.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes reachable from the root, root included.
    pub fn len(&self) -> usize {
        self.descendants(self.root).len() + 1
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Tree, NodeId, NodeId, NodeId) {
        let mut tree = Tree::new();
        let root = tree.root();
        let rule = tree.create(NodeKind::rule("a"), None);
        let decl = tree.create(NodeKind::decl("color", "red"), None);
        let at = tree.create(NodeKind::at_rule("include", "m", false), None);
        tree.append(root, rule);
        tree.append(rule, decl);
        tree.append(rule, at);
        (tree, rule, decl, at)
    }

    #[test]
    fn test_insert_before_keeps_order() {
        let (mut tree, rule, decl, at) = sample();
        let new = tree.create(NodeKind::decl("margin", "0"), None);
        assert!(tree.insert_before(at, new));
        assert_eq!(tree.children(rule), &[decl, new, at]);
        assert_eq!(tree.parent(new), Some(rule));
    }

    #[test]
    fn test_insert_before_moves_existing_sibling() {
        let (mut tree, rule, decl, at) = sample();
        assert!(tree.insert_before(decl, at));
        assert_eq!(tree.children(rule), &[at, decl]);
    }

    #[test]
    fn test_insert_before_detached_anchor_is_refused() {
        let mut tree = Tree::new();
        let anchor = tree.create(NodeKind::rule("a"), None);
        let node = tree.create(NodeKind::rule("b"), None);
        assert!(!tree.insert_before(anchor, node));
    }

    #[test]
    fn test_detach_and_attachment() {
        let (mut tree, rule, _decl, at) = sample();
        assert!(tree.is_attached(at, tree.root()));
        tree.detach(rule);
        assert!(!tree.is_attached(at, tree.root()));
        assert!(tree.is_attached(at, rule));
    }

    #[test]
    fn test_at_rules_in_document_order() {
        let mut tree = Tree::new();
        let root = tree.root();
        let first = tree.create(NodeKind::at_rule("include", "a", false), None);
        let rule = tree.create(NodeKind::rule("b"), None);
        let nested = tree.create(NodeKind::at_rule("include", "c", false), None);
        let last = tree.create(NodeKind::at_rule("include", "d", false), None);
        tree.append(root, first);
        tree.append(root, rule);
        tree.append(rule, nested);
        tree.append(root, last);
        assert_eq!(tree.at_rules(root, "include"), vec![first, nested, last]);
        assert_eq!(tree.first_at_rule(rule, "include"), Some(nested));
        assert_eq!(tree.first_at_rule(root, "content"), None);
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let (mut tree, rule, decl, _at) = sample();
        let copy = tree.deep_clone(rule);
        let copied_decl = tree.children(copy)[0];
        assert_ne!(copied_decl, decl);
        if let NodeKind::Decl { value, .. } = tree.kind_mut(copied_decl) {
            *value = "blue".to_string();
        }
        assert_eq!(tree.kind(decl), &NodeKind::decl("color", "red"));
        assert_eq!(tree.parent(copy), None);
    }

    #[test]
    fn test_compact_drops_detached_nodes() {
        let (mut tree, rule, _decl, at) = sample();
        let orphan = tree.deep_clone(rule);
        tree.detach(at);
        assert_eq!(tree.arena_len(), 7);
        assert!(!tree.is_attached(orphan, tree.root()));

        tree.compact();
        assert_eq!(tree.arena_len(), 3);
        assert_eq!(tree.len(), 3);
        let rule = tree.children(tree.root())[0];
        assert_eq!(tree.kind(rule), &NodeKind::rule("a"));
        assert_eq!(tree.kind(tree.children(rule)[0]), &NodeKind::decl("color", "red"));
    }

    #[test]
    fn test_extract_then_import_round_trips_structure() {
        let (tree, rule, _decl, _at) = sample();
        let fragment = tree.extract(rule);
        assert_eq!(fragment.children(fragment.root()).len(), 2);

        let mut other = Tree::new();
        let proxy = other.import(&fragment, fragment.root());
        assert_eq!(other.kind(proxy), &NodeKind::Root);
        assert_eq!(other.children(proxy).len(), 2);
        assert_eq!(other.kind(other.children(proxy)[0]), &NodeKind::decl("color", "red"));
    }
}
