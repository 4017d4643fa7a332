//! DOM tree for the Magpie markup linter.
//!
//! This crate provides an arena-based DOM tree loosely following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/), reduced to what a
//! linter needs: documents, elements and text, with source locations and
//! per-node rule annotations.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all
//! relationships. A node owns the ordered list of its children's ids and
//! holds its parent id as a plain field, so re-parenting is an id-list edit
//! with no reference cycles. Ids are handed out monotonically and never
//! reused; a node id doubles as the node's identity for de-duplication.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt::Write as _;

use magpie_common::Location;

pub mod attribute;
pub mod element;
pub mod meta;
pub mod token_list;

pub use attribute::{AttrValue, Attribute, DynamicValue};
pub use element::{Closed, ElementData};
pub use meta::{ElementMeta, element_meta};
pub use token_list::TokenList;

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// Provides O(1) access to any node in the tree without borrowing issues.
/// The id is also the node's identity: ids are assigned in construction
/// order, strictly increasing, and never reused within a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(TextValue),
}

/// Text node content: a literal string or an unresolved expression.
#[derive(Debug, Clone)]
pub enum TextValue {
    /// Literal text as written in the markup.
    Static(String),
    /// An unresolved templating expression (`<% user.name %>`).
    Dynamic(DynamicValue),
}

impl TextValue {
    /// The textual form: the literal text, or the raw expression.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Static(text) => text,
            Self::Dynamic(dynamic) => dynamic.expr(),
        }
    }
}

/// Memoized derived properties of a node.
///
/// Derived values are explicit optional fields computed once. The cache only
/// takes effect after [`DomTree::enable_cache`] has been called for the node
/// (the parser does this once the node is fully constructed); until then
/// every read recomputes, so a half-built node never memoizes a stale value.
#[derive(Debug, Clone, Default)]
pub struct NodeCache {
    text_content: Option<String>,
}

/// A node in the tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children". Document order is the
    /// order of this list.
    pub children: Vec<NodeId>,

    /// Span of source text this node was built from.
    pub location: Location,

    disabled_rules: HashSet<String>,
    blocked_rules: HashSet<String>,
    cache: Option<RefCell<NodeCache>>,
}

impl Node {
    fn new(node_type: NodeType, location: Location) -> Self {
        Self {
            node_type,
            parent: None,
            children: Vec::new(),
            location,
            disabled_rules: HashSet::new(),
            blocked_rules: HashSet::new(),
            cache: None,
        }
    }

    /// The node name: `#document`, `#text` or the element tag name.
    #[must_use]
    pub fn node_name(&self) -> &str {
        match &self.node_type {
            NodeType::Document => "#document",
            NodeType::Element(data) => &data.tag_name,
            NodeType::Text(_) => "#text",
        }
    }

    /// Whether the given rule has been disabled on this node.
    #[must_use]
    pub fn is_rule_disabled(&self, rule: &str) -> bool {
        self.disabled_rules.contains(rule)
    }

    /// Whether the given rule has been blocked on this node.
    #[must_use]
    pub fn is_rule_blocked(&self, rule: &str) -> bool {
        self.blocked_rules.contains(rule)
    }

    /// Permanently disable rules on this node (directive `disable`).
    pub fn disable_rules<'a>(&mut self, rules: impl IntoIterator<Item = &'a str>) {
        self.disabled_rules
            .extend(rules.into_iter().map(ToString::to_string));
    }

    /// Block rules on this node (directive `disable-next` / `disable-block`).
    pub fn block_rules<'a>(&mut self, rules: impl IntoIterator<Item = &'a str>) {
        self.blocked_rules
            .extend(rules.into_iter().map(ToString::to_string));
    }
}

/// Arena-based DOM tree with O(1) node access.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree."
///
/// The document node is created with the tree and is always
/// [`NodeId::ROOT`]; it is never a selector match. The tree also records the
/// doctype seen during parsing, if any.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
    doctype: Option<String>,
}

impl DomTree {
    /// Create a new tree with just the document node.
    #[must_use]
    pub fn new(filename: impl Into<String>) -> Self {
        let location = Location::new(filename.into(), 0, 1, 1, 0);
        Self {
            nodes: vec![Node::new(NodeType::Document, location)],
            doctype: None,
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// The doctype value, if the document declared one.
    #[must_use]
    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    /// Record the doctype value.
    pub fn set_doctype(&mut self, doctype: impl Into<String>) {
        self.doctype = Some(doctype.into());
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Number of nodes allocated in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty (never: the document node always exists).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate an element node. The node is not yet attached to the tree.
    pub fn alloc_element(&mut self, data: ElementData, location: Location) -> NodeId {
        self.alloc(NodeType::Element(data), location)
    }

    /// Allocate a text node. The node is not yet attached to the tree.
    pub fn alloc_text(&mut self, text: TextValue, location: Location) -> NodeId {
        self.alloc(NodeType::Text(text), location)
    }

    fn alloc(&mut self, node_type: NodeType, location: Location) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(node_type, location));
        id
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// Appends `child` as the last child of `parent`. If the child is
    /// currently attached elsewhere it is detached first, so a node is never
    /// listed under two parents.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// [§ 4.2.1 Insert](https://dom.spec.whatwg.org/#concept-node-insert)
    ///
    /// Inserts `child` into `parent` immediately before `reference`,
    /// detaching it from any previous parent first. If `reference` is not a
    /// child of `parent` the node is appended at the end instead.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        match children.iter().position(|&existing| existing == reference) {
            Some(index) => children.insert(index, child),
            None => children.push(child),
        }
        self.nodes[child.0].parent = Some(parent);
    }

    /// [§ 4.2.3 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Removes `child` from `parent`. The node stays allocated (ids are
    /// never reused) but no longer participates in the tree.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.nodes[child.0].parent == Some(parent) {
            self.detach(child);
        }
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes[child.0].parent.take() {
            self.nodes[parent.0]
                .children
                .retain(|&existing| existing != child);
        }
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|node| match &node.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|node| match &mut node.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&TextValue> {
        self.get(id).and_then(|node| match &node.node_type {
            NodeType::Text(text) => Some(text),
            _ => None,
        })
    }

    /// Whether the node is an element.
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.as_element(id).is_some()
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over all descendants of a node in document order (the node
    /// itself excluded).
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        DescendantIterator { tree: self, stack }
    }

    /// Siblings after the node, in document order.
    #[must_use]
    pub fn following_siblings(&self, id: NodeId) -> Vec<NodeId> {
        self.siblings_from(id, false)
    }

    /// Siblings before the node, from nearest to first.
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let mut before = self.siblings_from(id, true);
        before.reverse();
        before
    }

    fn siblings_from(&self, id: NodeId, before: bool) -> Vec<NodeId> {
        let Some(parent) = self.parent(id) else {
            return Vec::new();
        };
        let children = self.children(parent);
        let Some(position) = children.iter().position(|&child| child == id) else {
            return Vec::new();
        };
        if before {
            children[..position].to_vec()
        } else {
            children[position + 1..].to_vec()
        }
    }

    /// The next sibling that is an element, if any.
    #[must_use]
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.following_siblings(id)
            .into_iter()
            .find(|&sibling| self.is_element(sibling))
    }

    /// The 1-based position of the element among its parent's element
    /// children (the `:nth-child` index). `None` for non-elements and
    /// detached nodes.
    #[must_use]
    pub fn element_index(&self, id: NodeId) -> Option<usize> {
        if !self.is_element(id) {
            return None;
        }
        let parent = self.parent(id)?;
        self.children(parent)
            .iter()
            .filter(|&&child| self.is_element(child))
            .position(|&child| child == id)
            .map(|index| index + 1)
    }

    /// Enable the per-node cache.
    ///
    /// Called by the parser once the node is fully constructed. Before this,
    /// derived-property reads recompute on every call and never memoize.
    pub fn enable_cache(&mut self, id: NodeId) {
        if let Some(node) = self.get_mut(id)
            && node.cache.is_none()
        {
            node.cache = Some(RefCell::new(NodeCache::default()));
        }
    }

    /// Whether the per-node cache has been enabled.
    #[must_use]
    pub fn is_cache_enabled(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|node| node.cache.is_some())
    }

    /// The concatenated text of the node's text descendants.
    ///
    /// Dynamic text contributes its raw expression. Memoized once the node's
    /// cache has been enabled.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(node) = self.get(id)
            && let Some(cache) = &node.cache
        {
            let cached = cache.borrow().text_content.clone();
            if let Some(text) = cached {
                return text;
            }
            let text = self.compute_text_content(id);
            cache.borrow_mut().text_content = Some(text.clone());
            return text;
        }
        self.compute_text_content(id)
    }

    fn compute_text_content(&self, id: NodeId) -> String {
        let mut result = String::new();
        if let Some(node) = self.get(id) {
            match &node.node_type {
                NodeType::Text(text) => result.push_str(text.text()),
                _ => {
                    for &child in &node.children {
                        result.push_str(&self.compute_text_content(child));
                    }
                }
            }
        }
        result
    }

    /// Render the subtree as an indented debug listing.
    #[must_use]
    pub fn dump(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.dump_node(id, 0, &mut out);
        out
    }

    fn dump_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        let _ = writeln!(out, "{}{}", "  ".repeat(depth), node.node_name());
        for &child in &node.children {
            self.dump_node(child, depth + 1, out);
        }
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over descendants of a node in document order.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        for &child in self.tree.children(id).iter().rev() {
            self.stack.push(child);
        }
        Some(id)
    }
}
