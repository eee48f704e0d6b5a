//! Abstract document model.
//!
//! The model is a plain ordered tree: elements carry a name and string
//! attributes, text nodes carry their data. Nodes live in an arena and are
//! addressed by [`NodeId`]; a detached node stays in the arena with no
//! parent until it is inserted again.
//!
//! # Example
//!
//! ```
//! use figtree::model::Model;
//!
//! let mut model = Model::new();
//! let image = model.create_element("image", [("src", "a.png")]);
//! model.append(model.root(), image);
//! assert_eq!(model.stringify(model.root()), r#"<image src="a.png"></image>"#);
//! ```

mod fragment;

pub use fragment::ModelFragment;

use std::collections::BTreeMap;
use std::fmt::Write;
use std::ops::Range;

/// Name reported for text nodes (matches the schema's text item).
pub const TEXT_NAME: &str = "$text";

/// Name of the model root element.
pub const ROOT_NAME: &str = "$root";

/// Unique identifier for a node within a [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The root node ID (always 0).
    pub const ROOT: NodeId = NodeId(0);
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Payload of a model node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element {
        name: String,
        attrs: BTreeMap<String, String>,
    },
    Text(String),
}

/// A node in the model tree.
#[derive(Debug, Clone)]
pub struct ModelNode {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl ModelNode {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Arena-backed model tree. Index 0 is always the root.
#[derive(Debug, Clone)]
pub struct Model {
    nodes: Vec<ModelNode>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Create a new model containing only the root element.
    pub fn new() -> Self {
        Self {
            nodes: vec![ModelNode::new(NodeData::Element {
                name: ROOT_NAME.to_string(),
                attrs: BTreeMap::new(),
            })],
        }
    }

    /// Get the root node ID.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&ModelNode> {
        self.nodes.get(id.0 as usize)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut ModelNode> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Get the number of nodes in the arena (attached or not).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn alloc(&mut self, node: ModelNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element.
    pub fn create_element<I, K, V>(&mut self, name: &str, attrs: I) -> NodeId
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let attrs = attrs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.alloc(ModelNode::new(NodeData::Element {
            name: name.to_string(),
            attrs,
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(ModelNode::new(NodeData::Text(text.into())))
    }

    /// Create a detached copy of an element with the same name and
    /// attributes but no children.
    pub fn clone_shallow(&mut self, id: NodeId) -> Option<NodeId> {
        let data = self.node(id)?.data.clone();
        Some(self.alloc(ModelNode::new(data)))
    }

    /// Get the node's name. Text nodes report [`TEXT_NAME`].
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|n| match &n.data {
            NodeData::Element { name, .. } => name.as_str(),
            NodeData::Text(_) => TEXT_NAME,
        })
    }

    /// Check whether the node is an element with the given name.
    pub fn is_element_named(&self, id: NodeId, name: &str) -> bool {
        self.is_element(id) && self.name(id) == Some(name)
    }

    /// Check if node is an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        self.node(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    /// Check if node is a text node.
    pub fn is_text(&self, id: NodeId) -> bool {
        self.node(id)
            .is_some_and(|n| matches!(n.data, NodeData::Text(_)))
    }

    /// Get the data of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(|n| match &n.data {
            NodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Get an attribute value.
    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        self.attrs(id)?.get(key).map(|v| v.as_str())
    }

    /// Get all attributes of an element, ordered by key.
    pub fn attrs(&self, id: NodeId) -> Option<&BTreeMap<String, String>> {
        self.node(id).and_then(|n| match &n.data {
            NodeData::Element { attrs, .. } => Some(attrs),
            _ => None,
        })
    }

    fn attrs_mut(&mut self, id: NodeId) -> Option<&mut BTreeMap<String, String>> {
        self.node_mut(id).and_then(|n| match &mut n.data {
            NodeData::Element { attrs, .. } => Some(attrs),
            _ => None,
        })
    }

    /// Set an attribute on an element.
    ///
    /// Returns `None` if the node is not an element, otherwise the previous
    /// value (`Some(None)` when the attribute was absent).
    pub fn set_attr(&mut self, id: NodeId, key: &str, value: &str) -> Option<Option<String>> {
        let attrs = self.attrs_mut(id)?;
        Some(attrs.insert(key.to_string(), value.to_string()))
    }

    /// Remove an attribute from an element, returning the previous value.
    pub fn remove_attr(&mut self, id: NodeId, key: &str) -> Option<String> {
        self.attrs_mut(id)?.remove(key)
    }

    /// Get the parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Get the children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Get the number of children of a node.
    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    /// Get the position of a node within its parent.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Append a node to a parent, detaching it from any previous parent.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let index = self.child_count(parent);
        self.insert(parent, index, &[child]);
    }

    /// Insert nodes at `index` in `parent`, in order.
    ///
    /// Each node is detached from its previous parent first. The index is
    /// clamped to the parent's child count.
    pub fn insert(&mut self, parent: NodeId, index: usize, nodes: &[NodeId]) {
        for &node in nodes {
            self.detach(node);
        }

        for &node in nodes {
            if let Some(n) = self.node_mut(node) {
                n.parent = Some(parent);
            }
        }

        if let Some(p) = self.node_mut(parent) {
            let index = index.min(p.children.len());
            p.children.splice(index..index, nodes.iter().copied());
        }
    }

    /// Remove a range of children from `parent`, returning the detached ids.
    pub fn remove_children(&mut self, parent: NodeId, range: Range<usize>) -> Vec<NodeId> {
        let Some(p) = self.node_mut(parent) else {
            return Vec::new();
        };
        let end = range.end.min(p.children.len());
        let start = range.start.min(end);
        let removed: Vec<NodeId> = p.children.drain(start..end).collect();

        for &node in &removed {
            if let Some(n) = self.node_mut(node) {
                n.parent = None;
            }
        }
        removed
    }

    /// Remove a node from its parent. The node keeps its own children.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(index) = self.index_of(id)
            && let Some(parent) = self.parent(id)
        {
            self.remove_children(parent, index..index + 1);
        }
    }

    /// Iterate over a subtree in depth-first (document) order.
    pub fn iter_dfs(&self, from: NodeId) -> DfsIter<'_> {
        DfsIter {
            model: self,
            stack: vec![from],
        }
    }

    /// Render a subtree in a compact, deterministic markup form.
    ///
    /// Attributes are written in key order; text is written verbatim.
    /// The root element itself is omitted, only its content is written.
    pub fn stringify(&self, id: NodeId) -> String {
        let mut out = String::new();
        if id == NodeId::ROOT {
            for &child in self.children(id) {
                self.stringify_into(child, &mut out);
            }
        } else {
            self.stringify_into(id, &mut out);
        }
        out
    }

    /// Render a list of root-less nodes (see [`Model::stringify`]).
    pub fn stringify_all(&self, nodes: &[NodeId]) -> String {
        let mut out = String::new();
        for &node in nodes {
            self.stringify_into(node, &mut out);
        }
        out
    }

    fn stringify_into(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element { name, attrs } => {
                out.push('<');
                out.push_str(name);
                for (key, value) in attrs {
                    write!(out, " {}=\"{}\"", key, value).unwrap();
                }
                out.push('>');
                for &child in &node.children {
                    self.stringify_into(child, out);
                }
                write!(out, "</{}>", name).unwrap();
            }
        }
    }
}

/// Depth-first iterator over a subtree.
pub struct DfsIter<'a> {
    model: &'a Model,
    stack: Vec<NodeId>,
}

impl Iterator for DfsIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.model.children(current).iter().rev().copied());
        Some(current)
    }
}
