//! Arena-based view tree.
//!
//! Both rendered views (the editing view and the serialized data view) are
//! `ViewDom` instances. Nodes live in a contiguous vector; parent, child and
//! sibling links are indices into it. Detached nodes stay in the arena with
//! no parent until they are re-attached.

use html5ever::{LocalName, QualName, ns};

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewNodeId(pub u32);

impl ViewNodeId {
    /// Sentinel value for no node.
    pub const NONE: ViewNodeId = ViewNodeId(u32::MAX);

    /// Check if this is a valid node ID.
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Check if this is the sentinel value.
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node type in the view tree.
#[derive(Debug, Clone)]
pub enum ViewNodeData {
    /// Document root.
    Document,
    /// Element with name and attributes.
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Pre-split `class` attribute, kept in sync by `set_attr`.
        classes: Vec<String>,
    },
    /// Text content.
    Text(String),
    /// Parsed markup with no content: comments, processing instructions.
    /// Never converted or serialized.
    Inert,
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

impl Attribute {
    /// Create an attribute in the null namespace.
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.into(),
        }
    }
}

/// A node in the view tree.
#[derive(Debug)]
pub struct ViewNode {
    pub data: ViewNodeData,
    pub parent: ViewNodeId,
    pub first_child: ViewNodeId,
    pub last_child: ViewNodeId,
    pub prev_sibling: ViewNodeId,
    pub next_sibling: ViewNodeId,
}

impl ViewNode {
    fn new(data: ViewNodeData) -> Self {
        Self {
            data,
            parent: ViewNodeId::NONE,
            first_child: ViewNodeId::NONE,
            last_child: ViewNodeId::NONE,
            prev_sibling: ViewNodeId::NONE,
            next_sibling: ViewNodeId::NONE,
        }
    }
}

fn split_classes(value: &str) -> Vec<String> {
    value.split_whitespace().map(|s| s.to_string()).collect()
}

/// Arena-based view tree.
#[derive(Debug)]
pub struct ViewDom {
    nodes: Vec<ViewNode>,
    document: ViewNodeId,
}

impl ViewDom {
    /// Create a new empty view with a document root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: ViewNodeId::NONE,
        };
        dom.document = dom.alloc(ViewNode::new(ViewNodeData::Document));
        dom
    }

    fn alloc(&mut self, node: ViewNode) -> ViewNodeId {
        let id = ViewNodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the document root ID.
    pub fn document(&self) -> ViewNodeId {
        self.document
    }

    /// Get a node by ID.
    pub fn get(&self, id: ViewNodeId) -> Option<&ViewNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: ViewNodeId) -> Option<&mut ViewNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Create a new element node.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> ViewNodeId {
        let classes = attrs
            .iter()
            .find(|a| a.name.local.as_ref() == "class")
            .map(|a| split_classes(&a.value))
            .unwrap_or_default();

        self.alloc(ViewNode::new(ViewNodeData::Element {
            name,
            attrs,
            classes,
        }))
    }

    /// Create a new HTML element by tag name.
    pub fn create_html_element(&mut self, tag: &str, attrs: Vec<Attribute>) -> ViewNodeId {
        self.create_element(QualName::new(None, ns!(html), LocalName::from(tag)), attrs)
    }

    /// Create a new text node.
    pub fn create_text(&mut self, text: String) -> ViewNodeId {
        self.alloc(ViewNode::new(ViewNodeData::Text(text)))
    }

    /// Create a node that holds no content.
    pub fn create_inert(&mut self) -> ViewNodeId {
        self.alloc(ViewNode::new(ViewNodeData::Inert))
    }

    /// Append a child to a parent node.
    pub fn append(&mut self, parent: ViewNodeId, child: ViewNodeId) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(ViewNodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = ViewNodeId::NONE;
        }

        if let Some(last_node) = self.get_mut(last_child) {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert a node before a sibling.
    pub fn insert_before(&mut self, sibling: ViewNodeId, new_node: ViewNodeId) {
        let (parent, prev) = self
            .get(sibling)
            .map(|n| (n.parent, n.prev_sibling))
            .unwrap_or((ViewNodeId::NONE, ViewNodeId::NONE));

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Append text to an existing text node, or create new if last child isn't text.
    pub fn append_text(&mut self, parent: ViewNodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(ViewNodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let ViewNodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Remove a node from its parent. The node keeps its own children.
    pub fn detach(&mut self, target: ViewNodeId) {
        let (parent, prev, next) = match self.get(target) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(target) {
            node.parent = ViewNodeId::NONE;
            node.prev_sibling = ViewNodeId::NONE;
            node.next_sibling = ViewNodeId::NONE;
        }
    }

    /// Get the number of nodes in the arena (attached or not).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the view is empty (only has document root).
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Get the parent of a node.
    pub fn parent(&self, id: ViewNodeId) -> Option<ViewNodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_some())
    }

    /// Get the first child of a node.
    pub fn first_child(&self, id: ViewNodeId) -> Option<ViewNodeId> {
        self.get(id).map(|n| n.first_child).filter(|c| c.is_some())
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: ViewNodeId) -> ChildrenIter<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(ViewNodeId::NONE);
        ChildrenIter {
            dom: self,
            current: first,
        }
    }

    /// Find the first node matching a predicate (DFS from the document).
    pub fn find<F>(&self, predicate: F) -> Option<ViewNodeId>
    where
        F: Fn(&ViewNode) -> bool,
    {
        let mut stack = vec![self.document];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                if predicate(node) {
                    return Some(id);
                }
                let mut children: Vec<_> = self.children(id).collect();
                children.reverse();
                stack.extend(children);
            }
        }
        None
    }

    /// Find element by tag name (first match).
    pub fn find_by_tag(&self, tag: &str) -> Option<ViewNodeId> {
        self.find(|node| {
            if let ViewNodeData::Element { name, .. } = &node.data {
                name.local.as_ref() == tag
            } else {
                false
            }
        })
    }
}

impl Default for ViewDom {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    dom: &'a ViewDom,
    current: ViewNodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = ViewNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .dom
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(ViewNodeId::NONE);
        Some(id)
    }
}

/// Convenience methods for element nodes.
impl ViewDom {
    /// Get element's local name (tag).
    pub fn element_name(&self, id: ViewNodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            ViewNodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    /// Check whether the node is an element with the given tag.
    pub fn is_element_named(&self, id: ViewNodeId, tag: &str) -> bool {
        self.element_name(id).is_some_and(|n| n.as_ref() == tag)
    }

    /// Get an attribute value.
    pub fn get_attr(&self, id: ViewNodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ViewNodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    /// Check whether the element carries an attribute.
    pub fn has_attr(&self, id: ViewNodeId, attr_name: &str) -> bool {
        self.get_attr(id, attr_name).is_some()
    }

    /// Iterate over an element's attributes in source order.
    pub fn attrs(&self, id: ViewNodeId) -> &[Attribute] {
        self.get(id)
            .and_then(|n| match &n.data {
                ViewNodeData::Element { attrs, .. } => Some(attrs.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Set an attribute, replacing any existing value.
    ///
    /// Returns `false` if the node is not an element.
    pub fn set_attr(&mut self, id: ViewNodeId, attr_name: &str, value: &str) -> bool {
        let Some(ViewNodeData::Element { attrs, classes, .. }) =
            self.get_mut(id).map(|n| &mut n.data)
        else {
            return false;
        };

        match attrs.iter_mut().find(|a| a.name.local.as_ref() == attr_name) {
            Some(existing) => existing.value = value.to_string(),
            None => attrs.push(Attribute::new(attr_name, value)),
        }
        if attr_name == "class" {
            *classes = split_classes(value);
        }
        true
    }

    /// Remove an attribute. Returns `true` if it was present.
    pub fn remove_attr(&mut self, id: ViewNodeId, attr_name: &str) -> bool {
        let Some(ViewNodeData::Element { attrs, classes, .. }) =
            self.get_mut(id).map(|n| &mut n.data)
        else {
            return false;
        };

        let before = attrs.len();
        attrs.retain(|a| a.name.local.as_ref() != attr_name);
        if attr_name == "class" {
            classes.clear();
        }
        attrs.len() != before
    }

    /// Get element's classes.
    pub fn element_classes(&self, id: ViewNodeId) -> &[String] {
        self.get(id)
            .and_then(|n| match &n.data {
                ViewNodeData::Element { classes, .. } => Some(classes.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Check whether the element carries a class.
    pub fn has_class(&self, id: ViewNodeId, class: &str) -> bool {
        self.element_classes(id).iter().any(|c| c == class)
    }

    /// Check if node is an element.
    pub fn is_element(&self, id: ViewNodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, ViewNodeData::Element { .. }))
    }

    /// Check if node is a text node.
    pub fn is_text(&self, id: ViewNodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, ViewNodeData::Text(_)))
    }

    /// Get text content of a text node.
    pub fn text_content(&self, id: ViewNodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ViewNodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }
}
