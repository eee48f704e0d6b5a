//! Document fragments: ordered sequences of root-less model nodes.

use super::NodeId;

/// An ordered list of detached model nodes.
///
/// Used when one view node converts to several disjoint model nodes, for
/// example an element that was split around a hoisted child.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelFragment {
    nodes: Vec<NodeId>,
}

impl ModelFragment {
    /// Create an empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node at the end.
    pub fn push(&mut self, node: NodeId) {
        self.nodes.push(node);
    }

    /// Append many nodes at the end.
    pub fn extend(&mut self, nodes: impl IntoIterator<Item = NodeId>) {
        self.nodes.extend(nodes);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn into_vec(self) -> Vec<NodeId> {
        self.nodes
    }
}

impl From<Vec<NodeId>> for ModelFragment {
    fn from(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }
}

impl FromIterator<NodeId> for ModelFragment {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ModelFragment {
    type Item = NodeId;
    type IntoIter = std::vec::IntoIter<NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}
