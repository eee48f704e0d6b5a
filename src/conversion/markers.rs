//! Autohoist markers.
//!
//! A node converted outside its natural context is marked with the depth of
//! the context it was actually converted at. The repair step splits
//! ancestors until the node sits at that depth, then clears the marker.
//! The side table lives in the upcast pass and is dropped with it, so it
//! never outlives the nodes it refers to.

use std::collections::HashMap;

use crate::model::NodeId;

#[derive(Debug, Default)]
pub struct HoistMarkers {
    targets: HashMap<NodeId, usize>,
}

impl HoistMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a node as hoisted to a context of `target_depth` entries.
    pub fn mark(&mut self, node: NodeId, target_depth: usize) {
        self.targets.insert(node, target_depth);
    }

    /// The target context depth of a hoisted node.
    pub fn target(&self, node: NodeId) -> Option<usize> {
        self.targets.get(&node).copied()
    }

    pub fn clear(&mut self, node: NodeId) {
        self.targets.remove(&node);
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
