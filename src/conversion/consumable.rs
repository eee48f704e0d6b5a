//! One-shot markers that stop a node or attribute from converting twice.
//!
//! Both trackers are allocated fresh for every conversion pass and dropped
//! at its end.

use std::collections::HashSet;

use crate::model::NodeId;
use crate::view::{ViewDom, ViewNodeId};

/// The parts of a view node a converter wants to consume.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumeSpec {
    name: bool,
    attributes: Vec<String>,
    classes: Vec<String>,
}

impl ConsumeSpec {
    /// A spec covering the node itself (its element name, or the text node).
    pub fn name() -> Self {
        Self {
            name: true,
            ..Self::default()
        }
    }

    /// An empty spec; add parts with the builder methods.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, key: &str) -> Self {
        self.attributes.push(key.to_string());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    fn keys(&self) -> impl Iterator<Item = ConsumableKey> + '_ {
        self.name
            .then_some(ConsumableKey::Name)
            .into_iter()
            .chain(
                self.attributes
                    .iter()
                    .map(|a| ConsumableKey::Attribute(a.clone())),
            )
            .chain(self.classes.iter().map(|c| ConsumableKey::Class(c.clone())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConsumableKey {
    Name,
    Attribute(String),
    Class(String),
}

/// Tracks which parts of which view nodes were converted in this pass.
#[derive(Debug, Default)]
pub struct ViewConsumables {
    consumed: HashSet<(ViewNodeId, ConsumableKey)>,
}

impl ViewConsumables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that every part of `spec` exists on the node and none of them
    /// has been consumed yet.
    pub fn test(&self, view: &ViewDom, node: ViewNodeId, spec: &ConsumeSpec) -> bool {
        if view.get(node).is_none() {
            return false;
        }
        spec.keys().all(|key| {
            let present = match &key {
                ConsumableKey::Name => view.is_element(node) || view.is_text(node),
                ConsumableKey::Attribute(a) => view.has_attr(node, a),
                ConsumableKey::Class(c) => view.has_class(node, c),
            };
            present && !self.consumed.contains(&(node, key))
        })
    }

    /// Consume every part of `spec`, or nothing if any part fails [`test`].
    ///
    /// [`test`]: ViewConsumables::test
    pub fn consume(&mut self, view: &ViewDom, node: ViewNodeId, spec: &ConsumeSpec) -> bool {
        if !self.test(view, node, spec) {
            return false;
        }
        for key in spec.keys() {
            self.consumed.insert((node, key));
        }
        true
    }
}

/// Kind of a model attribute change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Add,
    Change,
    Remove,
}

impl ChangeKind {
    /// Derive the kind from the old and new values; `None` if nothing changed.
    pub fn between(old: Option<&str>, new: Option<&str>) -> Option<Self> {
        match (old, new) {
            (None, Some(_)) => Some(ChangeKind::Add),
            (Some(o), Some(n)) if o != n => Some(ChangeKind::Change),
            (Some(_), None) => Some(ChangeKind::Remove),
            _ => None,
        }
    }
}

/// Pending model attribute changes for one downcast pass.
#[derive(Debug, Default)]
pub struct ModelConsumables {
    pending: HashSet<(NodeId, ChangeKind, String)>,
}

impl ModelConsumables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: NodeId, kind: ChangeKind, key: &str) {
        self.pending.insert((node, kind, key.to_string()));
    }

    pub fn test(&self, node: NodeId, kind: ChangeKind, key: &str) -> bool {
        self.pending.contains(&(node, kind, key.to_string()))
    }

    /// Consume a pending change. Returns `false` if it was never added or
    /// has already been consumed.
    pub fn consume(&mut self, node: NodeId, kind: ChangeKind, key: &str) -> bool {
        self.pending.remove(&(node, kind, key.to_string()))
    }
}
