//! Model ⇄ view element bindings.

use std::collections::HashMap;

use crate::model::NodeId;
use crate::view::ViewNodeId;

/// Bidirectional map between model elements and the view elements that
/// render them.
#[derive(Debug, Default, Clone)]
pub struct Mapper {
    model_to_view: HashMap<NodeId, ViewNodeId>,
    view_to_model: HashMap<ViewNodeId, NodeId>,
}

impl Mapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a model element to its view element, replacing older bindings
    /// of either side.
    pub fn bind(&mut self, model: NodeId, view: ViewNodeId) {
        self.unbind_model(model);
        if let Some(old_model) = self.view_to_model.remove(&view) {
            self.model_to_view.remove(&old_model);
        }
        self.model_to_view.insert(model, view);
        self.view_to_model.insert(view, model);
    }

    /// Remove the binding of a model element.
    pub fn unbind_model(&mut self, model: NodeId) {
        if let Some(view) = self.model_to_view.remove(&model) {
            self.view_to_model.remove(&view);
        }
    }

    pub fn to_view_element(&self, model: NodeId) -> Option<ViewNodeId> {
        self.model_to_view.get(&model).copied()
    }

    pub fn to_model_element(&self, view: ViewNodeId) -> Option<NodeId> {
        self.view_to_model.get(&view).copied()
    }

    pub fn clear(&mut self) {
        self.model_to_view.clear();
        self.view_to_model.clear();
    }

    pub fn len(&self) -> usize {
        self.model_to_view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.model_to_view.is_empty()
    }
}
