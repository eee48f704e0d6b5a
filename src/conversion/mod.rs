//! Conversion pipelines between the view and the model.
//!
//! ```text
//! data HTML ──parse──▶ ViewDom ──upcast──▶ Model ──downcast──▶ ViewDom ──serialize──▶ HTML
//! ```
//!
//! Both directions are driven by dispatchers holding prioritised converters.
//! Upcast converters decide per view node; downcast converters render model
//! elements and keep rendered views in sync with attribute changes.

mod consumable;
mod downcast;
mod generic;
mod mapper;
mod markers;
mod upcast;

pub use consumable::{ChangeKind, ConsumeSpec, ModelConsumables, ViewConsumables};
pub use downcast::{
    AttributeConverter, AttributeEvent, DowncastApi, DowncastDispatcher, ElementToView,
    InsertConverter, ViewSlot,
};
pub use generic::{ElementToElement, TextConverter, TransparentElement};
pub use mapper::Mapper;
pub use markers::HoistMarkers;
pub use upcast::{UpcastApi, UpcastConverter, UpcastDispatcher, UpcastPostProcessor};

use crate::model::{ModelFragment, NodeId};

/// Converter priority. Higher tiers are tried first; converters of the same
/// tier run in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    Highest,
    High,
    #[default]
    Normal,
    Low,
    Lowest,
}

/// Result of converting one view node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOutput {
    /// A single model node.
    Node(NodeId),
    /// Zero or more model nodes, e.g. from a transparent element or a split.
    Fragment(ModelFragment),
}

impl ModelOutput {
    /// The single node, if this output is one.
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            ModelOutput::Node(id) => Some(*id),
            ModelOutput::Fragment(_) => None,
        }
    }

    pub fn into_nodes(self) -> Vec<NodeId> {
        match self {
            ModelOutput::Node(id) => vec![id],
            ModelOutput::Fragment(fragment) => fragment.into_vec(),
        }
    }
}
