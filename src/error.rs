//! Error types for figtree operations.
//!
//! Conversion itself never fails: a converter that cannot handle a node
//! declines and the next one is tried. Errors only come from the host-facing
//! API (schema setup, plugin loading, direct model edits).

use thiserror::Error;

use crate::model::NodeId;

/// Errors raised by the editor and schema APIs.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown model node {0}")]
    UnknownNode(NodeId),

    #[error("model node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("attribute `{key}` is not allowed on `{name}`")]
    InvalidAttribute { key: String, name: String },

    #[error("attribute `{key}` is required on `{name}` and cannot be removed or empty")]
    RequiredAttribute { key: String, name: String },

    #[error("schema item `{0}` is already registered")]
    DuplicateSchemaItem(String),

    #[error("schema item `{0}` is not registered")]
    UnknownSchemaItem(String),

    #[error("plugin `{0}` is already loaded")]
    DuplicatePlugin(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
