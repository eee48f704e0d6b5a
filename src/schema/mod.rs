//! Schema oracle: which model nodes may appear where.
//!
//! Items are registered by name with the parents they are allowed in, the
//! attributes they accept, and flags (`limit`, `object`, `block`). A check
//! is always made against a [`SchemaContext`], the chain of ancestors a
//! candidate node would be inserted under.

mod context;

pub use context::{ContextItem, SchemaContext};

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Generic item that block elements inherit their allowed parents from.
pub const BLOCK: &str = "$block";

/// Schema item for text nodes.
pub const TEXT: &str = "$text";

/// Guard against `allow_where` cycles.
const MAX_INHERIT_DEPTH: usize = 8;

/// Definition of one schema item.
#[derive(Debug, Clone, Default)]
pub struct SchemaItem {
    allow_in: Vec<String>,
    allow_where: Option<String>,
    allow_attributes: Vec<String>,
    required_attributes: Vec<String>,
    is_limit: bool,
    is_object: bool,
    is_block: bool,
}

impl SchemaItem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow this item directly inside `parent`.
    pub fn allow_in(mut self, parent: &str) -> Self {
        self.allow_in.push(parent.to_string());
        self
    }

    /// Allow this item wherever `other` is allowed.
    pub fn allow_where(mut self, other: &str) -> Self {
        self.allow_where = Some(other.to_string());
        self
    }

    /// Accept these attributes on the item.
    pub fn allow_attributes<'a>(mut self, keys: impl IntoIterator<Item = &'a str>) -> Self {
        self.allow_attributes
            .extend(keys.into_iter().map(str::to_string));
        self
    }

    /// Require these attributes (they are allowed implicitly).
    pub fn require_attributes<'a>(mut self, keys: impl IntoIterator<Item = &'a str>) -> Self {
        for key in keys {
            self.required_attributes.push(key.to_string());
            if !self.allow_attributes.iter().any(|k| k == key) {
                self.allow_attributes.push(key.to_string());
            }
        }
        self
    }

    /// Mark as a limit: hoisting never crosses it.
    pub fn limit(mut self) -> Self {
        self.is_limit = true;
        self
    }

    /// Mark as an object: atomic for editing purposes.
    pub fn object(mut self) -> Self {
        self.is_object = true;
        self
    }

    /// Mark as a block.
    pub fn block(mut self) -> Self {
        self.is_block = true;
        self
    }
}

/// A candidate node: its name and the attributes it would carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub name: String,
    pub attributes: Vec<String>,
}

impl NodeDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str) -> Self {
        self.attributes.push(key.to_string());
        self
    }
}

/// The schema registry.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    items: HashMap<String, SchemaItem>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a schema with the generic items every document needs:
    /// `$root` (a limit), `$block` (allowed in `$root`) and `$text`.
    pub fn with_generic_items() -> Self {
        let mut items = HashMap::new();
        items.insert(
            crate::model::ROOT_NAME.to_string(),
            SchemaItem::new().limit(),
        );
        items.insert(
            BLOCK.to_string(),
            SchemaItem::new().allow_in(crate::model::ROOT_NAME),
        );
        items.insert(TEXT.to_string(), SchemaItem::new());
        Self { items }
    }

    /// Add an item, replacing any item of the same name.
    pub fn with_item(mut self, name: &str, item: SchemaItem) -> Self {
        self.items.insert(name.to_string(), item);
        self
    }

    /// Register a new item.
    pub fn register(&mut self, name: &str, item: SchemaItem) -> Result<()> {
        if self.items.contains_key(name) {
            return Err(Error::DuplicateSchemaItem(name.to_string()));
        }
        self.items.insert(name.to_string(), item);
        Ok(())
    }

    /// Allow an already registered item inside another parent.
    pub fn allow_in(&mut self, name: &str, parent: &str) -> Result<()> {
        let item = self
            .items
            .get_mut(name)
            .ok_or_else(|| Error::UnknownSchemaItem(name.to_string()))?;
        if !item.allow_in.iter().any(|p| p == parent) {
            item.allow_in.push(parent.to_string());
        }
        Ok(())
    }

    /// Check if an item is registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Check if an item is a limit.
    pub fn is_limit(&self, name: &str) -> bool {
        self.items.get(name).is_some_and(|i| i.is_limit)
    }

    /// Check if an item is an object.
    pub fn is_object(&self, name: &str) -> bool {
        self.items.get(name).is_some_and(|i| i.is_object)
    }

    /// Check if an item is a block.
    pub fn is_block(&self, name: &str) -> bool {
        self.items.get(name).is_some_and(|i| i.is_block)
    }

    /// Check whether an attribute is allowed on an item.
    pub fn allows_attribute(&self, name: &str, key: &str) -> bool {
        self.items
            .get(name)
            .is_some_and(|i| i.allow_attributes.iter().any(|k| k == key))
    }

    /// Check whether an attribute must be present (and non-empty) on an item.
    pub fn is_required_attribute(&self, name: &str, key: &str) -> bool {
        self.items
            .get(name)
            .is_some_and(|i| i.required_attributes.iter().any(|k| k == key))
    }

    /// Check whether `descriptor` would be valid as the innermost child of
    /// `context`.
    ///
    /// An empty context has no insertion point and is never valid.
    pub fn valid_at(&self, descriptor: &NodeDescriptor, context: &SchemaContext) -> bool {
        let Some(item) = self.items.get(&descriptor.name) else {
            return false;
        };
        let Some(parent) = context.last() else {
            return false;
        };

        if !self.allowed_in(item, parent.name(), 0) {
            return false;
        }

        let attributes_allowed = descriptor
            .attributes
            .iter()
            .all(|key| item.allow_attributes.contains(key));
        let required_present = item
            .required_attributes
            .iter()
            .all(|key| descriptor.attributes.contains(key));

        attributes_allowed && required_present
    }

    fn allowed_in(&self, item: &SchemaItem, parent: &str, depth: usize) -> bool {
        if item.allow_in.iter().any(|p| p == parent) {
            return true;
        }
        if depth >= MAX_INHERIT_DEPTH {
            return false;
        }
        item.allow_where
            .as_deref()
            .and_then(|other| self.items.get(other))
            .is_some_and(|other| self.allowed_in(other, parent, depth + 1))
    }
}
