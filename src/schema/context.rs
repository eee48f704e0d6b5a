//! Persistent ancestor chains for schema checks.

use std::fmt;
use std::rc::Rc;

use crate::model::{NodeId, ROOT_NAME};

/// One entry of a context chain: a bare item name or a model node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextItem {
    Name(String),
    Node { id: NodeId, name: String },
}

impl ContextItem {
    pub fn name(&self) -> &str {
        match self {
            ContextItem::Name(name) => name,
            ContextItem::Node { name, .. } => name,
        }
    }

    /// The model node this entry refers to, if any.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            ContextItem::Name(_) => None,
            ContextItem::Node { id, .. } => Some(*id),
        }
    }
}

impl From<&str> for ContextItem {
    fn from(name: &str) -> Self {
        ContextItem::Name(name.to_string())
    }
}

struct Link {
    item: ContextItem,
    parent: Option<Rc<Link>>,
}

/// Ordered ancestor chain, innermost last.
///
/// The chain is immutable and structurally shared: `push` and `pop` return
/// new chains and leave the receiver untouched, so a converter can hand its
/// context to nested conversions without copying or fear of mutation.
#[derive(Clone, Default)]
pub struct SchemaContext {
    head: Option<Rc<Link>>,
    len: usize,
}

impl SchemaContext {
    /// An empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// The chain containing only `$root`.
    pub fn root() -> Self {
        Self::new().push(ContextItem::Name(ROOT_NAME.to_string()))
    }

    /// Build a chain from names, outermost first.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        names
            .into_iter()
            .fold(Self::new(), |ctx, name| ctx.push(ContextItem::from(name)))
    }

    /// Return a new chain with `item` as the innermost entry.
    pub fn push(&self, item: ContextItem) -> Self {
        Self {
            head: Some(Rc::new(Link {
                item,
                parent: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// Split off the innermost entry, returning it and the remaining chain.
    pub fn pop(&self) -> Option<(ContextItem, SchemaContext)> {
        let head = self.head.as_ref()?;
        let rest = Self {
            head: head.parent.clone(),
            len: self.len - 1,
        };
        Some((head.item.clone(), rest))
    }

    /// The innermost entry.
    pub fn last(&self) -> Option<&ContextItem> {
        self.head.as_deref().map(|link| &link.item)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate innermost first.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            current: self.head.as_deref(),
        }
    }

    /// Entry names, outermost first.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.iter().map(ContextItem::name).collect();
        names.reverse();
        names
    }
}

impl fmt::Debug for SchemaContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Iterator over a context chain, innermost first.
pub struct Iter<'a> {
    current: Option<&'a Link>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a ContextItem;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.current?;
        self.current = link.parent.as_deref();
        Some(&link.item)
    }
}
