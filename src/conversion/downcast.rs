//! Model → view conversion.
//!
//! Two kinds of converters are registered here. Insert converters render a
//! model element as a view structure; attribute converters keep an already
//! rendered structure in sync when a model attribute changes.

use tracing::{debug, trace};

use super::{ChangeKind, Mapper, ModelConsumables, Priority};
use crate::model::{Model, NodeData, NodeId};
use crate::view::{ViewDom, ViewNodeId};

/// The view structure created for a model element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSlot {
    /// Outermost view element; bound to the model element in the mapper.
    pub element: ViewNodeId,
    /// View element the model element's children are rendered into.
    pub children: ViewNodeId,
}

impl ViewSlot {
    /// A slot whose children go directly into its element.
    pub fn single(element: ViewNodeId) -> Self {
        Self {
            element,
            children: element,
        }
    }
}

/// Renders one model element, or declines with `None`.
pub trait InsertConverter {
    fn convert(&self, node: NodeId, model: &Model, view: &mut ViewDom) -> Option<ViewSlot>;
}

/// A model attribute change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeEvent {
    pub item: NodeId,
    pub key: String,
    pub kind: ChangeKind,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl AttributeEvent {
    /// Build an event from the old and new values. Returns `None` when the
    /// value did not change.
    pub fn new(
        item: NodeId,
        key: &str,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Option<Self> {
        let kind = ChangeKind::between(old_value.as_deref(), new_value.as_deref())?;
        Some(Self {
            item,
            key: key.to_string(),
            kind,
            old_value,
            new_value,
        })
    }
}

/// Reacts to a model attribute change.
///
/// Every registered converter sees every event. A converter that handles an
/// event must consume it first, and must do nothing if consuming fails.
pub trait AttributeConverter {
    fn convert(&self, event: &AttributeEvent, model: &Model, api: &mut DowncastApi<'_>);
}

/// State available to attribute converters during one downcast pass.
pub struct DowncastApi<'a> {
    pub view: &'a mut ViewDom,
    pub mapper: &'a Mapper,
    pub consumable: ModelConsumables,
}

struct Registered<T: ?Sized> {
    priority: Priority,
    handler: Box<T>,
}

/// Registry of model → view converters.
#[derive(Default)]
pub struct DowncastDispatcher {
    insert: Vec<Registered<dyn InsertConverter>>,
    attribute: Vec<Registered<dyn AttributeConverter>>,
}

impl DowncastDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_insert(
        &mut self,
        priority: Priority,
        converter: impl InsertConverter + 'static,
    ) -> &mut Self {
        let index = self
            .insert
            .iter()
            .position(|r| r.priority > priority)
            .unwrap_or(self.insert.len());
        self.insert.insert(
            index,
            Registered {
                priority,
                handler: Box::new(converter),
            },
        );
        self
    }

    pub fn on_attribute(
        &mut self,
        priority: Priority,
        converter: impl AttributeConverter + 'static,
    ) -> &mut Self {
        let index = self
            .attribute
            .iter()
            .position(|r| r.priority > priority)
            .unwrap_or(self.attribute.len());
        self.attribute.insert(
            index,
            Registered {
                priority,
                handler: Box::new(converter),
            },
        );
        self
    }

    /// Render a model node (and its subtree) at the end of `view_parent`.
    ///
    /// Elements no insert converter accepts are rendered transparently:
    /// their children go straight into `view_parent`.
    pub fn convert_insert(
        &self,
        model: &Model,
        node: NodeId,
        view: &mut ViewDom,
        mapper: &mut Mapper,
        view_parent: ViewNodeId,
    ) {
        let Some(model_node) = model.node(node) else {
            return;
        };

        match &model_node.data {
            NodeData::Text(text) => view.append_text(view_parent, text),
            NodeData::Element { name, .. } => {
                let slot = self
                    .insert
                    .iter()
                    .find_map(|r| r.handler.convert(node, model, view));
                let children_parent = match slot {
                    Some(slot) => {
                        view.append(view_parent, slot.element);
                        mapper.bind(node, slot.element);
                        slot.children
                    }
                    None => {
                        trace!(node = %node, name = %name, "no insert converter, rendering children only");
                        view_parent
                    }
                };
                for &child in &model_node.children {
                    self.convert_insert(model, child, view, mapper, children_parent);
                }
            }
        }
    }

    /// Dispatch a batch of attribute changes.
    ///
    /// Each change becomes one consumable for the duration of the batch, so
    /// at most one converter applies it.
    pub fn convert_attributes(
        &self,
        model: &Model,
        events: &[AttributeEvent],
        view: &mut ViewDom,
        mapper: &Mapper,
    ) {
        let mut consumable = ModelConsumables::new();
        for event in events {
            consumable.add(event.item, event.kind, &event.key);
        }
        let mut api = DowncastApi {
            view,
            mapper,
            consumable,
        };

        for event in events {
            for r in &self.attribute {
                r.handler.convert(event, model, &mut api);
            }
            if api.consumable.test(event.item, event.kind, &event.key) {
                debug!(
                    node = %event.item,
                    key = %event.key,
                    "attribute change not handled by any converter"
                );
            }
        }
    }
}

/// Renders a model element as a single view element of another name.
pub struct ElementToView {
    model_name: String,
    view_name: String,
}

impl ElementToView {
    pub fn new(model_name: &str, view_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            view_name: view_name.to_string(),
        }
    }
}

impl InsertConverter for ElementToView {
    fn convert(&self, node: NodeId, model: &Model, view: &mut ViewDom) -> Option<ViewSlot> {
        if !model.is_element_named(node, &self.model_name) {
            return None;
        }
        Some(ViewSlot::single(
            view.create_html_element(&self.view_name, Vec::new()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::to_html;

    fn no_attrs() -> [(&'static str, &'static str); 0] {
        []
    }

    fn render(dispatcher: &DowncastDispatcher, model: &Model) -> (ViewDom, Mapper) {
        let mut view = ViewDom::new();
        let mut mapper = Mapper::new();
        let root = view.document();
        for &child in model.children(model.root()) {
            dispatcher.convert_insert(model, child, &mut view, &mut mapper, root);
        }
        (view, mapper)
    }

    /// Mirrors the `title` attribute of any element onto its view element.
    struct TitleSync;

    impl AttributeConverter for TitleSync {
        fn convert(&self, event: &AttributeEvent, _model: &Model, api: &mut DowncastApi<'_>) {
            if event.key != "title" || !api.consumable.consume(event.item, event.kind, &event.key)
            {
                return;
            }
            let Some(element) = api.mapper.to_view_element(event.item) else {
                return;
            };
            match &event.new_value {
                Some(value) => api.view.set_attr(element, "title", value),
                None => api.view.remove_attr(element, "title"),
            };
        }
    }

    #[test]
    fn test_attribute_event_kind() {
        let event = AttributeEvent::new(NodeId(1), "alt", None, Some("a".into())).unwrap();
        assert_eq!(event.kind, ChangeKind::Add);

        assert!(AttributeEvent::new(NodeId(1), "alt", Some("a".into()), Some("a".into())).is_none());
    }

    #[test]
    fn test_insert_renders_and_binds() {
        let mut model = Model::new();
        let root = model.root();
        let p = model.create_element("paragraph", no_attrs());
        let t = model.create_text("Hi & bye");
        model.append(root, p);
        model.append(p, t);

        let mut dispatcher = DowncastDispatcher::new();
        dispatcher.on_insert(Priority::Normal, ElementToView::new("paragraph", "p"));

        let (view, mapper) = render(&dispatcher, &model);

        assert_eq!(to_html(&view, view.document()), "<p>Hi &amp; bye</p>");
        let bound = mapper.to_view_element(p).unwrap();
        assert!(view.is_element_named(bound, "p"));
    }

    #[test]
    fn test_unconverted_element_renders_children_only() {
        let mut model = Model::new();
        let root = model.root();
        let unknown = model.create_element("widget", no_attrs());
        let t = model.create_text("inner");
        model.append(root, unknown);
        model.append(unknown, t);

        let dispatcher = DowncastDispatcher::new();
        let (view, mapper) = render(&dispatcher, &model);

        assert_eq!(to_html(&view, view.document()), "inner");
        assert!(mapper.is_empty());
    }

    #[test]
    fn test_attribute_change_is_applied_once() {
        let mut model = Model::new();
        let root = model.root();
        let p = model.create_element("paragraph", no_attrs());
        model.append(root, p);

        let mut dispatcher = DowncastDispatcher::new();
        dispatcher
            .on_insert(Priority::Normal, ElementToView::new("paragraph", "p"))
            .on_attribute(Priority::Normal, TitleSync)
            .on_attribute(Priority::Low, TitleSync);

        let (mut view, mapper) = render(&dispatcher, &model);
        let event = AttributeEvent::new(p, "title", None, Some("x".into())).unwrap();
        dispatcher.convert_attributes(&model, &[event], &mut view, &mapper);

        assert_eq!(to_html(&view, view.document()), r#"<p title="x"></p>"#);

        let event = AttributeEvent::new(p, "title", Some("x".into()), None).unwrap();
        dispatcher.convert_attributes(&model, &[event], &mut view, &mapper);

        assert_eq!(to_html(&view, view.document()), "<p></p>");
    }
}
