//! View → model conversion.
//!
//! The dispatcher walks a view subtree. For every node it offers the node to
//! the registered converters in priority order; the first converter that
//! returns an output wins and the rest are skipped. Element outputs are then
//! passed through every post-processor, also in priority order.
//!
//! Converters receive an [`UpcastApi`] which gives them the view, the
//! schema, the model under construction and the pass-scoped state
//! (consumables and hoist markers). Nested conversion goes back through the
//! same API, so a converter can convert children in whatever context it
//! chooses.

use tracing::trace;

use super::{ConsumeSpec, HoistMarkers, ModelOutput, Priority, ViewConsumables};
use crate::model::{Model, ModelFragment};
use crate::schema::{Schema, SchemaContext};
use crate::view::{ViewDom, ViewNodeData, ViewNodeId};

/// Converts one view node into model nodes, or declines with `None`.
///
/// A converter must check everything it needs before consuming anything,
/// so a declined node is left untouched for the next converter.
pub trait UpcastConverter {
    fn convert(
        &self,
        view: ViewNodeId,
        context: &SchemaContext,
        api: &mut UpcastApi<'_>,
    ) -> Option<ModelOutput>;
}

/// Rewrites the output of an element conversion.
pub trait UpcastPostProcessor {
    fn process(
        &self,
        view: ViewNodeId,
        context: &SchemaContext,
        output: ModelOutput,
        api: &mut UpcastApi<'_>,
    ) -> ModelOutput;
}

struct Registered<T: ?Sized> {
    priority: Priority,
    handler: Box<T>,
}

/// Insert keeping the list sorted by priority, after existing entries of the
/// same priority.
fn insert_sorted<T: ?Sized>(list: &mut Vec<Registered<T>>, priority: Priority, handler: Box<T>) {
    let index = list
        .iter()
        .position(|r| r.priority > priority)
        .unwrap_or(list.len());
    list.insert(index, Registered { priority, handler });
}

/// Registry of view → model converters.
#[derive(Default)]
pub struct UpcastDispatcher {
    element: Vec<Registered<dyn UpcastConverter>>,
    text: Vec<Registered<dyn UpcastConverter>>,
    post_element: Vec<Registered<dyn UpcastPostProcessor>>,
}

impl UpcastDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter for element nodes.
    pub fn on_element(
        &mut self,
        priority: Priority,
        converter: impl UpcastConverter + 'static,
    ) -> &mut Self {
        insert_sorted(&mut self.element, priority, Box::new(converter));
        self
    }

    /// Register a converter for text nodes.
    pub fn on_text(
        &mut self,
        priority: Priority,
        converter: impl UpcastConverter + 'static,
    ) -> &mut Self {
        insert_sorted(&mut self.text, priority, Box::new(converter));
        self
    }

    /// Register a post-processor that runs after every element conversion.
    pub fn after_element(
        &mut self,
        priority: Priority,
        processor: impl UpcastPostProcessor + 'static,
    ) -> &mut Self {
        insert_sorted(&mut self.post_element, priority, Box::new(processor));
        self
    }

    /// Convert the children of `from` into detached model nodes.
    ///
    /// Consumables and hoist markers are created for this call and dropped
    /// when it returns.
    pub fn convert(
        &self,
        view: &ViewDom,
        from: ViewNodeId,
        schema: &Schema,
        model: &mut Model,
        context: &SchemaContext,
    ) -> ModelFragment {
        let mut api = UpcastApi {
            dispatcher: self,
            view,
            schema,
            model,
            consumable: ViewConsumables::new(),
            hoisted: HoistMarkers::new(),
        };
        let fragment = api.convert_children(from, context);
        if !api.hoisted.is_empty() {
            trace!(
                remaining = api.hoisted.len(),
                "hoist markers left at end of pass"
            );
        }
        fragment
    }
}

/// State and callbacks available to converters during one upcast pass.
pub struct UpcastApi<'a> {
    dispatcher: &'a UpcastDispatcher,
    pub view: &'a ViewDom,
    pub schema: &'a Schema,
    pub model: &'a mut Model,
    pub consumable: ViewConsumables,
    pub hoisted: HoistMarkers,
}

impl UpcastApi<'_> {
    /// Convert a single view node in `context`.
    pub fn convert_item(
        &mut self,
        view: ViewNodeId,
        context: &SchemaContext,
    ) -> Option<ModelOutput> {
        let dispatcher = self.dispatcher;
        let dom = self.view;

        match &dom.get(view)?.data {
            ViewNodeData::Element { .. } => {
                let output = dispatcher
                    .element
                    .iter()
                    .find_map(|r| r.handler.convert(view, context, self));
                let Some(mut output) = output else {
                    trace!(node = ?view, "no element converter accepted node");
                    return None;
                };
                for r in &dispatcher.post_element {
                    output = r.handler.process(view, context, output, self);
                }
                Some(output)
            }
            ViewNodeData::Text(_) => dispatcher
                .text
                .iter()
                .find_map(|r| r.handler.convert(view, context, self)),
            _ => None,
        }
    }

    /// Convert every child of `parent` in `context`, flattening the outputs.
    pub fn convert_children(
        &mut self,
        parent: ViewNodeId,
        context: &SchemaContext,
    ) -> ModelFragment {
        let children: Vec<ViewNodeId> = self.view.children(parent).collect();
        let mut fragment = ModelFragment::new();
        for child in children {
            if let Some(output) = self.convert_item(child, context) {
                fragment.extend(output.into_nodes());
            }
        }
        fragment
    }

    /// Test-and-consume shortcut for converters.
    pub fn consume(&mut self, view: ViewNodeId, spec: &ConsumeSpec) -> bool {
        self.consumable.consume(self.view, view, spec)
    }

    /// Test shortcut for converters.
    pub fn can_consume(&self, view: ViewNodeId, spec: &ConsumeSpec) -> bool {
        self.consumable.test(self.view, view, spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ContextItem;
    use crate::view::{content_root, parse_html};

    /// Converts every element into a `tag` model element named after it.
    struct Tagged(&'static str);

    impl UpcastConverter for Tagged {
        fn convert(
            &self,
            view: ViewNodeId,
            _context: &SchemaContext,
            api: &mut UpcastApi<'_>,
        ) -> Option<ModelOutput> {
            if !api.consume(view, &ConsumeSpec::name()) {
                return None;
            }
            let name = api.view.element_name(view)?.to_string();
            Some(ModelOutput::Node(
                api.model.create_element(self.0, [("tag", name)]),
            ))
        }
    }

    struct Declines;

    impl UpcastConverter for Declines {
        fn convert(
            &self,
            _view: ViewNodeId,
            _context: &SchemaContext,
            _api: &mut UpcastApi<'_>,
        ) -> Option<ModelOutput> {
            None
        }
    }

    struct Wrap;

    impl UpcastPostProcessor for Wrap {
        fn process(
            &self,
            _view: ViewNodeId,
            context: &SchemaContext,
            output: ModelOutput,
            api: &mut UpcastApi<'_>,
        ) -> ModelOutput {
            let wrapper = api
                .model
                .create_element("wrap", [("depth", context.len().to_string())]);
            api.model.insert(wrapper, 0, &output.into_nodes());
            ModelOutput::Node(wrapper)
        }
    }

    fn convert(dispatcher: &UpcastDispatcher, html: &str) -> (Model, ModelFragment) {
        let dom = parse_html(html);
        let schema = Schema::with_generic_items();
        let mut model = Model::new();
        let fragment = dispatcher.convert(
            &dom,
            content_root(&dom),
            &schema,
            &mut model,
            &SchemaContext::root(),
        );
        (model, fragment)
    }

    #[test]
    fn test_priority_order_first_match_wins() {
        let mut dispatcher = UpcastDispatcher::new();
        dispatcher
            .on_element(Priority::Low, Tagged("low"))
            .on_element(Priority::High, Tagged("high"))
            .on_element(Priority::Highest, Declines);

        let (model, fragment) = convert(&dispatcher, "<p></p>");

        assert_eq!(model.stringify_all(fragment.as_slice()), r#"<high tag="p"></high>"#);
    }

    #[test]
    fn test_equal_priority_keeps_registration_order() {
        let mut dispatcher = UpcastDispatcher::new();
        dispatcher
            .on_element(Priority::Normal, Tagged("first"))
            .on_element(Priority::Normal, Tagged("second"));

        let (model, fragment) = convert(&dispatcher, "<div></div>");

        assert_eq!(
            model.stringify_all(fragment.as_slice()),
            r#"<first tag="div"></first>"#
        );
    }

    #[test]
    fn test_post_processor_sees_element_output() {
        let mut dispatcher = UpcastDispatcher::new();
        dispatcher
            .on_element(Priority::Normal, Tagged("el"))
            .after_element(Priority::Low, Wrap);

        let (model, fragment) = convert(&dispatcher, "<p></p><p></p>");

        assert_eq!(fragment.len(), 2);
        assert_eq!(
            model.stringify_all(fragment.as_slice()),
            r#"<wrap depth="1"><el tag="p"></el></wrap><wrap depth="1"><el tag="p"></el></wrap>"#
        );
    }

    #[test]
    fn test_declined_nodes_produce_nothing() {
        let mut dispatcher = UpcastDispatcher::new();
        dispatcher.on_element(Priority::Normal, Declines);

        let (_, fragment) = convert(&dispatcher, "<p>text</p>");

        assert!(fragment.is_empty());
    }

    #[test]
    fn test_nested_conversion_uses_given_context() {
        struct Nest;

        impl UpcastConverter for Nest {
            fn convert(
                &self,
                view: ViewNodeId,
                context: &SchemaContext,
                api: &mut UpcastApi<'_>,
            ) -> Option<ModelOutput> {
                if !api.consume(view, &ConsumeSpec::name()) {
                    return None;
                }
                let element = api
                    .model
                    .create_element("box", [("depth", context.len().to_string())]);
                let inner = context.push(ContextItem::Node {
                    id: element,
                    name: "box".to_string(),
                });
                let children = api.convert_children(view, &inner);
                api.model.insert(element, 0, children.as_slice());
                Some(ModelOutput::Node(element))
            }
        }

        let mut dispatcher = UpcastDispatcher::new();
        dispatcher.on_element(Priority::Normal, Nest);

        let (model, fragment) = convert(&dispatcher, "<div><div></div></div>");

        assert_eq!(
            model.stringify_all(fragment.as_slice()),
            r#"<box depth="1"><box depth="2"></box></box>"#
        );
    }
}
