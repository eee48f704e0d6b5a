//! General-purpose upcast converters: element renaming, text and the
//! transparent fallback for unknown elements.

use tracing::trace;

use super::{ConsumeSpec, ModelOutput, UpcastApi, UpcastConverter};
use crate::model::TEXT_NAME;
use crate::schema::{ContextItem, NodeDescriptor, SchemaContext};
use crate::util::collapse_whitespace;
use crate::view::ViewNodeId;

#[derive(Debug, Clone)]
struct AttributeMapping {
    view: String,
    model: String,
    required: bool,
}

/// Converts a view element into a model element of another name.
///
/// The element matches when it has the configured view name, carries every
/// configured class and has a non-empty value for every required attribute.
/// Optional attributes are copied when present. The model element is only
/// created when the schema allows it in the current context.
#[derive(Debug, Clone)]
pub struct ElementToElement {
    view_name: String,
    model_name: String,
    classes: Vec<String>,
    attributes: Vec<AttributeMapping>,
}

impl ElementToElement {
    pub fn new(view_name: &str, model_name: &str) -> Self {
        Self {
            view_name: view_name.to_string(),
            model_name: model_name.to_string(),
            classes: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Map a view attribute that must be present and non-empty.
    pub fn required_attribute(mut self, view_key: &str, model_key: &str) -> Self {
        self.attributes.push(AttributeMapping {
            view: view_key.to_string(),
            model: model_key.to_string(),
            required: true,
        });
        self
    }

    /// Map a view attribute that is copied when present.
    pub fn optional_attribute(mut self, view_key: &str, model_key: &str) -> Self {
        self.attributes.push(AttributeMapping {
            view: view_key.to_string(),
            model: model_key.to_string(),
            required: false,
        });
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl UpcastConverter for ElementToElement {
    fn convert(
        &self,
        view: ViewNodeId,
        context: &SchemaContext,
        api: &mut UpcastApi<'_>,
    ) -> Option<ModelOutput> {
        if !api.view.is_element_named(view, &self.view_name) {
            return None;
        }

        let mut spec = ConsumeSpec::name();
        for class in &self.classes {
            spec = spec.class(class);
        }
        let mut attrs = Vec::new();
        let mut descriptor = NodeDescriptor::new(&self.model_name);
        for mapping in &self.attributes {
            match api.view.get_attr(view, &mapping.view) {
                Some(value) if !(mapping.required && value.is_empty()) => {
                    spec = spec.attribute(&mapping.view);
                    descriptor = descriptor.with_attribute(&mapping.model);
                    attrs.push((mapping.model.clone(), value.to_string()));
                }
                _ if mapping.required => return None,
                _ => {}
            }
        }

        if !api.can_consume(view, &spec) {
            return None;
        }
        if !api.schema.valid_at(&descriptor, context) {
            trace!(
                name = %self.model_name,
                context = ?context,
                "schema rejects element here"
            );
            return None;
        }

        api.consume(view, &spec);
        let element = api.model.create_element(&self.model_name, attrs);
        let inner = context.push(ContextItem::Node {
            id: element,
            name: self.model_name.clone(),
        });
        let children = api.convert_children(view, &inner);
        api.model.insert(element, 0, children.as_slice());

        Some(ModelOutput::Node(element))
    }
}

/// Converts view text into model text where the schema allows text.
///
/// Runs of whitespace collapse to a single space. Text that ends up empty
/// produces nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextConverter;

impl UpcastConverter for TextConverter {
    fn convert(
        &self,
        view: ViewNodeId,
        context: &SchemaContext,
        api: &mut UpcastApi<'_>,
    ) -> Option<ModelOutput> {
        let text = api.view.text_content(view)?;
        if text.is_empty() || !api.can_consume(view, &ConsumeSpec::name()) {
            return None;
        }
        if !api.schema.valid_at(&NodeDescriptor::new(TEXT_NAME), context) {
            return None;
        }

        let collapsed = collapse_whitespace(text).into_owned();
        api.consume(view, &ConsumeSpec::name());
        Some(ModelOutput::Node(api.model.create_text(collapsed)))
    }
}

/// Fallback for elements no other converter accepts.
///
/// The element itself is dropped and its children are converted in the
/// same context, as if the element were not there.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransparentElement;

impl UpcastConverter for TransparentElement {
    fn convert(
        &self,
        view: ViewNodeId,
        context: &SchemaContext,
        api: &mut UpcastApi<'_>,
    ) -> Option<ModelOutput> {
        if !api.consume(view, &ConsumeSpec::name()) {
            return None;
        }
        Some(ModelOutput::Fragment(api.convert_children(view, context)))
    }
}
