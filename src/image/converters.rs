//! Image converters.
//!
//! Upcast:
//! - [`view_figure_to_model`] folds `<figure class="image"><img …>…</figure>`
//!   into one `image` element whose children come from the rest of the
//!   figure.
//! - [`view_image_to_model`] converts a bare `<img src>` where an image is
//!   allowed.
//! - [`convert_hoistable_image`] converts a bare `<img src>` where an image
//!   is not allowed, at the nearest ancestor context that accepts it, and
//!   marks the result as hoisted.
//! - [`hoist_image_through_element`] splits every element that ends up
//!   holding a hoisted image, so the image becomes a sibling of the pieces.
//!
//! Downcast:
//! - [`model_to_view_image`] renders an `image` as `<figure><img></figure>`.
//! - [`model_to_view_attribute_converter`] mirrors one attribute change onto
//!   the rendered `<img>`.

use tracing::{debug, trace};

use super::{IMAGE, ImageConfig, SRC};
use crate::conversion::{
    AttributeConverter, AttributeEvent, ChangeKind, ConsumeSpec, DowncastApi, ElementToElement,
    InsertConverter, ModelOutput, UpcastApi, UpcastConverter, UpcastPostProcessor, ViewSlot,
};
use crate::model::{Model, ModelFragment, NodeId};
use crate::schema::{ContextItem, NodeDescriptor, Schema, SchemaContext};
use crate::view::{Attribute, ViewDom, ViewNodeId};

fn image_descriptor() -> NodeDescriptor {
    NodeDescriptor::new(IMAGE).with_attribute(SRC)
}

/// Whether a view element is a media tag carrying a non-empty source.
fn has_source(view: &ViewDom, node: ViewNodeId, config: &ImageConfig) -> bool {
    view.is_element_named(node, &config.media)
        && view
            .get_attr(node, &config.source_attribute)
            .is_some_and(|src| !src.is_empty())
}

// ============================================================================
// Model to View
// ============================================================================

/// Mirrors changes of one `image` attribute onto the rendered media tag.
#[derive(Debug, Clone)]
pub struct ModelToViewAttribute {
    key: String,
    view_key: String,
}

impl ModelToViewAttribute {
    /// Write the attribute under another name in the view.
    pub fn with_view_key(mut self, view_key: &str) -> Self {
        self.view_key = view_key.to_string();
        self
    }
}

/// Create the attribute sync converter for model attribute `key`.
pub fn model_to_view_attribute_converter(key: &str) -> ModelToViewAttribute {
    ModelToViewAttribute {
        key: key.to_string(),
        view_key: key.to_string(),
    }
}

impl AttributeConverter for ModelToViewAttribute {
    fn convert(&self, event: &AttributeEvent, model: &Model, api: &mut DowncastApi<'_>) {
        if event.key != self.key || !model.is_element_named(event.item, IMAGE) {
            return;
        }
        if !api.consumable.consume(event.item, event.kind, &event.key) {
            trace!(node = %event.item, key = %event.key, "attribute change already consumed");
            return;
        }

        let Some(figure) = api.mapper.to_view_element(event.item) else {
            return;
        };
        let Some(media) = api.view.first_child(figure) else {
            return;
        };

        match (event.kind, event.new_value.as_deref()) {
            (ChangeKind::Remove, _) => {
                api.view.remove_attr(media, &self.view_key);
            }
            (_, Some(value)) => {
                api.view.set_attr(media, &self.view_key, value);
            }
            (_, None) => {}
        }
    }
}

/// Renders an `image` element as the figure/media pair.
#[derive(Debug, Clone)]
pub struct ImageToView {
    config: ImageConfig,
}

/// Create the insert converter for `image` elements.
pub fn model_to_view_image(config: ImageConfig) -> ImageToView {
    ImageToView { config }
}

/// Build `<figure class="image"><img src alt></figure>` for an image
/// element. Returns the figure.
pub fn create_image_view_element(
    view: &mut ViewDom,
    config: &ImageConfig,
    src: &str,
    optional: &[(&str, &str)],
) -> ViewNodeId {
    let mut attrs = vec![Attribute::new(&config.source_attribute, src)];
    attrs.extend(
        optional
            .iter()
            .map(|(key, value)| Attribute::new(key, *value)),
    );
    let media = view.create_html_element(&config.media, attrs);
    let figure = view.create_html_element(
        &config.container,
        vec![Attribute::new("class", config.marker_class.as_str())],
    );
    view.append(figure, media);
    figure
}

impl InsertConverter for ImageToView {
    fn convert(&self, node: NodeId, model: &Model, view: &mut ViewDom) -> Option<ViewSlot> {
        if !model.is_element_named(node, IMAGE) {
            return None;
        }
        let src = model.attr(node, SRC).unwrap_or_default();
        let optional: Vec<(&str, &str)> = self
            .config
            .optional_attributes
            .iter()
            .filter_map(|key| model.attr(node, key).map(|value| (key.as_str(), value)))
            .collect();
        Some(ViewSlot::single(create_image_view_element(
            view,
            &self.config,
            src,
            &optional,
        )))
    }
}

// ============================================================================
// View to Model
// ============================================================================

/// Create the element converter for a bare media tag.
pub fn view_image_to_model(config: &ImageConfig) -> ElementToElement {
    config.optional_attributes.iter().fold(
        ElementToElement::new(&config.media, IMAGE)
            .required_attribute(&config.source_attribute, SRC),
        |converter, key| converter.optional_attribute(key, key),
    )
}

/// Folds a figure container into one `image` element.
#[derive(Debug, Clone)]
pub struct ViewFigureToModel {
    config: ImageConfig,
}

/// Create the figure-to-image converter.
pub fn view_figure_to_model(config: ImageConfig) -> ViewFigureToModel {
    ViewFigureToModel { config }
}

impl UpcastConverter for ViewFigureToModel {
    fn convert(
        &self,
        view: ViewNodeId,
        context: &SchemaContext,
        api: &mut UpcastApi<'_>,
    ) -> Option<ModelOutput> {
        let config = &self.config;
        let figure_spec = ConsumeSpec::name().class(&config.marker_class);
        if !api.view.is_element_named(view, &config.container)
            || !api.can_consume(view, &figure_spec)
        {
            return None;
        }

        if !api.schema.valid_at(&image_descriptor(), context) {
            trace!(context = ?context, "image not allowed here, declining figure");
            return None;
        }

        let media = api
            .view
            .children(view)
            .find(|&child| api.view.is_element_named(child, &config.media))?;
        let media_spec = ConsumeSpec::name().attribute(&config.source_attribute);
        if !has_source(api.view, media, config) || !api.can_consume(media, &media_spec) {
            trace!("figure has no convertible media child");
            return None;
        }

        let image = api
            .convert_item(media, context)?
            .as_node()
            .filter(|&node| api.model.is_element_named(node, IMAGE))?;
        api.consume(view, &figure_spec);

        let inner = context.push(ContextItem::Node {
            id: image,
            name: IMAGE.to_string(),
        });
        let children = api.convert_children(view, &inner);
        api.model.insert(image, 0, children.as_slice());

        Some(ModelOutput::Node(image))
    }
}

/// Converts a media tag the schema rejects where it stands.
#[derive(Debug, Clone)]
pub struct HoistableImage {
    config: ImageConfig,
}

/// Create the hoist-detection converter. Register it below the normal
/// image converter so it only sees tags that converter declined.
pub fn convert_hoistable_image(config: ImageConfig) -> HoistableImage {
    HoistableImage { config }
}

/// Find the nearest ancestor context where `descriptor` is valid.
///
/// Entries are popped innermost first. Returns `None` when the search would
/// pop a schema limit or runs out of entries.
pub fn find_allowed_context(
    schema: &Schema,
    descriptor: &NodeDescriptor,
    context: &SchemaContext,
) -> Option<SchemaContext> {
    let mut current = context.clone();
    while !current.is_empty() && !schema.valid_at(descriptor, &current) {
        let (popped, rest) = current.pop()?;
        if schema.is_limit(popped.name()) {
            return None;
        }
        current = rest;
    }
    (!current.is_empty()).then_some(current)
}

impl UpcastConverter for HoistableImage {
    fn convert(
        &self,
        view: ViewNodeId,
        context: &SchemaContext,
        api: &mut UpcastApi<'_>,
    ) -> Option<ModelOutput> {
        let spec = ConsumeSpec::name().attribute(&self.config.source_attribute);
        if !has_source(api.view, view, &self.config) || !api.can_consume(view, &spec) {
            return None;
        }

        let target = find_allowed_context(api.schema, &image_descriptor(), context)?;
        if target.len() == context.len() {
            // Allowed here already; the normal converter declined for
            // another reason.
            return None;
        }

        let image = api
            .convert_item(view, &target)?
            .as_node()
            .filter(|&node| api.model.is_element_named(node, IMAGE))?;
        api.hoisted.mark(image, target.len());
        debug!(
            image = %image,
            from = ?context,
            to = ?target,
            "hoisting image out of disallowed context"
        );

        Some(ModelOutput::Node(image))
    }
}

/// Splits converted elements around hoisted images.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoistThroughElement;

/// Create the hoist-repair post-processor.
pub fn hoist_image_through_element() -> HoistThroughElement {
    HoistThroughElement
}

impl UpcastPostProcessor for HoistThroughElement {
    fn process(
        &self,
        _view: ViewNodeId,
        context: &SchemaContext,
        output: ModelOutput,
        api: &mut UpcastApi<'_>,
    ) -> ModelOutput {
        let ModelOutput::Node(element) = output else {
            return output;
        };
        if !api.model.is_element(element) {
            return output;
        }

        // The element sits at `depth`; its children at `depth + 1`. A child
        // whose target is deeper than the element is already in place.
        let depth = context.len();
        let mut hoisted = Vec::new();
        for &child in api.model.children(element) {
            match api.hoisted.target(child) {
                Some(target) if target <= depth => hoisted.push(child),
                Some(_) => api.hoisted.clear(child),
                None => {}
            }
        }
        if hoisted.is_empty() {
            return output;
        }

        let object = api
            .model
            .name(element)
            .is_some_and(|name| api.schema.is_object(name));
        let fragment = if object {
            move_after(api.model, element, &hoisted)
        } else {
            split_around(api.model, element, &hoisted)
        };
        for &child in &hoisted {
            if api.hoisted.target(child) == Some(depth) {
                api.hoisted.clear(child);
            }
        }
        debug!(
            element = %element,
            hoisted = hoisted.len(),
            pieces = fragment.len(),
            "split element around hoisted images"
        );

        ModelOutput::Fragment(fragment)
    }
}

/// Detach every node in `hoisted` from an object `element` and place them
/// after it, in order. Objects are never cloned, so the rest of the
/// element's content stays in it.
pub fn move_after(model: &mut Model, element: NodeId, hoisted: &[NodeId]) -> ModelFragment {
    let mut pieces = vec![element];
    for &child in hoisted {
        model.detach(child);
        pieces.push(child);
    }
    pieces.into_iter().collect()
}

/// Split `element` so every node in `hoisted` becomes its sibling.
///
/// Children are scanned from last to first. Everything right of a hoisted
/// child moves to a shallow clone of the element; the hoisted child is
/// detached; what is left of it stays in the original. The pieces are
/// returned in document order, empty pieces omitted. When every child was
/// hoisted, the emptied original is kept as a trailing piece.
pub fn split_around(model: &mut Model, element: NodeId, hoisted: &[NodeId]) -> ModelFragment {
    let children = model.children(element).to_vec();
    let all_hoisted = children.iter().all(|c| hoisted.contains(c));
    let mut pieces = std::collections::VecDeque::from([element]);

    for (index, &child) in children.iter().enumerate().rev() {
        if !hoisted.contains(&child) {
            continue;
        }

        let count = model.child_count(element);
        let right = if count > index + 1 {
            let moved = model.remove_children(element, index + 1..count);
            let clone = model.clone_shallow(element);
            if let Some(clone) = clone {
                model.insert(clone, 0, &moved);
            }
            clone
        } else {
            None
        };
        model.detach(child);

        // The original always leads here: it is re-added below whenever it
        // keeps children, and once it is empty the scan is over.
        pieces.pop_front();
        if let Some(clone) = right {
            pieces.push_front(clone);
        }
        pieces.push_front(child);
        if model.child_count(element) > 0 {
            pieces.push_front(element);
        }
    }

    if all_hoisted && !pieces.contains(&element) {
        pieces.push_back(element);
    }
    pieces.into_iter().collect()
}
