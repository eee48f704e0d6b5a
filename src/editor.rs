//! A minimal editor host.
//!
//! The editor owns the schema, the converter pipelines, the model and the
//! editing view. Data goes in through [`Editor::set_data`], which parses
//! HTML and upcasts it into a fresh model, and comes out through
//! [`Editor::get_data`], which downcasts the model into a fresh data view.
//! The editing view is rendered once per `set_data` and then kept in sync
//! with model attribute changes made through [`Editor::set_attribute`].
//!
//! Features are added with [`Plugin`]s.

use tracing::debug;

use crate::conversion::{
    AttributeEvent, DowncastDispatcher, ElementToElement, ElementToView, Mapper, Priority,
    TextConverter, TransparentElement, UpcastDispatcher,
};
use crate::error::{Error, Result};
use crate::model::{Model, NodeId, ROOT_NAME};
use crate::schema::{BLOCK, Schema, SchemaContext, SchemaItem, TEXT};
use crate::view::{ViewDom, ViewNodeId, content_root, parse_html, parse_html_bytes, to_html};

/// Block elements every editor understands: (model name, view tag).
const BLOCK_ELEMENTS: &[(&str, &str)] = &[
    ("paragraph", "p"),
    ("heading1", "h1"),
    ("heading2", "h2"),
    ("heading3", "h3"),
];

/// Block container that may hold other blocks.
const BLOCK_QUOTE: (&str, &str) = ("blockQuote", "blockquote");

/// A feature that extends the editor's schema and converters.
pub trait Plugin {
    /// Unique plugin name.
    fn name(&self) -> &'static str;

    /// Register the feature with the editor.
    fn init(&self, editor: &mut Editor) -> Result<()>;
}

/// The converter pipelines.
#[derive(Default)]
pub struct Conversion {
    /// View → model, used when loading data.
    pub upcast: UpcastDispatcher,
    /// Model → editing view.
    pub editing: DowncastDispatcher,
    /// Model → data view.
    pub data: DowncastDispatcher,
}

impl Conversion {
    /// Both downcast pipelines, for converters that apply to each.
    pub fn downcast_mut(&mut self) -> [&mut DowncastDispatcher; 2] {
        [&mut self.editing, &mut self.data]
    }

    /// Map a view element to a model element one-to-one in every pipeline.
    pub fn element_to_element(&mut self, model_name: &str, view_name: &str) {
        self.upcast.on_element(
            Priority::Normal,
            ElementToElement::new(view_name, model_name),
        );
        for downcast in self.downcast_mut() {
            downcast.on_insert(Priority::Normal, ElementToView::new(model_name, view_name));
        }
    }
}

/// The rendered editing view and its bindings to the model.
struct EditingView {
    view: ViewDom,
    root: ViewNodeId,
    mapper: Mapper,
}

impl EditingView {
    fn new() -> Self {
        let mut view = ViewDom::new();
        let root = view.create_html_element("div", Vec::new());
        view.append(view.document(), root);
        Self {
            view,
            root,
            mapper: Mapper::new(),
        }
    }
}

/// The editor.
pub struct Editor {
    schema: Schema,
    conversion: Conversion,
    model: Model,
    editing: EditingView,
    plugins: Vec<&'static str>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Create an editor with paragraphs, headings and block quotes.
    pub fn new() -> Self {
        let text = BLOCK_ELEMENTS
            .iter()
            .fold(SchemaItem::new(), |item, &(model_name, _)| item.allow_in(model_name));
        let mut schema = Schema::with_generic_items().with_item(TEXT, text).with_item(
            BLOCK,
            SchemaItem::new().allow_in(ROOT_NAME).allow_in(BLOCK_QUOTE.0),
        );
        let mut conversion = Conversion::default();

        for &(model_name, view_name) in BLOCK_ELEMENTS.iter().chain([&BLOCK_QUOTE]) {
            schema = schema.with_item(model_name, SchemaItem::new().allow_where(BLOCK).block());
            conversion.element_to_element(model_name, view_name);
        }

        conversion
            .upcast
            .on_text(Priority::Normal, TextConverter)
            .on_element(Priority::Lowest, TransparentElement);

        Self {
            schema,
            conversion,
            model: Model::new(),
            editing: EditingView::new(),
            plugins: Vec::new(),
        }
    }

    /// Load a plugin, consuming and returning the editor.
    pub fn with_plugin(mut self, plugin: impl Plugin) -> Result<Self> {
        self.load(&plugin)?;
        Ok(self)
    }

    /// Load several plugins in order.
    pub fn with_plugins(mut self, plugins: &[&dyn Plugin]) -> Result<Self> {
        for plugin in plugins {
            self.load(*plugin)?;
        }
        Ok(self)
    }

    /// Load a plugin.
    pub fn load(&mut self, plugin: &dyn Plugin) -> Result<()> {
        let name = plugin.name();
        if self.plugins.contains(&name) {
            return Err(Error::DuplicatePlugin(name));
        }
        plugin.init(self)?;
        self.plugins.push(name);
        debug!(plugin = name, "plugin loaded");
        Ok(())
    }

    /// Names of loaded plugins, in load order.
    pub fn plugins(&self) -> &[&'static str] {
        &self.plugins
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn schema_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }

    pub fn conversion_mut(&mut self) -> &mut Conversion {
        &mut self.conversion
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Replace the document with HTML data.
    pub fn set_data(&mut self, html: &str) {
        self.load_view(&parse_html(html));
    }

    /// Replace the document with HTML bytes in any supported encoding.
    pub fn set_data_bytes(&mut self, html: &[u8]) {
        self.load_view(&parse_html_bytes(html));
    }

    fn load_view(&mut self, dom: &ViewDom) {
        let mut model = Model::new();
        let fragment = self.conversion.upcast.convert(
            dom,
            content_root(dom),
            &self.schema,
            &mut model,
            &SchemaContext::root(),
        );
        let root = model.root();
        model.insert(root, 0, fragment.as_slice());
        debug!(
            top_level = fragment.len(),
            nodes = model.node_count(),
            "data loaded"
        );

        self.model = model;
        self.render_editing();
    }

    fn render_editing(&mut self) {
        let mut editing = EditingView::new();
        let root = self.model.root();
        editing.mapper.bind(root, editing.root);
        for &child in self.model.children(root) {
            self.conversion.editing.convert_insert(
                &self.model,
                child,
                &mut editing.view,
                &mut editing.mapper,
                editing.root,
            );
        }
        self.editing = editing;
    }

    /// Serialize the document as HTML data.
    pub fn get_data(&self) -> String {
        let mut view = ViewDom::new();
        let mut mapper = Mapper::new();
        let parent = view.document();
        for &child in self.model.children(self.model.root()) {
            self.conversion
                .data
                .convert_insert(&self.model, child, &mut view, &mut mapper, parent);
        }
        to_html(&view, parent)
    }

    /// Serialize the editing view.
    pub fn editing_html(&self) -> String {
        to_html(&self.editing.view, self.editing.root)
    }

    /// Set (`Some`) or remove (`None`) an attribute on a model element and
    /// sync the editing view.
    ///
    /// A required attribute can be changed but never removed or emptied.
    pub fn set_attribute(&mut self, node: NodeId, key: &str, value: Option<&str>) -> Result<()> {
        let name = self
            .model
            .name(node)
            .ok_or(Error::UnknownNode(node))?
            .to_string();
        if !self.model.is_element(node) {
            return Err(Error::NotAnElement(node));
        }
        if value.is_some() && !self.schema.allows_attribute(&name, key) {
            return Err(Error::InvalidAttribute {
                key: key.to_string(),
                name,
            });
        }
        if value.is_none_or(str::is_empty) && self.schema.is_required_attribute(&name, key) {
            return Err(Error::RequiredAttribute {
                key: key.to_string(),
                name,
            });
        }

        let old = self.model.attr(node, key).map(str::to_string);
        match value {
            Some(value) => {
                self.model.set_attr(node, key, value);
            }
            None => {
                self.model.remove_attr(node, key);
            }
        }

        if let Some(event) = AttributeEvent::new(node, key, old, value.map(str::to_string)) {
            self.conversion.editing.convert_attributes(
                &self.model,
                &[event],
                &mut self.editing.view,
                &self.editing.mapper,
            );
        }
        Ok(())
    }

    /// Dispatch a batch of attribute events to the editing view without
    /// touching the model.
    ///
    /// Each call is one conversion pass: an event listed twice in the same
    /// batch is applied once.
    pub fn sync_attributes(&mut self, events: &[AttributeEvent]) {
        self.conversion.editing.convert_attributes(
            &self.model,
            events,
            &mut self.editing.view,
            &self.editing.mapper,
        );
    }
}
