//! The image feature.
//!
//! Registers an `image` model element (an object with a required `src` and
//! optional `alt`) and the converters that map it to and from
//! `<figure class="image"><img src alt>…</figure>`.
//!
//! Bare `<img>` tags are converted too. When one appears where the schema
//! does not allow an image, for example inside a paragraph, it is hoisted to
//! the nearest ancestor that does allow it and the elements it was nested in
//! are split around it:
//!
//! ```
//! use figtree::{Editor, image::ImageEditing};
//!
//! let mut editor = Editor::new().with_plugin(ImageEditing::new()).unwrap();
//! editor.set_data(r#"<p>before<img src="a.png">after</p>"#);
//! assert_eq!(
//!     editor.get_data(),
//!     r#"<p>before</p><figure class="image"><img src="a.png"></figure><p>after</p>"#
//! );
//! ```

mod converters;

pub use converters::{
    HoistThroughElement, HoistableImage, ImageToView, ModelToViewAttribute, ViewFigureToModel,
    convert_hoistable_image, create_image_view_element, find_allowed_context,
    hoist_image_through_element, model_to_view_attribute_converter, model_to_view_image,
    split_around, view_figure_to_model, view_image_to_model,
};

use tracing::debug;

use crate::conversion::Priority;
use crate::editor::{Editor, Plugin};
use crate::error::Result;
use crate::schema::{BLOCK, Schema, SchemaItem};

/// Model element name.
pub const IMAGE: &str = "image";

/// Model attribute holding the image source.
pub const SRC: &str = "src";

/// Caption content element allowed inside images.
const CAPTION_CONTENT: &str = "paragraph";

/// View markup recognised and produced for images.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct ImageConfig {
    /// Container element tag.
    pub container: String,
    /// Class that marks a container as an image.
    pub marker_class: String,
    /// Media element tag.
    pub media: String,
    /// View attribute holding the source.
    pub source_attribute: String,
    /// Optional attributes copied between the media tag and the model under
    /// the same name.
    pub optional_attributes: Vec<String>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            container: "figure".to_string(),
            marker_class: "image".to_string(),
            media: "img".to_string(),
            source_attribute: "src".to_string(),
            optional_attributes: vec!["alt".to_string()],
        }
    }
}

/// Register the `image` item.
///
/// Images are block objects allowed wherever blocks are. If a `paragraph`
/// item exists it is allowed inside images as caption content.
pub fn register_schema(schema: &mut Schema, config: &ImageConfig) -> Result<()> {
    schema.register(
        IMAGE,
        SchemaItem::new()
            .allow_where(BLOCK)
            .require_attributes([SRC])
            .allow_attributes(config.optional_attributes.iter().map(String::as_str))
            .object()
            .block(),
    )?;
    if schema.is_registered(CAPTION_CONTENT) {
        schema.allow_in(CAPTION_CONTENT, IMAGE)?;
    }
    Ok(())
}

/// Editor plugin wiring the image schema and converters.
#[derive(Debug, Clone, Default)]
pub struct ImageEditing {
    config: ImageConfig,
}

impl ImageEditing {
    /// Create the plugin with the default markup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the plugin with custom markup.
    pub fn with_config(config: ImageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }
}

impl Plugin for ImageEditing {
    fn name(&self) -> &'static str {
        "ImageEditing"
    }

    fn init(&self, editor: &mut Editor) -> Result<()> {
        let config = &self.config;
        register_schema(editor.schema_mut(), config)?;

        let conversion = editor.conversion_mut();
        conversion
            .upcast
            .on_element(Priority::Normal, view_figure_to_model(config.clone()))
            .on_element(Priority::Normal, view_image_to_model(config))
            .on_element(Priority::Low, convert_hoistable_image(config.clone()))
            .after_element(Priority::Low, hoist_image_through_element());

        for downcast in conversion.downcast_mut() {
            downcast.on_insert(Priority::Normal, model_to_view_image(config.clone()));
            downcast.on_attribute(
                Priority::Normal,
                model_to_view_attribute_converter(SRC).with_view_key(&config.source_attribute),
            );
            for key in &config.optional_attributes {
                downcast.on_attribute(Priority::Normal, model_to_view_attribute_converter(key));
            }
        }

        debug!(container = %config.container, media = %config.media, "image feature registered");
        Ok(())
    }
}
