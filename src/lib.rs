//! # figtree
//!
//! Image figures for rich-text document models.
//!
//! figtree converts HTML into an abstract document model and back. Its
//! image feature represents `<figure class="image"><img></figure>` (and bare
//! `<img>` tags) as a single `image` model element, keeps the rendered
//! editing view in sync with attribute changes, and repairs documents where
//! an image sits somewhere the schema does not allow it.
//!
//! ## Features
//!
//! - Prioritised, declinable converters in both directions
//! - Schema checks against persistent ancestor chains
//! - Figure folding: the figure's other content becomes the image's children
//! - Autohoisting: misplaced images move to the nearest allowed ancestor,
//!   splitting the elements they were nested in, and never past a schema limit
//! - Attribute sync from the model to the rendered `<img>`
//!
//! ## Quick Start
//!
//! ```
//! use figtree::{Editor, image::ImageEditing};
//!
//! let mut editor = Editor::new().with_plugin(ImageEditing::new()).unwrap();
//! editor.set_data(r#"<figure class="image"><img src="cat.png" alt="Cat"><p>A cat</p></figure>"#);
//!
//! assert_eq!(
//!     editor.model().stringify(editor.model().root()),
//!     r#"<image alt="Cat" src="cat.png"><paragraph>A cat</paragraph></image>"#
//! );
//! assert_eq!(
//!     editor.get_data(),
//!     r#"<figure class="image"><img src="cat.png" alt="Cat"><p>A cat</p></figure>"#
//! );
//! ```
//!
//! ## Updating attributes
//!
//! ```
//! use figtree::{Editor, image::ImageEditing};
//!
//! let mut editor = Editor::new().with_plugin(ImageEditing::new()).unwrap();
//! editor.set_data(r#"<img src="a.png">"#);
//!
//! let image = editor.model().children(editor.model().root())[0];
//! editor.set_attribute(image, "alt", Some("A")).unwrap();
//!
//! assert_eq!(
//!     editor.editing_html(),
//!     r#"<figure class="image"><img src="a.png" alt="A"></figure>"#
//! );
//! ```

pub mod conversion;
pub mod editor;
pub mod error;
pub mod image;
pub mod model;
pub mod schema;
pub(crate) mod util;
pub mod view;

pub use editor::{Editor, Plugin};
pub use error::{Error, Result};
pub use image::{ImageConfig, ImageEditing};
pub use model::{Model, ModelFragment, NodeId};
pub use schema::{Schema, SchemaContext};
