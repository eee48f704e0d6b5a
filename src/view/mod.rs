//! View trees: the editing view and the serialized data view.
//!
//! A view is an arena DOM of HTML elements. Data markup is parsed into a
//! [`ViewDom`] with html5ever, converted to the model, and rendered back
//! through [`to_html`].
//!
//! # Example
//!
//! ```
//! use figtree::view::{parse_html, to_html};
//!
//! let dom = parse_html(r#"<figure class="image"><img src="a.png"></figure>"#);
//! let body = dom.find_by_tag("body").unwrap();
//! assert_eq!(to_html(&dom, body), r#"<figure class="image"><img src="a.png"></figure>"#);
//! ```

mod arena;
mod serialize;
mod tree_sink;

pub use arena::{Attribute, ChildrenIter, ViewDom, ViewNode, ViewNodeData, ViewNodeId};
pub use serialize::{escape_xml, is_void_element, node_to_html, to_html};
pub use tree_sink::ViewSink;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

/// Parse HTML into a view tree.
///
/// Fragments are accepted; the parser wraps them in `html`/`body` the way a
/// browser would. Use [`content_root`] to get the element holding the content.
pub fn parse_html(html: &str) -> ViewDom {
    let sink = ViewSink::new();
    let result = parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes());
    result.into_dom()
}

/// Parse HTML bytes into a view tree with encoding detection.
///
/// Supports UTF-8, Windows-1252, and any encoding named in an XML
/// declaration or `<meta charset>`.
pub fn parse_html_bytes(html: &[u8]) -> ViewDom {
    let hint = crate::util::extract_encoding_hint(html);
    let decoded = crate::util::decode_text(html, hint);
    parse_html(&decoded)
}

/// The element whose children are the document content (`body`, or the
/// document node when there is none).
pub fn content_root(dom: &ViewDom) -> ViewNodeId {
    dom.find_by_tag("body").unwrap_or(dom.document())
}
