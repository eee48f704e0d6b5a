//! View serializer - writes a view subtree back out as HTML.
//!
//! Void elements (`img`, `br`, `hr`, ...) are written without a closing tag.
//! Comments are skipped; only content markup is emitted.

use std::fmt::Write;

use super::arena::{ViewDom, ViewNodeData, ViewNodeId};

/// HTML elements that never have children or closing tags.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Check whether a tag is a void element.
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Serialize the children of `parent` to an HTML string.
pub fn to_html(dom: &ViewDom, parent: ViewNodeId) -> String {
    let mut out = String::new();
    for child in dom.children(parent) {
        write_node(dom, child, &mut out);
    }
    out
}

/// Serialize a single node (and its subtree) to an HTML string.
pub fn node_to_html(dom: &ViewDom, id: ViewNodeId) -> String {
    let mut out = String::new();
    write_node(dom, id, &mut out);
    out
}

fn write_node(dom: &ViewDom, id: ViewNodeId, out: &mut String) {
    let Some(node) = dom.get(id) else {
        return;
    };

    match &node.data {
        ViewNodeData::Text(text) => out.push_str(&escape_text(text)),
        ViewNodeData::Element { name, attrs, .. } => {
            let tag = name.local.as_ref();
            out.push('<');
            out.push_str(tag);
            for attr in attrs {
                write!(
                    out,
                    " {}=\"{}\"",
                    attr.name.local.as_ref(),
                    escape_xml(&attr.value)
                )
                .unwrap();
            }
            out.push('>');

            if is_void_element(tag) {
                return;
            }

            for child in dom.children(id) {
                write_node(dom, child, out);
            }
            write!(out, "</{}>", tag).unwrap();
        }
        ViewNodeData::Document => {
            for child in dom.children(id) {
                write_node(dom, child, out);
            }
        }
        ViewNodeData::Inert => {}
    }
}

/// Escape special XML/HTML characters.
pub fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape text content. Quotes are left alone outside attributes.
fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}
