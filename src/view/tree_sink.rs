//! Building a [`ViewDom`] from html5ever's tree builder.
//!
//! Only elements and text reach conversion. Comments and processing
//! instructions become inert nodes, and the doctype and quirks mode are
//! dropped.

use std::borrow::Cow;
use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as Html5Attribute, QualName};

use super::arena::{Attribute, ViewDom, ViewNodeData, ViewNodeId};

/// Handle the tree builder uses to refer to view nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkHandle(pub ViewNodeId);

/// Tree builder sink filling a [`ViewDom`].
///
/// The tree builder only hands out `&self`, so the DOM sits in a RefCell.
#[derive(Default)]
pub struct ViewSink {
    dom: RefCell<ViewDom>,
}

impl ViewSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the sink and return the DOM.
    pub fn into_dom(self) -> ViewDom {
        self.dom.into_inner()
    }

    /// Materialize `child` as a node and hand it to `place`.
    fn insert(&self, child: NodeOrText<SinkHandle>, place: impl FnOnce(&mut ViewDom, ViewNodeId)) {
        let mut dom = self.dom.borrow_mut();
        let node = match child {
            NodeOrText::AppendNode(node) => node.0,
            NodeOrText::AppendText(text) => dom.create_text(text.to_string()),
        };
        place(&mut dom, node);
    }
}

fn into_attributes(attrs: Vec<Html5Attribute>) -> Vec<Attribute> {
    attrs
        .into_iter()
        .map(|a| Attribute {
            name: a.name,
            value: a.value.to_string(),
        })
        .collect()
}

impl TreeSink for ViewSink {
    type Handle = SinkHandle;
    type Output = Self;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self
    }

    fn parse_error(&self, _msg: Cow<'static, str>) {}

    fn get_document(&self) -> SinkHandle {
        SinkHandle(self.dom.borrow().document())
    }

    fn elem_name<'a>(&'a self, target: &'a SinkHandle) -> Self::ElemName<'a> {
        static NO_NAME: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };

        let dom = self.dom.borrow();
        match dom.get(target.0).map(|n| &n.data) {
            Some(ViewNodeData::Element { name, .. }) => {
                // SAFETY: element names live in the arena owned by `self` and
                // are never replaced or freed while the sink is alive.
                unsafe { std::mem::transmute::<&QualName, &'a QualName>(name) }
            }
            _ => &NO_NAME,
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Html5Attribute>,
        _flags: ElementFlags,
    ) -> SinkHandle {
        let attrs = into_attributes(attrs);
        SinkHandle(self.dom.borrow_mut().create_element(name, attrs))
    }

    fn create_comment(&self, _text: StrTendril) -> SinkHandle {
        SinkHandle(self.dom.borrow_mut().create_inert())
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> SinkHandle {
        SinkHandle(self.dom.borrow_mut().create_inert())
    }

    fn append(&self, parent: &SinkHandle, child: NodeOrText<SinkHandle>) {
        match child {
            // Adjacent text runs end up in one node.
            NodeOrText::AppendText(text) => self.dom.borrow_mut().append_text(parent.0, &text),
            node => self.insert(node, |dom, id| dom.append(parent.0, id)),
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &SinkHandle,
        prev_element: &SinkHandle,
        child: NodeOrText<SinkHandle>,
    ) {
        let parent = self.dom.borrow().parent(element.0);
        let target = parent.map_or(*prev_element, SinkHandle);
        self.append(&target, child);
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
    }

    fn get_template_contents(&self, target: &SinkHandle) -> SinkHandle {
        *target
    }

    fn same_node(&self, x: &SinkHandle, y: &SinkHandle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &SinkHandle, new_node: NodeOrText<SinkHandle>) {
        self.insert(new_node, |dom, id| dom.insert_before(sibling.0, id));
    }

    fn add_attrs_if_missing(&self, target: &SinkHandle, attrs: Vec<Html5Attribute>) {
        let mut dom = self.dom.borrow_mut();
        for attr in attrs {
            let key = attr.name.local.as_ref();
            if !dom.has_attr(target.0, key) {
                dom.set_attr(target.0, key, &attr.value);
            }
        }
    }

    fn remove_from_parent(&self, target: &SinkHandle) {
        self.dom.borrow_mut().detach(target.0);
    }

    fn reparent_children(&self, node: &SinkHandle, new_parent: &SinkHandle) {
        let mut dom = self.dom.borrow_mut();
        let children: Vec<_> = dom.children(node.0).collect();
        for child in children {
            dom.detach(child);
            dom.append(new_parent.0, child);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::view::{content_root, parse_html, to_html};

    #[test]
    fn test_figure_markup() {
        let dom = parse_html(r#"<figure class="image"><img src="x.png" alt="X"><p>c</p></figure>"#);

        let figure = dom.find_by_tag("figure").expect("should find figure");
        assert!(dom.has_class(figure, "image"));

        let img = dom.first_child(figure).expect("figure should have a child");
        assert!(dom.is_element_named(img, "img"));
        assert_eq!(dom.get_attr(img, "src"), Some("x.png"));
        assert_eq!(dom.get_attr(img, "alt"), Some("X"));
        assert_eq!(dom.children(img).count(), 0);
    }

    #[test]
    fn test_comments_and_doctype_are_dropped() {
        let dom = parse_html("<!DOCTYPE html><p>a<!-- note -->b</p><?pi x?>");

        let body = content_root(&dom);
        assert_eq!(to_html(&dom, body), "<p>ab</p>");
    }

    #[test]
    fn test_misnested_markup_is_repaired() {
        // The parser closes <p> before a block-level <div>.
        let dom = parse_html("<p>one<div>two</div></p>");
        let div = dom.find_by_tag("div").expect("should find div");
        let parent = dom.parent(div).expect("div should be attached");
        assert!(dom.is_element_named(parent, "body"));
    }
}
