//! Attribute sync tests.
//!
//! Model attribute changes on an image are mirrored onto the `<img>` inside
//! the rendered figure, without re-rendering the figure.

use figtree::conversion::{
    AttributeConverter, AttributeEvent, DowncastApi, DowncastDispatcher, Mapper, Priority,
};
use figtree::image::{ImageConfig, model_to_view_attribute_converter, model_to_view_image};
use figtree::model::{Model, NodeId};
use figtree::view::{ViewDom, to_html};
use figtree::{Editor, ImageEditing};

fn editor_with(html: &str) -> (Editor, NodeId) {
    let mut editor = Editor::new().with_plugin(ImageEditing::new()).unwrap();
    editor.set_data(html);
    let image = editor.model().children(editor.model().root())[0];
    (editor, image)
}

// ============================================================================
// Editor API
// ============================================================================

#[test]
fn test_add_change_remove() {
    let (mut editor, image) = editor_with(r#"<figure class="image"><img src="a.png"></figure>"#);

    editor.set_attribute(image, "alt", Some("first")).unwrap();
    assert_eq!(
        editor.editing_html(),
        r#"<figure class="image"><img src="a.png" alt="first"></figure>"#
    );

    editor.set_attribute(image, "alt", Some("second")).unwrap();
    editor.set_attribute(image, "src", Some("b.png")).unwrap();
    assert_eq!(
        editor.editing_html(),
        r#"<figure class="image"><img src="b.png" alt="second"></figure>"#
    );

    editor.set_attribute(image, "alt", None).unwrap();
    assert_eq!(
        editor.editing_html(),
        r#"<figure class="image"><img src="b.png"></figure>"#
    );
    assert_eq!(editor.get_data(), editor.editing_html());
}

#[test]
fn test_sync_leaves_figure_children_alone() {
    let (mut editor, image) = editor_with(r#"<figure class="image"><img src="a"><p>cap</p></figure>"#);

    editor.set_attribute(image, "alt", Some("x")).unwrap();

    assert_eq!(
        editor.editing_html(),
        r#"<figure class="image"><img src="a" alt="x"><p>cap</p></figure>"#
    );
}

#[test]
fn test_unchanged_value_dispatches_nothing() {
    let (mut editor, image) = editor_with(r#"<img src="a">"#);
    let before = editor.editing_html();

    editor.set_attribute(image, "src", Some("a")).unwrap();
    editor.set_attribute(image, "alt", None).unwrap();

    assert_eq!(editor.editing_html(), before);
}

#[test]
fn test_attribute_not_in_schema_is_rejected() {
    let (mut editor, image) = editor_with(r#"<img src="a">"#);

    assert!(matches!(
        editor.set_attribute(image, "width", Some("10")),
        Err(figtree::Error::InvalidAttribute { .. })
    ));
    assert_eq!(editor.model().attr(image, "width"), None);
}

#[test]
fn test_required_source_cannot_be_removed_or_emptied() {
    let (mut editor, image) = editor_with(r#"<figure class="image"><img src="a.png"></figure>"#);

    assert!(matches!(
        editor.set_attribute(image, "src", None),
        Err(figtree::Error::RequiredAttribute { .. })
    ));
    assert!(matches!(
        editor.set_attribute(image, "src", Some("")),
        Err(figtree::Error::RequiredAttribute { .. })
    ));
    assert_eq!(editor.model().attr(image, "src"), Some("a.png"));

    let data = editor.get_data();
    assert_eq!(data, r#"<figure class="image"><img src="a.png"></figure>"#);
    assert_eq!(editor.editing_html(), data);

    editor.set_data(&data);
    assert_eq!(editor.model().child_count(editor.model().root()), 1);
}

#[test]
fn test_optional_attribute_can_be_emptied() {
    let (mut editor, image) = editor_with(r#"<img src="a" alt="x">"#);

    editor.set_attribute(image, "alt", Some("")).unwrap();

    assert_eq!(
        editor.editing_html(),
        r#"<figure class="image"><img src="a" alt=""></figure>"#
    );
}

#[test]
fn test_duplicate_event_in_batch_applies_once() {
    let (mut editor, image) = editor_with(r#"<img src="a">"#);

    let first = AttributeEvent::new(image, "alt", None, Some("A".into())).unwrap();
    let duplicate = AttributeEvent::new(image, "alt", None, Some("B".into())).unwrap();
    editor.sync_attributes(&[first, duplicate]);

    assert_eq!(
        editor.editing_html(),
        r#"<figure class="image"><img src="a" alt="A"></figure>"#
    );
}

// ============================================================================
// Dispatcher Level
// ============================================================================

/// Records, for each event it sees, whether the change was still pending.
struct PendingProbe(std::rc::Rc<std::cell::RefCell<Vec<bool>>>);

impl AttributeConverter for PendingProbe {
    fn convert(&self, event: &AttributeEvent, _model: &Model, api: &mut DowncastApi<'_>) {
        self.0
            .borrow_mut()
            .push(api.consumable.test(event.item, event.kind, &event.key));
    }
}

#[test]
fn test_converter_registered_twice_mutates_once() {
    let config = ImageConfig::default();
    let mut model = Model::new();
    let image = model.create_element("image", [("src", "a")]);
    model.append(model.root(), image);

    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let mut dispatcher = DowncastDispatcher::new();
    dispatcher
        .on_insert(Priority::Normal, model_to_view_image(config))
        .on_attribute(Priority::Normal, model_to_view_attribute_converter("alt"))
        .on_attribute(Priority::Normal, model_to_view_attribute_converter("alt"))
        .on_attribute(Priority::Low, PendingProbe(seen.clone()));

    let mut view = ViewDom::new();
    let mut mapper = Mapper::new();
    let parent = view.document();
    dispatcher.convert_insert(&model, image, &mut view, &mut mapper, parent);

    model.set_attr(image, "alt", "x");
    let event = AttributeEvent::new(image, "alt", None, Some("x".into())).unwrap();
    dispatcher.convert_attributes(&model, &[event.clone(), event], &mut view, &mapper);

    assert_eq!(
        to_html(&view, parent),
        r#"<figure class="image"><img src="a" alt="x"></figure>"#
    );
    // Consumed by the first converter before the probe ever saw it.
    assert_eq!(*seen.borrow(), vec![false, false]);
}

#[test]
fn test_converter_ignores_other_keys_and_elements() {
    let mut model = Model::new();
    let paragraph = model.create_element("paragraph", [("alt", "p")]);
    model.append(model.root(), paragraph);

    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let mut dispatcher = DowncastDispatcher::new();
    dispatcher
        .on_attribute(Priority::Normal, model_to_view_attribute_converter("alt"))
        .on_attribute(Priority::Low, PendingProbe(seen.clone()));

    let mut view = ViewDom::new();
    let mapper = Mapper::new();
    let events = [
        AttributeEvent::new(paragraph, "alt", None, Some("p".into())).unwrap(),
        AttributeEvent::new(paragraph, "title", None, Some("t".into())).unwrap(),
    ];
    dispatcher.convert_attributes(&model, &events, &mut view, &mapper);

    assert_eq!(*seen.borrow(), vec![true, true]);
}
