//! Autohoisting tests.
//!
//! A bare `<img>` in a context that does not allow images is moved to the
//! nearest ancestor that does, and the elements it was nested in are split
//! around it.

use figtree::schema::{BLOCK, SchemaItem};
use figtree::{Editor, ImageEditing, Plugin, Result};

/// Maps `<aside>` to a `callout` block that holds paragraphs but not images.
struct Callout {
    limit: bool,
}

impl Plugin for Callout {
    fn name(&self) -> &'static str {
        "Callout"
    }

    fn init(&self, editor: &mut Editor) -> Result<()> {
        let mut item = SchemaItem::new().allow_where(BLOCK).block();
        if self.limit {
            item = item.limit();
        }
        editor.schema_mut().register("callout", item)?;
        editor.schema_mut().allow_in("paragraph", "callout")?;
        editor.conversion_mut().element_to_element("callout", "aside");
        Ok(())
    }
}

fn editor() -> Editor {
    Editor::new()
        .with_plugin(ImageEditing::new())
        .expect("plugin loads")
}

fn model_of(editor: &Editor) -> String {
    editor.model().stringify(editor.model().root())
}

fn convert(html: &str) -> (String, String) {
    let mut editor = editor();
    editor.set_data(html);
    (model_of(&editor), editor.get_data())
}

// ============================================================================
// Splitting Paragraphs
// ============================================================================

#[test]
fn test_image_between_text() {
    let (model, data) = convert(r#"<p>before<img src="a.png">after</p>"#);

    assert_eq!(
        model,
        r#"<paragraph>before</paragraph><image src="a.png"></image><paragraph>after</paragraph>"#
    );
    assert_eq!(
        data,
        r#"<p>before</p><figure class="image"><img src="a.png"></figure><p>after</p>"#
    );
}

#[test]
fn test_only_child_keeps_empty_paragraph() {
    let (model, data) = convert(r#"<p><img src="a.png"></p>"#);

    assert_eq!(model, r#"<image src="a.png"></image><paragraph></paragraph>"#);
    assert_eq!(data, r#"<figure class="image"><img src="a.png"></figure><p></p>"#);
}

#[test]
fn test_first_child_emits_no_empty_segment() {
    let (model, _) = convert(r#"<p><img src="a.png">after</p>"#);

    assert_eq!(
        model,
        r#"<image src="a.png"></image><paragraph>after</paragraph>"#
    );
}

#[test]
fn test_last_child() {
    let (model, _) = convert(r#"<p>before<img src="a.png"></p>"#);

    assert_eq!(
        model,
        r#"<paragraph>before</paragraph><image src="a.png"></image>"#
    );
}

#[test]
fn test_several_images_in_one_paragraph() {
    let (model, _) = convert(r#"<p>a<img src="1">b<img src="2"><img src="3">c</p>"#);

    assert_eq!(
        model,
        concat!(
            "<paragraph>a</paragraph>",
            r#"<image src="1"></image>"#,
            "<paragraph>b</paragraph>",
            r#"<image src="2"></image>"#,
            r#"<image src="3"></image>"#,
            "<paragraph>c</paragraph>",
        )
    );
}

#[test]
fn test_remainder_keeps_its_grouping() {
    let (model, _) = convert(r#"<p>A<img src="h">B<span>C</span></p>"#);

    assert_eq!(
        model,
        r#"<paragraph>A</paragraph><image src="h"></image><paragraph>BC</paragraph>"#
    );
}

#[test]
fn test_image_inside_inline_wrapper() {
    let (_, data) = convert(r#"<p>a<span><b><img src="i"></b></span>b</p>"#);

    assert_eq!(
        data,
        r#"<p>a</p><figure class="image"><img src="i"></figure><p>b</p>"#
    );
}

#[test]
fn test_image_in_heading() {
    let (_, data) = convert(r#"<h2>Title<img src="a"></h2><p>text</p>"#);

    assert_eq!(
        data,
        r#"<h2>Title</h2><figure class="image"><img src="a"></figure><p>text</p>"#
    );
}

#[test]
fn test_image_without_src_is_dropped() {
    let (model, _) = convert(r#"<p>a<img>b<img src="">c</p>"#);

    assert_eq!(model, "<paragraph>abc</paragraph>");
}

// ============================================================================
// Hoisting Through Several Levels
// ============================================================================

#[test]
fn test_hoist_stops_at_nearest_allowed_ancestor() {
    let (_, data) = convert(r#"<blockquote><p>x<img src="a">y</p></blockquote>"#);

    assert_eq!(
        data,
        r#"<blockquote><p>x</p><figure class="image"><img src="a"></figure><p>y</p></blockquote>"#
    );
}

#[test]
fn test_hoist_through_two_levels() {
    let mut editor = editor().with_plugin(Callout { limit: false }).unwrap();
    editor.set_data(r#"<aside><p>x<img src="a">y</p><p>z</p></aside>"#);

    assert_eq!(
        model_of(&editor),
        concat!(
            "<callout><paragraph>x</paragraph></callout>",
            r#"<image src="a"></image>"#,
            "<callout><paragraph>y</paragraph><paragraph>z</paragraph></callout>",
        )
    );
    assert_eq!(
        editor.get_data(),
        r#"<aside><p>x</p></aside><figure class="image"><img src="a"></figure><aside><p>y</p><p>z</p></aside>"#
    );
}

#[test]
fn test_hoist_never_crosses_a_limit() {
    let mut editor = editor().with_plugin(Callout { limit: true }).unwrap();
    editor.set_data(r#"<aside><p>x<img src="a">y</p></aside>"#);

    assert_eq!(
        model_of(&editor),
        "<callout><paragraph>xy</paragraph></callout>"
    );
    assert_eq!(editor.get_data(), "<aside><p>xy</p></aside>");
}

#[test]
fn test_figure_inside_callout_is_hoisted_as_bare_image() {
    let mut editor = editor().with_plugin(Callout { limit: false }).unwrap();
    editor.set_data(r#"<aside><figure class="image"><img src="a"></figure><p>z</p></aside>"#);

    assert_eq!(
        model_of(&editor),
        r#"<image src="a"></image><callout><paragraph>z</paragraph></callout>"#
    );
}

// ============================================================================
// Stability
// ============================================================================

#[test]
fn test_normalized_output_is_stable() {
    let inputs = [
        r#"<p>before<img src="a.png">after</p>"#,
        r#"<p><img src="a.png"></p>"#,
        r#"<blockquote><p>x<img src="a">y</p></blockquote>"#,
        r#"<figure class="image"><img src="x"><p>cap</p></figure><p>a<img src="y">b</p>"#,
    ];

    for input in inputs {
        let mut editor = editor();
        editor.set_data(input);
        let first = editor.get_data();
        editor.set_data(&first);
        assert_eq!(editor.get_data(), first, "input: {input}");
    }
}
