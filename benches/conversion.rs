//! Benchmarks for the conversion pipeline.
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use figtree::view::parse_html;
use figtree::{Editor, ImageEditing};

/// Build a document of `blocks` sections mixing paragraphs, figures and
/// inline images that need hoisting.
fn sample_document(blocks: usize) -> String {
    let mut html = String::new();
    for i in 0..blocks {
        match i % 4 {
            0 => html.push_str(&format!("<p>Paragraph {i} with <b>inline</b> text.</p>")),
            1 => html.push_str(&format!(
                r#"<figure class="image"><img src="img/{i}.png" alt="Figure {i}"><p>Caption {i}</p></figure>"#
            )),
            2 => html.push_str(&format!(
                r#"<p>Before {i}<img src="img/{i}.png">after {i}</p>"#
            )),
            _ => html.push_str(&format!(
                r#"<blockquote><p>Quote {i}<span><img src="img/{i}.png"></span>end</p></blockquote>"#
            )),
        }
    }
    html
}

fn editor() -> Editor {
    Editor::new().with_plugin(ImageEditing::new()).unwrap()
}

// ============================================================================
// Pipeline Benchmarks
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let html = sample_document(200);
    c.bench_function("parse_html", |b| {
        b.iter(|| parse_html(&html));
    });
}

fn bench_set_data(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_data");
    for blocks in [20, 200, 2000] {
        let html = sample_document(blocks);
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &html, |b, html| {
            let mut editor = editor();
            b.iter(|| editor.set_data(html));
        });
    }
    group.finish();
}

fn bench_get_data(c: &mut Criterion) {
    let mut editor = editor();
    editor.set_data(&sample_document(200));
    c.bench_function("get_data", |b| {
        b.iter(|| editor.get_data());
    });
}

fn bench_set_attribute(c: &mut Criterion) {
    let mut editor = editor();
    editor.set_data(&sample_document(200));
    let model = editor.model();
    let images: Vec<_> = model
        .children(model.root())
        .iter()
        .copied()
        .filter(|&id| model.is_element_named(id, "image"))
        .collect();

    c.bench_function("set_attribute", |b| {
        let mut toggle = false;
        b.iter(|| {
            toggle = !toggle;
            let alt = if toggle { Some("on") } else { None };
            for &image in &images {
                editor.set_attribute(image, "alt", alt).unwrap();
            }
        });
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_set_data,
    bench_get_data,
    bench_set_attribute
);
criterion_main!(benches);
