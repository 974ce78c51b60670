use screenplay::block::{Block, BlockType, markup};
use screenplay::parser::Parser;
use screenplay::render::{RenderOptions, block_html, document_html, document_title, inline_html};

#[test]
fn emphasis() {
    assert_eq!(
        inline_html("He is *very* **angry** and _sure_."),
        "He is <em>very</em> <strong>angry</strong> and <u>sure</u>."
    );
}

#[test]
fn raw_html_is_escaped() {
    assert_eq!(
        inline_html("Say <b>hi</b> & go"),
        "Say &lt;b&gt;hi&lt;/b&gt; &amp; go"
    );
}

#[test]
fn links_keep_their_label() {
    assert_eq!(inline_html("See [the map](http://example.com)"), "See the map");
}

#[test]
fn block_structure_falls_back_to_text() {
    assert_eq!(inline_html("1. Not a list"), "1. Not a list");
    assert_eq!(inline_html("- beat"), "- beat");
    assert_eq!(inline_html("> quoted"), "&gt; quoted");
    assert_eq!(inline_html(""), "");
}

#[test]
fn preview_line_attributes() {
    let block = Block::new(3, BlockType::SceneHeading, "ROOM - DAY").with_class("int");
    assert_eq!(
        block_html(&block),
        r#"<div class="preview-line scene_heading int" data-type="scene_heading" data-line-id="line-3" data-line-index="3">ROOM - DAY</div>"#
    );
}

#[test]
fn markup_blocks_are_not_escaped() {
    let block = Block::new(7, BlockType::Image, markup::image("https://example.com/a.png"));
    let html = block_html(&block);
    assert!(html.contains(r#"<img class="preview-image" src="https://example.com/a.png" alt="">"#));
}

#[test]
fn document_title_sources() {
    let titled = Parser::new("Title: Night Shift\n===\nText.\n", 0).parse();
    let untitled = Parser::new("Text.\n", 0).parse();

    assert_eq!(document_title(&titled, &RenderOptions::default()), "Night Shift");
    assert_eq!(document_title(&untitled, &RenderOptions::default()), "Untitled Script");

    let options = RenderOptions {
        title: Some("Override".to_string()),
        stylesheet: None,
    };
    assert_eq!(document_title(&titled, &options), "Override");
}

#[test]
fn full_document() {
    let screenplay = Parser::new("Title: Night Shift\n===\nALICE\n*Run.*\n", 0).parse();
    let options = RenderOptions {
        title: None,
        stylesheet: Some("screenplay.css".to_string()),
    };
    let html = document_html(&screenplay, &options);
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Night Shift</title>"));
    assert!(html.contains(r#"<link rel="stylesheet" href="screenplay.css">"#));
    assert!(!html.contains("<style>"));
    assert!(html.contains(r#"data-type="title_page""#));
    assert!(html.contains(r#"data-line-index="3"><em>Run.</em></div>"#));
    assert_eq!(html.matches("class=\"preview-line").count(), 3);
}
