//! HTML rendering of the preview block stream.

use pulldown_cmark::{Event, Options, Parser as CmarkParser, Tag, TagEnd};

use crate::Screenplay;
use crate::block::Block;
use crate::block::markup::escape_html;

/// Document title used when neither the options nor the title page name one.
pub const DEFAULT_TITLE: &str = "Untitled Script";

const DEFAULT_STYLE: &str = "\
body { font-family: 'Courier Prime', 'Courier New', monospace; max-width: 42em; margin: 2em auto; }
.preview-line { white-space: pre-wrap; min-height: 1.2em; }
.scene_heading { font-weight: bold; text-transform: uppercase; margin-top: 1em; }
.character, .dual_dialogue_character { margin-left: 20em; text-transform: uppercase; }
.dialogue { margin-left: 10em; margin-right: 10em; }
.parenthetical { margin-left: 15em; }
.transition { text-align: right; }
.centered, .title-page { text-align: center; }
.synopsis, .note { color: #777; font-style: italic; }
.section { color: #557; font-weight: bold; }
.page-number { display: block; text-align: right; }
";

/// Options for [`document_html`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Overrides the title page's `Title` field.
    pub title: Option<String>,
    /// Stylesheet URL linked instead of the built-in style.
    pub stylesheet: Option<String>,
}

/// Render Fountain emphasis in one line of plain text to HTML.
///
/// `*italic*`, `**bold**`, `***bold italic***` and `_underline_` become
/// markup; everything else is escaped. Raw HTML is shown as text and links
/// keep only their label. A line that would read as anything other than a
/// single paragraph (a list item, a quote, a rule) is escaped as-is.
pub fn inline_html(text: &str) -> String {
    let mut html = String::with_capacity(text.len());
    let mut open: Vec<&'static str> = Vec::new();

    for (event, range) in CmarkParser::new_ext(text, Options::empty()).into_offset_iter() {
        match event {
            Event::Start(Tag::Paragraph) | Event::End(TagEnd::Paragraph) => {}

            Event::Text(s) => html.push_str(&escape_html(&s)),
            Event::Code(_) => html.push_str(&escape_html(&text[range])),
            Event::Html(s) | Event::InlineHtml(s) => html.push_str(&escape_html(&s)),
            Event::SoftBreak | Event::HardBreak => html.push(' '),

            Event::Start(Tag::Emphasis) => {
                let tag = if text[range].starts_with('_') { "u" } else { "em" };
                html.push_str(&format!("<{}>", tag));
                open.push(tag);
            }
            Event::Start(Tag::Strong) => {
                html.push_str("<strong>");
                open.push("strong");
            }
            Event::End(TagEnd::Emphasis) | Event::End(TagEnd::Strong) => {
                if let Some(tag) = open.pop() {
                    html.push_str(&format!("</{}>", tag));
                }
            }

            // Links and images keep their label text only.
            Event::Start(Tag::Link { .. })
            | Event::End(TagEnd::Link)
            | Event::Start(Tag::Image { .. })
            | Event::End(TagEnd::Image) => {}

            _ => return escape_html(text),
        }
    }
    html
}

/// One preview line element.
pub fn block_html(block: &Block) -> String {
    let mut classes = format!("preview-line {}", block.kind);
    if let Some(class_name) = &block.class_name {
        classes.push(' ');
        classes.push_str(class_name);
    }
    let content = if block.kind.is_markup() {
        block.text.clone()
    } else {
        inline_html(&block.text)
    };
    format!(
        r#"<div class="{}" data-type="{}" data-line-id="{}" data-line-index="{}">{}</div>"#,
        escape_html(&classes),
        block.kind,
        escape_html(&block.id),
        block.index,
        content
    )
}

/// Title for the rendered page: the explicit option, then the title page's
/// `Title` field, then [`DEFAULT_TITLE`].
pub fn document_title(screenplay: &Screenplay, options: &RenderOptions) -> String {
    if let Some(title) = options.title.as_deref().filter(|t| !t.trim().is_empty()) {
        return title.trim().to_string();
    }
    screenplay
        .title_page
        .as_ref()
        .and_then(|page| page.get("title"))
        .map(|value| value.lines().join(" "))
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

/// A standalone HTML page previewing the whole screenplay.
pub fn document_html(screenplay: &Screenplay, options: &RenderOptions) -> String {
    let title = document_title(screenplay, options);
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(&title)));
    match &options.stylesheet {
        Some(href) => html.push_str(&format!(
            "<link rel=\"stylesheet\" href=\"{}\">\n",
            escape_html(href)
        )),
        None => html.push_str(&format!("<style>\n{}</style>\n", DEFAULT_STYLE)),
    }
    html.push_str("</head>\n<body>\n<main class=\"screenplay-preview\">\n");
    for block in &screenplay.blocks {
        html.push_str(&block_html(block));
        html.push('\n');
    }
    html.push_str("</main>\n</body>\n</html>\n");
    html
}
