//! HTML snippets carried in the `text` of markup blocks.

use crate::title_page::TitlePage;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn image(url: &str) -> String {
    format!(
        r#"<img class="preview-image" src="{}" alt="">"#,
        escape_html(url)
    )
}

pub fn audio(url: &str) -> String {
    format!(
        r#"<audio class="preview-audio" controls src="{}"></audio>"#,
        escape_html(url)
    )
}

pub fn page_break() -> String {
    r#"<hr class="page-break">"#.to_string()
}

pub fn page_number(page: u32) -> String {
    format!(r#"<span class="page-number">{}.</span>"#, page)
}

pub fn title_page(page: &TitlePage) -> String {
    let mut html = String::from(r#"<div class="title-page">"#);
    for field in &page.fields {
        let lines: Vec<String> = field.value.lines().into_iter().map(escape_html).collect();
        html.push_str(&format!(
            r#"<div class="title-page-field" data-key="{}">{}</div>"#,
            escape_html(&field.key),
            lines.join("<br>")
        ));
    }
    html.push_str("</div>");
    html
}
