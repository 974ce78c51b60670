//! Plain-text views printed by `preview`, `panels` and `characters`.

use std::io::{self, Write};

use screenplay::Screenplay;
use screenplay::block::{Block, BlockType};
use screenplay::hierarchy::{Panel, Storyboard, format_duration};
use screenplay::parser::assemble::BLANK_TEXT;

pub fn write_preview(out: &mut impl Write, screenplay: &Screenplay) -> io::Result<()> {
    for block in &screenplay.blocks {
        if block.kind == BlockType::TitlePage {
            write_title_page(out, block, screenplay)?;
            continue;
        }
        writeln!(out, "{:>4}  {:<28} {}", block.index + 1, type_label(block), plain_text(block))?;
    }
    Ok(())
}

fn write_title_page(out: &mut impl Write, block: &Block, screenplay: &Screenplay) -> io::Result<()> {
    let Some(page) = &screenplay.title_page else {
        return Ok(());
    };
    for field in &page.fields {
        let lines = field.value.lines();
        let label = type_label(block);
        writeln!(out, "{:>4}  {:<28} {}: {}", block.index + 1, label, field.key, lines.join(" / "))?;
    }
    Ok(())
}

fn type_label(block: &Block) -> String {
    match &block.class_name {
        Some(class_name) => format!("{}.{}", block.kind, class_name),
        None => block.kind.to_string(),
    }
}

fn plain_text(block: &Block) -> &str {
    if block.text == BLANK_TEXT { "" } else { &block.text }
}

pub fn write_panels(out: &mut impl Write, storyboard: &Storyboard) -> io::Result<()> {
    for (number, panel) in storyboard.panels.iter().enumerate() {
        write_panel(out, number + 1, panel)?;
    }
    writeln!(
        out,
        "total {} across {} panel(s)",
        format_duration(storyboard.total_duration()),
        storyboard.len()
    )
}

fn write_panel(out: &mut impl Write, number: usize, panel: &Panel) -> io::Result<()> {
    let duration = panel.duration_label().unwrap_or_else(|| "-".to_string());
    writeln!(
        out,
        "{:>3}. {}  [{}]  lines {}-{}",
        number,
        panel.title,
        duration,
        panel.start_line + 1,
        panel.end_line + 1
    )?;

    let path: Vec<&str> = [&panel.nesting.act, &panel.nesting.scene, &panel.nesting.sequence]
        .into_iter()
        .filter_map(|title| title.as_deref())
        .collect();
    if !path.is_empty() {
        writeln!(out, "     in {}", path.join(" > "))?;
    }
    if let Some(url) = &panel.image_url {
        writeln!(out, "     image {}", url)?;
    }
    if let Some(url) = &panel.audio_url {
        writeln!(out, "     audio {}", url)?;
    }
    writeln!(out, "     {} block(s)", panel.blocks.len())
}

pub fn write_characters(out: &mut impl Write, screenplay: &Screenplay) -> io::Result<()> {
    let characters = &screenplay.characters;
    let width = characters.names().iter().map(|n| n.chars().count()).max().unwrap_or(0);
    for (name, count) in characters.iter() {
        let pad = width - name.chars().count();
        writeln!(out, "{}{}  {}", name, " ".repeat(pad), count)?;
    }
    Ok(())
}
