use serde::Serialize;

use crate::block::Block;
use crate::parser::Notice;

/// Title used when a heading has no text of its own.
pub const UNTITLED: &str = "untitled";

/// Titles of the act, scene and sequence open when a panel was opened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Nesting {
    pub act: Option<String>,
    pub scene: Option<String>,
    pub sequence: Option<String>,
}

impl Nesting {
    pub fn is_empty(&self) -> bool {
        self.act.is_none() && self.scene.is_none() && self.sequence.is_none()
    }
}

/// A level-4 (`####`) storyboard panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    /// Display title: heading without its `Panel N:` prefix, or `untitled`.
    pub title: String,
    /// Heading text as written.
    pub heading: String,
    pub start_line: usize,
    pub end_line: usize,
    /// Seconds, from the first `mm:ss` line.
    pub duration: Option<u32>,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    /// The panel's own block stream.
    pub blocks: Vec<Block>,
    pub nesting: Nesting,
    /// Raw body text, for consumers that render the source directly.
    pub snippet: String,
}

impl Panel {
    /// `m:ss` label for the duration, if any.
    pub fn duration_label(&self) -> Option<String> {
        self.duration.map(format_duration)
    }

    /// Whether the panel has nothing to show.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
            && self.duration.is_none()
            && self.image_url.is_none()
            && self.audio_url.is_none()
    }
}

/// Panels in source order plus the notices raised while grouping them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Storyboard {
    pub panels: Vec<Panel>,
    pub notices: Vec<Notice>,
}

impl Storyboard {
    /// Sum of all explicit panel durations, in seconds.
    pub fn total_duration(&self) -> u32 {
        self.panels
            .iter()
            .filter_map(|p| p.duration)
            .fold(0u32, u32::saturating_add)
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}

/// Format seconds as `m:ss`.
pub fn format_duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Normalize a panel heading: strip a leading `Panel N:` / `Panel N-` and
/// fall back to `untitled`.
pub fn panel_title(heading: &str) -> String {
    let trimmed = heading.trim();
    let title = strip_panel_prefix(trimmed).unwrap_or(trimmed).trim();
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title.to_string()
    }
}

fn strip_panel_prefix(text: &str) -> Option<&str> {
    let word = text.get(..5)?;
    if !word.eq_ignore_ascii_case("panel") {
        return None;
    }
    let rest = text[5..].trim_start();
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = rest[digits..].trim_start();
    rest.strip_prefix(':').or_else(|| rest.strip_prefix('-'))
}

/// Title for act, scene and sequence headings.
pub fn heading_title(heading: &str) -> String {
    let trimmed = heading.trim();
    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    }
}
