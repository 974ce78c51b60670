pub mod panel;

pub use panel::{Nesting, Panel, Storyboard, UNTITLED, format_duration, panel_title};

use tracing::trace;

use crate::block::Block;
use crate::parser::assemble::Assembler;
use crate::parser::classify::{Line, parse_section};
use crate::parser::error::{Notice, NoticeKind};
use crate::parser::metadata::{Metadata, parse_metadata};
use crate::parser::source::{SourceLine, trim_blank_edges};

/// Heading level of an act (`#`).
pub const ACT_LEVEL: u8 = 1;
/// Heading level of a scene (`##`).
pub const SCENE_LEVEL: u8 = 2;
/// Heading level of a sequence (`###`).
pub const SEQUENCE_LEVEL: u8 = 3;
/// Heading level of a panel (`####`).
pub const PANEL_LEVEL: u8 = 4;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Group lines into the Act → Scene → Sequence → Panel hierarchy and return
/// the finalized panels.
pub fn build_storyboard(lines: &[SourceLine<'_>], file_id: usize) -> Storyboard {
    let mut state = HierarchyState::new(file_id);
    for line in lines {
        state.process_line(line);
    }
    let end = lines.last().map_or(0, |l| l.index);
    state.finalize(end)
}

// ---------------------------------------------------------------------------
// Build state
// ---------------------------------------------------------------------------

struct HierarchyState<'a> {
    file_id: usize,
    /// Open headings, shallowest first. Innermost = current scope.
    node_stack: Vec<NodeBuilder<'a>>,
    panels: Vec<Panel>,
    notices: Vec<Notice>,
}

struct NodeBuilder<'a> {
    level: u8,
    heading: String,
    start_line: usize,
    nesting: Nesting,
    /// Every line after the heading, for the snippet.
    body: Vec<SourceLine<'a>>,
    /// Lines handed to the assembler.
    content: Vec<SourceLine<'a>>,
    duration: Option<u32>,
    image_url: Option<String>,
    audio_url: Option<String>,
}

impl<'a> NodeBuilder<'a> {
    fn new(level: u8, heading: &str, start_line: usize, nesting: Nesting) -> Self {
        NodeBuilder {
            level,
            heading: heading.to_string(),
            start_line,
            nesting,
            body: Vec::new(),
            content: Vec::new(),
            duration: None,
            image_url: None,
            audio_url: None,
        }
    }

    /// Take a body line. Returns a notice when metadata had to be dropped.
    fn absorb(&mut self, source: &SourceLine<'a>, line: &Line<'_>, file_id: usize) -> Option<Notice> {
        self.body.push(source.clone());

        let Some(metadata) = parse_metadata(&line.text) else {
            self.content.push(source.clone());
            return None;
        };

        let accepted = match metadata {
            Metadata::Duration(seconds) => set_once(&mut self.duration, seconds),
            Metadata::Image(url) => set_once(&mut self.image_url, url.to_string()),
            Metadata::Audio(url) => set_once(&mut self.audio_url, url.to_string()),
        };
        if accepted {
            return None;
        }
        Some(
            Notice::new(
                NoticeKind::IgnoredMetadata,
                format!("panel already has a {}; this line is ignored", metadata.label()),
                source,
                file_id,
            )
            .with_note("the first duration, image and audio line of a panel wins"),
        )
    }

    fn into_panel(self, end_line: usize, file_id: usize) -> Panel {
        let mut no_hook = |_: &Block| {};
        let assembled = Assembler::new(file_id, &mut no_hook).run(trim_blank_edges(&self.content));
        let snippet = trim_blank_edges(&self.body)
            .iter()
            .map(|l| l.text)
            .collect::<Vec<_>>()
            .join("\n");

        Panel {
            title: panel_title(&self.heading),
            heading: self.heading,
            start_line: self.start_line,
            end_line,
            duration: self.duration,
            image_url: self.image_url,
            audio_url: self.audio_url,
            blocks: assembled.blocks,
            nesting: self.nesting,
            snippet,
        }
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(value);
    true
}

impl<'a> HierarchyState<'a> {
    fn new(file_id: usize) -> Self {
        HierarchyState {
            file_id,
            node_stack: Vec::new(),
            panels: Vec::new(),
            notices: Vec::new(),
        }
    }

    fn process_line(&mut self, source: &SourceLine<'a>) {
        let line = Line::new(source.text);

        if let Some((level, heading)) = parse_section(&line.text) {
            // A heading ends the body of every open node at its level or deeper.
            self.close_nodes_to_level(level, source.index.saturating_sub(1));
            let nesting = self.current_nesting();
            self.node_stack
                .push(NodeBuilder::new(level, heading, source.index, nesting));
            return;
        }

        let file_id = self.file_id;
        match self.node_stack.last_mut().filter(|n| n.level == PANEL_LEVEL) {
            Some(panel) => {
                if let Some(notice) = panel.absorb(source, &line, file_id) {
                    self.notices.push(notice);
                }
            }
            None => {
                if let Some(metadata) = parse_metadata(&line.text) {
                    self.notices.push(
                        Notice::new(
                            NoticeKind::OrphanedMetadata,
                            format!("{} line outside any panel is ignored", metadata.label()),
                            source,
                            file_id,
                        )
                        .with_note("durations, images and audio attach to `####` panels only"),
                    );
                }
            }
        }
    }

    /// Titles of the act, scene and sequence currently open.
    fn current_nesting(&self) -> Nesting {
        let mut nesting = Nesting::default();
        for node in &self.node_stack {
            let title = Some(panel::heading_title(&node.heading));
            match node.level {
                ACT_LEVEL => nesting.act = title,
                SCENE_LEVEL => nesting.scene = title,
                SEQUENCE_LEVEL => nesting.sequence = title,
                _ => {}
            }
        }
        nesting
    }

    /// Pop and close open nodes until the innermost one is shallower than `new_level`.
    fn close_nodes_to_level(&mut self, new_level: u8, end_line: usize) {
        while let Some(top) = self.node_stack.pop() {
            if top.level < new_level {
                self.node_stack.push(top);
                break;
            }
            self.close_node(top, end_line);
        }
    }

    fn close_node(&mut self, node: NodeBuilder<'a>, end_line: usize) {
        if node.level != PANEL_LEVEL {
            return;
        }
        let panel = node.into_panel(end_line, self.file_id);
        trace!(
            title = %panel.title,
            start = panel.start_line,
            end = panel.end_line,
            blocks = panel.blocks.len(),
            "closed panel"
        );
        self.panels.push(panel);
    }

    fn finalize(mut self, end_line: usize) -> Storyboard {
        self.close_nodes_to_level(ACT_LEVEL, end_line);
        Storyboard {
            panels: self.panels,
            notices: self.notices,
        }
    }
}
