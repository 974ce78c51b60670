pub mod assemble;
pub mod classify;
pub mod error;
pub mod metadata;
pub mod source;

pub use error::{Notice, NoticeKind};

use tracing::debug;

use crate::Screenplay;
use crate::block::Block;
use crate::hierarchy::{self, Storyboard};
use crate::parser::assemble::Assembler;
use crate::parser::source::{SourceLine, split_lines};
use crate::title_page::{self, TitlePage, TitlePageScan};

/// Callback run for every dialogue block as it is emitted.
pub type DialogueHook<'a> = Box<dyn FnMut(&Block) + 'a>;

/// Parser entry point.
pub struct Parser<'a> {
    source: &'a str,
    file_id: usize,
    on_dialogue: DialogueHook<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, file_id: usize) -> Self {
        Parser {
            source,
            file_id,
            on_dialogue: Box::new(|_: &Block| {}),
        }
    }

    /// Observe each dialogue block (its `speakers` name the owning cues).
    pub fn on_dialogue(mut self, hook: impl FnMut(&Block) + 'a) -> Self {
        self.on_dialogue = Box::new(hook);
        self
    }

    /// Parse the source into the flat preview block stream.
    pub fn parse(&mut self) -> Screenplay {
        let lines = split_lines(self.source);
        let (title_page, body, mut notices) = self.split_title_page(&lines);

        let mut blocks = Vec::new();
        if let Some(page) = &title_page {
            blocks.push(page.to_block());
        }

        let assembled = Assembler::new(self.file_id, &mut *self.on_dialogue).run(body);
        blocks.extend(assembled.blocks);
        notices.extend(assembled.notices);

        debug!(
            lines = lines.len(),
            blocks = blocks.len(),
            characters = assembled.characters.len(),
            title_page = title_page.is_some(),
            "parsed screenplay"
        );

        Screenplay {
            title_page,
            blocks,
            characters: assembled.characters,
            notices,
        }
    }

    /// Group the source into storyboard panels.
    pub fn storyboard(&self) -> Storyboard {
        let lines = split_lines(self.source);
        let (_, body, _) = self.split_title_page(&lines);
        let storyboard = hierarchy::build_storyboard(body, self.file_id);
        debug!(
            panels = storyboard.len(),
            total_seconds = storyboard.total_duration(),
            "built storyboard"
        );
        storyboard
    }

    /// Separate a leading title page from the lines left to classify.
    fn split_title_page<'l, 's>(
        &self,
        lines: &'l [SourceLine<'s>],
    ) -> (Option<TitlePage>, &'l [SourceLine<'s>], Vec<Notice>) {
        match title_page::scan(lines) {
            TitlePageScan::Found { page, consumed } => (Some(page), &lines[consumed..], Vec::new()),
            TitlePageScan::Unterminated { line } => {
                debug!(line, "title page keys without `===`; treating as body text");
                let notice = Notice::new(
                    NoticeKind::UnterminatedTitlePage,
                    "title page is not closed by `===` and is read as screenplay text",
                    &lines[line],
                    self.file_id,
                );
                (None, lines, vec![notice])
            }
            TitlePageScan::Absent => (None, lines, Vec::new()),
        }
    }
}
