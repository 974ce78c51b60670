use crate::block::{Block, BlockType, markup};
use crate::characters::CharacterAggregate;
use crate::parser::classify::{Context, Cue, Line, LineClass, TurnState, classify};
use crate::parser::error::{Notice, NoticeKind};
use crate::parser::source::SourceLine;

/// Rendering text of a blank line.
pub const BLANK_TEXT: &str = "\u{00A0}";

/// Output of one assembler run.
#[derive(Debug, Default)]
pub struct Assembled {
    pub blocks: Vec<Block>,
    pub characters: CharacterAggregate,
    pub notices: Vec<Notice>,
}

/// The cue (or stacked group of cues) that owns the current speech turn.
struct Turn {
    speakers: Vec<String>,
    state: TurnState,
    dual: bool,
    /// A dialogue line has been attributed to this turn.
    spoken: bool,
    /// Line of the first cue, for diagnostics.
    opened_at: usize,
}

/// Drives the line classifier over a run of lines, tracking speech turns,
/// page numbers and the character aggregate.
pub struct Assembler<'h> {
    file_id: usize,
    blocks: Vec<Block>,
    characters: CharacterAggregate,
    notices: Vec<Notice>,
    turn: Option<Turn>,
    page: u32,
    on_dialogue: &'h mut dyn FnMut(&Block),
}

impl<'h> Assembler<'h> {
    pub fn new(file_id: usize, on_dialogue: &'h mut dyn FnMut(&Block)) -> Self {
        Assembler {
            file_id,
            blocks: Vec::new(),
            characters: CharacterAggregate::new(),
            notices: Vec::new(),
            turn: None,
            page: 1,
            on_dialogue,
        }
    }

    pub fn run(mut self, lines: &[SourceLine<'_>]) -> Assembled {
        for (pos, source) in lines.iter().enumerate() {
            let line = Line::new(source.text);
            if line.unterminated_note {
                self.notices.push(
                    Notice::new(
                        NoticeKind::UnterminatedNote,
                        "note opened with `[[` is never closed",
                        source,
                        self.file_id,
                    )
                    .with_note("the text is kept as written"),
                );
            }

            let ctx = Context {
                turn: self.turn_state(),
                next: lines.get(pos + 1).map(|l| l.text),
            };
            let class = classify(&line, &ctx);
            self.emit(source, class, lines);
        }

        self.close_turn(lines);

        Assembled {
            blocks: self.blocks,
            characters: self.characters,
            notices: self.notices,
        }
    }

    fn turn_state(&self) -> TurnState {
        self.turn.as_ref().map_or(TurnState::Closed, |t| t.state)
    }

    fn emit(&mut self, source: &SourceLine<'_>, class: LineClass, lines: &[SourceLine<'_>]) {
        let index = source.index;

        match class {
            LineClass::Blank => {
                self.close_turn(lines);
                self.push(Block::new(index, BlockType::Action, BLANK_TEXT));
            }
            LineClass::PageBreak => {
                self.close_turn(lines);
                self.page += 1;
                self.push(Block::new(index, BlockType::PageBreak, markup::page_break()));
                self.push(
                    Block::new(index, BlockType::PageNumber, markup::page_number(self.page))
                        .tagged("page"),
                );
            }
            // Notes are transparent to an open turn.
            LineClass::Note(text) => self.push(Block::new(index, BlockType::Note, text)),
            LineClass::Lyric(text) => self.push(Block::new(index, BlockType::Lyric, text)),
            LineClass::Synopsis(text) => {
                self.close_turn(lines);
                self.push(Block::new(index, BlockType::Synopsis, text));
            }
            LineClass::Section { level, title } => {
                self.close_turn(lines);
                self.push(Block::new(index, BlockType::Section, title).with_class(level_class(level)));
            }
            LineClass::Image(url) => {
                self.close_turn(lines);
                self.push(Block::new(index, BlockType::Image, markup::image(&url)));
            }
            LineClass::Audio(url) => {
                self.close_turn(lines);
                self.push(Block::new(index, BlockType::Audio, markup::audio(&url)));
            }
            LineClass::Duration { text, .. } => {
                self.close_turn(lines);
                self.push(Block::new(index, BlockType::Action, text).with_class("duration"));
            }
            LineClass::SceneHeading { prefix, text } => {
                self.close_turn(lines);
                self.push(
                    Block::new(index, BlockType::SceneHeading, text).with_class(prefix.class_name()),
                );
            }
            LineClass::Transition(text) => {
                self.close_turn(lines);
                self.push(Block::new(index, BlockType::Transition, text));
            }
            LineClass::Centered(text) => {
                self.close_turn(lines);
                self.push(Block::new(index, BlockType::Centered, text));
            }
            LineClass::Cue(cue) => self.cue(index, cue, lines),
            LineClass::Parenthetical(text) => {
                let block = self.speech(index, BlockType::Parenthetical, text);
                self.push(block);
            }
            LineClass::Dialogue(text) => {
                let block = self.speech(index, BlockType::Dialogue, text);
                for speaker in &block.speakers {
                    self.characters.record(speaker);
                }
                (self.on_dialogue)(&block);
                self.push(block);
            }
            LineClass::Action(text) => {
                self.close_turn(lines);
                self.push(Block::new(index, BlockType::Action, text));
            }
        }
    }

    fn cue(&mut self, index: usize, cue: Cue, lines: &[SourceLine<'_>]) {
        let text = cue.display();

        // A cue arriving while `^` cues are stacking joins the group; a cue
        // without `^` closes it.
        if let Some(turn) = self.turn.as_mut().filter(|t| t.state == TurnState::Stacking) {
            if !turn.speakers.contains(&cue.name) {
                turn.speakers.push(cue.name.clone());
            }
            if !cue.dual {
                turn.state = TurnState::Open;
            }
            self.push(
                Block::new(index, BlockType::DualDialogueCharacter, text)
                    .with_speakers(vec![cue.name]),
            );
            return;
        }

        self.close_turn(lines);
        let kind = if cue.dual {
            BlockType::DualDialogueCharacter
        } else {
            BlockType::Character
        };
        self.turn = Some(Turn {
            speakers: vec![cue.name.clone()],
            state: if cue.dual {
                TurnState::Stacking
            } else {
                TurnState::Open
            },
            dual: cue.dual,
            spoken: false,
            opened_at: index,
        });
        self.push(Block::new(index, kind, text).with_speakers(vec![cue.name]));
    }

    /// Build a parenthetical/dialogue block owned by the active turn.
    fn speech(&mut self, index: usize, kind: BlockType, text: String) -> Block {
        let mut block = Block::new(index, kind, text);
        if let Some(turn) = self.turn.as_mut() {
            turn.state = TurnState::Open;
            turn.spoken |= kind == BlockType::Dialogue;
            block = block.with_speakers(turn.speakers.clone());
            if turn.dual {
                block = block.with_class("dual-dialogue");
            }
        }
        block
    }

    fn close_turn(&mut self, lines: &[SourceLine<'_>]) {
        let Some(turn) = self.turn.take() else {
            return;
        };
        if !turn.dual || turn.spoken {
            return;
        }
        let Some(source) = lines.iter().find(|l| l.index == turn.opened_at) else {
            return;
        };
        self.notices.push(
            Notice::new(
                NoticeKind::DanglingDualDialogue,
                format!(
                    "dual-dialogue group {} has no dialogue",
                    turn.speakers.join(", ")
                ),
                source,
                self.file_id,
            )
            .with_note("stacked `^` cues must be followed directly by their dialogue"),
        );
    }

    fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }
}

/// Style tag for a heading line of the given level.
pub fn level_class(level: u8) -> &'static str {
    match level {
        1 => "act",
        2 => "scene",
        3 => "sequence",
        _ => "panel",
    }
}
