pub mod markup;

use std::fmt;

use serde::Serialize;

/// The rendering category of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    SceneHeading,
    Character,
    Parenthetical,
    Dialogue,
    DualDialogueCharacter,
    Action,
    Transition,
    Centered,
    Lyric,
    Synopsis,
    Note,
    PageBreak,
    PageNumber,
    TitlePage,
    Image,
    Audio,
    /// A `#`..`####` heading line as shown in the flat preview.
    Section,
}

impl BlockType {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::SceneHeading => "scene_heading",
            BlockType::Character => "character",
            BlockType::Parenthetical => "parenthetical",
            BlockType::Dialogue => "dialogue",
            BlockType::DualDialogueCharacter => "dual_dialogue_character",
            BlockType::Action => "action",
            BlockType::Transition => "transition",
            BlockType::Centered => "centered",
            BlockType::Lyric => "lyric",
            BlockType::Synopsis => "synopsis",
            BlockType::Note => "note",
            BlockType::PageBreak => "page_break",
            BlockType::PageNumber => "page_number",
            BlockType::TitlePage => "title_page",
            BlockType::Image => "image",
            BlockType::Audio => "audio",
            BlockType::Section => "section",
        }
    }

    /// Blocks whose `text` is already HTML markup rather than plain text.
    pub fn is_markup(self) -> bool {
        matches!(
            self,
            BlockType::Image
                | BlockType::Audio
                | BlockType::TitlePage
                | BlockType::PageBreak
                | BlockType::PageNumber
        )
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed unit of the screenplay preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Stable identity derived from the source position, unique within one stream.
    pub id: String,
    /// 0-based source line the block was produced from.
    pub index: usize,
    #[serde(rename = "type")]
    pub kind: BlockType,
    /// Plain rendering text, or HTML markup when `kind.is_markup()`.
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Names owning a cue, parenthetical or dialogue line. Every member of a
    /// stacked dual-dialogue group owns the shared lines.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub speakers: Vec<String>,
}

impl Block {
    pub fn new(index: usize, kind: BlockType, text: impl Into<String>) -> Self {
        Block {
            id: format!("line-{}", index),
            index,
            kind,
            text: text.into(),
            class_name: None,
            speakers: Vec::new(),
        }
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_speakers(mut self, speakers: Vec<String>) -> Self {
        self.speakers = speakers;
        self
    }

    /// Give a secondary block from the same line its own id.
    pub fn tagged(mut self, tag: &str) -> Self {
        self.id = format!("line-{}-{}", self.index, tag);
        self
    }
}
