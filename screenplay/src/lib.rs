pub mod block;
pub mod characters;
pub mod hierarchy;
pub mod parser;
pub mod record;
pub mod render;
pub mod session;
pub mod title_page;
pub mod unicode;

use serde::Serialize;

use crate::block::Block;
use crate::characters::CharacterAggregate;
use crate::hierarchy::Storyboard;
use crate::parser::{Notice, Parser};
use crate::title_page::TitlePage;

/// A parsed screenplay: the flat block stream used by the preview plus the
/// character aggregate collected while assembling it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Screenplay {
    /// Title page fields, when the document opens with a `===`-terminated block.
    pub title_page: Option<TitlePage>,
    /// Blocks in source order.
    pub blocks: Vec<Block>,
    /// Speaking characters (first-seen order) and their dialogue line counts.
    #[serde(flatten)]
    pub characters: CharacterAggregate,
    /// Informational diagnostics. Never fatal.
    pub notices: Vec<Notice>,
}

/// Both derived views of one source string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub screenplay: Screenplay,
    pub storyboard: Storyboard,
}

/// Parse `source` into the screenplay preview and the storyboard panel list.
pub fn analyze(source: &str) -> Analysis {
    let mut parser = Parser::new(source, 0);
    let screenplay = parser.parse();
    let storyboard = parser.storyboard();
    Analysis {
        screenplay,
        storyboard,
    }
}
