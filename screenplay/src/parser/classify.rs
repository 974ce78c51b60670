use crate::parser::metadata::{Metadata, parse_metadata};
use crate::unicode::{is_all_caps, is_cue_name, normalize_whitespace};

// ---------------------------------------------------------------------------
// Line preparation
// ---------------------------------------------------------------------------

/// A physical line with its `[[...]]` note spans excised.
///
/// Every rule after the note rule matches against `text`, so notes are
/// invisible to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    pub raw: &'a str,
    /// Raw text with note spans removed, then trimmed.
    pub text: String,
    /// Bodies of the excised notes, in order.
    pub notes: Vec<String>,
    /// A `[[` with no closing `]]` was left in `text`.
    pub unterminated_note: bool,
}

impl<'a> Line<'a> {
    pub fn new(raw: &'a str) -> Self {
        let mut text = String::new();
        let mut notes = Vec::new();
        let mut unterminated_note = false;
        let mut rest = raw;

        while let Some(open) = rest.find("[[") {
            let inner = &rest[open + 2..];
            let Some(close) = inner.find("]]") else {
                unterminated_note = true;
                break;
            };
            text.push_str(&rest[..open]);
            notes.push(inner[..close].trim().to_string());
            rest = &inner[close + 2..];
            // Don't leave a double space where an inline note was.
            if text.ends_with(char::is_whitespace) {
                rest = rest.trim_start();
            }
        }
        text.push_str(rest);

        Line {
            raw,
            text: text.trim().to_string(),
            notes,
            unterminated_note,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Classification results
// ---------------------------------------------------------------------------

/// Scene heading prefix, kept as the block's style tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenePrefix {
    Interior,
    Exterior,
    Establishing,
    InteriorExterior,
    IE,
    Forced,
}

impl ScenePrefix {
    pub fn class_name(self) -> &'static str {
        match self {
            ScenePrefix::Interior => "int",
            ScenePrefix::Exterior => "ext",
            ScenePrefix::Establishing => "est",
            ScenePrefix::InteriorExterior => "int-ext",
            ScenePrefix::IE => "i-e",
            ScenePrefix::Forced => "forced",
        }
    }
}

/// A character cue line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// Whitespace-normalized name used for aggregation.
    pub name: String,
    /// Trailing parenthetical such as `(V.O.)`.
    pub extension: Option<String>,
    /// Ends in `^`: part of a stacked dual-dialogue group.
    pub dual: bool,
    /// Written with the `@` power-user prefix.
    pub forced: bool,
}

impl Cue {
    /// The cue as rendered: name plus extension, markers stripped.
    pub fn display(&self) -> String {
        match &self.extension {
            Some(ext) => format!("{} {}", self.name, ext),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    Blank,
    PageBreak,
    Note(String),
    Synopsis(String),
    Section { level: u8, title: String },
    Image(String),
    Audio(String),
    Duration { seconds: u32, text: String },
    SceneHeading { prefix: ScenePrefix, text: String },
    Transition(String),
    Centered(String),
    Lyric(String),
    Cue(Cue),
    Parenthetical(String),
    Dialogue(String),
    Action(String),
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Where the assembler is within a speech turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    /// No cue is active.
    #[default]
    Closed,
    /// Stacked `^` cues are still being collected.
    Stacking,
    /// Dialogue and parentheticals attach to the active cue or group.
    Open,
}

/// The bounded context one line is classified in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Context<'n> {
    pub turn: TurnState,
    /// The following physical line, if any.
    pub next: Option<&'n str>,
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// When a rule is consulted relative to the speech turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPolicy {
    Always,
    /// Skipped while a turn is open or stacking.
    OutsideTurn,
    /// Consulted outside a turn and while cues are still stacking.
    OutsideOrStacking,
    /// Only consulted inside a turn.
    InsideTurn,
}

impl TurnPolicy {
    fn admits(self, turn: TurnState) -> bool {
        match self {
            TurnPolicy::Always => true,
            TurnPolicy::OutsideTurn => turn == TurnState::Closed,
            TurnPolicy::OutsideOrStacking => turn != TurnState::Open,
            TurnPolicy::InsideTurn => turn != TurnState::Closed,
        }
    }
}

/// One entry of the precedence-ordered classification table.
pub struct Rule {
    pub name: &'static str,
    pub policy: TurnPolicy,
    matcher: fn(&Line<'_>, &Context<'_>) -> Option<LineClass>,
}

impl Rule {
    /// Run this rule alone, ignoring its turn policy.
    pub fn apply(&self, line: &Line<'_>, ctx: &Context<'_>) -> Option<LineClass> {
        (self.matcher)(line, ctx)
    }
}

/// Classification rules in precedence order; the first match wins.
pub static RULES: &[Rule] = &[
    Rule { name: "blank", policy: TurnPolicy::Always, matcher: blank },
    Rule { name: "page_break", policy: TurnPolicy::Always, matcher: page_break },
    Rule { name: "note", policy: TurnPolicy::Always, matcher: note },
    Rule { name: "synopsis", policy: TurnPolicy::Always, matcher: synopsis },
    Rule { name: "section", policy: TurnPolicy::Always, matcher: section },
    Rule { name: "metadata", policy: TurnPolicy::OutsideTurn, matcher: metadata },
    Rule { name: "scene_heading", policy: TurnPolicy::Always, matcher: scene_heading },
    Rule { name: "transition", policy: TurnPolicy::Always, matcher: transition },
    Rule { name: "centered", policy: TurnPolicy::Always, matcher: centered },
    Rule { name: "lyric", policy: TurnPolicy::Always, matcher: lyric },
    Rule { name: "character", policy: TurnPolicy::OutsideOrStacking, matcher: character },
    Rule { name: "parenthetical", policy: TurnPolicy::InsideTurn, matcher: parenthetical },
    Rule { name: "dialogue", policy: TurnPolicy::InsideTurn, matcher: dialogue },
    Rule { name: "action", policy: TurnPolicy::Always, matcher: action },
];

/// Look up a rule by name.
pub fn rule(name: &str) -> Option<&'static Rule> {
    RULES.iter().find(|r| r.name == name)
}

/// Classify one line in context.
pub fn classify(line: &Line<'_>, ctx: &Context<'_>) -> LineClass {
    RULES
        .iter()
        .filter(|r| r.policy.admits(ctx.turn))
        .find_map(|r| r.apply(line, ctx))
        .unwrap_or_else(|| LineClass::Action(line.text.clone()))
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

const SCENE_PREFIXES: &[(&str, ScenePrefix)] = &[
    ("INT./EXT", ScenePrefix::InteriorExterior),
    ("INT/EXT", ScenePrefix::InteriorExterior),
    ("I/E", ScenePrefix::IE),
    ("INT", ScenePrefix::Interior),
    ("EXT", ScenePrefix::Exterior),
    ("EST", ScenePrefix::Establishing),
];

const TRANSITIONS: &[&str] = &[
    "FADE IN:",
    "FADE OUT.",
    "FADE TO BLACK.",
    "CUT TO:",
    "SMASH CUT TO:",
    "MATCH CUT TO:",
    "DISSOLVE TO:",
    "WIPE TO:",
    "BACK TO:",
];

fn blank(line: &Line<'_>, _ctx: &Context<'_>) -> Option<LineClass> {
    line.is_blank().then_some(LineClass::Blank)
}

fn page_break(line: &Line<'_>, _ctx: &Context<'_>) -> Option<LineClass> {
    (line.text == "===").then_some(LineClass::PageBreak)
}

fn note(line: &Line<'_>, _ctx: &Context<'_>) -> Option<LineClass> {
    if line.notes.is_empty() || !line.text.is_empty() {
        return None;
    }
    Some(LineClass::Note(line.notes.join(" ")))
}

fn synopsis(line: &Line<'_>, _ctx: &Context<'_>) -> Option<LineClass> {
    let rest = line.text.strip_prefix('=')?;
    Some(LineClass::Synopsis(rest.trim().to_string()))
}

fn section(line: &Line<'_>, _ctx: &Context<'_>) -> Option<LineClass> {
    let (level, title) = parse_section(&line.text)?;
    Some(LineClass::Section {
        level,
        title: title.to_string(),
    })
}

/// Recognize a `#`..`####` heading: the level and its trimmed text.
pub fn parse_section(text: &str) -> Option<(u8, &str)> {
    let hashes = text.bytes().take_while(|&b| b == b'#').count();
    if !(1..=4).contains(&hashes) {
        return None;
    }
    Some((hashes as u8, text[hashes..].trim()))
}

fn metadata(line: &Line<'_>, _ctx: &Context<'_>) -> Option<LineClass> {
    let class = match parse_metadata(&line.text)? {
        Metadata::Duration(seconds) => LineClass::Duration {
            seconds,
            text: line.text.clone(),
        },
        Metadata::Image(url) => LineClass::Image(url.to_string()),
        Metadata::Audio(url) => LineClass::Audio(url.to_string()),
    };
    Some(class)
}

fn scene_heading(line: &Line<'_>, _ctx: &Context<'_>) -> Option<LineClass> {
    let text = line.text.as_str();

    if let Some(rest) = text.strip_prefix('.') {
        if rest.starts_with('.') || rest.trim().is_empty() {
            return None;
        }
        return Some(LineClass::SceneHeading {
            prefix: ScenePrefix::Forced,
            text: rest.trim().to_string(),
        });
    }

    for &(marker, prefix) in SCENE_PREFIXES {
        let Some(head) = text.get(..marker.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(marker) {
            continue;
        }
        let rest = &text[marker.len()..];
        let rest = rest.strip_prefix('.').unwrap_or(rest);
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return Some(LineClass::SceneHeading {
                prefix,
                text: rest.trim().to_string(),
            });
        }
    }
    None
}

fn transition(line: &Line<'_>, _ctx: &Context<'_>) -> Option<LineClass> {
    let text = line.text.as_str();

    if let Some(rest) = text.strip_prefix('>') {
        if text.ends_with('<') || rest.trim().is_empty() {
            return None;
        }
        return Some(LineClass::Transition(rest.trim().to_string()));
    }

    let known = TRANSITIONS.contains(&text);
    let generalized = is_all_caps(text) && text.ends_with(" TO:");
    (known || generalized).then(|| LineClass::Transition(text.to_string()))
}

fn centered(line: &Line<'_>, _ctx: &Context<'_>) -> Option<LineClass> {
    let inner = line.text.strip_prefix('>')?.strip_suffix('<')?;
    Some(LineClass::Centered(inner.trim().to_string()))
}

fn lyric(line: &Line<'_>, _ctx: &Context<'_>) -> Option<LineClass> {
    let rest = line.text.strip_prefix('~')?;
    Some(LineClass::Lyric(rest.trim().to_string()))
}

fn character(line: &Line<'_>, ctx: &Context<'_>) -> Option<LineClass> {
    let cue = parse_cue(&line.text)?;
    // A cue with nothing directly under it is not a cue. The one exception
    // is a `^` cue joining a stack, which then closes without dialogue.
    let has_next = ctx.next.is_some_and(|next| !next.trim().is_empty());
    let joins_stack = cue.dual && ctx.turn == TurnState::Stacking;
    (has_next || joins_stack).then_some(LineClass::Cue(cue))
}

/// Parse a cue line: bare uppercase names or `@`-prefixed names, with an
/// optional `(EXT)` extension and an optional trailing `^`.
pub fn parse_cue(text: &str) -> Option<Cue> {
    let (body, dual) = match text.strip_suffix('^') {
        Some(body) => (body.trim_end(), true),
        None => (text, false),
    };

    let (body, forced) = match body.strip_prefix('@') {
        Some(body) => (body.trim(), true),
        None => (body, false),
    };

    let (name, extension) = split_extension(body);
    if name.is_empty() {
        return None;
    }
    if !forced && !is_cue_name(name) {
        return None;
    }

    Some(Cue {
        name: normalize_whitespace(name),
        extension: extension.map(str::to_string),
        dual,
        forced,
    })
}

fn split_extension(body: &str) -> (&str, Option<&str>) {
    if body.ends_with(')') {
        if let Some(open) = body.rfind('(') {
            let name = body[..open].trim_end();
            if !name.is_empty() {
                return (name, Some(&body[open..]));
            }
        }
    }
    (body, None)
}

fn parenthetical(line: &Line<'_>, _ctx: &Context<'_>) -> Option<LineClass> {
    let text = &line.text;
    (text.len() >= 2 && text.starts_with('(') && text.ends_with(')'))
        .then(|| LineClass::Parenthetical(text.clone()))
}

fn dialogue(line: &Line<'_>, _ctx: &Context<'_>) -> Option<LineClass> {
    Some(LineClass::Dialogue(line.text.clone()))
}

fn action(line: &Line<'_>, _ctx: &Context<'_>) -> Option<LineClass> {
    Some(LineClass::Action(line.text.clone()))
}
