use serde::Serialize;

use crate::block::{Block, BlockType, markup};
use crate::parser::source::SourceLine;
use crate::unicode::normalize_whitespace;

/// Recognized title page keys, in their normalized form.
pub const TITLE_PAGE_KEYS: &[&str] = &[
    "title",
    "credit",
    "author",
    "authors",
    "writer",
    "writers",
    "written by",
    "screenplay by",
    "teleplay by",
    "story by",
    "adaptation by",
    "source",
    "based on",
    "based on characters by",
    "notes",
    "draft",
    "draft date",
    "draft #",
    "revision",
    "revision date",
    "revision color",
    "date",
    "contact",
    "copyright",
    "wga",
    "wga registration",
    "registration",
    "registration #",
    "series",
    "episode",
    "episode title",
    "showrunner",
    "production",
    "production company",
];

/// A field value: one line, or several for blocks like Contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Lines(Vec<String>),
}

impl FieldValue {
    fn from_lines(mut lines: Vec<String>) -> Self {
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        match lines.len() {
            0 => FieldValue::Single(String::new()),
            1 => FieldValue::Single(lines.remove(0)),
            _ => FieldValue::Lines(lines),
        }
    }

    pub fn lines(&self) -> Vec<&str> {
        match self {
            FieldValue::Single(line) => vec![line.as_str()],
            FieldValue::Lines(lines) => lines.iter().map(String::as_str).collect(),
        }
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            FieldValue::Single(line) => Some(line),
            FieldValue::Lines(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitlePageField {
    pub key: String,
    pub value: FieldValue,
}

/// The leading key/value block of a document, closed by `===`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitlePage {
    pub start_line: usize,
    /// The terminating `===` line.
    pub end_line: usize,
    pub fields: Vec<TitlePageField>,
}

impl TitlePage {
    /// First value stored under `key` (matched the same way keys are read).
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        let key = recognize_key(key)?;
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    /// The preview block standing in for the whole title page.
    pub fn to_block(&self) -> Block {
        Block::new(self.start_line, BlockType::TitlePage, markup::title_page(self))
    }
}

/// Result of looking for a title page at the top of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitlePageScan {
    /// A title page ending at `===`; `consumed` lines are excluded from
    /// further classification.
    Found { page: TitlePage, consumed: usize },
    /// Keys were read but the block ended some other way. `line` is the
    /// position of the first key.
    Unterminated { line: usize },
    Absent,
}

/// Map a raw key to its normalized form if it is a recognized title page key.
///
/// Matching is case-insensitive and tolerant of extra inner whitespace,
/// including none at all (`Draft#`).
pub fn recognize_key(raw: &str) -> Option<&'static str> {
    let normalized = normalize_whitespace(&raw.to_lowercase());
    let compact: String = normalized.chars().filter(|c| !c.is_whitespace()).collect();
    TITLE_PAGE_KEYS.iter().copied().find(|key| {
        *key == normalized || key.chars().filter(|c| !c.is_whitespace()).eq(compact.chars())
    })
}

/// Split `key: value` (the colon is optional when there is no value).
fn split_key_line(text: &str) -> Option<(&'static str, &str)> {
    let trimmed = text.trim();
    match trimmed.split_once(':') {
        Some((key, value)) => recognize_key(key).map(|key| (key, value.trim())),
        None => recognize_key(trimmed).map(|key| (key, "")),
    }
}

/// Look for a title page at the start of `lines`.
pub fn scan(lines: &[SourceLine<'_>]) -> TitlePageScan {
    let Some(first) = lines.iter().position(|l| !l.is_blank()) else {
        return TitlePageScan::Absent;
    };

    let mut fields: Vec<(&'static str, Vec<String>)> = Vec::new();

    for (pos, line) in lines.iter().enumerate().skip(first) {
        if line.text.trim() == "===" {
            if fields.is_empty() {
                return TitlePageScan::Absent;
            }
            let page = TitlePage {
                start_line: lines[first].index,
                end_line: line.index,
                fields: fields
                    .into_iter()
                    .map(|(key, values)| TitlePageField {
                        key: key.to_string(),
                        value: FieldValue::from_lines(values),
                    })
                    .collect(),
            };
            return TitlePageScan::Found {
                page,
                consumed: pos + 1,
            };
        }

        let indented = line.text.starts_with(char::is_whitespace);
        if let (true, Some((_, values))) = (indented, fields.last_mut()) {
            values.push(line.text.trim().to_string());
            continue;
        }

        match split_key_line(line.text) {
            Some((key, value)) => {
                let values = if value.is_empty() {
                    Vec::new()
                } else {
                    vec![value.to_string()]
                };
                fields.push((key, values));
            }
            None => break,
        }
    }

    if fields.is_empty() {
        TitlePageScan::Absent
    } else {
        TitlePageScan::Unterminated { line: first }
    }
}
