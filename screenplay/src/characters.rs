use std::collections::BTreeMap;

use serde::Serialize;

/// Distinct speaking characters in first-seen order, with the number of
/// dialogue lines attributed to each.
///
/// Rebuilt from scratch on every parse. A name is only recorded once it owns
/// at least one dialogue line, so every count is >= 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterAggregate {
    characters: Vec<String>,
    character_line_counts: BTreeMap<String, usize>,
}

impl CharacterAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute one dialogue line to `name`.
    pub fn record(&mut self, name: &str) {
        match self.character_line_counts.get_mut(name) {
            Some(count) => *count += 1,
            None => {
                self.characters.push(name.to_string());
                self.character_line_counts.insert(name.to_string(), 1);
            }
        }
    }

    /// Names in order of their first dialogue line.
    pub fn names(&self) -> &[String] {
        &self.characters
    }

    /// Dialogue line count for `name` (0 when the name never spoke).
    pub fn line_count(&self, name: &str) -> usize {
        self.character_line_counts.get(name).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &BTreeMap<String, usize> {
        &self.character_line_counts
    }

    /// `(name, count)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.characters
            .iter()
            .map(|name| (name.as_str(), self.line_count(name)))
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}
