//! Unicode-aware name matching shared by the line classifier and the
//! title-page parser.

/// True for letters allowed in a bare character cue.
///
/// Uppercase letters always qualify. Letters from scripts without case
/// (Han, Hiragana, Hangul, ...) have no lowercase form to conflict with
/// action text, so they qualify as well.
pub fn is_cue_letter(c: char) -> bool {
    if c.is_uppercase() {
        return true;
    }
    c.is_alphabetic() && !c.is_lowercase() && is_caseless(c)
}

fn is_caseless(c: char) -> bool {
    let mut lower = c.to_lowercase();
    let mut upper = c.to_uppercase();
    lower.next() == Some(c)
        && lower.next().is_none()
        && upper.next() == Some(c)
        && upper.next().is_none()
}

/// Whether `name` can stand as a bare (non-`@`) character cue.
///
/// The first character must be a cue letter; digits and symbols at the start
/// are rejected so numbered action lines never turn into cues. The rest may
/// contain cue letters, digits, apostrophes, hyphens, spaces and tabs.
pub fn is_cue_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_cue_letter(first) => {}
        _ => return false,
    }
    chars.all(|c| {
        is_cue_letter(c) || c.is_numeric() || matches!(c, '\'' | '\u{2019}' | '-' | ' ' | '\t')
    })
}

/// True when the text has at least one uppercase letter and no lowercase ones.
pub fn is_all_caps(text: &str) -> bool {
    !text.chars().any(char::is_lowercase) && text.chars().any(char::is_uppercase)
}

/// Strip leading/trailing whitespace and collapse interior runs to one space.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
