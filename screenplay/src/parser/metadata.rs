//! Panel metadata lines: `mm:ss` durations, `[i]` images and `[a]` audio.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metadata<'a> {
    /// Duration in seconds.
    Duration(u32),
    Image(&'a str),
    Audio(&'a str),
}

impl Metadata<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            Metadata::Duration(_) => "duration",
            Metadata::Image(_) => "image",
            Metadata::Audio(_) => "audio",
        }
    }
}

/// Recognize a metadata line. `text` is expected to be trimmed.
pub fn parse_metadata(text: &str) -> Option<Metadata<'_>> {
    if let Some(seconds) = parse_duration(text) {
        return Some(Metadata::Duration(seconds));
    }
    if let Some(url) = media_url(text, "[i]") {
        return Some(Metadata::Image(url));
    }
    media_url(text, "[a]").map(Metadata::Audio)
}

/// Parse `mm:ss` into seconds. Both groups must be ASCII digits; anything
/// else (including overflow) is not a duration.
pub fn parse_duration(text: &str) -> Option<u32> {
    let (minutes, seconds) = text.split_once(':')?;
    let minutes = parse_digits(minutes)?;
    let seconds = parse_digits(seconds)?;
    minutes.checked_mul(60)?.checked_add(seconds)
}

fn parse_digits(group: &str) -> Option<u32> {
    if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    group.parse().ok()
}

fn media_url<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let url = text.strip_prefix(marker)?.trim();
    if url.is_empty() { None } else { Some(url) }
}
