use std::ops::Range;

/// One physical line of the source, without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// 0-based line number.
    pub index: usize,
    pub text: &'a str,
    /// Byte span of `text` within the source.
    pub span: Range<usize>,
}

impl SourceLine<'_> {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Split source text into physical lines, accepting `\n` and `\r\n`.
/// A trailing newline does not open an extra empty line.
pub fn split_lines(source: &str) -> Vec<SourceLine<'_>> {
    let mut lines = Vec::new();
    if source.is_empty() {
        return lines;
    }

    let body = source.strip_suffix('\n').unwrap_or(source);
    let mut start = 0;
    for (index, raw) in body.split('\n').enumerate() {
        let text = raw.strip_suffix('\r').unwrap_or(raw);
        lines.push(SourceLine {
            index,
            text,
            span: start..start + text.len(),
        });
        start += raw.len() + 1;
    }
    lines
}

/// Drop blank lines from both ends of a run of lines.
pub fn trim_blank_edges<'s, 'a>(lines: &'s [SourceLine<'a>]) -> &'s [SourceLine<'a>] {
    let start = lines
        .iter()
        .position(|l| !l.is_blank())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.is_blank())
        .map_or(start, |p| p + 1);
    &lines[start..end]
}
