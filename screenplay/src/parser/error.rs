use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};
use serde::Serialize;

use crate::parser::source::SourceLine;

/// What a [`Notice`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// A duration, image or audio line outside any open panel.
    OrphanedMetadata,
    /// A second duration, image or audio line in the same panel.
    IgnoredMetadata,
    /// `[[` without a closing `]]` on the same line.
    UnterminatedNote,
    /// Title page keys that never reached a `===` line.
    UnterminatedTitlePage,
    /// Stacked `^` cues closed by something other than dialogue.
    DanglingDualDialogue,
}

impl NoticeKind {
    pub fn severity(self) -> Severity {
        match self {
            NoticeKind::DanglingDualDialogue | NoticeKind::UnterminatedTitlePage => Severity::Note,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NoticeKind::OrphanedMetadata => "orphaned-metadata",
            NoticeKind::IgnoredMetadata => "ignored-metadata",
            NoticeKind::UnterminatedNote => "unterminated-note",
            NoticeKind::UnterminatedTitlePage => "unterminated-title-page",
            NoticeKind::DanglingDualDialogue => "dangling-dual-dialogue",
        };
        f.write_str(name)
    }
}

/// An informational diagnostic with source location.
///
/// Parsing never fails; notices only point at constructs that were resolved
/// by a fallback rule so tooling can surface them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub span: Range<usize>,
    /// 0-based source line.
    pub line: usize,
    pub file_id: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl Notice {
    pub fn new(
        kind: NoticeKind,
        message: impl Into<String>,
        line: &SourceLine<'_>,
        file_id: usize,
    ) -> Self {
        Notice {
            kind,
            message: message.into(),
            span: line.span.clone(),
            line: line.index,
            file_id,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::new(self.kind.severity())
            .with_message(&self.message)
            .with_code(self.kind.to_string())
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}
