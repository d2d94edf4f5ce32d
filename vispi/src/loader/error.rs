use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};

/// Problems found while loading a saved workspace.
#[derive(Debug, Clone)]
pub struct LoadError {
    pub message: String,
    pub span: Option<Range<usize>>,
    pub file_id: usize,
    pub severity: Severity,
    pub notes: Vec<String>,
}

impl LoadError {
    pub fn error(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        LoadError {
            message: message.into(),
            span: Some(span),
            file_id,
            severity: Severity::Error,
            notes: Vec::new(),
        }
    }

    /// An error that cannot be pinned to a source location.
    pub fn unlocated(message: impl Into<String>, file_id: usize) -> Self {
        LoadError {
            message: message.into(),
            span: None,
            file_id,
            severity: Severity::Error,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        let labels = match &self.span {
            Some(span) => vec![Label::primary(self.file_id, span.clone())],
            None => Vec::new(),
        };
        Diagnostic::new(self.severity)
            .with_message(&self.message)
            .with_labels(labels)
            .with_notes(self.notes.clone())
    }
}
