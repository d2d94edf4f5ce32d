use std::path::PathBuf;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use thiserror::Error;

use vispi::BlockTree;

/// Problems a pass reports without stopping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WarningKind {
    #[error("name '{0}' is not in scope")]
    NameNotInScope(String),

    #[error("no name selected")]
    NoNameSelected,

    #[error("no process selected")]
    NoProcessSelected,

    #[error("unknown process '{0}'")]
    UnknownProcess(String),

    #[error("expected {expected} argument{}, but got {got}", plural(.expected))]
    ArityMismatch {
        process: String,
        expected: usize,
        got: usize,
    },
}

fn plural(count: &usize) -> &'static str {
    if *count == 1 { "" } else { "s" }
}

/// A warning attached to the block it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    /// Editor id of the offending block.
    pub node: String,
}

impl Warning {
    pub fn new(kind: WarningKind, node: impl Into<String>) -> Self {
        Warning {
            kind,
            node: node.into(),
        }
    }

    /// Convert to a codespan-reporting Diagnostic, labelled at the block's id when known.
    pub fn to_diagnostic(&self, tree: &BlockTree) -> Diagnostic<usize> {
        let node = tree.find(&self.node);
        let labels = node
            .and_then(|n| tree.span(n))
            .map(|span| vec![Label::primary(tree.source_id, span)])
            .unwrap_or_default();
        let note = match node {
            Some(n) => format!("{} '{}'", tree.kind(n), self.node),
            None => format!("block '{}'", self.node),
        };
        Diagnostic::warning()
            .with_message(self.kind.to_string())
            .with_labels(labels)
            .with_notes(vec![note])
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}

/// Failures reading or writing a combined save.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("invalid saved state: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error on {path}: {error}")]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
}
