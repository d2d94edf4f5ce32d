pub mod error;

pub use error::LoadError;

use std::collections::HashMap;
use std::ops::Range;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::tree::BlockTree;
use crate::tree::spec::{TopBlocks, WorkspaceSpec};

/// Either a bare editor save or a combined save whose blocks sit under `workspace`.
/// Any other key (the saved scope state, for one) is ignored here.
#[derive(Debug, Deserialize)]
struct SaveFile {
    #[serde(default)]
    workspace: Option<WorkspaceSpec>,
    #[serde(default)]
    blocks: Option<TopBlocks>,
}

/// Loader entry point.
pub struct Loader {
    source: String,
    file_id: usize,
}

impl Loader {
    pub fn new(source: String, file_id: usize) -> Self {
        Loader { source, file_id }
    }

    /// Parse the saved workspace into a block tree.
    pub fn load(&self) -> Result<BlockTree, Vec<LoadError>> {
        let workspace = self.workspace()?;
        let mut tree = BlockTree::from_workspace(&workspace).map_err(|e| vec![e])?;
        tree.source_id = self.file_id;

        let spans = id_spans(&self.source);
        let located: Vec<_> = tree
            .node_ids()
            .filter_map(|node| spans.get(tree[node].id.as_str()).map(|span| (node, span.clone())))
            .collect();
        for (node, span) in located {
            tree.set_span(node, span);
        }
        Ok(tree)
    }

    /// Parse only the save-format description.
    pub fn workspace(&self) -> Result<WorkspaceSpec, Vec<LoadError>> {
        if self.source.trim().is_empty() {
            return Ok(WorkspaceSpec::default());
        }
        let file: SaveFile = from_json(&self.source).map_err(|e| {
            let at = offset_of(&self.source, e.line(), e.column());
            vec![
                LoadError::error(format!("invalid workspace: {}", e), at..at, self.file_id)
                    .with_note("expected an editor save or a {\"workspace\", \"state\"} document"),
            ]
        })?;
        Ok(match (file.workspace, file.blocks) {
            (Some(workspace), _) => workspace,
            (None, Some(blocks)) => WorkspaceSpec { blocks },
            (None, None) => WorkspaceSpec::default(),
        })
    }
}

/// Convert serde_json's 1-based line/column into a byte offset.
fn offset_of(source: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            return (offset + column.saturating_sub(1)).min(source.len());
        }
        offset += text.len();
    }
    source.len()
}

/// Parse a save document of any nesting depth.
///
/// Each statement nests two levels below its predecessor
/// (`"next": {"block": ...}`), past serde_json's default depth limit for
/// long chains. Parsing runs without that limit and grows the stack as needed.
pub fn from_json<T: DeserializeOwned>(source: &str) -> serde_json::Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(source);
    deserializer.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}

/// Spans of every `"id": "<value>"` value in the raw JSON text, keyed by
/// value. The first occurrence of a value wins.
fn id_spans(source: &str) -> HashMap<&str, Range<usize>> {
    let mut spans = HashMap::new();
    for (key_at, key) in source.match_indices("\"id\"") {
        let rest = source[key_at + key.len()..].trim_start();
        let Some(value) = rest.strip_prefix(':').map(str::trim_start) else {
            continue;
        };
        let Some(quoted) = value.strip_prefix('"') else {
            continue;
        };
        let Some(len) = quoted.find('"') else {
            continue;
        };
        let start = source.len() - quoted.len();
        spans.entry(&source[start..start + len]).or_insert(start..start + len);
    }
    spans
}
