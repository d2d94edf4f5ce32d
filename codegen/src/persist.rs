//! The combined save document: editor blocks plus the committed snapshot.

use std::path::Path;

use serde::{Deserialize, Serialize};

use vispi::loader::from_json;
use vispi::{BlockTree, WorkspaceSpec};

use crate::error::PersistError;
use crate::scope::{ScopeResolver, Snapshot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedWorkspace {
    pub workspace: WorkspaceSpec,
    #[serde(default)]
    pub state: Option<Snapshot>,
}

#[derive(Deserialize)]
struct StateOnly {
    #[serde(default)]
    state: Option<Snapshot>,
}

/// The snapshot stored in a save, if any. Bare editor saves have none.
pub fn read_state(source: &str) -> Result<Option<Snapshot>, PersistError> {
    if source.trim().is_empty() {
        return Ok(None);
    }
    let file: StateOnly = from_json(source)?;
    Ok(file.state)
}

/// Install the saved snapshot as committed. Returns whether one was found.
pub fn restore(source: &str, scopes: &mut ScopeResolver) -> Result<bool, PersistError> {
    match read_state(source)? {
        Some(snapshot) => {
            tracing::debug!(
                processes = snapshot.process_table.len(),
                declared_main = snapshot.declared_main,
                "restored saved scope state"
            );
            scopes.restore(snapshot);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Serialize the tree and the committed snapshot as one document.
pub fn save(tree: &BlockTree, scopes: &ScopeResolver) -> Result<String, PersistError> {
    let saved = SavedWorkspace {
        workspace: tree.to_workspace(),
        state: Some(scopes.committed().clone()),
    };
    Ok(serde_json::to_string_pretty(&saved)?)
}

pub fn write_to(path: &Path, tree: &BlockTree, scopes: &ScopeResolver) -> Result<(), PersistError> {
    let text = save(tree, scopes)?;
    std::fs::write(path, text).map_err(|error| PersistError::Io {
        path: path.to_path_buf(),
        error,
    })
}
