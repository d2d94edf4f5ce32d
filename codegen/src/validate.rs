use std::fmt;

use vispi::{BlockKind, BlockTree, NodeId, UNRESOLVED_NAME, field, slot};

use crate::ancestry::reference_ancestry;
use crate::error::{Warning, WarningKind};
use crate::scope::ScopeResolver;

/// Warnings for the whole tree, read from the committed snapshot.
pub fn validate(tree: &BlockTree, scopes: &ScopeResolver) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for node in tree.node_ids() {
        let kind = match tree.kind(node) {
            BlockKind::NameAccess => check_reference(tree, scopes, node),
            BlockKind::ProcessCall => check_call(tree, scopes, node),
            _ => None,
        };
        if let Some(kind) = kind {
            warnings.push(Warning::new(kind, tree[node].id.clone()));
        }
    }
    warnings
}

fn check_reference(tree: &BlockTree, scopes: &ScopeResolver, node: NodeId) -> Option<WarningKind> {
    let name = tree.field_or_empty(node, field::NAME);
    if name.is_empty() || name == UNRESOLVED_NAME {
        return Some(WarningKind::NoNameSelected);
    }
    if visible_names_at(tree, scopes, node).iter().any(|n| n == name) {
        None
    } else {
        Some(WarningKind::NameNotInScope(name.to_string()))
    }
}

fn check_call(tree: &BlockTree, scopes: &ScopeResolver, node: NodeId) -> Option<WarningKind> {
    let process = tree.field_or_empty(node, field::PROCESS_NAME);
    if process.is_empty() || process == UNRESOLVED_NAME {
        return Some(WarningKind::NoProcessSelected);
    }
    if !scopes.committed().has_process(process) {
        return Some(WarningKind::UnknownProcess(process.to_string()));
    }

    let expected = scopes.parameter_names(process).len();
    let got = tree.slot_children(node, slot::ARGS).len();
    (expected != got).then(|| WarningKind::ArityMismatch {
        process: process.to_string(),
        expected,
        got,
    })
}

/// Names a reference placed at `node` can select, sentinel removed.
pub fn visible_names_at(tree: &BlockTree, scopes: &ScopeResolver, node: NodeId) -> Vec<String> {
    scopes
        .list_visible_names(&reference_ancestry(tree, node))
        .into_iter()
        .filter(|name| name != UNRESOLVED_NAME)
        .collect()
}

/// One entry of a name-reference menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameChoice {
    pub label: String,
    pub value: String,
}

/// Menu options for a name reference: the unselected entry, then every visible name.
pub fn name_choices(tree: &BlockTree, scopes: &ScopeResolver, node: NodeId) -> Vec<NameChoice> {
    let unselected = NameChoice {
        label: "?".to_string(),
        value: UNRESOLVED_NAME.to_string(),
    };
    std::iter::once(unselected)
        .chain(
            visible_names_at(tree, scopes, node)
                .into_iter()
                .map(|name| NameChoice {
                    label: name.clone(),
                    value: name,
                }),
        )
        .collect()
}

/// What an argument slot of a call corresponds to in the callee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentLabel {
    Parameter(String),
    /// `position` is one-based.
    TooMany { position: usize, expected: usize },
}

impl fmt::Display for ArgumentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentLabel::Parameter(name) => write!(f, "{} =", name),
            ArgumentLabel::TooMany { position, expected } => {
                write!(f, "ERROR: Too Many Args {}/{}", position, expected)
            }
        }
    }
}

/// Label of an argument block, or `None` when it is not inside a call with a
/// selected process.
pub fn argument_label(tree: &BlockTree, scopes: &ScopeResolver, arg: NodeId) -> Option<ArgumentLabel> {
    let call = tree.enclosing(arg)?;
    if tree.kind(call) != BlockKind::ProcessCall {
        return None;
    }
    let process = tree.field(call, field::PROCESS_NAME)?;
    let index = tree
        .slot_children(call, slot::ARGS)
        .iter()
        .position(|&a| a == arg)?;

    let params = scopes.parameter_names(process);
    Some(match params.get(index) {
        Some(name) => ArgumentLabel::Parameter(name.clone()),
        None => ArgumentLabel::TooMany {
            position: index + 1,
            expected: params.len(),
        },
    })
}

/// A newly created, empty main program is dropped when one was already declared.
pub fn should_discard_main(tree: &BlockTree, scopes: &ScopeResolver, node: NodeId) -> bool {
    tree.kind(node) == BlockKind::Main
        && scopes.has_declared_main()
        && tree.slot_head(node, slot::MAIN).is_none()
}
