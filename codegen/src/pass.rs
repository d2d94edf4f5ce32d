use vispi::BlockTree;

use crate::canonical::order;
use crate::error::Warning;
use crate::generator::generate;
use crate::scope::ScopeResolver;
use crate::validate::validate;

/// Result of one generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub warnings: Vec<Warning>,
}

/// Generate, canonicalize, commit, then validate against the new snapshot.
pub fn run_pass(tree: &BlockTree, scopes: &mut ScopeResolver) -> Generation {
    run_pass_with(tree, scopes, true)
}

/// Same as [`run_pass`], optionally keeping traversal order instead of the
/// definitions-first layout.
pub fn run_pass_with(tree: &BlockTree, scopes: &mut ScopeResolver, canonicalize: bool) -> Generation {
    let raw = generate(tree, scopes);
    let text = if canonicalize {
        order(&raw.lines)
    } else {
        raw.text()
    };
    scopes.commit();
    let warnings = validate(tree, scopes);

    tracing::debug!(
        lines = raw.lines.len(),
        warnings = warnings.len(),
        processes = scopes.committed().process_table.len(),
        "generation pass committed"
    );
    Generation { text, warnings }
}
