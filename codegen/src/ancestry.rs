use vispi::{BlockKind, BlockTree, NodeId};

/// Ids of the scope-introducing blocks enclosing `node`, outermost first.
///
/// Walks the editor's parent links (previous sibling, else owner). A scope
/// block does not count as its own ancestor. Consecutive branches of one
/// fork are reached through each other's previous links; they share one
/// visibility level, so only the branch the walk started in is kept.
pub fn compute_ancestry(tree: &BlockTree, node: NodeId) -> Vec<String> {
    let mut ancestry = Vec::new();
    let mut cursor = if tree.kind(node).introduces_scope() {
        tree.parent(node)
    } else {
        Some(node)
    };
    let mut previous: Option<BlockKind> = None;

    while let Some(current) = cursor {
        let kind = tree.kind(current);
        if kind.introduces_scope() && !continues_fork_run(previous, kind) {
            ancestry.push(tree[current].id.clone());
        }
        previous = Some(kind);
        cursor = tree.parent(current);
    }

    ancestry.reverse();
    ancestry
}

/// Ancestry of the block holding a name reference, which is where the
/// reference is resolved.
pub fn reference_ancestry(tree: &BlockTree, reference: NodeId) -> Vec<String> {
    tree.parent(reference)
        .map(|holder| compute_ancestry(tree, holder))
        .unwrap_or_default()
}

fn continues_fork_run(previous: Option<BlockKind>, kind: BlockKind) -> bool {
    matches!(
        (previous, kind),
        (Some(BlockKind::ParallelBranch), BlockKind::ParallelBranch)
            | (Some(BlockKind::ChoiceBranch), BlockKind::ChoiceBranch)
    )
}
