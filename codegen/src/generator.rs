use vispi::{BlockKind, BlockTree, NodeId, ScopeKind, UNRESOLVED_NAME, field, slot};

use crate::canonical::{Line, LineKind};
use crate::scope::ScopeResolver;

/// Where a pass is between main programs and process definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Outside any body: only declaration blocks have effects.
    Scanning,
    /// Inside a main program or process definition.
    Emitting,
}

/// State threaded through one traversal.
struct Context<'a> {
    tree: &'a BlockTree,
    scopes: &'a mut ScopeResolver,
    phase: Phase,
    /// Non-empty branch counts of the forks being rendered, innermost last.
    branch_counts: Vec<usize>,
}

impl<'a> Context<'a> {
    fn new(tree: &'a BlockTree, scopes: &'a mut ScopeResolver) -> Self {
        Context {
            tree,
            scopes,
            phase: Phase::Scanning,
            branch_counts: Vec::new(),
        }
    }

    fn emitting(&self) -> bool {
        self.phase == Phase::Emitting
    }
}

/// Generator output before canonical ordering: one line per non-empty root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawOutput {
    pub lines: Vec<Line>,
}

impl RawOutput {
    /// The lines joined with newlines, in traversal order.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Run one traversal over every root, filling the resolver's active snapshot.
///
/// Global-name chains are visited before the other roots so their names are
/// visible wherever they sit in the workspace.
pub fn generate(tree: &BlockTree, scopes: &mut ScopeResolver) -> RawOutput {
    scopes.begin_pass();
    let mut ctx = Context::new(tree, scopes);

    let (globals, others): (Vec<NodeId>, Vec<NodeId>) = tree
        .roots()
        .iter()
        .partition(|&&root| tree.kind(root) == BlockKind::GlobalName);

    let mut lines = Vec::new();
    for root in globals.into_iter().chain(others) {
        let text = block_to_code(Some(root), &mut ctx);
        if text.is_empty() {
            continue;
        }
        let kind = if tree.kind(root) == BlockKind::Process {
            LineKind::Definition
        } else {
            LineKind::Program
        };
        lines.push(Line::new(text, kind));
    }

    tracing::debug!(
        roots = tree.roots().len(),
        lines = lines.len(),
        "generation traversal finished"
    );
    RawOutput { lines }
}

/// Render a block together with the rest of its statement chain.
fn block_to_code(node: Option<NodeId>, ctx: &mut Context<'_>) -> String {
    let Some(node) = node else {
        return String::new();
    };
    let code = block_code(node, ctx);
    scrub(node, code, ctx)
}

/// Join a block's own text with the rendering of its next sibling.
fn scrub(node: NodeId, code: String, ctx: &mut Context<'_>) -> String {
    let tree = ctx.tree;
    let kind = tree.kind(node);
    if !kind.bypasses_gate() && !ctx.emitting() {
        return String::new();
    }

    let next = tree.next_sibling(node);
    let next_code = block_to_code(next, ctx);
    let has_code = !code.is_empty() && !is_blank(&next_code);

    match (kind, next.map(|n| tree.kind(n))) {
        (BlockKind::ChoiceBranch, Some(BlockKind::ChoiceBranch)) if has_code => {
            format!("{} + {}", code, next_code)
        }
        (BlockKind::ParallelBranch, Some(BlockKind::ParallelBranch)) if has_code => {
            format!("{} | {}", code, next_code)
        }
        (_, Some(_)) if kind.needs_terminator() && has_code => format!("{}. {}", code, next_code),
        _ => code + &next_code,
    }
}

fn statement_code(node: NodeId, slot_name: &str, ctx: &mut Context<'_>) -> String {
    let head = ctx.tree.slot_head(node, slot_name);
    block_to_code(head, ctx)
}

fn value_code(node: NodeId, slot_name: &str, ctx: &mut Context<'_>) -> String {
    let head = ctx.tree.slot_head(node, slot_name);
    block_to_code(head, ctx)
}

fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// The emission rule of each kind.
fn block_code(node: NodeId, ctx: &mut Context<'_>) -> String {
    let kind = ctx.tree.kind(node);
    if !kind.bypasses_gate() && !ctx.emitting() {
        return String::new();
    }

    match kind {
        BlockKind::Main => main_code(node, ctx),
        BlockKind::Process => process_code(node, ctx),
        BlockKind::ProcessCall => call_code(node, ctx),
        BlockKind::ProcessParam | BlockKind::ProcessArg | BlockKind::SendName => String::new(),
        BlockKind::GlobalName | BlockKind::RestrictName | BlockKind::ReceiveName => {
            let name = ctx.tree.field_or_empty(node, field::NEW);
            ctx.scopes.declare_name(name);
            String::new()
        }
        BlockKind::Restrict => restrict_code(node, ctx),
        BlockKind::MultiRestrict => multi_restrict_code(node, ctx),
        BlockKind::Receive => receive_code(node, ctx),
        BlockKind::MultiReceive => multi_receive_code(node, ctx),
        BlockKind::Guard => guard_code(node, ctx),
        BlockKind::ParallelFork => fork_code(node, ScopeKind::ParallelFork, slot::PARALLEL, ctx),
        BlockKind::ChoiceFork => fork_code(node, ScopeKind::ChoiceFork, slot::CHOICE, ctx),
        BlockKind::ParallelBranch => branch_code(node, ScopeKind::ParallelBranch, ctx),
        BlockKind::ChoiceBranch => branch_code(node, ScopeKind::ChoiceBranch, ctx),
        BlockKind::Send => {
            let on = value_code(node, slot::ON, ctx);
            let message = value_code(node, slot::MESSAGE, ctx);
            if on.is_empty() || message.is_empty() {
                return String::new();
            }
            format!("{}'<{}>", on, message)
        }
        BlockKind::MultiSend => multi_send_code(node, ctx),
        BlockKind::Sync => {
            let on = value_code(node, slot::ON, ctx);
            if on.is_empty() {
                return String::new();
            }
            format!("{}'<{}>", on, on)
        }
        BlockKind::NameAccess => {
            let name = ctx.tree.field_or_empty(node, field::NAME);
            if name.is_empty() || !ctx.scopes.is_visible(name) {
                return String::new();
            }
            name.to_string()
        }
        BlockKind::Termination => "0".to_string(),
    }
}

fn main_code(node: NodeId, ctx: &mut Context<'_>) -> String {
    let tree = ctx.tree;
    ctx.phase = Phase::Emitting;
    ctx.scopes.enter_scope(&tree[node].id, ScopeKind::Main);
    let body = statement_code(node, slot::MAIN, ctx);
    ctx.scopes.exit_scope();
    ctx.phase = Phase::Scanning;
    body
}

fn process_code(node: NodeId, ctx: &mut Context<'_>) -> String {
    let tree = ctx.tree;
    ctx.phase = Phase::Emitting;

    let name = tree.field_or_empty(node, field::PROCESS);
    let params: Vec<String> = tree
        .slot_children(node, slot::PARAMS)
        .into_iter()
        .map(|param| tree.field_or_empty(param, field::NEW).to_string())
        .filter(|param| !param.is_empty())
        .collect();

    if name.is_empty() {
        ctx.scopes.enter_scope(&tree[node].id, ScopeKind::Process);
        for param in &params {
            ctx.scopes.declare_name(param);
        }
    } else {
        ctx.scopes.register_process(&tree[node].id, name, &params);
    }
    let body = statement_code(node, slot::BODY, ctx);
    ctx.scopes.exit_scope();
    ctx.phase = Phase::Scanning;

    if name.is_empty() || is_blank(&body) {
        return String::new();
    }
    if params.is_empty() {
        format!("{} = {}", name, body)
    } else {
        format!("{}({}) = {}", name, params.join(", "), body)
    }
}

fn call_code(node: NodeId, ctx: &mut Context<'_>) -> String {
    let tree = ctx.tree;
    let name = tree.field_or_empty(node, field::PROCESS_NAME);
    if name.is_empty() || name == UNRESOLVED_NAME {
        return String::new();
    }

    let args: Vec<String> = tree
        .slot_children(node, slot::ARGS)
        .into_iter()
        .map(|arg| value_code(arg, slot::ARG, ctx))
        .collect();
    let args = args.join(", ");
    if args.is_empty() {
        name.to_string()
    } else {
        format!("{}({})", name, args)
    }
}

fn restrict_code(node: NodeId, ctx: &mut Context<'_>) -> String {
    let tree = ctx.tree;
    let name = tree.field_or_empty(node, field::NEW);
    if name.is_empty() || name == UNRESOLVED_NAME {
        return String::new();
    }

    ctx.scopes.enter_scope(&tree[node].id, ScopeKind::Restrict);
    ctx.scopes.declare_name(name);
    let body = statement_code(node, slot::SCOPE, ctx);
    ctx.scopes.exit_scope();

    with_continuation(format!("${}", name), body)
}

fn multi_restrict_code(node: NodeId, ctx: &mut Context<'_>) -> String {
    let tree = ctx.tree;
    ctx.scopes.enter_scope(&tree[node].id, ScopeKind::MultiRestrict);
    statement_code(node, slot::NAMES, ctx);
    let names = declared_names(tree, node);
    if names.is_empty() {
        ctx.scopes.exit_scope();
        return String::new();
    }
    let body = statement_code(node, slot::SCOPE, ctx);
    ctx.scopes.exit_scope();

    let atoms: Vec<String> = names.iter().map(|name| format!("${}", name)).collect();
    with_continuation(atoms.join(". "), body)
}

fn receive_code(node: NodeId, ctx: &mut Context<'_>) -> String {
    let tree = ctx.tree;
    let name = tree.field_or_empty(node, field::NEW);
    let on = value_code(node, slot::ON, ctx);

    ctx.scopes.enter_scope(&tree[node].id, ScopeKind::Receive);
    ctx.scopes.declare_name(name);
    let body = statement_code(node, slot::SCOPE, ctx);
    ctx.scopes.exit_scope();

    if name.is_empty() || on.is_empty() {
        return String::new();
    }
    with_continuation(format!("{}({})", on, name), body)
}

fn multi_receive_code(node: NodeId, ctx: &mut Context<'_>) -> String {
    let tree = ctx.tree;
    let on = value_code(node, slot::ON, ctx);

    ctx.scopes.enter_scope(&tree[node].id, ScopeKind::MultiReceive);
    statement_code(node, slot::NAMES, ctx);
    let names = declared_names(tree, node);
    let body = statement_code(node, slot::SCOPE, ctx);
    ctx.scopes.exit_scope();

    if on.is_empty() || names.is_empty() {
        return String::new();
    }
    let atoms: Vec<String> = names.iter().map(|name| format!("{}({})", on, name)).collect();
    with_continuation(atoms.join(". "), body)
}

fn guard_code(node: NodeId, ctx: &mut Context<'_>) -> String {
    let tree = ctx.tree;
    let left = value_code(node, slot::FIRST, ctx);
    let operator = tree.field(node, field::OPERATION).unwrap_or("=");
    let right = value_code(node, slot::SECOND, ctx);

    ctx.scopes.enter_scope(&tree[node].id, ScopeKind::Guard);
    let body = statement_code(node, slot::SCOPE, ctx);
    ctx.scopes.exit_scope();

    if left.is_empty() || right.is_empty() {
        return String::new();
    }
    let condition = format!("[{}{}{}]", left, operator, right);
    if body.is_empty() {
        condition
    } else {
        format!("{} {}", condition, body)
    }
}

fn fork_code(node: NodeId, kind: ScopeKind, branches_slot: &str, ctx: &mut Context<'_>) -> String {
    let tree = ctx.tree;
    ctx.scopes.enter_scope(&tree[node].id, kind);
    ctx.branch_counts.push(0);
    let branches = statement_code(node, branches_slot, ctx);
    let non_empty = ctx.branch_counts.pop().unwrap_or(0);
    ctx.scopes.exit_scope();

    match non_empty {
        0 => String::new(),
        1 => branches,
        _ if ctx.scopes.current_scope_kind().is_body() => branches,
        _ => format!("({})", branches),
    }
}

fn branch_code(node: NodeId, kind: ScopeKind, ctx: &mut Context<'_>) -> String {
    let tree = ctx.tree;
    ctx.scopes.enter_scope(&tree[node].id, kind);
    let body = statement_code(node, slot::SCOPE, ctx);
    ctx.scopes.exit_scope();

    if is_blank(&body) {
        return String::new();
    }
    if let Some(count) = ctx.branch_counts.last_mut() {
        *count += 1;
    }
    body
}

fn multi_send_code(node: NodeId, ctx: &mut Context<'_>) -> String {
    let tree = ctx.tree;
    let on = value_code(node, slot::ON, ctx);
    let messages: Vec<String> = tree
        .slot_children(node, slot::MESSAGES)
        .into_iter()
        .map(|message| value_code(message, slot::MESSAGE, ctx))
        .filter(|message| !message.is_empty())
        .collect();

    if on.is_empty() || messages.is_empty() {
        return String::new();
    }
    messages
        .iter()
        .map(|message| format!("{}'<{}>", on, message))
        .collect::<Vec<_>>()
        .join(". ")
}

/// Non-empty identifiers declared by the children of a `NAMES` slot.
fn declared_names(tree: &BlockTree, node: NodeId) -> Vec<String> {
    tree.slot_children(node, slot::NAMES)
        .into_iter()
        .map(|child| tree.field_or_empty(child, field::NEW).to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

fn with_continuation(prefix: String, body: String) -> String {
    if body.is_empty() {
        prefix
    } else {
        format!("{}. {}", prefix, body)
    }
}
