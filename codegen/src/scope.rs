use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use vispi::{ScopeKind, UNRESOLVED_NAME};

/// Key of the root scope.
pub const GLOBAL: &str = "global";

/// Scope keys are the hex SHA-256 of the node id that opened the scope.
pub fn scope_key(node_id: &str) -> String {
    hex::encode(Sha256::digest(node_id.as_bytes()))
}

/// One scope entry. Child scopes are stored next to `names`/`type`
/// under their own keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeNode {
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(rename = "type")]
    pub kind: ScopeKind,
    #[serde(flatten)]
    pub children: IndexMap<String, ScopeNode>,
}

impl ScopeNode {
    pub fn new(kind: ScopeKind) -> Self {
        ScopeNode {
            names: Vec::new(),
            kind,
            children: IndexMap::new(),
        }
    }
}

/// The hierarchical name-visibility structure of one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeTree {
    pub global: ScopeNode,
}

impl Default for ScopeTree {
    fn default() -> Self {
        ScopeTree {
            global: ScopeNode::new(ScopeKind::Global),
        }
    }
}

impl ScopeTree {
    /// Resolve a stack path (starting with `global`) to its scope.
    pub fn node(&self, path: &[String]) -> Option<&ScopeNode> {
        let (first, rest) = path.split_first()?;
        if first != GLOBAL {
            return None;
        }
        let mut node = &self.global;
        for key in rest {
            node = node.children.get(key)?;
        }
        Some(node)
    }

    fn node_mut(&mut self, path: &[String]) -> Option<&mut ScopeNode> {
        let (first, rest) = path.split_first()?;
        if first != GLOBAL {
            return None;
        }
        let mut node = &mut self.global;
        for key in rest {
            node = node.children.get_mut(key)?;
        }
        Some(node)
    }

    /// Names declared in `global` and then in each scope along `keys`.
    ///
    /// A name that reappears deeper replaces its earlier occurrence with the
    /// unresolved sentinel; the deeper occurrence is appended. The walk stops
    /// at the first key that does not exist.
    pub fn names_along(&self, keys: &[String]) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let mut node = Some(&self.global);
        let mut keys = keys.iter();
        while let Some(scope) = node {
            for name in &scope.names {
                if let Some(earlier) = names.iter().position(|n| n == name) {
                    names[earlier] = UNRESOLVED_NAME.to_string();
                }
                names.push(name.clone());
            }
            node = keys.next().and_then(|key| scope.children.get(key));
        }
        names
    }
}

/// Signature of one process definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessEntry {
    /// Scope key of the definition's body.
    pub id: String,
    #[serde(rename = "rawId")]
    pub raw_id: String,
    pub params: Vec<String>,
}

/// Everything one generation pass learns about names and processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub scope_tree: ScopeTree,
    #[serde(default = "global_stack")]
    pub scope_stack: Vec<String>,
    #[serde(default, alias = "processes")]
    pub process_table: IndexMap<String, ProcessEntry>,
    #[serde(default)]
    pub declared_main: bool,
}

fn global_stack() -> Vec<String> {
    vec![GLOBAL.to_string()]
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot {
            scope_tree: ScopeTree::default(),
            scope_stack: global_stack(),
            process_table: IndexMap::new(),
            declared_main: false,
        }
    }
}

impl Snapshot {
    /// Names visible along an ancestry of raw node ids, sentinel included.
    pub fn visible_names(&self, ancestry: &[String]) -> Vec<String> {
        let keys: Vec<String> = ancestry.iter().map(|id| scope_key(id)).collect();
        self.scope_tree.names_along(&keys)
    }

    pub fn parameter_names(&self, process: &str) -> &[String] {
        self.process_table
            .get(process)
            .map(|entry| entry.params.as_slice())
            .unwrap_or(&[])
    }

    /// Parameters of the process defined by the node with this raw id.
    pub fn parameter_names_by_node(&self, node_id: &str) -> &[String] {
        let key = scope_key(node_id);
        self.process_table
            .values()
            .find(|entry| entry.id == key)
            .map(|entry| entry.params.as_slice())
            .unwrap_or(&[])
    }

    pub fn process_names(&self) -> Vec<&str> {
        self.process_table.keys().map(|k| k.as_str()).collect()
    }

    pub fn has_process(&self, name: &str) -> bool {
        self.process_table.contains_key(name)
    }

    pub fn raw_process_id(&self, name: &str) -> Option<&str> {
        self.process_table.get(name).map(|entry| entry.raw_id.as_str())
    }

    pub fn has_declared_main(&self) -> bool {
        self.declared_main
    }
}

/// Builds the active snapshot during a pass and serves queries from the
/// committed one.
#[derive(Debug, Clone, Default)]
pub struct ScopeResolver {
    active: Snapshot,
    committed: Snapshot,
}

impl ScopeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a resolver whose committed snapshot was persisted earlier.
    pub fn with_committed(snapshot: Snapshot) -> Self {
        ScopeResolver {
            active: Snapshot::default(),
            committed: snapshot,
        }
    }

    /// Drop whatever the active snapshot holds.
    pub fn begin_pass(&mut self) {
        self.active = Snapshot::default();
    }

    /// Open (creating if absent) the scope of `node_id` below the current one.
    pub fn enter_scope(&mut self, node_id: &str, kind: ScopeKind) {
        if kind == ScopeKind::Main {
            self.active.declared_main = true;
        }
        let key = scope_key(node_id);
        let Some(current) = self.active.scope_tree.node_mut(&self.active.scope_stack) else {
            tracing::warn!(node_id, "scope stack points at a missing scope");
            return;
        };
        current
            .children
            .entry(key.clone())
            .or_insert_with(|| ScopeNode::new(kind))
            .kind = kind;
        tracing::trace!(node_id, ?kind, depth = self.active.scope_stack.len(), "enter scope");
        self.active.scope_stack.push(key);
    }

    /// Close the innermost scope. The global scope is never popped.
    pub fn exit_scope(&mut self) {
        if self.active.scope_stack.len() <= 1 {
            tracing::warn!("attempted to pop the global scope");
            return;
        }
        self.active.scope_stack.pop();
        tracing::trace!(depth = self.active.scope_stack.len(), "exit scope");
    }

    /// Add a name to the innermost scope. Empty names and the sentinel are ignored.
    pub fn declare_name(&mut self, name: &str) {
        if name.is_empty() || name == UNRESOLVED_NAME {
            return;
        }
        if let Some(scope) = self.active.scope_tree.node_mut(&self.active.scope_stack) {
            tracing::trace!(name, "declare");
            scope.names.push(name.to_string());
        }
    }

    /// Record a process signature, open its body scope and declare its parameters there.
    pub fn register_process(&mut self, node_id: &str, name: &str, params: &[String]) {
        self.active.process_table.insert(
            name.to_string(),
            ProcessEntry {
                id: scope_key(node_id),
                raw_id: node_id.to_string(),
                params: params.to_vec(),
            },
        );
        self.enter_scope(node_id, ScopeKind::Process);
        for param in params {
            self.declare_name(param);
        }
    }

    /// Kind of the innermost open scope of the active snapshot.
    pub fn current_scope_kind(&self) -> ScopeKind {
        self.active
            .scope_tree
            .node(&self.active.scope_stack)
            .map(|scope| scope.kind)
            .unwrap_or(ScopeKind::Global)
    }

    /// Open scope keys of the active snapshot, `global` first.
    pub fn scope_path(&self) -> &[String] {
        &self.active.scope_stack
    }

    /// Whether `name` is visible from the innermost open scope of the pass in progress.
    pub fn is_visible(&self, name: &str) -> bool {
        let below_global = self.active.scope_stack.get(1..).unwrap_or(&[]);
        name != UNRESOLVED_NAME
            && self
                .active
                .scope_tree
                .names_along(below_global)
                .iter()
                .any(|n| n == name)
    }

    /// Promote the active snapshot and start a fresh one.
    pub fn commit(&mut self) {
        self.committed = std::mem::take(&mut self.active);
    }

    /// Install a persisted snapshot as the committed one.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.committed = snapshot;
    }

    pub fn active(&self) -> &Snapshot {
        &self.active
    }

    pub fn committed(&self) -> &Snapshot {
        &self.committed
    }

    // Query surface. These read the committed snapshot only.

    pub fn list_visible_names(&self, ancestry: &[String]) -> Vec<String> {
        self.committed.visible_names(ancestry)
    }

    pub fn parameter_names(&self, process: &str) -> &[String] {
        self.committed.parameter_names(process)
    }

    pub fn process_names(&self) -> Vec<&str> {
        self.committed.process_names()
    }

    pub fn has_declared_main(&self) -> bool {
        self.committed.has_declared_main()
    }
}
