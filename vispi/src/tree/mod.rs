pub mod spec;

use std::collections::HashMap;
use std::ops::{Index, Range};

use indexmap::IndexMap;

use crate::block::kind::BlockKind;
use crate::block::{Block, NodeId};
use crate::loader::LoadError;
use crate::tree::spec::{BlockSpec, Connection, WorkspaceSpec};

/// sin(3°): the editor orders top blocks along a slightly slanted row.
const ROW_SLANT: f64 = 0.052_335_956_242_943_83;

/// Arena holding every block of a workspace.
#[derive(Debug, Clone, Default)]
pub struct BlockTree {
    nodes: Vec<Block>,
    /// Heads of the top-level chains, in editor order.
    roots: Vec<NodeId>,
    by_id: HashMap<String, NodeId>,
    positions: HashMap<NodeId, (f64, f64)>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
}

impl BlockTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten top-level specs into an arena.
    /// Specs without an id get a generated one; duplicated ids are rejected.
    pub fn from_specs(roots: &[BlockSpec]) -> Result<BlockTree, LoadError> {
        let mut tree = BlockTree::new();
        let mut placed = Vec::with_capacity(roots.len());
        for (order, spec) in roots.iter().enumerate() {
            let head = tree.insert_chain(spec, None)?;
            if let (Some(x), Some(y)) = (spec.x, spec.y) {
                tree.positions.insert(head, (x, y));
            }
            let (x, y) = tree.positions.get(&head).copied().unwrap_or((0.0, 0.0));
            placed.push((y + ROW_SLANT * x, order, head));
        }
        placed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        tree.roots = placed.into_iter().map(|(_, _, head)| head).collect();
        Ok(tree)
    }

    pub fn from_workspace(workspace: &WorkspaceSpec) -> Result<BlockTree, LoadError> {
        BlockTree::from_specs(&workspace.blocks.blocks)
    }

    fn insert_chain(&mut self, spec: &BlockSpec, owner: Option<NodeId>) -> Result<NodeId, LoadError> {
        let head = self.insert_block(spec, owner, None)?;
        let mut previous = head;
        let mut cursor = spec.next_block();
        while let Some(next_spec) = cursor {
            let node = self.insert_block(next_spec, owner, Some(previous))?;
            self.nodes[previous.0].next = Some(node);
            previous = node;
            cursor = next_spec.next_block();
        }
        Ok(head)
    }

    fn insert_block(
        &mut self,
        spec: &BlockSpec,
        owner: Option<NodeId>,
        previous: Option<NodeId>,
    ) -> Result<NodeId, LoadError> {
        let node = NodeId(self.nodes.len());
        let id = spec
            .id
            .clone()
            .unwrap_or_else(|| format!("block-{}", node.0));
        if self.by_id.contains_key(&id) {
            return Err(LoadError::unlocated(
                format!("duplicate block id '{}'", id),
                self.source_id,
            ));
        }
        self.nodes.push(Block {
            id: id.clone(),
            kind: spec.kind,
            fields: spec.fields.clone(),
            slots: IndexMap::new(),
            owner,
            previous,
            next: None,
            span: None,
        });
        self.by_id.insert(id, node);

        for (slot, connection) in &spec.inputs {
            if let Some(child) = connection.target() {
                let head = self.insert_chain(child, Some(node))?;
                self.nodes[node.0].slots.insert(slot.clone(), head);
            }
        }
        Ok(node)
    }

    /// Rebuild the save-format description of the whole tree.
    pub fn to_workspace(&self) -> WorkspaceSpec {
        let blocks = self
            .roots
            .iter()
            .map(|&root| {
                let mut spec = self.chain_spec(root);
                if let Some(&(x, y)) = self.positions.get(&root) {
                    spec = spec.at(x, y);
                }
                spec
            })
            .collect();
        WorkspaceSpec::new(blocks)
    }

    fn chain_spec(&self, head: NodeId) -> BlockSpec {
        let mut spec = self.block_spec(head);
        if let Some(next) = self[head].next {
            spec.next = Some(Box::new(Connection::of(self.chain_spec(next))));
        }
        spec
    }

    fn block_spec(&self, node: NodeId) -> BlockSpec {
        let block = &self[node];
        let mut spec = BlockSpec::new(block.kind).with_id(block.id.clone());
        spec.fields = block.fields.clone();
        for (slot, &head) in &block.slots {
            spec.inputs
                .insert(slot.clone(), Connection::of(self.chain_spec(head)));
        }
        spec
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// All node ids in arena order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Look a block up by its editor id.
    pub fn find(&self, id: &str) -> Option<NodeId> {
        self.by_id.get(id).copied()
    }

    pub fn kind(&self, node: NodeId) -> BlockKind {
        self[node].kind
    }

    pub fn field(&self, node: NodeId, name: &str) -> Option<&str> {
        self[node].field(name)
    }

    /// Field value, or the empty string when absent.
    pub fn field_or_empty(&self, node: NodeId, name: &str) -> &str {
        self.field(node, name).unwrap_or("")
    }

    pub fn slot_head(&self, node: NodeId, slot: &str) -> Option<NodeId> {
        self[node].slot_head(slot)
    }

    /// The ordered chain of children held in a slot.
    pub fn slot_children(&self, node: NodeId, slot: &str) -> Vec<NodeId> {
        self.chain(self.slot_head(node, slot)).collect()
    }

    /// Walk a chain starting at `head` through next links.
    pub fn chain(&self, head: Option<NodeId>) -> Chain<'_> {
        Chain {
            tree: self,
            cursor: head,
        }
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self[node].next
    }

    /// The editor's notion of parent: the previous block of the chain,
    /// or the owning block for a chain head.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self[node].previous.or(self[node].owner)
    }

    /// The block whose slot holds the chain `node` belongs to.
    pub fn enclosing(&self, node: NodeId) -> Option<NodeId> {
        self[node].owner
    }

    pub fn span(&self, node: NodeId) -> Option<Range<usize>> {
        self[node].span.clone()
    }

    pub(crate) fn set_span(&mut self, node: NodeId, span: Range<usize>) {
        self.nodes[node.0].span = Some(span);
    }
}

impl Index<NodeId> for BlockTree {
    type Output = Block;

    fn index(&self, node: NodeId) -> &Block {
        &self.nodes[node.0]
    }
}

/// Iterator over a statement chain.
pub struct Chain<'a> {
    tree: &'a BlockTree,
    cursor: Option<NodeId>,
}

impl Iterator for Chain<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.cursor?;
        self.cursor = self.tree[current].next;
        Some(current)
    }
}
