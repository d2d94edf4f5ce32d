pub mod kind;
pub mod names;

use std::ops::Range;

use indexmap::IndexMap;

use crate::block::kind::BlockKind;

/// Index of a block inside its [`BlockTree`](crate::tree::BlockTree) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single node of the block tree.
/// All links are arena ids; the tree owns every block.
#[derive(Debug, Clone)]
pub struct Block {
    /// Stable editor id.
    pub id: String,
    pub kind: BlockKind,
    /// Field values (declared identifiers, selections, operators).
    pub fields: IndexMap<String, String>,
    /// Slot name to the head of the chain (or single child) held in it.
    pub(crate) slots: IndexMap<String, NodeId>,
    /// Block whose slot holds the chain this block belongs to.
    pub(crate) owner: Option<NodeId>,
    pub(crate) previous: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    /// Byte span of the block's id in the source it was loaded from.
    pub span: Option<Range<usize>>,
}

impl Block {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }

    pub fn slot_head(&self, slot: &str) -> Option<NodeId> {
        self.slots.get(slot).copied()
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub fn previous(&self) -> Option<NodeId> {
        self.previous
    }

    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }
}
