use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::block::kind::BlockKind;

/// Owned description of a block and everything hanging off it, in the
/// editor's save format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSpec {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub inputs: IndexMap<String, Connection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<Connection>>,
}

/// What is plugged into an input or a next connection.
/// A shadow block stands in when no real block is attached.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Connection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<BlockSpec>,
}

impl Connection {
    pub fn of(block: BlockSpec) -> Self {
        Connection {
            block: Some(block),
            shadow: None,
        }
    }

    /// The attached block, falling back to the shadow.
    pub fn target(&self) -> Option<&BlockSpec> {
        self.block.as_ref().or(self.shadow.as_ref())
    }
}

/// A whole editor save: `{"blocks": {"languageVersion": 0, "blocks": [...]}}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkspaceSpec {
    #[serde(default)]
    pub blocks: TopBlocks,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TopBlocks {
    #[serde(rename = "languageVersion", default)]
    pub language_version: u32,
    #[serde(default)]
    pub blocks: Vec<BlockSpec>,
}

impl WorkspaceSpec {
    pub fn new(blocks: Vec<BlockSpec>) -> Self {
        WorkspaceSpec {
            blocks: TopBlocks {
                language_version: 0,
                blocks,
            },
        }
    }
}

impl BlockSpec {
    pub fn new(kind: BlockKind) -> Self {
        BlockSpec {
            kind,
            id: None,
            x: None,
            y: None,
            fields: IndexMap::new(),
            inputs: IndexMap::new(),
            next: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Plug a single child into a value slot.
    pub fn with_value(mut self, slot: &str, child: BlockSpec) -> Self {
        self.inputs.insert(slot.to_string(), Connection::of(child));
        self
    }

    /// Plug a statement chain into a slot. An empty chain leaves the slot empty.
    pub fn with_statements(mut self, slot: &str, chain: Vec<BlockSpec>) -> Self {
        match BlockSpec::chain(chain) {
            Some(head) => {
                self.inputs.insert(slot.to_string(), Connection::of(head));
            }
            None => {
                self.inputs.shift_remove(slot);
            }
        }
        self
    }

    /// Link blocks through their next connections, returning the head.
    /// Any next link already present on a block is replaced.
    pub fn chain(blocks: Vec<BlockSpec>) -> Option<BlockSpec> {
        let mut head: Option<BlockSpec> = None;
        for mut block in blocks.into_iter().rev() {
            block.next = head.map(|n| Box::new(Connection::of(n)));
            head = Some(block);
        }
        head
    }

    /// The block attached to this one's next connection.
    pub fn next_block(&self) -> Option<&BlockSpec> {
        self.next.as_deref().and_then(Connection::target)
    }
}
