pub mod block;
pub mod loader;
pub mod tree;

pub use block::kind::{BlockKind, ScopeKind};
pub use block::names::{UNRESOLVED_NAME, field, slot};
pub use block::{Block, NodeId};
pub use loader::{LoadError, Loader};
pub use tree::BlockTree;
pub use tree::spec::{BlockSpec, WorkspaceSpec};
