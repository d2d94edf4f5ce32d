use std::fmt;

use serde::{Deserialize, Serialize};

/// Every node kind the editor can place. Serialized with the editor's type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    #[serde(rename = "MainBlock")]
    Main,
    #[serde(rename = "ProcessBlock")]
    Process,
    #[serde(rename = "ProcessCallBlock")]
    ProcessCall,
    #[serde(rename = "ProcessParamBlock")]
    ProcessParam,
    #[serde(rename = "ProcessArgBlock")]
    ProcessArg,
    #[serde(rename = "RestrictScopeBlock")]
    Restrict,
    #[serde(rename = "MultiRestrictScopeBlock")]
    MultiRestrict,
    #[serde(rename = "RestrictNameBlock")]
    RestrictName,
    #[serde(rename = "ReceiveScopeBlock")]
    Receive,
    #[serde(rename = "MultiReceiveScopeBlock")]
    MultiReceive,
    #[serde(rename = "ReceiveNameBlock")]
    ReceiveName,
    #[serde(rename = "GuardScopeBlock")]
    Guard,
    #[serde(rename = "ParallelParentBlock")]
    ParallelFork,
    #[serde(rename = "ParallelScopeBlock")]
    ParallelBranch,
    #[serde(rename = "ChoiceParentBlock")]
    ChoiceFork,
    #[serde(rename = "ChoiceScopeBlock")]
    ChoiceBranch,
    #[serde(rename = "SendBlock")]
    Send,
    #[serde(rename = "MultiSendBlock")]
    MultiSend,
    #[serde(rename = "SendNameBlock")]
    SendName,
    #[serde(rename = "SyncBlock")]
    Sync,
    #[serde(rename = "GlobalNameBlock")]
    GlobalName,
    #[serde(rename = "NameAccessBlock")]
    NameAccess,
    #[serde(rename = "TerminationBlock")]
    Termination,
}

/// Tag stored on every scope entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    #[serde(rename = "global")]
    Global,
    #[serde(rename = "MainBlock")]
    Main,
    #[serde(rename = "ProcessBlock")]
    Process,
    #[serde(rename = "RestrictScopeBlock")]
    Restrict,
    #[serde(rename = "MultiRestrictScopeBlock")]
    MultiRestrict,
    #[serde(rename = "ReceiveScopeBlock")]
    Receive,
    #[serde(rename = "MultiReceiveScopeBlock")]
    MultiReceive,
    #[serde(rename = "GuardScopeBlock")]
    Guard,
    #[serde(rename = "ParallelParentBlock")]
    ParallelFork,
    #[serde(rename = "ParallelScopeBlock")]
    ParallelBranch,
    #[serde(rename = "ChoiceParentBlock")]
    ChoiceFork,
    #[serde(rename = "ChoiceScopeBlock")]
    ChoiceBranch,
}

impl ScopeKind {
    /// True for the scopes a main program or process definition opens.
    pub fn is_body(self) -> bool {
        matches!(self, ScopeKind::Main | ScopeKind::Process)
    }
}

impl BlockKind {
    pub const ALL: [BlockKind; 23] = [
        BlockKind::Main,
        BlockKind::Process,
        BlockKind::ProcessCall,
        BlockKind::ProcessParam,
        BlockKind::ProcessArg,
        BlockKind::Restrict,
        BlockKind::MultiRestrict,
        BlockKind::RestrictName,
        BlockKind::Receive,
        BlockKind::MultiReceive,
        BlockKind::ReceiveName,
        BlockKind::Guard,
        BlockKind::ParallelFork,
        BlockKind::ParallelBranch,
        BlockKind::ChoiceFork,
        BlockKind::ChoiceBranch,
        BlockKind::Send,
        BlockKind::MultiSend,
        BlockKind::SendName,
        BlockKind::Sync,
        BlockKind::GlobalName,
        BlockKind::NameAccess,
        BlockKind::Termination,
    ];

    /// The scope this kind pushes when traversal enters it, if any.
    pub fn scope_kind(self) -> Option<ScopeKind> {
        match self {
            BlockKind::Main => Some(ScopeKind::Main),
            BlockKind::Process => Some(ScopeKind::Process),
            BlockKind::Restrict => Some(ScopeKind::Restrict),
            BlockKind::MultiRestrict => Some(ScopeKind::MultiRestrict),
            BlockKind::Receive => Some(ScopeKind::Receive),
            BlockKind::MultiReceive => Some(ScopeKind::MultiReceive),
            BlockKind::Guard => Some(ScopeKind::Guard),
            BlockKind::ParallelFork => Some(ScopeKind::ParallelFork),
            BlockKind::ParallelBranch => Some(ScopeKind::ParallelBranch),
            BlockKind::ChoiceFork => Some(ScopeKind::ChoiceFork),
            BlockKind::ChoiceBranch => Some(ScopeKind::ChoiceBranch),
            BlockKind::ProcessCall
            | BlockKind::ProcessParam
            | BlockKind::ProcessArg
            | BlockKind::RestrictName
            | BlockKind::ReceiveName
            | BlockKind::Send
            | BlockKind::MultiSend
            | BlockKind::SendName
            | BlockKind::Sync
            | BlockKind::GlobalName
            | BlockKind::NameAccess
            | BlockKind::Termination => None,
        }
    }

    pub fn introduces_scope(self) -> bool {
        self.scope_kind().is_some()
    }

    /// Main programs and process definitions switch the generation gate on while visited.
    pub fn toggles_generation(self) -> bool {
        matches!(self, BlockKind::Main | BlockKind::Process)
    }

    /// Kinds whose sequencing still runs while the generation gate is closed.
    pub fn bypasses_gate(self) -> bool {
        matches!(
            self,
            BlockKind::Main | BlockKind::Process | BlockKind::GlobalName
        )
    }

    /// Kinds whose text must be followed by `". "` when a statement sibling follows.
    /// Prefixes qualify whether or not they carry an inline continuation, so a
    /// bare `a(y)` still reads `a(y). 0` before a sibling.
    pub fn needs_terminator(self) -> bool {
        matches!(
            self,
            BlockKind::Send
                | BlockKind::Sync
                | BlockKind::MultiSend
                | BlockKind::Receive
                | BlockKind::MultiReceive
                | BlockKind::Restrict
                | BlockKind::MultiRestrict
                | BlockKind::Guard
                | BlockKind::Termination
        )
    }

    /// The editor's type name.
    pub fn type_name(self) -> &'static str {
        match self {
            BlockKind::Main => "MainBlock",
            BlockKind::Process => "ProcessBlock",
            BlockKind::ProcessCall => "ProcessCallBlock",
            BlockKind::ProcessParam => "ProcessParamBlock",
            BlockKind::ProcessArg => "ProcessArgBlock",
            BlockKind::Restrict => "RestrictScopeBlock",
            BlockKind::MultiRestrict => "MultiRestrictScopeBlock",
            BlockKind::RestrictName => "RestrictNameBlock",
            BlockKind::Receive => "ReceiveScopeBlock",
            BlockKind::MultiReceive => "MultiReceiveScopeBlock",
            BlockKind::ReceiveName => "ReceiveNameBlock",
            BlockKind::Guard => "GuardScopeBlock",
            BlockKind::ParallelFork => "ParallelParentBlock",
            BlockKind::ParallelBranch => "ParallelScopeBlock",
            BlockKind::ChoiceFork => "ChoiceParentBlock",
            BlockKind::ChoiceBranch => "ChoiceScopeBlock",
            BlockKind::Send => "SendBlock",
            BlockKind::MultiSend => "MultiSendBlock",
            BlockKind::SendName => "SendNameBlock",
            BlockKind::Sync => "SyncBlock",
            BlockKind::GlobalName => "GlobalNameBlock",
            BlockKind::NameAccess => "NameAccessBlock",
            BlockKind::Termination => "TerminationBlock",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}
