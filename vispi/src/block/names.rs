//! Field and slot names used by the editor's block definitions.

pub mod field {
    /// Identifier declared by the node (restriction, input, parameter, global).
    pub const NEW: &str = "NEW";
    /// Identifier selected by a name reference.
    pub const NAME: &str = "NAME";
    /// Display name of a process definition.
    pub const PROCESS: &str = "PROCESS";
    /// Process selected by a call.
    pub const PROCESS_NAME: &str = "PROCESS_NAME";
    /// Guard comparison operator.
    pub const OPERATION: &str = "OPERATION";
}

pub mod slot {
    pub const MAIN: &str = "MAIN";
    pub const PARAMS: &str = "PARAMS";
    pub const BODY: &str = "BODY";
    pub const ARGS: &str = "ARGS";
    pub const ARG: &str = "ARG";
    pub const SCOPE: &str = "SCOPE";
    pub const NAMES: &str = "NAMES";
    pub const ON: &str = "ON";
    pub const MESSAGE: &str = "MESSAGE";
    pub const MESSAGES: &str = "MESSAGES";
    pub const FIRST: &str = "FIRST";
    pub const SECOND: &str = "SECOND";
    pub const PARALLEL: &str = "PARALLEL";
    pub const CHOICE: &str = "CHOICE";
}

/// Value a name reference holds while nothing valid is selected.
/// Never declared into a scope.
pub const UNRESOLVED_NAME: &str = "__VISPI_INVALID_NAME__";
