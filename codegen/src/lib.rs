pub mod ancestry;
pub mod canonical;
pub mod error;
pub mod generator;
pub mod pass;
pub mod persist;
pub mod sanitize;
pub mod scope;
pub mod session;
pub mod validate;

pub use ancestry::compute_ancestry;
pub use canonical::canonicalize;
pub use error::{PersistError, Warning, WarningKind};
pub use generator::generate;
pub use pass::{Generation, run_pass, run_pass_with};
pub use scope::{ScopeResolver, Snapshot};
pub use session::{Session, Settings};
