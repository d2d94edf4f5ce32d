use std::time::{Duration, Instant};

use serde::Deserialize;

use vispi::BlockTree;

use crate::pass::{Generation, run_pass_with};
use crate::scope::{ScopeResolver, Snapshot};

/// Tunables read from the optional config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Quiet period after the last edit before a pass runs.
    pub debounce_ms: u64,
    /// Put process definitions before the main program.
    pub canonicalize: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            debounce_ms: 250,
            canonicalize: true,
        }
    }
}

impl Settings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Coalesces edit notifications into generation passes.
///
/// Every edit re-arms the window; a pass runs once no edit has arrived for
/// the whole window, so a burst of edits costs one pass. Callers supply the
/// clock.
#[derive(Debug, Default)]
pub struct Session {
    scopes: ScopeResolver,
    settings: Settings,
    last_edit: Option<Instant>,
    latest: Generation,
    passes: usize,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Session {
            settings,
            ..Session::default()
        }
    }

    /// Resume from a persisted snapshot; queries see it until the first pass.
    pub fn with_snapshot(settings: Settings, snapshot: Snapshot) -> Self {
        Session {
            scopes: ScopeResolver::with_committed(snapshot),
            ..Session::new(settings)
        }
    }

    pub fn notify_edit(&mut self, now: Instant) {
        self.last_edit = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.last_edit.is_some()
    }

    /// When the scheduled pass becomes due, if one is scheduled.
    pub fn due_at(&self) -> Option<Instant> {
        self.last_edit.map(|edit| edit + self.settings.debounce())
    }

    /// Run the scheduled pass if its window has elapsed.
    pub fn poll(&mut self, tree: &BlockTree, now: Instant) -> Option<&Generation> {
        let due = self.due_at()?;
        if now < due {
            return None;
        }
        Some(self.flush(tree))
    }

    /// Run a pass now, cancelling any scheduled one.
    pub fn flush(&mut self, tree: &BlockTree) -> &Generation {
        self.last_edit = None;
        self.latest = run_pass_with(tree, &mut self.scopes, self.settings.canonicalize);
        self.passes += 1;
        tracing::debug!(passes = self.passes, "session pass finished");
        &self.latest
    }

    /// Output of the most recent pass.
    pub fn latest(&self) -> &Generation {
        &self.latest
    }

    pub fn scopes(&self) -> &ScopeResolver {
        &self.scopes
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Number of passes run so far.
    pub fn passes(&self) -> usize {
        self.passes
    }
}
