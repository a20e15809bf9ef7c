//! In-memory session state.
//!
//! Remembers, per (image directory, cell identity) pair, the execution
//! counter last seen for that cell. Lives for the process lifetime, is
//! never persisted, and is rebuilt implicitly as cells re-execute after a
//! restart. Owned by the interception layer and passed by reference to the
//! assigner and the reconciler.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::identity::CellIdentity;

/// Mapping (image directory, identity) -> last-seen execution counter.
#[derive(Debug, Default)]
pub struct SessionState {
    seen: HashMap<PathBuf, HashMap<CellIdentity, u64>>,
}

impl SessionState {
    pub fn new() -> Self {
        SessionState::default()
    }

    /// Execution counter last recorded for this cell in this directory.
    pub fn last_execution(&self, dir: &Path, identity: &CellIdentity) -> Option<u64> {
        self.seen.get(dir)?.get(identity).copied()
    }

    /// Record the execution counter for this cell in this directory.
    pub fn record(&mut self, dir: &Path, identity: &CellIdentity, execution: u64) {
        self.seen
            .entry(dir.to_path_buf())
            .or_default()
            .insert(identity.clone(), execution);
    }

    /// All identities currently associated with a directory.
    pub fn identities_for(&self, dir: &Path) -> HashSet<&CellIdentity> {
        self.seen
            .get(dir)
            .map(|cells| cells.keys().collect())
            .unwrap_or_default()
    }

    /// Number of (directory, identity) pairs tracked.
    pub fn len(&self) -> usize {
        self.seen.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.values().all(HashMap::is_empty)
    }
}
