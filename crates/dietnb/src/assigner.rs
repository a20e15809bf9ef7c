//! Sequence assignment and prior-execution purge.
//!
//! The first figure of a new execution evicts every artifact the same cell
//! wrote before, so a re-executed cell never accumulates files; further
//! figures within the same execution extend the sequence instead.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::figure::ImageFormat;
use crate::identity::{parse_artifact_name, CellIdentity};
use crate::state::SessionState;

/// Placement decision for one figure render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    /// 1-based index of this figure within the cell's current execution.
    pub sequence: u32,
    /// Whether this render starts a new execution of the cell.
    pub new_execution: bool,
}

/// Decide the sequence number for the next artifact of `identity`.
///
/// A counter mismatch (or no record at all) marks a new execution: prior
/// artifacts for the identity are purged best-effort and the state entry is
/// updated before anything is written. A matching counter means another
/// figure from the same execution, numbered after whatever is already on
/// disk.
pub fn assign(
    state: &mut SessionState,
    dir: &Path,
    identity: &CellIdentity,
    execution: u64,
    format: ImageFormat,
) -> Assignment {
    if state.last_execution(dir, identity) != Some(execution) {
        purge_previous(dir, identity, format);
        state.record(dir, identity, execution);
        Assignment {
            sequence: 1,
            new_execution: true,
        }
    } else {
        let existing = artifacts_for(dir, identity, format).len() as u32;
        Assignment {
            sequence: existing + 1,
            new_execution: false,
        }
    }
}

/// All on-disk artifacts for `identity` in `dir`.
///
/// An unreadable directory yields an empty list; the caller is about to
/// (re-)create it anyway.
pub(crate) fn artifacts_for(dir: &Path, identity: &CellIdentity, format: ImageFormat) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return found,
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = match name.to_str() {
            Some(name) => name,
            None => continue,
        };
        if let Some((parsed, _)) = parse_artifact_name(name, format) {
            if parsed == *identity {
                found.push(entry.path());
            }
        }
    }
    found
}

fn purge_previous(dir: &Path, identity: &CellIdentity, format: ImageFormat) {
    for path in artifacts_for(dir, identity, format) {
        if let Err(e) = fs::remove_file(&path) {
            // Best effort: a busy file must not block the new render.
            debug!("[assigner] leaving stale artifact {:?}: {}", path, e);
        }
    }
}
