//! Orphan cleanup.
//!
//! Walks one image directory and deletes artifacts whose identity no cell
//! in the current session owns. Anything that does not parse as one of our
//! artifact names is conservatively kept: better a leftover file than a
//! deleted one that was never ours.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::Serialize;

use crate::figure::ImageFormat;
use crate::identity::parse_artifact_name;
use crate::state::SessionState;

/// Outcome of one cleanup pass.
#[derive(Debug, Clone, Serialize)]
pub struct CleanReport {
    pub deleted: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
    pub kept: Vec<PathBuf>,
    pub summary: String,
}

impl CleanReport {
    fn empty(summary: String) -> Self {
        CleanReport {
            deleted: Vec::new(),
            failed: Vec::new(),
            kept: Vec::new(),
            summary,
        }
    }
}

/// Delete artifacts in `dir` whose identity is absent from `state`.
///
/// A missing directory is an immediate no-op success. Per-file delete
/// failures are recorded, never raised. Does not recurse.
pub fn clean(dir: &Path, state: &SessionState, format: ImageFormat) -> CleanReport {
    if !dir.exists() {
        return CleanReport::empty(format!("Image directory '{}' not found.", dir_label(dir)));
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            return CleanReport::empty(format!(
                "Could not read image directory '{}': {}.",
                dir_label(dir),
                e
            ))
        }
    };

    let live = state.identities_for(dir);
    let suffix = format!(".{}", format.extension());

    let mut deleted = Vec::new();
    let mut failed = Vec::new();
    let mut kept = Vec::new();

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        if !name.ends_with(&suffix) {
            continue;
        }

        match parse_artifact_name(&name, format) {
            Some((identity, _)) if !live.contains(&identity) => {
                match fs::remove_file(&path) {
                    Ok(()) => deleted.push(path),
                    Err(e) => {
                        warn!("[reconcile] could not delete {:?}: {}", path, e);
                        failed.push(path);
                    }
                }
            }
            // Still owned, or not a name we wrote: keep.
            Some(_) | None => kept.push(path),
        }
    }

    deleted.sort();
    failed.sort();
    kept.sort();

    let summary = format!(
        "Cleaned directory '{}'. Deleted: {}, Failed: {}, Kept: {}.",
        dir_label(dir),
        deleted.len(),
        failed.len(),
        kept.len()
    );
    CleanReport {
        deleted,
        failed,
        kept,
        summary,
    }
}

fn dir_label(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}
