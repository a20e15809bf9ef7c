//! Artifact writing.

use std::fs;
use std::path::{Path, PathBuf};

use crate::figure::{Figure, ImageFormat, RenderError};

/// Render `figure` into `dir/file_name`.
///
/// The directory is re-created immediately before the write, tolerating a
/// concurrent cleanup between directory resolution and the render. Writes
/// use create-or-truncate semantics; replacing an artifact from a previous
/// execution is not atomic.
pub fn write_artifact(
    figure: &dyn Figure,
    dir: &Path,
    file_name: &str,
    format: ImageFormat,
    dpi: u32,
) -> Result<PathBuf, RenderError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    figure.save(&path, format, dpi)?;
    Ok(path)
}
