//! The consumed plotting interface.
//!
//! A figure only needs to render itself to a file at a given format and
//! resolution; the global registry only needs to report and close open
//! figures so memory stays bounded between cells.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raster formats artifacts can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// File extension used in artifact names.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Failure to produce an image file from a figure.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The plotting backend could not render the figure.
    #[error("figure backend error: {0}")]
    Backend(String),
    /// The rendered bytes could not be written.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// One renderable figure.
pub trait Figure {
    /// Render this figure to `path` in the given format at `dpi`, with a
    /// tight bounding box. Overwrites any existing file at `path`.
    fn save(&self, path: &Path, format: ImageFormat, dpi: u32) -> Result<(), RenderError>;

    /// A token distinguishing this figure object within the process.
    ///
    /// Last-resort identity signal; not stable across processes or even
    /// across re-executions of the same cell.
    fn instance_token(&self) -> u64;
}

/// The plotting library's registry of currently open figures.
pub trait FigureRegistry {
    /// Number of figures currently open.
    fn open_count(&self) -> usize;

    /// Close every open figure. Safe to call with none open.
    fn close_all(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(ImageFormat::Png.extension(), "png");
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
        assert_eq!(ImageFormat::Png.to_string(), "png");
    }

    #[test]
    fn test_format_serde_lowercase() {
        let json = serde_json::to_string(&ImageFormat::Png).unwrap();
        assert_eq!(json, "\"png\"");
        let parsed: ImageFormat = serde_json::from_str("\"jpeg\"").unwrap();
        assert_eq!(parsed, ImageFormat::Jpeg);
    }

    #[test]
    fn test_render_error_from_io() {
        let err: RenderError = io::Error::new(io::ErrorKind::PermissionDenied, "nope").into();
        assert!(matches!(err, RenderError::Io(_)));
    }
}
