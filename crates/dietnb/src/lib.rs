//! dietnb - external-file figure rendering for notebook sessions.
//!
//! Embedding raster image data inline in cell output bloats notebook files;
//! a handful of plots can dwarf the code that produced them. This crate
//! redirects figure display: each figure is rendered to an image directory
//! next to the notebook and the cell shows a lightweight `<img>` reference
//! pointing at that file instead. Files left behind by re-executed or
//! deleted cells are reclaimed on request.
//!
//! The host kernel and the plotting backend are consumed through traits
//! ([`host::HostSession`], [`figure::Figure`]), so the engine itself is
//! synchronous, filesystem-only, and testable with synthetic hosts. The
//! entry point is [`strategy::DisplayRegistry`]: activate it against a live
//! session, route figure display through it, and call its post-execution
//! hook after each cell.

pub mod assigner;
pub mod environment;
pub mod figure;
pub mod host;
pub mod identity;
pub mod image_dir;
pub mod reconcile;
pub mod reference;
pub mod state;
pub mod strategy;
pub mod writer;

use figure::ImageFormat;

/// Default image directory name, also the suffix for notebook-sibling
/// directories (`{notebook_stem}_dietnb_imgs`).
pub const DEFAULT_FOLDER_NAME: &str = "dietnb_imgs";

/// Default render resolution in dots per inch.
pub const DEFAULT_DPI: u32 = 150;

/// Process-wide rendering configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Image directory name: `{notebook_stem}_{folder_name}` next to the
    /// notebook, or `./{folder_name}` when no notebook path resolves.
    pub folder_name: String,
    /// Raster format artifacts are written in.
    pub format: ImageFormat,
    /// Render resolution passed to the figure backend.
    pub dpi: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            folder_name: DEFAULT_FOLDER_NAME.to_string(),
            format: ImageFormat::Png,
            dpi: DEFAULT_DPI,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Synthetic host and figure implementations for unit tests.

    use std::path::{Path, PathBuf};

    use crate::figure::{Figure, FigureRegistry, ImageFormat, RenderError};
    use crate::host::HostSession;

    #[derive(Debug, Default)]
    pub struct FakeHost {
        pub document_path: Option<String>,
        pub editor_hint: Option<String>,
        pub execution_count: Option<u64>,
        pub metadata: Option<serde_json::Value>,
        pub raw_input: Option<String>,
        pub server_root: Option<PathBuf>,
        pub inline_images: bool,
    }

    impl HostSession for FakeHost {
        fn document_path(&self) -> Option<String> {
            self.document_path.clone()
        }

        fn editor_document_hint(&self) -> Option<String> {
            self.editor_hint.clone()
        }

        fn execution_count(&self) -> Option<u64> {
            self.execution_count
        }

        fn request_metadata(&self) -> Option<serde_json::Value> {
            self.metadata.clone()
        }

        fn last_raw_input(&self) -> Option<String> {
            self.raw_input.clone()
        }

        fn server_root(&self) -> Option<PathBuf> {
            self.server_root.clone()
        }

        fn inline_images(&self) -> bool {
            self.inline_images
        }

        fn set_inline_images(&mut self, enabled: bool) {
            self.inline_images = enabled;
        }
    }

    #[derive(Debug)]
    pub struct FakeFigure {
        pub token: u64,
        pub payload: Vec<u8>,
        pub fail: bool,
    }

    impl FakeFigure {
        pub fn new(token: u64) -> Self {
            FakeFigure {
                token,
                payload: b"fake image bytes".to_vec(),
                fail: false,
            }
        }
    }

    impl Figure for FakeFigure {
        fn save(&self, path: &Path, _format: ImageFormat, _dpi: u32) -> Result<(), RenderError> {
            if self.fail {
                return Err(RenderError::Backend("synthetic failure".to_string()));
            }
            std::fs::write(path, &self.payload)?;
            Ok(())
        }

        fn instance_token(&self) -> u64 {
            self.token
        }
    }

    #[derive(Debug, Default)]
    pub struct FakeFigures {
        pub open: usize,
    }

    impl FigureRegistry for FakeFigures {
        fn open_count(&self) -> usize {
            self.open
        }

        fn close_all(&mut self) {
            self.open = 0;
        }
    }
}
