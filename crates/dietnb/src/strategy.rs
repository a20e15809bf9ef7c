//! The interception layer.
//!
//! A [`DisplayRegistry`] owns the currently installed rendering strategy,
//! the session state, and the configuration. Inactive, the null-object
//! [`DefaultStrategy`] answers `None` for every figure and the host keeps
//! embedding image data inline. Activated, [`ActiveStrategy`] routes each
//! figure through resolve -> assign -> write -> reference and answers the
//! markup fragment instead.
//!
//! Activation captures the host's inline-image formatter flag before the
//! first override, so deactivation restores exactly the prior behavior.
//! The host is expected to call [`DisplayRegistry::post_execute`] after
//! every cell; some hosts reset formatter state between cells, so the
//! override is re-asserted there.

use std::path::PathBuf;

use log::{debug, info, warn};

use crate::assigner;
use crate::environment::Environment;
use crate::figure::{Figure, FigureRegistry};
use crate::host::HostSession;
use crate::identity::{self, CellIdentity};
use crate::image_dir;
use crate::reconcile::{self, CleanReport};
use crate::reference::{self, RefContext};
use crate::state::SessionState;
use crate::writer;
use crate::Config;

/// A pluggable figure representation policy.
pub trait RenderingStrategy {
    /// Produce the markup representation for `figure`, or `None` to let
    /// the host fall back to its default behavior.
    fn render(
        &mut self,
        figure: &dyn Figure,
        host: &dyn HostSession,
        config: &Config,
        state: &mut SessionState,
    ) -> Option<String>;
}

/// Null object: never produces a representation.
#[derive(Debug, Default)]
pub struct DefaultStrategy;

impl RenderingStrategy for DefaultStrategy {
    fn render(
        &mut self,
        _figure: &dyn Figure,
        _host: &dyn HostSession,
        _config: &Config,
        _state: &mut SessionState,
    ) -> Option<String> {
        None
    }
}

/// External-file rendering pipeline.
///
/// Never lets an error escape: every failure degrades to `None`, which the
/// host shows as a missing representation while the cell keeps running.
#[derive(Debug, Default)]
pub struct ActiveStrategy;

impl RenderingStrategy for ActiveStrategy {
    fn render(
        &mut self,
        figure: &dyn Figure,
        host: &dyn HostSession,
        config: &Config,
        state: &mut SessionState,
    ) -> Option<String> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let env = Environment::detect(host);

        let dir = match image_dir::ensure_image_dir(
            env.notebook_path.as_deref(),
            &config.folder_name,
            &cwd,
        ) {
            Ok(dir) => dir,
            Err(e) => {
                warn!("[dietnb] no usable image directory: {}", e);
                return None;
            }
        };

        let identity = CellIdentity::derive(host, figure);
        let execution = identity::execution_counter(host);
        let assignment = assigner::assign(state, &dir, &identity, execution, config.format);
        let file_name = identity::artifact_file_name(&identity, assignment.sequence, config.format);

        let path = match writer::write_artifact(figure, &dir, &file_name, config.format, config.dpi)
        {
            Ok(path) => path,
            Err(e) => {
                warn!("[dietnb] could not write {}: {}", file_name, e);
                return None;
            }
        };
        debug!(
            "[dietnb] wrote {:?} (execution {}, sequence {}, new_execution={})",
            path, execution, assignment.sequence, assignment.new_execution
        );

        let server_root = host.server_root();
        let ctx = RefContext {
            flavor: env.flavor,
            notebook_path: env.notebook_path.as_deref(),
            server_root: server_root.as_deref(),
            cwd: &cwd,
            execution,
        };
        let src = reference::build_src(&path, &ctx);
        Some(reference::img_tag(&src, &file_name))
    }
}

/// Owns the installed strategy and drives activation, display, post-cell
/// cleanup, and orphan reclamation.
pub struct DisplayRegistry {
    strategy: Box<dyn RenderingStrategy>,
    state: SessionState,
    config: Config,
    saved_inline_images: Option<bool>,
    active: bool,
}

impl DisplayRegistry {
    pub fn new() -> Self {
        DisplayRegistry::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        DisplayRegistry {
            strategy: Box::new(DefaultStrategy),
            state: SessionState::new(),
            config,
            saved_inline_images: None,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Redirect figure rendering through the external-file pipeline.
    ///
    /// Disables the host's inline-image formatter, remembering its prior
    /// state the first time. Idempotent.
    pub fn activate(&mut self, host: &mut dyn HostSession) {
        if self.saved_inline_images.is_none() {
            self.saved_inline_images = Some(host.inline_images());
        }
        host.set_inline_images(false);
        if !self.active {
            self.strategy = Box::new(ActiveStrategy);
            self.active = true;
            info!(
                "[dietnb] activated; figures render to '{}' directories",
                self.config.folder_name
            );
        }
    }

    /// Restore the host's default figure behavior.
    ///
    /// Deactivating while inactive is a no-op.
    pub fn deactivate(&mut self, host: &mut dyn HostSession) {
        if !self.active {
            return;
        }
        if let Some(enabled) = self.saved_inline_images.take() {
            host.set_inline_images(enabled);
        }
        self.strategy = Box::new(DefaultStrategy);
        self.active = false;
        info!("[dietnb] deactivated; inline embedding restored");
    }

    /// The host's rich-representation hook for one figure.
    pub fn display(&mut self, figure: &dyn Figure, host: &dyn HostSession) -> Option<String> {
        self.strategy
            .render(figure, host, &self.config, &mut self.state)
    }

    /// Post-cell hook: close open figures and re-assert the override.
    ///
    /// Closing bounds memory across cells; re-asserting guards against
    /// hosts that reset formatter state between cells. Does nothing while
    /// inactive, mirroring the hook registration deactivation undoes.
    pub fn post_execute(&mut self, host: &mut dyn HostSession, figures: &mut dyn FigureRegistry) {
        if !self.active {
            return;
        }
        if figures.open_count() > 0 {
            figures.close_all();
        }
        host.set_inline_images(false);
    }

    /// Reclaim orphaned artifacts in the current context's image directory.
    ///
    /// Resolves the directory the same way rendering would, without
    /// creating it.
    pub fn clean_unused(&self, host: &dyn HostSession) -> CleanReport {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let env = Environment::detect(host);
        let dir = image_dir::image_dir_path(
            env.notebook_path.as_deref(),
            &self.config.folder_name,
            &cwd,
        );
        reconcile::clean(&dir, &self.state, self.config.format)
    }
}

impl Default for DisplayRegistry {
    fn default() -> Self {
        DisplayRegistry::new()
    }
}
