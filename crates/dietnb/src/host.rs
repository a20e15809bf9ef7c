//! The consumed kernel-session interface.
//!
//! The engine never talks to a kernel directly. Everything it needs from
//! the host lives behind [`HostSession`]: detection inputs for the active
//! notebook, the execution counter, the metadata of the currently executing
//! request, and the toggle for the host's default inline-image formatter.
//!
//! Post-cell notification is explicit rather than callback-based: the host
//! calls [`crate::strategy::DisplayRegistry::post_execute`] after each cell
//! finishes.

use std::path::PathBuf;

/// Handle onto the host kernel session.
///
/// Every accessor is optional-returning: hosts differ in which signals they
/// provide, and a missing signal is an expected detection miss, never an
/// error.
pub trait HostSession {
    /// Document path recorded on the kernel session, if the host set one.
    fn document_path(&self) -> Option<String>;

    /// Notebook file hint published by an embedded desktop editor, if any.
    fn editor_document_hint(&self) -> Option<String>;

    /// Per-execution counter, non-decreasing within one kernel lifetime.
    fn execution_count(&self) -> Option<u64>;

    /// Metadata dictionary of the currently executing request.
    ///
    /// Front-ends that supply a stable per-cell identifier put it here
    /// under `cellId` (or the older `cell_id`).
    fn request_metadata(&self) -> Option<serde_json::Value>;

    /// Raw source text of the most recently executed input.
    fn last_raw_input(&self) -> Option<String>;

    /// Content root of the notebook server this kernel is connected to,
    /// when the host knows it. Used for server-rooted `/files/` references.
    fn server_root(&self) -> Option<PathBuf>;

    /// Whether the host's default inline-image formatter is enabled.
    fn inline_images(&self) -> bool;

    /// Enable or disable the host's default inline-image formatter.
    fn set_inline_images(&mut self, enabled: bool);
}
