//! Active-notebook detection.
//!
//! Hosts disagree about where the current notebook's path is recorded: a
//! classic server writes it on the kernel session, an embedded desktop
//! editor publishes a hint global, and a plain console offers nothing at
//! all. Resolution runs an ordered chain of pure detectors over a
//! [`DetectionInputs`] snapshot and takes the first plausible candidate;
//! finding none is an expected outcome, not an error.
//!
//! The same snapshot decides the host flavor, which downstream picks the
//! reference-construction policy.

use std::path::{Path, PathBuf};

use log::debug;

use crate::host::HostSession;

/// Environment variable a notebook server sets to name the session.
pub const SESSION_NAME_ENV_VAR: &str = "JPY_SESSION_NAME";

/// Notebook file extension accepted by the detectors.
const NOTEBOOK_EXTENSION: &str = "ipynb";

/// Which notebook front-end is hosting the session.
///
/// Affects reference construction only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostFlavor {
    /// Classic browser-based notebook server.
    Server,
    /// Notebook embedded in a desktop editor.
    EmbeddedEditor,
    /// Plain interactive console.
    Console,
    /// No live session signals at all.
    Unknown,
}

/// Raw host signals snapshotted before detection runs.
///
/// Keeping the snapshot separate from the trait lets every detector stay a
/// pure function over synthetic inputs.
#[derive(Debug, Clone)]
pub struct DetectionInputs {
    /// Document path recorded on the kernel session.
    pub session_document: Option<String>,
    /// Notebook file hint from an embedded desktop editor.
    pub editor_hint: Option<String>,
    /// Value of the session-name environment variable.
    pub env_session_name: Option<String>,
    /// Working directory relative candidates resolve against.
    pub cwd: PathBuf,
    /// Whether a live host session handle exists.
    pub interactive: bool,
}

impl DetectionInputs {
    /// Snapshot detection inputs from a live host session.
    pub fn from_host(host: &dyn HostSession) -> Self {
        DetectionInputs {
            session_document: host.document_path(),
            editor_hint: host.editor_document_hint(),
            env_session_name: std::env::var(SESSION_NAME_ENV_VAR).ok(),
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            interactive: true,
        }
    }
}

/// Outcome of environment resolution.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Absolute path of the active notebook, when one was detected.
    pub notebook_path: Option<PathBuf>,
    pub flavor: HostFlavor,
}

/// Ordered detector chain; the first non-empty result wins.
const DETECTORS: &[fn(&DetectionInputs) -> Option<PathBuf>] = &[
    detect_session_document,
    detect_editor_hint,
    detect_session_env_var,
];

impl Environment {
    /// Resolve the environment for a live host session.
    pub fn detect(host: &dyn HostSession) -> Environment {
        Environment::resolve(&DetectionInputs::from_host(host))
    }

    /// Resolve the environment from a detection snapshot.
    pub fn resolve(inputs: &DetectionInputs) -> Environment {
        let notebook_path = DETECTORS.iter().find_map(|detect| detect(inputs));
        let flavor = flavor_of(inputs);
        debug!(
            "[environment] notebook={:?} flavor={:?}",
            notebook_path, flavor
        );
        Environment {
            notebook_path,
            flavor,
        }
    }
}

fn flavor_of(inputs: &DetectionInputs) -> HostFlavor {
    if inputs.editor_hint.as_deref().is_some_and(|s| !s.trim().is_empty()) {
        HostFlavor::EmbeddedEditor
    } else if inputs
        .session_document
        .as_deref()
        .is_some_and(|s| !s.trim().is_empty())
        || inputs
            .env_session_name
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    {
        // Both signals only ever originate from a notebook server.
        HostFlavor::Server
    } else if inputs.interactive {
        HostFlavor::Console
    } else {
        HostFlavor::Unknown
    }
}

fn detect_session_document(inputs: &DetectionInputs) -> Option<PathBuf> {
    normalize_notebook_candidate(inputs.session_document.as_deref()?, &inputs.cwd)
}

fn detect_editor_hint(inputs: &DetectionInputs) -> Option<PathBuf> {
    normalize_notebook_candidate(inputs.editor_hint.as_deref()?, &inputs.cwd)
}

fn detect_session_env_var(inputs: &DetectionInputs) -> Option<PathBuf> {
    let path = normalize_notebook_candidate(inputs.env_session_name.as_deref()?, &inputs.cwd)?;
    // The variable sometimes carries a bare session name rather than a real
    // file; only an existing notebook counts.
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}

/// Normalize a candidate string into an absolute notebook path.
///
/// Trims, expands a leading `~`, resolves relative candidates against
/// `cwd`, and rejects anything without the notebook extension.
fn normalize_notebook_candidate(candidate: &str, cwd: &Path) -> Option<PathBuf> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }

    let expanded = expand_home(candidate);
    let path = if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    };

    let is_notebook = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(NOTEBOOK_EXTENSION));
    if is_notebook {
        Some(path)
    } else {
        None
    }
}

fn expand_home(candidate: &str) -> PathBuf {
    if let Some(rest) = candidate.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(candidate)
}
