//! Markup reference construction.
//!
//! Turns an absolute artifact path into the `src` string a front-end can
//! actually load, which depends on who is serving the file: an embedded
//! editor resolves filesystem-relative paths, a notebook server exposes
//! its content root under `/files/`, and a console gets the plain relative
//! path. Every reference carries a `?v={execution}` query so browser and
//! editor caches never show a stale render for a reused name.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::environment::HostFlavor;

/// Escape set for `/files/` references: keep `/` and the characters the
/// usual URL path quoting keeps.
const REFERENCE_ESCAPE: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

/// Everything reference construction depends on besides the artifact path.
#[derive(Debug, Clone)]
pub struct RefContext<'a> {
    pub flavor: HostFlavor,
    /// Absolute path of the active notebook, when known.
    pub notebook_path: Option<&'a Path>,
    /// Content root of the connected notebook server, when known.
    pub server_root: Option<&'a Path>,
    /// Working directory used for relative fallbacks.
    pub cwd: &'a Path,
    /// Execution counter appended as the cache-busting query.
    pub execution: u64,
}

/// Build the `src` reference for an absolute artifact path.
pub fn build_src(artifact: &Path, ctx: &RefContext) -> String {
    let segment = match ctx.flavor {
        HostFlavor::Server => server_segment(artifact, ctx),
        HostFlavor::EmbeddedEditor | HostFlavor::Console | HostFlavor::Unknown => {
            relative_segment(artifact, ctx)
        }
    };
    format!("{}?v={}", segment, ctx.execution)
}

/// The produced markup fragment.
pub fn img_tag(src: &str, file_name: &str) -> String {
    format!(
        r#"<img src="{}" alt="{}" style="max-width:100%;">"#,
        src, file_name
    )
}

/// Notebook-relative, then cwd-relative, then the bare file name.
fn relative_segment(artifact: &Path, ctx: &RefContext) -> String {
    if let Some(notebook) = ctx.notebook_path {
        if let Some(base) = notebook.parent() {
            if let Some(rel) = relative_path(artifact, base) {
                return posix(&rel);
            }
        }
    }
    if let Some(rel) = relative_path(artifact, ctx.cwd) {
        return posix(&rel);
    }
    file_name_of(artifact)
}

/// Server-rooted `/files/` URL path, narrowing through the fallbacks.
fn server_segment(artifact: &Path, ctx: &RefContext) -> String {
    if let Some(root) = ctx.server_root {
        if let Ok(rel) = artifact.strip_prefix(root) {
            return format!("/files/{}", encode(&posix(rel)));
        }
    }
    if let Ok(rel) = artifact.strip_prefix(ctx.cwd) {
        return format!("/files/{}", encode(&posix(rel)));
    }
    let dir_name = artifact
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "/files/{}/{}",
        encode(&dir_name),
        encode(&file_name_of(artifact))
    )
}

/// Relative path from `base` to `path`, with `..` traversal.
///
/// `None` when the pair cannot be related (different volume, or mixed
/// absolute/relative inputs).
fn relative_path(path: &Path, base: &Path) -> Option<PathBuf> {
    if path.is_absolute() != base.is_absolute() {
        return None;
    }
    let path_comps: Vec<Component> = path.components().collect();
    let base_comps: Vec<Component> = base.components().collect();

    // Different prefixes (drive letters) cannot be bridged with `..`.
    if let (Some(Component::Prefix(a)), Some(Component::Prefix(b))) =
        (path_comps.first(), base_comps.first())
    {
        if a != b {
            return None;
        }
    }

    let common = path_comps
        .iter()
        .zip(base_comps.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base_comps.len() {
        rel.push("..");
    }
    for comp in &path_comps[common..] {
        rel.push(comp.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    Some(rel)
}

/// Forward-slash rendering of a (relative) path.
fn posix(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn encode(segment: &str) -> Cow<'_, str> {
    utf8_percent_encode(segment, &REFERENCE_ESCAPE).into()
}
