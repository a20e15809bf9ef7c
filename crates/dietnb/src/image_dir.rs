//! Image directory placement and creation.
//!
//! One directory per notebook (`{stem}_{folder_name}`, sibling to the
//! notebook file), or one shared `{cwd}/{folder_name}` default when no
//! notebook path is known. Creation is idempotent and falls back to the
//! cwd default if the notebook-sibling directory cannot be created.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

/// Compute the target image directory without touching the filesystem.
pub fn image_dir_path(notebook_path: Option<&Path>, folder_name: &str, cwd: &Path) -> PathBuf {
    if let Some(notebook) = notebook_path {
        let stem = notebook
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !stem.is_empty() {
            if let Some(parent) = notebook.parent() {
                return parent.join(format!("{}_{}", stem, folder_name));
            }
        }
    }
    cwd.join(folder_name)
}

/// Compute the target image directory and make sure it exists.
///
/// An already-existing directory is success. If the notebook-sibling
/// target cannot be created, falls back to `{cwd}/{folder_name}`; only
/// failure to create that too is an error.
pub fn ensure_image_dir(
    notebook_path: Option<&Path>,
    folder_name: &str,
    cwd: &Path,
) -> io::Result<PathBuf> {
    let target = image_dir_path(notebook_path, folder_name, cwd);
    match fs::create_dir_all(&target) {
        Ok(()) => Ok(target),
        Err(e) => {
            let fallback = cwd.join(folder_name);
            if fallback == target {
                return Err(e);
            }
            debug!(
                "[image_dir] could not create {:?} ({}), falling back to {:?}",
                target, e, fallback
            );
            fs::create_dir_all(&fallback)?;
            Ok(fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sibling_directory_for_notebook() {
        let path = image_dir_path(
            Some(Path::new("/nb/analysis.ipynb")),
            "dietnb_imgs",
            Path::new("/work"),
        );
        assert_eq!(path, PathBuf::from("/nb/analysis_dietnb_imgs"));
    }

    #[test]
    fn test_cwd_default_without_notebook() {
        let path = image_dir_path(None, "dietnb_imgs", Path::new("/home/u/work"));
        assert_eq!(path, PathBuf::from("/home/u/work/dietnb_imgs"));
    }

    #[test]
    fn test_empty_stem_falls_back_to_cwd() {
        let path = image_dir_path(Some(Path::new("/nb/.ipynb")), "dietnb_imgs", Path::new("/w"));
        assert_eq!(path, PathBuf::from("/w/dietnb_imgs"));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let nb = Path::new("/nb/analysis.ipynb");
        let cwd = Path::new("/work");
        assert_eq!(
            image_dir_path(Some(nb), "dietnb_imgs", cwd),
            image_dir_path(Some(nb), "dietnb_imgs", cwd)
        );
    }

    #[test]
    fn test_ensure_creates_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let notebook = dir.path().join("analysis.ipynb");

        let first = ensure_image_dir(Some(&notebook), "dietnb_imgs", dir.path()).unwrap();
        assert!(first.is_dir());
        assert_eq!(first, dir.path().join("analysis_dietnb_imgs"));

        let second = ensure_image_dir(Some(&notebook), "dietnb_imgs", dir.path()).unwrap();
        assert_eq!(first, second);
        assert!(second.is_dir());
    }

    #[test]
    fn test_ensure_falls_back_when_sibling_blocked() {
        let nb_dir = TempDir::new().unwrap();
        let cwd = TempDir::new().unwrap();
        let notebook = nb_dir.path().join("analysis.ipynb");
        // A plain file squatting on the target path makes creation fail.
        fs::write(nb_dir.path().join("analysis_dietnb_imgs"), "in the way").unwrap();

        let resolved = ensure_image_dir(Some(&notebook), "dietnb_imgs", cwd.path()).unwrap();
        assert_eq!(resolved, cwd.path().join("dietnb_imgs"));
        assert!(resolved.is_dir());
    }
}
