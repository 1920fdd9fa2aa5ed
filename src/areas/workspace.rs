//! Working directory file system operations
//!
//! The workspace owns every interaction with the working tree: turning user
//! supplied paths into canonical index keys, remapping canonical keys to
//! repository-relative paths for tree construction, and the bounded
//! deletion used by `remove`.
//!
//! ## Path keys
//!
//! Index keys are canonicalized absolute path strings: symlink-resolved
//! when the file exists, lexically normalized otherwise. Equal files always
//! produce equal keys regardless of how the path was spelled (`a.txt`,
//! `./a.txt`, ...).

use crate::error::{GitletError, Result};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Make a user-supplied path absolute against the repository root
    pub fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.path.join(file)
        }
    }

    /// Canonicalize a path into an index key
    ///
    /// Resolves symlinks when the target exists; falls back to the lexically
    /// normalized absolute path when it does not.
    pub fn canonicalize(&self, file: &Path) -> String {
        let absolute = self.resolve(file);

        match std::fs::canonicalize(&absolute) {
            Ok(real_path) => real_path.to_string_lossy().into_owned(),
            Err(_) => normalize_lexically(&absolute)
                .to_string_lossy()
                .into_owned(),
        }
    }

    /// Remap a canonical index key to a repository-relative path with `/`
    /// separators
    ///
    /// Keys outside the repository root fall back to lexical normalization
    /// with leading separators stripped, landing under whatever first
    /// segment arises.
    pub fn rel_path(&self, key: &str) -> String {
        let path = Path::new(key);
        let relative = match path.strip_prefix(self.path.as_ref()) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => normalize_lexically(path),
        };

        relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Delete a file or directory from the working tree
    ///
    /// Refuses to operate on anything whose resolved real path escapes the
    /// repository root. Directories are removed recursively.
    pub fn delete(&self, file: &Path) -> Result<()> {
        let target = std::fs::canonicalize(self.resolve(file))?;
        let root = std::fs::canonicalize(self.path.as_ref())?;

        if !target.starts_with(&root) {
            return Err(GitletError::Io(std::io::Error::new(
                ErrorKind::PermissionDenied,
                format!(
                    "refusing to delete {} outside the working directory",
                    target.display()
                ),
            )));
        }

        if target.is_dir() {
            std::fs::remove_dir_all(&target)?;
        } else {
            std::fs::remove_file(&target)?;
        }

        Ok(())
    }
}

/// Normalize a path without touching the filesystem: drop `.` components
/// and resolve `..` against the parent.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }

    normalized
}
