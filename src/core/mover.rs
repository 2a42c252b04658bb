//! Relocation of exported source files into the clean tree

use crate::domain::errors::Md2NoteError;
use crate::domain::result::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Moves an exported file out of the source tree
pub trait FileMover: Send + Sync {
    /// Moves `path` to the same relative location under `clean_root`
    ///
    /// Returns the new location.
    ///
    /// # Errors
    ///
    /// Returns [`Md2NoteError::PostExportMove`] when the file is outside
    /// `source_root` or cannot be moved.
    fn relocate(&self, path: &Path, source_root: &Path, clean_root: &Path) -> Result<PathBuf>;
}

/// Filesystem mover
///
/// Uses a rename where possible and falls back to copy and remove when the
/// clean tree is on another filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileMover;

impl FsFileMover {
    pub fn new() -> Self {
        Self
    }
}

impl FileMover for FsFileMover {
    fn relocate(&self, path: &Path, source_root: &Path, clean_root: &Path) -> Result<PathBuf> {
        let relative = path.strip_prefix(source_root).map_err(|_| {
            Md2NoteError::PostExportMove(format!(
                "{} is not inside {}",
                path.display(),
                source_root.display()
            ))
        })?;
        let destination = clean_root.join(relative);

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Md2NoteError::PostExportMove(format!(
                    "Failed to create {}: {e}",
                    parent.display()
                ))
            })?;
        }

        if fs::rename(path, &destination).is_err() {
            // rename fails across filesystems
            fs::copy(path, &destination).map_err(|e| {
                Md2NoteError::PostExportMove(format!(
                    "Failed to copy {} to {}: {e}",
                    path.display(),
                    destination.display()
                ))
            })?;
            fs::remove_file(path).map_err(|e| {
                Md2NoteError::PostExportMove(format!(
                    "Copied to {} but failed to remove {}: {e}",
                    destination.display(),
                    path.display()
                ))
            })?;
        }

        tracing::debug!(
            from = %path.display(),
            to = %destination.display(),
            "Moved exported file"
        );
        Ok(destination)
    }
}
