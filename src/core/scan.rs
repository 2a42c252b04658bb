//! Source tree scanning

use crate::domain::errors::Md2NoteError;
use crate::domain::result::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Finds the Markdown files to export under a root directory
pub trait Scanner: Send + Sync {
    /// Returns matching files in a stable, sorted order
    ///
    /// # Errors
    ///
    /// Returns [`Md2NoteError::PermissionDenied`] when `root` cannot be read
    /// for lack of permission and [`Md2NoteError::DirectoryNotFound`] when it
    /// is not a listable directory.
    fn scan(&self, root: &Path) -> Result<Vec<PathBuf>>;
}

/// Recursive filesystem scanner
///
/// Hidden entries and excluded directories (the clean tree) are skipped.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    extensions: Vec<String>,
    excluded: Vec<PathBuf>,
}

impl DirectoryScanner {
    /// Creates a scanner for the given extensions (without leading dot)
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            excluded: Vec::new(),
        }
    }

    /// Skips `dir` and everything below it
    pub fn exclude(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.excluded.push(fs::canonicalize(&dir).unwrap_or(dir));
        self
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }

    fn is_excluded(&self, dir: &Path) -> bool {
        if self.excluded.is_empty() {
            return false;
        }
        let canonical = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        self.excluded.iter().any(|e| *e == canonical)
    }

    fn walk(&self, dir: &Path, files: &mut Vec<PathBuf>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Skipping unreadable directory");
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if is_hidden(&path) {
                continue;
            }

            let Ok(file_type) = entry.file_type() else {
                continue;
            };

            if file_type.is_dir() {
                if self.is_excluded(&path) {
                    tracing::debug!(path = %path.display(), "Skipping excluded directory");
                    continue;
                }
                self.walk(&path, files);
            } else if file_type.is_file() && self.matches(&path) {
                files.push(path);
            }
        }
    }
}

impl Default for DirectoryScanner {
    fn default() -> Self {
        Self::new(["md", "markdown"])
    }
}

impl Scanner for DirectoryScanner {
    fn scan(&self, root: &Path) -> Result<Vec<PathBuf>> {
        validate_source_root(root)?;

        let mut files = Vec::new();
        self.walk(root, &mut files);
        files.sort();

        tracing::debug!(root = %root.display(), count = files.len(), "Scan complete");
        Ok(files)
    }
}

/// Checks that `root` exists, is a directory and can be listed
///
/// # Errors
///
/// Returns [`Md2NoteError::DirectoryNotFound`] or
/// [`Md2NoteError::PermissionDenied`].
pub fn validate_source_root(root: &Path) -> Result<()> {
    if !root.is_dir() {
        return Err(Md2NoteError::DirectoryNotFound(root.display().to_string()));
    }

    fs::read_dir(root).map_err(|e| unreadable_root(root, &e))?;

    Ok(())
}

/// Any failure to list the root is fatal for the run
fn unreadable_root(root: &Path, error: &std::io::Error) -> Md2NoteError {
    match error.kind() {
        std::io::ErrorKind::PermissionDenied => {
            Md2NoteError::PermissionDenied(root.display().to_string())
        }
        _ => Md2NoteError::DirectoryNotFound(format!("{}: {error}", root.display())),
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}
