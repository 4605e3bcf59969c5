//! Markdown source discovery.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Finds Markdown files under a source root.
pub(crate) struct Scanner {
    source_dir: PathBuf,
    exclude: Option<PathBuf>,
}

impl Scanner {
    /// Create a scanner for `source_dir`.
    ///
    /// `exclude` names a directory to skip entirely, typically the output root
    /// when it sits inside the source tree.
    pub fn new(source_dir: PathBuf, exclude: Option<PathBuf>) -> Self {
        Self {
            source_dir,
            exclude,
        }
    }

    /// Return the paths of all `.md` files, relative to the source root.
    ///
    /// Hidden files and directories are skipped. Order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns an error if the source root cannot be read. Unreadable
    /// subdirectories are skipped.
    pub fn scan(&self) -> io::Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.source_dir)?;
        let mut pages = Vec::new();
        self.scan_entries(entries, Path::new(""), &mut pages);
        Ok(pages)
    }

    fn scan_directory(&self, dir_path: &Path, prefix: &Path, pages: &mut Vec<PathBuf>) {
        match fs::read_dir(dir_path) {
            Ok(entries) => self.scan_entries(entries, prefix, pages),
            Err(e) => {
                tracing::warn!(path = %dir_path.display(), error = %e, "Skipping unreadable directory");
            }
        }
    }

    fn scan_entries(&self, entries: fs::ReadDir, prefix: &Path, pages: &mut Vec<PathBuf>) {
        for entry in entries.filter_map(Result::ok) {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') {
                continue;
            }

            let path = entry.path();
            let relative = prefix.join(&name);
            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());

            if is_dir {
                if self.exclude.as_deref() == Some(path.as_path()) {
                    continue;
                }
                self.scan_directory(&path, &relative, pages);
            } else if path.extension().is_some_and(|e| e == "md") {
                pages.push(relative);
            }
        }
    }
}
