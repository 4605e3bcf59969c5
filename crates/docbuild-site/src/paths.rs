//! Path arithmetic for mapping source pages to output pages.
//!
//! Everything here is lexical: symlinks are not resolved and the paths need
//! not exist yet.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Make `path` absolute and remove `.` and `..` components.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined.
pub fn normalize(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

/// Relative path from directory `from_dir` to `to`, joined with `/`.
///
/// Both paths must be normalized. Returns `"."` when they are equal.
#[must_use]
pub fn relative_path(from_dir: &Path, to: &Path) -> String {
    let from: Vec<_> = from_dir.components().collect();
    let target: Vec<_> = to.components().collect();
    let common = from
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();

    let parts: Vec<String> = std::iter::repeat_n("..".to_owned(), from.len() - common)
        .chain(
            target[common..]
                .iter()
                .map(|c| c.as_os_str().to_string_lossy().into_owned()),
        )
        .collect();

    if parts.is_empty() {
        ".".to_owned()
    } else {
        parts.join("/")
    }
}

/// Output file for a source page, given its path relative to the source root.
///
/// `guide/install.md` under `build` becomes `build/guide/install.html`.
#[must_use]
pub fn output_path(output_root: &Path, relative: &Path) -> PathBuf {
    output_root.join(relative).with_extension("html")
}

/// Directory containing `path`, with `.` for bare file names.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
