//! Media directory mirroring.

use std::fs;
use std::io;
use std::path::Path;

/// Recursively copy every file under `from` into `to`.
///
/// Directories are created as needed and existing files are overwritten.
/// Entries under `from` whose path equals one of `skip` are left out, along
/// with `to` itself when it lies inside `from`. Returns the number of files
/// copied.
///
/// # Errors
///
/// Returns the first I/O error encountered.
pub fn mirror_tree(from: &Path, to: &Path, skip: &[&Path]) -> io::Result<usize> {
    let mut excluded: Vec<&Path> = skip.to_vec();
    excluded.push(to);
    copy_dir(from, to, &excluded)
}

fn copy_dir(from: &Path, to: &Path, excluded: &[&Path]) -> io::Result<usize> {
    fs::create_dir_all(to)?;
    let mut copied = 0;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let path = entry.path();
        if excluded.contains(&path.as_path()) {
            continue;
        }
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copied += copy_dir(&path, &target, excluded)?;
        } else {
            fs::copy(&path, &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
