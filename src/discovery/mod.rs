//! Descriptor file discovery
//!
//! Walks a directory tree and collects every file whose extension matches the
//! configured descriptor type. Traversal problems (unreadable directory,
//! broken link) abort the whole sweep before any installation starts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Recursively collect descriptor files under `root`.
///
/// The extension is compared case-insensitively and without the leading dot,
/// so `a.inf` and `sub/c.INF` both match `"inf"`. Directories are never
/// yielded. Returns the first traversal error instead of a partial list.
pub fn find_descriptors(
    root: &Path,
    extension: &str,
    follow_symlinks: bool,
) -> Result<Vec<PathBuf>> {
    let mut descriptors = Vec::new();

    for entry in WalkDir::new(root).follow_links(follow_symlinks) {
        let entry =
            entry.with_context(|| format!("failed to read directory tree at {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if has_extension(entry.path(), extension) {
            descriptors.push(entry.into_path());
        }
    }

    Ok(descriptors)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}
