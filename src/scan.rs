//! Directory Scanner
//!
//! Lists candidate input files: regular files directly inside the source
//! directory whose extension matches. No recursion.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Scan `dir` for files ending in `.{extension}`, sorted by file name so
/// that consolidation order (and therefore overwrite order) is stable.
/// A file named exactly `.{extension}` counts too.
pub fn scan_dir(dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    let suffix = format!(".{extension}");
    let mut files = vec![];
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(false, |n| n.ends_with(&suffix));
        if matches {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    tracing::debug!(dir = %dir.display(), count = files.len(), "scanned input directory");
    Ok(files)
}
