//! Parallel, deterministic discovery of Rust source files with directory
//! pruning.

use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{EnumcoverError, EnumcoverResult};

/// Directories excluded by default (standard Rust project conventions).
pub const EXCLUDED_DIRS: &[&str] = &["target", ".git", "node_modules", ".cargo"];

/// Checks if a directory entry should be pruned.
///
/// Runs inside `WalkDir::filter_entry`, so a match skips the whole subtree.
#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

/// Gathers all `.rs` files below `root`, skipping the default excluded
/// directories plus `excludes`. The result is sorted.
pub fn gather_rs_files(root: &Path, excludes: &[&str]) -> EnumcoverResult<Vec<PathBuf>> {
    let all_excludes: HashSet<&str> = EXCLUDED_DIRS
        .iter()
        .copied()
        .chain(excludes.iter().copied())
        .collect();

    let mut files = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, &all_excludes))
        .par_bridge()
        .filter_map(|entry| match entry {
            Ok(e) => {
                let path = e.path();
                if e.file_type().is_file() && path.extension().is_some_and(|ext| ext == "rs") {
                    Some(Ok(path.to_path_buf()))
                } else {
                    None
                }
            }
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                Some(Err(match e.into_io_error() {
                    Some(io) => EnumcoverError::io(path, io),
                    None => EnumcoverError::io(
                        path,
                        std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop"),
                    ),
                }))
            }
        })
        .collect::<EnumcoverResult<Vec<_>>>()?;

    files.sort();
    Ok(files)
}
