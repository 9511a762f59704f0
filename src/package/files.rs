// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Collects the package paths of everything installed into a staging root.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{PackageError, PackageResult};

/// Walk the staging root and collect package paths (rooted at `/`), sorted.
///
/// Regular files and symlinks (including symlinks to directories) are collected, as well as
/// empty directories, which would otherwise vanish from the package.
///
/// # Errors
/// Returns an error if walking the directory fails.
pub fn collect_install_files(root: &Path) -> PackageResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let e = entry.map_err(|e| PackageError::WalkDirFailed {
            path: root.to_path_buf(),
            source: e,
        })?;
        let file_type = e.file_type();
        let keep = if file_type.is_dir() {
            is_empty_dir(e.path())
        } else {
            file_type.is_file() || file_type.is_symlink()
        };
        if keep {
            files.push(package_path(root, e.path()));
        }
    }
    files.sort();
    Ok(files)
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_none())
}

/// Get the absolute path of the file within the package.
fn package_path(root: &Path, path: &Path) -> PathBuf {
    // Entries yielded by the walk are always below the root.
    let stripped = path.strip_prefix(root).unwrap_or(path);
    Path::new("/").join(stripped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    #[test]
    fn test_collect_install_files() {
        let root = TempDir::new().unwrap();
        let lib = root.path().join("usr/lib64");
        fs::create_dir_all(&lib).unwrap();
        fs::create_dir_all(root.path().join("usr/share/empty")).unwrap();
        fs::create_dir_all(root.path().join("opt/real")).unwrap();
        fs::write(lib.join("libz.so.1.3"), "lib").unwrap();
        fs::write(root.path().join("opt/real/file"), "x").unwrap();
        symlink("libz.so.1.3", lib.join("libz.so")).unwrap();
        symlink("real", root.path().join("opt/linked")).unwrap();

        let files = collect_install_files(root.path()).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("/opt/linked"),
                PathBuf::from("/opt/real/file"),
                PathBuf::from("/usr/lib64/libz.so"),
                PathBuf::from("/usr/lib64/libz.so.1.3"),
                PathBuf::from("/usr/share/empty"),
            ]
        );
    }

    #[test]
    fn test_missing_root() {
        let result = collect_install_files(Path::new("/nonexistent/install/root"));
        assert!(matches!(result, Err(PackageError::WalkDirFailed { .. })));
    }
}
