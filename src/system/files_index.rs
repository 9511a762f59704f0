// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Installed-system file index read from a JSON file.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use super::{InstalledSystem, SystemError, SystemResult};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FilesIndexFile {
    files: BTreeMap<PathBuf, String>,
    pkgconfig: HashMap<String, String>,
    pkgconfig32: HashMap<String, String>,
}

/// Installed files and pkgconfig providers of the build host.
///
/// File format:
/// `{ "files": {"/usr/lib64/libz.so.1": "zlib"}, "pkgconfig": {"zlib": "zlib-devel"}, "pkgconfig32": {} }`
#[derive(Debug, Default)]
pub struct FilesIndex {
    owners: BTreeMap<PathBuf, String>,
    files: HashMap<String, Vec<PathBuf>>,
    pkgconfig: HashMap<String, String>,
    pkgconfig32: HashMap<String, String>,
}

impl FilesIndex {
    /// Create an index without any installed packages.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the index from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SystemResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SystemError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let index: FilesIndexFile =
            serde_json::from_str(&content).map_err(|e| SystemError::ParseFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(Self::from_parts(index.files, index.pkgconfig, index.pkgconfig32))
    }

    /// Build an index from owner and pkgconfig maps.
    #[must_use]
    pub fn from_parts(
        owners: BTreeMap<PathBuf, String>,
        pkgconfig: HashMap<String, String>,
        pkgconfig32: HashMap<String, String>,
    ) -> Self {
        let mut files: HashMap<String, Vec<PathBuf>> = HashMap::new();
        for (path, package) in &owners {
            files.entry(package.clone()).or_default().push(path.clone());
        }
        Self {
            owners,
            files,
            pkgconfig,
            pkgconfig32,
        }
    }
}

impl InstalledSystem for FilesIndex {
    fn owner_of(&self, path: &Path) -> Option<String> {
        self.owners.get(path).cloned()
    }

    fn files_of(&self, package: &str) -> Vec<PathBuf> {
        self.files.get(package).cloned().unwrap_or_default()
    }

    fn pkgconfig_provider(&self, name: &str, emul32: bool) -> Option<String> {
        let providers = if emul32 {
            &self.pkgconfig32
        } else {
            &self.pkgconfig
        };
        providers.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_index() {
        let index = FilesIndex::empty();
        assert_eq!(index.owner_of(Path::new("/usr/lib64/libc.so.6")), None);
        assert!(index.files_of("glibc").is_empty());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
                "files": {{
                    "/usr/lib64/libz.so.1": "zlib",
                    "/usr/lib64/libz.so.1.3": "zlib",
                    "/usr/lib32/libz.so.1": "zlib-32bit"
                }},
                "pkgconfig": {{"zlib": "zlib-devel"}},
                "pkgconfig32": {{"zlib": "zlib-32bit-devel"}}
            }}"#
        )
        .unwrap();
        file.flush().unwrap();

        let index = FilesIndex::from_file(file.path()).unwrap();
        assert_eq!(
            index.owner_of(Path::new("/usr/lib32/libz.so.1")).as_deref(),
            Some("zlib-32bit")
        );
        assert_eq!(index.files_of("zlib").len(), 2);
        assert_eq!(index.pkgconfig_provider("zlib", false).as_deref(), Some("zlib-devel"));
        assert_eq!(
            index.pkgconfig_provider("zlib", true).as_deref(),
            Some("zlib-32bit-devel")
        );
        assert_eq!(index.pkgconfig_provider("libpng", false), None);
    }

    #[test]
    fn test_file_not_found() {
        let result = FilesIndex::from_file("/nonexistent/file.json");
        assert!(result.is_err());
        assert!(result.err().unwrap().to_string().contains("Failed to read"));
    }
}
