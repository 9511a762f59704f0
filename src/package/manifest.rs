// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Loads the build manifest describing the configuration and packages of one build.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::{collect_install_files, Package, PackageError, PackageResult, PackageSet};
use crate::config::ExamineConfig;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestPackage {
    name: String,
    #[serde(default)]
    files: Option<Vec<PathBuf>>,
}

/// Build manifest: `{ "config": {...}, "packages": [{ "name": "...", "files": [...] }] }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildManifest {
    #[serde(default)]
    config: ExamineConfig,
    packages: Vec<ManifestPackage>,
}

impl BuildManifest {
    /// Read a manifest from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> PackageResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| PackageError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| PackageError::ParseFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ExamineConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ExamineConfig {
        &mut self.config
    }

    /// Build the package set in declaration order.
    ///
    /// The first package without an explicit file list receives every installed file not
    /// claimed by another package.
    ///
    /// # Errors
    /// Returns an error if the install directory cannot be walked or names are duplicated.
    pub fn packages(&self) -> PackageResult<PackageSet> {
        let claimed: BTreeSet<&Path> = self
            .packages
            .iter()
            .filter_map(|p| p.files.as_ref())
            .flatten()
            .map(PathBuf::as_path)
            .collect();

        let mut unclaimed = None;
        if self.packages.iter().any(|p| p.files.is_none()) {
            unclaimed = Some(
                collect_install_files(self.config.install_dir())?
                    .into_iter()
                    .filter(|f| !claimed.contains(f.as_path()))
                    .collect::<Vec<_>>(),
            );
        }

        let packages = self
            .packages
            .iter()
            .map(|p| {
                let files = match &p.files {
                    Some(files) => files.clone(),
                    None => unclaimed.take().unwrap_or_default(),
                };
                Package::new(p.name.clone(), files)
            })
            .collect();
        PackageSet::new(packages)
    }
}
