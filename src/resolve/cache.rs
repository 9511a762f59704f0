// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Memoized answers of the installed system for one build.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::index::Split;
use crate::system::InstalledSystem;

#[derive(Debug, Default)]
pub(crate) struct ResolutionCache {
    /// Symbol name to providing package.
    pub(crate) symbols: Split<HashMap<String, String>>,
    /// pkgconfig module to providing package.
    pub(crate) pkgconfigs: Split<HashMap<String, String>>,
    pub(crate) kernels: HashMap<String, String>,
    /// File path to owning package, filled with every file of each resolved package.
    pub(crate) files: HashMap<PathBuf, String>,
    /// Paths known to have no owner.
    pub(crate) deadends: HashSet<PathBuf>,
}

impl ResolutionCache {
    /// Owner of `path`, consulting the files cache, then the installed system. Paths without
    /// owner are never queried again.
    pub(crate) fn owner_of(&mut self, system: &dyn InstalledSystem, path: &Path) -> Option<String> {
        if let Some(owner) = self.files.get(path) {
            return Some(owner.clone());
        }
        if self.deadends.contains(path) {
            return None;
        }
        let owner = system.owner_of(path);
        if owner.is_none() {
            self.deadends.insert(path.to_path_buf());
        }
        owner
    }

    /// Remember every file of an installed package.
    pub(crate) fn remember_files(&mut self, system: &dyn InstalledSystem, package: &str) {
        for file in system.files_of(package) {
            self.files
                .insert(Path::new("/").join(file), package.to_string());
        }
    }
}
