// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Repository-wide pkgconfig providers read from a JSON file.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::{RepositoryProviders, SystemError, SystemResult};

/// pkgconfig providers of every package in the repository.
///
/// File format: `{ "pkgconfig": {"zlib": "zlib-devel"}, "pkgconfig32": {"zlib": "zlib-32bit-devel"} }`
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryIndex {
    pkgconfig: HashMap<String, String>,
    pkgconfig32: HashMap<String, String>,
}

impl RepositoryIndex {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build an index from in-memory provider maps.
    #[must_use]
    pub fn from_parts(
        pkgconfig: HashMap<String, String>,
        pkgconfig32: HashMap<String, String>,
    ) -> Self {
        Self {
            pkgconfig,
            pkgconfig32,
        }
    }

    /// Load the providers from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SystemResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SystemError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| SystemError::ParseFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl RepositoryProviders for RepositoryIndex {
    fn provider_of(&self, name: &str, emul32: bool) -> Option<String> {
        let providers = if emul32 {
            &self.pkgconfig32
        } else {
            &self.pkgconfig
        };
        providers.get(name).cloned()
    }
}
