// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Lookups against packages outside of the build: the installed system and the repository.

mod files_index;
mod repository;

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use files_index::FilesIndex;
pub use repository::RepositoryIndex;

/// Result type for system index operations.
pub type SystemResult<T> = std::result::Result<T, SystemError>;

/// Errors that can occur when loading system indexes.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Failed to read index file: {path:?}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse index file: {path:?}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// File index of the packages installed on the build host.
pub trait InstalledSystem {
    /// Name of the installed package owning `path`.
    fn owner_of(&self, path: &Path) -> Option<String>;

    /// Every file of an installed package.
    fn files_of(&self, package: &str) -> Vec<PathBuf>;

    /// Installed package providing the pkgconfig module `name` (`pkgconfig32` when `emul32`).
    fn pkgconfig_provider(&self, name: &str, emul32: bool) -> Option<String>;
}

/// Repository-wide pkgconfig provider map, covering packages that are not installed.
pub trait RepositoryProviders {
    fn provider_of(&self, name: &str, emul32: bool) -> Option<String>;
}
