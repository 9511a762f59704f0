// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Packages produced by a build: their file lists and the dependency/provides sets computed
//! by the examiner and the resolver.

mod files;
mod manifest;

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use files::collect_install_files;
pub use manifest::BuildManifest;

/// Result type for package operations.
pub type PackageResult<T> = std::result::Result<T, PackageError>;

/// Errors that can occur when loading packages.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("Failed to read build manifest: {path:?}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse build manifest: {path:?}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to walk install directory: {path:?}")]
    WalkDirFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Package declared more than once: {name}")]
    DuplicatePackage { name: String },
}

/// A package of the build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Package {
    name: String,
    files: Vec<PathBuf>,
    removed: Vec<PathBuf>,
    dependencies: BTreeSet<String>,
    provides: BTreeSet<String>,
}

impl Package {
    /// Create a package owning the given package paths (rooted at `/`).
    #[must_use]
    pub fn new(name: impl Into<String>, files: Vec<PathBuf>) -> Self {
        Self {
            name: name.into(),
            files,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the files in the package.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Files retracted from the package by the examiner.
    #[must_use]
    pub fn removed(&self) -> &[PathBuf] {
        &self.removed
    }

    /// Names of the packages this package depends on.
    #[must_use]
    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    /// Capabilities this package provides, e.g. `pkgconfig(zlib)`.
    #[must_use]
    pub fn provides(&self) -> &BTreeSet<String> {
        &self.provides
    }

    #[must_use]
    pub fn owns(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f == path)
    }

    /// Retract a file from the package, returning whether it was present.
    pub fn remove_file(&mut self, path: &Path) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f != path);
        let removed = self.files.len() != before;
        if removed {
            self.removed.push(path.to_path_buf());
        }
        removed
    }

    /// Add a dependency edge, returning whether it is new.
    pub fn add_dependency(&mut self, name: impl Into<String>) -> bool {
        self.dependencies.insert(name.into())
    }

    /// Add a provided capability, returning whether it is new.
    pub fn add_provide(&mut self, capability: impl Into<String>) -> bool {
        self.provides.insert(capability.into())
    }
}

/// The packages of one build, in declaration order.
///
/// The order is significant: when two packages provide the same soname, pkgconfig name or
/// kernel version, the later one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PackageSet {
    packages: Vec<Package>,
}

impl PackageSet {
    /// Create a package set, rejecting duplicate names.
    ///
    /// # Errors
    /// Returns an error if two packages share a name.
    pub fn new(packages: Vec<Package>) -> PackageResult<Self> {
        let mut seen = BTreeSet::new();
        for package in &packages {
            if !seen.insert(package.name()) {
                return Err(PackageError::DuplicatePackage {
                    name: package.name().to_string(),
                });
            }
        }
        Ok(Self { packages })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Package> {
        self.packages.iter_mut()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Package> {
        self.packages.iter_mut().find(|p| p.name() == name)
    }

    /// Name of the package of this build owning `path`.
    #[must_use]
    pub fn owner_of(&self, path: &Path) -> Option<&str> {
        self.packages
            .iter()
            .find(|p| p.owns(path))
            .map(Package::name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
