// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Per-file scan results consumed by the dependency resolver.

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// What a single scanned file provides and needs. Built once by the scanner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub(crate) package: String,
    pub(crate) pretty: PathBuf,
    #[serde(skip)]
    pub(crate) path: PathBuf,
    pub(crate) emul32: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) soname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) symbol_deps: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) rpaths: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) pkgconfig_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) pkgconfig_deps: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) soname_links: Option<BTreeSet<PathBuf>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) dep_kernel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) prov_kernel: Option<String>,
}

impl FileReport {
    pub(crate) fn new(package: &str, pretty: &Path, path: &Path, emul32: bool) -> Self {
        Self {
            package: package.to_string(),
            pretty: pretty.to_path_buf(),
            path: path.to_path_buf(),
            emul32,
            ..Self::default()
        }
    }

    /// Name of the package owning the file.
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Path of the file within the package, rooted at `/`.
    #[must_use]
    pub fn pretty(&self) -> &Path {
        &self.pretty
    }

    /// Location of the file in the staging root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn emul32(&self) -> bool {
        self.emul32
    }

    #[must_use]
    pub fn soname(&self) -> Option<&str> {
        self.soname.as_deref()
    }

    /// Shared object names (`DT_NEEDED`) the file needs.
    #[must_use]
    pub fn symbol_deps(&self) -> Option<&BTreeSet<String>> {
        self.symbol_deps.as_ref()
    }

    #[must_use]
    pub fn rpaths(&self) -> Option<&BTreeSet<String>> {
        self.rpaths.as_ref()
    }

    #[must_use]
    pub fn pkgconfig_name(&self) -> Option<&str> {
        self.pkgconfig_name.as_deref()
    }

    #[must_use]
    pub fn pkgconfig_deps(&self) -> Option<&BTreeSet<String>> {
        self.pkgconfig_deps.as_ref()
    }

    /// Package paths of the versioned libraries this `.so` link points at.
    #[must_use]
    pub fn soname_links(&self) -> Option<&BTreeSet<PathBuf>> {
        self.soname_links.as_ref()
    }

    /// Kernel version a module was built against.
    #[must_use]
    pub fn dep_kernel(&self) -> Option<&str> {
        self.dep_kernel.as_deref()
    }

    /// Kernel version provided by a `System.map` file.
    #[must_use]
    pub fn prov_kernel(&self) -> Option<&str> {
        self.prov_kernel.as_deref()
    }
}
