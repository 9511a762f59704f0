// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Build flags consumed by the examiner and the dependency resolver.

use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::inspect::Toolchain;

/// What to do when a symbol or kernel dependency cannot be resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Log the failure and leave the dependency out.
    #[default]
    Warn,
    /// Fail the resolution pass.
    Abort,
}

/// Configuration of a single build invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExamineConfig {
    /// Staging root the packages were installed into.
    pub install_dir: PathBuf,
    pub strip: bool,
    /// Extract split debug information.
    pub debug: bool,
    /// Remove libtool `.la` files.
    pub lastrip: bool,
    /// Generate automatic dependencies.
    pub autodep: bool,
    pub optimize: Vec<String>,
    pub clang: bool,
    /// Scan kernel modules and `System.map` files.
    pub kernel_scan: bool,
    /// Size of the scanning worker pool, defaults to the host parallelism.
    pub jobs: Option<usize>,
    pub unresolved: UnresolvedPolicy,
}

impl Default for ExamineConfig {
    fn default() -> Self {
        Self {
            install_dir: PathBuf::from("/"),
            strip: true,
            debug: true,
            lastrip: true,
            autodep: true,
            optimize: Vec::new(),
            clang: false,
            kernel_scan: true,
            jobs: None,
            unresolved: UnresolvedPolicy::Warn,
        }
    }
}

impl ExamineConfig {
    /// Create a configuration with defaults for the given staging root.
    #[must_use]
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// Binutils flavour to strip with. Clang builds use LLVM tools, LTO builds with GCC need
    /// the plugin aware wrappers.
    #[must_use]
    pub fn toolchain(&self) -> Toolchain {
        if self.clang {
            Toolchain::Llvm
        } else if self.optimize.iter().any(|o| o == "lto" || o == "thin-lto") {
            Toolchain::GnuLto
        } else {
            Toolchain::Gnu
        }
    }

    /// Map a package path (rooted at `/`) to its location in the staging root.
    #[must_use]
    pub fn real_path(&self, pretty: &Path) -> PathBuf {
        self.install_dir
            .clean()
            .join(pretty.strip_prefix("/").unwrap_or(pretty))
    }

    /// Map a location in the staging root back to its package path.
    ///
    /// Both sides are compared in cleaned form. Paths outside the staging root are returned
    /// unchanged (made absolute).
    #[must_use]
    pub fn pretty_path(&self, real: &Path) -> PathBuf {
        let real = real.clean();
        let stripped = real
            .strip_prefix(self.install_dir.clean())
            .unwrap_or(&real);
        Path::new("/").join(stripped)
    }
}
