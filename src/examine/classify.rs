// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Decides the semantic category of an installed file from its path and signature.

use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::inspect::{InspectError, InspectResult, Introspector};

static SHARED_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ELF (64|32)-bit LSB shared object,").expect("valid regex"));
static EXECUTABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ELF (64|32)-bit LSB executable,").expect("valid regex"));
static PIE_EXECUTABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ELF (64|32)-bit LSB pie executable,").expect("valid regex"));
static RELOCATABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ELF (64|32)-bit LSB relocatable,").expect("valid regex"));

const AR_SIGNATURE: &str = "current ar archive";
const TEXT_SIGNATURE: &str = "ASCII text";
const SYSTEM_MAP_MARKER: &str = "kernel/System.map-";

/// Semantic category of a file, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    SharedObject,
    Executable,
    PieExecutable,
    Relocatable { kernel_module: bool },
    StaticArchive,
    PkgConfig,
    SonameLink,
    KernelMap,
}

impl Category {
    #[must_use]
    pub fn is_elf(self) -> bool {
        matches!(
            self,
            Self::SharedObject | Self::Executable | Self::PieExecutable | Self::Relocatable { .. }
        )
    }
}

/// Everything known about an installed file before it is scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProbe {
    /// Path within the package, rooted at `/`.
    pub pretty: PathBuf,
    /// Location in the staging root.
    pub path: PathBuf,
    pub signature: String,
    pub is_symlink: bool,
    pub is_dir: bool,
}

impl FileProbe {
    /// Probe a file of the staging root.
    ///
    /// # Errors
    /// Returns an error if the file cannot be stat'ed or its signature cannot be read.
    pub fn new<I: Introspector + ?Sized>(
        introspector: &I,
        pretty: PathBuf,
        path: PathBuf,
    ) -> InspectResult<Self> {
        let metadata = fs::symlink_metadata(&path).map_err(|e| InspectError::OpenFailed {
            path: path.clone(),
            source: e,
        })?;
        let signature = introspector.signature(&path)?;
        Ok(Self {
            is_symlink: metadata.file_type().is_symlink(),
            // Symlinks to directories count as directories.
            is_dir: path.is_dir(),
            pretty,
            path,
            signature,
        })
    }

    pub(crate) fn pretty_str(&self) -> std::borrow::Cow<'_, str> {
        self.pretty.to_string_lossy()
    }

    /// Whether the file belongs to the 32-bit compatibility tree.
    #[must_use]
    pub fn is_emul32(&self) -> bool {
        let pretty = self.pretty_str();
        pretty.starts_with("/usr/lib32/") || pretty.starts_with("/lib32")
    }
}

/// Whether the signature describes an ELF shared object.
#[must_use]
pub fn is_shared_object(signature: &str) -> bool {
    SHARED_OBJECT.is_match(signature)
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.to_string_lossy().ends_with(suffix)
}

fn is_pkgconfig_file(probe: &FileProbe) -> bool {
    has_suffix(&probe.pretty, ".pc")
        && probe
            .pretty
            .parent()
            .and_then(Path::file_name)
            .is_some_and(|dir| dir == "pkgconfig")
}

fn is_soname_link(probe: &FileProbe) -> bool {
    has_suffix(&probe.path, ".so") && probe.is_symlink && !probe.is_dir
}

fn is_static_archive(probe: &FileProbe) -> bool {
    has_suffix(&probe.path, ".a")
        && probe.signature == AR_SIGNATURE
        && !probe.is_symlink
        && !probe.is_dir
}

fn is_system_map(probe: &FileProbe) -> bool {
    probe.pretty_str().contains(SYSTEM_MAP_MARKER)
        && probe.signature == TEXT_SIGNATURE
        && !probe.is_symlink
        && !probe.is_dir
}

/// Classify a probed file, `None` when it falls in no category.
#[must_use]
pub fn classify(probe: &FileProbe) -> Option<Category> {
    let signature = probe.signature.as_str();
    if SHARED_OBJECT.is_match(signature) {
        Some(Category::SharedObject)
    } else if EXECUTABLE.is_match(signature) {
        Some(Category::Executable)
    } else if PIE_EXECUTABLE.is_match(signature) {
        Some(Category::PieExecutable)
    } else if RELOCATABLE.is_match(signature) {
        Some(Category::Relocatable {
            kernel_module: has_suffix(&probe.path, ".ko"),
        })
    } else if is_static_archive(probe) {
        Some(Category::StaticArchive)
    } else if is_pkgconfig_file(probe) {
        Some(Category::PkgConfig)
    } else if is_soname_link(probe) {
        Some(Category::SonameLink)
    } else if is_system_map(probe) {
        Some(Category::KernelMap)
    } else {
        None
    }
}
