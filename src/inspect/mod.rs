// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Binary introspection: file signatures, ELF dynamic info, build-ids, kernel module metadata,
//! pkgconfig requirement listing and the strip/objcopy side effects.

mod elf;
mod signature;
mod tools;

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use elf::{Elf, ElfClass, ElfType};
pub use signature::describe;
pub use tools::{StripMode, Toolchain};

/// Result type for introspection operations.
pub type InspectResult<T> = std::result::Result<T, InspectError>;

/// Errors that can occur when inspecting files or running external tools.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("File is too small to be an ELF file: {path:?}")]
    FileTooSmall { path: PathBuf },
    #[error("File is not an ELF file: {path:?}")]
    NotElfFile { path: PathBuf },
    #[error("Failed to open file: {path:?}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read file: {path:?}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse ELF file: {path:?}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: goblin::error::Error,
    },
    #[error("Unknown ELF type in file: {path:?}")]
    UnknownElfType { path: PathBuf },
    #[error("Command not found: {command} (file: {path:?})")]
    CommandNotFound { command: String, path: PathBuf },
    #[error("Command failed: {command} (file: {path:?})")]
    CommandFailed {
        command: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Command {command} exited with status {code} (file: {path:?}): {stderr}")]
    CommandExited {
        command: String,
        path: PathBuf,
        code: i32,
        stderr: String,
    },
}

/// Dynamic section summary of an ELF object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DynamicInfo {
    /// `DT_NEEDED` entries.
    pub needed: Vec<String>,
    /// `DT_RPATH` and `DT_RUNPATH` entries, normalized to absolute directories.
    pub rpath: Vec<String>,
    /// `DT_SONAME` entry.
    pub soname: Option<String>,
}

/// Parsed `vermagic` of a kernel module, e.g. `6.6.7-267.current SMP preempt mod_unload modversions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vermagic {
    pub version: String,
    pub flags: Vec<String>,
}

impl Vermagic {
    /// Split a raw `vermagic` string into the version and its flag list.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split_whitespace();
        let version = parts.next()?.to_string();
        Some(Self {
            version,
            flags: parts.map(str::to_string).collect(),
        })
    }

    /// Whether the module was built with module versioning and unload support.
    #[must_use]
    pub fn is_versioned(&self) -> bool {
        self.flags.iter().any(|f| f == "modversions") && self.flags.iter().any(|f| f == "mod_unload")
    }
}

/// Introspection services used by the file scanner.
///
/// Implementations must be shareable between the scanning workers of a package.
pub trait Introspector: Send + Sync {
    /// libmagic-equivalent description of the file at `path` (symlinks are not followed).
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    fn signature(&self, path: &Path) -> InspectResult<String>;

    /// Dynamic section of the ELF object at `path`. `origin` is the directory of the file
    /// within the package and is substituted for `$ORIGIN` in search paths.
    ///
    /// # Errors
    /// Returns an error if the file cannot be parsed.
    fn dynamic_info(&self, path: &Path, origin: &Path) -> InspectResult<DynamicInfo>;

    /// GNU build-id of the ELF object at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be parsed.
    fn build_id(&self, path: &Path) -> InspectResult<Option<String>>;

    /// Kernel module `vermagic` of the object at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be parsed.
    fn vermagic(&self, path: &Path) -> InspectResult<Option<Vermagic>>;

    /// Raw `Requires:` lines of a pkgconfig file.
    ///
    /// # Errors
    /// Returns an error if the lister cannot be run.
    fn pkgconfig_requires(&self, path: &Path, search_paths: &[PathBuf]) -> InspectResult<Vec<String>>;

    /// Raw `Requires.private:` lines of a pkgconfig file.
    ///
    /// # Errors
    /// Returns an error if the lister cannot be run.
    fn pkgconfig_requires_private(
        &self,
        path: &Path,
        search_paths: &[PathBuf],
    ) -> InspectResult<Vec<String>>;

    /// Strip the file in place.
    ///
    /// # Errors
    /// Returns an error if the strip tool fails.
    fn strip(&self, path: &Path, mode: StripMode, toolchain: Toolchain) -> InspectResult<()>;

    /// Copy the debug sections of `path` into `debug_path`.
    ///
    /// # Errors
    /// Returns an error if objcopy fails.
    fn extract_debug(&self, path: &Path, debug_path: &Path) -> InspectResult<()>;

    /// Link `path` to its split debug file.
    ///
    /// # Errors
    /// Returns an error if objcopy fails.
    fn add_debug_link(&self, path: &Path, debug_path: &Path) -> InspectResult<()>;
}

/// Introspector backed by native ELF parsing and the host toolchain.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostIntrospector;

impl Introspector for HostIntrospector {
    fn signature(&self, path: &Path) -> InspectResult<String> {
        describe(path)
    }

    fn dynamic_info(&self, path: &Path, origin: &Path) -> InspectResult<DynamicInfo> {
        let elf = Elf::from_path(path)?;
        Ok(DynamicInfo {
            needed: elf.dependencies().to_vec(),
            rpath: elf
                .normalize_paths(origin)
                .into_iter()
                .map(|p| p.to_string_lossy().to_string())
                .collect(),
            soname: elf.soname().map(str::to_string),
        })
    }

    fn build_id(&self, path: &Path) -> InspectResult<Option<String>> {
        Ok(Elf::from_path(path)?.build_id().map(str::to_string))
    }

    fn vermagic(&self, path: &Path) -> InspectResult<Option<Vermagic>> {
        Ok(Elf::from_path(path)?.vermagic().and_then(Vermagic::parse))
    }

    fn pkgconfig_requires(&self, path: &Path, search_paths: &[PathBuf]) -> InspectResult<Vec<String>> {
        tools::pkg_config(path, search_paths, "--print-requires")
    }

    fn pkgconfig_requires_private(
        &self,
        path: &Path,
        search_paths: &[PathBuf],
    ) -> InspectResult<Vec<String>> {
        tools::pkg_config(path, search_paths, "--print-requires-private")
    }

    fn strip(&self, path: &Path, mode: StripMode, toolchain: Toolchain) -> InspectResult<()> {
        tools::strip(path, mode, toolchain)
    }

    fn extract_debug(&self, path: &Path, debug_path: &Path) -> InspectResult<()> {
        tools::objcopy(
            path,
            &[
                "--only-keep-debug".to_string(),
                path.to_string_lossy().to_string(),
                debug_path.to_string_lossy().to_string(),
            ],
        )
    }

    fn add_debug_link(&self, path: &Path, debug_path: &Path) -> InspectResult<()> {
        tools::objcopy(
            path,
            &[
                format!("--add-gnu-debuglink={}", debug_path.display()),
                path.to_string_lossy().to_string(),
            ],
        )
    }
}
