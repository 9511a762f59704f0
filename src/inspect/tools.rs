// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Runs the binutils and `pkg-config` commands used for stripping, debug extraction and
//! requirement listing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{InspectError, InspectResult};

/// Strip flavour, selected by the category of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StripMode {
    Shared,
    Executable,
    KernelModule,
    Archive,
}

impl StripMode {
    #[must_use]
    pub fn flags(self) -> &'static [&'static str] {
        match self {
            Self::Shared => &["--strip-unneeded"],
            Self::Executable => &[],
            Self::KernelModule => &["-g", "--strip-unneeded"],
            Self::Archive => &["--strip-debug"],
        }
    }
}

/// Binutils flavour matching the compiler setup of the build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Toolchain {
    #[default]
    Gnu,
    /// GCC with link-time optimization: archives need the plugin aware wrappers.
    GnuLto,
    Llvm,
}

impl Toolchain {
    /// `AR`, `RANLIB` and `NM` overrides exported to the strip tools.
    #[must_use]
    pub fn environment(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Gnu => &[],
            Self::GnuLto => &[("AR", "gcc-ar"), ("RANLIB", "gcc-ranlib"), ("NM", "gcc-nm")],
            Self::Llvm => &[("AR", "llvm-ar"), ("RANLIB", "llvm-ranlib"), ("NM", "llvm-nm")],
        }
    }

    /// The program used to strip a file of the given mode.
    #[must_use]
    pub fn strip_program(self, mode: StripMode) -> &'static str {
        match (self, mode) {
            (Self::Llvm, StripMode::Archive) => "llvm-objcopy",
            _ => "strip",
        }
    }
}

/// Run a command with `LC_ALL=C`, returning its stdout.
fn run(command: &str, args: &[String], envs: &[(&str, &str)], path: &Path) -> InspectResult<String> {
    let output = Command::new(command)
        .args(args)
        .env("LC_ALL", "C")
        .envs(envs.iter().copied())
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                InspectError::CommandNotFound {
                    command: command.to_string(),
                    path: path.to_path_buf(),
                }
            } else {
                InspectError::CommandFailed {
                    command: command.to_string(),
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        Err(InspectError::CommandExited {
            command: command.to_string(),
            path: path.to_path_buf(),
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

pub(crate) fn strip(path: &Path, mode: StripMode, toolchain: Toolchain) -> InspectResult<()> {
    let mut args: Vec<String> = mode.flags().iter().map(|f| (*f).to_string()).collect();
    args.push(path.to_string_lossy().to_string());
    run(
        toolchain.strip_program(mode),
        &args,
        toolchain.environment(),
        path,
    )
    .map(|_| ())
}

pub(crate) fn objcopy(path: &Path, args: &[String]) -> InspectResult<()> {
    run("objcopy", args, &[], path).map(|_| ())
}

/// Run `pkg-config <flag> <file>` with `PKG_CONFIG_PATH` set to `search_paths`.
pub(crate) fn pkg_config(path: &Path, search_paths: &[PathBuf], flag: &str) -> InspectResult<Vec<String>> {
    let joined = std::env::join_paths(search_paths).map_err(|e| InspectError::CommandFailed {
        command: "pkg-config".to_string(),
        path: path.to_path_buf(),
        source: std::io::Error::other(e),
    })?;
    let joined = joined.to_string_lossy().to_string();
    let mut envs = Vec::new();
    if !search_paths.is_empty() {
        envs.push(("PKG_CONFIG_PATH", joined.as_str()));
    }
    let stdout = run(
        "pkg-config",
        &[flag.to_string(), path.to_string_lossy().to_string()],
        &envs,
        path,
    )?;
    Ok(stdout.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_flags() {
        assert_eq!(StripMode::Shared.flags(), ["--strip-unneeded"]);
        assert_eq!(StripMode::KernelModule.flags(), ["-g", "--strip-unneeded"]);
        assert_eq!(StripMode::Archive.flags(), ["--strip-debug"]);
        assert!(StripMode::Executable.flags().is_empty());
    }

    #[test]
    fn test_toolchain_programs() {
        assert_eq!(Toolchain::Gnu.strip_program(StripMode::Archive), "strip");
        assert_eq!(Toolchain::GnuLto.strip_program(StripMode::Archive), "strip");
        assert_eq!(Toolchain::Llvm.strip_program(StripMode::Archive), "llvm-objcopy");
        assert_eq!(Toolchain::Llvm.strip_program(StripMode::Shared), "strip");
    }

    #[test]
    fn test_toolchain_environment() {
        assert!(Toolchain::Gnu.environment().is_empty());
        assert!(Toolchain::GnuLto.environment().contains(&("AR", "gcc-ar")));
        assert!(Toolchain::Llvm.environment().contains(&("NM", "llvm-nm")));
    }

    #[test]
    fn test_missing_command() {
        let result = run(
            "package-examiner-no-such-command",
            &[],
            &[],
            Path::new("/tmp/file"),
        );
        assert!(matches!(result, Err(InspectError::CommandNotFound { .. })));
    }
}
