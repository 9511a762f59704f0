// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Strip and split-debug side effects applied to binaries while they are scanned.
//!
//! Both are best effort: tool failures are logged and never affect the file's report. The
//! only hard failure is being unable to create the debug output directory.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::classify::{Category, FileProbe};
use super::{ExamineError, ExamineResult};
use crate::config::ExamineConfig;
use crate::inspect::{Introspector, StripMode};

/// Strip flavour for a category, `None` if files of the category are left alone.
#[must_use]
pub(crate) fn strip_mode(category: Category) -> Option<StripMode> {
    match category {
        Category::SharedObject => Some(StripMode::Shared),
        Category::Executable | Category::PieExecutable => Some(StripMode::Executable),
        Category::Relocatable {
            kernel_module: true,
        } => Some(StripMode::KernelModule),
        Category::StaticArchive => Some(StripMode::Archive),
        _ => None,
    }
}

/// Whether split debug information is extracted for a category.
#[must_use]
pub(crate) fn wants_debug(category: Category) -> bool {
    matches!(
        category,
        Category::SharedObject
            | Category::Executable
            | Category::PieExecutable
            | Category::Relocatable {
                kernel_module: true
            }
    )
}

pub(crate) fn strip_file<I: Introspector + ?Sized>(
    config: &ExamineConfig,
    introspector: &I,
    probe: &FileProbe,
    mode: StripMode,
) {
    if !config.strip {
        return;
    }
    match introspector.strip(&probe.path, mode, config.toolchain()) {
        Ok(()) => info!(category = "Stripped", "{}", probe.pretty.display()),
        Err(e) => warn!(
            category = "Strip",
            error = %e,
            "Failed to strip '{}'",
            probe.pretty.display()
        ),
    }
}

/// Package path of the split debug file for a binary.
#[must_use]
pub(crate) fn debug_path(probe: &FileProbe, build_id: Option<&str>) -> PathBuf {
    let libdir = if probe.signature.contains("ELF 32") {
        "/usr/lib32"
    } else {
        "/usr/lib"
    };
    match build_id {
        Some(id) if id.len() > 2 && id.is_ascii() => PathBuf::from(format!(
            "{libdir}/debug/.build-id/{}/{}.debug",
            &id[..2],
            &id[2..]
        )),
        _ => PathBuf::from(format!("{libdir}/debug{}.debug", probe.pretty.display())),
    }
}

/// Create the parent directory of a debug file. Sibling workers may race on the same
/// directory, so a directory that exists afterwards is success.
fn create_parent(path: &Path) -> ExamineResult<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    match fs::create_dir_all(parent) {
        Ok(()) => Ok(()),
        Err(_) if parent.is_dir() => Ok(()),
        Err(e) => Err(ExamineError::CreateDirFailed {
            path: parent.to_path_buf(),
            source: e,
        }),
    }
}

/// Extract the debug sections of a binary and link it back to them.
///
/// # Errors
/// Returns an error if the debug output directory cannot be created.
pub(crate) fn store_debug<I: Introspector + ?Sized>(
    config: &ExamineConfig,
    introspector: &I,
    probe: &FileProbe,
) -> ExamineResult<()> {
    if !config.debug {
        return Ok(());
    }
    let build_id = introspector.build_id(&probe.path).ok().flatten();
    let debug_file = config.real_path(&debug_path(probe, build_id.as_deref()));
    create_parent(&debug_file)?;

    if let Err(e) = introspector.extract_debug(&probe.path, &debug_file) {
        warn!(category = "objcopy", error = %e, "Failed --only-keep-debug");
        return Ok(());
    }
    match introspector.add_debug_link(&probe.path, &debug_file) {
        Ok(()) => info!(category = "Debug", "{}", probe.pretty.display()),
        Err(e) => warn!(category = "objcopy", error = %e, "Failed --add-gnu-debuglink"),
    }
    Ok(())
}
