// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Post-build examination of packages installed into a staging root.
//!
//! This crate provides functionality to:
//! - Remove unwanted files, strip binaries and split out their debug information
//! - Classify installed files and scan them for what they provide and need
//! - Resolve those needs into dependencies between packages of the build and installed packages
//! - Generate reports on the resulting dependency graph

pub mod config;
pub mod examine;
pub mod inspect;
pub mod logging;
pub mod package;
pub mod report;
pub mod resolve;
pub mod system;

#[cfg(test)]
mod testing;

// Re-export key types for convenience
pub use config::{ExamineConfig, UnresolvedPolicy};
pub use examine::{Examinations, FileReport, PackageExaminer};
pub use package::{Package, PackageSet};
pub use resolve::DependencyResolver;
