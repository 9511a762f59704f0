// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Serializable summary of an examined and resolved build.

mod console;
mod totals;

pub use console::summarize_report;

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::examine::{Examinations, FileReport};
use crate::package::PackageSet;
use totals::ReportTotals;

/// Outcome of one package.
#[derive(Debug, Serialize)]
pub struct PackageReport<'a> {
    name: &'a str,
    dependencies: &'a BTreeSet<String>,
    provides: &'a BTreeSet<String>,
    removed: &'a [PathBuf],
    files: &'a [FileReport],
}

#[derive(Debug, Serialize)]
pub struct BuildReport<'a> {
    install_dir: &'a Path,
    totals: ReportTotals,
    packages: Vec<PackageReport<'a>>,
}

impl<'a> BuildReport<'a> {
    /// Create a report over the packages of a build, in package order.
    #[must_use]
    pub fn new(install_dir: &'a Path, packages: &'a PackageSet, examinations: &'a Examinations) -> Self {
        Self {
            install_dir,
            totals: ReportTotals::new(packages, examinations),
            packages: packages
                .iter()
                .map(|package| PackageReport {
                    name: package.name(),
                    dependencies: package.dependencies(),
                    provides: package.provides(),
                    removed: package.removed(),
                    files: examinations.get(package.name()).unwrap_or_default(),
                })
                .collect(),
        }
    }
}
