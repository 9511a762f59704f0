// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Examination of installed packages: removal of unwanted files, classification, parallel
//! scanning and the strip/debug side effects.

mod classify;
mod filter;
mod report;
mod scanner;
mod strip;

use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use classify::{classify, is_shared_object, Category, FileProbe};
pub use report::FileReport;
pub use scanner::{parse_requirements, pkgconfig_search_paths};

use crate::config::ExamineConfig;
use crate::inspect::Introspector;
use crate::package::{Package, PackageSet};
use filter::{is_of_interest, should_nuke};
use scanner::FileScanner;

/// Result type for examination.
pub type ExamineResult<T> = std::result::Result<T, ExamineError>;

/// Structural failures that abort the examination of a package.
#[derive(Debug, Error)]
pub enum ExamineError {
    #[error("Failed to remove file: {path:?}")]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to create directory: {path:?}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to start the scanning pool")]
    PoolFailed(#[source] rayon::ThreadPoolBuildError),
}

/// File reports of every examined package, in package order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Examinations {
    entries: Vec<(String, Vec<FileReport>)>,
}

impl Examinations {
    /// Record the reports of a package, replacing earlier reports of the same package.
    pub fn insert(&mut self, package: impl Into<String>, reports: Vec<FileReport>) {
        let package = package.into();
        match self.entries.iter_mut().find(|(name, _)| *name == package) {
            Some((_, existing)) => *existing = reports,
            None => self.entries.push((package, reports)),
        }
    }

    #[must_use]
    pub fn get(&self, package: &str) -> Option<&[FileReport]> {
        self.entries
            .iter()
            .find(|(name, _)| name == package)
            .map(|(_, reports)| reports.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FileReport])> {
        self.entries
            .iter()
            .map(|(name, reports)| (name.as_str(), reports.as_slice()))
    }

    /// Every report of every package.
    pub fn reports(&self) -> impl Iterator<Item = &FileReport> {
        self.entries.iter().flat_map(|(_, reports)| reports)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Examines the packages of one build against its staging root.
pub struct PackageExaminer<I: Introspector> {
    config: ExamineConfig,
    introspector: I,
    pool: rayon::ThreadPool,
}

impl<I: Introspector> PackageExaminer<I> {
    /// Create an examiner with a scanning pool of `config.jobs` workers (host parallelism if unset).
    ///
    /// # Errors
    /// Returns an error if the worker pool cannot be started.
    pub fn new(config: ExamineConfig, introspector: I) -> ExamineResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.jobs.unwrap_or(0))
            .thread_name(|idx| format!("examine-{idx}"))
            .build()
            .map_err(ExamineError::PoolFailed)?;
        Ok(Self {
            config,
            introspector,
            pool,
        })
    }

    fn nuke(&self, probe: &FileProbe) -> ExamineResult<()> {
        let result = if probe.is_dir && !probe.is_symlink {
            fs::remove_dir_all(&probe.path)
        } else {
            fs::remove_file(&probe.path)
        };
        match result {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ExamineError::RemoveFailed {
                    path: probe.path.clone(),
                    source: e,
                })
            }
        }
        info!(category = "Clean", "{}", probe.pretty.display());
        Ok(())
    }

    /// Examine one package: remove unwanted files, then scan the files of interest in parallel.
    ///
    /// Removed files are retracted from the package's file list. Unreadable files are logged
    /// and skipped.
    ///
    /// # Errors
    /// Returns an error if a file cannot be removed or a debug directory cannot be created.
    pub fn examine(&self, package: &mut Package) -> ExamineResult<Vec<FileReport>> {
        let mut targets = Vec::new();
        let mut removed = Vec::new();

        for pretty in package.files() {
            let path = self.config.real_path(pretty);
            let probe = match FileProbe::new(&self.introspector, pretty.clone(), path) {
                Ok(probe) => probe,
                Err(e) => {
                    warn!(
                        category = "File",
                        error = %e,
                        "Cannot inspect '{}'",
                        pretty.display()
                    );
                    continue;
                }
            };
            if should_nuke(&self.config, &probe) {
                self.nuke(&probe)?;
                removed.push(probe.pretty);
                continue;
            }
            let category = classify(&probe);
            if !is_of_interest(&self.config, &probe, category) {
                continue;
            }
            if let Some(category) = category {
                targets.push((probe, category));
            }
        }

        debug!(
            package = package.name(),
            files = targets.len(),
            "Scanning files of interest"
        );
        let name = package.name();
        let scanner = FileScanner::new(&self.config, &self.introspector);
        let reports = self.pool.install(|| {
            targets
                .par_iter()
                .map(|(probe, category)| scanner.scan(name, probe, *category))
                .collect::<ExamineResult<Vec<_>>>()
        })?;

        for pretty in &removed {
            package.remove_file(pretty);
        }
        Ok(reports)
    }

    /// Examine every package in order. Packages without reports are left out of the result.
    ///
    /// # Errors
    /// Returns the first structural failure; later packages are not examined.
    pub fn examine_all(&self, packages: &mut PackageSet) -> ExamineResult<Examinations> {
        let mut examinations = Examinations::default();
        for package in packages.iter_mut() {
            info!(package = package.name(), "Examining package");
            let reports = self.examine(package)?;
            if reports.is_empty() {
                debug!(package = package.name(), "No files of interest");
                continue;
            }
            examinations.insert(package.name(), reports);
        }
        Ok(examinations)
    }
}
