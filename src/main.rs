// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
mod args;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

use args::Args;
use package_examiner::config::{ExamineConfig, UnresolvedPolicy};
use package_examiner::examine::PackageExaminer;
use package_examiner::inspect::HostIntrospector;
use package_examiner::logging::{init_logging, LoggingConfig};
use package_examiner::package::BuildManifest;
use package_examiner::report::{summarize_report, BuildReport};
use package_examiner::resolve::DependencyResolver;
use package_examiner::system::{FilesIndex, RepositoryIndex};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&LoggingConfig::from_verbosity(args.verbose));

    let mut manifest = BuildManifest::from_file(&args.manifest)
        .with_context(|| format!("Failed to load build manifest: {}", args.manifest.display()))?;
    apply_overrides(manifest.config_mut(), &args);
    let config = manifest.config().clone();

    let mut packages = manifest
        .packages()
        .with_context(|| "Failed to assign installed files to packages")?;
    let files_index = create_files_index(args.files_index.as_ref())?;
    let repository_index = create_repository_index(args.repository_index.as_ref())?;

    let examiner = PackageExaminer::new(config.clone(), HostIntrospector)
        .with_context(|| "Failed to create the package examiner")?;
    let examinations = examiner
        .examine_all(&mut packages)
        .with_context(|| format!("Failed to examine {}", config.install_dir().display()))?;
    info!(packages = examinations.len(), "Examination completed");

    let mut resolver = DependencyResolver::new(&files_index, &repository_index, config.unresolved);
    resolver
        .resolve(&mut packages, &examinations)
        .with_context(|| "Failed to resolve dependencies")?;

    let report = BuildReport::new(config.install_dir(), &packages, &examinations);
    write_report_to_file(&report, &args.report)?;
    summarize_report(&report);
    Ok(())
}

fn apply_overrides(config: &mut ExamineConfig, args: &Args) {
    if let Some(install_dir) = &args.install_dir {
        config.install_dir.clone_from(install_dir);
    }
    if args.kernel_image {
        config.kernel_scan = false;
    }
    if args.strict {
        config.unresolved = UnresolvedPolicy::Abort;
    }
    if args.jobs.is_some() {
        config.jobs = args.jobs;
    }
}

fn create_files_index(path: Option<&PathBuf>) -> Result<FilesIndex> {
    if let Some(files_index) = path {
        Ok(FilesIndex::from_file(files_index)
            .with_context(|| "Failed to read installed files index")?)
    } else {
        Ok(FilesIndex::empty())
    }
}

fn create_repository_index(path: Option<&PathBuf>) -> Result<RepositoryIndex> {
    if let Some(repository_index) = path {
        Ok(RepositoryIndex::from_file(repository_index)
            .with_context(|| "Failed to read repository index")?)
    } else {
        Ok(RepositoryIndex::empty())
    }
}

/// Write the report to a file.
///
/// # Errors
/// Returns an error if the report cannot be serialized to JSON or if the file cannot be created.
fn write_report_to_file(report: &BuildReport<'_>, dest: &Path) -> Result<()> {
    info!("Writing report to file: file={}", dest.display());
    let file = File::create(dest)
        .with_context(|| format!("Failed to create JSON output file: {}", dest.display()))?;
    serde_json::to_writer_pretty(file, report)
        .with_context(|| format!("Failed to serialize report to JSON: {}", dest.display()))?;
    Ok(())
}
