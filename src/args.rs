// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "package_examiner")]
#[command(version)]
#[command(
    about = "Strips, classifies and computes dependencies of the files a build installed"
)]
pub(crate) struct Args {
    /// Path to the JSON build manifest (configuration and package list).
    pub manifest: PathBuf,

    /// Path to the file to write the build report in JSON format.
    pub report: PathBuf,

    #[arg(
        long,
        long_help = "Path to a JSON index of the installed system:\n\
                {\"files\": {path: package}, \"pkgconfig\": {name: package}, \"pkgconfig32\": {name: package}}"
    )]
    pub files_index: Option<PathBuf>,

    #[arg(
        long,
        long_help = "Path to a JSON map of repository-wide pkgconfig providers:\n\
                {\"pkgconfig\": {name: package}, \"pkgconfig32\": {name: package}}"
    )]
    pub repository_index: Option<PathBuf>,

    /// Override the staging root of the manifest.
    #[arg(long)]
    pub install_dir: Option<PathBuf>,

    /// The build produces a kernel image: skip kernel modules and System.map files.
    #[arg(long)]
    pub kernel_image: bool,

    /// Fail when a symbol or kernel dependency cannot be resolved.
    #[arg(long)]
    pub strict: bool,

    /// Number of scanning workers.
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
