// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Filters deciding which files are deleted outright and which are worth scanning.

use regex::Regex;
use std::sync::LazyLock;

use super::classify::{Category, FileProbe};
use crate::config::ExamineConfig;

static LIBTOOL_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^libtool library file, ASCII text").expect("valid regex"));

const INFO_DIR: &str = "/usr/share/info/dir";
const EMUL32_ROOT: &str = "/emul32";
const HASWELL_DIRS: [&str; 2] = ["/usr/lib64/haswell/", "/usr/lib32/haswell/"];

/// Whether the file must be deleted from the staging root and dropped from its package.
#[must_use]
pub(crate) fn should_nuke(config: &ExamineConfig, probe: &FileProbe) -> bool {
    if config.lastrip && LIBTOOL_FILE.is_match(&probe.signature) {
        return true;
    }
    let pretty = probe.pretty_str();
    if pretty == INFO_DIR || pretty.starts_with(EMUL32_ROOT) {
        return true;
    }
    if HASWELL_DIRS.iter().any(|dir| pretty.starts_with(dir)) {
        // Only versioned real libraries survive in the AVX2 trees.
        if !pretty.contains(".so") {
            return true;
        }
        if pretty.ends_with(".so") && probe.is_symlink {
            return true;
        }
    }
    false
}

/// Whether a classified file is scanned at all.
#[must_use]
pub(crate) fn is_of_interest(config: &ExamineConfig, probe: &FileProbe, category: Option<Category>) -> bool {
    let Some(category) = category else {
        return false;
    };
    if category.is_elf() {
        return config.kernel_scan || !probe.path.to_string_lossy().ends_with(".ko");
    }
    match category {
        Category::KernelMap => config.kernel_scan,
        _ => true,
    }
}
