// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
use rayon::prelude::*;
use serde::Serialize;
use std::ops::Add;

use crate::examine::FileReport;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Totals {
    pub(crate) shared_libraries: usize,
    pub(crate) binaries: usize,
    pub(crate) pkgconfig: usize,
    pub(crate) soname_links: usize,
    pub(crate) kernel_modules: usize,
    pub(crate) kernel_maps: usize,
    pub(crate) other: usize,
    pub(crate) total: usize,
}

impl Totals {
    pub(crate) fn calculate(reports: &[&FileReport]) -> Self {
        reports
            .par_iter()
            .fold(Totals::default, |mut totals, report| {
                if report.prov_kernel().is_some() {
                    totals.kernel_maps += 1;
                } else if report.dep_kernel().is_some() {
                    totals.kernel_modules += 1;
                } else if report.pkgconfig_name().is_some() {
                    totals.pkgconfig += 1;
                } else if report.soname_links().is_some() {
                    totals.soname_links += 1;
                } else if report.soname().is_some() {
                    totals.shared_libraries += 1;
                } else if report.symbol_deps().is_some() {
                    totals.binaries += 1;
                } else {
                    totals.other += 1;
                }
                totals
            })
            .reduce(Totals::default, |a, b| a + b)
    }
}

impl Add for Totals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        let shared_libraries = self.shared_libraries + other.shared_libraries;
        let binaries = self.binaries + other.binaries;
        let pkgconfig = self.pkgconfig + other.pkgconfig;
        let soname_links = self.soname_links + other.soname_links;
        let kernel_modules = self.kernel_modules + other.kernel_modules;
        let kernel_maps = self.kernel_maps + other.kernel_maps;
        let other_files = self.other + other.other;
        let total = shared_libraries
            + binaries
            + pkgconfig
            + soname_links
            + kernel_modules
            + kernel_maps
            + other_files;
        Self {
            shared_libraries,
            binaries,
            pkgconfig,
            soname_links,
            kernel_modules,
            kernel_maps,
            other: other_files,
            total,
        }
    }
}
