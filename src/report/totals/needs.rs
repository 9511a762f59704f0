// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
use dashmap::DashSet;
use rayon::prelude::*;
use serde::Serialize;
use std::ops::Add;

use crate::examine::FileReport;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Totals {
    pub(crate) symbols: usize,
    pub(crate) symbols_unique: usize,
    pub(crate) pkgconfig: usize,
    pub(crate) pkgconfig_unique: usize,
    pub(crate) soname_links: usize,
    pub(crate) kernels: usize,
    pub(crate) total: usize,
}

impl Totals {
    pub(crate) fn calculate(reports: &[&FileReport]) -> Self {
        let symbols_unique = DashSet::new();
        let pkgconfig_unique = DashSet::new();
        let mut totals = reports
            .par_iter()
            .fold(Totals::default, |mut totals, report| {
                for symbol in report.symbol_deps().into_iter().flatten() {
                    totals.symbols += 1;
                    symbols_unique.insert((report.emul32(), symbol.as_str()));
                }
                for name in report.pkgconfig_deps().into_iter().flatten() {
                    totals.pkgconfig += 1;
                    pkgconfig_unique.insert((report.emul32(), name.as_str()));
                }
                totals.soname_links += report.soname_links().map_or(0, |links| links.len());
                totals.kernels += usize::from(report.dep_kernel().is_some());
                totals
            })
            .reduce(Totals::default, |a, b| a + b);
        totals.symbols_unique = symbols_unique.len();
        totals.pkgconfig_unique = pkgconfig_unique.len();
        totals
    }
}

impl Add for Totals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        let symbols = self.symbols + other.symbols;
        let pkgconfig = self.pkgconfig + other.pkgconfig;
        let soname_links = self.soname_links + other.soname_links;
        let kernels = self.kernels + other.kernels;
        Self {
            symbols,
            pkgconfig,
            soname_links,
            kernels,
            total: symbols + pkgconfig + soname_links + kernels,
            symbols_unique: 0,   // Handled by the calculate function.
            pkgconfig_unique: 0, // Handled by the calculate function.
        }
    }
}
