// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! What the packages of the build provide, collected before any dependency is resolved.

use std::collections::{BTreeSet, HashMap};

use crate::examine::FileReport;

/// A value kept separately for native and 32-bit compatibility files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split<T> {
    pub native: T,
    pub emul32: T,
}

impl<T> Split<T> {
    #[must_use]
    pub fn get(&self, emul32: bool) -> &T {
        if emul32 {
            &self.emul32
        } else {
            &self.native
        }
    }

    pub fn get_mut(&mut self, emul32: bool) -> &mut T {
        if emul32 {
            &mut self.emul32
        } else {
            &mut self.native
        }
    }
}

/// Provider index of one build.
///
/// When two packages provide the same key, the package iterated last owns it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderIndex {
    rpaths: Split<BTreeSet<String>>,
    sonames: Split<HashMap<String, String>>,
    pkgconfigs: Split<HashMap<String, String>>,
    kernels: Split<HashMap<String, String>>,
}

impl ProviderIndex {
    /// Index the reports of each package, in the given package order.
    pub fn build<'r>(entries: impl IntoIterator<Item = (&'r str, &'r [FileReport])>) -> Self {
        let mut index = Self::default();
        for (package, reports) in entries {
            for report in reports {
                index.add(package, report);
            }
        }
        index
    }

    fn add(&mut self, package: &str, report: &FileReport) {
        let emul32 = report.emul32();
        if let Some(rpaths) = report.rpaths() {
            self.rpaths.get_mut(emul32).extend(rpaths.iter().cloned());
        }
        if let Some(soname) = report.soname() {
            self.sonames
                .get_mut(emul32)
                .insert(soname.to_string(), package.to_string());
        }
        if let Some(name) = report.pkgconfig_name() {
            self.pkgconfigs
                .get_mut(emul32)
                .insert(name.to_string(), package.to_string());
        }
        if let Some(version) = report.prov_kernel() {
            self.kernels
                .get_mut(emul32)
                .insert(version.to_string(), package.to_string());
        }
    }

    /// Every rpath directory seen in the build.
    #[must_use]
    pub fn rpaths(&self, emul32: bool) -> &BTreeSet<String> {
        self.rpaths.get(emul32)
    }

    #[must_use]
    pub fn soname_provider(&self, soname: &str, emul32: bool) -> Option<&str> {
        self.sonames.get(emul32).get(soname).map(String::as_str)
    }

    /// In-build provider of a pkgconfig module. 32-bit consumers fall back to native providers.
    #[must_use]
    pub fn pkgconfig_provider(&self, name: &str, emul32: bool) -> Option<&str> {
        if emul32 {
            if let Some(package) = self.pkgconfigs.emul32.get(name) {
                return Some(package);
            }
        }
        self.pkgconfigs.native.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn kernel_provider(&self, version: &str, emul32: bool) -> Option<&str> {
        self.kernels.get(emul32).get(version).map(String::as_str)
    }
}
