// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Providers outside of the build: installed packages and the repository.

use std::path::{Path, PathBuf};
use tracing::info;

use super::cache::ResolutionCache;
use crate::examine::FileReport;
use crate::system::{InstalledSystem, RepositoryProviders};

/// GL libraries of the pre-glvnd driver stacks, all provided by `libglvnd` nowadays.
pub(crate) const GLVND_LIBRARIES: &[&str] = &[
    "libEGL.so",
    "libEGL.so.1",
    "libEGL.so.1.0.0",
    "libGLESv1_CM.so",
    "libGLESv1_CM.so.1",
    "libGLESv1_CM.so.1.1.0",
    "libGLESv2.so",
    "libGLESv2.so.2",
    "libGLESv2.so.2.0.0",
    "libGL.so",
    "libGL.so.1",
    "libGL.so.1.0.0",
    "libGL.so.1.2.0",
    "libglx.so",
    "libglx.so.1",
];

const GLVND: &str = "libglvnd";
const GLVND_32BIT: &str = "libglvnd-32bit";

const LIBRARY_PATHS: &[&str] = &["/usr/lib64", "/usr/lib"];
const LIBRARY_PATHS_32BIT: &[&str] = &["/usr/lib32", "/usr/lib", "/usr/lib64"];
const KERNEL_PATHS: &[&str] = &["/usr/lib/kernel", "/usr/lib64/kernel"];

/// Memoizing lookups against the installed system and the repository.
pub(crate) struct ExternalProviders<'a> {
    system: &'a dyn InstalledSystem,
    repository: &'a dyn RepositoryProviders,
    cache: ResolutionCache,
}

impl<'a> ExternalProviders<'a> {
    pub(crate) fn new(system: &'a dyn InstalledSystem, repository: &'a dyn RepositoryProviders) -> Self {
        Self {
            system,
            repository,
            cache: ResolutionCache::default(),
        }
    }

    /// Installed owner of a file.
    pub(crate) fn file_owner(&mut self, path: &Path) -> Option<String> {
        self.cache.owner_of(self.system, path)
    }

    /// Owner of the first candidate path that has one. The whole owning package is cached.
    fn first_owner(&mut self, candidates: impl IntoIterator<Item = PathBuf>) -> Option<String> {
        for candidate in candidates {
            if let Some(owner) = self.cache.owner_of(self.system, &candidate) {
                self.cache.remember_files(self.system, &owner);
                return Some(owner);
            }
        }
        None
    }

    /// Installed package providing a shared object needed by `report`.
    pub(crate) fn symbol_provider(&mut self, report: &FileReport, symbol: &str) -> Option<String> {
        let emul32 = report.emul32();
        if let Some(owner) = self.cache.symbols.get(emul32).get(symbol) {
            return Some(owner.clone());
        }
        if GLVND_LIBRARIES.contains(&symbol) {
            let provider = if emul32 { GLVND_32BIT } else { GLVND };
            return Some(provider.to_string());
        }

        let defaults = if emul32 {
            LIBRARY_PATHS_32BIT
        } else {
            LIBRARY_PATHS
        };
        let directories = defaults
            .iter()
            .map(|dir| (*dir).to_string())
            .chain(report.rpaths().into_iter().flatten().cloned())
            .collect::<Vec<_>>();
        let owner = self.first_owner(directories.iter().map(|dir| Path::new(dir).join(symbol)))?;

        self.cache
            .symbols
            .get_mut(emul32)
            .insert(symbol.to_string(), owner.clone());
        info!(
            category = "Dependency",
            "{} adds dependency on {} from {}",
            report.pretty().display(),
            symbol,
            owner
        );
        Some(owner)
    }

    /// Provider of a pkgconfig module among installed packages, then the repository. 32-bit
    /// consumers prefer 32-bit providers.
    pub(crate) fn pkgconfig_provider(&mut self, name: &str, emul32: bool) -> Option<String> {
        if let Some(owner) = self.cache.pkgconfigs.get(emul32).get(name) {
            return Some(owner.clone());
        }
        let owner = if emul32 {
            self.system
                .pkgconfig_provider(name, true)
                .or_else(|| self.system.pkgconfig_provider(name, false))
                .or_else(|| self.repository.provider_of(name, true))
                .or_else(|| self.repository.provider_of(name, false))
        } else {
            self.system
                .pkgconfig_provider(name, false)
                .or_else(|| self.repository.provider_of(name, false))
        }?;
        self.cache
            .pkgconfigs
            .get_mut(emul32)
            .insert(name.to_string(), owner.clone());
        Some(owner)
    }

    /// Installed kernel package shipping the `System.map` of `version`.
    pub(crate) fn kernel_provider(&mut self, report: &FileReport, version: &str) -> Option<String> {
        if let Some(owner) = self.cache.kernels.get(version) {
            return Some(owner.clone());
        }
        let owner = self.first_owner(
            KERNEL_PATHS
                .iter()
                .map(|dir| PathBuf::from(format!("{dir}/System.map-{version}"))),
        )?;
        self.cache
            .kernels
            .insert(version.to_string(), owner.clone());
        info!(
            category = "Kernel",
            "{} adds module dependency on {} from {}",
            report.pretty().display(),
            version,
            owner
        );
        Some(owner)
    }
}
