// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Turns the file reports of a build into dependency edges and provided capabilities.
//!
//! Resolution runs in two passes. The first indexes what every package of the build provides,
//! the second resolves each need against that index and, failing that, against the installed
//! system and the repository.

mod cache;
mod external;
mod index;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

pub use index::{ProviderIndex, Split};

use crate::config::UnresolvedPolicy;
use crate::examine::{Examinations, FileReport};
use crate::package::PackageSet;
use crate::system::{InstalledSystem, RepositoryProviders};
use external::ExternalProviders;

/// Result type for dependency resolution.
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("File reports for a package outside of the build: {name}")]
    UnknownPackage { name: String },
    #[error("Unknown symbol {symbol} needed by {path:?}")]
    UnresolvedSymbol { symbol: String, path: PathBuf },
    #[error("Unknown kernel {version} needed by {path:?}")]
    UnresolvedKernel { version: String, path: PathBuf },
}

/// Resolves the dependencies of one build. Lookups against the installed system are cached
/// for the lifetime of the resolver.
pub struct DependencyResolver<'a> {
    external: ExternalProviders<'a>,
    policy: UnresolvedPolicy,
    index: ProviderIndex,
}

impl<'a> DependencyResolver<'a> {
    #[must_use]
    pub fn new(
        system: &'a dyn InstalledSystem,
        repository: &'a dyn RepositoryProviders,
        policy: UnresolvedPolicy,
    ) -> Self {
        Self {
            external: ExternalProviders::new(system, repository),
            policy,
            index: ProviderIndex::default(),
        }
    }

    /// Provider index of the last resolution pass.
    #[must_use]
    pub fn index(&self) -> &ProviderIndex {
        &self.index
    }

    /// Add dependency edges and provided capabilities to `packages` from their file reports.
    ///
    /// Packages are processed in the order of the set, which decides the owner of keys
    /// provided more than once. Needs that cannot be resolved are logged and skipped, unless
    /// the policy is [`UnresolvedPolicy::Abort`].
    ///
    /// # Errors
    /// Returns an error if `examinations` names a package missing from `packages`, or, under
    /// the abort policy, for the first unresolved symbol or kernel version.
    pub fn resolve(&mut self, packages: &mut PackageSet, examinations: &Examinations) -> ResolveResult<()> {
        if let Some((name, _)) = examinations.iter().find(|(name, _)| packages.get(name).is_none()) {
            return Err(ResolveError::UnknownPackage {
                name: name.to_string(),
            });
        }

        let order: Vec<String> = packages.iter().map(|p| p.name().to_string()).collect();
        self.index = ProviderIndex::build(
            order
                .iter()
                .filter_map(|name| examinations.get(name).map(|reports| (name.as_str(), reports))),
        );

        for name in &order {
            let Some(reports) = examinations.get(name) else {
                continue;
            };
            for report in reports {
                self.resolve_symbols(packages, name, report)?;
                self.resolve_pkgconfig_deps(packages, name, report);
                add_pkgconfig_provides(packages, name, report);
                self.resolve_soname_links(packages, name, report);
                self.resolve_kernel(packages, name, report)?;
            }
        }
        Ok(())
    }

    fn resolve_symbols(&mut self, packages: &mut PackageSet, name: &str, report: &FileReport) -> ResolveResult<()> {
        let Some(symbols) = report.symbol_deps() else {
            return Ok(());
        };
        for symbol in symbols {
            let provider = match in_build_symbol_provider(&self.index, packages, report, symbol) {
                Some(provider) => Some(provider),
                None => self.external.symbol_provider(report, symbol),
            };
            let Some(provider) = provider else {
                error!(category = "Dependency", "Fatal: Unknown symbol: {symbol}");
                if self.policy == UnresolvedPolicy::Abort {
                    return Err(ResolveError::UnresolvedSymbol {
                        symbol: symbol.clone(),
                        path: report.pretty().to_path_buf(),
                    });
                }
                continue;
            };
            if provider != name {
                add_dependency(packages, name, provider);
            }
        }
        Ok(())
    }

    fn resolve_pkgconfig_deps(&mut self, packages: &mut PackageSet, name: &str, report: &FileReport) {
        let Some(requirements) = report.pkgconfig_deps() else {
            return;
        };
        for requirement in requirements {
            let provider = match self.index.pkgconfig_provider(requirement, report.emul32()) {
                Some(provider) => Some(provider.to_string()),
                None => self.external.pkgconfig_provider(requirement, report.emul32()),
            };
            let Some(provider) = provider else {
                warn!(
                    category = "PKGCONFIG",
                    "Not adding unknown dependency {requirement} to {name}"
                );
                continue;
            };
            let known = packages
                .get(name)
                .is_some_and(|p| p.dependencies().contains(&provider));
            if known || provider == name {
                continue;
            }
            info!(category = "PKGCONFIG", "{name} adds dependency on {provider}");
            add_dependency(packages, name, provider);
        }
    }

    fn resolve_soname_links(&mut self, packages: &mut PackageSet, name: &str, report: &FileReport) {
        let Some(links) = report.soname_links() else {
            return;
        };
        for link in links {
            let owner = match packages.owner_of(link) {
                Some(owner) => Some(owner.to_string()),
                None => self.external.file_owner(link),
            };
            let Some(owner) = owner else {
                warn!(
                    category = "SOLINK",
                    "{name} depends on non existing soname link: {}",
                    link.display()
                );
                continue;
            };
            if owner == name {
                continue;
            }
            info!(category = "SOLINK", "{name} depends on {owner} through .so link");
            add_dependency(packages, name, owner);
        }
    }

    fn resolve_kernel(&mut self, packages: &mut PackageSet, name: &str, report: &FileReport) -> ResolveResult<()> {
        let Some(version) = report.dep_kernel() else {
            return Ok(());
        };
        let provider = match self.index.kernel_provider(version, report.emul32()) {
            Some(provider) => Some(provider.to_string()),
            None => self.external.kernel_provider(report, version),
        };
        let Some(provider) = provider else {
            error!(category = "Kernel", "Fatal: Unknown kernel: {version}");
            if self.policy == UnresolvedPolicy::Abort {
                return Err(ResolveError::UnresolvedKernel {
                    version: version.to_string(),
                    path: report.pretty().to_path_buf(),
                });
            }
            return Ok(());
        };
        if provider != name {
            add_dependency(packages, name, provider);
        }
        Ok(())
    }
}

/// Provider of a shared object within the build: by soname, then by file name in any rpath
/// directory of the build.
fn in_build_symbol_provider(
    index: &ProviderIndex,
    packages: &PackageSet,
    report: &FileReport,
    symbol: &str,
) -> Option<String> {
    if let Some(provider) = index.soname_provider(symbol, report.emul32()) {
        return Some(provider.to_string());
    }
    index
        .rpaths(report.emul32())
        .iter()
        .find_map(|rpath| packages.owner_of(&Path::new(rpath).join(symbol)))
        .map(str::to_string)
}

fn add_pkgconfig_provides(packages: &mut PackageSet, name: &str, report: &FileReport) {
    let Some(module) = report.pkgconfig_name() else {
        return;
    };
    let capability = if report.emul32() {
        format!("pkgconfig32({module})")
    } else {
        format!("pkgconfig({module})")
    };
    if let Some(package) = packages.get_mut(name) {
        package.add_provide(capability);
    }
}

fn add_dependency(packages: &mut PackageSet, name: &str, provider: String) {
    if let Some(package) = packages.get_mut(name) {
        package.add_dependency(provider);
    }
}
