// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Scans a single classified file into a [`FileReport`].

use path_clean::PathClean;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::classify::{is_shared_object, Category, FileProbe};
use super::report::FileReport;
use super::strip::{store_debug, strip_file, strip_mode, wants_debug};
use super::ExamineResult;
use crate::config::ExamineConfig;
use crate::inspect::Introspector;

/// Compatibility search path of 32-bit pkgconfig files.
const EMUL32_PKGCONFIG_PATH: &str = "/usr/lib32/pkgconfig:/usr/share/pkgconfig:/usr/lib/pkgconfig";
const SYSTEM_MAP_PREFIX: &str = "System.map-";
const VERSION_OPERATORS: &[char] = &['<', '>', '=', '!'];

/// Requirement names of `pkg-config --print-requires` output, without version constraints.
#[must_use]
pub fn parse_requirements<S: AsRef<str>>(lines: &[S]) -> BTreeSet<String> {
    lines
        .iter()
        .filter_map(|line| {
            let line = line.as_ref();
            let name = line
                .find(VERSION_OPERATORS)
                .map_or(line, |idx| &line[..idx])
                .trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

/// `PKG_CONFIG_PATH` entries for resolving the requirements of the pkgconfig file at `path`.
///
/// Only existing directories are returned, each once, in search order.
#[must_use]
pub fn pkgconfig_search_paths(path: &Path, emul32: bool) -> Vec<PathBuf> {
    let dir = path.parent().unwrap_or(Path::new("/"));
    let mut candidates: Vec<PathBuf> = Vec::new();
    if emul32 {
        candidates.push(dir.join("../../lib32/pkgconfig"));
        candidates.extend(std::env::split_paths(EMUL32_PKGCONFIG_PATH));
    } else {
        candidates.push(dir.join("../../lib64/pkgconfig"));
        candidates.push(dir.join("../../lib/pkgconfig"));
    }
    candidates.push(dir.join("../../share/pkgconfig"));

    let mut paths: Vec<PathBuf> = Vec::new();
    for candidate in candidates {
        let absolute = std::path::absolute(&candidate).unwrap_or(candidate).clean();
        if absolute.is_dir() && !paths.contains(&absolute) {
            paths.push(absolute);
        }
    }
    paths
}

/// Produces the report of one file and applies its strip/debug side effects.
pub(crate) struct FileScanner<'a, I: Introspector + ?Sized> {
    config: &'a ExamineConfig,
    introspector: &'a I,
}

impl<'a, I: Introspector + ?Sized> FileScanner<'a, I> {
    pub(crate) fn new(config: &'a ExamineConfig, introspector: &'a I) -> Self {
        Self {
            config,
            introspector,
        }
    }

    /// Scan a file of `package`.
    ///
    /// # Errors
    /// Returns an error only on structural failures of the debug side effect. Introspection
    /// failures are logged and leave the corresponding report fields empty.
    pub(crate) fn scan(
        &self,
        package: &str,
        probe: &FileProbe,
        category: Category,
    ) -> ExamineResult<FileReport> {
        if wants_debug(category) {
            store_debug(self.config, self.introspector, probe)?;
        }
        if let Some(mode) = strip_mode(category) {
            strip_file(self.config, self.introspector, probe, mode);
        }

        let mut report = FileReport::new(package, &probe.pretty, &probe.path, probe.is_emul32());
        match category {
            Category::PkgConfig => self.scan_pkgconfig(probe, &mut report),
            Category::KernelMap => {
                report.prov_kernel = probe
                    .pretty_str()
                    .rsplit_once(SYSTEM_MAP_PREFIX)
                    .map(|(_, version)| version.to_string());
            }
            _ if !self.config.autodep => {}
            Category::SonameLink => self.scan_soname_link(probe, &mut report),
            Category::SharedObject => self.scan_dynamic(probe, &mut report, true),
            Category::Executable | Category::PieExecutable => {
                self.scan_dynamic(probe, &mut report, false);
            }
            Category::Relocatable {
                kernel_module: true,
            } => self.scan_kernel_module(probe, &mut report),
            Category::Relocatable { .. } | Category::StaticArchive => {}
        }
        Ok(report)
    }

    fn scan_pkgconfig(&self, probe: &FileProbe, report: &mut FileReport) {
        report.pkgconfig_name = probe
            .pretty
            .file_name()
            .map(|name| name.to_string_lossy())
            .and_then(|name| name.strip_suffix(".pc").map(str::to_string));
        if !self.config.autodep {
            return;
        }

        let search_paths = pkgconfig_search_paths(&probe.path, report.emul32);
        let mut requirements = BTreeSet::new();
        for lines in [
            self.introspector.pkgconfig_requires(&probe.path, &search_paths),
            self.introspector
                .pkgconfig_requires_private(&probe.path, &search_paths),
        ] {
            match lines {
                Ok(lines) => requirements.extend(parse_requirements(&lines)),
                Err(e) => warn!(
                    category = "PKGCONFIG",
                    error = %e,
                    "Failed to list requirements of '{}'",
                    probe.pretty.display()
                ),
            }
        }
        if !requirements.is_empty() {
            report.pkgconfig_deps = Some(requirements);
        }
    }

    fn scan_dynamic(&self, probe: &FileProbe, report: &mut FileReport, with_soname: bool) {
        let origin = probe.pretty.parent().unwrap_or(Path::new("/"));
        let info = match self.introspector.dynamic_info(&probe.path, origin) {
            Ok(info) => info,
            Err(e) => {
                warn!(
                    category = "File",
                    error = %e,
                    "Failed to read dynamic section of '{}'",
                    probe.pretty.display()
                );
                return;
            }
        };
        if !info.needed.is_empty() {
            report.symbol_deps = Some(info.needed.into_iter().collect());
        }
        if !info.rpath.is_empty() {
            report.rpaths = Some(info.rpath.into_iter().collect());
        }
        if with_soname {
            report.soname = info.soname;
        }
    }

    fn scan_kernel_module(&self, probe: &FileProbe, report: &mut FileReport) {
        match self.introspector.vermagic(&probe.path) {
            Ok(Some(magic)) if magic.is_versioned() => report.dep_kernel = Some(magic.version),
            Ok(_) => debug!(
                category = "Kernel",
                "No usable vermagic in '{}'",
                probe.pretty.display()
            ),
            Err(e) => warn!(
                category = "File",
                error = %e,
                "Failed to read vermagic of '{}'",
                probe.pretty.display()
            ),
        }
    }

    /// Resolve the link target within the staging root.
    fn link_target(&self, probe: &FileProbe) -> Option<PathBuf> {
        let target = match fs::read_link(&probe.path) {
            Ok(target) => target,
            Err(e) => {
                warn!(
                    category = "File",
                    error = %e,
                    "Failed to read link '{}'",
                    probe.pretty.display()
                );
                return None;
            }
        };
        let resolved = if target.is_absolute() {
            self.config.real_path(&target)
        } else {
            probe.path.parent()?.join(target)
        };
        Some(resolved.clean())
    }

    fn scan_soname_link(&self, probe: &FileProbe, report: &mut FileReport) {
        let Some(target) = self.link_target(probe) else {
            return;
        };
        let signature = match self.introspector.signature(&target) {
            Ok(signature) => signature,
            Err(e) => {
                warn!(
                    category = "SOLINK",
                    error = %e,
                    "Dangling link '{}'",
                    probe.pretty.display()
                );
                return;
            }
        };
        if !is_shared_object(&signature) {
            debug!(
                category = "SOLINK",
                "'{}' does not point at a shared object",
                probe.pretty.display()
            );
            return;
        }
        report.soname_links = Some(BTreeSet::from([self.config.pretty_path(&target)]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::DynamicInfo;
    use crate::testing::FakeIntrospector;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    struct Staging {
        root: TempDir,
        config: ExamineConfig,
    }

    impl Staging {
        fn new() -> Self {
            let root = TempDir::new().unwrap();
            let mut config = ExamineConfig::new(root.path());
            config.strip = false;
            config.debug = false;
            Self { root, config }
        }

        fn write(&self, pretty: &str, contents: &str) -> PathBuf {
            let path = self.config.real_path(Path::new(pretty));
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, contents).unwrap();
            path
        }

        fn link(&self, pretty: &str, target: &str) -> PathBuf {
            let path = self.config.real_path(Path::new(pretty));
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            symlink(target, &path).unwrap();
            path
        }

        fn probe(&self, introspector: &FakeIntrospector, pretty: &str) -> FileProbe {
            FileProbe::new(
                introspector,
                PathBuf::from(pretty),
                self.config.real_path(Path::new(pretty)),
            )
            .unwrap()
        }
    }

    #[test]
    fn test_parse_requirements_drops_versions() {
        let names = parse_requirements(&["foo >= 1.2", "bar = 2.0", "baz", "qux<3", "  ", "zap != 1"]);
        assert_eq!(
            names,
            BTreeSet::from(["foo", "bar", "baz", "qux", "zap"].map(str::to_string))
        );
    }

    #[test]
    fn test_search_paths_existing_only() {
        let staging = Staging::new();
        let pc = staging.write("/usr/lib64/pkgconfig/zlib.pc", "Name: zlib\n");
        fs::create_dir_all(staging.root.path().join("usr/share/pkgconfig")).unwrap();

        let paths = pkgconfig_search_paths(&pc, false);
        assert_eq!(
            paths,
            vec![
                staging.root.path().join("usr/lib64/pkgconfig"),
                staging.root.path().join("usr/share/pkgconfig"),
            ]
        );
    }

    #[test]
    fn test_pkgconfig_report() {
        let staging = Staging::new();
        staging.write("/usr/lib64/pkgconfig/libpng.pc", "Name: libpng\n");
        let introspector = FakeIntrospector::default()
            .with_requires("/usr/lib64/pkgconfig/libpng.pc", &["zlib >= 1.2"])
            .with_requires_private("/usr/lib64/pkgconfig/libpng.pc", &["zlib", "libm = 1"]);
        let probe = staging.probe(&introspector, "/usr/lib64/pkgconfig/libpng.pc");

        let report = FileScanner::new(&staging.config, &introspector)
            .scan("libpng-devel", &probe, Category::PkgConfig)
            .unwrap();
        assert_eq!(report.pkgconfig_name(), Some("libpng"));
        assert_eq!(
            report.pkgconfig_deps(),
            Some(&BTreeSet::from(["zlib".to_string(), "libm".to_string()]))
        );
        assert!(!report.emul32());
    }

    #[test]
    fn test_pkgconfig_without_autodep() {
        let mut staging = Staging::new();
        staging.config.autodep = false;
        staging.write("/usr/lib32/pkgconfig/zlib.pc", "Name: zlib\n");
        let introspector =
            FakeIntrospector::default().with_requires("/usr/lib32/pkgconfig/zlib.pc", &["foo"]);
        let probe = staging.probe(&introspector, "/usr/lib32/pkgconfig/zlib.pc");

        let report = FileScanner::new(&staging.config, &introspector)
            .scan("zlib-32bit-devel", &probe, Category::PkgConfig)
            .unwrap();
        assert_eq!(report.pkgconfig_name(), Some("zlib"));
        assert_eq!(report.pkgconfig_deps(), None);
        assert!(report.emul32());
    }

    #[test]
    fn test_shared_object_report() {
        let staging = Staging::new();
        staging.write("/usr/lib64/libpng16.so.16", "stub");
        let introspector = FakeIntrospector::default()
            .with_signature("/usr/lib64/libpng16.so.16", crate::examine::classify::tests::SO64)
            .with_dynamic(
                "/usr/lib64/libpng16.so.16",
                DynamicInfo {
                    needed: vec!["libz.so.1".to_string(), "libc.so.6".to_string()],
                    rpath: vec!["/usr/lib64/png".to_string()],
                    soname: Some("libpng16.so.16".to_string()),
                },
            );
        let probe = staging.probe(&introspector, "/usr/lib64/libpng16.so.16");

        let report = FileScanner::new(&staging.config, &introspector)
            .scan("libpng", &probe, Category::SharedObject)
            .unwrap();
        assert_eq!(report.soname(), Some("libpng16.so.16"));
        assert_eq!(report.symbol_deps().unwrap().len(), 2);
        assert!(report.rpaths().unwrap().contains("/usr/lib64/png"));
    }

    #[test]
    fn test_executable_has_no_soname() {
        let staging = Staging::new();
        staging.write("/usr/bin/pngfix", "stub");
        let introspector = FakeIntrospector::default().with_dynamic(
            "/usr/bin/pngfix",
            DynamicInfo {
                needed: vec!["libpng16.so.16".to_string()],
                rpath: vec![],
                soname: Some("bogus".to_string()),
            },
        );
        let probe = staging.probe(&introspector, "/usr/bin/pngfix");

        let report = FileScanner::new(&staging.config, &introspector)
            .scan("libpng", &probe, Category::PieExecutable)
            .unwrap();
        assert_eq!(report.soname(), None);
        assert_eq!(report.rpaths(), None);
        assert!(report.symbol_deps().unwrap().contains("libpng16.so.16"));
    }

    #[test]
    fn test_kernel_module_requires_versioned_magic() {
        let staging = Staging::new();
        staging.write("/usr/lib/modules/6.6.7/extra/a.ko", "stub");
        staging.write("/usr/lib/modules/6.6.7/extra/b.ko", "stub");
        let introspector = FakeIntrospector::default()
            .with_vermagic(
                "/usr/lib/modules/6.6.7/extra/a.ko",
                "6.6.7-267.current SMP preempt mod_unload modversions",
            )
            .with_vermagic("/usr/lib/modules/6.6.7/extra/b.ko", "6.6.7-267.current SMP");
        let scanner = FileScanner::new(&staging.config, &introspector);
        let kind = Category::Relocatable {
            kernel_module: true,
        };

        let a = staging.probe(&introspector, "/usr/lib/modules/6.6.7/extra/a.ko");
        let report = scanner.scan("module-a", &a, kind).unwrap();
        assert_eq!(report.dep_kernel(), Some("6.6.7-267.current"));

        let b = staging.probe(&introspector, "/usr/lib/modules/6.6.7/extra/b.ko");
        let report = scanner.scan("module-b", &b, kind).unwrap();
        assert_eq!(report.dep_kernel(), None);
    }

    #[test]
    fn test_system_map_provides_kernel() {
        let staging = Staging::new();
        staging.write("/usr/lib/kernel/System.map-6.6.7-267.current", "ffff T _text\n");
        let introspector = FakeIntrospector::default();
        let probe = staging.probe(&introspector, "/usr/lib/kernel/System.map-6.6.7-267.current");

        let report = FileScanner::new(&staging.config, &introspector)
            .scan("linux-current", &probe, Category::KernelMap)
            .unwrap();
        assert_eq!(report.prov_kernel(), Some("6.6.7-267.current"));
    }

    #[test]
    fn test_soname_link_to_shared_object() {
        let staging = Staging::new();
        staging.write("/usr/lib64/libz.so.1.3", "stub");
        staging.link("/usr/lib64/libz.so", "libz.so.1.3");
        let introspector = FakeIntrospector::default()
            .with_signature("/usr/lib64/libz.so.1.3", crate::examine::classify::tests::SO64);
        let probe = staging.probe(&introspector, "/usr/lib64/libz.so");

        let report = FileScanner::new(&staging.config, &introspector)
            .scan("zlib-devel", &probe, Category::SonameLink)
            .unwrap();
        assert_eq!(
            report.soname_links(),
            Some(&BTreeSet::from([PathBuf::from("/usr/lib64/libz.so.1.3")]))
        );
    }

    #[test]
    fn test_absolute_soname_link_stays_in_root() {
        let staging = Staging::new();
        staging.write("/usr/lib64/libz.so.1.3", "stub");
        staging.link("/usr/lib64/libz.so", "/usr/lib64/libz.so.1.3");
        let introspector = FakeIntrospector::default()
            .with_signature("/usr/lib64/libz.so.1.3", crate::examine::classify::tests::SO64);
        let probe = staging.probe(&introspector, "/usr/lib64/libz.so");

        let report = FileScanner::new(&staging.config, &introspector)
            .scan("zlib-devel", &probe, Category::SonameLink)
            .unwrap();
        assert_eq!(
            report.soname_links(),
            Some(&BTreeSet::from([PathBuf::from("/usr/lib64/libz.so.1.3")]))
        );
    }

    #[test]
    fn test_soname_link_with_unclean_install_root() {
        let root = TempDir::new().unwrap();
        let mut config = ExamineConfig::new(root.path().join("sub/../install"));
        config.strip = false;
        config.debug = false;
        let library = config.real_path(Path::new("/usr/lib64/libz.so.1.3"));
        fs::create_dir_all(library.parent().unwrap()).unwrap();
        fs::write(&library, "stub").unwrap();
        let link = config.real_path(Path::new("/usr/lib64/libz.so"));
        symlink("libz.so.1.3", &link).unwrap();
        let introspector = FakeIntrospector::default()
            .with_signature("/usr/lib64/libz.so.1.3", crate::examine::classify::tests::SO64);
        let probe = FileProbe::new(&introspector, PathBuf::from("/usr/lib64/libz.so"), link).unwrap();

        let report = FileScanner::new(&config, &introspector)
            .scan("zlib-devel", &probe, Category::SonameLink)
            .unwrap();
        assert_eq!(
            report.soname_links(),
            Some(&BTreeSet::from([PathBuf::from("/usr/lib64/libz.so.1.3")]))
        );
    }

    #[test]
    fn test_soname_link_to_non_library() {
        let staging = Staging::new();
        staging.write("/usr/lib64/libfoo.so.1", "INPUT(-lbar)\n");
        staging.link("/usr/lib64/libfoo.so", "libfoo.so.1");
        staging.link("/usr/lib64/libdangling.so", "libgone.so.1");
        let introspector = FakeIntrospector::default();
        let scanner = FileScanner::new(&staging.config, &introspector);

        let probe = staging.probe(&introspector, "/usr/lib64/libfoo.so");
        let report = scanner.scan("foo-devel", &probe, Category::SonameLink).unwrap();
        assert_eq!(report.soname_links(), None);

        let probe = staging.probe(&introspector, "/usr/lib64/libdangling.so");
        let report = scanner.scan("foo-devel", &probe, Category::SonameLink).unwrap();
        assert_eq!(report.soname_links(), None);
    }

    #[test]
    fn test_side_effects_run_for_binaries() {
        let mut staging = Staging::new();
        staging.config.strip = true;
        staging.config.debug = true;
        staging.write("/usr/bin/tool", "stub");
        let introspector = FakeIntrospector::default();
        let probe = staging.probe(&introspector, "/usr/bin/tool");

        FileScanner::new(&staging.config, &introspector)
            .scan("tool", &probe, Category::Executable)
            .unwrap();
        assert_eq!(introspector.stripped(), vec![probe.path.clone()]);
        assert_eq!(introspector.debug_extractions(), 1);
        assert!(staging.root.path().join("usr/lib/debug/usr/bin").is_dir());
    }

    #[test]
    fn test_strip_failure_is_not_fatal() {
        let mut staging = Staging::new();
        staging.config.strip = true;
        staging.write("/usr/lib64/libz.a", "stub");
        let introspector = FakeIntrospector::default().failing_strip();
        let probe = staging.probe(&introspector, "/usr/lib64/libz.a");

        let report = FileScanner::new(&staging.config, &introspector)
            .scan("zlib-devel", &probe, Category::StaticArchive)
            .unwrap();
        assert_eq!(report.pretty(), Path::new("/usr/lib64/libz.a"));
    }
}
