// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Statistics over the file reports and the resolved dependencies of a build.

mod files;
mod needs;

use serde::Serialize;

use crate::examine::Examinations;
use crate::package::PackageSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ReportTotals {
    pub(crate) packages: usize,
    pub(crate) removed: usize,
    pub(crate) dependencies: usize,
    pub(crate) provides: usize,
    pub(crate) files: files::Totals,
    pub(crate) needs: needs::Totals,
}

impl ReportTotals {
    #[must_use]
    pub(crate) fn new(packages: &PackageSet, examinations: &Examinations) -> Self {
        let reports: Vec<_> = examinations.reports().collect();
        Self {
            packages: packages.len(),
            removed: packages.iter().map(|p| p.removed().len()).sum(),
            dependencies: packages.iter().map(|p| p.dependencies().len()).sum(),
            provides: packages.iter().map(|p| p.provides().len()).sum(),
            files: files::Totals::calculate(&reports),
            needs: needs::Totals::calculate(&reports),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::examine::FileReport;
    use crate::package::Package;
    use std::collections::BTreeSet;
    use std::path::{Path, PathBuf};

    fn report(pretty: &str) -> FileReport {
        FileReport::new("pkg", Path::new(pretty), Path::new(pretty), false)
    }

    #[test]
    fn test_totals() {
        let mut library = report("/usr/lib64/libz.so.1");
        library.soname = Some("libz.so.1".to_string());
        library.symbol_deps = Some(BTreeSet::from(["libc.so.6".to_string()]));
        let mut binary = report("/usr/bin/minigzip");
        binary.symbol_deps = Some(BTreeSet::from([
            "libc.so.6".to_string(),
            "libz.so.1".to_string(),
        ]));
        let mut pc = report("/usr/lib64/pkgconfig/zlib.pc");
        pc.pkgconfig_name = Some("zlib".to_string());
        let mut link = report("/usr/lib64/libz.so");
        link.soname_links = Some(BTreeSet::from([PathBuf::from("/usr/lib64/libz.so.1")]));

        let mut examinations = Examinations::default();
        examinations.insert("zlib", vec![library, binary]);
        examinations.insert("zlib-devel", vec![pc, link]);
        let mut zlib = Package::new("zlib", Vec::new());
        zlib.add_dependency("glibc");
        let packages = PackageSet::new(vec![zlib, Package::new("zlib-devel", Vec::new())]).unwrap();

        let totals = ReportTotals::new(&packages, &examinations);
        assert_eq!(totals.packages, 2);
        assert_eq!(totals.dependencies, 1);
        assert_eq!(totals.files.shared_libraries, 1);
        assert_eq!(totals.files.binaries, 1);
        assert_eq!(totals.files.pkgconfig, 1);
        assert_eq!(totals.files.soname_links, 1);
        assert_eq!(totals.files.total, 4);
        assert_eq!(totals.needs.symbols, 3);
        assert_eq!(totals.needs.symbols_unique, 2);
        assert_eq!(totals.needs.soname_links, 1);
        assert_eq!(totals.needs.total, 4);
    }
}
