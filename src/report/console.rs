// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Formats and prints report summaries to the console.

use comfy_table::{Cell, Table};

use super::BuildReport;

/// Summarize the report to the console.
///
/// Prints the scanned file categories, the needs found in them and the resulting
/// dependencies of each package.
pub fn summarize_report(report: &BuildReport<'_>) {
    println!("Install root: {}", report.install_dir.display());
    println!("Packages: {}", report.totals.packages);
    println!("Removed files: {}\n", report.totals.removed);

    println!("{}\n", file_table(report));
    println!("{}\n", needs_table(report));
    println!("{}", package_table(report));
}

/// Create a table with the default preset styling.
fn default_table_preset() -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL_CONDENSED)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
    table
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|title| Cell::new(title).add_attribute(comfy_table::Attribute::Bold))
        .collect()
}

fn total_row(count: usize) -> Vec<Cell> {
    vec![
        Cell::new("Total").add_attribute(comfy_table::Attribute::Bold),
        Cell::new(count).add_attribute(comfy_table::Attribute::Bold),
    ]
}

/// Create a table showing the categories of the scanned files.
fn file_table(report: &BuildReport) -> Table {
    let files = &report.totals.files;
    let mut table = default_table_preset();
    table
        .set_header(header(&["Scanned File", "Count"]))
        .add_row(vec![Cell::new("Shared libraries"), Cell::new(files.shared_libraries)])
        .add_row(vec![Cell::new("Binaries"), Cell::new(files.binaries)])
        .add_row(vec![Cell::new("pkgconfig"), Cell::new(files.pkgconfig)])
        .add_row(vec![Cell::new("Soname links"), Cell::new(files.soname_links)])
        .add_row(vec![Cell::new("Kernel modules"), Cell::new(files.kernel_modules)])
        .add_row(vec![Cell::new("Kernel maps"), Cell::new(files.kernel_maps)])
        .add_row(vec![Cell::new("Other"), Cell::new(files.other)])
        .add_row(total_row(files.total));
    table
}

/// Create a table showing what the scanned files need.
fn needs_table(report: &BuildReport) -> Table {
    let needs = &report.totals.needs;
    let mut table = default_table_preset();
    table
        .set_header(header(&["Need", "Count", "Unique"]))
        .add_row(vec![
            Cell::new("Symbols"),
            Cell::new(needs.symbols),
            Cell::new(needs.symbols_unique),
        ])
        .add_row(vec![
            Cell::new("pkgconfig"),
            Cell::new(needs.pkgconfig),
            Cell::new(needs.pkgconfig_unique),
        ])
        .add_row(vec![Cell::new("Soname links"), Cell::new(needs.soname_links), Cell::new("")])
        .add_row(vec![Cell::new("Kernels"), Cell::new(needs.kernels), Cell::new("")])
        .add_row(total_row(needs.total));
    table
}

/// Create a table showing the dependencies and provides of each package.
fn package_table(report: &BuildReport) -> Table {
    let mut table = default_table_preset();
    table.set_header(header(&["Package", "Files", "Dependencies", "Provides"]));
    for package in &report.packages {
        let dependencies: Vec<&str> = package.dependencies.iter().map(String::as_str).collect();
        let provides: Vec<&str> = package.provides.iter().map(String::as_str).collect();
        table.add_row(vec![
            Cell::new(package.name),
            Cell::new(package.files.len()),
            Cell::new(dependencies.join(", ")),
            Cell::new(provides.join(", ")),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::examine::Examinations;
    use crate::package::{Package, PackageSet};
    use std::path::Path;

    #[test]
    fn test_package_table_lists_dependencies() {
        let mut app = Package::new("app", Vec::new());
        app.add_dependency("zlib");
        app.add_dependency("glibc");
        let packages = PackageSet::new(vec![app]).unwrap();
        let examinations = Examinations::default();
        let report = BuildReport::new(Path::new("/install"), &packages, &examinations);

        let rendered = package_table(&report).to_string();
        assert!(rendered.contains("glibc, zlib"), "unexpected table:\n{rendered}");
        assert!(file_table(&report).to_string().contains("Shared libraries"));
    }
}
