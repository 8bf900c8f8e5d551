// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Formats and prints report summaries to the console.

use comfy_table::{Cell, Table};
use std::collections::BTreeSet;

use super::Report;
use crate::catalog::Catalog;
use crate::check::FindingKind;

/// Summarize the report to the console.
///
/// Prints one line per finding, the finding statistics, and the explanation of every
/// kind of finding that occurred.
pub fn summarize_report(report: &Report, catalog: &Catalog) {
    for line in finding_lines(report) {
        println!("{line}");
    }
    if !report.findings().is_empty() {
        println!();
    }

    println!("Package: {}", report.package());
    println!("Total files: {}", report.totals().files);
    println!("tmpfiles.d fragments: {}\n", report.totals().fragments);
    println!("{}\n", findings_table(report));

    for kind in reported_kinds(report) {
        if let Some(details) = catalog.details(kind.id()) {
            println!("{}:\n{}\n", kind.id(), details);
        }
    }
}

/// Format findings as `<package>: <severity>: <id> <path>`.
fn finding_lines(report: &Report) -> Vec<String> {
    report
        .findings()
        .iter()
        .map(|finding| {
            format!(
                "{}: {}: {} {}",
                report.package(),
                finding.severity.tag(),
                finding.kind.id(),
                finding.path.display()
            )
        })
        .collect()
}

/// Kinds present in the report, in declaration order.
fn reported_kinds(report: &Report) -> BTreeSet<FindingKind> {
    report.findings().iter().map(|finding| finding.kind).collect()
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

/// Create a table showing finding statistics.
fn findings_table(report: &Report) -> Table {
    let totals = &report.totals().findings;
    let mut table = default_table_preset();
    table.set_header(vec![
        Cell::new("Finding").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Count").add_attribute(comfy_table::Attribute::Bold),
    ]);
    for kind in FindingKind::ALL {
        table.add_row(vec![Cell::new(kind.id()), Cell::new(totals.count(kind))]);
    }
    table
        .add_row(vec![
            Cell::new("Suppressed"),
            Cell::new(report.totals().suppressed),
        ])
        .add_row(vec![
            Cell::new("Total").add_attribute(comfy_table::Attribute::Bold),
            Cell::new(totals.total).add_attribute(comfy_table::Attribute::Bold),
        ]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::all_checks;
    use crate::package::{Package, PackageFile, PackageFiles, PackageKind};
    use crate::report::Filters;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_report(dir: &TempDir) -> Report {
        let fragment = dir.path().join("foo.conf");
        fs::write(
            &fragment,
            "d /run/foo 0755 root root -\nd /run/bar 0755 root root -\n",
        )
        .unwrap();
        let files: PackageFiles = [
            (
                PathBuf::from("/usr/lib/tmpfiles.d/foo.conf"),
                PackageFile::new(0o100_644, false, fragment),
            ),
            (
                PathBuf::from("/run/bar"),
                PackageFile::new(0o040_755, false, dir.path().join("bar")),
            ),
        ]
        .into_iter()
        .collect();
        let package =
            Package::new_for_testing(PathBuf::from("/test/foo.rpm"), PackageKind::Binary, files);
        Report::new(&package, &all_checks(), &Filters::empty()).unwrap()
    }

    #[test]
    fn test_finding_lines() {
        let dir = TempDir::new().unwrap();
        let report = create_report(&dir);
        assert_eq!(
            finding_lines(&report),
            vec![
                "foo.rpm: W: tmpfile-not-in-filelist /run/foo".to_string(),
                "foo.rpm: W: tmpfile-not-ghost /run/bar".to_string(),
            ]
        );
    }

    #[test]
    fn test_reported_kinds_are_ordered() {
        let dir = TempDir::new().unwrap();
        let report = create_report(&dir);
        assert_eq!(
            reported_kinds(&report).into_iter().collect::<Vec<_>>(),
            vec![FindingKind::TmpfileNotInFilelist, FindingKind::TmpfileNotGhost]
        );
    }

    #[test]
    fn test_findings_table_lists_every_kind() {
        let dir = TempDir::new().unwrap();
        let rendered = findings_table(&create_report(&dir)).to_string();
        for kind in FindingKind::ALL {
            assert!(rendered.contains(kind.id()), "table should list {kind}");
        }
        assert!(rendered.contains("Suppressed"));
    }
}
