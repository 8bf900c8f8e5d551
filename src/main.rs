// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
mod args;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};

use args::Args;
use tmpfiles_validator::catalog::Catalog;
use tmpfiles_validator::check::{all_checks, catalog_for, Check};
use tmpfiles_validator::package::Package;
use tmpfiles_validator::report::{summarize_report, validate_report, Filters, Report};

fn main() -> Result<()> {
    let args = Args::parse();
    let checks = all_checks();
    let catalog = catalog_for(&checks);

    if let Some(id) = &args.explain {
        return explain(&catalog, id);
    }

    let (Some(package_path), Some(report_path)) = (&args.package, &args.report) else {
        anyhow::bail!("Both a package and a report path are required");
    };

    let package = extract_package(package_path)?;
    let filters = create_filters(args.filters.as_ref())?;
    let report = check_package(&package, &checks, &filters)?;
    write_report_to_file(&report, report_path)?;
    package
        .close()
        .with_context(|| "Failed to remove extraction directory")?;
    summarize_report(&report, &catalog);
    validate_report(&report, args.strict)
}

/// Print the explanation of a finding identifier.
///
/// # Errors
/// Returns an error if the identifier is unknown.
fn explain(catalog: &Catalog, id: &str) -> Result<()> {
    let details = catalog.details(id).with_context(|| {
        format!(
            "Unknown finding: {id} (known: {})",
            catalog.ids().collect::<Vec<_>>().join(", ")
        )
    })?;
    println!("{id}:\n{details}");
    Ok(())
}

/// Get the package from a filepath.
///
/// # Errors
/// Returns an error if the package type cannot be determined or is unsupported.
fn extract_package(path: &Path) -> Result<Package> {
    eprintln!("Extracting package: package={}", path.display());

    let package = Package::new(path.to_path_buf())
        .with_context(|| format!("Failed to extract package: {}", path.display()))?;

    eprintln!(
        "Extraction completed: package={}, source={}, files={}",
        path.display(),
        package.is_source(),
        package.files().len()
    );
    Ok(package)
}

fn create_filters(path: Option<&PathBuf>) -> Result<Filters> {
    if let Some(filters) = path {
        Ok(Filters::from_file(filters).with_context(|| "Failed to read filters file")?)
    } else {
        Ok(Filters::empty())
    }
}

/// Run all checks against the package.
///
/// # Errors
/// Returns an error if a check cannot read the package contents.
fn check_package(package: &Package, checks: &[Box<dyn Check>], filters: &Filters) -> Result<Report> {
    let names: Vec<&str> = checks.iter().map(|check| check.name()).collect();
    eprintln!(
        "Running checks: package={}, checks={}",
        package.path().display(),
        names.join(",")
    );

    let report = Report::new(package, checks, filters)?;

    eprintln!(
        "Checks completed: package={}, findings={}, suppressed={}",
        package.path().display(),
        report.totals().findings.total,
        report.totals().suppressed
    );
    Ok(report)
}

/// Write the report to a file.
///
/// # Errors
/// Returns an error if the report cannot be serialized to JSON or if the file cannot be created.
fn write_report_to_file(report: &Report, dest: &Path) -> Result<()> {
    eprintln!("Writing report to file: file={}", dest.display());
    let file = File::create(dest)
        .with_context(|| format!("Failed to create JSON output file: {}", dest.display()))?;
    serde_json::to_writer_pretty(file, report)
        .with_context(|| format!("Failed to serialize report to JSON: {}", dest.display()))?;
    Ok(())
}
