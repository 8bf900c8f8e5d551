// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Report struct and public API for generating validation results.

mod console;
mod filters;
mod totals;
mod validate;

pub use console::summarize_report;
pub use filters::Filters;
pub use totals::{FindingTotals, ReportTotals};
pub use validate::validate_report;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::check::{Check, FindingKind, Reporter, Severity};
use crate::package::{Package, PackageKind};

/// A single finding reported by a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub path: PathBuf,
}

/// Collects findings in reporting order, dropping the filtered ones.
struct FindingCollector<'a> {
    filters: &'a Filters,
    findings: Vec<Finding>,
    suppressed: usize,
}

impl<'a> FindingCollector<'a> {
    fn new(filters: &'a Filters) -> Self {
        Self {
            filters,
            findings: Vec::new(),
            suppressed: 0,
        }
    }
}

impl Reporter for FindingCollector<'_> {
    fn report(&mut self, _package: &Package, kind: FindingKind, path: &Path) {
        if self.filters.suppresses(kind) {
            self.suppressed += 1;
            return;
        }
        self.findings.push(Finding {
            kind,
            severity: kind.severity(),
            path: path.to_path_buf(),
        });
    }
}

#[derive(Debug, Serialize)]
pub struct Report {
    package: String,
    kind: PackageKind,
    totals: ReportTotals,
    findings: Vec<Finding>,
}

impl Report {
    /// Run the checks against the package and collect their findings.
    ///
    /// # Errors
    /// Returns an error if a check fails to read the package contents.
    pub fn new(package: &Package, checks: &[Box<dyn Check>], filters: &Filters) -> Result<Self> {
        let mut collector = FindingCollector::new(filters);
        for check in checks {
            check.check(package, &mut collector).with_context(|| {
                format!(
                    "Check {} failed for package: {}",
                    check.name(),
                    package.path().display()
                )
            })?;
        }

        let totals = ReportTotals::new(
            package.files(),
            &collector.findings,
            collector.suppressed,
        );

        Ok(Self {
            package: package.name(),
            kind: package.kind(),
            totals,
            findings: collector.findings,
        })
    }

    /// Name of the checked package.
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    #[must_use]
    pub fn totals(&self) -> &ReportTotals {
        &self.totals
    }

    /// Findings in the order they were reported.
    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }
}
