// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Check framework: the `Check` trait implemented by every rule, the `Reporter` sink
//! receiving findings, and the finding kinds.

mod tmpfiles;

pub(crate) use tmpfiles::is_fragment;
pub use tmpfiles::{TmpFilesCheck, TMPFILES_DIR};

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::package::Package;

/// Result type for check operations.
pub type CheckResult<T> = std::result::Result<T, CheckError>;

/// Errors raised while running a check. Findings are not errors; these are I/O failures
/// that abort the check for the current package.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Failed to open file: {path:?}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read file: {path:?}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
}

impl Severity {
    /// Single letter tag used in the console output.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Warning => "W",
        }
    }
}

/// Kinds of findings produced by the checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    /// A path below the tmpfiles.d directory is not a regular file.
    TmpfileNotRegularFile,
    /// A path created by a tmpfiles entry is missing from the manifest.
    TmpfileNotInFilelist,
    /// A path created by a tmpfiles entry is in the manifest but not marked as ghost.
    TmpfileNotGhost,
}

impl FindingKind {
    pub const ALL: [FindingKind; 3] = [
        FindingKind::TmpfileNotRegularFile,
        FindingKind::TmpfileNotInFilelist,
        FindingKind::TmpfileNotGhost,
    ];

    /// Stable identifier of the finding kind.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            FindingKind::TmpfileNotRegularFile => "tmpfile-not-regular-file",
            FindingKind::TmpfileNotInFilelist => "tmpfile-not-in-filelist",
            FindingKind::TmpfileNotGhost => "tmpfile-not-ghost",
        }
    }

    #[must_use]
    pub fn severity(self) -> Severity {
        Severity::Warning
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Sink receiving the findings of the checks.
pub trait Reporter {
    fn report(&mut self, package: &Package, kind: FindingKind, path: &Path);
}

/// A rule run against every package.
pub trait Check {
    /// Name of the check, used in diagnostics.
    fn name(&self) -> &'static str;

    /// Register the explanations of the findings this check can produce.
    fn register(&self, catalog: &mut Catalog);

    /// Run the check against a package, reporting findings to `reporter`.
    ///
    /// # Errors
    /// Returns an error if package contents cannot be read.
    fn check(&self, package: &Package, reporter: &mut dyn Reporter) -> CheckResult<()>;
}

/// All checks known to the tool.
#[must_use]
pub fn all_checks() -> Vec<Box<dyn Check>> {
    vec![Box::new(TmpFilesCheck::new())]
}

/// Build the catalog of all checks.
#[must_use]
pub fn catalog_for(checks: &[Box<dyn Check>]) -> Catalog {
    let mut catalog = Catalog::new();
    for check in checks {
        check.register(&mut catalog);
    }
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finding_ids_are_registered() {
        let catalog = catalog_for(&all_checks());
        for kind in FindingKind::ALL {
            assert!(
                catalog.details(kind.id()).is_some(),
                "{kind} should have details"
            );
        }
        assert_eq!(catalog.ids().count(), FindingKind::ALL.len());
    }

    #[test]
    fn test_finding_kind_serializes_to_id() {
        for kind in FindingKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.id()));
        }
    }
}
