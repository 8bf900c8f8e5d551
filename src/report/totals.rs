// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Statistics calculation for package files and findings.

use serde::Serialize;
use std::ops::Add;

use super::Finding;
use crate::check::{is_fragment, FindingKind};
use crate::package::PackageFiles;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTotals {
    pub files: usize,
    pub fragments: usize,
    pub findings: FindingTotals,
    pub suppressed: usize,
}

impl ReportTotals {
    #[must_use]
    pub(crate) fn new(files: &PackageFiles, findings: &[Finding], suppressed: usize) -> Self {
        Self {
            files: files.len(),
            fragments: files.keys().filter(|path| is_fragment(path)).count(),
            findings: FindingTotals::calculate(findings),
            suppressed,
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FindingTotals {
    pub not_regular_file: usize,
    pub not_in_filelist: usize,
    pub not_ghost: usize,
    pub total: usize,
}

impl FindingTotals {
    pub(crate) fn calculate(findings: &[Finding]) -> Self {
        findings
            .iter()
            .map(|finding| FindingTotals::single(finding.kind))
            .fold(FindingTotals::default(), |a, b| a + b)
    }

    fn single(kind: FindingKind) -> Self {
        let mut totals = FindingTotals {
            total: 1,
            ..FindingTotals::default()
        };
        match kind {
            FindingKind::TmpfileNotRegularFile => totals.not_regular_file = 1,
            FindingKind::TmpfileNotInFilelist => totals.not_in_filelist = 1,
            FindingKind::TmpfileNotGhost => totals.not_ghost = 1,
        }
        totals
    }

    /// Number of findings of the given kind.
    #[must_use]
    pub fn count(&self, kind: FindingKind) -> usize {
        match kind {
            FindingKind::TmpfileNotRegularFile => self.not_regular_file,
            FindingKind::TmpfileNotInFilelist => self.not_in_filelist,
            FindingKind::TmpfileNotGhost => self.not_ghost,
        }
    }
}

impl Add for FindingTotals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        let not_regular_file = self.not_regular_file + other.not_regular_file;
        let not_in_filelist = self.not_in_filelist + other.not_in_filelist;
        let not_ghost = self.not_ghost + other.not_ghost;
        let total = not_regular_file + not_in_filelist + not_ghost;
        Self {
            not_regular_file,
            not_in_filelist,
            not_ghost,
            total,
        }
    }
}
