// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Validates reports and returns errors for findings in strict mode.

use super::Report;
use anyhow::Result;

/// Validate the report.
///
/// Findings are warnings and only fail the validation when `strict` is set.
///
/// # Errors
/// Returns an error if `strict` is set and the report contains findings.
pub fn validate_report(report: &Report, strict: bool) -> Result<()> {
    let total = report.totals().findings.total;
    if strict && total > 0 {
        return Err(anyhow::anyhow!(
            "Findings in the report: {total} warning(s) in strict mode"
        ));
    }
    Ok(())
}
