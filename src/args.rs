// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tmpfiles_validator")]
#[command(version)]
#[command(about = "Validates that paths created via tmpfiles.d are ghost files in deb/rpm packages")]
pub(crate) struct Args {
    /// Path to the package file (deb, rpm or dsc) to validate.
    #[arg(required_unless_present = "explain")]
    pub package: Option<PathBuf>,

    /// Path to the file to write the validation results in JSON format.
    #[arg(required_unless_present = "explain")]
    pub report: Option<PathBuf>,

    #[arg(
        long,
        long_help = "Path to a text file of findings to suppress.\n\
                Each line contains an exact finding identifier (e.g. tmpfile-not-ghost).\n\
                Empty lines and lines starting with # are ignored."
    )]
    pub filters: Option<PathBuf>,

    /// Fail if the report contains any finding.
    #[arg(long)]
    pub strict: bool,

    /// Print the explanation of a finding identifier and exit.
    #[arg(long, value_name = "ID", conflicts_with_all = ["package", "report"])]
    pub explain: Option<String>,
}
