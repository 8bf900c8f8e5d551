// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! A tool for validating tmpfiles.d declarations in DEB and RPM packages.
//!
//! This crate provides functionality to:
//! - Extract DEB and RPM packages and read their file manifest (modes and ghost flags)
//! - Parse the tmpfiles.d fragments shipped in `/usr/lib/tmpfiles.d/`
//! - Check that every path created at runtime is listed in the manifest as ghost
//! - Generate reports on the findings

pub mod catalog;
pub mod check;
pub mod package;
pub mod report;

// Re-export key types for convenience
pub use catalog::Catalog;
pub use check::{Check, FindingKind, Reporter, TmpFilesCheck};
pub use package::{Package, PackageFile, PackageKind};
pub use report::{Filters, Report};
