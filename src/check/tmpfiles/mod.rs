// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Checks that paths created through tmpfiles.d fragments are listed in the package
//! manifest and marked as ghost.

mod entry;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{Check, CheckError, CheckResult, FindingKind, Reporter};
use crate::catalog::Catalog;
use crate::package::{Package, PackageFile, PackageFiles};
use entry::parse_line;

/// Directory holding the tmpfiles.d fragments shipped by packages.
pub const TMPFILES_DIR: &str = "/usr/lib/tmpfiles.d/";

const NOT_REGULAR_FILE_DETAILS: &str = "files in tmpfiles.d need to be regular files";

const NOT_IN_FILELIST_DETAILS: &str = "please add the specified file to your %files section as \
%ghost so users can easily query who created the file, it gets uninstalled on package removal \
and finally other rpmlint checks see it";

const NOT_GHOST_DETAILS: &str = "the specified file is not marked as %ghost although created at \
runtime via tmpfiles mechanism.";

/// Check systemd created tmpfiles are included in the file list.
#[derive(Debug, Default)]
pub struct TmpFilesCheck;

impl TmpFilesCheck {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse a fragment and report every interesting entry whose path is missing from the
    /// manifest or not marked as ghost.
    fn check_fragment(
        package: &Package,
        fragment: &PackageFile,
        reporter: &mut dyn Reporter,
    ) -> CheckResult<()> {
        let handle = File::open(fragment.path()).map_err(|e| CheckError::OpenFailed {
            path: fragment.path().to_path_buf(),
            source: e,
        })?;

        for line in BufReader::new(handle).lines() {
            let line = line.map_err(|e| CheckError::ReadFailed {
                path: fragment.path().to_path_buf(),
                source: e,
            })?;
            // A lone carriage return ends a line as well.
            for line in line.split('\r') {
                Self::check_line(package, line, reporter);
            }
        }
        Ok(())
    }

    fn check_line(package: &Package, line: &str, reporter: &mut dyn Reporter) {
        let Some(entry) = parse_line(line) else {
            return;
        };
        if !entry.is_interesting() {
            return;
        }

        let declared = Path::new(entry.path);
        match manifest_entry(package.files(), declared) {
            None => reporter.report(package, FindingKind::TmpfileNotInFilelist, declared),
            Some(file) if !file.is_ghost() => {
                reporter.report(package, FindingKind::TmpfileNotGhost, declared);
            }
            Some(_) => {}
        }
    }
}

/// Look up a path in the manifest by its exact spelling.
///
/// `Path` equality ignores trailing slashes, `//` and `.` components; manifest keys must
/// match byte for byte.
fn manifest_entry<'a>(files: &'a PackageFiles, path: &Path) -> Option<&'a PackageFile> {
    files
        .get_key_value(path)
        .filter(|(key, _)| key.as_os_str() == path.as_os_str())
        .map(|(_, file)| file)
}

/// Whether a manifest path is a fragment in the tmpfiles.d directory.
pub(crate) fn is_fragment(path: &Path) -> bool {
    path.to_str()
        .is_some_and(|path| path.starts_with(TMPFILES_DIR))
}

impl Check for TmpFilesCheck {
    fn name(&self) -> &'static str {
        "TmpFilesCheck"
    }

    fn register(&self, catalog: &mut Catalog) {
        catalog.add_details(
            FindingKind::TmpfileNotRegularFile.id(),
            NOT_REGULAR_FILE_DETAILS,
        );
        catalog.add_details(
            FindingKind::TmpfileNotInFilelist.id(),
            NOT_IN_FILELIST_DETAILS,
        );
        catalog.add_details(FindingKind::TmpfileNotGhost.id(), NOT_GHOST_DETAILS);
    }

    fn check(&self, package: &Package, reporter: &mut dyn Reporter) -> CheckResult<()> {
        if package.is_source() {
            return Ok(());
        }

        // Sorted so findings come out in a stable order.
        let mut fragments: Vec<_> = package
            .files()
            .iter()
            .filter(|(path, _)| is_fragment(path))
            .collect();
        fragments.sort_by_key(|(path, _)| *path);

        for (path, file) in fragments {
            if !file.is_regular_file() {
                reporter.report(package, FindingKind::TmpfileNotRegularFile, path);
                continue;
            }
            Self::check_fragment(package, file, reporter)?;
        }
        Ok(())
    }
}
