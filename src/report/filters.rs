// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Suppresses findings using exact identifier matching from a configuration file.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::check::FindingKind;

/// Finding identifiers that should not be reported.
#[derive(Debug, Default)]
pub struct Filters {
    ids: HashSet<String>,
}

impl Filters {
    /// Create empty `Filters` suppressing nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create new `Filters` from a file containing finding identifiers.
    ///
    /// Each line in the file is treated as an exact identifier (e.g. `tmpfile-not-ghost`).
    /// Empty lines and lines starting with `#` are ignored.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read filters file: {}", path.as_ref().display())
        })?;

        let ids: HashSet<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(std::string::ToString::to_string)
            .collect();

        for id in &ids {
            if !FindingKind::ALL.iter().any(|kind| kind.id() == id.as_str()) {
                eprintln!("Unknown finding in filters: id={id}");
            }
        }

        Ok(Self { ids })
    }

    /// Check if findings of the given kind are suppressed.
    #[must_use]
    pub fn suppresses(&self, kind: FindingKind) -> bool {
        self.ids.contains(kind.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_filters() {
        let filters = Filters::empty();
        for kind in FindingKind::ALL {
            assert!(!filters.suppresses(kind));
        }
    }

    #[test]
    fn test_single_filter() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "tmpfile-not-ghost").unwrap();
        file.flush().unwrap();

        let filters = Filters::from_file(file.path()).unwrap();
        assert!(filters.suppresses(FindingKind::TmpfileNotGhost));
        assert!(!filters.suppresses(FindingKind::TmpfileNotInFilelist));
        assert!(!filters.suppresses(FindingKind::TmpfileNotRegularFile));
    }

    #[test]
    fn test_ignore_comments_and_empty_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# This is a comment").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "tmpfile-not-in-filelist").unwrap();
        writeln!(file, "  # tmpfile-not-ghost").unwrap();
        writeln!(file, "\ttmpfile-not-regular-file  ").unwrap();
        file.flush().unwrap();

        let filters = Filters::from_file(file.path()).unwrap();
        assert!(filters.suppresses(FindingKind::TmpfileNotInFilelist));
        assert!(filters.suppresses(FindingKind::TmpfileNotRegularFile));
        assert!(!filters.suppresses(FindingKind::TmpfileNotGhost));
    }

    #[test]
    fn test_unknown_ids_are_kept_harmlessly() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "some-other-check").unwrap();
        file.flush().unwrap();

        let filters = Filters::from_file(file.path()).unwrap();
        for kind in FindingKind::ALL {
            assert!(!filters.suppresses(kind));
        }
    }

    #[test]
    fn test_file_not_found() {
        let result = Filters::from_file("/nonexistent/filters.txt");
        assert!(result.is_err());
        assert!(result.err().unwrap().to_string().contains("Failed to read"));
    }
}
