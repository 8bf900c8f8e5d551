// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Manages package lifecycle including extraction directory. Provides API for accessing the
//! package manifest and the extracted file contents.

mod deb;
mod extractor;
mod files;
mod rpm;

use serde::Serialize;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

use deb::DebExtractor;
pub use extractor::{PackageError, PackageResult};
use extractor::{Extracted, PackageExtractor};
pub use files::PackageFile;
use rpm::RpmExtractor;

/// Collection of files in a package, keyed by their path.
pub type PackageFiles = HashMap<PathBuf, PackageFile>;

/// Extension of Debian source package descriptions.
const DSC_EXTENSION: &str = "dsc";

/// Whether a package ships built artifacts or sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageKind {
    Binary,
    Source,
}

/// Package struct that manages package life-cycle including extraction directory.
///
/// The extraction directory lives as long as the package, so checks can read file contents
/// through [`PackageFile::path`].
pub struct Package {
    path: PathBuf,
    kind: PackageKind,
    files: PackageFiles,
    extraction: Option<TempDir>,
}

impl Package {
    /// Create a new package from a filepath.
    ///
    /// # Errors
    /// Returns an error if the package type cannot be determined or is unsupported.
    pub fn new(path: PathBuf) -> PackageResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| PackageError::UnsupportedPackageType {
                extension: "unknown".to_string(),
            })?;

        // Source descriptions carry no payload to inspect.
        if extension == DSC_EXTENSION {
            return Ok(Self {
                path,
                kind: PackageKind::Source,
                files: PackageFiles::new(),
                extraction: None,
            });
        }

        let dest = TempDir::new().map_err(|e| PackageError::TempDirFailed { source: e })?;
        let result = match extension {
            DebExtractor::EXTENSION => DebExtractor::extract(&path, &dest),
            RpmExtractor::EXTENSION => RpmExtractor::extract(&path, &dest),
            _ => {
                return Err(PackageError::UnsupportedPackageType {
                    extension: extension.to_string(),
                })
            }
        };
        let Extracted { kind, files } = match result {
            Ok(extracted) => extracted,
            Err(e) => {
                // The extraction error is the one worth reporting.
                let _ = dest.close();
                return Err(e);
            }
        };

        Ok(Self {
            path,
            kind,
            files,
            extraction: Some(dest),
        })
    }

    /// Get the path to the package.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the file name of the package, used to prefix findings.
    #[must_use]
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.to_string_lossy(), |name| name.to_string_lossy())
            .to_string()
    }

    #[must_use]
    pub fn kind(&self) -> PackageKind {
        self.kind
    }

    /// Whether this is a source package.
    #[must_use]
    pub fn is_source(&self) -> bool {
        self.kind == PackageKind::Source
    }

    /// Get the files in the package.
    #[must_use]
    pub fn files(&self) -> &PackageFiles {
        &self.files
    }

    /// Remove the extraction directory.
    ///
    /// Dropping the package removes it as well, but silently ignores errors.
    ///
    /// # Errors
    /// Returns an error if the temporary directory cannot be deleted.
    pub fn close(mut self) -> PackageResult<()> {
        match self.extraction.take() {
            Some(dest) => dest
                .close()
                .map_err(|e| PackageError::TempDirFailed { source: e }),
            None => Ok(()),
        }
    }

    #[cfg(test)]
    /// Create a test package with the given files.
    /// This is only available in test builds.
    pub(crate) fn new_for_testing(path: PathBuf, kind: PackageKind, files: PackageFiles) -> Self {
        Self {
            path,
            kind,
            files,
            extraction: None,
        }
    }
}
