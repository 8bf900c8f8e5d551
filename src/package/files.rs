// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Defines the manifest record of a single package file.

use serde::Serialize;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use super::extractor::{PackageError, PackageResult};

/// File type bits of a POSIX mode (`S_IFMT`).
const S_IFMT: u32 = 0o170_000;
/// Regular file type (`S_IFREG`).
const S_IFREG: u32 = 0o100_000;

/// Represents a file in the package manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageFile {
    mode: u32,
    is_ghost: bool,
    #[serde(skip)]
    path: PathBuf, // Location of the content within the extraction directory.
}

impl PackageFile {
    #[must_use]
    pub fn new(mode: u32, is_ghost: bool, path: PathBuf) -> Self {
        Self {
            mode,
            is_ghost,
            path,
        }
    }

    /// Create a (non-ghost) package file from the metadata of an extracted file.
    ///
    /// Symlinks are not followed, so their mode describes the link itself.
    ///
    /// # Errors
    /// Returns an error if the metadata cannot be read.
    pub(crate) fn from_disk(path: &Path) -> PackageResult<Self> {
        let metadata = fs::symlink_metadata(path).map_err(|e| PackageError::MetadataFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::new(metadata.mode(), false, path.to_path_buf()))
    }

    /// POSIX permission and file type bits.
    #[must_use]
    pub fn mode(&self) -> u32 {
        self.mode
    }

    /// Whether the file is listed in the manifest without being shipped in the payload.
    #[must_use]
    pub fn is_ghost(&self) -> bool {
        self.is_ghost
    }

    /// On-disk location to read the file contents from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Equivalent of `S_ISREG(mode)`.
    #[must_use]
    pub fn is_regular_file(&self) -> bool {
        self.mode & S_IFMT == S_IFREG
    }
}
