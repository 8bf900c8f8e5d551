// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Implements DEB package extraction using `dpkg-deb`.

use std::path::Path;
use tempfile::TempDir;

use super::extractor::{
    spawn_error, wait_with_timeout, Extracted, PackageError, PackageExtractor, PackageResult,
    DEFAULT_EXTRACTION_TIMEOUT,
};
use super::PackageKind;

pub(crate) struct DebExtractor;

impl PackageExtractor for DebExtractor {
    const EXTENSION: &'static str = "deb";

    /// Extract a DEB package into a temporary directory.
    ///
    /// The manifest is built from the extracted tree. DEB has no notion of ghost files,
    /// so every entry is reported as shipped.
    ///
    /// # Errors
    /// Returns an error if the package cannot be extracted.
    ///
    /// # Timeout
    /// This function enforces a timeout of 30 seconds for the `dpkg-deb` subprocess.
    /// If extraction takes longer, the process will be killed and a `CommandTimeout`
    /// error will be returned.
    fn extract(package: &Path, dest: &TempDir) -> PackageResult<Extracted> {
        let mut child = std::process::Command::new("dpkg-deb")
            .arg("-x")
            .arg(package)
            .arg(dest.path())
            .spawn()
            .map_err(|e| spawn_error(e, "dpkg-deb", package))?;

        let exit_status =
            wait_with_timeout(&mut child, DEFAULT_EXTRACTION_TIMEOUT, "dpkg-deb", package)?;

        if exit_status.success() {
            Ok(Extracted {
                kind: PackageKind::Binary,
                files: Self::process(dest, package)?,
            })
        } else {
            Err(PackageError::ExtractionFailed {
                path: package.to_path_buf(),
                reason: format!(
                    "dpkg-deb exited with non-zero status: {}",
                    exit_status.code().unwrap_or(-1)
                ),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::package::Package;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::process::Command;
    use tempfile::TempDir;

    /// Build a minimal DEB containing one tmpfiles fragment, or `None` if `dpkg-deb` is missing.
    fn build_deb(workdir: &TempDir) -> Option<PathBuf> {
        let root = workdir.path().join("root");
        fs::create_dir_all(root.join("DEBIAN")).unwrap();
        fs::create_dir_all(root.join("usr/lib/tmpfiles.d")).unwrap();
        fs::write(
            root.join("DEBIAN/control"),
            "Package: test\nVersion: 1.0.0\nArchitecture: all\n\
             Maintainer: Test <test@example.com>\nDescription: tmpfiles test\n",
        )
        .unwrap();
        fs::write(
            root.join("usr/lib/tmpfiles.d/test.conf"),
            "d /run/test 0755 root root -\n",
        )
        .unwrap();

        let deb = workdir.path().join("test.deb");
        let status = Command::new("dpkg-deb")
            .arg("--root-owner-group")
            .arg("--build")
            .arg(&root)
            .arg(&deb)
            .status();
        match status {
            Ok(s) if s.success() => Some(deb),
            _ => None,
        }
    }

    #[test]
    fn test_deb_package_extract() {
        let workdir = TempDir::new().unwrap();
        let Some(deb_path) = build_deb(&workdir) else {
            eprintln!("Skipping test: dpkg-deb is not available to build a DEB fixture.");
            return;
        };

        let package = Package::new(deb_path).expect("Should extract DEB package");
        assert!(!package.is_source());

        let files = package.files();
        let fragment = files
            .get(Path::new("/usr/lib/tmpfiles.d/test.conf"))
            .expect("Fragment should be in the manifest");
        assert!(fragment.is_regular_file());
        assert!(!fragment.is_ghost());
        assert_eq!(
            fs::read_to_string(fragment.path()).unwrap(),
            "d /run/test 0755 root root -\n"
        );

        // Directories are part of the manifest too.
        assert!(files.contains_key(Path::new("/usr/lib/tmpfiles.d")));
        // The control area is not extracted by `dpkg-deb -x`.
        assert!(!files.contains_key(Path::new("/DEBIAN/control")));
    }
}
