// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Implements RPM package extraction using `rpm2cpio` and `cpio`, and reads the
//! file manifest (modes and ghost flags) from the package header with `rpm -qp`.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use tempfile::TempDir;

use super::extractor::{
    capture_output, extracted_location, spawn_error, wait_with_timeout, Extracted, PackageError,
    PackageExtractor, PackageResult, DEFAULT_EXTRACTION_TIMEOUT,
};
use super::files::PackageFile;
use super::{PackageFiles, PackageKind};

/// `RPMFILE_GHOST` bit of the `FILEFLAGS` header tag.
const RPMFILE_GHOST: u32 = 1 << 6;

/// Query format printing the source RPM name followed by one `MODE FLAGS NAME` line per file.
/// The file name comes last so names containing spaces survive the split.
const HEADER_QUERY_FORMAT: &str = "%{SOURCERPM}\\n[%{FILEMODES} %{FILEFLAGS} %{FILENAMES}\\n]";

/// `SOURCERPM` value of source packages.
const NO_SOURCE_RPM: &str = "(none)";

pub(crate) struct RpmExtractor;

impl PackageExtractor for RpmExtractor {
    const EXTENSION: &'static str = "rpm";

    /// Extract an RPM package into a temporary directory.
    ///
    /// # Errors
    /// Returns an error if the package cannot be extracted or its header cannot be queried.
    ///
    /// # Timeout
    /// This function enforces a total timeout of 30 seconds for the `rpm2cpio` and
    /// `cpio` pipeline, and another 30 seconds for the header query. If a command takes
    /// longer, the processes will be killed and a `CommandTimeout` error will be returned.
    fn extract(package: &Path, dest: &TempDir) -> PackageResult<Extracted> {
        Self::extract_payload(package, dest)?;

        let mut query = Command::new("rpm");
        query
            .arg("-qp")
            .arg("--nosignature")
            .arg("--nodigest")
            .arg("--qf")
            .arg(HEADER_QUERY_FORMAT)
            .arg(package);
        let output = capture_output(query, "rpm", package)?;
        parse_header_query(&output, dest.path(), package)
    }
}

impl RpmExtractor {
    fn extract_payload(package: &Path, dest: &TempDir) -> PackageResult<()> {
        let start = Instant::now();

        // Use system commands for maximum performance: rpm2cpio | cpio -id
        // The system cpio command handles padding, alignment, and all edge cases efficiently
        let mut rpm2cpio_child = Command::new("rpm2cpio")
            .arg(package)
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(e, "rpm2cpio", package))?;

        let Some(rpm2cpio_stdout) = rpm2cpio_child.stdout.take() else {
            let _ = rpm2cpio_child.kill();
            let _ = rpm2cpio_child.wait();
            return Err(PackageError::ExtractionFailed {
                path: package.to_path_buf(),
                reason: "Failed to get stdout from rpm2cpio".to_string(),
            });
        };

        let mut cpio_child = match Command::new("cpio")
            .arg("-id")
            .arg("--quiet")
            .current_dir(dest.path())
            .stdin(rpm2cpio_stdout)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                let _ = rpm2cpio_child.kill();
                let _ = rpm2cpio_child.wait();
                return Err(spawn_error(e, "cpio", package));
            }
        };

        // Wait for cpio with the remaining timeout (subtracting time already elapsed)
        let remaining_timeout = DEFAULT_EXTRACTION_TIMEOUT.saturating_sub(start.elapsed());
        let cpio_status = wait_with_timeout(&mut cpio_child, remaining_timeout, "cpio", package);

        // Clean up rpm2cpio - it should have finished by now since cpio consumed all its output
        if cpio_status.is_err() {
            let _ = rpm2cpio_child.kill();
        }
        let _ = rpm2cpio_child.wait();

        let cpio_status = cpio_status?;
        if cpio_status.success() {
            Ok(())
        } else {
            Err(PackageError::ExtractionFailed {
                path: package.to_path_buf(),
                reason: format!(
                    "cpio exited with non-zero status: {}",
                    cpio_status.code().unwrap_or(-1)
                ),
            })
        }
    }
}

/// Build the package manifest from the output of the header query.
///
/// # Errors
/// Returns an error if the output is empty or a file line cannot be parsed.
pub(crate) fn parse_header_query(
    output: &str,
    extraction_directory: &Path,
    package: &Path,
) -> PackageResult<Extracted> {
    let malformed = |line: &str| PackageError::MalformedFileList {
        path: package.to_path_buf(),
        line: line.to_string(),
    };

    let mut lines = output.lines();
    let source_rpm = lines.next().ok_or_else(|| malformed(""))?;
    let kind = if source_rpm.trim() == NO_SOURCE_RPM {
        PackageKind::Source
    } else {
        PackageKind::Binary
    };

    let mut files = PackageFiles::new();
    for line in lines.filter(|line| !line.is_empty()) {
        let mut fields = line.splitn(3, ' ');
        let (Some(mode), Some(flags), Some(name)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(malformed(line));
        };
        // FILEMODES is a 16 bit tag; older rpm versions print it sign-extended.
        let mode = mode.parse::<i64>().map_err(|_| malformed(line))? & 0xffff;
        let flags = flags.parse::<u32>().map_err(|_| malformed(line))?;
        let mode = u32::try_from(mode).map_err(|_| malformed(line))?;

        let package_path = PathBuf::from(name);
        let location = extracted_location(extraction_directory, &package_path);
        files.insert(
            package_path,
            PackageFile::new(mode, flags & RPMFILE_GHOST != 0, location),
        );
    }

    Ok(Extracted { kind, files })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binary_header() {
        let output = "foo-1.0-1.src.rpm\n\
                      33188 0 /usr/lib/tmpfiles.d/foo.conf\n\
                      16877 64 /run/foo\n\
                      33188 64 /run/foo/state file\n";
        let extracted =
            parse_header_query(output, Path::new("/tmp/extract"), Path::new("foo.rpm")).unwrap();

        assert_eq!(extracted.kind, PackageKind::Binary);
        assert_eq!(extracted.files.len(), 3);

        let conf = &extracted.files[Path::new("/usr/lib/tmpfiles.d/foo.conf")];
        assert!(conf.is_regular_file());
        assert!(!conf.is_ghost());
        assert_eq!(
            conf.path(),
            Path::new("/tmp/extract/usr/lib/tmpfiles.d/foo.conf")
        );

        let dir = &extracted.files[Path::new("/run/foo")];
        assert!(!dir.is_regular_file());
        assert!(dir.is_ghost());

        assert!(extracted.files[Path::new("/run/foo/state file")].is_ghost());
    }

    #[test]
    fn test_parse_sign_extended_mode() {
        // 0o100644 printed as a signed 16 bit value.
        let output = "foo-1.0-1.src.rpm\n-32348 0 /usr/lib/tmpfiles.d/foo.conf\n";
        let extracted =
            parse_header_query(output, Path::new("/tmp/extract"), Path::new("foo.rpm")).unwrap();
        let conf = &extracted.files[Path::new("/usr/lib/tmpfiles.d/foo.conf")];
        assert_eq!(conf.mode(), 0o100_644);
    }

    #[test]
    fn test_parse_source_header() {
        let output = "(none)\n33188 32 foo.spec\n";
        let extracted =
            parse_header_query(output, Path::new("/tmp/extract"), Path::new("foo.src.rpm"))
                .unwrap();
        assert_eq!(extracted.kind, PackageKind::Source);
        assert!(extracted.files.contains_key(Path::new("foo.spec")));
    }

    #[test]
    fn test_parse_malformed_line() {
        let output = "foo-1.0-1.src.rpm\nnot-a-mode 0 /etc/foo\n";
        let result = parse_header_query(output, Path::new("/tmp/extract"), Path::new("foo.rpm"));
        assert!(matches!(
            result,
            Err(PackageError::MalformedFileList { .. })
        ));
    }

    #[test]
    fn test_parse_empty_output() {
        let result = parse_header_query("", Path::new("/tmp/extract"), Path::new("foo.rpm"));
        assert!(result.is_err());
    }
}
