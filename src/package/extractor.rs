// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Defines the `PackageExtractor` trait for extracting different package formats.

use std::fs::File;
use std::io::{Read, Seek};
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use thiserror::Error;
use wait_timeout::ChildExt;
use walkdir::WalkDir;

use super::files::PackageFile;
use super::{PackageFiles, PackageKind};

/// Default timeout for package extraction commands (30 seconds).
pub(crate) const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Result type for package operations.
pub type PackageResult<T> = std::result::Result<T, PackageError>;

/// Errors that can occur during package operations.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("Failed to create/delete temporary directory")]
    TempDirFailed {
        #[source]
        source: std::io::Error,
    },
    #[error("Command not found: {command} (package: {path:?})")]
    CommandNotFound { command: String, path: PathBuf },
    #[error("Command failed: {command} (package: {path:?})")]
    CommandFailed {
        command: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Command timed out after {timeout:?}: {command} (package: {path:?})")]
    CommandTimeout {
        command: String,
        path: PathBuf,
        timeout: Duration,
    },
    #[error("Extraction failed for package {path:?}: {reason}")]
    ExtractionFailed { path: PathBuf, reason: String },
    #[error("Failed to walk extracted directory: {path:?}")]
    WalkDirFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Unsupported package type: {extension}")]
    UnsupportedPackageType { extension: String },
    #[error("Failed to read file metadata: {path:?}")]
    MetadataFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed file list entry in package {path:?}: {line:?}")]
    MalformedFileList { path: PathBuf, line: String },
}

/// Map a spawn error to `CommandNotFound` or `CommandFailed`.
pub(crate) fn spawn_error(e: std::io::Error, command: &str, package_path: &Path) -> PackageError {
    if e.kind() == std::io::ErrorKind::NotFound {
        PackageError::CommandNotFound {
            command: command.to_string(),
            path: package_path.to_path_buf(),
        }
    } else {
        PackageError::CommandFailed {
            command: command.to_string(),
            path: package_path.to_path_buf(),
            source: e,
        }
    }
}

/// Wait for a child process to complete with a timeout.
///
/// Uses platform-specific APIs (SIGCHLD on Unix, `WaitForSingleObject` on Windows)
/// to wait for the process without polling. If the timeout is reached, the process is killed.
///
/// # Returns
/// - `Ok(ExitStatus)` if the process completed within the timeout
/// - `Err(PackageError::CommandTimeout)` if the process timed out
/// - `Err(PackageError::CommandFailed)` if there was an error waiting for the process
pub(crate) fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    command: &str,
    package_path: &Path,
) -> PackageResult<std::process::ExitStatus> {
    // Returns status if the process completed within the timeout, none otherwise.
    // In the case of an error it propagates the error.
    if let Some(status) = child
        .wait_timeout(timeout)
        .map_err(|e| PackageError::CommandFailed {
            command: command.to_string(),
            path: package_path.to_path_buf(),
            source: e,
        })?
    {
        // Check if the process completed successfully or was terminated by a signal.
        if status.code().is_some() {
            Ok(status)
        } else if let Some(signal) = status.signal() {
            Err(PackageError::CommandFailed {
                command: command.to_string(),
                path: package_path.to_path_buf(),
                source: std::io::Error::other(format!("Process terminated by signal: {signal}")),
            })
        } else {
            Err(PackageError::CommandFailed {
                command: command.to_string(),
                path: package_path.to_path_buf(),
                source: std::io::Error::other("Unknown process termination"),
            })
        }
    } else {
        // Timeout has been reached - kill the process
        let _ = child.kill();
        let _ = child.wait();
        Err(PackageError::CommandTimeout {
            command: command.to_string(),
            path: package_path.to_path_buf(),
            timeout,
        })
    }
}

/// Run a command to completion (bounded by the default timeout) and capture its stdout.
///
/// Stdout is redirected into an anonymous temporary file rather than a pipe, so a chatty
/// command can never block on a full pipe buffer while we wait for it.
pub(crate) fn capture_output(
    mut command: Command,
    name: &str,
    package_path: &Path,
) -> PackageResult<String> {
    let io_error = |e: std::io::Error| PackageError::CommandFailed {
        command: name.to_string(),
        path: package_path.to_path_buf(),
        source: e,
    };

    let mut stdout: File =
        tempfile::tempfile().map_err(|e| PackageError::TempDirFailed { source: e })?;
    let mut child = command
        .stdout(Stdio::from(stdout.try_clone().map_err(io_error)?))
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| spawn_error(e, name, package_path))?;

    let status = wait_with_timeout(&mut child, DEFAULT_EXTRACTION_TIMEOUT, name, package_path)?;
    if !status.success() {
        return Err(PackageError::ExtractionFailed {
            path: package_path.to_path_buf(),
            reason: format!(
                "{name} exited with non-zero status: {}",
                status.code().unwrap_or(-1)
            ),
        });
    }

    let mut output = String::new();
    stdout.rewind().map_err(io_error)?;
    stdout.read_to_string(&mut output).map_err(io_error)?;
    Ok(output)
}

/// Represents a file extracted from the package.
pub(crate) struct ExtractedFile<'a> {
    extraction_directory: &'a Path, // The directory where the package was extracted (paths within the package are relative to this directory).
    extracted_path: &'a Path,       // The path to the file within the extraction directory.
}

impl<'a> ExtractedFile<'a> {
    pub(crate) fn new(extraction_directory: &'a Path, extracted_path: &'a Path) -> Self {
        Self {
            extraction_directory,
            extracted_path,
        }
    }

    /// Get the path of the file within the extraction directory.
    pub(crate) fn path(&self) -> &Path {
        self.extracted_path
    }

    /// Get the absolute path of the file within the package.
    ///
    /// Returns `None` if the path is not below the extraction directory.
    pub(crate) fn package_path(&self) -> Option<PathBuf> {
        let stripped = self
            .extracted_path
            .strip_prefix(self.extraction_directory)
            .ok()?;
        // Prepend '/' to make paths absolute (package files are absolute paths)
        Some(Path::new("/").join(stripped))
    }
}

/// Map an absolute path within the package to its location in the extraction directory.
pub(crate) fn extracted_location(extraction_directory: &Path, package_path: &Path) -> PathBuf {
    extraction_directory.join(package_path.strip_prefix("/").unwrap_or(package_path))
}

/// Contents of a package after extraction.
pub(crate) struct Extracted {
    pub(crate) kind: PackageKind,
    pub(crate) files: PackageFiles,
}

/// Trait for package extractors that perform the actual extraction logic.
pub(crate) trait PackageExtractor {
    const EXTENSION: &'static str; // Packages are identified by their extension.

    /// Extract package contents to a destination directory and build its manifest.
    ///
    /// # Errors
    /// Returns an error if extraction fails.
    fn extract(package: &Path, dest: &TempDir) -> PackageResult<Extracted>;

    /// Walk the extracted directory and build a manifest from the on-disk metadata.
    ///
    /// Files, symlinks and directories are all recorded. None of them are ghosts, since
    /// everything found on disk was shipped in the payload.
    ///
    /// # Errors
    /// Returns an error if walking the directory fails or no files are found.
    fn process(dest: &TempDir, package: &Path) -> PackageResult<PackageFiles> {
        let mut files = PackageFiles::new();
        for entry in WalkDir::new(dest.path()).min_depth(1) {
            let e = entry.map_err(|e| PackageError::WalkDirFailed {
                path: package.to_path_buf(),
                source: e,
            })?;
            let extracted_file = ExtractedFile::new(dest.path(), e.path());
            let Some(package_path) = extracted_file.package_path() else {
                continue;
            };
            let file = PackageFile::from_disk(extracted_file.path())?;
            files.insert(package_path, file);
        }

        if files.is_empty() {
            Err(PackageError::ExtractionFailed {
                path: package.to_path_buf(),
                reason: "Extraction completed but no files were found".to_string(),
            })
        } else {
            Ok(files)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_package_path_is_absolute() {
        let dest = TempDir::new().unwrap();
        let extracted = dest.path().join("usr/lib/tmpfiles.d/foo.conf");
        let file = ExtractedFile::new(dest.path(), &extracted);
        assert_eq!(
            file.package_path(),
            Some(PathBuf::from("/usr/lib/tmpfiles.d/foo.conf"))
        );
    }

    #[test]
    fn test_extracted_location_strips_root() {
        let location = extracted_location(Path::new("/tmp/x"), Path::new("/run/foo"));
        assert_eq!(location, PathBuf::from("/tmp/x/run/foo"));
    }

    struct WalkOnly;

    impl PackageExtractor for WalkOnly {
        const EXTENSION: &'static str = "walk";

        fn extract(package: &Path, dest: &TempDir) -> PackageResult<Extracted> {
            Ok(Extracted {
                kind: PackageKind::Binary,
                files: Self::process(dest, package)?,
            })
        }
    }

    #[test]
    fn test_process_records_files_and_directories() {
        let dest = TempDir::new().unwrap();
        fs::create_dir_all(dest.path().join("usr/lib/tmpfiles.d")).unwrap();
        fs::write(dest.path().join("usr/lib/tmpfiles.d/foo.conf"), "d /run/foo").unwrap();

        let extracted = WalkOnly::extract(Path::new("test.walk"), &dest).unwrap();
        let files = extracted.files;
        assert!(!files.contains_key(Path::new("/")));

        let conf = &files[Path::new("/usr/lib/tmpfiles.d/foo.conf")];
        assert!(conf.is_regular_file());
        assert!(!conf.is_ghost());

        let dir = &files[Path::new("/usr/lib/tmpfiles.d")];
        assert!(!dir.is_regular_file());
    }

    #[test]
    fn test_process_empty_directory_fails() {
        let dest = TempDir::new().unwrap();
        let result = WalkOnly::extract(Path::new("test.walk"), &dest);
        assert!(matches!(
            result,
            Err(PackageError::ExtractionFailed { .. })
        ));
    }

    #[test]
    fn test_capture_output_missing_command() {
        let result = capture_output(
            Command::new("definitely-not-an-installed-command"),
            "definitely-not-an-installed-command",
            Path::new("test.rpm"),
        );
        assert!(matches!(result, Err(PackageError::CommandNotFound { .. })));
    }

    #[test]
    fn test_capture_output_reads_stdout() {
        let mut command = Command::new("sh");
        command.arg("-c").arg("printf 'first\\nsecond\\n'");
        let output = capture_output(command, "sh", Path::new("test.rpm")).unwrap();
        assert_eq!(output, "first\nsecond\n");
    }

    #[test]
    fn test_capture_output_non_zero_exit() {
        let mut command = Command::new("sh");
        command.arg("-c").arg("exit 3");
        let result = capture_output(command, "sh", Path::new("test.rpm"));
        assert!(matches!(
            result,
            Err(PackageError::ExtractionFailed { reason, .. }) if reason.contains("status: 3")
        ));
    }
}
