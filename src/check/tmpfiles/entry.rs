// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Parses the lines of a tmpfiles.d fragment.
//!
//! The format is `Type Path Mode UID GID Age Argument` (see tmpfiles.d(5)). Only the type
//! and the path are of interest here.

/// Entry types that create a path (files, directories, pipes, symlinks and devices).
const INTERESTING_TYPES: [&str; 9] = ["f", "F", "w", "d", "D", "p", "L", "c", "b"];

/// Minimum number of fields for a line to be considered an entry.
const MIN_FIELDS: usize = 3;

/// A single tmpfiles entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TmpfilesEntry<'a> {
    /// Entry type with the boot-only marker (`!`) removed.
    pub(crate) kind: &'a str,
    pub(crate) path: &'a str,
}

impl TmpfilesEntry<'_> {
    /// Whether the entry creates the path it declares.
    pub(crate) fn is_interesting(&self) -> bool {
        INTERESTING_TYPES.contains(&self.kind)
    }
}

/// Parse a line of a fragment.
///
/// Returns `None` for blank lines, comments and lines with less than three fields.
/// A `#` anywhere on the line starts a comment, even inside an argument.
pub(crate) fn parse_line(line: &str) -> Option<TmpfilesEntry<'_>> {
    let line = line.split('#').next().unwrap_or_default();
    let line = line.split('\n').next().unwrap_or_default().trim_start();
    if line.is_empty() {
        return None;
    }

    let fields = split_fields(line);
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let kind = fields[0].strip_suffix('!').unwrap_or(fields[0]);
    Some(TmpfilesEntry {
        kind,
        path: fields[1],
    })
}

/// Split on runs of whitespace.
///
/// Trailing whitespace produces a final empty field, so `d /run/foo # comment` counts as
/// three fields.
fn split_fields(line: &str) -> Vec<&str> {
    let mut fields: Vec<&str> = line.split_whitespace().collect();
    if line.ends_with(char::is_whitespace) {
        fields.push("");
    }
    fields
}
