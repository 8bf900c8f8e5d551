// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Message catalog mapping finding identifiers to their explanations.

use std::collections::BTreeMap;

/// Static explanations of finding identifiers, filled once at startup by the checks.
#[derive(Debug, Default)]
pub struct Catalog {
    details: BTreeMap<&'static str, &'static str>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the explanation of a finding identifier, replacing any previous one.
    pub fn add_details(&mut self, id: &'static str, details: &'static str) {
        self.details.insert(id, details);
    }

    /// Look up the explanation of a finding identifier.
    #[must_use]
    pub fn details(&self, id: &str) -> Option<&'static str> {
        self.details.get(id).copied()
    }

    /// All registered identifiers in alphabetical order.
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.details.keys().copied()
    }
}
