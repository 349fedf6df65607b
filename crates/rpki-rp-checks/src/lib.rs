// This file is part of rpki-rp.

// Copyright (C) The rpki-rp Authors.
// SPDX-License-Identifier: Apache-2.0

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// 	http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The uniform representation of a validation finding.
//!
//! Every problem discovered while walking the RPKI certificate tree is
//! expressed as a [`Check`]: a [`Reject`][Check::Reject] that suppresses
//! descent into the subtree it names, or a [`Warning`][Check::Warning] that
//! does not. Checks are value objects: immutable once built, and accumulated
//! into plain `Vec`s by callers rather than threaded through some shared
//! collector.

use std::borrow::Cow;
use std::fmt;

/// Where a [`Check`] applies.
///
/// In practice this is always the URI of the object being validated, or the
/// issuer context's own location when no single object is at fault. Kept as
/// an opaque newtype (rather than a bare `String`) so a future tightening to
/// a parsed URI type doesn't ripple through every call site.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationLocation(String);

impl ValidationLocation {
    pub fn new(uri: impl Into<String>) -> Self {
        ValidationLocation(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidationLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ValidationLocation {
    fn from(s: &str) -> Self {
        ValidationLocation::new(s)
    }
}

impl From<String> for ValidationLocation {
    fn from(s: String) -> Self {
        ValidationLocation::new(s)
    }
}

/// The closed catalogue of validation-string keys, mirroring the upstream
/// validation-string constants, plus an open catch-all for whatever the
/// external cryptographic validator surfaces.
///
/// Keys are identifiers, not messages — formatting them for a human is a UI
/// concern that lives outside this crate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum CheckKey {
    /// No valid CRL was found for an issuing CA; descent stops.
    CrlRequired,
    /// A CA has a valid CRL but no valid manifest; descent stops.
    CaShouldHaveManifest,
    /// An object's URI on the manifest doesn't match where it was found
    /// (also reused, bug-for-bug, for manifest-entry hash mismatches — see
    /// DESIGN.md).
    ManifestLocationMismatch,
    /// A manifest entry's filename has no corresponding object in the store.
    ManifestFileNotFoundByAki,
    /// The manifest's CRL entry count isn't exactly one.
    ManifestDoesNotContainFile,
    /// The single CRL on the manifest isn't the CRL the selector chose.
    ManifestCrlUriMismatch,
    /// The single CRL on the manifest has a hash that disagrees with the
    /// selected CRL's actual content hash.
    ManifestHashMismatch,
    /// A key surfaced by the external cryptographic validator that isn't one
    /// of the above — the catalogue above only covers what this crate itself
    /// produces.
    Other(Cow<'static, str>),
}

impl CheckKey {
    /// The upstream validation-string constant this key corresponds to.
    pub fn as_str(&self) -> &str {
        match self {
            CheckKey::CrlRequired => "CRL_REQUIRED",
            CheckKey::CaShouldHaveManifest => "VALIDATOR_CA_SHOULD_HAVE_MANIFEST",
            CheckKey::ManifestLocationMismatch => "VALIDATOR_MANIFEST_LOCATION_MISMATCH",
            CheckKey::ManifestFileNotFoundByAki => "VALIDATOR_MANIFEST_FILE_NOT_FOUND_BY_AKI",
            CheckKey::ManifestDoesNotContainFile => "VALIDATOR_MANIFEST_DOES_NOT_CONTAIN_FILE",
            CheckKey::ManifestCrlUriMismatch => "VALIDATOR_MANIFEST_CRL_URI_MISMATCH",
            CheckKey::ManifestHashMismatch => "VALIDATOR_MANIFEST_HASH_MISMATCH",
            CheckKey::Other(s) => s,
        }
    }

    pub fn other(key: impl Into<Cow<'static, str>>) -> Self {
        CheckKey::Other(key.into())
    }
}

impl fmt::Display for CheckKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation finding: a reject that suppresses descent, or a
/// warning that doesn't.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Check {
    Reject {
        location: ValidationLocation,
        key: CheckKey,
        params: Vec<String>,
    },
    Warning {
        location: ValidationLocation,
        key: CheckKey,
        params: Vec<String>,
    },
}

impl Check {
    pub fn reject(
        location: impl Into<ValidationLocation>,
        key: CheckKey,
        params: impl IntoIterator<Item = String>,
    ) -> Self {
        Check::Reject {
            location: location.into(),
            key,
            params: params.into_iter().collect(),
        }
    }

    pub fn warning(
        location: impl Into<ValidationLocation>,
        key: CheckKey,
        params: impl IntoIterator<Item = String>,
    ) -> Self {
        Check::Warning {
            location: location.into(),
            key,
            params: params.into_iter().collect(),
        }
    }

    pub fn location(&self) -> &ValidationLocation {
        match self {
            Check::Reject { location, .. } | Check::Warning { location, .. } => location,
        }
    }

    pub fn key(&self) -> &CheckKey {
        match self {
            Check::Reject { key, .. } | Check::Warning { key, .. } => key,
        }
    }

    pub fn params(&self) -> &[String] {
        match self {
            Check::Reject { params, .. } | Check::Warning { params, .. } => params,
        }
    }

    pub fn is_reject(&self) -> bool {
        matches!(self, Check::Reject { .. })
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Check::Warning { .. })
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, location, key, params) = match self {
            Check::Reject { location, key, params } => ("reject", location, key, params),
            Check::Warning { location, key, params } => ("warning", location, key, params),
        };
        write!(f, "{kind} {location} {key}")?;
        if !params.is_empty() {
            write!(f, " [{}]", params.join(", "))?;
        }
        Ok(())
    }
}

/// Converts a per-location result sink from the external validator into
/// [`Check`]s, preserving key and parameters: warnings become
/// [`Check::Warning`], failures become [`Check::Reject`].
///
/// The external validator is out of scope for this crate; this
/// trait is the seam a caller plugs a real crypto validator's sink into.
pub trait ValidatorResultSink {
    /// Failures reported against `location`: `(key, params)` pairs.
    fn failures(&self, location: &ValidationLocation) -> Vec<(CheckKey, Vec<String>)>;
    /// Warnings reported against `location`: `(key, params)` pairs.
    fn warnings(&self, location: &ValidationLocation) -> Vec<(CheckKey, Vec<String>)>;
}

/// Drains a [`ValidatorResultSink`] for one location into [`Check`]s.
pub fn translate(sink: &dyn ValidatorResultSink, location: &ValidationLocation) -> Vec<Check> {
    let mut checks: Vec<Check> = sink
        .failures(location)
        .into_iter()
        .map(|(key, params)| Check::reject(location.clone(), key, params))
        .collect();
    checks.extend(
        sink.warnings(location)
            .into_iter()
            .map(|(key, params)| Check::warning(location.clone(), key, params)),
    );
    checks
}
