// This file is part of rpki-rp.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use indexmap::IndexMap;
use ipnetwork::IpNetwork;
use url::Url;

use crate::hash::ContentHash;
use crate::ski::Ski;

/// The kind of a decoded cryptographic object, mirroring RFC 6488's
/// content-types as far as this crate cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectKind {
    ResourceCertificate,
    Crl,
    Manifest,
    Roa,
}

/// A repository object: the URI it was published at, its decoded content,
/// and the content hash used for manifest cross-checks.
///
/// Equality is by `url` + `hash` alone — two decodes of the same bytes at the
/// same location are the same object for every purpose this core cares
/// about, regardless of what the decoder happened to produce.
#[derive(Clone, Debug)]
pub struct RepositoryObject<T> {
    pub url: Url,
    pub hash: ContentHash,
    pub content: T,
}

impl<T> RepositoryObject<T> {
    pub fn new(url: Url, hash: ContentHash, content: T) -> Self {
        RepositoryObject { url, hash, content }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RepositoryObject<U> {
        RepositoryObject {
            url: self.url,
            hash: self.hash,
            content: f(self.content),
        }
    }
}

impl<T> PartialEq for RepositoryObject<T> {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url && self.hash == other.hash
    }
}

impl<T> Eq for RepositoryObject<T> {}

impl<T> std::hash::Hash for RepositoryObject<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.url.hash(state);
        self.hash.hash(state);
    }
}

/// The issuer-relevant content of a decoded resource certificate.
///
/// Cryptographic verification of the certificate itself is out of scope —
/// this struct carries only the fields the walker and selector need to
/// navigate the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceCertificate {
    pub subject_key_identifier: Ski,
    pub authority_key_identifier: Option<Ski>,
    /// True for CA certificates that issue further objects; false for
    /// end-entity certificates (e.g. the EE cert embedded in a ROA).
    pub is_ca: bool,
    pub repository_uri: Option<Url>,
    pub rpki_notify_uri: Option<Url>,
    pub manifest_uri: Option<Url>,
}

impl ResourceCertificate {
    /// `prefetch_uri = rpki_notify_uri ?? repository_uri`.
    pub fn prefetch_uri(&self) -> Option<&Url> {
        self.rpki_notify_uri.as_ref().or(self.repository_uri.as_ref())
    }
}

/// The issuer-relevant content of a decoded CRL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Crl {
    pub authority_key_identifier: Ski,
    pub crl_number: u64,
}

/// The issuer-relevant content of a decoded manifest: its own number (used
/// for "most recent" selection) and the `filename -> expected hash` table,
/// kept in the manifest's own declared (insertion) order so reported checks
/// are deterministic within a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Manifest {
    pub authority_key_identifier: Ski,
    pub manifest_number: u64,
    pub entries: IndexMap<String, ContentHash>,
}

/// A single Validated ROA Payload: the `(prefix, max_length, asn)` triple a
/// validated ROA contributes to the RTR feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vrp {
    pub prefix: IpNetwork,
    pub max_length: u8,
    pub asn: u32,
}

/// The issuer-relevant content of a decoded ROA.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Roa {
    pub vrps: Vec<Vrp>,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectKind::ResourceCertificate => "certificate",
            ObjectKind::Crl => "crl",
            ObjectKind::Manifest => "manifest",
            ObjectKind::Roa => "roa",
        };
        f.write_str(s)
    }
}
