// This file is part of rpki-rp.
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use url::Url;

use crate::object::{Crl, Manifest, ObjectKind, RepositoryObject, ResourceCertificate, Roa};
use crate::ski::Ski;

/// Whatever a store entry turned out to decode to, for [`Storage::get_object`]
/// callers that don't know the kind up front (manifest entries name a file,
/// not a kind).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedObject {
    ResourceCertificate(ResourceCertificate),
    Crl(Crl),
    Manifest(Manifest),
    Roa(Roa),
}

impl DecodedObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            DecodedObject::ResourceCertificate(_) => ObjectKind::ResourceCertificate,
            DecodedObject::Crl(_) => ObjectKind::Crl,
            DecodedObject::Manifest(_) => ObjectKind::Manifest,
            DecodedObject::Roa(_) => ObjectKind::Roa,
        }
    }
}

/// The read-only query interface onto the on-disk object store (out of scope
/// for this crate — addressed here only by contract).
///
/// Every call returns an immutable snapshot: the store is expected to
/// provide snapshot semantics per call so the walker can read concurrently
/// with a separate ingest pass.
#[async_trait]
pub trait Storage: Send + Sync {
    /// All CRLs issued under the given Authority Key Identifier.
    async fn get_crls(&self, aki: Ski) -> Vec<RepositoryObject<Crl>>;

    /// All manifests issued under the given Authority Key Identifier.
    async fn get_manifests(&self, aki: Ski) -> Vec<RepositoryObject<Manifest>>;

    /// The object published at `url`, if the store has it.
    async fn get_object(&self, url: &Url) -> Option<RepositoryObject<DecodedObject>>;
}

/// I/O errors from the (out-of-scope) network transport, surfaced so the
/// fetch service can decide whether to record a successful visit.
#[derive(thiserror::Error, Debug)]
#[error("repository fetch failed for {uri}: {source}")]
pub struct FetchError {
    pub uri: Url,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl FetchError {
    pub fn new(uri: Url, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        FetchError {
            uri,
            source: Box::new(source),
        }
    }
}

/// The network boundary that actually moves bytes (rsync/RRDP), out of scope
/// for this crate and referenced only by contract.
#[async_trait]
pub trait RepoFetcher: Send + Sync {
    /// Synchronously (from the caller's point of view) populates storage
    /// with everything published under `uri`.
    async fn fetch_repo(&self, uri: &Url) -> Result<(), FetchError>;

    /// Fetches a single trust-anchor certificate.
    async fn fetch_trust_anchor_certificate(&self, uri: &Url) -> Result<(), FetchError>;
}
