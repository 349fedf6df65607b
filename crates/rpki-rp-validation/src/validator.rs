// This file is part of rpki-rp.
// SPDX-License-Identifier: Apache-2.0

//! The external cryptographic validator contract.
//!
//! Verifying a certificate chain, checking a CRL's signature, or checking a
//! manifest/ROA's CMS signature is out of scope for this crate —
//! every place the walker needs "is this object valid against this issuer"
//! goes through this trait instead, the same way `rpki-rp-repo::Storage`
//! stands in for the on-disk object store.

use async_trait::async_trait;

use rpki_rp_checks::Check;
use rpki_rp_repo::{CertificateContext, Crl, Manifest, RepositoryObject, ResourceCertificate, Roa};

/// Validates one object against its issuer context, using a CRL as the
/// revocation locator where one applies.
///
/// Every method returns `(valid, checks)`: `checks` are *all* findings
/// produced for this object (both the ones that disqualified it, if any, and
/// ones that didn't), so callers can surface them even for objects that
/// ultimately validate. `valid` is `false` iff at least one of `checks` is a
/// [`Check::Reject`].
#[async_trait]
pub trait ObjectValidator: Send + Sync {
    /// Validates a CRL candidate against its issuing CA. No CRL locator
    /// applies here — the CRL itself is what a locator resolves to.
    async fn validate_crl(&self, object: &RepositoryObject<Crl>, issuer: &CertificateContext) -> (bool, Vec<Check>);

    /// Validates a manifest candidate against its issuing CA, using the
    /// already-selected CRL to check the manifest's own EE certificate for
    /// revocation.
    async fn validate_manifest(
        &self,
        object: &RepositoryObject<Manifest>,
        issuer: &CertificateContext,
        crl: &RepositoryObject<Crl>,
    ) -> (bool, Vec<Check>);

    /// Validates a ROA found on the manifest.
    async fn validate_roa(
        &self,
        object: &RepositoryObject<Roa>,
        issuer: &CertificateContext,
        crl: &RepositoryObject<Crl>,
    ) -> (bool, Vec<Check>);

    /// Validates a child CA certificate found on the manifest.
    async fn validate_child_certificate(
        &self,
        object: &RepositoryObject<ResourceCertificate>,
        issuer: &CertificateContext,
        crl: &RepositoryObject<Crl>,
    ) -> (bool, Vec<Check>);
}
