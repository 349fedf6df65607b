// This file is part of rpki-rp.
// SPDX-License-Identifier: Apache-2.0

//! A permissive [`ObjectValidator`]: cryptographic verification of
//! certificates, CRLs, manifests and ROAs is out of scope for this core —
//! this accepts every candidate it's asked about, unmodified, so
//! the walker has something to drive until a real X.509/CMS validator is
//! plugged in at this seam.

use async_trait::async_trait;

use rpki_rp_checks::Check;
use rpki_rp_repo::{CertificateContext, Crl, Manifest, RepositoryObject, ResourceCertificate, Roa};
use rpki_rp_validation::ObjectValidator;

pub struct PermissiveValidator;

#[async_trait]
impl ObjectValidator for PermissiveValidator {
    async fn validate_crl(&self, _object: &RepositoryObject<Crl>, _issuer: &CertificateContext) -> (bool, Vec<Check>) {
        (true, vec![])
    }

    async fn validate_manifest(
        &self,
        _object: &RepositoryObject<Manifest>,
        _issuer: &CertificateContext,
        _crl: &RepositoryObject<Crl>,
    ) -> (bool, Vec<Check>) {
        (true, vec![])
    }

    async fn validate_roa(&self, _object: &RepositoryObject<Roa>, _issuer: &CertificateContext, _crl: &RepositoryObject<Crl>) -> (bool, Vec<Check>) {
        (true, vec![])
    }

    async fn validate_child_certificate(
        &self,
        _object: &RepositoryObject<ResourceCertificate>,
        _issuer: &CertificateContext,
        _crl: &RepositoryObject<Crl>,
    ) -> (bool, Vec<Check>) {
        (true, vec![])
    }
}
