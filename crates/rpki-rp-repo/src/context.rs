// This file is part of rpki-rp.
// SPDX-License-Identifier: Apache-2.0

use url::Url;

use rpki_rp_checks::{Check, ValidationLocation};

use crate::object::{Crl, ResourceCertificate, Roa};
use crate::object::RepositoryObject;
use crate::ski::Ski;

/// The issuer view used when validating a child: everything a child
/// certificate, CRL, manifest or ROA needs from its issuer to be validated
/// and, if it is itself a CA, to be recursed into.
#[derive(Clone, Debug)]
pub struct CertificateContext {
    pub location: ValidationLocation,
    pub certificate: RepositoryObject<ResourceCertificate>,
    pub subject_key_identifier: Ski,
    pub repository_uri: Url,
    pub rpki_notify_uri: Option<Url>,
    pub manifest_uri: Url,
}

impl CertificateContext {
    /// Builds the issuer context for a child CA from its own (already
    /// validated) certificate. Fails if the certificate is missing the
    /// repository-access fields a CA must publish (manifest URI above all —
    /// without it there is nothing to recurse into).
    pub fn for_child_ca(
        location: ValidationLocation,
        certificate: RepositoryObject<ResourceCertificate>,
    ) -> Option<Self> {
        let repository_uri = certificate.content.repository_uri.clone()?;
        let manifest_uri = certificate.content.manifest_uri.clone()?;
        let rpki_notify_uri = certificate.content.rpki_notify_uri.clone();
        let subject_key_identifier = certificate.content.subject_key_identifier;
        Some(CertificateContext {
            location,
            certificate,
            subject_key_identifier,
            repository_uri,
            rpki_notify_uri,
            manifest_uri,
        })
    }

    /// `rpki_notify_uri ?? repository_uri`.
    pub fn prefetch_uri(&self) -> &Url {
        self.rpki_notify_uri.as_ref().unwrap_or(&self.repository_uri)
    }
}

/// The verdict attached to a terminal leaf URI: its checks, and the decoded
/// object if it validated. Intermediate CA certificates are recursed through
/// rather than appearing here.
#[derive(Clone, Debug)]
pub struct ValidatedObject<T> {
    pub checks: Vec<Check>,
    pub object: Option<RepositoryObject<T>>,
}

impl<T> ValidatedObject<T> {
    pub fn valid(object: RepositoryObject<T>, checks: Vec<Check>) -> Self {
        ValidatedObject {
            checks,
            object: Some(object),
        }
    }

    pub fn invalid(checks: Vec<Check>) -> Self {
        ValidatedObject { checks, object: None }
    }

    pub fn is_valid(&self) -> bool {
        self.object.is_some()
    }
}

/// The classification of a manifest's entries produced by the cross-checker
/// ROAs, child CA certificates, and CRLs, each resolved against the
/// store. Unknown object kinds are silently dropped.
#[derive(Clone, Debug, Default)]
pub struct ClassifiedObjects {
    pub roas: Vec<RepositoryObject<Roa>>,
    pub child_certificates: Vec<RepositoryObject<ResourceCertificate>>,
    pub crls: Vec<RepositoryObject<Crl>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::ContentHash;

    fn cert(manifest_uri: Option<&str>) -> RepositoryObject<ResourceCertificate> {
        RepositoryObject::new(
            Url::parse("rsync://repo/ca.cer").unwrap(),
            ContentHash::new([0; 32]),
            ResourceCertificate {
                subject_key_identifier: Ski::new([1; 20]),
                authority_key_identifier: Some(Ski::new([2; 20])),
                is_ca: true,
                repository_uri: Some(Url::parse("rsync://repo/ca/").unwrap()),
                rpki_notify_uri: None,
                manifest_uri: manifest_uri.map(|u| Url::parse(u).unwrap()),
            },
        )
    }

    #[test]
    fn for_child_ca_requires_manifest_uri() {
        let loc = ValidationLocation::new("rsync://repo/ca.cer");
        assert!(CertificateContext::for_child_ca(loc.clone(), cert(None)).is_none());
        assert!(CertificateContext::for_child_ca(loc, cert(Some("rsync://repo/ca/ca.mft"))).is_some());
    }

    #[test]
    fn valid_and_invalid_constructors() {
        let obj = RepositoryObject::new(
            Url::parse("rsync://repo/roa.roa").unwrap(),
            ContentHash::new([9; 32]),
            Roa { vrps: vec![] },
        );
        let valid = ValidatedObject::valid(obj, vec![]);
        assert!(valid.is_valid());

        let invalid: ValidatedObject<Roa> = ValidatedObject::invalid(vec![]);
        assert!(!invalid.is_valid());
    }
}
