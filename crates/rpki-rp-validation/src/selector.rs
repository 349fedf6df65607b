// This file is part of rpki-rp.
// SPDX-License-Identifier: Apache-2.0

//! The manifest/CRL selector: given every CRL (or manifest) issued by a
//! CA, picks the "best current" one.

use rpki_rp_checks::Check;
use rpki_rp_repo::{CertificateContext, Crl, Manifest, RepositoryObject};

use crate::validator::ObjectValidator;

/// The result of selecting among a CA's CRL or manifest candidates: the
/// chosen object, if any, plus the validation checks produced for *every*
/// candidate considered — not only the chosen one.
pub struct SelectionOutcome<T> {
    pub current: Option<RepositoryObject<T>>,
    pub checks: Vec<Check>,
}

/// Picks the current CRL: candidates are tried in descending CRL-number
/// order (ties keep the store's own ordering), and the first one that
/// validates without a [`Check::Reject`] wins. Every candidate is validated
/// regardless of whether an earlier one already won, so operators see every
/// bad CRL, not only the rejected-but-selected one.
pub async fn select_current_crl(
    mut candidates: Vec<RepositoryObject<Crl>>,
    issuer: &CertificateContext,
    validator: &dyn ObjectValidator,
) -> SelectionOutcome<Crl> {
    candidates.sort_by(|a, b| b.content.crl_number.cmp(&a.content.crl_number));

    let mut checks = Vec::new();
    let mut current = None;
    for candidate in candidates {
        let (valid, candidate_checks) = validator.validate_crl(&candidate, issuer).await;
        checks.extend(candidate_checks);
        if valid && current.is_none() {
            current = Some(candidate);
        }
    }
    SelectionOutcome { current, checks }
}

/// Picks the current manifest, same tie-break and all-candidates-validated
/// rules as [`select_current_crl`], using `crl` as the revocation locator for
/// each candidate's own EE certificate.
pub async fn select_current_manifest(
    mut candidates: Vec<RepositoryObject<Manifest>>,
    issuer: &CertificateContext,
    crl: &RepositoryObject<Crl>,
    validator: &dyn ObjectValidator,
) -> SelectionOutcome<Manifest> {
    candidates.sort_by(|a, b| b.content.manifest_number.cmp(&a.content.manifest_number));

    let mut checks = Vec::new();
    let mut current = None;
    for candidate in candidates {
        let (valid, candidate_checks) = validator.validate_manifest(&candidate, issuer, crl).await;
        checks.extend(candidate_checks);
        if valid && current.is_none() {
            current = Some(candidate);
        }
    }
    SelectionOutcome { current, checks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use rpki_rp_checks::{CheckKey, ValidationLocation};
    use rpki_rp_repo::{ContentHash, ResourceCertificate, Roa, Ski};
    use url::Url;

    struct FixedValidator {
        /// CRL numbers that fail validation.
        reject_crl_numbers: Vec<u64>,
        reject_manifest_numbers: Vec<u64>,
    }

    #[async_trait]
    impl ObjectValidator for FixedValidator {
        async fn validate_crl(&self, object: &RepositoryObject<Crl>, _issuer: &CertificateContext) -> (bool, Vec<Check>) {
            if self.reject_crl_numbers.contains(&object.content.crl_number) {
                let check = Check::reject(
                    ValidationLocation::new(object.url.as_str()),
                    CheckKey::other("crl-invalid-signature"),
                    [],
                );
                (false, vec![check])
            } else {
                (true, vec![])
            }
        }

        async fn validate_manifest(
            &self,
            object: &RepositoryObject<Manifest>,
            _issuer: &CertificateContext,
            _crl: &RepositoryObject<Crl>,
        ) -> (bool, Vec<Check>) {
            if self.reject_manifest_numbers.contains(&object.content.manifest_number) {
                let check = Check::reject(
                    ValidationLocation::new(object.url.as_str()),
                    CheckKey::other("manifest-invalid-signature"),
                    [],
                );
                (false, vec![check])
            } else {
                (true, vec![])
            }
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

    fn crl(number: u64) -> RepositoryObject<Crl> {
        RepositoryObject::new(
            Url::parse(&format!("rsync://repo/ca-{number}.crl")).unwrap(),
            ContentHash::new([number as u8; 32]),
            Crl {
                authority_key_identifier: Ski::new([1; 20]),
                crl_number: number,
            },
        )
    }

    fn issuer() -> CertificateContext {
        CertificateContext {
            location: ValidationLocation::new("rsync://repo/ca.cer"),
            certificate: RepositoryObject::new(
                Url::parse("rsync://repo/ca.cer").unwrap(),
                ContentHash::new([0; 32]),
                ResourceCertificate {
                    subject_key_identifier: Ski::new([1; 20]),
                    authority_key_identifier: None,
                    is_ca: true,
                    repository_uri: Some(Url::parse("rsync://repo/ca/").unwrap()),
                    rpki_notify_uri: None,
                    manifest_uri: Some(Url::parse("rsync://repo/ca/ca.mft").unwrap()),
                },
            ),
            subject_key_identifier: Ski::new([1; 20]),
            repository_uri: Url::parse("rsync://repo/ca/").unwrap(),
            rpki_notify_uri: None,
            manifest_uri: Url::parse("rsync://repo/ca/ca.mft").unwrap(),
        }
    }

    #[tokio::test]
    async fn picks_highest_valid_crl_number() {
        let validator = FixedValidator {
            reject_crl_numbers: vec![3],
            reject_manifest_numbers: vec![],
        };
        let outcome = select_current_crl(vec![crl(1), crl(2), crl(3)], &issuer(), &validator).await;
        assert_eq!(outcome.current.unwrap().content.crl_number, 2, "3 rejected, 2 is next highest");
        assert_eq!(outcome.checks.len(), 1, "only the rejected candidate produces a check");
    }

    #[tokio::test]
    async fn no_valid_candidate_returns_none_but_keeps_all_checks() {
        let validator = FixedValidator {
            reject_crl_numbers: vec![1, 2],
            reject_manifest_numbers: vec![],
        };
        let outcome = select_current_crl(vec![crl(1), crl(2)], &issuer(), &validator).await;
        assert!(outcome.current.is_none());
        assert_eq!(outcome.checks.len(), 2);
    }

    #[tokio::test]
    async fn every_candidate_is_validated_not_only_until_a_winner_is_found() {
        let validator = FixedValidator {
            reject_crl_numbers: vec![1],
            reject_manifest_numbers: vec![],
        };
        // Descending order tries 3 first (passes and wins), but 1 must still be
        // validated so its failure is reported.
        let outcome = select_current_crl(vec![crl(1), crl(3)], &issuer(), &validator).await;
        assert_eq!(outcome.current.unwrap().content.crl_number, 3);
        assert_eq!(outcome.checks.len(), 1, "the losing, non-chosen candidate's failure is still reported");
    }
}
