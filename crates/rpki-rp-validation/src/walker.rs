// This file is part of rpki-rp.
// SPDX-License-Identifier: Apache-2.0

//! The top-down validation walker: recurses down an RPKI certificate
//! tree, selecting and cross-checking each CA's CRL and manifest along the
//! way, and accumulates every validated ROA it finds.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tracing::Instrument;
use url::Url;

use rpki_rp_checks::{Check, CheckKey, ValidationLocation};
use rpki_rp_fetch::RepoFetchService;
use rpki_rp_repo::{CertificateContext, RepoFetcher, Roa, Ski, Storage, ValidatedObject};

use crate::crosscheck::cross_check_manifest;
use crate::error::WalkerError;
use crate::selector::{select_current_crl, select_current_manifest};
use crate::validator::ObjectValidator;

/// The result of a full walk: every validated ROA found, keyed by its
/// publication URI, plus every check produced anywhere in the tree. Checks
/// are returned alongside the objects rather than through a side channel —
/// an implementer's choice left open by the walk procedure.
pub struct WalkOutcome {
    pub roas: HashMap<Url, ValidatedObject<Roa>>,
    pub checks: Vec<Check>,
}

/// Drives the selector and cross-checker over a repository store,
/// recursing down every child CA it validates.
///
/// One `Walker` is built per process and reused across trust anchors — it
/// holds no per-walk state itself; the `seen` cycle guard lives on the stack
/// of each [`Walker::walk`] call, never shared across trust anchors.
pub struct Walker<S, R, V> {
    store: Arc<S>,
    fetch: Arc<RepoFetchService<R>>,
    validator: Arc<V>,
}

impl<S, R, V> Walker<S, R, V>
where
    S: Storage + 'static,
    R: RepoFetcher + 'static,
    V: ObjectValidator + 'static,
{
    pub fn new(store: Arc<S>, fetch: Arc<RepoFetchService<R>>, validator: Arc<V>) -> Self {
        Walker { store, fetch, validator }
    }

    /// Walks the tree rooted at `root`.
    ///
    /// # Errors
    /// Returns [`WalkerError::NotAnIssuingCa`] if `root` isn't a CA
    /// certificate — a caller bug, since every trust anchor and every
    /// manifest-classified child certificate passed in here is expected to
    /// already have been checked for `is_ca`.
    pub async fn walk(&self, root: CertificateContext, validation_start_time: Instant) -> Result<WalkOutcome, WalkerError> {
        if !root.certificate.content.is_ca {
            return Err(WalkerError::NotAnIssuingCa {
                location: root.location.clone(),
            });
        }
        let seen = Mutex::new(HashSet::new());
        seen.lock().insert(root.subject_key_identifier);

        let (roas, checks) = self.walk_ca(root, &seen, validation_start_time).await;
        Ok(WalkOutcome { roas, checks })
    }

    /// The per-invocation procedure. Boxed because
    /// async fns can't recurse directly; instrumented with a span per CA so
    /// a single walk's log lines correlate by SKI.
    fn walk_ca<'a>(
        &'a self,
        issuer: CertificateContext,
        seen: &'a Mutex<HashSet<Ski>>,
        now: Instant,
    ) -> BoxFuture<'a, (HashMap<Url, ValidatedObject<Roa>>, Vec<Check>)> {
        let span = tracing::info_span!("walk_ca", ski = %issuer.subject_key_identifier.to_hex());
        Box::pin(
            async move {
                let mut checks = Vec::new();
                let mut roas = HashMap::new();

                // Step 1: prefetch.
                if let Err(err) = self.fetch.visit_repo(issuer.prefetch_uri(), false, now).await {
                    tracing::warn!(uri = %issuer.prefetch_uri(), error = %err, "repository prefetch failed");
                    checks.push(Check::warning(
                        issuer.location.clone(),
                        CheckKey::other("repository-fetch-failed"),
                        [err.to_string()],
                    ));
                }

                // Step 2: select the current CRL.
                let crl_candidates = self.store.get_crls(issuer.subject_key_identifier).await;
                let crl_outcome = select_current_crl(crl_candidates, &issuer, self.validator.as_ref()).await;
                checks.extend(crl_outcome.checks);
                let Some(crl) = crl_outcome.current else {
                    checks.push(Check::reject(issuer.location.clone(), CheckKey::CrlRequired, []));
                    return (roas, checks);
                };

                // Step 3: select the current manifest.
                let manifest_candidates = self.store.get_manifests(issuer.subject_key_identifier).await;
                let manifest_outcome = select_current_manifest(manifest_candidates, &issuer, &crl, self.validator.as_ref()).await;
                checks.extend(manifest_outcome.checks);
                let Some(manifest) = manifest_outcome.current else {
                    checks.push(Check::warning(issuer.location.clone(), CheckKey::CaShouldHaveManifest, []));
                    return (roas, checks);
                };

                // Step 4: cross-check the manifest.
                let (classified, cc_checks) = cross_check_manifest(&manifest, &crl, &issuer, self.store.as_ref()).await;
                checks.extend(cc_checks);

                // Step 5: validate every ROA and child certificate (CRL and
                // manifest candidates were already validated by the selector).
                for roa in classified.roas {
                    let (valid, roa_checks) = self.validator.validate_roa(&roa, &issuer, &crl).await;
                    checks.extend(roa_checks.clone());
                    let verdict = if valid {
                        ValidatedObject::valid(roa.clone(), roa_checks)
                    } else {
                        ValidatedObject::invalid(roa_checks)
                    };
                    roas.insert(roa.url.clone(), verdict);
                }

                for child in classified.child_certificates {
                    let (valid, cert_checks) = self.validator.validate_child_certificate(&child, &issuer, &crl).await;
                    checks.extend(cert_checks);
                    if !valid || !child.content.is_ca {
                        continue;
                    }

                    // Step 6: cycle guard, then recurse.
                    let ski = child.content.subject_key_identifier;
                    {
                        let mut seen_guard = seen.lock();
                        if seen_guard.contains(&ski) {
                            tracing::warn!(ski = %ski.to_hex(), "cycle detected, skipping child CA");
                            continue;
                        }
                        seen_guard.insert(ski);
                    }

                    let location = ValidationLocation::new(child.url.as_str());
                    match CertificateContext::for_child_ca(location.clone(), child) {
                        Some(child_ctx) => {
                            let (child_roas, child_checks) = self.walk_ca(child_ctx, seen, now).await;
                            roas.extend(child_roas);
                            checks.extend(child_checks);
                        }
                        None => checks.push(Check::warning(
                            location,
                            CheckKey::other("ca-missing-repository-fields"),
                            [],
                        )),
                    }
                }

                // Step 7: return the accumulated map and checks.
                (roas, checks)
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use rpki_rp_repo::memory::MemoryStore;
    use rpki_rp_repo::{Crl, DecodedObject, FetchError, Manifest, RepositoryObject, ResourceCertificate, Vrp};

    struct NullFetcher;

    #[async_trait]
    impl RepoFetcher for NullFetcher {
        async fn fetch_repo(&self, _uri: &Url) -> Result<(), FetchError> {
            Ok(())
        }
        async fn fetch_trust_anchor_certificate(&self, _uri: &Url) -> Result<(), FetchError> {
            Ok(())
        }
    }

    struct AlwaysValid;

    #[async_trait]
    impl ObjectValidator for AlwaysValid {
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

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn root_context() -> CertificateContext {
        CertificateContext {
            location: ValidationLocation::new("rsync://repo/ta.cer"),
            certificate: RepositoryObject::new(
                url("rsync://repo/ta.cer"),
                rpki_rp_repo::ContentHash::new([0; 32]),
                ResourceCertificate {
                    subject_key_identifier: Ski::new([1; 20]),
                    authority_key_identifier: None,
                    is_ca: true,
                    repository_uri: Some(url("rsync://repo/ca/")),
                    rpki_notify_uri: None,
                    manifest_uri: Some(url("rsync://repo/ca/ca.mft")),
                },
            ),
            subject_key_identifier: Ski::new([1; 20]),
            repository_uri: url("rsync://repo/ca/"),
            rpki_notify_uri: None,
            manifest_uri: url("rsync://repo/ca/ca.mft"),
        }
    }

    #[tokio::test]
    async fn no_crl_rejects_and_returns_empty() {
        let store = Arc::new(MemoryStore::new());
        let fetch = Arc::new(RepoFetchService::new(NullFetcher, std::time::Duration::from_secs(600)));
        let walker = Walker::new(store, fetch, Arc::new(AlwaysValid));

        let outcome = walker.walk(root_context(), Instant::now()).await.unwrap();
        assert!(outcome.roas.is_empty());
        assert!(outcome.checks.iter().any(|c| c.is_reject() && c.key().as_str() == "CRL_REQUIRED"));
    }

    #[tokio::test]
    async fn non_ca_root_is_a_precondition_error() {
        let store = Arc::new(MemoryStore::new());
        let fetch = Arc::new(RepoFetchService::new(NullFetcher, std::time::Duration::from_secs(600)));
        let walker = Walker::new(store, fetch, Arc::new(AlwaysValid));

        let mut non_ca = root_context();
        non_ca.certificate.content.is_ca = false;
        assert_matches!(walker.walk(non_ca, Instant::now()).await, Err(WalkerError::NotAnIssuingCa { .. }));
    }

    #[tokio::test]
    async fn walks_down_to_a_roa_through_one_level_of_ca() {
        let store = MemoryStore::new();

        store.insert(RepositoryObject::new(
            url("rsync://repo/ca/ca.crl"),
            rpki_rp_repo::ContentHash::new([2; 32]),
            DecodedObject::Crl(Crl {
                authority_key_identifier: Ski::new([1; 20]),
                crl_number: 1,
            }),
        ));

        let mut entries = IndexMap::new();
        entries.insert("x.roa".to_string(), rpki_rp_repo::ContentHash::new([3; 32]));
        store.insert(RepositoryObject::new(
            url("rsync://repo/ca/ca.mft"),
            rpki_rp_repo::ContentHash::new([4; 32]),
            DecodedObject::Manifest(Manifest {
                authority_key_identifier: Ski::new([1; 20]),
                manifest_number: 1,
                entries,
            }),
        ));

        store.insert(RepositoryObject::new(
            url("rsync://repo/ca/x.roa"),
            rpki_rp_repo::ContentHash::new([3; 32]),
            DecodedObject::Roa(Roa {
                vrps: vec![Vrp {
                    prefix: "10.0.0.0/8".parse().unwrap(),
                    max_length: 16,
                    asn: 65000,
                }],
            }),
        ));

        let fetch = Arc::new(RepoFetchService::new(NullFetcher, std::time::Duration::from_secs(600)));
        let walker = Walker::new(Arc::new(store), fetch, Arc::new(AlwaysValid));

        let outcome = walker.walk(root_context(), Instant::now()).await.unwrap();
        assert_eq!(outcome.roas.len(), 1);
        let (_, validated) = outcome.roas.into_iter().next().unwrap();
        assert!(validated.is_valid());
    }
}
