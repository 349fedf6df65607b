// This file is part of rpki-rp.
// SPDX-License-Identifier: Apache-2.0

//! The manifest cross-checker: resolves a manifest's declared entries
//! against the store, classifies them by kind, and cross-checks the CRL and
//! the manifest's own published location.

use rpki_rp_checks::{Check, CheckKey, ValidationLocation};
use rpki_rp_repo::{CertificateContext, ClassifiedObjects, Crl, DecodedObject, Manifest, RepositoryObject, Storage};

/// Resolves `manifest`'s declared `{filename -> hash}` entries against
/// `store`, classifies the present, hash-matching ones into
/// [`ClassifiedObjects`], and cross-checks the selected CRL and the
/// manifest's own published URL.
pub async fn cross_check_manifest(
    manifest: &RepositoryObject<Manifest>,
    crl: &RepositoryObject<Crl>,
    issuer: &CertificateContext,
    store: &dyn Storage,
) -> (ClassifiedObjects, Vec<Check>) {
    let mut checks = Vec::new();
    let mut classified = ClassifiedObjects::default();
    let mut crls_on_manifest = Vec::new();
    let issuer_ski_hex = issuer.subject_key_identifier.to_hex();

    for (filename, expected_hash) in manifest.content.entries.iter() {
        let uri = match issuer.repository_uri.join(filename) {
            Ok(uri) => uri,
            Err(_) => {
                checks.push(Check::warning(
                    format!("{}{filename}", issuer.repository_uri),
                    CheckKey::ManifestFileNotFoundByAki,
                    [issuer_ski_hex.clone()],
                ));
                continue;
            }
        };

        let Some(object) = store.get_object(&uri).await else {
            checks.push(Check::warning(
                ValidationLocation::new(uri.as_str()),
                CheckKey::ManifestFileNotFoundByAki,
                [issuer_ski_hex.clone()],
            ));
            continue;
        };

        if object.hash != *expected_hash {
            checks.push(Check::warning(
                ValidationLocation::new(uri.as_str()),
                CheckKey::ManifestLocationMismatch,
                [issuer_ski_hex.clone()],
            ));
            continue;
        }

        let hash = object.hash;
        match object.content {
            DecodedObject::Roa(roa) => classified.roas.push(object_with(uri, hash, roa)),
            DecodedObject::ResourceCertificate(cert) => classified.child_certificates.push(object_with(uri, hash, cert)),
            DecodedObject::Crl(entry_crl) => crls_on_manifest.push(object_with(uri, hash, entry_crl)),
            DecodedObject::Manifest(_) => {
                // Unknown/unsupported kind on this manifest: silently dropped.
            }
        }
    }

    cross_check_crls(manifest, crl, &crls_on_manifest, &mut checks);
    cross_check_manifest_url(manifest, issuer, &mut checks);

    classified.crls = crls_on_manifest;
    (classified, checks)
}

fn object_with<T>(url: url::Url, hash: rpki_rp_repo::ContentHash, content: T) -> RepositoryObject<T> {
    RepositoryObject::new(url, hash, content)
}

fn cross_check_crls(
    manifest: &RepositoryObject<Manifest>,
    crl: &RepositoryObject<Crl>,
    crls_on_manifest: &[RepositoryObject<Crl>],
    checks: &mut Vec<Check>,
) {
    match crls_on_manifest {
        [] => checks.push(Check::warning(
            ValidationLocation::new(manifest.url.as_str()),
            CheckKey::ManifestDoesNotContainFile,
            ["*.obj".to_string()],
        )),
        [single] => {
            if single.url != crl.url {
                checks.push(Check::warning(
                    ValidationLocation::new(manifest.url.as_str()),
                    CheckKey::ManifestCrlUriMismatch,
                    [single.url.to_string(), crl.url.to_string()],
                ));
            } else if single.hash != crl.hash {
                checks.push(Check::warning(
                    ValidationLocation::new(manifest.url.as_str()),
                    CheckKey::ManifestHashMismatch,
                    [single.hash.to_hex(), crl.hash.to_hex()],
                ));
            }
        }
        many => {
            let joined = many.iter().map(|c| c.url.as_str()).collect::<Vec<_>>().join(", ");
            checks.push(Check::warning(
                ValidationLocation::new(manifest.url.as_str()),
                CheckKey::ManifestDoesNotContainFile,
                [format!("Single CRL expected, found: {joined}")],
            ));
        }
    }
}

fn cross_check_manifest_url(manifest: &RepositoryObject<Manifest>, issuer: &CertificateContext, checks: &mut Vec<Check>) {
    let declared = issuer.manifest_uri.as_str().to_lowercase();
    let actual = manifest.url.as_str().to_lowercase();
    if declared != actual {
        checks.push(Check::warning(
            issuer.location.clone(),
            CheckKey::ManifestLocationMismatch,
            [issuer.manifest_uri.to_string(), manifest.url.to_string()],
        ));
    }
}
