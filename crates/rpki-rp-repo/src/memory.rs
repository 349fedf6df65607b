// This file is part of rpki-rp.
// SPDX-License-Identifier: Apache-2.0

//! An in-memory [`Storage`] fixture for tests.
//!
//! Not the production store — that's out of scope for this core —
//! but a stand-in fixture used by this crate's own tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use url::Url;

use crate::object::{Crl, Manifest, RepositoryObject};
use crate::ski::Ski;
use crate::store::{DecodedObject, Storage};

#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<Url, RepositoryObject<DecodedObject>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, object: RepositoryObject<DecodedObject>) {
        self.objects.write().insert(object.url.clone(), object);
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn get_crls(&self, aki: Ski) -> Vec<RepositoryObject<Crl>> {
        self.objects
            .read()
            .values()
            .filter_map(|o| match &o.content {
                DecodedObject::Crl(crl) if crl.authority_key_identifier == aki => {
                    Some(o.clone().map(|c| match c {
                        DecodedObject::Crl(crl) => crl,
                        _ => unreachable!(),
                    }))
                }
                _ => None,
            })
            .collect()
    }

    async fn get_manifests(&self, aki: Ski) -> Vec<RepositoryObject<Manifest>> {
        self.objects
            .read()
            .values()
            .filter_map(|o| match &o.content {
                DecodedObject::Manifest(mft) if mft.authority_key_identifier == aki => {
                    Some(o.clone().map(|c| match c {
                        DecodedObject::Manifest(mft) => mft,
                        _ => unreachable!(),
                    }))
                }
                _ => None,
            })
            .collect()
    }

    async fn get_object(&self, url: &Url) -> Option<RepositoryObject<DecodedObject>> {
        self.objects.read().get(url).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::ContentHash;

    #[tokio::test]
    async fn insert_then_query_by_aki() {
        let store = MemoryStore::new();
        let aki = Ski::new([7; 20]);
        let crl = RepositoryObject::new(
            Url::parse("rsync://repo/ca.crl").unwrap(),
            ContentHash::new([1; 32]),
            DecodedObject::Crl(Crl {
                authority_key_identifier: aki,
                crl_number: 3,
            }),
        );
        store.insert(crl.clone());

        let found = store.get_crls(aki).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].content.crl_number, 3);

        let other_aki = store.get_crls(Ski::new([9; 20])).await;
        assert!(other_aki.is_empty());
    }

    #[tokio::test]
    async fn get_object_returns_none_for_unknown_url() {
        let store = MemoryStore::new();
        let url = Url::parse("rsync://repo/missing.roa").unwrap();
        assert!(store.get_object(&url).await.is_none());
    }
}
