// This file is part of rpki-rp.
// SPDX-License-Identifier: Apache-2.0

//! A no-op [`RepoFetcher`]: the rsync/RRDP transport that actually moves
//! bytes is out of scope here — this is the seam it plugs into, reporting
//! every fetch as immediately successful against whatever the configured
//! [`rpki_rp_repo::memory::MemoryStore`] was seeded with.

use async_trait::async_trait;
use url::Url;

use rpki_rp_repo::{FetchError, RepoFetcher};

pub struct NoopFetcher;

#[async_trait]
impl RepoFetcher for NoopFetcher {
    async fn fetch_repo(&self, uri: &Url) -> Result<(), FetchError> {
        tracing::debug!(%uri, "fetch transport not configured, treating as already up to date");
        Ok(())
    }

    async fn fetch_trust_anchor_certificate(&self, uri: &Url) -> Result<(), FetchError> {
        tracing::debug!(%uri, "fetch transport not configured, treating as already up to date");
        Ok(())
    }
}
