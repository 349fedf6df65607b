// This file is part of rpki-rp.

// Copyright (C) The rpki-rp Authors.
// SPDX-License-Identifier: Apache-2.0

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// 	http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Repository fetch deduplication: guarantees at-most-one fetch per
//! repository URI within a validation run, while allowing an explicit force
//! override.
//!
//! The dedup table is process-wide and long-lived: construct one
//! [`RepoFetchService`] per process and inject it into every walker, rather
//! than one per subsystem.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use url::Url;

use rpki_rp_repo::{FetchError, RepoFetcher};

/// `true` iff `now - last_visited <= max_age` and `force_fetch` is `false`.
/// With `force_fetch = true` this is always `false` — forcing a new fetch.
pub fn time_is_recent(last_visited: Instant, max_age: Duration, now: Instant, force_fetch: bool) -> bool {
    if force_fetch {
        return false;
    }
    now.checked_duration_since(last_visited)
        .map(|elapsed| elapsed <= max_age)
        .unwrap_or(true)
}

/// Per-URI state: the last successful visit time, and an async mutex so
/// concurrent callers for the *same* URI serialize while callers for
/// *different* URIs proceed independently.
struct Entry {
    lock: AsyncMutex<Option<Instant>>,
}

/// Guarantees at-most-one fetch per repository (or trust-anchor-certificate)
/// URI within a validation pass. Long-lived and shared across every walker
/// in the process; the internal table is reset only by test-facing code.
pub struct RepoFetchService<F> {
    fetcher: F,
    freshness: Duration,
    entries: Mutex<HashMap<Url, Arc<Entry>>>,
}

impl<F: RepoFetcher> RepoFetchService<F> {
    pub fn new(fetcher: F, freshness: Duration) -> Self {
        RepoFetchService {
            fetcher,
            freshness,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Drops all recorded visit times. Test-facing only — production code
    /// runs one service for the lifetime of the process.
    pub fn reset(&self) {
        self.entries.lock().clear();
    }

    fn entry_for(&self, uri: &Url) -> Arc<Entry> {
        let mut entries = self.entries.lock();
        entries
            .entry(uri.clone())
            .or_insert_with(|| {
                Arc::new(Entry {
                    lock: AsyncMutex::new(None),
                })
            })
            .clone()
    }

    async fn visit(
        &self,
        uri: &Url,
        force_fetch: bool,
        now: Instant,
        fetch: impl Future<Output = Result<(), FetchError>>,
    ) -> Result<(), FetchError> {
        let entry = self.entry_for(uri);
        let mut last_visited = entry.lock.lock().await;

        if let Some(last) = *last_visited {
            if time_is_recent(last, self.freshness, now, force_fetch) {
                tracing::debug!(uri = %uri, "skipping fetch, visited recently");
                return Ok(());
            }
        }

        tracing::info!(uri = %uri, force_fetch, "fetching repository");
        fetch.await?;
        *last_visited = Some(now);
        Ok(())
    }

    /// Ensures the repository at `uri` has been fetched since the start of
    /// the pass; if `force_fetch` is `true`, fetches unconditionally.
    pub async fn visit_repo(&self, uri: &Url, force_fetch: bool, now: Instant) -> Result<(), FetchError> {
        self.visit(uri, force_fetch, now, self.fetcher.fetch_repo(uri)).await
    }

    /// Same semantics as [`Self::visit_repo`] for a single trust-anchor
    /// certificate URI.
    pub async fn visit_trust_anchor_certificate(
        &self,
        uri: &Url,
        force_fetch: bool,
        now: Instant,
    ) -> Result<(), FetchError> {
        self.visit(uri, force_fetch, now, self.fetcher.fetch_trust_anchor_certificate(uri))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        repo_calls: AtomicUsize,
        ta_calls: AtomicUsize,
        fail_next: std::sync::atomic::AtomicBool,
    }

    impl CountingFetcher {
        fn new() -> Self {
            CountingFetcher {
                repo_calls: AtomicUsize::new(0),
                ta_calls: AtomicUsize::new(0),
                fail_next: std::sync::atomic::AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl RepoFetcher for CountingFetcher {
        async fn fetch_repo(&self, uri: &Url) -> Result<(), FetchError> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(FetchError::new(uri.clone(), std::io::Error::other("boom")));
            }
            self.repo_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn fetch_trust_anchor_certificate(&self, _uri: &Url) -> Result<(), FetchError> {
            self.ta_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn base_now() -> Instant {
        // Buffer forward so subtracting test durations never underflows.
        Instant::now() + Duration::from_secs(3600)
    }

    #[test]
    fn time_is_recent_checks_elapsed_against_max_age() {
        let t = base_now();
        assert!(time_is_recent(t - Duration::from_secs(60), Duration::from_secs(120), t, false));
        assert!(!time_is_recent(t - Duration::from_secs(120), Duration::from_secs(60), t, false));
        assert!(!time_is_recent(t - Duration::from_secs(60), Duration::from_secs(120), t, true));
    }

    #[tokio::test]
    async fn dedup_then_force_refetches() {
        let service = RepoFetchService::new(CountingFetcher::new(), Duration::from_secs(120));
        let uri = Url::parse("rsync://repo.example/module/").unwrap();
        let t0 = base_now();

        service.visit_repo(&uri, false, t0).await.unwrap();
        assert_eq!(service.fetcher.repo_calls.load(Ordering::SeqCst), 1);

        service.visit_repo(&uri, false, t0 + Duration::from_secs(1)).await.unwrap();
        assert_eq!(
            service.fetcher.repo_calls.load(Ordering::SeqCst),
            1,
            "second call within freshness window must not refetch"
        );

        service.visit_repo(&uri, true, t0 + Duration::from_secs(2)).await.unwrap();
        assert_eq!(
            service.fetcher.repo_calls.load(Ordering::SeqCst),
            2,
            "force_fetch must always refetch"
        );
    }

    #[tokio::test]
    async fn failed_fetch_does_not_record_visit_and_is_retried() {
        let fetcher = CountingFetcher::new();
        fetcher.fail_next.store(true, Ordering::SeqCst);
        let service = RepoFetchService::new(fetcher, Duration::from_secs(120));
        let uri = Url::parse("rsync://repo.example/module/").unwrap();
        let t0 = base_now();

        assert!(service.visit_repo(&uri, false, t0).await.is_err());
        assert_eq!(service.fetcher.repo_calls.load(Ordering::SeqCst), 0);

        // The next call, even within the freshness window, must retry since
        // no successful visit was ever recorded.
        service.visit_repo(&uri, false, t0 + Duration::from_secs(1)).await.unwrap();
        assert_eq!(service.fetcher.repo_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_uris_are_independent() {
        let service = RepoFetchService::new(CountingFetcher::new(), Duration::from_secs(120));
        let a = Url::parse("rsync://repo.example/a/").unwrap();
        let b = Url::parse("rsync://repo.example/b/").unwrap();
        let t0 = base_now();

        service.visit_repo(&a, false, t0).await.unwrap();
        service.visit_repo(&b, false, t0).await.unwrap();
        assert_eq!(service.fetcher.repo_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn reset_clears_visit_history() {
        let service = RepoFetchService::new(CountingFetcher::new(), Duration::from_secs(120));
        let uri = Url::parse("rsync://repo.example/module/").unwrap();
        let t0 = base_now();

        service.visit_repo(&uri, false, t0).await.unwrap();
        service.reset();
        service.visit_repo(&uri, false, t0 + Duration::from_secs(1)).await.unwrap();
        assert_eq!(service.fetcher.repo_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn trust_anchor_certificate_has_independent_counter() {
        let service = RepoFetchService::new(CountingFetcher::new(), Duration::from_secs(120));
        let uri = Url::parse("rsync://ta.example/ta.cer").unwrap();
        let t0 = base_now();

        service.visit_trust_anchor_certificate(&uri, false, t0).await.unwrap();
        service
            .visit_trust_anchor_certificate(&uri, false, t0 + Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(service.fetcher.ta_calls.load(Ordering::SeqCst), 1);
    }
}
