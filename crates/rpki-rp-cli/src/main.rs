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

//! The `rpki-rp` binary: parses configuration, initializes logging, wires the
//! validation walker's output into the RTR server, and runs both to
//! completion. Everything interesting lives in the library crates; this is
//! just the wiring.

mod config;
mod fetch;
mod validator;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use parking_lot::RwLock;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use rpki_rp_checks::Check;
use rpki_rp_fetch::RepoFetchService;
use rpki_rp_repo::memory::MemoryStore;
use rpki_rp_repo::{CertificateContext, Vrp};
use rpki_rp_rtr::server::{self, VrpFeed};
use rpki_rp_validation::Walker;

use config::{CliArgs, Config};
use fetch::NoopFetcher;
use validator::PermissiveValidator;

/// The feed a served RTR connection reads from: snapshots the most recent
/// completed walk's VRP set, bumping the serial every time a new one lands.
struct WalkerFeed {
    session_id: u16,
    state: RwLock<(u32, Vec<Vrp>)>,
}

impl WalkerFeed {
    fn new(session_id: u16) -> Self {
        WalkerFeed {
            session_id,
            state: RwLock::new((0, Vec::new())),
        }
    }

    fn publish(&self, vrps: Vec<Vrp>) {
        let mut state = self.state.write();
        state.0 += 1;
        state.1 = vrps;
    }
}

#[async_trait::async_trait]
impl VrpFeed for WalkerFeed {
    async fn current(&self) -> (u16, u32, Vec<Vrp>) {
        let state = self.state.read();
        (self.session_id, state.0, state.1.clone())
    }
}

fn init_tracing(log: &config::LogConfig) {
    let filter = EnvFilter::try_new(&log.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Loads a trust anchor's self-signed certificate from disk as a root
/// [`CertificateContext`]. The on-disk format and the X.509 decode itself are
/// out of scope here — this is a placeholder standing in for that
/// decode until a real TAL/certificate parser is plugged in at this seam.
fn load_trust_anchor(path: &std::path::Path) -> anyhow::Result<CertificateContext> {
    anyhow::bail!(
        "trust anchor decoding is out of scope for this core; cannot load {}",
        path.display()
    )
}

fn log_checks(checks: &[Check]) {
    for check in checks {
        match check {
            Check::Reject { .. } => tracing::error!(%check, "validation reject"),
            Check::Warning { .. } => tracing::warn!(%check, "validation warning"),
        }
    }
}

async fn run_walks(
    store: Arc<MemoryStore>,
    fetch: Arc<RepoFetchService<NoopFetcher>>,
    trust_anchors: Vec<CertificateContext>,
    feed: Arc<WalkerFeed>,
) {
    let walker = Arc::new(Walker::new(store, fetch, Arc::new(PermissiveValidator)));
    let mut handles = Vec::new();
    for root in trust_anchors {
        let walker = walker.clone();
        let feed = feed.clone();
        handles.push(tokio::spawn(async move {
            let ski = root.subject_key_identifier.to_hex();
            match walker.walk(root, Instant::now()).await {
                Ok(outcome) => {
                    log_checks(&outcome.checks);
                    let vrps: Vec<Vrp> = outcome
                        .roas
                        .values()
                        .filter_map(|validated| validated.object.as_ref())
                        .flat_map(|roa| roa.content.vrps.clone())
                        .collect();
                    tracing::info!(ski, vrp_count = vrps.len(), "trust anchor walk completed");
                    feed.publish(vrps);
                }
                Err(err) => tracing::error!(ski, error = %err, "trust anchor walk failed its precondition"),
            }
        }));
    }
    for handle in handles {
        let _ = handle.await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let config = Config::load(&args).context("loading configuration")?;
    init_tracing(&config.log);

    tracing::info!(rtr_listen = %config.rtr_listen, fetch_freshness = ?config.fetch_freshness, "starting rpki-rp");

    let store = Arc::new(MemoryStore::new());
    let fetch = Arc::new(RepoFetchService::new(NoopFetcher, config.fetch_freshness));
    let feed = Arc::new(WalkerFeed::new(1));

    let mut trust_anchors = Vec::new();
    for tal in &config.trust_anchor_locators {
        match load_trust_anchor(tal) {
            Ok(root) => trust_anchors.push(root),
            Err(err) => tracing::warn!(tal = %tal.display(), error = %err, "skipping trust anchor"),
        }
    }
    if trust_anchors.is_empty() {
        tracing::warn!("no trust anchors configured; serving an empty RTR feed until one is added");
    }

    tokio::spawn(run_walks(store, fetch, trust_anchors, feed.clone()));

    let listener = TcpListener::bind(config.rtr_listen)
        .await
        .with_context(|| format!("binding RTR listener on {}", config.rtr_listen))?;
    let feed: Arc<dyn VrpFeed> = feed;
    server::serve(listener, feed).await.context("RTR server loop exited")?;

    Ok(())
}
