// This file is part of rpki-rp.
// SPDX-License-Identifier: Apache-2.0

//! Layered configuration: an optional TOML file, overridable by CLI flags,
//! falling back to documented defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

fn default_rtr_listen() -> SocketAddr {
    "0.0.0.0:8323".parse().unwrap()
}

fn default_fetch_freshness() -> Duration {
    Duration::from_secs(600)
}

#[derive(Clone, Debug, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
            json: false,
        }
    }
}

/// The full runtime configuration, deserializable straight off a TOML file.
/// Every field has a default, so an empty (or missing) file is valid.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_rtr_listen")]
    pub rtr_listen: SocketAddr,

    #[serde(default = "default_fetch_freshness", with = "humantime_serde")]
    pub fetch_freshness: Duration,

    #[serde(default)]
    pub trust_anchor_locators: Vec<PathBuf>,

    #[serde(default)]
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rtr_listen: default_rtr_listen(),
            fetch_freshness: default_fetch_freshness(),
            trust_anchor_locators: Vec::new(),
            log: LogConfig::default(),
        }
    }
}

/// CLI flags. Every field is optional — `None` means "defer to the config
/// file, or the built-in default if the file doesn't say either".
#[derive(Parser, Debug)]
#[command(name = "rpki-rp", about = "RPKI relying-party validator core")]
pub struct CliArgs {
    /// Path to a TOML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Address the RTR server listens on.
    #[arg(long)]
    pub rtr_listen: Option<SocketAddr>,

    /// How long a repository fetch stays "fresh" before it's revisited.
    #[arg(long, value_parser = humantime::parse_duration)]
    pub fetch_freshness: Option<Duration>,

    /// A trust anchor locator or certificate file. Repeatable.
    #[arg(long = "tal")]
    pub trust_anchor_locators: Vec<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long)]
    pub log_json: bool,
}

impl Config {
    /// Loads the file at `path` if given, then layers `args` on top — CLI
    /// flags always win over file values, file values always win over
    /// built-in defaults.
    pub fn load(args: &CliArgs) -> anyhow::Result<Config> {
        let mut config = match &args.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .map_err(|err| anyhow::anyhow!("reading config file {}: {err}", path.display()))?;
                toml::from_str(&raw).map_err(|err| anyhow::anyhow!("parsing config file {}: {err}", path.display()))?
            }
            None => Config::default(),
        };

        if let Some(rtr_listen) = args.rtr_listen {
            config.rtr_listen = rtr_listen;
        }
        if let Some(fetch_freshness) = args.fetch_freshness {
            config.fetch_freshness = fetch_freshness;
        }
        if !args.trust_anchor_locators.is_empty() {
            config.trust_anchor_locators = args.trust_anchor_locators.clone();
        }
        if let Some(level) = &args.log_level {
            config.log.level = level.clone();
        }
        if args.log_json {
            config.log.json = true;
        }

        Ok(config)
    }
}
