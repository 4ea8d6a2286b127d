use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{anyhow, Context};
use quotekeeper_core::quotes::DEFAULT_SYNC_INTERVAL_SECS;

/// What the server does with conflicts after the server-wins merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Remote data is final.
    #[default]
    ServerWins,
    /// Remote data is applied, but conflicts are queued so a user can restore
    /// the local version.
    Manual,
}

impl FromStr for ConflictPolicy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "serverwins" | "server-wins" | "server_wins" => Ok(Self::ServerWins),
            "manual" => Ok(Self::Manual),
            other => Err(anyhow!("Unknown conflict policy '{}'", other)),
        }
    }
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub remote_url: Option<String>,
    pub remote_token: Option<String>,
    /// None disables the background scheduler.
    pub sync_interval: Option<Duration>,
    /// Run one cycle as soon as the scheduler starts instead of after the
    /// first full interval.
    pub sync_on_start: bool,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub conflict_policy: ConflictPolicy,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let listen_addr: SocketAddr = lookup("QK_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid QK_LISTEN_ADDR")?;
        let data_dir = lookup("QK_DATA_DIR").unwrap_or_else(|| "./data".into());
        let remote_url = lookup("QK_REMOTE_URL").filter(|url| !url.trim().is_empty());
        let remote_token = lookup("QK_REMOTE_TOKEN").filter(|token| !token.is_empty());
        let interval_secs: u64 = match lookup("QK_SYNC_INTERVAL_SECS") {
            Some(raw) => raw.trim().parse().context("Invalid QK_SYNC_INTERVAL_SECS")?,
            None => DEFAULT_SYNC_INTERVAL_SECS,
        };
        let sync_on_start = match lookup("QK_SYNC_ON_START") {
            Some(raw) => parse_flag(&raw).context("Invalid QK_SYNC_ON_START")?,
            None => true,
        };
        let cors_allow = lookup("QK_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = lookup("QK_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|| "30000".into())
            .parse()
            .unwrap_or(30000);
        let conflict_policy = match lookup("QK_CONFLICT_POLICY") {
            Some(raw) => raw.parse()?,
            None => ConflictPolicy::default(),
        };

        Ok(Self {
            listen_addr,
            data_dir: PathBuf::from(data_dir),
            remote_url,
            remote_token,
            sync_interval: (interval_secs > 0).then(|| Duration::from_secs(interval_secs)),
            sync_on_start,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            conflict_policy,
        })
    }
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("expected a boolean, got '{}'", other)),
    }
}
