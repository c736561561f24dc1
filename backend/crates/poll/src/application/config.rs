//! Application Configuration
//!
//! Configuration for the poll application layer.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{PollError, PollResult};

/// Which store backs the poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    /// Process-local, lost on restart
    Memory,
    /// Remote key/value service
    Redis { url: String },
}

/// Poll application configuration
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub backend: BackendKind,
    /// Bound on each remote store call
    pub remote_timeout: Duration,
    /// One login per line
    pub roster_logins_path: PathBuf,
    /// One display name per line, aligned with the logins file
    pub roster_names_path: PathBuf,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            remote_timeout: Duration::from_secs(2),
            roster_logins_path: PathBuf::from("/speakers"),
            roster_names_path: PathBuf::from("/speakernames"),
        }
    }
}

impl PollConfig {
    /// Read the configuration from the process environment.
    ///
    /// - `POLL_STORE`: `memory` or `redis`; defaults to `redis` when
    ///   `REDIS_URL` is set and `memory` otherwise
    /// - `REDIS_URL`: `redis://host:port` or a bare `host:port`
    /// - `REDIS_TIMEOUT_MS`: per-call timeout in milliseconds
    /// - `ROSTER_LOGINS_PATH`, `ROSTER_NAMES_PATH`
    pub fn from_env() -> PollResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any variable lookup.
    pub fn from_lookup<F>(lookup: F) -> PollResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let redis_url = var("REDIS_URL").map(|url| normalize_redis_url(&url));
        let backend = match var("POLL_STORE").map(|kind| kind.to_ascii_lowercase()) {
            None => match redis_url {
                Some(url) => BackendKind::Redis { url },
                None => BackendKind::Memory,
            },
            Some(kind) if kind == "memory" => BackendKind::Memory,
            Some(kind) if kind == "redis" => BackendKind::Redis {
                url: redis_url
                    .ok_or_else(|| PollError::Config("POLL_STORE=redis requires REDIS_URL".into()))?,
            },
            Some(other) => {
                return Err(PollError::Config(format!(
                    "POLL_STORE must be `memory` or `redis`, got `{other}`"
                )));
            }
        };

        let remote_timeout = match var("REDIS_TIMEOUT_MS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    return Err(PollError::Config(format!(
                        "REDIS_TIMEOUT_MS must be a positive integer, got `{raw}`"
                    )));
                }
            },
            None => defaults.remote_timeout,
        };

        Ok(Self {
            backend,
            remote_timeout,
            roster_logins_path: var("ROSTER_LOGINS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.roster_logins_path),
            roster_names_path: var("ROSTER_NAMES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.roster_names_path),
        })
    }

    /// Config for tests and local development
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn remote_timeout_ms(&self) -> u64 {
        self.remote_timeout.as_millis() as u64
    }
}

fn normalize_redis_url(raw: &str) -> String {
    if raw.contains("://") {
        raw.to_string()
    } else {
        format!("redis://{raw}")
    }
}
