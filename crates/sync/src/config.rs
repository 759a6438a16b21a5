//! Sync worker configuration.

use std::time::Duration;

/// Default tick period.
const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Default archival fetch size per tick.
const DEFAULT_BATCH_SIZE: u32 = 20;

/// Configuration for the music sync worker.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the listening-history API.
    pub api_url: String,
    /// Optional bearer token for the listening-history API.
    pub api_token: Option<String>,
    /// Tick period (defaults to 60 s).
    pub interval: Duration,
    /// Maximum events fetched per archival sync (defaults to 20).
    pub batch_size: u32,
}

impl SyncConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `LISTEN_API_URL` is not set, signalling that the
    /// listening sync is not configured and should not be started.
    ///
    /// | Variable             | Required | Default |
    /// |----------------------|----------|---------|
    /// | `LISTEN_API_URL`     | yes      | —       |
    /// | `LISTEN_API_TOKEN`   | no       | —       |
    /// | `SYNC_INTERVAL_SECS` | no       | `60`    |
    /// | `SYNC_BATCH_SIZE`    | no       | `20`    |
    pub fn from_env() -> Option<Self> {
        let api_url = std::env::var("LISTEN_API_URL").ok()?;
        Some(Self {
            api_url,
            api_token: std::env::var("LISTEN_API_TOKEN").ok(),
            interval: Duration::from_secs(
                std::env::var("SYNC_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_INTERVAL_SECS),
            ),
            batch_size: std::env::var("SYNC_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_BATCH_SIZE),
        })
    }
}
