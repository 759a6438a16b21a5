//! Outbox worker configuration.

use std::time::Duration;

/// Default queue poll period.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default delivery attempts per message.
const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default delay between delivery attempts.
const DEFAULT_RETRY_DELAY_SECS: u64 = 30;

/// Configuration for the notification outbox worker.
#[derive(Debug, Clone)]
pub struct OutboxConfig {
    /// How often the worker polls the queue when it is empty.
    pub poll_interval: Duration,
    /// Delivery attempts before a message is dropped (defaults to 5).
    pub max_attempts: u32,
    /// Delay between delivery attempts (defaults to 30 s).
    pub retry_delay: Duration,
}

impl OutboxConfig {
    /// Load configuration from environment variables.
    ///
    /// Every variable has a default, so this always succeeds.
    ///
    /// | Variable                    | Default |
    /// |-----------------------------|---------|
    /// | `OUTBOX_POLL_INTERVAL_SECS` | `5`     |
    /// | `OUTBOX_MAX_ATTEMPTS`       | `5`     |
    /// | `OUTBOX_RETRY_DELAY_SECS`   | `30`    |
    pub fn from_env() -> Self {
        Self {
            poll_interval: Duration::from_secs(
                std::env::var("OUTBOX_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            ),
            max_attempts: std::env::var("OUTBOX_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_ATTEMPTS),
            retry_delay: Duration::from_secs(
                std::env::var("OUTBOX_RETRY_DELAY_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_RETRY_DELAY_SECS),
            ),
        }
    }
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
        }
    }
}
