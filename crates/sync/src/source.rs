//! Adapter over the third-party listening-history API.
//!
//! The API is read-only and returns listening events newest-first; `from`
//! filters to events strictly after that epoch timestamp.

use async_trait::async_trait;
use chrono::{Datelike, TimeZone, Utc};
use serde::Deserialize;
use vitrine_db::models::music::UpsertMusicRecord;

/// Errors from the listening-history source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Listening API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The API answered 2xx but flagged the request as unsuccessful.
    #[error("Listening API rejected the request: {0}")]
    Rejected(String),
}

/// One external listening event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listen {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    /// External dedupe key for this event.
    pub external_id: String,
    /// When the listen happened, epoch seconds.
    pub timestamp_epoch_seconds: i64,
}

impl Listen {
    /// Map this event onto a music archive upsert.
    pub fn to_record(&self) -> UpsertMusicRecord {
        let listened_at = Utc
            .timestamp_opt(self.timestamp_epoch_seconds, 0)
            .single()
            .unwrap_or_else(Utc::now);
        UpsertMusicRecord {
            title: self.title.clone(),
            artist: self.artist.clone(),
            album: self.album.clone(),
            external_id: self.external_id.clone(),
            consumed_year: Some(listened_at.year()),
            listened_at,
        }
    }
}

/// Read-only source of time-ordered listening events.
#[async_trait]
pub trait ListeningSource: Send + Sync {
    /// Up to `limit` events strictly after `from` (epoch seconds),
    /// newest first. `from = None` means "the most recent events".
    async fn recent(&self, limit: u32, from: Option<i64>) -> Result<Vec<Listen>, SourceError>;
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Envelope returned by the `/recent` endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentResponse {
    success: bool,
    message: Option<String>,
    #[serde(default)]
    events: Vec<Listen>,
}

/// HTTP client for the listening-history API.
pub struct ListenApiClient {
    client: reqwest::Client,
    api_url: String,
    api_token: Option<String>,
}

impl ListenApiClient {
    /// Create a new client.
    ///
    /// * `api_url`   - Base HTTP URL, e.g. `https://listens.example.com`.
    /// * `api_token` - Optional bearer token.
    pub fn new(api_url: String, api_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_token,
        }
    }
}

#[async_trait]
impl ListeningSource for ListenApiClient {
    async fn recent(&self, limit: u32, from: Option<i64>) -> Result<Vec<Listen>, SourceError> {
        let mut request = self
            .client
            .get(format!("{}/recent", self.api_url))
            .query(&[("limit", limit.to_string())]);
        if let Some(from) = from {
            request = request.query(&[("from", from.to_string())]);
        }
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: RecentResponse = response.json().await?;
        if !envelope.success {
            return Err(SourceError::Rejected(
                envelope.message.unwrap_or_else(|| "no message".to_string()),
            ));
        }
        Ok(envelope.events)
    }
}
