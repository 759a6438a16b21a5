//! Music archive record models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vitrine_core::types::{DbId, Timestamp};

/// A row from the `music_records` table.
///
/// `external_id` is the third-party dedupe key; a given external listening
/// event maps to at most one row. The most recent
/// `updated_at ?? created_at` across non-deleted rows is the sync cursor.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MusicRecord {
    pub id: DbId,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub external_id: String,
    pub consumed_year: Option<i32>,
    pub image_url: Option<String>,
    pub is_deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

impl MusicRecord {
    /// The timestamp this record contributes to the sync cursor.
    pub fn cursor_timestamp(&self) -> Timestamp {
        self.updated_at.unwrap_or(self.created_at)
    }
}

/// DTO for upserting a record from an external listening event.
///
/// `listened_at` becomes the row's `created_at` (insert) or `updated_at`
/// (refresh), so the sync cursor tracks external event time rather than
/// local ingestion time.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertMusicRecord {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub external_id: String,
    pub consumed_year: Option<i32>,
    pub listened_at: Timestamp,
}

/// Outcome of an upsert keyed on `external_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub id: DbId,
    /// `true` when the upsert inserted a new row rather than refreshing an
    /// existing one.
    pub created: bool,
}
