//! Spotlight entry models.

use serde::Serialize;
use sqlx::FromRow;
use vitrine_core::spotlight::Window;
use vitrine_core::types::{DbId, Timestamp};

/// A row from the append-only `spotlight_entries` table.
///
/// Entries are never updated or deleted; a newer entry supersedes an older
/// one purely by having a later `start_date`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SpotlightEntry {
    pub id: DbId,
    pub category: String,
    pub item_id: DbId,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub is_manual: bool,
    pub created_at: Timestamp,
}

impl SpotlightEntry {
    /// The resolution-relevant window fields of this entry.
    pub fn window(&self) -> Window {
        Window {
            start_date: self.start_date,
            end_date: self.end_date,
            created_at: self.created_at,
        }
    }
}
