//! Spotlight resolver: time-windowed featured picks per category.
//!
//! The `spotlight_entries` history is append-only. A manual override or an
//! automatic rotation both just append a new entry; which entry is "active"
//! is recomputed from the windows and the clock on every read, so there is
//! no current-pointer column to drift out of sync.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use vitrine_core::spotlight::{pick_active, validate_override_window};
use vitrine_core::types::{DbId, Timestamp};
use vitrine_db::models::item::{ItemCard, ItemSummary};
use vitrine_db::models::spotlight::SpotlightEntry;
use vitrine_db::repositories::SpotlightEntryRepo;
use vitrine_db::DbPool;

use crate::provider::ProviderRegistry;

/// How many of the latest entries' item ids are excluded from an automatic
/// rotation pick, to avoid featuring the same item twice in a row.
const ROTATION_EXCLUDE_RECENT: i64 = 5;

/// Errors from the spotlight resolver.
#[derive(Debug, thiserror::Error)]
pub enum SpotlightError {
    #[error("Unknown spotlight category: {0}")]
    UnknownCategory(String),

    /// A manual override must end after the instant it starts.
    #[error("Override end date is not in the future: {0}")]
    EndDateNotInFuture(String),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// The currently active entry for a category, resolved to display data.
///
/// `item` is `None` when the featured item was soft-deleted after the
/// entry was appended; the entry itself still wins its window.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveSpotlight {
    pub entry: SpotlightEntry,
    pub item: Option<ItemSummary>,
}

/// One history row, flagged with whether it is the active entry right now.
#[derive(Debug, Clone, Serialize)]
pub struct SpotlightHistoryEntry {
    pub entry: SpotlightEntry,
    pub is_active: bool,
    pub item: Option<ItemCard>,
}

/// Resolves and mutates the per-category spotlight history.
pub struct SpotlightResolver {
    pool: DbPool,
    providers: Arc<ProviderRegistry>,
}

impl SpotlightResolver {
    pub fn new(pool: DbPool, providers: Arc<ProviderRegistry>) -> Self {
        Self { pool, providers }
    }

    fn provider_for(
        &self,
        category: &str,
    ) -> Result<&Arc<dyn crate::provider::ItemProvider>, SpotlightError> {
        self.providers
            .get(category)
            .ok_or_else(|| SpotlightError::UnknownCategory(category.to_string()))
    }

    /// The active entry for a category, or `None` when no window covers
    /// now (callers fall back to a default).
    pub async fn active(&self, category: &str) -> Result<Option<ActiveSpotlight>, SpotlightError> {
        self.active_at(category, Utc::now()).await
    }

    /// Like [`active`](Self::active) with an explicit instant, so callers
    /// (and tests) can resolve against a simulated clock.
    pub async fn active_at(
        &self,
        category: &str,
        now: Timestamp,
    ) -> Result<Option<ActiveSpotlight>, SpotlightError> {
        let provider = self.provider_for(category)?;

        let Some(entry) = SpotlightEntryRepo::active(&self.pool, category, now).await? else {
            return Ok(None);
        };
        let item = provider.summary(entry.item_id).await?;
        Ok(Some(ActiveSpotlight { entry, item }))
    }

    /// Full history for a category, newest first, each entry flagged with
    /// whether it is the single currently active one.
    pub async fn history(
        &self,
        category: &str,
    ) -> Result<Vec<SpotlightHistoryEntry>, SpotlightError> {
        let provider = self.provider_for(category)?;
        let entries = SpotlightEntryRepo::history(&self.pool, category).await?;

        let now = Utc::now();
        let windows: Vec<_> = entries.iter().map(|e| e.window()).collect();
        let active_index = pick_active(&windows, now);

        let ids: Vec<DbId> = entries.iter().map(|e| e.item_id).collect();
        let mut cards = provider.cards_batch(&ids).await?;

        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| SpotlightHistoryEntry {
                is_active: Some(index) == active_index,
                item: cards.remove(&entry.item_id),
                entry,
            })
            .collect())
    }

    /// Append a manual override starting now and ending at `end_date`.
    ///
    /// Prior entries are neither deleted nor shortened — they simply stop
    /// winning resolution while the override's window is the latest one.
    pub async fn set_manual_override(
        &self,
        category: &str,
        item_id: DbId,
        end_date: Timestamp,
    ) -> Result<DbId, SpotlightError> {
        self.provider_for(category)?;

        let now = Utc::now();
        validate_override_window(now, end_date).map_err(SpotlightError::EndDateNotInFuture)?;

        let entry_id =
            SpotlightEntryRepo::insert(&self.pool, category, item_id, now, end_date, true).await?;
        tracing::info!(category, item_id, entry_id, %end_date, "Manual spotlight override set");
        Ok(entry_id)
    }

    /// Append an automatic rotation entry covering `window` from now.
    ///
    /// The pick excludes recently featured item ids; when the category is
    /// empty after exclusion, nothing is appended.
    pub async fn rotate(
        &self,
        category: &str,
        window: Duration,
    ) -> Result<Option<DbId>, SpotlightError> {
        let provider = self.provider_for(category)?;

        let recent =
            SpotlightEntryRepo::recent_item_ids(&self.pool, category, ROTATION_EXCLUDE_RECENT)
                .await?;
        let excluded: Vec<DbId> = recent.into_iter().collect::<HashSet<_>>().into_iter().collect();

        let Some(item_id) = provider.pick_random_excluding(&excluded).await? else {
            tracing::info!(category, "No rotation candidate after exclusion, skipping");
            return Ok(None);
        };

        let now = Utc::now();
        let end_date = now + chrono::Duration::from_std(window).unwrap_or(chrono::Duration::days(7));
        let entry_id =
            SpotlightEntryRepo::insert(&self.pool, category, item_id, now, end_date, false).await?;
        tracing::info!(category, item_id, entry_id, "Rotated spotlight");
        Ok(Some(entry_id))
    }
}
