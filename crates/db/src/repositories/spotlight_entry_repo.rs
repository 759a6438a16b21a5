//! Repository for the append-only `spotlight_entries` table.
//!
//! Rows are only ever inserted; "which entry is active" is recomputed from
//! the windows and the clock on every read.

use sqlx::PgPool;
use vitrine_core::types::{DbId, Timestamp};

use crate::models::spotlight::SpotlightEntry;

/// Column list for `spotlight_entries` queries.
const COLUMNS: &str = "id, category, item_id, start_date, end_date, is_manual, created_at";

/// Provides append/read operations for spotlight entries.
pub struct SpotlightEntryRepo;

impl SpotlightEntryRepo {
    /// Append one entry to a category's history, returning the generated ID.
    pub async fn insert(
        pool: &PgPool,
        category: &str,
        item_id: DbId,
        start_date: Timestamp,
        end_date: Timestamp,
        is_manual: bool,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO spotlight_entries \
                (category, item_id, start_date, end_date, is_manual) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(category)
        .bind(item_id)
        .bind(start_date)
        .bind(end_date)
        .bind(is_manual)
        .fetch_one(pool)
        .await
    }

    /// The entry active at `now` for a category, if any.
    ///
    /// Among entries whose `[start_date, end_date)` window contains `now`,
    /// the latest `start_date` wins, ties broken by `created_at`
    /// descending — the same ordering as
    /// [`vitrine_core::spotlight::pick_active`].
    pub async fn active(
        pool: &PgPool,
        category: &str,
        now: Timestamp,
    ) -> Result<Option<SpotlightEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM spotlight_entries \
             WHERE category = $1 AND start_date <= $2 AND end_date > $2 \
             ORDER BY start_date DESC, created_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, SpotlightEntry>(&query)
            .bind(category)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Full history for a category, newest first.
    pub async fn history(
        pool: &PgPool,
        category: &str,
    ) -> Result<Vec<SpotlightEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM spotlight_entries \
             WHERE category = $1 \
             ORDER BY start_date DESC, created_at DESC"
        );
        sqlx::query_as::<_, SpotlightEntry>(&query)
            .bind(category)
            .fetch_all(pool)
            .await
    }

    /// Item ids of the most recently appended entries for a category
    /// (may contain duplicates; callers dedupe).
    pub async fn recent_item_ids(
        pool: &PgPool,
        category: &str,
        limit: i64,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT item_id FROM spotlight_entries \
             WHERE category = $1 \
             ORDER BY created_at DESC \
             LIMIT $2",
        )
        .bind(category)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
