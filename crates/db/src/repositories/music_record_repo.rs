//! Repository for the `music_records` table.

use sqlx::PgPool;

use crate::models::music::{MusicRecord, UpsertMusicRecord, UpsertOutcome};

/// Column list for `music_records` queries.
const COLUMNS: &str = "id, title, artist, album, external_id, consumed_year, image_url, \
                       is_deleted, created_at, updated_at";

/// Provides read/upsert operations for music archive records.
pub struct MusicRecordRepo;

impl MusicRecordRepo {
    /// The most recently modified non-deleted record.
    ///
    /// Its `updated_at ?? created_at` is the authoritative sync cursor:
    /// external events at or before that instant have already been seen.
    pub async fn latest_modified(pool: &PgPool) -> Result<Option<MusicRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM music_records \
             WHERE is_deleted = false \
             ORDER BY COALESCE(updated_at, created_at) DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, MusicRecord>(&query)
            .fetch_optional(pool)
            .await
    }

    /// Fetch a record by its external dedupe key.
    pub async fn get_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<MusicRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM music_records WHERE external_id = $1");
        sqlx::query_as::<_, MusicRecord>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// Upsert a record keyed on `external_id`.
    ///
    /// An existing row is refreshed in place with `updated_at` set to the
    /// event's listen time; the same external event never produces two
    /// rows. The outcome reports whether a row was newly created.
    pub async fn upsert(
        pool: &PgPool,
        record: &UpsertMusicRecord,
    ) -> Result<UpsertOutcome, sqlx::Error> {
        // `xmax = 0` distinguishes a fresh insert from a conflict-update.
        let (id, created): (i64, bool) = sqlx::query_as(
            "INSERT INTO music_records \
                (title, artist, album, external_id, consumed_year, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (external_id) DO UPDATE SET \
                title = EXCLUDED.title, \
                artist = EXCLUDED.artist, \
                album = EXCLUDED.album, \
                consumed_year = EXCLUDED.consumed_year, \
                updated_at = EXCLUDED.created_at \
             RETURNING id, (xmax = 0) AS created",
        )
        .bind(&record.title)
        .bind(&record.artist)
        .bind(&record.album)
        .bind(&record.external_id)
        .bind(record.consumed_year)
        .bind(record.listened_at)
        .fetch_one(pool)
        .await?;
        Ok(UpsertOutcome { id, created })
    }
}
