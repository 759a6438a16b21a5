//! Category-agnostic queries over the per-category item tables.
//!
//! Each category maps its table onto the shared item projections through a
//! [`CategoryTable`] descriptor. Descriptors are compile-time constants —
//! table and column names never come from user input, so the `format!`-built
//! SQL below is safe.

use std::collections::HashMap;

use sqlx::PgPool;
use vitrine_core::types::DbId;

use crate::models::item::{ItemCard, ItemSummary, SelectableOption};

/// Column mapping for one category's item table.
///
/// Columns a category lacks are `None` and surface as SQL `NULL`.
#[derive(Debug, Clone, Copy)]
pub struct CategoryTable {
    pub table: &'static str,
    pub title_col: &'static str,
    pub subtitle_col: Option<&'static str>,
    pub description_col: Option<&'static str>,
    pub image_col: Option<&'static str>,
}

impl CategoryTable {
    fn col_or_null(col: Option<&'static str>, alias: &str) -> String {
        match col {
            Some(c) => format!("{c} AS {alias}"),
            None => format!("NULL::text AS {alias}"),
        }
    }

    fn summary_columns(&self) -> String {
        format!(
            "id, {} AS title, {}, {}, {}",
            self.title_col,
            Self::col_or_null(self.subtitle_col, "subtitle"),
            Self::col_or_null(self.description_col, "description"),
            Self::col_or_null(self.image_col, "image_url"),
        )
    }

    fn card_columns(&self) -> String {
        format!(
            "id, {} AS title, {}",
            self.title_col,
            Self::col_or_null(self.image_col, "image_url"),
        )
    }

    fn option_columns(&self) -> String {
        format!(
            "id, {} AS title, {}, {}, created_at",
            self.title_col,
            Self::col_or_null(self.subtitle_col, "subtitle"),
            Self::col_or_null(self.image_col, "image_url"),
        )
    }
}

/// Descriptor for the `movies` table.
pub const MOVIES: CategoryTable = CategoryTable {
    table: "movies",
    title_col: "title",
    subtitle_col: Some("director"),
    description_col: Some("description"),
    image_col: Some("image_url"),
};

/// Descriptor for the `music_records` table.
pub const MUSIC: CategoryTable = CategoryTable {
    table: "music_records",
    title_col: "title",
    subtitle_col: Some("artist"),
    description_col: Some("album"),
    image_col: Some("image_url"),
};

/// Descriptor for the `books` table.
pub const BOOKS: CategoryTable = CategoryTable {
    table: "books",
    title_col: "title",
    subtitle_col: Some("author"),
    description_col: Some("description"),
    image_col: Some("image_url"),
};

/// Descriptor for the `quotes` table. Quotes carry no imagery.
pub const QUOTES: CategoryTable = CategoryTable {
    table: "quotes",
    title_col: "content",
    subtitle_col: Some("author"),
    description_col: None,
    image_col: None,
};

/// Descriptor for the `games` table.
pub const GAMES: CategoryTable = CategoryTable {
    table: "games",
    title_col: "title",
    subtitle_col: Some("platform"),
    description_col: Some("description"),
    image_col: Some("image_url"),
};

/// Read-only queries shared by every category's item provider.
pub struct MediaItemRepo;

impl MediaItemRepo {
    /// A uniformly random non-deleted item id outside the exclusion set,
    /// or `None` when the category is empty after exclusion.
    pub async fn pick_random_excluding(
        pool: &PgPool,
        table: &CategoryTable,
        excluded: &[DbId],
    ) -> Result<Option<DbId>, sqlx::Error> {
        let query = format!(
            "SELECT id FROM {} \
             WHERE is_deleted = false AND id <> ALL($1) \
             ORDER BY RANDOM() \
             LIMIT 1",
            table.table
        );
        sqlx::query_scalar(&query)
            .bind(excluded)
            .fetch_optional(pool)
            .await
    }

    /// Full display summary of one non-deleted item.
    pub async fn summary(
        pool: &PgPool,
        table: &CategoryTable,
        id: DbId,
    ) -> Result<Option<ItemSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} WHERE id = $1 AND is_deleted = false",
            table.summary_columns(),
            table.table
        );
        sqlx::query_as::<_, ItemSummary>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Title + image of one non-deleted item.
    pub async fn card(
        pool: &PgPool,
        table: &CategoryTable,
        id: DbId,
    ) -> Result<Option<ItemCard>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} WHERE id = $1 AND is_deleted = false",
            table.card_columns(),
            table.table
        );
        sqlx::query_as::<_, ItemCard>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Title + image for a set of ids; missing or soft-deleted ids are
    /// simply absent from the result map.
    pub async fn cards_batch(
        pool: &PgPool,
        table: &CategoryTable,
        ids: &[DbId],
    ) -> Result<HashMap<DbId, ItemCard>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} WHERE id = ANY($1) AND is_deleted = false",
            table.card_columns(),
            table.table
        );
        let cards = sqlx::query_as::<_, ItemCard>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await?;
        Ok(cards.into_iter().map(|c| (c.id, c)).collect())
    }

    /// Full enumeration for admin pickers, newest first, excluding
    /// soft-deleted items.
    pub async fn options(
        pool: &PgPool,
        table: &CategoryTable,
    ) -> Result<Vec<SelectableOption>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} WHERE is_deleted = false ORDER BY created_at DESC",
            table.option_columns(),
            table.table
        );
        sqlx::query_as::<_, SelectableOption>(&query)
            .fetch_all(pool)
            .await
    }
}
