//! Repository for the `highlight_selections` table.

use sqlx::{PgPool, Postgres};
use vitrine_core::types::DbId;

use crate::models::highlight::HighlightSelection;

/// Column list for `highlight_selections` queries.
const COLUMNS: &str = "id, category, selected_item_id, display_order, created_at, updated_at";

/// Provides CRUD operations for highlight selections.
pub struct HighlightSelectionRepo;

impl HighlightSelectionRepo {
    /// Idempotently insert the row for a category with an empty slot.
    ///
    /// Returns `true` if a row was inserted, `false` if the category
    /// already had one.
    pub async fn ensure_exists(
        pool: &PgPool,
        category: &str,
        display_order: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO highlight_selections (category, selected_item_id, display_order) \
             VALUES ($1, NULL, $2) \
             ON CONFLICT (category) DO NOTHING",
        )
        .bind(category)
        .bind(display_order)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List all selections in homepage display order.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<HighlightSelection>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM highlight_selections ORDER BY display_order, category");
        sqlx::query_as::<_, HighlightSelection>(&query)
            .fetch_all(pool)
            .await
    }

    /// Fetch the selection row for one category.
    pub async fn get_by_category(
        pool: &PgPool,
        category: &str,
    ) -> Result<Option<HighlightSelection>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM highlight_selections WHERE category = $1");
        sqlx::query_as::<_, HighlightSelection>(&query)
            .bind(category)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the selected item for a category (last-write-wins).
    ///
    /// `item_id = None` clears the slot. Returns `true` when a row for the
    /// category existed and was updated.
    pub async fn set_selection<'e, E>(
        executor: E,
        category: &str,
        item_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE highlight_selections \
             SET selected_item_id = $2, updated_at = NOW() \
             WHERE category = $1",
        )
        .bind(category)
        .bind(item_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
