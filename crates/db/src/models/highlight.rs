//! Highlight selection models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vitrine_core::types::{DbId, Timestamp};

/// A row from the `highlight_selections` table.
///
/// There is at most one row per category. `selected_item_id` points into
/// the category's own item table and is `None` when the slot is cleared.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HighlightSelection {
    pub id: DbId,
    pub category: String,
    pub selected_item_id: Option<DbId>,
    pub display_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One change in a batch highlight update. `item_id = None` clears the slot.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectionChange {
    pub category: String,
    pub item_id: Option<DbId>,
}

/// A highlight selection enriched with display metadata from its provider.
///
/// `title`/`image_url` are `None` when the slot is empty or the stored item
/// has since been soft-deleted; the stored id is reported as-is either way.
#[derive(Debug, Clone, Serialize)]
pub struct HighlightView {
    pub category: String,
    pub selected_item_id: Option<DbId>,
    pub display_order: i32,
    pub title: Option<String>,
    pub image_url: Option<String>,
}
