//! Category-agnostic item projections returned by the media item queries.
//!
//! Every category table maps onto these three shapes; columns a category
//! lacks come back as `NULL` and surface here as `None`.

use serde::Serialize;
use sqlx::FromRow;
use vitrine_core::types::{DbId, Timestamp};

/// Full display summary of one item.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ItemSummary {
    pub id: DbId,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Minimal title + image projection of one item.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ItemCard {
    pub id: DbId,
    pub title: String,
    pub image_url: Option<String>,
}

/// One entry in an admin picker listing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SelectableOption {
    pub id: DbId,
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
}
