//! Highlight registry: one current selection per category.

use std::sync::Arc;

use vitrine_core::types::DbId;
use vitrine_db::models::highlight::{HighlightView, SelectionChange};
use vitrine_db::models::item::SelectableOption;
use vitrine_db::repositories::HighlightSelectionRepo;
use vitrine_db::DbPool;

use crate::provider::ProviderRegistry;

/// Errors from the highlight registry.
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    /// The category has no registered provider (or no selection row).
    #[error("Unknown highlight category: {0}")]
    UnknownCategory(String),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Service holding the single current selection per category.
///
/// Writes are last-write-wins with no optimistic concurrency: the sync
/// worker is the only automated writer (of the "music" slot) and admin
/// changes are human-paced.
pub struct HighlightRegistry {
    pool: DbPool,
    providers: Arc<ProviderRegistry>,
}

impl HighlightRegistry {
    pub fn new(pool: DbPool, providers: Arc<ProviderRegistry>) -> Self {
        Self { pool, providers }
    }

    /// Idempotently seed a selection row (with an empty slot) for every
    /// category that lacks one. Called once at process start.
    pub async fn ensure_defaults(&self, categories: &[&str]) -> Result<(), HighlightError> {
        for (order, category) in categories.iter().enumerate() {
            let inserted =
                HighlightSelectionRepo::ensure_exists(&self.pool, category, order as i32).await?;
            if inserted {
                tracing::info!(category, "Seeded highlight selection row");
            }
        }
        Ok(())
    }

    /// All selections in display order, enriched with title/image from the
    /// matching provider.
    ///
    /// When the stored item no longer resolves (soft-deleted), title and
    /// image are `None` but the stored id is reported untouched — the
    /// registry never auto-repairs a slot.
    pub async fn list_all(&self) -> Result<Vec<HighlightView>, HighlightError> {
        let selections = HighlightSelectionRepo::list_all(&self.pool).await?;

        let mut views = Vec::with_capacity(selections.len());
        for selection in selections {
            let card = match (self.providers.get(&selection.category), selection.selected_item_id)
            {
                (Some(provider), Some(item_id)) => provider.card(item_id).await?,
                _ => None,
            };
            views.push(HighlightView {
                category: selection.category,
                selected_item_id: selection.selected_item_id,
                display_order: selection.display_order,
                title: card.as_ref().map(|c| c.title.clone()),
                image_url: card.and_then(|c| c.image_url),
            });
        }
        Ok(views)
    }

    /// Admin picker options for one category.
    pub async fn list_options(
        &self,
        category: &str,
    ) -> Result<Vec<SelectableOption>, HighlightError> {
        let provider = self
            .providers
            .get(category)
            .ok_or_else(|| HighlightError::UnknownCategory(category.to_string()))?;
        Ok(provider.options().await?)
    }

    /// The currently stored selection for a category, if the slot is filled.
    pub async fn current_selection(&self, category: &str) -> Result<Option<DbId>, HighlightError> {
        let selection = HighlightSelectionRepo::get_by_category(&self.pool, category).await?;
        Ok(selection.and_then(|s| s.selected_item_id))
    }

    /// Overwrite one category's selection. `item_id = None` clears the slot.
    pub async fn set_selection(
        &self,
        category: &str,
        item_id: Option<DbId>,
    ) -> Result<(), HighlightError> {
        if !self.providers.contains(category) {
            return Err(HighlightError::UnknownCategory(category.to_string()));
        }
        let updated = HighlightSelectionRepo::set_selection(&self.pool, category, item_id).await?;
        if !updated {
            return Err(HighlightError::UnknownCategory(category.to_string()));
        }
        tracing::debug!(category, ?item_id, "Highlight selection updated");
        Ok(())
    }

    /// Apply a batch of selection changes atomically.
    ///
    /// Every category is validated up front and the updates run in one
    /// transaction; any unknown category rolls the whole batch back with
    /// nothing applied.
    pub async fn set_selections_batch(
        &self,
        changes: &[SelectionChange],
    ) -> Result<(), HighlightError> {
        for change in changes {
            if !self.providers.contains(&change.category) {
                return Err(HighlightError::UnknownCategory(change.category.clone()));
            }
        }

        let mut tx = self.pool.begin().await?;
        for change in changes {
            let updated =
                HighlightSelectionRepo::set_selection(&mut *tx, &change.category, change.item_id)
                    .await?;
            if !updated {
                tx.rollback().await?;
                return Err(HighlightError::UnknownCategory(change.category.clone()));
            }
        }
        tx.commit().await?;

        tracing::debug!(count = changes.len(), "Applied batch highlight update");
        Ok(())
    }
}
