//! Item provider abstraction.
//!
//! [`ItemProvider`] is the uniform capability set the highlight services
//! use over heterogeneous item stores: random pick for rotation, display
//! lookups, and admin picker enumeration. Providers are read-only; "not
//! found" and "soft-deleted" come back as `None`/absent rather than errors,
//! while storage failures propagate unchanged.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use vitrine_core::categories;
use vitrine_core::types::DbId;
use vitrine_db::models::item::{ItemCard, ItemSummary, SelectableOption};
use vitrine_db::repositories::media_item_repo::{self, CategoryTable, MediaItemRepo};
use vitrine_db::DbPool;

/// Uniform read capabilities over one category's item store.
#[async_trait]
pub trait ItemProvider: Send + Sync {
    /// The category key this provider serves.
    fn category(&self) -> &'static str;

    /// A uniformly random non-deleted item id outside `excluded`, or
    /// `None` when the category is empty after exclusion.
    async fn pick_random_excluding(&self, excluded: &[DbId]) -> Result<Option<DbId>, sqlx::Error>;

    /// Full display summary; `None` for unknown or soft-deleted ids.
    async fn summary(&self, id: DbId) -> Result<Option<ItemSummary>, sqlx::Error>;

    /// Title + image; `None` for unknown or soft-deleted ids.
    async fn card(&self, id: DbId) -> Result<Option<ItemCard>, sqlx::Error>;

    /// Title + image for a set of ids; missing ids are absent from the map.
    async fn cards_batch(&self, ids: &[DbId]) -> Result<HashMap<DbId, ItemCard>, sqlx::Error>;

    /// Full enumeration for admin pickers, excluding soft-deleted items.
    async fn options(&self) -> Result<Vec<SelectableOption>, sqlx::Error>;
}

// ---------------------------------------------------------------------------
// Postgres providers
// ---------------------------------------------------------------------------

/// [`ItemProvider`] over one Postgres item table.
///
/// All five categories share this implementation; only the
/// [`CategoryTable`] column mapping differs.
pub struct PgItemProvider {
    pool: DbPool,
    category: &'static str,
    table: CategoryTable,
}

impl PgItemProvider {
    pub fn movies(pool: DbPool) -> Self {
        Self {
            pool,
            category: categories::CATEGORY_MOVIE,
            table: media_item_repo::MOVIES,
        }
    }

    pub fn music(pool: DbPool) -> Self {
        Self {
            pool,
            category: categories::CATEGORY_MUSIC,
            table: media_item_repo::MUSIC,
        }
    }

    pub fn books(pool: DbPool) -> Self {
        Self {
            pool,
            category: categories::CATEGORY_BOOK,
            table: media_item_repo::BOOKS,
        }
    }

    pub fn quotes(pool: DbPool) -> Self {
        Self {
            pool,
            category: categories::CATEGORY_QUOTE,
            table: media_item_repo::QUOTES,
        }
    }

    pub fn games(pool: DbPool) -> Self {
        Self {
            pool,
            category: categories::CATEGORY_GAME,
            table: media_item_repo::GAMES,
        }
    }
}

#[async_trait]
impl ItemProvider for PgItemProvider {
    fn category(&self) -> &'static str {
        self.category
    }

    async fn pick_random_excluding(&self, excluded: &[DbId]) -> Result<Option<DbId>, sqlx::Error> {
        MediaItemRepo::pick_random_excluding(&self.pool, &self.table, excluded).await
    }

    async fn summary(&self, id: DbId) -> Result<Option<ItemSummary>, sqlx::Error> {
        MediaItemRepo::summary(&self.pool, &self.table, id).await
    }

    async fn card(&self, id: DbId) -> Result<Option<ItemCard>, sqlx::Error> {
        MediaItemRepo::card(&self.pool, &self.table, id).await
    }

    async fn cards_batch(&self, ids: &[DbId]) -> Result<HashMap<DbId, ItemCard>, sqlx::Error> {
        MediaItemRepo::cards_batch(&self.pool, &self.table, ids).await
    }

    async fn options(&self) -> Result<Vec<SelectableOption>, sqlx::Error> {
        MediaItemRepo::options(&self.pool, &self.table).await
    }
}

// ---------------------------------------------------------------------------
// ProviderRegistry
// ---------------------------------------------------------------------------

/// Category key → provider map.
///
/// Dispatch is by composition: services hold a registry and look providers
/// up at call time, so a new category is one `register` call away.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<&'static str, Arc<dyn ItemProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the five built-in categories wired to Postgres.
    pub fn with_defaults(pool: &DbPool) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PgItemProvider::movies(pool.clone())));
        registry.register(Arc::new(PgItemProvider::music(pool.clone())));
        registry.register(Arc::new(PgItemProvider::books(pool.clone())));
        registry.register(Arc::new(PgItemProvider::quotes(pool.clone())));
        registry.register(Arc::new(PgItemProvider::games(pool.clone())));
        registry
    }

    /// Register a provider under its own category key.
    pub fn register(&mut self, provider: Arc<dyn ItemProvider>) {
        self.providers.insert(provider.category(), provider);
    }

    /// Look up the provider for a category.
    pub fn get(&self, category: &str) -> Option<&Arc<dyn ItemProvider>> {
        self.providers.get(category)
    }

    /// Whether a category is known to the registry.
    pub fn contains(&self, category: &str) -> bool {
        self.providers.contains_key(category)
    }

    /// All registered category keys.
    pub fn categories(&self) -> Vec<&'static str> {
        self.providers.keys().copied().collect()
    }
}
