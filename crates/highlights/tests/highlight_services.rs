//! Integration tests for the highlight and spotlight services against a
//! real database:
//! - Provider reads over seeded item tables (soft-delete filtering,
//!   random pick exclusion)
//! - Registry enrichment and batch-update atomicity
//! - Spotlight override precedence, expiry, and automatic rotation

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use chrono::Utc;
use sqlx::PgPool;
use vitrine_core::categories::{CATEGORY_MOVIE, DEFAULT_CATEGORIES};
use vitrine_db::models::highlight::SelectionChange;
use vitrine_highlights::{
    HighlightError, HighlightRegistry, ProviderRegistry, SpotlightError, SpotlightResolver,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn insert_movie(pool: &PgPool, title: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO movies (title, director) VALUES ($1, 'PTA') RETURNING id")
        .bind(title)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn soft_delete_movie(pool: &PgPool, id: i64) {
    sqlx::query("UPDATE movies SET is_deleted = true WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .unwrap();
}

fn registry(pool: &PgPool) -> HighlightRegistry {
    HighlightRegistry::new(pool.clone(), Arc::new(ProviderRegistry::with_defaults(pool)))
}

fn resolver(pool: &PgPool) -> SpotlightResolver {
    SpotlightResolver::new(pool.clone(), Arc::new(ProviderRegistry::with_defaults(pool)))
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn provider_card_is_none_for_soft_deleted_items(pool: PgPool) {
    let providers = ProviderRegistry::with_defaults(&pool);
    let movies = providers.get(CATEGORY_MOVIE).unwrap();

    let id = insert_movie(&pool, "Magnolia").await;
    assert_eq!(movies.card(id).await.unwrap().unwrap().title, "Magnolia");

    soft_delete_movie(&pool, id).await;
    assert!(movies.card(id).await.unwrap().is_none());
    assert!(movies.summary(id).await.unwrap().is_none());
    assert!(movies.options().await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn random_pick_respects_exclusions(pool: PgPool) {
    let providers = ProviderRegistry::with_defaults(&pool);
    let movies = providers.get(CATEGORY_MOVIE).unwrap();

    let a = insert_movie(&pool, "a").await;
    let b = insert_movie(&pool, "b").await;
    let c = insert_movie(&pool, "c").await;

    let picked = movies.pick_random_excluding(&[a, b]).await.unwrap();
    assert_eq!(picked, Some(c));

    // Everything excluded: no candidate.
    let picked = movies.pick_random_excluding(&[a, b, c]).await.unwrap();
    assert_eq!(picked, None);
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn list_all_reports_stale_ids_without_repairing_them(pool: PgPool) {
    let registry = registry(&pool);
    registry.ensure_defaults(DEFAULT_CATEGORIES).await.unwrap();

    let id = insert_movie(&pool, "Magnolia").await;
    registry.set_selection(CATEGORY_MOVIE, Some(id)).await.unwrap();
    soft_delete_movie(&pool, id).await;

    let views = registry.list_all().await.unwrap();
    let movie = views.iter().find(|v| v.category == CATEGORY_MOVIE).unwrap();
    // The stored id survives; only the display data goes missing.
    assert_eq!(movie.selected_item_id, Some(id));
    assert_eq!(movie.title, None);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn set_selection_rejects_unknown_categories(pool: PgPool) {
    let registry = registry(&pool);
    registry.ensure_defaults(DEFAULT_CATEGORIES).await.unwrap();

    let err = registry.set_selection("podcast", Some(1)).await.unwrap_err();
    assert_matches!(err, HighlightError::UnknownCategory(c) if c == "podcast");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn batch_update_rolls_back_entirely_on_unknown_category(pool: PgPool) {
    let registry = registry(&pool);
    registry.ensure_defaults(DEFAULT_CATEGORIES).await.unwrap();

    let id = insert_movie(&pool, "Magnolia").await;
    registry.set_selection(CATEGORY_MOVIE, Some(id)).await.unwrap();

    let changes = vec![
        SelectionChange {
            category: CATEGORY_MOVIE.to_string(),
            item_id: None,
        },
        SelectionChange {
            category: "podcast".to_string(),
            item_id: Some(99),
        },
    ];
    let err = registry.set_selections_batch(&changes).await.unwrap_err();
    assert_matches!(err, HighlightError::UnknownCategory(_));

    // The valid change in the batch must not have been applied.
    let current = registry.current_selection(CATEGORY_MOVIE).await.unwrap();
    assert_eq!(current, Some(id));
}

// ---------------------------------------------------------------------------
// Spotlight
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn manual_override_takes_immediate_precedence_and_expires(pool: PgPool) {
    let resolver = resolver(&pool);

    // Week-long rotation entry for the only movie so far.
    insert_movie(&pool, "rotated").await;
    resolver
        .rotate(CATEGORY_MOVIE, Duration::from_secs(7 * 24 * 3600))
        .await
        .unwrap()
        .unwrap();

    let featured = insert_movie(&pool, "featured").await;
    let end = Utc::now() + chrono::Duration::hours(1);
    resolver
        .set_manual_override(CATEGORY_MOVIE, featured, end)
        .await
        .unwrap();

    let active = resolver.active(CATEGORY_MOVIE).await.unwrap().unwrap();
    assert_eq!(active.entry.item_id, featured);
    assert!(active.entry.is_manual);

    // Resolve against a simulated clock past the override's end: the
    // longer-lived rotation entry wins again.
    let after_expiry = end + chrono::Duration::minutes(1);
    let active = resolver
        .active_at(CATEGORY_MOVIE, after_expiry)
        .await
        .unwrap()
        .unwrap();
    assert!(!active.entry.is_manual);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn override_end_date_must_be_in_the_future(pool: PgPool) {
    let resolver = resolver(&pool);
    let id = insert_movie(&pool, "Magnolia").await;

    let err = resolver
        .set_manual_override(CATEGORY_MOVIE, id, Utc::now() - chrono::Duration::minutes(1))
        .await
        .unwrap_err();
    assert_matches!(err, SpotlightError::EndDateNotInFuture(_));

    // Nothing was appended.
    assert!(resolver.history(CATEGORY_MOVIE).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn rotation_skips_recently_featured_items(pool: PgPool) {
    let resolver = resolver(&pool);
    let a = insert_movie(&pool, "a").await;
    let b = insert_movie(&pool, "b").await;

    let first = resolver
        .rotate(CATEGORY_MOVIE, Duration::from_secs(3600))
        .await
        .unwrap()
        .unwrap();
    let second = resolver
        .rotate(CATEGORY_MOVIE, Duration::from_secs(3600))
        .await
        .unwrap()
        .unwrap();
    assert_ne!(first, second);

    let history = resolver.history(CATEGORY_MOVIE).await.unwrap();
    let featured: Vec<_> = history.iter().map(|h| h.entry.item_id).collect();
    assert!(featured.contains(&a));
    assert!(featured.contains(&b));

    // Both movies are now recently featured: rotation has no candidate
    // left and appends nothing.
    let third = resolver
        .rotate(CATEGORY_MOVIE, Duration::from_secs(3600))
        .await
        .unwrap();
    assert_eq!(third, None);
    assert_eq!(resolver.history(CATEGORY_MOVIE).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn history_flags_exactly_one_active_entry(pool: PgPool) {
    let resolver = resolver(&pool);
    let a = insert_movie(&pool, "a").await;
    let b = insert_movie(&pool, "b").await;

    let end = Utc::now() + chrono::Duration::hours(1);
    resolver.set_manual_override(CATEGORY_MOVIE, a, end).await.unwrap();
    resolver.set_manual_override(CATEGORY_MOVIE, b, end).await.unwrap();

    let history = resolver.history(CATEGORY_MOVIE).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history.iter().filter(|h| h.is_active).count(), 1);
    // Newest first, and the later-starting override is the active one.
    assert!(history[0].is_active);
    assert_eq!(history[0].entry.item_id, b);
    assert_eq!(history[0].item.as_ref().unwrap().title, "b");
}
