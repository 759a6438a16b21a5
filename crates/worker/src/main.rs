//! Background-worker binary.
//!
//! Hosts the music sync worker and the notification outbox worker in one
//! process. Either worker can be disabled by leaving its configuration
//! unset; the process still starts and runs whatever is configured.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrine_core::categories::DEFAULT_CATEGORIES;
use vitrine_events::{BusInvalidator, CacheInvalidator, EventBus};
use vitrine_highlights::{HighlightRegistry, ProviderRegistry};
use vitrine_outbox::{
    EmailConfig, NotificationOutboxWorker, OutboxConfig, PgContactStore, PgOutboxQueue, SmtpMailer,
};
use vitrine_sync::{now_playing_channel, ListenApiClient, MusicSyncWorker, PgMusicStore, SyncConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitrine_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let pool = vitrine_db::connect(&database_url).await?;
    sqlx::migrate!("../db/migrations").run(&pool).await?;
    vitrine_db::health_check(&pool).await?;
    tracing::info!("Database connected and migrated");

    let providers = Arc::new(ProviderRegistry::with_defaults(&pool));
    let registry = HighlightRegistry::new(pool.clone(), providers);
    registry.ensure_defaults(DEFAULT_CATEGORIES).await?;

    let bus = Arc::new(EventBus::default());
    let invalidator: Arc<dyn CacheInvalidator> = Arc::new(BusInvalidator::new(bus.clone()));

    let cancel = CancellationToken::new();
    let mut handles = Vec::new();

    // Receiver side is served to read paths in the web process; the worker
    // binary only keeps it alive so publishes are observable.
    let (now_playing_tx, _now_playing_rx) = now_playing_channel();

    match SyncConfig::from_env() {
        Some(config) => {
            let source = ListenApiClient::new(config.api_url.clone(), config.api_token.clone());
            let worker = MusicSyncWorker::new(
                source,
                PgMusicStore::new(pool.clone()),
                registry,
                invalidator.clone(),
                now_playing_tx,
                config,
            );
            let token = cancel.clone();
            handles.push(tokio::spawn(async move { worker.run(token).await }));
            tracing::info!("Music sync worker started");
        }
        None => {
            tracing::warn!("LISTEN_API_URL not set, music sync disabled");
        }
    }

    match EmailConfig::from_env() {
        Some(email_config) => {
            let worker = NotificationOutboxWorker::new(
                PgOutboxQueue::new(pool.clone()),
                PgContactStore::new(pool.clone()),
                SmtpMailer::new(email_config),
                OutboxConfig::from_env(),
            );
            let token = cancel.clone();
            handles.push(tokio::spawn(async move { worker.run(token).await }));
            tracing::info!("Notification outbox worker started");
        }
        None => {
            tracing::warn!("SMTP not configured, notification outbox disabled");
        }
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, stopping workers");
    cancel.cancel();
    for handle in handles {
        let _ = handle.await;
    }
    tracing::info!("Worker shut down cleanly");
    Ok(())
}
