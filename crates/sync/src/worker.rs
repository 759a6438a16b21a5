//! Periodic music sync worker.
//!
//! Each tick runs two independent phases: a live now-playing refresh and
//! the archival sync against the listening-history API. A failure in one
//! phase is logged and never aborts the other phase or the loop.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use vitrine_core::categories::CATEGORY_MUSIC;
use vitrine_core::types::{DbId, Timestamp};
use vitrine_db::models::music::{UpsertMusicRecord, UpsertOutcome};
use vitrine_db::repositories::MusicRecordRepo;
use vitrine_db::DbPool;
use vitrine_events::{CacheInvalidator, TAG_HIGHLIGHTS};
use vitrine_highlights::{HighlightError, HighlightRegistry};

use crate::config::SyncConfig;
use crate::now_playing::NowPlaying;
use crate::source::{ListeningSource, SourceError};

/// Errors from one sync phase.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Db(#[from] sqlx::Error),

    #[error(transparent)]
    Highlight(#[from] HighlightError),
}

// ---------------------------------------------------------------------------
// Store seams
// ---------------------------------------------------------------------------

/// The music archive as the sync worker sees it.
#[async_trait]
pub trait MusicStore: Send + Sync {
    /// The sync cursor: `updated_at ?? created_at` of the most recently
    /// modified non-deleted record, or `None` before the first ingest.
    async fn cursor(&self) -> Result<Option<Timestamp>, sqlx::Error>;

    /// Upsert one external event, keyed on its dedupe key.
    async fn upsert(&self, record: &UpsertMusicRecord) -> Result<UpsertOutcome, sqlx::Error>;
}

/// Postgres-backed [`MusicStore`].
pub struct PgMusicStore {
    pool: DbPool,
}

impl PgMusicStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MusicStore for PgMusicStore {
    async fn cursor(&self) -> Result<Option<Timestamp>, sqlx::Error> {
        let latest = MusicRecordRepo::latest_modified(&self.pool).await?;
        Ok(latest.map(|r| r.cursor_timestamp()))
    }

    async fn upsert(&self, record: &UpsertMusicRecord) -> Result<UpsertOutcome, sqlx::Error> {
        MusicRecordRepo::upsert(&self.pool, record).await
    }
}

/// The "music" highlight slot as the sync worker sees it.
#[async_trait]
pub trait HighlightStore: Send + Sync {
    async fn current_music_selection(&self) -> Result<Option<DbId>, HighlightError>;
    async fn set_music_selection(&self, item_id: DbId) -> Result<(), HighlightError>;
}

#[async_trait]
impl HighlightStore for HighlightRegistry {
    async fn current_music_selection(&self) -> Result<Option<DbId>, HighlightError> {
        self.current_selection(CATEGORY_MUSIC).await
    }

    async fn set_music_selection(&self, item_id: DbId) -> Result<(), HighlightError> {
        self.set_selection(CATEGORY_MUSIC, Some(item_id)).await
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// Background worker that reconciles the music archive against the
/// third-party listening history and cascades changes into the highlight
/// system.
pub struct MusicSyncWorker<S, M, H> {
    source: S,
    store: M,
    highlights: H,
    invalidator: Arc<dyn CacheInvalidator>,
    now_playing: watch::Sender<Option<NowPlaying>>,
    config: SyncConfig,
}

impl<S, M, H> MusicSyncWorker<S, M, H>
where
    S: ListeningSource,
    M: MusicStore,
    H: HighlightStore,
{
    pub fn new(
        source: S,
        store: M,
        highlights: H,
        invalidator: Arc<dyn CacheInvalidator>,
        now_playing: watch::Sender<Option<NowPlaying>>,
        config: SyncConfig,
    ) -> Self {
        Self {
            source,
            store,
            highlights,
            invalidator,
            now_playing,
            config,
        }
    }

    /// Run the sync loop until the [`CancellationToken`] is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Music sync worker cancelled");
                    break;
                }
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    /// One sync tick. Phase failures are contained here so the loop (and
    /// the other phase) always continues.
    pub async fn tick(&self) {
        if let Err(e) = self.refresh_now_playing().await {
            tracing::warn!(error = %e, "Now-playing refresh failed");
        }
        if let Err(e) = self.sync_archive().await {
            tracing::error!(error = %e, "Archive sync failed");
        }
    }

    /// Phase A: publish the single most recent external event as live
    /// now-playing state. Nothing fetched means the previous value stays —
    /// a paused player must not revert the widget to stale archive data.
    async fn refresh_now_playing(&self) -> Result<(), SyncError> {
        let events = self.source.recent(1, None).await?;
        if let Some(listen) = events.into_iter().next() {
            // Send failure only means there are no widget subscribers.
            let _ = self.now_playing.send(Some(NowPlaying::from(listen)));
        }
        Ok(())
    }

    /// Phase B: ingest external events past the cursor and cascade a new
    /// latest track into the music highlight.
    async fn sync_archive(&self) -> Result<(), SyncError> {
        let cursor = self.store.cursor().await?.map(|t| t.timestamp());

        let events = match self.source.recent(self.config.batch_size, cursor).await {
            Ok(events) => events,
            Err(e) => {
                // Transient fetch failure: nothing to do this tick.
                tracing::warn!(error = %e, "Listening history fetch failed");
                return Ok(());
            }
        };
        if events.is_empty() {
            return Ok(());
        }

        // Upsert by dedupe key; the `from` filter already excluded seen
        // events, the unique key catches any the filter let through.
        let mut newest_created: Option<(i64, DbId)> = None;
        let mut created_count = 0u32;
        for event in &events {
            let outcome = self.store.upsert(&event.to_record()).await?;
            if outcome.created {
                created_count += 1;
                let is_newer = newest_created
                    .map(|(ts, _)| event.timestamp_epoch_seconds > ts)
                    .unwrap_or(true);
                if is_newer {
                    newest_created = Some((event.timestamp_epoch_seconds, outcome.id));
                }
            }
        }
        tracing::debug!(
            fetched = events.len(),
            created = created_count,
            "Archive sync tick ingested events"
        );

        // Only a genuinely new latest track touches the highlight slot;
        // comparing first avoids redundant writes and invalidations.
        if let Some((_, current_track)) = newest_created {
            let stored = self.highlights.current_music_selection().await?;
            if stored != Some(current_track) {
                self.highlights.set_music_selection(current_track).await?;
                self.invalidator.invalidate_tags(&[TAG_HIGHLIGHTS]).await;
                tracing::info!(item_id = current_track, "Music highlight updated");
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::now_playing::now_playing_channel;
    use crate::source::Listen;

    fn listen(external_id: &str, ts: i64) -> Listen {
        Listen {
            title: format!("track {external_id}"),
            artist: "artist".into(),
            album: None,
            external_id: external_id.into(),
            timestamp_epoch_seconds: ts,
        }
    }

    fn config() -> SyncConfig {
        SyncConfig {
            api_url: "http://listen.test".into(),
            api_token: None,
            interval: Duration::from_secs(60),
            batch_size: 20,
        }
    }

    /// Scripted source: pops one canned response per call and records the
    /// `(limit, from)` arguments it was called with.
    #[derive(Default)]
    struct FakeSource {
        responses: Mutex<Vec<Result<Vec<Listen>, ()>>>,
        calls: Mutex<Vec<(u32, Option<i64>)>>,
    }

    impl FakeSource {
        fn push(&self, response: Result<Vec<Listen>, ()>) {
            self.responses.lock().unwrap().push(response);
        }
    }

    #[async_trait]
    impl ListeningSource for &FakeSource {
        async fn recent(&self, limit: u32, from: Option<i64>) -> Result<Vec<Listen>, SourceError> {
            self.calls.lock().unwrap().push((limit, from));
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Ok(vec![]);
            }
            responses
                .remove(0)
                .map_err(|_| SourceError::Rejected("scripted failure".into()))
        }
    }

    /// In-memory archive keyed by dedupe key, cursor = max listen time.
    #[derive(Default)]
    struct FakeStore {
        records: Mutex<HashMap<String, (DbId, Timestamp)>>,
    }

    #[async_trait]
    impl MusicStore for &FakeStore {
        async fn cursor(&self) -> Result<Option<Timestamp>, sqlx::Error> {
            let records = self.records.lock().unwrap();
            Ok(records.values().map(|(_, t)| *t).max())
        }

        async fn upsert(&self, record: &UpsertMusicRecord) -> Result<UpsertOutcome, sqlx::Error> {
            let mut records = self.records.lock().unwrap();
            if let Some((id, _)) = records.get(&record.external_id) {
                let id = *id;
                records.insert(record.external_id.clone(), (id, record.listened_at));
                return Ok(UpsertOutcome { id, created: false });
            }
            let id = records.len() as DbId + 1;
            records.insert(record.external_id.clone(), (id, record.listened_at));
            Ok(UpsertOutcome { id, created: true })
        }
    }

    #[derive(Default)]
    struct FakeHighlights {
        selection: Mutex<Option<DbId>>,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl HighlightStore for &FakeHighlights {
        async fn current_music_selection(&self) -> Result<Option<DbId>, HighlightError> {
            Ok(*self.selection.lock().unwrap())
        }

        async fn set_music_selection(&self, item_id: DbId) -> Result<(), HighlightError> {
            *self.selection.lock().unwrap() = Some(item_id);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeInvalidator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CacheInvalidator for FakeInvalidator {
        async fn invalidate_tags(&self, _tags: &[&str]) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Harness {
        source: FakeSource,
        store: FakeStore,
        highlights: FakeHighlights,
        invalidator: Arc<FakeInvalidator>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                source: FakeSource::default(),
                store: FakeStore::default(),
                highlights: FakeHighlights::default(),
                invalidator: Arc::new(FakeInvalidator::default()),
            }
        }

        fn worker(
            &self,
        ) -> MusicSyncWorker<&FakeSource, &FakeStore, &FakeHighlights> {
            let (tx, _rx) = now_playing_channel();
            MusicSyncWorker::new(
                &self.source,
                &self.store,
                &self.highlights,
                self.invalidator.clone(),
                tx,
                config(),
            )
        }
    }

    #[tokio::test]
    async fn first_tick_ingests_all_events_and_sets_highlight_once() {
        let h = Harness::new();
        // Phase A response, then phase B response (newest first).
        h.source.push(Ok(vec![listen("e3", 300)]));
        h.source.push(Ok(vec![listen("e3", 300), listen("e2", 200), listen("e1", 100)]));

        h.worker().tick().await;

        assert_eq!(h.store.records.lock().unwrap().len(), 3);
        // The t=300 event was upserted first, so it got id 1.
        assert_eq!(*h.highlights.selection.lock().unwrap(), Some(1));
        assert_eq!(h.highlights.writes.load(Ordering::SeqCst), 1);
        assert_eq!(h.invalidator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn second_tick_uses_cursor_and_is_a_no_op_on_empty_fetch() {
        let h = Harness::new();
        h.source.push(Ok(vec![listen("e3", 300)]));
        h.source.push(Ok(vec![listen("e3", 300), listen("e2", 200), listen("e1", 100)]));
        h.worker().tick().await;

        // Second tick: phase A again, then an empty archival fetch.
        h.source.push(Ok(vec![listen("e3", 300)]));
        h.source.push(Ok(vec![]));
        h.worker().tick().await;

        let calls = h.source.calls.lock().unwrap();
        // Archival fetches: first with no cursor, then strictly after 300.
        assert_eq!(calls[1], (20, None));
        assert_eq!(calls[3], (20, Some(300)));
        drop(calls);

        assert_eq!(h.store.records.lock().unwrap().len(), 3);
        assert_eq!(h.highlights.writes.load(Ordering::SeqCst), 1);
        assert_eq!(h.invalidator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn redelivered_events_do_not_duplicate_or_reinvalidate() {
        let h = Harness::new();
        h.source.push(Ok(vec![listen("e3", 300)]));
        h.source.push(Ok(vec![listen("e3", 300), listen("e2", 200), listen("e1", 100)]));
        h.worker().tick().await;

        // Stale `from` (clock skew): the API re-serves the same events.
        h.source.push(Ok(vec![listen("e3", 300)]));
        h.source.push(Ok(vec![listen("e3", 300), listen("e2", 200), listen("e1", 100)]));
        h.worker().tick().await;

        // Dedupe-key upsert: still three rows, no new highlight write.
        assert_eq!(h.store.records.lock().unwrap().len(), 3);
        assert_eq!(h.highlights.writes.load(Ordering::SeqCst), 1);
        assert_eq!(h.invalidator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unchanged_latest_track_skips_highlight_write() {
        let h = Harness::new();
        h.source.push(Ok(vec![listen("e1", 100)]));
        h.source.push(Ok(vec![listen("e1", 100)]));
        h.worker().tick().await;
        assert_eq!(h.highlights.writes.load(Ordering::SeqCst), 1);

        // A new event arrives but the stored selection already matches
        // after manual admin intervention.
        *h.highlights.selection.lock().unwrap() = Some(2);
        h.source.push(Ok(vec![listen("e2", 200)]));
        h.source.push(Ok(vec![listen("e2", 200)]));
        h.worker().tick().await;

        // e2 got id 2, equal to the stored selection: no write, no signal.
        assert_eq!(h.highlights.writes.load(Ordering::SeqCst), 1);
        assert_eq!(h.invalidator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn now_playing_failure_does_not_abort_archive_sync() {
        let h = Harness::new();
        h.source.push(Err(()));
        h.source.push(Ok(vec![listen("e1", 100)]));

        h.worker().tick().await;

        assert_eq!(h.store.records.lock().unwrap().len(), 1);
        assert_eq!(h.highlights.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn archive_fetch_failure_leaves_state_untouched() {
        let h = Harness::new();
        h.source.push(Ok(vec![]));
        h.source.push(Err(()));

        h.worker().tick().await;

        assert!(h.store.records.lock().unwrap().is_empty());
        assert_eq!(h.highlights.writes.load(Ordering::SeqCst), 0);
        assert_eq!(h.invalidator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_exits_promptly_on_cancellation() {
        let cancel = CancellationToken::new();
        let child = cancel.child_token();

        let handle = tokio::spawn(async move {
            let source = FakeSource::default();
            let store = FakeStore::default();
            let highlights = FakeHighlights::default();
            let invalidator = Arc::new(FakeInvalidator::default());
            let (tx, _rx) = now_playing_channel();
            let worker = MusicSyncWorker::new(
                &source,
                &store,
                &highlights,
                invalidator,
                tx,
                config(),
            );
            worker.run(child).await;
        });

        cancel.cancel();
        handle.await.expect("worker task should exit cleanly");
    }
}
