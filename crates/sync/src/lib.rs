//! Listening-history sync: the third-party source adapter, ephemeral
//! now-playing state, and the periodic [`MusicSyncWorker`].

pub mod config;
pub mod now_playing;
pub mod source;
pub mod worker;

pub use config::SyncConfig;
pub use now_playing::{now_playing_channel, NowPlaying};
pub use source::{Listen, ListenApiClient, ListeningSource, SourceError};
pub use worker::{HighlightStore, MusicStore, MusicSyncWorker, PgMusicStore, SyncError};
