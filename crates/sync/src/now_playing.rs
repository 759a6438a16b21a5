//! Ephemeral "now playing" state.
//!
//! Deliberately separate from the durable music archive: when the player
//! is paused or the API briefly returns nothing new, the widget keeps the
//! last published track instead of reverting to stale archived data.

use serde::Serialize;
use tokio::sync::watch;
use vitrine_core::types::Timestamp;

use crate::source::Listen;

/// The most recent external listening event, for the live widget.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub listened_at: Timestamp,
}

impl From<Listen> for NowPlaying {
    fn from(listen: Listen) -> Self {
        let record = listen.to_record();
        Self {
            title: listen.title,
            artist: listen.artist,
            album: listen.album,
            listened_at: record.listened_at,
        }
    }
}

/// Create the shared now-playing channel.
///
/// The sender side belongs to the sync worker; receivers go to the read
/// paths that render the live widget.
pub fn now_playing_channel() -> (
    watch::Sender<Option<NowPlaying>>,
    watch::Receiver<Option<NowPlaying>>,
) {
    watch::channel(None)
}
