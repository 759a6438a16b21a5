//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or, where transactions are needed, any Postgres
//! executor) as the first argument.

pub mod contact_message_repo;
pub mod highlight_selection_repo;
pub mod media_item_repo;
pub mod music_record_repo;
pub mod outbox_queue_repo;
pub mod spotlight_entry_repo;

pub use contact_message_repo::ContactMessageRepo;
pub use highlight_selection_repo::HighlightSelectionRepo;
pub use media_item_repo::{CategoryTable, MediaItemRepo};
pub use music_record_repo::MusicRecordRepo;
pub use outbox_queue_repo::OutboxQueueRepo;
pub use spotlight_entry_repo::SpotlightEntryRepo;
