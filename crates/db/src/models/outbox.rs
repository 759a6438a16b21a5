//! Outbox queue message model.

use sqlx::FromRow;
use vitrine_core::types::{DbId, Timestamp};

/// A claimed row from the `outbox_queue` table.
///
/// The payload is kept as raw text: parsing (and rejecting malformed
/// payloads) is the consumer's job, not the queue's.
#[derive(Debug, Clone, FromRow)]
pub struct OutboxMessage {
    pub id: DbId,
    pub topic: String,
    pub payload: String,
    pub enqueued_at: Timestamp,
    pub claimed_at: Option<Timestamp>,
}
