//! Queue adapter and producer side of the contact notification outbox.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vitrine_core::types::DbId;
use vitrine_db::models::contact::CreateContactMessage;
use vitrine_db::models::outbox::OutboxMessage;
use vitrine_db::repositories::{ContactMessageRepo, OutboxQueueRepo};
use vitrine_db::DbPool;

/// Topic carrying contact notification messages.
pub const TOPIC_CONTACT_EMAIL: &str = "email-outbox";

/// How long a claimed message stays invisible before redelivery.
///
/// Must comfortably exceed the worst-case processing time of one message
/// (all retry attempts included), otherwise a slow consumer and a
/// redelivery can run concurrently.
const CLAIM_LEASE: Duration = Duration::from_secs(300);

/// Errors from the outbox producer/consumer paths.
#[derive(Debug, thiserror::Error)]
pub enum OutboxError {
    #[error(transparent)]
    Db(#[from] sqlx::Error),

    #[error("Payload serialization error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Wire format of messages on [`TOPIC_CONTACT_EMAIL`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactEmailPayload {
    pub contact_message_id: Uuid,
}

/// Store the contact message and enqueue its notification, atomically.
///
/// The queue row commits with the message row, so a submission either
/// produces both or neither.
pub async fn submit_contact_message(
    pool: &DbPool,
    message: &CreateContactMessage,
) -> Result<Uuid, OutboxError> {
    let mut tx = pool.begin().await?;
    let id = ContactMessageRepo::create(&mut *tx, message).await?;
    let payload = serde_json::to_string(&ContactEmailPayload {
        contact_message_id: id,
    })?;
    OutboxQueueRepo::publish(&mut *tx, TOPIC_CONTACT_EMAIL, &payload).await?;
    tx.commit().await?;
    tracing::info!(contact_message_id = %id, "Contact message submitted");
    Ok(id)
}

// ---------------------------------------------------------------------------
// Consumer seam
// ---------------------------------------------------------------------------

/// The outbox queue as the worker sees it.
#[async_trait]
pub trait OutboxQueue: Send + Sync {
    /// Lease the next deliverable message, if any.
    async fn claim(&self) -> Result<Option<OutboxMessage>, sqlx::Error>;

    /// Delete a processed message. `false` means it was already gone.
    async fn ack(&self, id: DbId) -> Result<bool, sqlx::Error>;
}

/// Postgres-backed [`OutboxQueue`] over [`TOPIC_CONTACT_EMAIL`].
pub struct PgOutboxQueue {
    pool: DbPool,
}

impl PgOutboxQueue {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OutboxQueue for PgOutboxQueue {
    async fn claim(&self) -> Result<Option<OutboxMessage>, sqlx::Error> {
        OutboxQueueRepo::claim(&self.pool, TOPIC_CONTACT_EMAIL, CLAIM_LEASE).await
    }

    async fn ack(&self, id: DbId) -> Result<bool, sqlx::Error> {
        OutboxQueueRepo::ack(&self.pool, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_round_trips_in_camel_case() {
        let payload = ContactEmailPayload {
            contact_message_id: Uuid::nil(),
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"contactMessageId\""));
        let parsed: ContactEmailPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.contact_message_id, Uuid::nil());
    }
}
