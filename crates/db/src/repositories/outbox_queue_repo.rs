//! Repository for the `outbox_queue` table.
//!
//! The table is a durable at-least-once queue: `claim` leases the oldest
//! deliverable row to the calling consumer, `ack` deletes it. A consumer
//! that crashes mid-processing never acks, so its lease expires and the
//! row is redelivered — consumers must therefore be idempotent.

use std::time::Duration;

use sqlx::{PgPool, Postgres};
use vitrine_core::types::DbId;

use crate::models::outbox::OutboxMessage;

/// Provides publish/claim/ack operations for the outbox queue.
pub struct OutboxQueueRepo;

impl OutboxQueueRepo {
    /// Enqueue a payload on a topic, returning the generated message ID.
    ///
    /// Generic over the executor so producers can enqueue inside the same
    /// transaction as the state change the message announces.
    pub async fn publish<'e, E>(executor: E, topic: &str, payload: &str) -> Result<DbId, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar(
            "INSERT INTO outbox_queue (topic, payload) VALUES ($1, $2) RETURNING id",
        )
        .bind(topic)
        .bind(payload)
        .fetch_one(executor)
        .await
    }

    /// Lease the oldest deliverable message on a topic.
    ///
    /// Deliverable means never claimed, or claimed longer than `lease` ago
    /// (the previous consumer is presumed dead). `FOR UPDATE SKIP LOCKED`
    /// keeps concurrent consumers from claiming the same row.
    pub async fn claim(
        pool: &PgPool,
        topic: &str,
        lease: Duration,
    ) -> Result<Option<OutboxMessage>, sqlx::Error> {
        sqlx::query_as::<_, OutboxMessage>(
            "UPDATE outbox_queue SET claimed_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM outbox_queue \
                 WHERE topic = $1 \
                   AND (claimed_at IS NULL OR claimed_at < NOW() - make_interval(secs => $2)) \
                 ORDER BY id \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING id, topic, payload, enqueued_at, claimed_at",
        )
        .bind(topic)
        .bind(lease.as_secs_f64())
        .fetch_optional(pool)
        .await
    }

    /// Acknowledge (delete) a processed message.
    ///
    /// Returns `false` when the message no longer exists, e.g. it was
    /// already acked by a previous incarnation of this consumer.
    pub async fn ack(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM outbox_queue WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of messages currently on a topic (delivered or not).
    pub async fn depth(pool: &PgPool, topic: &str) -> Result<i64, sqlx::Error> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT COUNT(*) FROM outbox_queue WHERE topic = $1")
                .bind(topic)
                .fetch_one(pool)
                .await?;
        Ok(count.unwrap_or(0))
    }
}
