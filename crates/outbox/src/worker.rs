//! Notification outbox worker.
//!
//! Drains the contact-email topic: for each claimed message it loads the
//! referenced contact message, mails the site owner, flips the idempotency
//! flag, and acks. Delivery is at-least-once, so every terminal state
//! (sent, already sent, malformed, orphaned, attempts exhausted) acks;
//! only infrastructure errors leave the message for redelivery.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use vitrine_db::models::contact::ContactMessage;
use vitrine_db::models::outbox::OutboxMessage;
use vitrine_db::repositories::ContactMessageRepo;
use vitrine_db::DbPool;

use crate::config::OutboxConfig;
use crate::mailer::Mailer;
use crate::queue::{ContactEmailPayload, OutboxError, OutboxQueue};

// ---------------------------------------------------------------------------
// Contact store seam
// ---------------------------------------------------------------------------

/// Contact messages as the outbox worker sees them.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<ContactMessage>, sqlx::Error>;

    /// Flip the mail-sent flag; `false` means it was already set.
    async fn mark_mail_sent(&self, id: Uuid) -> Result<bool, sqlx::Error>;
}

/// Postgres-backed [`ContactStore`].
pub struct PgContactStore {
    pool: DbPool,
}

impl PgContactStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn get(&self, id: Uuid) -> Result<Option<ContactMessage>, sqlx::Error> {
        ContactMessageRepo::get_by_id(&self.pool, id).await
    }

    async fn mark_mail_sent(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        ContactMessageRepo::mark_mail_sent(&self.pool, id).await
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// What to do with a claimed message after handling it.
enum Disposition {
    /// Terminal state reached, delete the message.
    Ack,
    /// Shutdown interrupted processing, leave it for redelivery.
    Leave,
}

/// Background worker that turns queued contact submissions into
/// notification emails.
pub struct NotificationOutboxWorker<Q, C, M> {
    queue: Q,
    contacts: C,
    mailer: M,
    config: OutboxConfig,
}

impl<Q, C, M> NotificationOutboxWorker<Q, C, M>
where
    Q: OutboxQueue,
    C: ContactStore,
    M: Mailer,
{
    pub fn new(queue: Q, contacts: C, mailer: M, config: OutboxConfig) -> Self {
        Self {
            queue,
            contacts,
            mailer,
            config,
        }
    }

    /// Run the drain loop until the [`CancellationToken`] is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.poll_interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Notification outbox worker cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.drain(&cancel).await {
                        tracing::error!(error = %e, "Outbox drain failed");
                    }
                }
            }
        }
    }

    /// Claim and process messages until the queue is empty or shutdown.
    async fn drain(&self, cancel: &CancellationToken) -> Result<(), OutboxError> {
        while let Some(message) = self.queue.claim().await? {
            match self.handle(&message, cancel).await? {
                Disposition::Ack => {
                    self.queue.ack(message.id).await?;
                }
                Disposition::Leave => return Ok(()),
            }
            if cancel.is_cancelled() {
                return Ok(());
            }
        }
        Ok(())
    }

    async fn handle(
        &self,
        message: &OutboxMessage,
        cancel: &CancellationToken,
    ) -> Result<Disposition, OutboxError> {
        let payload: ContactEmailPayload = match serde_json::from_str(&message.payload) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(
                    message_id = message.id,
                    error = %e,
                    "Dropping outbox message with malformed payload"
                );
                return Ok(Disposition::Ack);
            }
        };
        let contact_id = payload.contact_message_id;

        let contact = match self.contacts.get(contact_id).await? {
            Some(contact) => contact,
            None => {
                tracing::warn!(
                    contact_message_id = %contact_id,
                    "Dropping outbox message for missing contact message"
                );
                return Ok(Disposition::Ack);
            }
        };
        if contact.is_mail_sent {
            // Redelivery of an already-handled submission.
            tracing::info!(
                contact_message_id = %contact_id,
                "Contact notification already sent, skipping"
            );
            return Ok(Disposition::Ack);
        }

        for attempt in 1..=self.config.max_attempts {
            match self.mailer.send(&contact).await {
                Ok(true) => {
                    self.contacts.mark_mail_sent(contact_id).await?;
                    return Ok(Disposition::Ack);
                }
                Ok(false) => {
                    tracing::warn!(
                        contact_message_id = %contact_id,
                        attempt,
                        "Mailer declined contact notification"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        contact_message_id = %contact_id,
                        attempt,
                        error = %e,
                        "Contact notification attempt failed"
                    );
                }
            }
            if attempt < self.config.max_attempts {
                tokio::select! {
                    _ = cancel.cancelled() => return Ok(Disposition::Leave),
                    _ = tokio::time::sleep(self.config.retry_delay) => {}
                }
            }
        }

        tracing::error!(
            contact_message_id = %contact_id,
            attempts = self.config.max_attempts,
            "Contact notification dropped after exhausting attempts"
        );
        Ok(Disposition::Ack)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
