//! Repository for the `contact_messages` table.

use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::models::contact::{ContactMessage, CreateContactMessage};

/// Column list for `contact_messages` queries.
const COLUMNS: &str =
    "id, sender_name, sender_email, body, is_mail_sent, is_replied, created_at";

/// Provides CRUD operations for contact messages.
pub struct ContactMessageRepo;

impl ContactMessageRepo {
    /// Create a contact message, returning the generated UUID.
    ///
    /// Generic over the executor so the submission path can create the
    /// message and enqueue its notification in one transaction.
    pub async fn create<'e, E>(
        executor: E,
        message: &CreateContactMessage,
    ) -> Result<Uuid, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar(
            "INSERT INTO contact_messages (sender_name, sender_email, body) \
             VALUES ($1, $2, $3) \
             RETURNING id",
        )
        .bind(&message.sender_name)
        .bind(&message.sender_email)
        .bind(&message.body)
        .fetch_one(executor)
        .await
    }

    /// Fetch a contact message by id.
    pub async fn get_by_id(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<ContactMessage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contact_messages WHERE id = $1");
        sqlx::query_as::<_, ContactMessage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Flip the mail-sent idempotency flag from `false` to `true`.
    ///
    /// Returns `true` only when this call performed the flip; a message
    /// that was already marked sent (or does not exist) leaves the flag
    /// untouched and returns `false`.
    pub async fn mark_mail_sent(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE contact_messages \
             SET is_mail_sent = true \
             WHERE id = $1 AND is_mail_sent = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
