//! Contact message models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use vitrine_core::types::Timestamp;

/// A row from the `contact_messages` table.
///
/// `is_mail_sent` is the idempotency flag for the notification outbox: it
/// flips from `false` to `true` exactly once and is never reverted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContactMessage {
    pub id: Uuid,
    pub sender_name: String,
    pub sender_email: String,
    pub body: String,
    pub is_mail_sent: bool,
    pub is_replied: bool,
    pub created_at: Timestamp,
}

/// DTO for creating a contact message (contact-form submission path).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContactMessage {
    pub sender_name: String,
    pub sender_email: String,
    pub body: String,
}
