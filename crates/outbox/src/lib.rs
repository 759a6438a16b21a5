//! Contact notification outbox: the durable queue adapter, the SMTP
//! mailer, and the [`NotificationOutboxWorker`] that drains the queue.

pub mod config;
pub mod mailer;
pub mod queue;
pub mod worker;

pub use config::OutboxConfig;
pub use mailer::{EmailConfig, MailError, Mailer, SmtpMailer};
pub use queue::{
    submit_contact_message, ContactEmailPayload, OutboxError, OutboxQueue, PgOutboxQueue,
    TOPIC_CONTACT_EMAIL,
};
pub use worker::{ContactStore, NotificationOutboxWorker, PgContactStore};
