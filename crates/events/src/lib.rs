//! Vitrine event bus and cache-invalidation infrastructure.
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`] — the canonical domain event envelope.
//! - [`CacheInvalidator`] — collaborator interface the workers use to tell
//!   dependent read paths that tagged cached data went stale.

pub mod bus;
pub mod invalidation;

pub use bus::{DomainEvent, EventBus};
pub use invalidation::{BusInvalidator, CacheInvalidator, TAG_HIGHLIGHTS};
