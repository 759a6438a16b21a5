//! Cache-invalidation collaborator.
//!
//! Workers that mutate highlight state signal dependent read paths through
//! [`CacheInvalidator`]. The call is fire-and-forget from the worker's
//! perspective: failures are the subscriber's problem, never the worker's.

use std::sync::Arc;

use async_trait::async_trait;

use crate::bus::{DomainEvent, EventBus};

/// Tag covering every homepage highlight read path.
pub const TAG_HIGHLIGHTS: &str = "highlights";

/// Event type published for each invalidation.
pub const EVENT_CACHE_INVALIDATED: &str = "cache.invalidated";

/// Collaborator interface for invalidating tagged cached data.
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    /// Mark every cache entry carrying one of `tags` as stale.
    async fn invalidate_tags(&self, tags: &[&str]);
}

/// [`CacheInvalidator`] that publishes a `cache.invalidated` event on the
/// in-process [`EventBus`]; read-path subscribers drop their tagged entries.
pub struct BusInvalidator {
    bus: Arc<EventBus>,
}

impl BusInvalidator {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl CacheInvalidator for BusInvalidator {
    async fn invalidate_tags(&self, tags: &[&str]) {
        tracing::debug!(?tags, "Publishing cache invalidation");
        self.bus.publish(
            DomainEvent::new(EVENT_CACHE_INVALIDATED)
                .with_payload(serde_json::json!({ "tags": tags })),
        );
    }
}
