//! Highlight services: item providers, the highlight registry, and the
//! spotlight resolver.
//!
//! Everything here is read-mostly and invoked synchronously by request
//! handlers, except for the mutations made by the sync worker (music
//! highlight) and by admin overrides (spotlight, selections).

pub mod provider;
pub mod registry;
pub mod spotlight;

pub use provider::{ItemProvider, PgItemProvider, ProviderRegistry};
pub use registry::{HighlightError, HighlightRegistry};
pub use spotlight::{ActiveSpotlight, SpotlightError, SpotlightHistoryEntry, SpotlightResolver};
