//! Entity models and DTOs, one module per entity.

pub mod contact;
pub mod highlight;
pub mod item;
pub mod music;
pub mod outbox;
pub mod spotlight;
