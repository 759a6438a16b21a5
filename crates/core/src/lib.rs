//! Shared domain primitives for the Vitrine platform.
//!
//! This crate has zero internal dependencies so it can be used by the
//! repository layer, the highlight services, and the background workers
//! alike.

pub mod categories;
pub mod spotlight;
pub mod types;
