//! Cross-cutting plumbing shared by Campus services.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
