//! Domain types shared across all Campus services.
//!
//! Pure types only: no web framework, no database. Services map these to
//! their own entities at the infra boundary.

pub mod attendance;
pub mod pagination;
pub mod role;
