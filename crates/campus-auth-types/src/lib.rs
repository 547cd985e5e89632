//! Identity types shared across Campus services.
//!
//! Authentication happens upstream; the gateway forwards the caller's id and
//! role as headers, which `IdentityHeaders` extracts.

pub mod identity;
