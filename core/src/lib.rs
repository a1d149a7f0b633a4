//! # Passcode Core
//!
//! Domain layer for one-time passcode issuance and verification.
//! This crate contains the passcode entities, the row store abstraction,
//! the rate limiter, credential store, cleanup sweeper and the dispatch
//! service that ties them together.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
