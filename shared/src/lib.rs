//! Shared utilities and common types for the passcode service
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response structures
//! - Destination utilities (phone and email normalization, masking)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, DemoAccount, Environment, LogFormat, LoggingConfig, OtpConfig,
    PolicyConfig, ServerConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use utils::{email, phone};
