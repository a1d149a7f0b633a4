//! Error types for passcode issuance and row storage
//!
//! Verification failures are deliberately absent here: every failed
//! verification collapses to `false` so callers cannot tell which check
//! rejected the code.

use thiserror::Error;

/// Passcode issuance errors surfaced to callers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
    #[error("Missing required input: {field}")]
    MissingInput { field: &'static str },

    #[error("Too many codes requested. Please try again in {retry_after_seconds} seconds")]
    RateLimitExceeded {
        retry_after_seconds: u64,
        limit: u32,
        window_seconds: u64,
    },

    #[error("Failed to deliver passcode: {reason}")]
    NotificationFailed { reason: String },
}

/// Row store failures, opaque to callers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Row serialization failed: {0}")]
    Serialization(String),

    #[error("Corrupt row {partition}/{row_key}: {reason}")]
    Corrupt {
        partition: String,
        row_key: String,
        reason: String,
    },
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
