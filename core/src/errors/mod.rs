//! Domain-specific error types and error handling.

mod types;

pub use types::{OtpError, StoreError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Otp(#[from] OtpError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DomainError {
    /// Shorthand for a missing or blank input field
    pub fn missing(field: &'static str) -> Self {
        DomainError::Otp(OtpError::MissingInput { field })
    }

    /// Seconds until issuance is allowed again, if this is a rate limit error
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            DomainError::Otp(OtpError::RateLimitExceeded {
                retry_after_seconds,
                ..
            }) => Some(*retry_after_seconds),
            _ => None,
        }
    }

    /// Whether this error is caused by caller input rather than a backend
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DomainError::Validation { .. }
                | DomainError::Otp(OtpError::MissingInput { .. })
                | DomainError::Otp(OtpError::RateLimitExceeded { .. })
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
