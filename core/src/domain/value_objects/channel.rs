//! Delivery channel for passcodes.

use std::fmt;
use std::str::FromStr;

use otp_shared::utils::{email, phone};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Phone,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Phone => "phone",
        }
    }

    /// Check `destination` is addressable on this channel and return the
    /// form handed to the notifier
    pub fn prepare_destination(&self, destination: &str) -> DomainResult<String> {
        let trimmed = destination.trim();
        match self {
            Channel::Email if email::is_valid_email(trimmed) => Ok(trimmed.to_string()),
            Channel::Email => Err(DomainError::Validation {
                message: "Invalid email address".to_string(),
            }),
            Channel::Phone => {
                let normalized = phone::normalize_phone_number(trimmed);
                if phone::is_valid_phone(&normalized) {
                    Ok(normalized)
                } else {
                    Err(DomainError::Validation {
                        message: "Invalid phone number format".to_string(),
                    })
                }
            }
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "email" => Ok(Channel::Email),
            "phone" | "sms" => Ok(Channel::Phone),
            other => Err(DomainError::Validation {
                message: format!("Unsupported channel: {}", other),
            }),
        }
    }
}
