//! Configuration for the dispatch service

use chrono::Duration;
use otp_shared::OtpConfig;

use crate::domain::entities::{CODE_TTL_SECONDS, MAX_ATTEMPTS, MAX_GENERATIONS, RATE_WINDOW_SECONDS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpServiceConfig {
    /// How long an issued code stays valid
    pub code_ttl: Duration,
    /// Verification attempts allowed per code
    pub max_attempts: u32,
    /// Rolling window for the issuance limit
    pub rate_window: Duration,
    /// Issuances allowed per subject inside the window
    pub max_generations: u32,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            code_ttl: Duration::seconds(CODE_TTL_SECONDS),
            max_attempts: MAX_ATTEMPTS,
            rate_window: Duration::seconds(RATE_WINDOW_SECONDS),
            max_generations: MAX_GENERATIONS,
        }
    }
}

impl From<&OtpConfig> for OtpServiceConfig {
    fn from(config: &OtpConfig) -> Self {
        Self {
            code_ttl: Duration::seconds(config.code_ttl_seconds),
            max_attempts: config.max_attempts,
            rate_window: Duration::seconds(config.rate_window_seconds),
            max_generations: config.max_generations,
        }
    }
}

impl OtpServiceConfig {
    /// Code lifetime in minutes, rounded up, for delivery messages
    pub fn code_ttl_minutes(&self) -> i64 {
        (self.code_ttl.num_seconds() + 59) / 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shared_config() {
        assert_eq!(OtpServiceConfig::default(), OtpServiceConfig::from(&OtpConfig::default()));
    }

    #[test]
    fn test_ttl_minutes_rounds_up() {
        let config = OtpServiceConfig {
            code_ttl: Duration::seconds(181),
            ..Default::default()
        };
        assert_eq!(config.code_ttl_minutes(), 4);
        assert_eq!(OtpServiceConfig::default().code_ttl_minutes(), 3);
    }
}
