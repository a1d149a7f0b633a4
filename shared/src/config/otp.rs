//! Passcode lifetime and issuance limits

use serde::{Deserialize, Serialize};

/// Passcode configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Seconds a freshly issued code stays valid
    #[serde(default = "default_code_ttl_seconds")]
    pub code_ttl_seconds: i64,

    /// Verification attempts allowed per issued code
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Length of the rolling issuance window in seconds
    #[serde(default = "default_rate_window_seconds")]
    pub rate_window_seconds: i64,

    /// Codes that may be issued per subject inside one window
    #[serde(default = "default_max_generations")]
    pub max_generations: u32,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_ttl_seconds: default_code_ttl_seconds(),
            max_attempts: default_max_attempts(),
            rate_window_seconds: default_rate_window_seconds(),
            max_generations: default_max_generations(),
        }
    }
}

impl OtpConfig {
    /// Create from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_env_or(Self::default())
    }

    /// Overlay environment variables on top of `base`
    pub fn from_env_or(base: Self) -> Self {
        Self {
            code_ttl_seconds: env_parse("OTP_CODE_TTL_SECONDS").unwrap_or(base.code_ttl_seconds),
            max_attempts: env_parse("OTP_MAX_ATTEMPTS").unwrap_or(base.max_attempts),
            rate_window_seconds: env_parse("OTP_RATE_WINDOW_SECONDS")
                .unwrap_or(base.rate_window_seconds),
            max_generations: env_parse("OTP_MAX_GENERATIONS").unwrap_or(base.max_generations),
        }
    }

    /// Code lifetime in whole minutes, rounded up (for user-facing messages)
    pub fn code_ttl_minutes(&self) -> i64 {
        (self.code_ttl_seconds + 59) / 60
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn default_code_ttl_seconds() -> i64 {
    180 // 3 minutes
}

fn default_max_attempts() -> u32 {
    5
}

fn default_rate_window_seconds() -> i64 {
    600 // 10 minutes
}

fn default_max_generations() -> u32 {
    3
}
