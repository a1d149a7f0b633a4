//! Provider selection and credentials, read from the environment
//!
//! - `OTP_STORE`: `memory` or `redis`
//! - `SMS_PROVIDER`: `log` or `twilio`
//! - `EMAIL_PROVIDER`: `log` or `smtp`

use std::str::FromStr;

use otp_shared::Environment;
use serde::{Deserialize, Serialize};

use crate::InfrastructureError;

/// Row store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Redis,
}

impl FromStr for StoreBackend {
    type Err = InfrastructureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "redis" => Ok(StoreBackend::Redis),
            other => Err(InfrastructureError::Config(format!(
                "Unknown OTP_STORE backend: {}",
                other
            ))),
        }
    }
}

/// SMS delivery configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsConfig {
    /// SMS provider ("log", "twilio")
    pub provider: String,
    /// Account identifier
    pub account_sid: String,
    /// API secret
    pub auth_token: String,
    /// From phone number
    pub from_number: String,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            provider: "log".to_string(),
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::new(),
        }
    }
}

/// Email delivery configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Email provider ("log", "smtp")
    pub provider: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    /// STARTTLS when true, plaintext otherwise
    pub use_tls: bool,
    pub timeout_secs: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: "log".to_string(),
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            username: String::new(),
            password: String::new(),
            from_email: "no-reply@localhost".to_string(),
            from_name: "Verification".to_string(),
            use_tls: true,
            timeout_secs: 10,
        }
    }
}

/// Infrastructure configuration settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfrastructureConfig {
    pub store: StoreBackend,
    pub sms: SmsConfig,
    pub email: EmailConfig,
    /// Let the log notifier print issued codes; never honoured in production
    #[serde(default)]
    pub reveal_codes: bool,
}

impl InfrastructureConfig {
    pub fn from_env() -> Result<Self, InfrastructureError> {
        let store = match std::env::var("OTP_STORE") {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreBackend::default(),
        };

        let sms_defaults = SmsConfig::default();
        let sms = SmsConfig {
            provider: env_or("SMS_PROVIDER", sms_defaults.provider),
            account_sid: env_or("TWILIO_ACCOUNT_SID", sms_defaults.account_sid),
            auth_token: env_or("TWILIO_AUTH_TOKEN", sms_defaults.auth_token),
            from_number: env_or("TWILIO_FROM_NUMBER", sms_defaults.from_number),
        };

        let email_defaults = EmailConfig::default();
        let email = EmailConfig {
            provider: env_or("EMAIL_PROVIDER", email_defaults.provider),
            smtp_host: env_or("SMTP_HOST", email_defaults.smtp_host),
            smtp_port: env_parse("SMTP_PORT")?.unwrap_or(email_defaults.smtp_port),
            username: env_or("SMTP_USERNAME", email_defaults.username),
            password: env_or("SMTP_PASSWORD", email_defaults.password),
            from_email: env_or("SMTP_FROM_EMAIL", email_defaults.from_email),
            from_name: env_or("SMTP_FROM_NAME", email_defaults.from_name),
            use_tls: env_parse("SMTP_USE_TLS")?.unwrap_or(email_defaults.use_tls),
            timeout_secs: env_parse("SMTP_TIMEOUT_SECS")?.unwrap_or(email_defaults.timeout_secs),
        };

        let reveal_codes = env_parse::<bool>("OTP_LOG_CODES")?.unwrap_or(false);
        let reveal_codes = if reveal_codes && Environment::from_env().is_production() {
            tracing::warn!("OTP_LOG_CODES is ignored in production");
            false
        } else {
            reveal_codes
        };

        Ok(Self {
            store,
            sms,
            email,
            reveal_codes,
        })
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>, InfrastructureError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| InfrastructureError::Config(format!("Invalid value for {}: {}", key, raw))),
        Err(_) => Ok(None),
    }
}
