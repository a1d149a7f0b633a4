//! Configuration module with business-specific sub-modules
//!
//! - `cache` - Redis connection configuration for the row store
//! - `environment` - Environment detection and logging configuration
//! - `otp` - Passcode lifetime, attempt budget and issuance rate limits
//! - `policy` - Test identity and demo account carve-outs
//! - `server` - HTTP server configuration

pub mod cache;
pub mod environment;
pub mod otp;
pub mod policy;
pub mod server;

use serde::{Deserialize, Serialize};

pub use cache::CacheConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use otp::OtpConfig;
pub use policy::{DemoAccount, PolicyConfig};
pub use server::ServerConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Redis configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Passcode configuration
    #[serde(default)]
    pub otp: OtpConfig,

    /// Carve-out policy configuration
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            otp: OtpConfig::default(),
            policy: PolicyConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig::new("127.0.0.1", 8080),
            cache: CacheConfig::default(),
            otp: OtpConfig::default(),
            policy: PolicyConfig::development(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig::new("0.0.0.0", 8080),
            cache: CacheConfig::default().with_prefix("otp"),
            otp: OtpConfig::default(),
            policy: PolicyConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Load configuration from environment variables
    ///
    /// Starts from the profile matching `ENVIRONMENT` and overlays the
    /// individual `from_env` readers of each section.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = Environment::from_env();
        let mut config = match env {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::development();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        };

        config.server = ServerConfig::from_env_or(config.server);
        config.cache = CacheConfig::from_env_or(config.cache);
        config.otp = OtpConfig::from_env_or(config.otp);
        config.policy = PolicyConfig::from_env_or(config.policy);
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        config
    }

    /// Load configuration from `config.<environment>` (any format the
    /// `config` crate detects), overridden by `OTP__`-prefixed environment
    /// variables (e.g. `OTP__OTP__MAX_ATTEMPTS`)
    ///
    /// A missing file is not an error; the profile defaults fill the gaps.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let base = Self::from_env();
        let file = format!("config.{}", base.environment);

        ::config::Config::builder()
            .add_source(::config::Config::try_from(&base)?)
            .add_source(::config::File::with_name(&file).required(false))
            .add_source(::config::Environment::with_prefix("OTP").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_profile() {
        let config = AppConfig::development();
        assert!(config.environment.is_development());
        assert_eq!(config.otp.max_attempts, 5);
        assert!(!config.policy.test_identity_suffixes.is_empty());
    }

    #[test]
    fn test_production_profile_has_no_carve_outs() {
        let config = AppConfig::production();
        assert!(config.environment.is_production());
        assert!(config.policy.test_identity_suffixes.is_empty());
        assert!(config.policy.demo_accounts.is_empty());
        assert_eq!(config.cache.key_prefix.as_deref(), Some("otp"));
    }

    #[test]
    fn test_from_env_reads_profile_and_overrides() {
        temp_env::with_vars(
            [
                ("ENVIRONMENT", Some("production")),
                ("OTP_MAX_GENERATIONS", Some("7")),
                ("LOG_LEVEL", Some("trace")),
            ],
            || {
                let config = AppConfig::from_env();
                assert!(config.environment.is_production());
                assert_eq!(config.otp.max_generations, 7);
                assert_eq!(config.logging.level, "trace");
            },
        );
    }
}
