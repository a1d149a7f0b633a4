//! # Infrastructure Layer
//!
//! Concrete implementations of the seams defined in `otp_core`:
//!
//! - **Cache**: Redis client with connection retry
//! - **Store**: `RowStore` on Redis with server-side compare-and-set
//! - **Notify**: passcode delivery over SMS (Twilio), email (SMTP) or logs
//!
//! ## Features
//!
//! - `twilio-sms`: Enable Twilio SMS delivery (default)
//! - `smtp-email`: Enable SMTP email delivery (default)

use std::sync::Arc;

use otp_core::{MemoryRowStore, Notifier, RowStore, StoreError};

/// Cache module - Redis client and operations
pub mod cache;

/// Notifier module - passcode delivery providers
pub mod notify;

/// Store module - row store adapters
pub mod store;

/// Configuration module for infrastructure services
pub mod config;

use cache::RedisClient;
use config::{InfrastructureConfig, StoreBackend};
use store::RedisRowStore;

/// Infrastructure service container
#[derive(Clone)]
pub struct InfrastructureServices {
    /// Row store backing passcodes and rate limit events
    pub store: Arc<dyn RowStore>,
    /// Delivery for every channel
    pub notifier: Arc<dyn Notifier>,
    /// Redis client, when the Redis backend is selected
    pub redis: Option<RedisClient>,
}

impl InfrastructureServices {
    /// Check the backing store is reachable
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        match &self.redis {
            Some(client) => client.health_check().await,
            None => Ok(true),
        }
    }
}

/// Initialize infrastructure services
///
/// This function sets up:
/// - The row store (in-memory or Redis)
/// - SMS and email notifiers behind a channel router
pub async fn initialize(
    cache: &otp_shared::CacheConfig,
) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!("Initializing infrastructure services...");

    let config = load_config()?;
    let services = initialize_with(&config, cache).await?;

    tracing::info!("Infrastructure services initialized successfully");
    Ok(services)
}

/// Initialize from an explicit configuration
pub async fn initialize_with(
    config: &InfrastructureConfig,
    cache: &otp_shared::CacheConfig,
) -> Result<InfrastructureServices, InfrastructureError> {
    let (store, redis): (Arc<dyn RowStore>, Option<RedisClient>) = match config.store {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory row store; state is lost on restart");
            (Arc::new(MemoryRowStore::new()), None)
        }
        StoreBackend::Redis => {
            let client = RedisClient::new(cache.clone()).await?;
            (Arc::new(RedisRowStore::new(client.clone())), Some(client))
        }
    };

    let notifier = notify::create_notifier(&config.sms, &config.email, config.reveal_codes)?;

    Ok(InfrastructureServices {
        store,
        notifier,
        redis,
    })
}

/// Load infrastructure configuration from environment
fn load_config() -> Result<InfrastructureConfig, InfrastructureError> {
    dotenvy::dotenv().ok(); // Load .env file if present
    InfrastructureConfig::from_env()
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMS service error
    #[error("SMS service error: {0}")]
    Sms(String),

    /// Email service error
    #[error("Email service error: {0}")]
    Email(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for StoreError {
    fn from(err: InfrastructureError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}
