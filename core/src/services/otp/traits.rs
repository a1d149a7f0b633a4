//! Traits for delivery integration

use async_trait::async_trait;

use super::types::CodeDelivery;

/// Delivers a freshly issued code to its destination
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send the code, returning a provider message id
    async fn deliver(&self, delivery: &CodeDelivery) -> Result<String, String>;

    /// Provider name for logs
    fn name(&self) -> &str;
}
