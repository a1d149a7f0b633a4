//! Per-channel dispatch to the configured providers

use std::sync::Arc;

use async_trait::async_trait;
use otp_core::{Channel, CodeDelivery, Notifier};

pub struct ChannelRouter {
    sms: Arc<dyn Notifier>,
    email: Arc<dyn Notifier>,
}

impl ChannelRouter {
    pub fn new(sms: Arc<dyn Notifier>, email: Arc<dyn Notifier>) -> Self {
        Self { sms, email }
    }

    fn route(&self, channel: Channel) -> &Arc<dyn Notifier> {
        match channel {
            Channel::Phone => &self.sms,
            Channel::Email => &self.email,
        }
    }
}

#[async_trait]
impl Notifier for ChannelRouter {
    async fn deliver(&self, delivery: &CodeDelivery) -> Result<String, String> {
        self.route(delivery.channel).deliver(delivery).await
    }

    fn name(&self) -> &str {
        "router"
    }
}
