//! Log-only delivery for development
//!
//! Nothing leaves the process. The destination is masked; the code itself
//! is only written when `reveal_codes` is switched on, at debug level.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use otp_core::{CodeDelivery, Notifier};
use otp_shared::utils::mask_destination;

#[derive(Debug, Default)]
pub struct LogNotifier {
    reveal_codes: bool,
    message_counter: AtomicU64,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also log the code, for local testing without a provider
    pub fn revealing_codes() -> Self {
        Self {
            reveal_codes: true,
            ..Self::default()
        }
    }

    pub fn reveals_codes(&self) -> bool {
        self.reveal_codes
    }

    /// Number of deliveries handled
    pub fn delivered(&self) -> u64 {
        self.message_counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, delivery: &CodeDelivery) -> Result<String, String> {
        let count = self.message_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let message_id = format!("log-{}", count);

        tracing::info!(
            destination = %mask_destination(&delivery.destination),
            channel = %delivery.channel,
            message_id = %message_id,
            "Passcode delivery logged instead of sent"
        );
        if self.reveal_codes {
            tracing::debug!(
                destination = %mask_destination(&delivery.destination),
                code = delivery.code.expose(),
                "Development passcode"
            );
        }

        Ok(message_id)
    }

    fn name(&self) -> &str {
        "log"
    }
}
