//! Twilio SMS delivery
//!
//! Retries transient provider failures with exponential backoff and gives
//! up immediately on client errors. Phone numbers are masked in logs.

use std::time::Duration;

use async_trait::async_trait;
use otp_core::{Channel, CodeDelivery, Notifier};
use otp_shared::phone::{is_valid_phone, mask_phone_number};
use tracing::{debug, error, info, warn};
use twilio::{Client, OutboundMessage};

use crate::InfrastructureError;

/// Twilio's hard limit on message body length
const MAX_MESSAGE_LENGTH: usize = 1600;

/// Twilio SMS service configuration
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// Twilio Account SID
    pub account_sid: String,
    /// Twilio Auth Token
    pub auth_token: String,
    /// From phone number (must be a Twilio phone number)
    pub from_number: String,
    /// Maximum attempts per message
    pub max_retries: u32,
    /// Initial retry delay in milliseconds
    pub retry_delay_ms: u64,
}

pub struct TwilioSmsNotifier {
    client: Client,
    config: TwilioConfig,
}

impl TwilioSmsNotifier {
    pub fn new(config: TwilioConfig) -> Result<Self, InfrastructureError> {
        if config.account_sid.is_empty() || config.auth_token.is_empty() {
            return Err(InfrastructureError::Config(
                "TWILIO_ACCOUNT_SID and TWILIO_AUTH_TOKEN must be set".to_string(),
            ));
        }
        if !is_valid_phone(&config.from_number) {
            return Err(InfrastructureError::Config(
                "TWILIO_FROM_NUMBER must be in E.164 format (starting with '+')".to_string(),
            ));
        }

        let client = Client::new(&config.account_sid, &config.auth_token);
        info!(
            "Twilio SMS notifier initialized with from number: {}",
            mask_phone_number(&config.from_number)
        );

        Ok(Self { client, config })
    }

    async fn send_with_retry(&self, to: &str, message: &str) -> Result<String, InfrastructureError> {
        let max_attempts = self.config.max_retries.max(1);
        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        loop {
            attempts += 1;
            debug!(
                "Sending SMS attempt {}/{} to {}",
                attempts,
                max_attempts,
                mask_phone_number(to)
            );

            let msg = OutboundMessage::new(&self.config.from_number, to, message);
            match self.client.send_message(msg).await {
                Ok(response) => {
                    info!(
                        "SMS sent to {} with SID: {}",
                        mask_phone_number(to),
                        response.sid
                    );
                    return Ok(response.sid);
                }
                Err(e) => {
                    error!(
                        "Failed to send SMS (attempt {}/{}): {}",
                        attempts, max_attempts, e
                    );
                    let error_msg = e.to_string();
                    if attempts >= max_attempts {
                        return Err(InfrastructureError::Sms(format!(
                            "Failed to send SMS after {} attempts: {}",
                            attempts, error_msg
                        )));
                    }
                    if is_client_error(&error_msg) {
                        return Err(InfrastructureError::Sms(format!(
                            "Invalid request: {}",
                            error_msg
                        )));
                    }

                    warn!("Retrying SMS delivery after {:?}", delay);
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
}

/// Provider errors that retrying cannot fix
fn is_client_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    (lower.contains("400") || lower.contains("invalid")) && !lower.contains("429")
}

#[async_trait]
impl Notifier for TwilioSmsNotifier {
    async fn deliver(&self, delivery: &CodeDelivery) -> Result<String, String> {
        if delivery.channel != Channel::Phone {
            return Err(format!("Twilio cannot deliver to {} destinations", delivery.channel));
        }
        if !is_valid_phone(&delivery.destination) {
            return Err("Phone number must be in E.164 format".to_string());
        }

        let message = delivery.message_body();
        if message.len() > MAX_MESSAGE_LENGTH {
            return Err("Message exceeds maximum length of 1600 characters".to_string());
        }

        self.send_with_retry(&delivery.destination, &message)
            .await
            .map_err(|e| e.to_string())
    }

    fn name(&self) -> &str {
        "twilio"
    }
}
