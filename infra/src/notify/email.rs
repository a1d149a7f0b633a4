//! SMTP email delivery

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{header, Mailbox, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use otp_core::{Channel, CodeDelivery, Notifier};
use otp_shared::email::mask_email;
use tracing::{debug, info};

use crate::config::EmailConfig;
use crate::InfrastructureError;

pub struct SmtpEmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailNotifier {
    pub fn new(config: EmailConfig) -> Result<Self, InfrastructureError> {
        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .map_err(|e| InfrastructureError::Config(format!("Invalid from address: {}", e)))?;

        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host).map_err(|e| {
                InfrastructureError::Config(format!("Failed to create SMTP transport: {}", e))
            })?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
        };

        let mut builder = builder
            .port(config.smtp_port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        info!(
            host = %config.smtp_host,
            port = config.smtp_port,
            tls = config.use_tls,
            "SMTP email notifier initialized"
        );

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, delivery: &CodeDelivery) -> Result<Message, InfrastructureError> {
        let to: Mailbox = delivery
            .destination
            .parse()
            .map_err(|e| InfrastructureError::Email(format!("Invalid to address: {}", e)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(delivery.subject_line())
            .singlepart(
                SinglePart::builder()
                    .header(header::ContentType::TEXT_PLAIN)
                    .body(delivery.message_body()),
            )
            .map_err(|e| InfrastructureError::Email(format!("Failed to build message: {}", e)))
    }
}

#[async_trait]
impl Notifier for SmtpEmailNotifier {
    async fn deliver(&self, delivery: &CodeDelivery) -> Result<String, String> {
        if delivery.channel != Channel::Email {
            return Err(format!("SMTP cannot deliver to {} destinations", delivery.channel));
        }

        let message = self.build_message(delivery).map_err(|e| e.to_string())?;
        debug!(to = %mask_email(&delivery.destination), "Sending passcode email");

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| InfrastructureError::Email(format!("Failed to send email: {}", e)).to_string())?;

        let message_id = response.message().collect::<Vec<_>>().join(" ");
        info!(to = %mask_email(&delivery.destination), "Passcode email sent");
        Ok(message_id)
    }

    fn name(&self) -> &str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otp_core::PlaintextCode;

    fn config() -> EmailConfig {
        EmailConfig {
            provider: "smtp".to_string(),
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            use_tls: false,
            ..EmailConfig::default()
        }
    }

    fn delivery(destination: &str) -> CodeDelivery {
        CodeDelivery {
            destination: destination.to_string(),
            channel: Channel::Email,
            code: PlaintextCode::new("482913"),
            expires_in_minutes: 3,
        }
    }

    #[test]
    fn test_rejects_invalid_from_address() {
        let bad = EmailConfig {
            from_email: "not an address".to_string(),
            ..config()
        };
        assert!(SmtpEmailNotifier::new(bad).is_err());
    }

    #[tokio::test]
    async fn test_builds_message_with_code() {
        let notifier = SmtpEmailNotifier::new(config()).unwrap();
        let message = notifier.build_message(&delivery("alice@example.com")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("alice@example.com"));
        assert!(raw.contains("482913"));
    }

    #[tokio::test]
    async fn test_rejects_phone_channel() {
        let notifier = SmtpEmailNotifier::new(config()).unwrap();
        let mut phone = delivery("+61412345678");
        phone.channel = Channel::Phone;

        assert!(notifier.deliver(&phone).await.is_err());
    }
}
