//! Passcode delivery providers
//!
//! - **Log**: writes deliveries to the log, for development
//! - **Twilio**: SMS over the Twilio API (feature `twilio-sms`)
//! - **SMTP**: email over SMTP (feature `smtp-email`)
//! - **Router**: picks a provider per channel

use std::sync::Arc;

use otp_core::Notifier;

use crate::config::{EmailConfig, SmsConfig};
use crate::InfrastructureError;

pub mod log;
pub mod router;

#[cfg(feature = "smtp-email")]
pub mod email;
#[cfg(feature = "twilio-sms")]
pub mod twilio;

pub use log::LogNotifier;
pub use router::ChannelRouter;

#[cfg(feature = "smtp-email")]
pub use email::SmtpEmailNotifier;
#[cfg(feature = "twilio-sms")]
pub use twilio::{TwilioConfig, TwilioSmsNotifier};


/// Build the channel router for the configured providers
///
/// Unlike a missing optional provider at runtime, a provider name that is
/// unknown or not compiled in is a configuration error.
///
/// `reveal_codes` only affects the log provider.
pub fn create_notifier(
    sms: &SmsConfig,
    email: &EmailConfig,
    reveal_codes: bool,
) -> Result<Arc<dyn Notifier>, InfrastructureError> {
    let sms_notifier = create_sms_notifier(sms, reveal_codes)?;
    let email_notifier = create_email_notifier(email, reveal_codes)?;

    tracing::info!(
        sms_provider = sms_notifier.name(),
        email_provider = email_notifier.name(),
        "Passcode notifiers configured"
    );

    Ok(Arc::new(ChannelRouter::new(sms_notifier, email_notifier)))
}

fn log_notifier(reveal_codes: bool) -> LogNotifier {
    if reveal_codes {
        tracing::warn!("Log notifier will print issued passcodes");
        LogNotifier::revealing_codes()
    } else {
        LogNotifier::new()
    }
}

fn create_sms_notifier(
    config: &SmsConfig,
    reveal_codes: bool,
) -> Result<Arc<dyn Notifier>, InfrastructureError> {
    match config.provider.as_str() {
        "log" | "mock" => Ok(Arc::new(log_notifier(reveal_codes))),
        #[cfg(feature = "twilio-sms")]
        "twilio" => {
            let twilio_config = TwilioConfig {
                account_sid: config.account_sid.clone(),
                auth_token: config.auth_token.clone(),
                from_number: config.from_number.clone(),
                max_retries: 3,
                retry_delay_ms: 1000,
            };
            Ok(Arc::new(TwilioSmsNotifier::new(twilio_config)?))
        }
        other => Err(InfrastructureError::Config(format!(
            "Unsupported SMS provider: {}",
            other
        ))),
    }
}

fn create_email_notifier(
    config: &EmailConfig,
    reveal_codes: bool,
) -> Result<Arc<dyn Notifier>, InfrastructureError> {
    match config.provider.as_str() {
        "log" | "mock" => Ok(Arc::new(log_notifier(reveal_codes))),
        #[cfg(feature = "smtp-email")]
        "smtp" => Ok(Arc::new(SmtpEmailNotifier::new(config.clone())?)),
        other => Err(InfrastructureError::Config(format!(
            "Unsupported email provider: {}",
            other
        ))),
    }
}
