//! Types passed across the dispatch service boundary

use chrono::{DateTime, Utc};

use crate::domain::value_objects::{Channel, PlaintextCode};

/// Everything a notifier needs to send one code
#[derive(Debug, Clone)]
pub struct CodeDelivery {
    /// Destination in the form the channel expects (E.164 phone or trimmed email)
    pub destination: String,
    pub channel: Channel,
    pub code: PlaintextCode,
    pub expires_in_minutes: i64,
}

impl CodeDelivery {
    /// Default message text shared by the SMS and log notifiers
    pub fn message_body(&self) -> String {
        format!(
            "Your verification code is {}. It expires in {} minutes. Do not share this code with anyone.",
            self.code.expose(),
            self.expires_in_minutes
        )
    }

    /// Subject line for email delivery
    pub fn subject_line(&self) -> String {
        format!("Your verification code: {}", self.code.expose())
    }
}

/// Result of a successful `issue_and_send`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueReceipt {
    /// When the delivered code stops working; `None` when no code was sent
    pub expires_at: Option<DateTime<Utc>>,
    /// Seconds the code stays valid
    pub expires_in_seconds: i64,
    /// Provider message id
    pub message_id: Option<String>,
}

impl IssueReceipt {
    /// Whether a code was actually generated and sent
    pub fn was_sent(&self) -> bool {
        self.message_id.is_some()
    }
}
