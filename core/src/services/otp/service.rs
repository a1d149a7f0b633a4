//! Dispatch service implementation

use std::sync::Arc;

use tracing;

use crate::domain::value_objects::{Channel, SubjectKey};
use crate::errors::{DomainError, DomainResult, OtpError};
use crate::repositories::RowStore;
use crate::services::clock::{Clock, SystemClock};
use crate::services::code::{CodeGenerator, SecureCodeGenerator};
use crate::services::credential::CredentialStore;
use crate::services::rate_limit::{EventSweeper, RateLimiter};

use super::config::OtpServiceConfig;
use super::policy::AccessPolicy;
use super::traits::Notifier;
use super::types::{CodeDelivery, IssueReceipt};

/// Entry point for issuing, verifying and clearing passcodes
///
/// Holds no state of its own beyond the injected components; all
/// coordination between concurrent callers goes through the row store.
pub struct OtpService {
    credentials: CredentialStore,
    limiter: RateLimiter,
    sweeper: Arc<EventSweeper>,
    notifier: Arc<dyn Notifier>,
    policy: Arc<dyn AccessPolicy>,
    config: OtpServiceConfig,
}

impl OtpService {
    /// Create a service using the wall clock and the OS random generator
    pub fn new(
        store: Arc<dyn RowStore>,
        notifier: Arc<dyn Notifier>,
        policy: Arc<dyn AccessPolicy>,
        config: OtpServiceConfig,
    ) -> Self {
        Self::with_components(
            store,
            notifier,
            policy,
            Arc::new(SystemClock),
            Arc::new(SecureCodeGenerator),
            config,
        )
    }

    /// Create a service with an explicit clock and code generator
    pub fn with_components(
        store: Arc<dyn RowStore>,
        notifier: Arc<dyn Notifier>,
        policy: Arc<dyn AccessPolicy>,
        clock: Arc<dyn Clock>,
        generator: Arc<dyn CodeGenerator>,
        config: OtpServiceConfig,
    ) -> Self {
        let credentials = CredentialStore::new(
            store.clone(),
            clock.clone(),
            generator,
            config.code_ttl,
            config.max_attempts,
        );
        let limiter = RateLimiter::new(
            store.clone(),
            clock.clone(),
            config.max_generations,
            config.rate_window,
        );
        let sweeper = Arc::new(EventSweeper::new(store, clock, config.rate_window));

        Self {
            credentials,
            limiter,
            sweeper,
            notifier,
            policy,
            config,
        }
    }

    pub fn config(&self) -> &OtpServiceConfig {
        &self.config
    }

    /// Issue a new code for `destination` and deliver it over `channel`
    ///
    /// This method:
    /// 1. Validates the destination for the channel
    /// 2. Applies policy carve-outs (no code is generated for those)
    /// 3. Admits the request through the rate limiter
    /// 4. Stores the new code, superseding any previous one
    /// 5. Starts a background sweep of expired rate limit rows
    /// 6. Hands the code to the notifier
    ///
    /// # Returns
    ///
    /// * `Ok(IssueReceipt)` - Code issued (or skipped by policy)
    /// * `Err(DomainError)` - Missing or invalid destination, rate limited,
    ///   delivery failure or store failure
    pub async fn issue_and_send(&self, destination: &str, channel: Channel) -> DomainResult<IssueReceipt> {
        if destination.trim().is_empty() {
            return Err(DomainError::missing("destination"));
        }
        let destination = channel.prepare_destination(destination)?;
        let subject = SubjectKey::parse(&destination, "destination")?;

        if self.policy.skip_issue(&subject) {
            tracing::info!(
                subject = %subject.masked(),
                channel = %channel,
                event = "otp_issue_bypassed",
                "Skipping passcode issue for carve-out subject"
            );
            return Ok(IssueReceipt {
                expires_at: None,
                expires_in_seconds: self.config.code_ttl.num_seconds(),
                message_id: None,
            });
        }

        self.limiter.check_and_record(&subject).await?;
        let issued = self.credentials.issue(&subject).await?;

        // Detached; the handle is dropped on purpose
        let _ = self.sweeper.spawn(subject.clone());

        let delivery = CodeDelivery {
            destination,
            channel,
            code: issued.code,
            expires_in_minutes: self.config.code_ttl_minutes(),
        };
        let message_id = self.notifier.deliver(&delivery).await.map_err(|reason| {
            tracing::error!(
                subject = %subject.masked(),
                channel = %channel,
                provider = self.notifier.name(),
                error = %reason,
                event = "otp_notification_failed",
                "Failed to deliver passcode"
            );
            DomainError::from(OtpError::NotificationFailed { reason })
        })?;

        tracing::info!(
            subject = %subject.masked(),
            channel = %channel,
            provider = self.notifier.name(),
            message_id = %message_id,
            event = "otp_sent",
            "Passcode delivered"
        );

        Ok(IssueReceipt {
            expires_at: Some(issued.expires_at),
            expires_in_seconds: self.config.code_ttl.num_seconds(),
            message_id: Some(message_id),
        })
    }

    /// Check `candidate` for a subject or raw destination
    ///
    /// Returns `false` for every kind of rejection. Errors are reserved for
    /// missing input and store failures.
    pub async fn verify(&self, subject: &str, candidate: &str) -> DomainResult<bool> {
        let subject = SubjectKey::parse(subject, "subject")?;
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Err(DomainError::missing("code"));
        }

        if let Some(forced) = self.policy.forced_outcome(&subject, candidate) {
            tracing::info!(
                subject = %subject.masked(),
                verified = forced,
                event = "otp_verify_bypassed",
                "Carve-out subject verified against fixed code"
            );
            return Ok(forced);
        }

        self.credentials.verify(&subject, candidate).await
    }

    /// Invalidate any outstanding code for `subject`
    pub async fn clear(&self, subject: &str) -> DomainResult<()> {
        let subject = SubjectKey::parse(subject, "subject")?;
        self.credentials.clear(&subject).await
    }
}
