//! Per-subject sliding window limit on passcode issuance
//!
//! Every successful admission is recorded as a generation event row in the
//! subject's partition. Admission counts the events whose key falls inside
//! the window and rejects once the count reaches the limit.
//!
//! Count and record are two separate store calls, so concurrent requests
//! may each see a count below the limit and all be admitted. The limit is
//! therefore soft by a small margin under contention.

use std::sync::Arc;

use chrono::Duration;
use tracing;

use crate::domain::entities::{GenerationEvent, GEN_ROW_END};
use crate::domain::value_objects::SubjectKey;
use crate::errors::{DomainResult, OtpError, StoreError};
use crate::repositories::{RowRange, RowStore, StoredRow};
use crate::services::clock::Clock;

pub struct RateLimiter {
    store: Arc<dyn RowStore>,
    clock: Arc<dyn Clock>,
    max_generations: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(
        store: Arc<dyn RowStore>,
        clock: Arc<dyn Clock>,
        max_generations: u32,
        window: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            max_generations,
            window,
        }
    }

    /// Admit one issuance for `subject` and record it, or reject
    ///
    /// # Returns
    /// * `Ok(())` - Admitted; a generation event has been written
    /// * `Err(OtpError::RateLimitExceeded)` - Limit reached; nothing written
    /// * `Err(StoreError)` - Store failure
    pub async fn check_and_record(&self, subject: &SubjectKey) -> DomainResult<()> {
        let now = self.clock.now();
        let window_start = now - self.window;
        let range = RowRange::new(GenerationEvent::lower_bound(window_start), GEN_ROW_END);

        // The count only matters up to the limit, so never read more
        let recent = self
            .store
            .scan(subject.as_str(), &range, Some(self.max_generations as usize))
            .await?;

        if recent.len() >= self.max_generations as usize {
            let retry_after_seconds = self.retry_after(subject, recent.first(), now);
            tracing::warn!(
                subject = %subject.masked(),
                recent = recent.len(),
                limit = self.max_generations,
                retry_after_seconds = retry_after_seconds,
                event = "rate_limit_exceeded",
                "Passcode issuance rate limit exceeded"
            );
            return Err(OtpError::RateLimitExceeded {
                retry_after_seconds,
                limit: self.max_generations,
                window_seconds: self.window.num_seconds().max(0) as u64,
            }
            .into());
        }

        let event = GenerationEvent::new(subject.as_str(), now);
        let payload = serde_json::to_string(&event).map_err(StoreError::from)?;
        self.store
            .upsert_expiring(subject.as_str(), &event.row_key(), &payload, self.window)
            .await?;

        tracing::debug!(
            subject = %subject.masked(),
            admitted = recent.len() + 1,
            limit = self.max_generations,
            event = "otp_generation_recorded",
            "Recorded passcode generation event"
        );

        Ok(())
    }

    /// Seconds until the oldest counted event leaves the window, at least 1
    fn retry_after(
        &self,
        subject: &SubjectKey,
        oldest: Option<&StoredRow>,
        now: chrono::DateTime<chrono::Utc>,
    ) -> u64 {
        let oldest_created = oldest.and_then(|row| {
            row.decode::<GenerationEvent>(subject.as_str())
                .map_err(|e| {
                    tracing::warn!(
                        subject = %subject.masked(),
                        error = %e,
                        "Unreadable generation event, assuming full window"
                    );
                })
                .ok()
                .map(|event| event.created_at)
        });

        let seconds = match oldest_created {
            Some(created_at) => (created_at + self.window - now).num_seconds(),
            None => self.window.num_seconds(),
        };
        seconds.max(1) as u64
    }
}
