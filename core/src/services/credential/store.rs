//! Credential store: issue, verify and clear passcodes
//!
//! Each subject has at most one outstanding code, kept at the fixed
//! `current` row of its partition. Issuing overwrites that row, so an older
//! code stops working the moment a new one is stored.
//!
//! Verification consumes an attempt before comparing the code. The attempt
//! is recorded with a conditional write against the token observed on read;
//! if another writer got there first the attempt fails. Every write on this
//! path is conditional so a concurrently issued replacement is never
//! clobbered.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing;

use crate::domain::entities::{OtpRecord, CURRENT_ROW};
use crate::domain::value_objects::{PlaintextCode, SubjectKey};
use crate::errors::{DomainResult, StoreError};
use crate::repositories::{ConcurrencyToken, ConditionalWrite, RowStore};
use crate::services::clock::Clock;
use crate::services::code::{CodeDigest, CodeGenerator};

/// A code that was just stored and must now be delivered
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub code: PlaintextCode,
    pub expires_at: DateTime<Utc>,
}

/// Why a verification succeeded or failed
///
/// Only [`VerifyOutcome::is_success`] leaves this module's callers; the
/// reason is for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Code matched and the record was deleted
    Consumed,
    /// No outstanding code
    Absent,
    /// Code expired; record deleted
    Expired,
    /// Attempt budget spent; record deleted
    LockedOut,
    /// Code did not match
    Mismatch { attempts: u32 },
    /// Lost a race with another writer
    Conflict,
}

impl VerifyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, VerifyOutcome::Consumed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyOutcome::Consumed => "consumed",
            VerifyOutcome::Absent => "absent",
            VerifyOutcome::Expired => "expired",
            VerifyOutcome::LockedOut => "locked_out",
            VerifyOutcome::Mismatch { .. } => "mismatch",
            VerifyOutcome::Conflict => "conflict",
        }
    }
}

pub struct CredentialStore {
    store: Arc<dyn RowStore>,
    clock: Arc<dyn Clock>,
    generator: Arc<dyn CodeGenerator>,
    code_ttl: Duration,
    max_attempts: u32,
}

impl CredentialStore {
    pub fn new(
        store: Arc<dyn RowStore>,
        clock: Arc<dyn Clock>,
        generator: Arc<dyn CodeGenerator>,
        code_ttl: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            store,
            clock,
            generator,
            code_ttl,
            max_attempts,
        }
    }

    pub fn code_ttl(&self) -> Duration {
        self.code_ttl
    }

    /// Generate a code for `subject` and store its digest, replacing any
    /// outstanding code
    pub async fn issue(&self, subject: &SubjectKey) -> DomainResult<IssuedCode> {
        let code = self.generator.generate();
        let now = self.clock.now();
        let record = OtpRecord::new(
            subject.as_str(),
            CodeDigest::of(code.expose()).into_string(),
            now,
            self.code_ttl,
        );

        let payload = serde_json::to_string(&record).map_err(StoreError::from)?;
        self.store
            .upsert_expiring(subject.as_str(), CURRENT_ROW, &payload, self.code_ttl)
            .await?;

        tracing::info!(
            subject = %subject.masked(),
            expires_at = %record.expires_at,
            event = "otp_issued",
            "Stored new passcode"
        );

        Ok(IssuedCode {
            code,
            expires_at: record.expires_at,
        })
    }

    /// Check `candidate` against the outstanding code of `subject`
    ///
    /// Any failure reason collapses to `false`. Only store errors surface.
    pub async fn verify(&self, subject: &SubjectKey, candidate: &str) -> DomainResult<bool> {
        let outcome = self.evaluate(subject, candidate).await?;

        if outcome.is_success() {
            tracing::info!(
                subject = %subject.masked(),
                event = "otp_verified",
                "Passcode verified"
            );
        } else {
            tracing::info!(
                subject = %subject.masked(),
                reason = outcome.as_str(),
                event = "otp_verification_failed",
                "Passcode verification failed"
            );
        }

        Ok(outcome.is_success())
    }

    /// Run the verification state machine and report why it ended
    pub async fn evaluate(&self, subject: &SubjectKey, candidate: &str) -> DomainResult<VerifyOutcome> {
        let partition = subject.as_str();
        let Some(row) = self.store.get(partition, CURRENT_ROW).await? else {
            return Ok(VerifyOutcome::Absent);
        };
        let record: OtpRecord = row.decode(partition)?;
        let now = self.clock.now();

        if record.is_expired_at(now) {
            self.discard(subject, &row.token).await?;
            return Ok(VerifyOutcome::Expired);
        }

        if record.is_locked_out(self.max_attempts) {
            self.discard(subject, &row.token).await?;
            return Ok(VerifyOutcome::LockedOut);
        }

        // Claim the attempt before looking at the code
        let attempted = record.with_attempt();
        let payload = serde_json::to_string(&attempted).map_err(StoreError::from)?;
        let claimed = match self
            .store
            .replace_if_match(partition, CURRENT_ROW, &payload, &row.token)
            .await?
        {
            ConditionalWrite::Applied(token) => token,
            ConditionalWrite::Conflict => return Ok(VerifyOutcome::Conflict),
        };

        let digest = CodeDigest::from_stored(attempted.hashed_code.as_str());
        if !digest.matches(candidate) {
            // The attempt that spends the budget also removes the code
            if attempted.is_locked_out(self.max_attempts) {
                self.discard(subject, &claimed).await?;
            }
            return Ok(VerifyOutcome::Mismatch {
                attempts: attempted.attempt_count,
            });
        }

        match self
            .store
            .delete_if_match(partition, CURRENT_ROW, &claimed)
            .await?
        {
            ConditionalWrite::Applied(_) => Ok(VerifyOutcome::Consumed),
            // Someone else moved the record after our claim; only one of
            // the racing verifiers may consume the code
            ConditionalWrite::Conflict => Ok(VerifyOutcome::Conflict),
        }
    }

    /// Remove the outstanding code of `subject`, if any
    pub async fn clear(&self, subject: &SubjectKey) -> DomainResult<()> {
        let existed = self.store.delete(subject.as_str(), CURRENT_ROW).await?;
        tracing::info!(
            subject = %subject.masked(),
            existed = existed,
            event = "otp_cleared",
            "Cleared passcode"
        );
        Ok(())
    }

    /// Outstanding record of `subject` and its token
    pub async fn current(&self, subject: &SubjectKey) -> DomainResult<Option<(OtpRecord, ConcurrencyToken)>> {
        let partition = subject.as_str();
        match self.store.get(partition, CURRENT_ROW).await? {
            Some(row) => Ok(Some((row.decode(partition)?, row.token))),
            None => Ok(None),
        }
    }

    /// Conditional delete; losing the race leaves the newer record in place
    async fn discard(&self, subject: &SubjectKey, token: &ConcurrencyToken) -> DomainResult<()> {
        if let ConditionalWrite::Conflict = self
            .store
            .delete_if_match(subject.as_str(), CURRENT_ROW, token)
            .await?
        {
            tracing::debug!(
                subject = %subject.masked(),
                "Passcode record changed before it could be discarded"
            );
        }
        Ok(())
    }
}
