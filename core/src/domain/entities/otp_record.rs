//! Passcode record entity, one per subject.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed row key holding the outstanding passcode of a subject
pub const CURRENT_ROW: &str = "current";

/// Maximum number of verification attempts per issued code
pub const MAX_ATTEMPTS: u32 = 5;

/// Lifetime of an issued code (3 minutes)
pub const CODE_TTL_SECONDS: i64 = 180;

/// The outstanding passcode for a subject
///
/// Only the digest of the code is ever persisted. The plaintext exists
/// in memory long enough to be handed to the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRecord {
    /// Normalized subject this code was issued for
    pub subject_key: String,

    /// Hex encoded digest of the code
    pub hashed_code: String,

    /// Instant after which the code is rejected
    pub expires_at: DateTime<Utc>,

    /// Verification attempts made so far, successful or not
    pub attempt_count: u32,

    /// Issue time
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn new(
        subject_key: impl Into<String>,
        hashed_code: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            subject_key: subject_key.into(),
            hashed_code: hashed_code.into(),
            expires_at: issued_at + ttl,
            attempt_count: 0,
            created_at: issued_at,
        }
    }

    /// Expired once `now` has passed `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether the attempt budget is spent
    pub fn is_locked_out(&self, max_attempts: u32) -> bool {
        self.attempt_count >= max_attempts
    }

    /// Copy of this record with one more attempt recorded
    pub fn with_attempt(&self) -> Self {
        Self {
            attempt_count: self.attempt_count.saturating_add(1),
            ..self.clone()
        }
    }

    /// Seconds of validity left, zero once expired
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_new_record_expiry() {
        let record = OtpRecord::new("a@x.com", "abc", issued_at(), Duration::seconds(CODE_TTL_SECONDS));

        assert_eq!(record.attempt_count, 0);
        assert_eq!(record.expires_at, issued_at() + Duration::minutes(3));
        assert_eq!(record.remaining_seconds(issued_at()), 180);
    }

    #[test]
    fn test_expiry_boundary() {
        let record = OtpRecord::new("a@x.com", "abc", issued_at(), Duration::seconds(CODE_TTL_SECONDS));

        assert!(!record.is_expired_at(record.expires_at));
        assert!(record.is_expired_at(record.expires_at + Duration::milliseconds(1)));
        assert_eq!(record.remaining_seconds(record.expires_at + Duration::seconds(5)), 0);
    }

    #[test]
    fn test_lockout_after_max_attempts() {
        let mut record = OtpRecord::new("a@x.com", "abc", issued_at(), Duration::seconds(CODE_TTL_SECONDS));

        for _ in 0..MAX_ATTEMPTS - 1 {
            record = record.with_attempt();
            assert!(!record.is_locked_out(MAX_ATTEMPTS));
        }

        record = record.with_attempt();
        assert!(record.is_locked_out(MAX_ATTEMPTS));
    }

    #[test]
    fn test_serialized_field_names() {
        let record = OtpRecord::new("a@x.com", "abc", issued_at(), Duration::seconds(CODE_TTL_SECONDS));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["subjectKey"], "a@x.com");
        assert_eq!(json["hashedCode"], "abc");
        assert_eq!(json["attemptCount"], 0);
        assert!(json.get("expiresAt").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
