//! Generation events backing the issuance rate limit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row key prefix shared by every generation event
pub const GEN_ROW_PREFIX: &str = "gen_";

/// Exclusive upper bound of the generation event key range.
/// `~` sorts after every digit and underscore.
pub const GEN_ROW_END: &str = "gen_~";

/// Sliding window length for the issuance limit (10 minutes)
pub const RATE_WINDOW_SECONDS: i64 = 600;

/// Issuances allowed per subject within one window
pub const MAX_GENERATIONS: u32 = 3;

/// Width of the zero padded millisecond timestamp in row keys
const TIMESTAMP_WIDTH: usize = 20;

/// One successful issuance, kept for rate limiting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationEvent {
    pub subject_key: String,
    pub created_at: DateTime<Utc>,
}

impl GenerationEvent {
    pub fn new(subject_key: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            subject_key: subject_key.into(),
            created_at,
        }
    }

    /// Unique row key for this event
    ///
    /// Keys sort lexicographically in creation order, so a time range
    /// becomes a row key range. The random suffix keeps events created
    /// in the same millisecond distinct.
    pub fn row_key(&self) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}_{}", Self::lower_bound(self.created_at), &suffix[..12])
    }

    /// Smallest row key of any event created at or after `at`
    pub fn lower_bound(at: DateTime<Utc>) -> String {
        let millis = at.timestamp_millis().max(0);
        format!("{GEN_ROW_PREFIX}{millis:0width$}", width = TIMESTAMP_WIDTH)
    }
}
