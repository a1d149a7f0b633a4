//! Row store trait defining the persistence contract for passcode state.

use std::fmt;

use async_trait::async_trait;
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Opaque version marker returned with every read and write
///
/// A conditional write succeeds only while the row still carries the
/// token the caller read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConcurrencyToken(String);

impl ConcurrencyToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConcurrencyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A row as read from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    pub row_key: String,
    pub value: String,
    pub token: ConcurrencyToken,
}

impl StoredRow {
    /// Decode the JSON payload of this row
    pub fn decode<T: serde::de::DeserializeOwned>(&self, partition: &str) -> StoreResult<T> {
        serde_json::from_str(&self.value).map_err(|e| StoreError::Corrupt {
            partition: partition.to_string(),
            row_key: self.row_key.clone(),
            reason: e.to_string(),
        })
    }
}

/// Result of a conditional write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionalWrite {
    /// The write happened; carries the row's new token
    Applied(ConcurrencyToken),
    /// The row changed or vanished since it was read
    Conflict,
}

impl ConditionalWrite {
    pub fn is_applied(&self) -> bool {
        matches!(self, ConditionalWrite::Applied(_))
    }
}

/// Half-open row key range `[start, end)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRange {
    pub start: String,
    pub end: String,
}

impl RowRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn contains(&self, row_key: &str) -> bool {
        row_key >= self.start.as_str() && row_key < self.end.as_str()
    }
}

/// Partitioned key/value store with optimistic concurrency
///
/// Rows are addressed by `(partition, row_key)` and hold a JSON string.
/// Every row carries a [`ConcurrencyToken`] that changes on each write.
///
/// # Guarantees implementations must give
/// - `scan` returns rows in ascending row key order
/// - `replace_if_match` and `delete_if_match` are atomic with respect to
///   every other write on the same row
/// - A conditional write against a missing row is a `Conflict`
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Point read of a single row
    async fn get(&self, partition: &str, row_key: &str) -> StoreResult<Option<StoredRow>>;

    /// Insert or overwrite a row unconditionally
    async fn upsert(&self, partition: &str, row_key: &str, value: &str) -> StoreResult<ConcurrencyToken>;

    /// Insert or overwrite a row the store may drop once `ttl` has passed
    ///
    /// Conditional replaces keep the expiry. Stores without native expiry
    /// keep the row until it is deleted.
    async fn upsert_expiring(
        &self,
        partition: &str,
        row_key: &str,
        value: &str,
        ttl: Duration,
    ) -> StoreResult<ConcurrencyToken> {
        let _ = ttl;
        self.upsert(partition, row_key, value).await
    }

    /// Overwrite a row only if it still carries `expected`
    async fn replace_if_match(
        &self,
        partition: &str,
        row_key: &str,
        value: &str,
        expected: &ConcurrencyToken,
    ) -> StoreResult<ConditionalWrite>;

    /// Delete a row only if it still carries `expected`
    ///
    /// `Applied` carries the token the row had when it was removed.
    async fn delete_if_match(
        &self,
        partition: &str,
        row_key: &str,
        expected: &ConcurrencyToken,
    ) -> StoreResult<ConditionalWrite>;

    /// Delete a row unconditionally, returning whether it existed
    async fn delete(&self, partition: &str, row_key: &str) -> StoreResult<bool>;

    /// Rows of `partition` whose key falls in `range`, ascending,
    /// stopping after `limit` rows when given
    async fn scan(
        &self,
        partition: &str,
        range: &RowRange,
        limit: Option<usize>,
    ) -> StoreResult<Vec<StoredRow>>;
}
