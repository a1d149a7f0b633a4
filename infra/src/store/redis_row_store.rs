//! Redis implementation of the core row store
//!
//! Key layout, relative to the configured key prefix:
//!
//! - `row:<partition id>:<row key>`: hash `{ value, etag }`
//! - `idx:<partition id>`: sorted set of the partition's row keys
//!
//! The partition id is the SHA-256 of the partition name, so destinations
//! never appear in key names. Every write goes through a Lua script, which
//! makes compare-and-set and index maintenance atomic. Rows written with
//! `upsert_expiring` carry a `PEXPIRE`; `HSET` in the conditional replace
//! keeps it.

use async_trait::async_trait;
use chrono::Duration;
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use otp_core::{
    ConcurrencyToken, ConditionalWrite, RowRange, RowStore, StoreError, StoreResult, StoredRow,
};

use super::scripts;
use crate::cache::RedisClient;

#[derive(Clone)]
pub struct RedisRowStore {
    client: RedisClient,
}

impl RedisRowStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Opaque, fixed-length identifier for a partition
    pub fn partition_id(partition: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(partition.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn row_prefix(&self, partition: &str) -> String {
        self.client
            .make_key(&format!("row:{}:", Self::partition_id(partition)))
    }

    fn row_key(&self, partition: &str, row_key: &str) -> String {
        format!("{}{}", self.row_prefix(partition), row_key)
    }

    fn index_key(&self, partition: &str) -> String {
        self.client
            .make_key(&format!("idx:{}", Self::partition_id(partition)))
    }

    fn new_token() -> ConcurrencyToken {
        ConcurrencyToken::new(Uuid::new_v4().simple().to_string())
    }

    async fn write(
        &self,
        partition: &str,
        row_key: &str,
        value: &str,
        ttl_ms: i64,
    ) -> StoreResult<ConcurrencyToken> {
        let row = self.row_key(partition, row_key);
        let index = self.index_key(partition);
        let token = Self::new_token();

        // Same token on every attempt, so a retried write is idempotent
        self.client
            .execute_with_retry(|mut conn| {
                let (row, index) = (row.clone(), index.clone());
                let (value, etag, member) =
                    (value.to_string(), token.as_str().to_string(), row_key.to_string());
                Box::pin(async move {
                    scripts::UPSERT
                        .key(row)
                        .key(index)
                        .arg(value)
                        .arg(etag)
                        .arg(member)
                        .arg(ttl_ms)
                        .invoke_async::<_, i32>(&mut conn)
                        .await
                })
            })
            .await?;

        Ok(token)
    }

    /// Remaining lifetime of a row in milliseconds; `None` when the row is
    /// missing or never expires
    pub async fn row_ttl_millis(&self, partition: &str, row_key: &str) -> StoreResult<Option<i64>> {
        self.pttl(self.row_key(partition, row_key)).await
    }

    /// Remaining lifetime of a partition's index in milliseconds
    pub async fn index_ttl_millis(&self, partition: &str) -> StoreResult<Option<i64>> {
        self.pttl(self.index_key(partition)).await
    }

    async fn pttl(&self, key: String) -> StoreResult<Option<i64>> {
        let ttl = self
            .client
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                Box::pin(async move { redis::cmd("PTTL").arg(key).query_async::<_, i64>(&mut conn).await })
            })
            .await?;
        Ok((ttl >= 0).then_some(ttl))
    }
}

#[async_trait]
impl RowStore for RedisRowStore {
    async fn get(&self, partition: &str, row_key: &str) -> StoreResult<Option<StoredRow>> {
        let key = self.row_key(partition, row_key);

        let (value, etag) = self
            .client
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                Box::pin(async move {
                    redis::cmd("HMGET")
                        .arg(key)
                        .arg("value")
                        .arg("etag")
                        .query_async::<_, (Option<String>, Option<String>)>(&mut conn)
                        .await
                })
            })
            .await?;

        match (value, etag) {
            (Some(value), Some(etag)) => Ok(Some(StoredRow {
                row_key: row_key.to_string(),
                value,
                token: ConcurrencyToken::new(etag),
            })),
            (None, None) => Ok(None),
            _ => Err(StoreError::Corrupt {
                partition: partition.to_string(),
                row_key: row_key.to_string(),
                reason: "row hash is missing a field".to_string(),
            }),
        }
    }

    async fn upsert(&self, partition: &str, row_key: &str, value: &str) -> StoreResult<ConcurrencyToken> {
        self.write(partition, row_key, value, 0).await
    }

    async fn upsert_expiring(
        &self,
        partition: &str,
        row_key: &str,
        value: &str,
        ttl: Duration,
    ) -> StoreResult<ConcurrencyToken> {
        // Never 0, which the script reads as "no expiry"
        let ttl_ms = ttl.num_milliseconds().max(1);
        self.write(partition, row_key, value, ttl_ms).await
    }

    async fn replace_if_match(
        &self,
        partition: &str,
        row_key: &str,
        value: &str,
        expected: &ConcurrencyToken,
    ) -> StoreResult<ConditionalWrite> {
        let row = self.row_key(partition, row_key);
        let token = Self::new_token();
        let (value, etag, expected_etag) = (
            value.to_string(),
            token.as_str().to_string(),
            expected.as_str().to_string(),
        );

        let applied = self
            .client
            .execute_once(|mut conn| {
                Box::pin(async move {
                    scripts::REPLACE_IF_MATCH
                        .key(row)
                        .arg(value)
                        .arg(etag)
                        .arg(expected_etag)
                        .invoke_async::<_, i32>(&mut conn)
                        .await
                })
            })
            .await?;

        if applied == 1 {
            Ok(ConditionalWrite::Applied(token))
        } else {
            debug!(row_key = row_key, "Conditional replace lost to a newer write");
            Ok(ConditionalWrite::Conflict)
        }
    }

    async fn delete_if_match(
        &self,
        partition: &str,
        row_key: &str,
        expected: &ConcurrencyToken,
    ) -> StoreResult<ConditionalWrite> {
        let row = self.row_key(partition, row_key);
        let index = self.index_key(partition);
        let (expected_etag, member) = (expected.as_str().to_string(), row_key.to_string());

        let applied = self
            .client
            .execute_once(|mut conn| {
                Box::pin(async move {
                    scripts::DELETE_IF_MATCH
                        .key(row)
                        .key(index)
                        .arg(expected_etag)
                        .arg(member)
                        .invoke_async::<_, i32>(&mut conn)
                        .await
                })
            })
            .await?;

        if applied == 1 {
            Ok(ConditionalWrite::Applied(expected.clone()))
        } else {
            debug!(row_key = row_key, "Conditional delete lost to a newer write");
            Ok(ConditionalWrite::Conflict)
        }
    }

    async fn delete(&self, partition: &str, row_key: &str) -> StoreResult<bool> {
        let row = self.row_key(partition, row_key);
        let index = self.index_key(partition);

        let removed = self
            .client
            .execute_with_retry(|mut conn| {
                let (row, index, member) = (row.clone(), index.clone(), row_key.to_string());
                Box::pin(async move {
                    scripts::DELETE
                        .key(row)
                        .key(index)
                        .arg(member)
                        .invoke_async::<_, i32>(&mut conn)
                        .await
                })
            })
            .await?;

        Ok(removed > 0)
    }

    async fn scan(
        &self,
        partition: &str,
        range: &RowRange,
        limit: Option<usize>,
    ) -> StoreResult<Vec<StoredRow>> {
        if range.start >= range.end || limit == Some(0) {
            return Ok(Vec::new());
        }

        let index = self.index_key(partition);
        let prefix = self.row_prefix(partition);
        let min = format!("[{}", range.start);
        let max = format!("({}", range.end);
        let limit = limit.unwrap_or(0);

        let flat = self
            .client
            .execute_with_retry(|mut conn| {
                let (index, min, max, prefix) =
                    (index.clone(), min.clone(), max.clone(), prefix.clone());
                Box::pin(async move {
                    scripts::SCAN
                        .key(index)
                        .arg(min)
                        .arg(max)
                        .arg(limit)
                        .arg(prefix)
                        .invoke_async::<_, Vec<String>>(&mut conn)
                        .await
                })
            })
            .await?;

        if flat.len() % 3 != 0 {
            return Err(StoreError::Corrupt {
                partition: partition.to_string(),
                row_key: range.start.clone(),
                reason: "scan returned an incomplete row".to_string(),
            });
        }

        Ok(flat
            .chunks(3)
            .map(|triple| StoredRow {
                row_key: triple[0].clone(),
                value: triple[1].clone(),
                token: ConcurrencyToken::new(triple[2].clone()),
            })
            .collect())
    }
}
