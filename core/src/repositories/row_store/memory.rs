//! In-process row store

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::StoreError;

use super::r#trait::{ConcurrencyToken, ConditionalWrite, RowRange, RowStore, StoreResult, StoredRow};

#[derive(Debug, Clone)]
struct MemoryRow {
    value: String,
    version: u64,
}

/// Row store backed by ordered maps, for tests and single-node deployments
///
/// Every write stamps the row with a fresh version from a shared counter,
/// so tokens are never reused even after a row is deleted and recreated.
#[derive(Clone)]
pub struct MemoryRowStore {
    partitions: Arc<RwLock<HashMap<String, BTreeMap<String, MemoryRow>>>>,
    next_version: Arc<AtomicU64>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self {
            partitions: Arc::new(RwLock::new(HashMap::new())),
            next_version: Arc::new(AtomicU64::new(1)),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every subsequent call fail with `StoreError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of rows currently held in `partition`
    pub async fn row_count(&self, partition: &str) -> usize {
        self.partitions
            .read()
            .await
            .get(partition)
            .map_or(0, BTreeMap::len)
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }

    fn stamp(&self) -> u64 {
        self.next_version.fetch_add(1, Ordering::SeqCst)
    }

    fn token(version: u64) -> ConcurrencyToken {
        ConcurrencyToken::new(format!("v{}", version))
    }

    fn to_stored(row_key: &str, row: &MemoryRow) -> StoredRow {
        StoredRow {
            row_key: row_key.to_string(),
            value: row.value.clone(),
            token: Self::token(row.version),
        }
    }
}

impl Default for MemoryRowStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn get(&self, partition: &str, row_key: &str) -> StoreResult<Option<StoredRow>> {
        self.check_available()?;
        let partitions = self.partitions.read().await;
        Ok(partitions
            .get(partition)
            .and_then(|rows| rows.get(row_key))
            .map(|row| Self::to_stored(row_key, row)))
    }

    async fn upsert(&self, partition: &str, row_key: &str, value: &str) -> StoreResult<ConcurrencyToken> {
        self.check_available()?;
        let mut partitions = self.partitions.write().await;
        let version = self.stamp();
        partitions.entry(partition.to_string()).or_default().insert(
            row_key.to_string(),
            MemoryRow {
                value: value.to_string(),
                version,
            },
        );
        Ok(Self::token(version))
    }

    async fn replace_if_match(
        &self,
        partition: &str,
        row_key: &str,
        value: &str,
        expected: &ConcurrencyToken,
    ) -> StoreResult<ConditionalWrite> {
        self.check_available()?;
        let mut partitions = self.partitions.write().await;
        let Some(row) = partitions.get_mut(partition).and_then(|rows| rows.get_mut(row_key)) else {
            return Ok(ConditionalWrite::Conflict);
        };
        if Self::token(row.version) != *expected {
            return Ok(ConditionalWrite::Conflict);
        }

        let version = self.stamp();
        row.value = value.to_string();
        row.version = version;
        Ok(ConditionalWrite::Applied(Self::token(version)))
    }

    async fn delete_if_match(
        &self,
        partition: &str,
        row_key: &str,
        expected: &ConcurrencyToken,
    ) -> StoreResult<ConditionalWrite> {
        self.check_available()?;
        let mut partitions = self.partitions.write().await;
        let Some(rows) = partitions.get_mut(partition) else {
            return Ok(ConditionalWrite::Conflict);
        };
        match rows.get(row_key) {
            Some(row) if Self::token(row.version) == *expected => {
                rows.remove(row_key);
                if rows.is_empty() {
                    partitions.remove(partition);
                }
                Ok(ConditionalWrite::Applied(expected.clone()))
            }
            _ => Ok(ConditionalWrite::Conflict),
        }
    }

    async fn delete(&self, partition: &str, row_key: &str) -> StoreResult<bool> {
        self.check_available()?;
        let mut partitions = self.partitions.write().await;
        let Some(rows) = partitions.get_mut(partition) else {
            return Ok(false);
        };
        let existed = rows.remove(row_key).is_some();
        if rows.is_empty() {
            partitions.remove(partition);
        }
        Ok(existed)
    }

    async fn scan(
        &self,
        partition: &str,
        range: &RowRange,
        limit: Option<usize>,
    ) -> StoreResult<Vec<StoredRow>> {
        self.check_available()?;
        if range.start >= range.end {
            return Ok(Vec::new());
        }
        let partitions = self.partitions.read().await;
        let Some(rows) = partitions.get(partition) else {
            return Ok(Vec::new());
        };

        let matching = rows
            .range(range.start.clone()..range.end.clone())
            .map(|(key, row)| Self::to_stored(key, row));
        Ok(match limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }
}
