//! Store doubles for rate limit tests

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::repositories::{
    ConcurrencyToken, ConditionalWrite, MemoryRowStore, RowRange, RowStore, StoreResult, StoredRow,
};

/// Memory store whose unconditional deletes can be made to fail
#[derive(Default)]
pub struct FlakyDeleteStore {
    pub inner: MemoryRowStore,
    pub fail_deletes: AtomicBool,
}

impl FlakyDeleteStore {
    pub fn failing() -> Self {
        let store = Self::default();
        store.fail_deletes.store(true, Ordering::SeqCst);
        store
    }
}

#[async_trait]
impl RowStore for FlakyDeleteStore {
    async fn get(&self, partition: &str, row_key: &str) -> StoreResult<Option<StoredRow>> {
        self.inner.get(partition, row_key).await
    }

    async fn upsert(&self, partition: &str, row_key: &str, value: &str) -> StoreResult<ConcurrencyToken> {
        self.inner.upsert(partition, row_key, value).await
    }

    async fn replace_if_match(
        &self,
        partition: &str,
        row_key: &str,
        value: &str,
        expected: &ConcurrencyToken,
    ) -> StoreResult<ConditionalWrite> {
        self.inner.replace_if_match(partition, row_key, value, expected).await
    }

    async fn delete_if_match(
        &self,
        partition: &str,
        row_key: &str,
        expected: &ConcurrencyToken,
    ) -> StoreResult<ConditionalWrite> {
        self.inner.delete_if_match(partition, row_key, expected).await
    }

    async fn delete(&self, partition: &str, row_key: &str) -> StoreResult<bool> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("delete rejected".to_string()));
        }
        self.inner.delete(partition, row_key).await
    }

    async fn scan(
        &self,
        partition: &str,
        range: &RowRange,
        limit: Option<usize>,
    ) -> StoreResult<Vec<StoredRow>> {
        self.inner.scan(partition, range, limit).await
    }
}
