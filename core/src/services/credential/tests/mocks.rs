//! Test doubles for credential store tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::value_objects::PlaintextCode;
use crate::repositories::{
    ConcurrencyToken, ConditionalWrite, MemoryRowStore, RowRange, RowStore, StoreResult, StoredRow,
};
use crate::services::code::CodeGenerator;

/// Hands out a fixed sequence of codes, repeating the last one
pub struct SequenceGenerator {
    codes: Mutex<VecDeque<String>>,
    last: Mutex<String>,
}

impl SequenceGenerator {
    pub fn new(codes: &[&str]) -> Self {
        Self {
            codes: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
            last: Mutex::new(codes.last().map(|c| c.to_string()).unwrap_or_default()),
        }
    }
}

impl CodeGenerator for SequenceGenerator {
    fn generate(&self) -> PlaintextCode {
        let next = self.codes.lock().unwrap().pop_front();
        match next {
            Some(code) => PlaintextCode::new(code),
            None => PlaintextCode::new(self.last.lock().unwrap().clone()),
        }
    }
}

/// Memory store that lets another writer touch the row right before the
/// next conditional write lands
#[derive(Default)]
pub struct InterleavingStore {
    pub inner: MemoryRowStore,
    interfere_on_replace: AtomicBool,
    interfere_on_delete: AtomicBool,
}

impl InterleavingStore {
    pub fn interfere_before_replace(&self) {
        self.interfere_on_replace.store(true, Ordering::SeqCst);
    }

    pub fn interfere_before_delete(&self) {
        self.interfere_on_delete.store(true, Ordering::SeqCst);
    }

    async fn touch(&self, partition: &str, row_key: &str) {
        if let Some(row) = self.inner.get(partition, row_key).await.unwrap() {
            self.inner.upsert(partition, row_key, &row.value).await.unwrap();
        }
    }
}

#[async_trait]
impl RowStore for InterleavingStore {
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
        if self.interfere_on_replace.swap(false, Ordering::SeqCst) {
            self.touch(partition, row_key).await;
        }
        self.inner.replace_if_match(partition, row_key, value, expected).await
    }

    async fn delete_if_match(
        &self,
        partition: &str,
        row_key: &str,
        expected: &ConcurrencyToken,
    ) -> StoreResult<ConditionalWrite> {
        if self.interfere_on_delete.swap(false, Ordering::SeqCst) {
            self.touch(partition, row_key).await;
        }
        self.inner.delete_if_match(partition, row_key, expected).await
    }

    async fn delete(&self, partition: &str, row_key: &str) -> StoreResult<bool> {
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
