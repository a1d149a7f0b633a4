//! Behaviour tests for the in-process row store

use crate::errors::StoreError;
use crate::repositories::row_store::{ConditionalWrite, MemoryRowStore, RowRange, RowStore};

#[tokio::test]
async fn test_get_missing_row() {
    let store = MemoryRowStore::new();
    let row = store.get("a@x.com", "current").await.unwrap();
    assert!(row.is_none());
}

#[tokio::test]
async fn test_upsert_then_get() {
    let store = MemoryRowStore::new();
    let token = store.upsert("a@x.com", "current", "{\"n\":1}").await.unwrap();

    let row = store.get("a@x.com", "current").await.unwrap().unwrap();
    assert_eq!(row.value, "{\"n\":1}");
    assert_eq!(row.token, token);
}

#[tokio::test]
async fn test_upsert_changes_token() {
    let store = MemoryRowStore::new();
    let first = store.upsert("a@x.com", "current", "1").await.unwrap();
    let second = store.upsert("a@x.com", "current", "2").await.unwrap();
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_replace_if_match_applies_with_current_token() {
    let store = MemoryRowStore::new();
    let token = store.upsert("a@x.com", "current", "1").await.unwrap();

    let outcome = store
        .replace_if_match("a@x.com", "current", "2", &token)
        .await
        .unwrap();
    let ConditionalWrite::Applied(new_token) = outcome else {
        panic!("expected the replace to apply");
    };

    let row = store.get("a@x.com", "current").await.unwrap().unwrap();
    assert_eq!(row.value, "2");
    assert_eq!(row.token, new_token);
}

#[tokio::test]
async fn test_replace_with_stale_token_conflicts() {
    let store = MemoryRowStore::new();
    let stale = store.upsert("a@x.com", "current", "1").await.unwrap();
    store.upsert("a@x.com", "current", "2").await.unwrap();

    let outcome = store
        .replace_if_match("a@x.com", "current", "3", &stale)
        .await
        .unwrap();
    assert_eq!(outcome, ConditionalWrite::Conflict);

    let row = store.get("a@x.com", "current").await.unwrap().unwrap();
    assert_eq!(row.value, "2");
}

#[tokio::test]
async fn test_replace_missing_row_conflicts() {
    let store = MemoryRowStore::new();
    let token = store.upsert("a@x.com", "current", "1").await.unwrap();
    store.delete("a@x.com", "current").await.unwrap();

    let outcome = store
        .replace_if_match("a@x.com", "current", "2", &token)
        .await
        .unwrap();
    assert_eq!(outcome, ConditionalWrite::Conflict);
    assert!(store.get("a@x.com", "current").await.unwrap().is_none());
}

#[tokio::test]
async fn test_recreated_row_does_not_accept_old_token() {
    let store = MemoryRowStore::new();
    let old = store.upsert("a@x.com", "current", "1").await.unwrap();
    store.delete("a@x.com", "current").await.unwrap();
    store.upsert("a@x.com", "current", "1").await.unwrap();

    let outcome = store.delete_if_match("a@x.com", "current", &old).await.unwrap();
    assert_eq!(outcome, ConditionalWrite::Conflict);
    assert!(store.get("a@x.com", "current").await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_if_match() {
    let store = MemoryRowStore::new();
    let token = store.upsert("a@x.com", "current", "1").await.unwrap();

    let outcome = store.delete_if_match("a@x.com", "current", &token).await.unwrap();
    assert!(outcome.is_applied());
    assert_eq!(store.row_count("a@x.com").await, 0);
}

#[tokio::test]
async fn test_delete_reports_existence() {
    let store = MemoryRowStore::new();
    store.upsert("a@x.com", "current", "1").await.unwrap();

    assert!(store.delete("a@x.com", "current").await.unwrap());
    assert!(!store.delete("a@x.com", "current").await.unwrap());
}

#[tokio::test]
async fn test_scan_is_ordered_bounded_and_partitioned() {
    let store = MemoryRowStore::new();
    for key in ["gen_3", "gen_1", "gen_2", "gen_5", "current"] {
        store.upsert("a@x.com", key, key).await.unwrap();
    }
    store.upsert("b@x.com", "gen_2", "other").await.unwrap();

    let rows = store
        .scan("a@x.com", &RowRange::new("gen_2", "gen_5"), None)
        .await
        .unwrap();
    let keys: Vec<_> = rows.iter().map(|r| r.row_key.as_str()).collect();
    assert_eq!(keys, vec!["gen_2", "gen_3"]);
}

#[tokio::test]
async fn test_scan_limit_keeps_oldest() {
    let store = MemoryRowStore::new();
    for key in ["gen_1", "gen_2", "gen_3", "gen_4"] {
        store.upsert("a@x.com", key, key).await.unwrap();
    }

    let rows = store
        .scan("a@x.com", &RowRange::new("gen_", "gen_~"), Some(2))
        .await
        .unwrap();
    let keys: Vec<_> = rows.iter().map(|r| r.row_key.as_str()).collect();
    assert_eq!(keys, vec!["gen_1", "gen_2"]);
}

#[tokio::test]
async fn test_scan_empty_range() {
    let store = MemoryRowStore::new();
    store.upsert("a@x.com", "gen_1", "1").await.unwrap();

    let rows = store
        .scan("a@x.com", &RowRange::new("gen_5", "gen_1"), None)
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_unavailable_store_fails_every_call() {
    let store = MemoryRowStore::new();
    store.set_unavailable(true);

    let err = store.get("a@x.com", "current").await.unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
    assert!(store.upsert("a@x.com", "current", "1").await.is_err());

    store.set_unavailable(false);
    assert!(store.upsert("a@x.com", "current", "1").await.is_ok());
}
