//! Tests for the Redis row store that need no server

use crate::store::RedisRowStore;

#[test]
fn test_partition_id_is_stable_and_opaque() {
    let a = RedisRowStore::partition_id("alice@example.com");
    let b = RedisRowStore::partition_id("alice@example.com");
    let other = RedisRowStore::partition_id("bob@example.com");

    assert_eq!(a, b);
    assert_ne!(a, other);
    assert_eq!(a.len(), 64);
    assert!(!a.contains("alice"));
    assert!(!a.contains(':'));
}
