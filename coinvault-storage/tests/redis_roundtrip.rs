//! Round trip against a live Redis.
//!
//! Run with `--features redis-tests`. Uses database 15 of the server at
//! `COINVAULT_TEST_REDIS_HOST` (default 127.0.0.1) and flushes it.

#![cfg(feature = "redis-tests")]

use coinvault_core::RedisConfig;
use coinvault_storage::{CacheStore, RedisBackend};
use coinvault_test_utils::assertions::assert_same_records;
use coinvault_test_utils::fixtures;

fn test_config() -> RedisConfig {
    RedisConfig {
        host: std::env::var("COINVAULT_TEST_REDIS_HOST").unwrap_or_else(|_| "127.0.0.1".into()),
        port: 6379,
        db: 15,
        password: None,
    }
}

#[tokio::test]
async fn test_store_load_dump_against_redis() {
    let backend = RedisBackend::connect(&test_config())
        .await
        .expect("redis should be reachable");
    let store = CacheStore::new(backend);
    store.flush().await.unwrap();

    let first = fixtures::records(&[(1, 2), (2, 1)]);
    store.store(&first).await.unwrap();
    let second = fixtures::records(&[(3, 1), (4, 2), (5, 3)]);
    let receipt = store.store(&second).await.unwrap();
    assert_eq!(receipt.discarded, 2);

    let snapshot = store.load_all().await.unwrap();
    assert_same_records(snapshot.rows(), &second);

    let dump = store.dump().await.unwrap();
    assert_eq!(dump.len(), 3 + 2);

    store.flush().await.unwrap();
    assert!(store.load_all().await.unwrap().is_empty());
}
