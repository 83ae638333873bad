//! Scenario 1: initial fill and id accumulation.

mod common;

use std::time::Duration;

use common::{Param, always_ok_pool};
use nebula_pool::PoolConfig;

#[tokio::test]
async fn first_get_returns_accumulated_id() {
    let (pool, fill) = always_ok_pool(
        PoolConfig {
            min_size: 0,
            max_size: 5,
            acquire_timeout: Duration::from_secs(1),
        },
        Param { text: "text", id: 2 },
    );
    fill.await.unwrap();

    let handle = pool.get().await.unwrap();
    assert_eq!(handle.resource().id, 2);
}

#[tokio::test]
async fn id_accumulates_across_creates() {
    let (pool, fill) = always_ok_pool(
        PoolConfig {
            min_size: 0,
            max_size: 5,
            acquire_timeout: Duration::from_secs(1),
        },
        Param { text: "text", id: 2 },
    );
    fill.await.unwrap();

    let first = pool.get().await.unwrap();
    let second = pool.get().await.unwrap();
    assert_eq!(first.resource().id, 2);
    assert_eq!(second.resource().id, 4);
}
