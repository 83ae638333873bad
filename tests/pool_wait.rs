//! Scenario 3: a blocked Get only succeeds once a concurrent Close hands
//! off its slot — never before.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use common::{always_ok_pool, default_param};
use nebula_pool::PoolConfig;

#[tokio::test]
async fn blocked_get_waits_for_close() {
    let (pool, fill) = always_ok_pool(
        PoolConfig {
            min_size: 2,
            max_size: 5,
            acquire_timeout: Duration::from_secs(5),
        },
        default_param(),
    );
    fill.await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..5 {
        handles.push(pool.get().await.unwrap());
    }
    assert_eq!(pool.resources_open(), 5);
    assert_eq!(pool.available_now(), 0);

    let closed = Arc::new(AtomicBool::new(false));
    let closed_writer = Arc::clone(&closed);
    let mut last = handles.pop().unwrap();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        last.close().unwrap();
        closed_writer.store(true, Ordering::SeqCst);
    });

    // The blocking Get must not observe a slot before the spawned Close ran.
    let waiting_pool = pool.clone();
    let observed_closed_first = Arc::new(AtomicBool::new(false));
    let observed = Arc::clone(&observed_closed_first);
    let blocked = tokio::spawn(async move {
        let handle = waiting_pool.get().await.unwrap();
        observed.store(closed.load(Ordering::SeqCst), Ordering::SeqCst);
        handle
    });

    let handle = blocked.await.unwrap();
    assert!(
        observed_closed_first.load(Ordering::SeqCst),
        "Get resolved before the Close that fed it ran"
    );
    drop(handle);
}
