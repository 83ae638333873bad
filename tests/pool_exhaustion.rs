//! Scenario 2: five timeout-bounded Gets succeed, the sixth is exhausted.

mod common;

use std::time::Duration;

use common::{always_ok_pool, default_param};
use nebula_pool::{PoolConfig, PoolError};

#[tokio::test]
async fn sixth_get_times_out() {
    let (pool, fill) = always_ok_pool(
        PoolConfig {
            min_size: 2,
            max_size: 5,
            acquire_timeout: Duration::from_secs(1),
        },
        default_param(),
    );
    fill.await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..5 {
        let handle = pool
            .get_timeout(Duration::from_millis(50))
            .await
            .expect("first five gets should succeed");
        handles.push(handle);
    }

    let err = pool
        .get_timeout(Duration::from_millis(50))
        .await
        .expect_err("sixth get should be exhausted");
    assert!(matches!(err, PoolError::Exhausted));

    for mut h in handles {
        h.close().unwrap();
    }
}
