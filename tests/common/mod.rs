//! Shared fixtures for the pool integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use nebula_pool::{Pool, PoolConfig};

/// The opaque param every `create_fn` call receives. Mirrors the `{text,
/// id}` struct literal used in the source test suite.
#[derive(Clone)]
pub struct Param {
    pub text: &'static str,
    pub id: i64,
}

/// A created resource. `id` is the cumulative sum of `param.id` across every
/// successful `create_fn` call sharing the same counter — this lets tests
/// assert that concurrent creates never observe the same id twice.
#[derive(Debug, Clone, Copy)]
pub struct Resource {
    pub id: i64,
}

pub type TestError = std::io::Error;

fn test_error(msg: &str) -> TestError {
    std::io::Error::other(msg)
}

/// Build a pool whose `create_fn` always succeeds, accumulating `param.id`
/// into a shared counter.
pub fn always_ok_pool(
    config: PoolConfig,
    param: Param,
) -> (Pool<Param, Resource, TestError>, nebula_pool::FillReceiver<TestError>) {
    let counter = Arc::new(AtomicI64::new(0));
    Pool::new(
        config,
        move |p: &Param| -> Result<Resource, TestError> {
            let id = counter.fetch_add(p.id, Ordering::SeqCst) + p.id;
            Ok(Resource { id })
        },
        |_r: Resource| {},
        |_r: &Resource| -> Result<(), TestError> { Ok(()) },
        None,
        param,
    )
    .expect("valid config")
}

/// Build a pool whose `create_fn` fails every other call (first call
/// succeeds), matching the source suite's flaky-create fixture.
pub fn flaky_create_pool(
    config: PoolConfig,
    param: Param,
) -> (Pool<Param, Resource, TestError>, nebula_pool::FillReceiver<TestError>) {
    let calls = Arc::new(AtomicI64::new(0));
    Pool::new(
        config,
        move |_p: &Param| -> Result<Resource, TestError> {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n % 2 == 0 {
                Err(test_error("flaky create failed"))
            } else {
                Ok(Resource { id: n })
            }
        },
        |_r: Resource| {},
        |_r: &Resource| -> Result<(), TestError> { Ok(()) },
        None,
        param,
    )
    .expect("valid config")
}

/// Build a pool whose `create_fn` always fails.
pub fn always_failing_create_pool(
    config: PoolConfig,
    param: Param,
) -> (Pool<Param, Resource, TestError>, nebula_pool::FillReceiver<TestError>) {
    Pool::new(
        config,
        |_p: &Param| -> Result<Resource, TestError> { Err(test_error("create always fails")) },
        |_r: Resource| {},
        |_r: &Resource| -> Result<(), TestError> { Ok(()) },
        None,
        param,
    )
    .expect("valid config")
}

/// Build a pool whose `test_fn` always fails (so every returned/popped
/// resource is destroyed).
pub fn always_failing_test_pool(
    config: PoolConfig,
    param: Param,
) -> (Pool<Param, Resource, TestError>, nebula_pool::FillReceiver<TestError>) {
    let counter = Arc::new(AtomicI64::new(0));
    Pool::new(
        config,
        move |p: &Param| -> Result<Resource, TestError> {
            let id = counter.fetch_add(p.id, Ordering::SeqCst) + p.id;
            Ok(Resource { id })
        },
        |_r: Resource| {},
        |_r: &Resource| -> Result<(), TestError> { Err(test_error("validation always fails")) },
        None,
        param,
    )
    .expect("valid config")
}

pub fn default_param() -> Param {
    Param { text: "text", id: 2 }
}
