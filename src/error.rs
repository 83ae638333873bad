//! Error types for the pool.

use thiserror::Error;

/// Result type for pool operations.
pub type Result<T, E> = std::result::Result<T, PoolError<E>>;

/// Errors a [`crate::Pool`] can surface.
///
/// Generic over `E`, the error type returned by the caller-supplied
/// `create`/`test` hooks, so a create failure can be propagated without
/// downcasting or boxing.
#[derive(Error, Debug)]
pub enum PoolError<E> {
    /// `Get` was called after `Close` on the pool.
    #[error("pool is closed")]
    Closed,

    /// No resource became available before the deadline elapsed.
    #[error("pool exhausted: no resource available within timeout")]
    Exhausted,

    /// `create_fn` returned an error. Surfaced to whichever `Get` triggered
    /// the creation attempt.
    #[error("resource creation failed: {0}")]
    Create(#[source] E),

    /// `test_fn` rejected a resource, either popped from the idle queue on
    /// `Get` or returned via `Close`. The rejected resource has already been
    /// passed to `destroy_fn` by the time this error is observed.
    #[error("resource failed validation: {0}")]
    Test(#[source] E),

    /// `PoolConfig::validate` rejected the configuration passed to
    /// [`crate::Pool::new`].
    #[error("invalid pool configuration: {0}")]
    Configuration(String),
}

impl<E> PoolError<E> {
    /// Whether retrying the same call might succeed without caller
    /// intervention (e.g. after some resource has been returned).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Exhausted)
    }

    /// True once the pool has been permanently closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}
