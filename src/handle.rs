//! The single-use wrapper returned by `Pool::get`.

use std::fmt;
use std::sync::Arc;

use crate::error::PoolError;
use crate::pool::{Inner, place_slot, refill_one_if_needed};

/// A checked-out resource.
///
/// Obtained from [`crate::Pool::get`]/[`crate::Pool::get_timeout`]. Exactly
/// one of the following eventually happens to the wrapped resource:
///
/// - [`Handle::close`] validates it (`test_fn`) and, on success, returns it
///   to the pool's idle queue (or directly to a parked waiter); on
///   validation failure it is destroyed and the pool attempts a best-effort
///   refill toward `min_size`.
/// - [`Handle::destroy`] unconditionally destroys it; the pool is never
///   refilled as a result.
/// - If the handle is dropped without either being called, it is treated as
///   an implicit [`Handle::destroy`] so accounting never leaks an entry.
///
/// Both finalizers are idempotent: once one has run, subsequent calls (and
/// the eventual `Drop`) are no-ops.
pub struct Handle<P, R, E> {
    inner: Arc<Inner<P, R, E>>,
    payload: Option<R>,
}

impl<P, R, E> Handle<P, R, E> {
    pub(crate) fn new(inner: Arc<Inner<P, R, E>>, payload: R) -> Self {
        Self {
            inner,
            payload: Some(payload),
        }
    }

    /// Borrow the wrapped resource.
    ///
    /// # Panics
    /// Panics if the handle has already been finalized via `close`,
    /// `destroy`, or a prior `Drop` — which cannot happen while this handle
    /// is still reachable, since both finalizers consume the payload and
    /// any further calls on the same handle are no-ops that leave it
    /// payload-less. Calling `resource`/`resource_mut` after `close`/
    /// `destroy` is a caller bug, not a recoverable condition.
    #[must_use]
    pub fn resource(&self) -> &R {
        self.payload
            .as_ref()
            .expect("resource() called after close()/destroy()")
    }

    /// Mutably borrow the wrapped resource. See [`Handle::resource`].
    pub fn resource_mut(&mut self) -> &mut R {
        self.payload
            .as_mut()
            .expect("resource_mut() called after close()/destroy()")
    }

    /// Validate and return the resource to the pool.
    ///
    /// Runs `test_fn` on the resource. If it passes, the resource goes back
    /// to the idle queue (or straight to a parked waiter). If it fails, the
    /// resource is destroyed, `open_count` is decremented, and — if the
    /// pool is still open and now below `min_size` — a single best-effort
    /// refill attempt is made.
    ///
    /// No-op (returns `Ok(())`) if this handle was already finalized.
    pub fn close(&mut self) -> Result<(), PoolError<E>> {
        let Some(slot) = self.payload.take() else {
            return Ok(());
        };

        match (self.inner.test_fn)(&slot) {
            Ok(()) => {
                let mut state = self.inner.state.lock();
                if state.closed {
                    drop(state);
                    #[cfg(feature = "tracing")]
                    tracing::debug!("pool closed while handle was checked out; destroying on close");
                    (self.inner.destroy_fn)(slot);
                    let mut state = self.inner.state.lock();
                    state.open_count = state.open_count.saturating_sub(1);
                } else {
                    place_slot(&mut state, slot);
                }
                Ok(())
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("resource failed validation on close; destroying");
                (self.inner.destroy_fn)(slot);
                {
                    let mut state = self.inner.state.lock();
                    state.open_count = state.open_count.saturating_sub(1);
                }
                refill_one_if_needed(&self.inner);
                Err(PoolError::Test(e))
            }
        }
    }

    /// Unconditionally destroy the resource and decrement `open_count`.
    /// Unlike [`Handle::close`] on a validation failure, this never
    /// triggers a refill — the pool is left intentionally smaller.
    ///
    /// No-op if this handle was already finalized.
    pub fn destroy(&mut self) {
        let Some(slot) = self.payload.take() else {
            return;
        };
        (self.inner.destroy_fn)(slot);
        let mut state = self.inner.state.lock();
        state.open_count = state.open_count.saturating_sub(1);
    }
}

impl<P, R, E> std::ops::Deref for Handle<P, R, E> {
    type Target = R;
    fn deref(&self) -> &R {
        self.resource()
    }
}

impl<P, R, E> std::ops::DerefMut for Handle<P, R, E> {
    fn deref_mut(&mut self) -> &mut R {
        self.resource_mut()
    }
}

impl<P, R, E> fmt::Debug for Handle<P, R, E>
where
    R: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle").field("payload", &self.payload).finish()
    }
}

impl<P, R, E> Drop for Handle<P, R, E> {
    fn drop(&mut self) {
        if self.payload.is_some() {
            self.destroy();
        }
    }
}
