//! Generic resource pool — handout coordinator + lifecycle manager.
//!
//! `Pool<P, R, E>` drives three caller-supplied hooks directly: `create`,
//! `destroy` and `test`. It does not know or care what `R` actually is.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::config::PoolConfig;
use crate::error::{PoolError, Result};
use crate::handle::Handle;

/// `create(param) -> Result<R, E>`, invoked on every resource creation
/// (initial fill, refill, and on-demand during `Get`).
pub type CreateFn<P, R, E> = Box<dyn Fn(&P) -> std::result::Result<R, E> + Send + Sync>;

/// `destroy(r)`, invoked exactly once per resource that was ever
/// successfully created. Treated as infallible.
pub type DestroyFn<R> = Box<dyn Fn(R) + Send + Sync>;

/// `test(&r) -> Result<(), E>`, invoked after popping an idle resource on
/// `Get` and before a resource is returned to idle on `Close`.
pub type TestFn<R, E> = Box<dyn Fn(&R) -> std::result::Result<(), E> + Send + Sync>;

/// Receiver side of the one-shot initial-fill notification returned by
/// [`Pool::new`]. Carries the last create error encountered during fill, or
/// `None` if every fill attempt succeeded. Callers that don't care about
/// fill status are free to drop it.
pub type FillReceiver<E> = oneshot::Receiver<Option<PoolError<E>>>;

/// Point-in-time snapshot of pool counters, read under a single lock so the
/// three fields never observe a torn state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Resources currently checked out via a live handle.
    pub in_use: usize,
    /// Resources currently idle and eligible for handout.
    pub available_now: usize,
    /// Total resources currently open (idle + in-use).
    pub resources_open: usize,
}

/// Outcome delivered to a parked waiter.
enum WaiterMsg<R> {
    /// A resource was handed off directly.
    Slot(R),
    /// The pool was closed while this waiter was parked.
    Closed,
}

struct Waiter<R> {
    id: u64,
    tx: oneshot::Sender<WaiterMsg<R>>,
}

/// Everything protected by the pool's single critical section.
pub(crate) struct State<R> {
    idle: VecDeque<R>,
    pub(crate) open_count: usize,
    pub(crate) closed: bool,
    waiters: VecDeque<Waiter<R>>,
    next_waiter_id: u64,
}

impl<R> State<R> {
    fn stats(&self) -> PoolStats {
        PoolStats {
            in_use: self.open_count - self.idle.len(),
            available_now: self.idle.len(),
            resources_open: self.open_count,
        }
    }
}

/// Shared pool state, reached via `Arc` from both `Pool` and every
/// outstanding `Handle`.
pub(crate) struct Inner<P, R, E> {
    pub(crate) create_fn: CreateFn<P, R, E>,
    pub(crate) destroy_fn: DestroyFn<R>,
    pub(crate) test_fn: TestFn<R, E>,
    param: P,
    min_size: usize,
    max_size: usize,
    default_timeout_nanos: AtomicU64,
    pub(crate) state: Mutex<State<R>>,
}

/// Hand `slot` back to the pool: directly to a parked waiter if one exists
/// (skipping any waiter whose receiver has already gone away, e.g. because
/// its `Get` timed out concurrently), otherwise into the idle queue.
///
/// Must be called with `slot` already counted in `open_count`.
pub(crate) fn place_slot<R>(state: &mut State<R>, mut slot: R) {
    loop {
        match state.waiters.pop_front() {
            Some(waiter) => match waiter.tx.send(WaiterMsg::Slot(slot)) {
                Ok(()) => return,
                Err(WaiterMsg::Slot(returned)) => {
                    slot = returned;
                    continue;
                }
                Err(WaiterMsg::Closed) => unreachable!("never sent Closed here"),
            },
            None => {
                state.idle.push_back(slot);
                return;
            }
        }
    }
}

/// Best-effort single refill attempt, used only when a handle's `Close`
/// destroys a resource (via a failing `test_fn`) and leaves the pool below
/// `min_size`. A failing `create_fn` here is not retried in a tight loop —
/// the pool simply stays below `min_size` until the next such event.
pub(crate) fn refill_one_if_needed<P, R, E>(inner: &Inner<P, R, E>) {
    let should_refill = {
        let state = inner.state.lock();
        !state.closed && state.open_count < inner.min_size
    };
    if !should_refill {
        return;
    }

    match (inner.create_fn)(&inner.param) {
        Ok(slot) => {
            #[cfg(feature = "tracing")]
            tracing::debug!("pool refilled one resource toward min_size");
            let mut state = inner.state.lock();
            if state.closed {
                drop(state);
                (inner.destroy_fn)(slot);
                return;
            }
            state.open_count += 1;
            place_slot(&mut state, slot);
        }
        Err(_e) => {
            #[cfg(feature = "tracing")]
            tracing::warn!("pool refill attempt failed; staying below min_size");
        }
    }
}

/// A generic, bounded, async resource pool.
///
/// Cheap to clone — all clones share the same underlying state via `Arc`.
pub struct Pool<P, R, E> {
    inner: Arc<Inner<P, R, E>>,
}

impl<P, R, E> Clone for Pool<P, R, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, R, E> std::fmt::Debug for Pool<P, R, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.inner.state.lock().stats();
        f.debug_struct("Pool")
            .field("min_size", &self.inner.min_size)
            .field("max_size", &self.inner.max_size)
            .field("stats", &stats)
            .finish()
    }
}

impl<P, R, E> Pool<P, R, E>
where
    P: Send + Sync + 'static,
    R: Send + 'static,
    E: Send + Sync + 'static,
{
    /// Construct a new pool and kick off a background initial fill to
    /// `min_size`. Returns the pool plus the receiving end of a one-shot
    /// channel that fires once the fill attempt completes (successfully or
    /// on its first creation error).
    ///
    /// Must be called from within a running Tokio runtime (the initial
    /// fill runs as a spawned task).
    ///
    /// # Errors
    /// Returns an error if `config` is invalid (see [`PoolConfig::validate`]).
    pub fn new(
        config: PoolConfig,
        create: impl Fn(&P) -> std::result::Result<R, E> + Send + Sync + 'static,
        destroy: impl Fn(R) + Send + Sync + 'static,
        test: impl Fn(&R) -> std::result::Result<(), E> + Send + Sync + 'static,
        extras: Option<()>,
        param: P,
    ) -> Result<(Self, FillReceiver<E>), E> {
        config.validate()?;
        let _ = extras; // reserved; not inspected by the core

        #[cfg(feature = "tracing")]
        tracing::debug!(
            min_size = config.min_size,
            max_size = config.max_size,
            "creating new resource pool"
        );

        let inner = Arc::new(Inner {
            create_fn: Box::new(create),
            destroy_fn: Box::new(destroy),
            test_fn: Box::new(test),
            param,
            min_size: config.min_size,
            max_size: config.max_size,
            default_timeout_nanos: AtomicU64::new(config.acquire_timeout.as_nanos() as u64),
            state: Mutex::new(State {
                idle: VecDeque::with_capacity(config.max_size),
                open_count: 0,
                closed: false,
                waiters: VecDeque::new(),
                next_waiter_id: 0,
            }),
        });

        let pool = Self {
            inner: Arc::clone(&inner),
        };
        let fill_rx = spawn_initial_fill(inner);
        Ok((pool, fill_rx))
    }

    /// The default deadline new `get` calls use.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_nanos(self.inner.default_timeout_nanos.load(Ordering::Relaxed))
    }

    /// Change the default deadline used by `get`. Takes effect for calls
    /// made after this returns; in-flight `get`s are unaffected.
    pub fn set_timeout(&self, timeout: Duration) {
        self.inner
            .default_timeout_nanos
            .store(timeout.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Acquire a resource, waiting up to this pool's current default
    /// timeout (see [`Pool::timeout`]/[`Pool::set_timeout`]) if none is
    /// immediately available.
    pub async fn get(&self) -> Result<Handle<P, R, E>, E> {
        let deadline = Instant::now() + self.timeout();
        self.get_until(deadline).await
    }

    /// Acquire a resource, waiting up to `timeout` if none is immediately
    /// available. Equivalent to the source library's `getAvailable`.
    pub async fn get_timeout(&self, timeout: Duration) -> Result<Handle<P, R, E>, E> {
        let deadline = Instant::now() + timeout;
        self.get_until(deadline).await
    }

    async fn get_until(&self, deadline: Instant) -> Result<Handle<P, R, E>, E> {
        loop {
            enum Step<R> {
                Returned(R),
                Create,
                Wait,
            }

            let step = {
                let mut state = self.inner.state.lock();
                if state.closed {
                    return Err(PoolError::Closed);
                }
                if let Some(slot) = state.idle.pop_front() {
                    Step::Returned(slot)
                } else if state.open_count < self.inner.max_size {
                    // Reserve the slot now, under the lock, so two
                    // concurrent Gets can never both observe spare capacity
                    // and both create — open_count is incremented here,
                    // before create_fn ever runs, and rolled back on
                    // failure.
                    state.open_count += 1;
                    Step::Create
                } else {
                    Step::Wait
                }
            };

            match step {
                Step::Returned(slot) => {
                    return match (self.inner.test_fn)(&slot) {
                        Ok(()) => Ok(Handle::new(Arc::clone(&self.inner), slot)),
                        Err(e) => {
                            #[cfg(feature = "tracing")]
                            tracing::debug!("destroying idle resource that failed validation");
                            (self.inner.destroy_fn)(slot);
                            let mut state = self.inner.state.lock();
                            state.open_count = state.open_count.saturating_sub(1);
                            Err(PoolError::Test(e))
                        }
                    };
                }
                Step::Create => match (self.inner.create_fn)(&self.inner.param) {
                    Ok(slot) => {
                        return Ok(Handle::new(Arc::clone(&self.inner), slot));
                    }
                    Err(e) => {
                        let mut state = self.inner.state.lock();
                        state.open_count = state.open_count.saturating_sub(1);
                        drop(state);
                        if Instant::now() >= deadline {
                            return Err(PoolError::Create(e));
                        }
                        // Skip past the failed attempt and retry — another
                        // concurrent caller, or this one, may succeed before
                        // the deadline. Matches the source library's
                        // behavior under a flaky `create_fn`.
                        tokio::task::yield_now().await;
                        continue;
                    }
                },
                Step::Wait => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Err(PoolError::Exhausted);
                    }
                    return match tokio::time::timeout(remaining, self.wait_for_slot()).await {
                        Ok(Ok(slot)) => Ok(Handle::new(Arc::clone(&self.inner), slot)),
                        Ok(Err(e)) => Err(e),
                        Err(_elapsed) => Err(PoolError::Exhausted),
                    };
                }
            }
        }
    }

    /// Park as a waiter and await a direct hand-off from a returning
    /// `Handle::close` (or a refill/initial-fill completion). If this
    /// future is dropped before resolving (e.g. the outer `timeout`
    /// fired), the waiter entry is removed so no later `close` can send
    /// into a receiver nobody is listening on.
    async fn wait_for_slot(&self) -> Result<R, E> {
        let (tx, rx) = oneshot::channel();
        let id = {
            let mut state = self.inner.state.lock();
            let id = state.next_waiter_id;
            state.next_waiter_id += 1;
            state.waiters.push_back(Waiter { id, tx });
            id
        };

        let _registration = WaiterRegistration {
            inner: &self.inner,
            id,
        };

        match rx.await {
            Ok(WaiterMsg::Slot(slot)) => Ok(slot),
            Ok(WaiterMsg::Closed) | Err(_) => Err(PoolError::Closed),
        }
    }

    /// Current count of idle resources eligible for immediate handout.
    #[must_use]
    pub fn available_now(&self) -> usize {
        self.inner.state.lock().idle.len()
    }

    /// Current count of resources checked out via a live handle.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.inner.state.lock().stats().in_use
    }

    /// Total resources currently open (idle + in-use).
    #[must_use]
    pub fn resources_open(&self) -> usize {
        self.inner.state.lock().open_count
    }

    /// Consistent snapshot of all three counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.inner.state.lock().stats()
    }

    /// Permanently close the pool.
    ///
    /// After this returns, every `get`/`get_timeout` call fails with
    /// [`PoolError::Closed`]. Every idle resource is passed to `destroy_fn`
    /// exactly once; every parked waiter is woken with
    /// [`PoolError::Closed`]. Outstanding handles are unaffected by this
    /// call — their own `close`/`destroy` (or `Drop`) still runs to
    /// completion, destroying rather than re-queueing their payload.
    ///
    /// Idempotent: calling `close` on an already-closed pool is a no-op.
    pub fn close(&self) {
        let (idle, waiters) = {
            let mut state = self.inner.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            (
                state.idle.drain(..).collect::<Vec<_>>(),
                state.waiters.drain(..).collect::<Vec<_>>(),
            )
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(destroyed = idle.len(), "closing pool, draining idle queue");

        for slot in idle {
            (self.inner.destroy_fn)(slot);
            let mut state = self.inner.state.lock();
            state.open_count = state.open_count.saturating_sub(1);
        }
        for waiter in waiters {
            let _ = waiter.tx.send(WaiterMsg::Closed);
        }
    }
}

/// RAII guard that removes a parked waiter from the queue if its `Get` is
/// cancelled (dropped) before a slot was handed to it.
struct WaiterRegistration<'a, P, R, E> {
    inner: &'a Inner<P, R, E>,
    id: u64,
}

impl<P, R, E> Drop for WaiterRegistration<'_, P, R, E> {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock();
        state.waiters.retain(|w| w.id != self.id);
    }
}

fn spawn_initial_fill<P, R, E>(inner: Arc<Inner<P, R, E>>) -> FillReceiver<E>
where
    P: Send + Sync + 'static,
    R: Send + 'static,
    E: Send + Sync + 'static,
{
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let mut fill_error = None;
        for _ in 0..inner.min_size {
            if inner.state.lock().closed {
                break;
            }
            match (inner.create_fn)(&inner.param) {
                Ok(slot) => {
                    let mut state = inner.state.lock();
                    if state.closed {
                        drop(state);
                        (inner.destroy_fn)(slot);
                        break;
                    }
                    state.open_count += 1;
                    place_slot(&mut state, slot);
                }
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("initial fill stopped early on a create error");
                    fill_error = Some(PoolError::Create(e));
                    break;
                }
            }
            tokio::task::yield_now().await;
        }
        let _ = tx.send(fill_error);
    });
    rx
}
