//! Generic, bounded, concurrent resource pool.
//!
//! [`Pool`] manages a population of caller-defined resources between a
//! configured `min_size` and `max_size`, handing them out via [`get`] and
//! taking them back via [`Handle::close`]/[`Handle::destroy`]. The pool
//! itself never inspects or interprets the resource type `R` — creation,
//! destruction and validation are delegated entirely to the `create`,
//! `destroy` and `test` hooks passed to [`Pool::new`].
//!
//! [`get`]: Pool::get
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use nebula_pool::{Pool, PoolConfig};
//!
//! let (pool, fill) = Pool::new(
//!     PoolConfig { min_size: 2, max_size: 10, ..Default::default() },
//!     |_: &()| -> Result<u32, std::io::Error> { Ok(42) },
//!     |_r: u32| {},
//!     |_r: &u32| -> Result<(), std::io::Error> { Ok(()) },
//!     None,
//!     (),
//! )?;
//! fill.await.ok();
//!
//! let mut handle = pool.get().await?;
//! assert_eq!(*handle, 42);
//! handle.close()?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod handle;
#[cfg(feature = "logging-init")]
pub mod logging;
mod pool;

pub use config::PoolConfig;
pub use error::{PoolError, Result};
pub use handle::Handle;
pub use pool::{CreateFn, DestroyFn, FillReceiver, Pool, PoolStats, TestFn};
