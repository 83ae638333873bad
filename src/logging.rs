//! Optional convenience initializer for [`tracing`] output.
//!
//! Using the pool never requires this module — it exists only so examples,
//! tests and small binaries embedding the pool don't need to hand-roll a
//! subscriber. Library consumers with their own `tracing` setup should
//! ignore it entirely.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a `tracing` subscriber that writes formatted events to stdout,
/// honoring `RUST_LOG` (default: `info`).
///
/// Safe to call more than once; later calls are no-ops if a global
/// subscriber is already installed.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}
