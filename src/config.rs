//! Pool configuration.

use std::time::Duration;

use crate::error::PoolError;

/// Configuration for a [`crate::Pool`].
///
/// Mirrors the three scalar parameters the pool's construction contract is
/// built around (`min`, `max`, default `timeout`) as a single validated
/// struct rather than bare positional arguments.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Warm floor: resources the pool eagerly creates at construction and
    /// tries to refill toward whenever open count drops below it.
    pub min_size: usize,
    /// Hard ceiling: total resources (idle + in-use) never exceeds this.
    pub max_size: usize,
    /// Default deadline applied to `Pool::get` (as opposed to
    /// `Pool::get_timeout`, which takes an explicit deadline).
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_size: 0,
            max_size: 10,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

impl PoolConfig {
    /// Validate the configuration, returning an error describing the first
    /// violated constraint.
    pub fn validate<E>(&self) -> Result<(), PoolError<E>> {
        if self.max_size == 0 {
            return Err(PoolError::Configuration(
                "max_size must be greater than 0".to_string(),
            ));
        }
        if self.min_size > self.max_size {
            return Err(PoolError::Configuration(format!(
                "min_size ({}) must not exceed max_size ({})",
                self.min_size, self.max_size
            )));
        }
        if self.acquire_timeout.is_zero() {
            return Err(PoolError::Configuration(
                "acquire_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
