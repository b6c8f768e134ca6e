//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized timing settings for the connection supervisor,
//! the sampler task and the runtime.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1
//! - `grace = 0s` → do not wait for tasks on shutdown

use std::time::Duration;

/// Global configuration for the connection lifecycle runtime.
///
/// ## Field semantics
/// - `connect_timeout`: how long to wait for the transport session after a connect request.
///   Advisory only; the supervisor always proceeds to the ready wait.
/// - `ready_timeout`: how long to wait for the session to become usable before resetting.
/// - `reestablish_delay`: pause after a reset before the next connect cycle.
/// - `settle_delay`: pause before tearing down a session, so in-flight transport callbacks land.
/// - `date_time_timeout`: how long the sampler waits for wall-clock time before sampling anyway.
/// - `sample_interval`: sampler period.
/// - `grace`: maximum wait for tasks to stop on shutdown.
/// - `bus_capacity`: event bus ring buffer size.
#[derive(Clone, Debug)]
pub struct Config {
    /// Wait for `CLOUD_CONNECTED` after a connect request.
    pub connect_timeout: Duration,

    /// Wait for `CLOUD_READY` (or a disconnect) before the attempt counts as failed.
    pub ready_timeout: Duration,

    /// Pause after a reset before waiting for the link again.
    pub reestablish_delay: Duration,

    /// Pause before requesting a transport disconnect during a reset.
    pub settle_delay: Duration,

    /// Sampler wait for wall-clock time before proceeding without it.
    pub date_time_timeout: Duration,

    /// Period of the sampler loop.
    pub sample_interval: Duration,

    /// Maximum time to wait for graceful shutdown before giving up on stuck tasks.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` events skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Total time a failed connect cycle occupies before the next attempt, ignoring link waits.
    ///
    /// Useful for sizing external watchdogs.
    pub fn worst_case_cycle(&self) -> Duration {
        self.connect_timeout + self.ready_timeout + self.settle_delay + self.reestablish_delay
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `connect_timeout = 30s`
    /// - `ready_timeout = 60s`
    /// - `reestablish_delay = 30s`
    /// - `settle_delay = 20s`
    /// - `date_time_timeout = 30s`
    /// - `sample_interval = 30s`
    /// - `grace = 10s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            ready_timeout: Duration::from_secs(60),
            reestablish_delay: Duration::from_secs(30),
            settle_delay: Duration::from_secs(20),
            date_time_timeout: Duration::from_secs(30),
            sample_interval: Duration::from_secs(30),
            grace: Duration::from_secs(10),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_device_constants() {
        let cfg = Config::default();
        assert_eq!(cfg.connect_timeout, Duration::from_secs(30));
        assert_eq!(cfg.ready_timeout, Duration::from_secs(60));
        assert_eq!(cfg.reestablish_delay, Duration::from_secs(30));
        assert_eq!(cfg.settle_delay, Duration::from_secs(20));
        assert_eq!(cfg.worst_case_cycle(), Duration::from_secs(140));
    }

    #[test]
    fn bus_capacity_never_zero() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
