//! Pool and scaler configuration.
//!
//! The hosting program supplies everything here: queue capacity, initial
//! worker count, occupancy thresholds, tick interval. Nothing is read from
//! the environment and nothing is process-global - each pool owns its own
//! configuration.

use crate::{Error, Result};
use core::time::Duration;

/// Tuning for the occupancy-sampling scaler loop.
///
/// On every tick the scaler reads queue occupancy `o` against capacity `c`
/// and applies, in order:
///
/// 1. `o < spare_pct% of c` - spawn `spare_step` workers (low backlog still
///    grows the fleet, buying throughput headroom),
/// 2. `o > busy_pct% of c` - spawn `busy_step` workers,
/// 3. otherwise - no action this tick.
///
/// The fleet only ever grows. Workers idle once the backlog clears and are
/// reclaimed when the pool drains; under sustained load the fleet size is
/// monotonically increasing, so pick steps and tick accordingly.
#[derive(Debug, Clone)]
pub struct ScaleConfig {
    /// Interval between occupancy samples.
    pub tick: Duration,
    /// Occupancy percentage below which the queue counts as having spare
    /// capacity.
    pub spare_pct: usize,
    /// Workers to add on a spare-capacity tick.
    pub spare_step: usize,
    /// Occupancy percentage above which the backlog counts as rising.
    pub busy_pct: usize,
    /// Workers to add on a rising-backlog tick.
    pub busy_step: usize,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(500),
            spare_pct: 75,
            spare_step: 10,
            busy_pct: 50,
            busy_step: 5,
        }
    }
}

/// Construction-time configuration for an [`ElasticPool`].
///
/// [`ElasticPool`]: crate::ElasticPool
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Capacity of the bounded job queue. Must be greater than zero;
    /// producers suspend once this many jobs are pending.
    pub queue_capacity: usize,
    /// Workers launched at pool construction. The scaler adds more at
    /// runtime.
    pub initial_workers: usize,
    /// Pre-sizes the result store when the total job count is known up
    /// front. Purely an allocation hint; the store grows on demand either
    /// way.
    pub expected_jobs: Option<usize>,
    /// Scaler tuning.
    pub scale: ScaleConfig,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 100,
            initial_workers: 10,
            expected_jobs: None,
            scale: ScaleConfig::default(),
        }
    }
}

impl PoolConfig {
    /// Validates invariants that must hold by construction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `queue_capacity` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(Error::InvalidCapacity);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = PoolConfig::default();
        assert_eq!(config.queue_capacity, 100);
        assert_eq!(config.initial_workers, 10);
        assert!(config.expected_jobs.is_none());
        assert_eq!(config.scale.tick, Duration::from_millis(500));
        assert_eq!(config.scale.spare_pct, 75);
        assert_eq!(config.scale.busy_pct, 50);
        assert!(config.scale.spare_step > config.scale.busy_step);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_capacity_fails_validation() {
        let config = PoolConfig {
            queue_capacity: 0,
            ..PoolConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidCapacity)));
    }
}
