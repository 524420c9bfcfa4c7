//! Wall-clock driven battery decay.
//!
//! The battery loses a fixed decrement for every full interval of real time
//! that passes, independent of how many ticks ran in between. Frame-rate
//! changes therefore do not change the decay rate. Charge floors at zero and
//! never increases. A disabled battery never drains.

use std::time::Duration;

use crate::config::BatteryConfig;
use crate::error::AgentError;

/// A robot's battery.
#[derive(Debug, Clone, PartialEq)]
pub struct Battery {
    level: f64,
    capacity: f64,
    decrement: f64,
    interval: Duration,
    last_update: Duration,
    raw_state_feature: bool,
    enabled: bool,
}

impl Battery {
    /// A fully charged battery whose decay clock starts at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidBattery`] if the capacity or interval is
    /// not positive, or the decrement is negative.
    pub fn new(config: &BatteryConfig, now: Duration) -> Result<Self, AgentError> {
        if !(config.capacity.is_finite() && config.capacity > 0.0) {
            return Err(AgentError::InvalidBattery {
                reason: format!("capacity {} must be positive", config.capacity),
            });
        }
        if !(config.decrement.is_finite() && config.decrement >= 0.0) {
            return Err(AgentError::InvalidBattery {
                reason: format!("decrement {} must be non-negative", config.decrement),
            });
        }
        let interval = Duration::try_from_secs_f64(config.interval_seconds)
            .ok()
            .filter(|d| !d.is_zero())
            .ok_or_else(|| AgentError::InvalidBattery {
                reason: format!("interval {}s must be positive", config.interval_seconds),
            })?;
        Ok(Self {
            level: config.capacity,
            capacity: config.capacity,
            decrement: config.decrement,
            interval,
            last_update: now,
            raw_state_feature: config.raw_state_feature,
            enabled: config.enabled,
        })
    }

    /// Apply every full decay interval that has elapsed since the last
    /// update. Returns the new level if it changed.
    ///
    /// The interval count is one integer division, so a long gap or a tiny
    /// interval costs the same as a single decrement. The remainder of the
    /// gap carries over toward the next interval.
    pub fn apply_decay(&mut self, now: Duration) -> Option<f64> {
        let elapsed = now.saturating_sub(self.last_update).as_nanos();
        let step = self.interval.as_nanos();
        let intervals = elapsed.checked_div(step).unwrap_or(0);
        if intervals == 0 {
            return None;
        }
        let carry = elapsed
            .checked_rem(step)
            .and_then(|rest| u64::try_from(rest).ok())
            .map_or(Duration::ZERO, Duration::from_nanos);
        self.last_update = now.saturating_sub(carry);

        if !self.enabled || self.decrement <= 0.0 || self.is_depleted() {
            return None;
        }
        let before = self.level;
        let drain = interval_count(intervals) * self.decrement;
        self.level = (self.level - drain).max(0.0);
        (self.level < before).then_some(self.level)
    }

    /// Whether the battery drains at all. A disabled battery stays full.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current charge.
    pub const fn level(&self) -> f64 {
        self.level
    }

    /// Full charge.
    pub const fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Whether the battery is exhausted.
    pub fn is_depleted(&self) -> bool {
        self.level <= 0.0
    }

    /// The battery feature for the state vector: the raw charge or the
    /// fraction of capacity, depending on configuration.
    pub fn state_feature(&self) -> f64 {
        if self.raw_state_feature {
            self.level
        } else {
            self.level / self.capacity
        }
    }
}

// Counts past 2^53 round; the drain is capped at the remaining level anyway.
#[allow(clippy::cast_precision_loss)]
const fn interval_count(intervals: u128) -> f64 {
    intervals as f64
}
