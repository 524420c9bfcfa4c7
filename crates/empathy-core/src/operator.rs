//! Run bounds and the external stop signal.
//!
//! The tick loop polls [`OperatorState`] once per tick. The binary shares it
//! with a Ctrl-C handler through an [`Arc`](std::sync::Arc) so a stop can be
//! requested from another task without locks on the hot path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SimulationBoundsConfig;

/// Reason why the simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// Every robot docked.
    AllDocked,
    /// Every robot is docked or depleted, and at least one is depleted.
    AllInactive,
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// Reached the configured `max_real_time_seconds` limit.
    MaxRealTimeReached,
    /// An operator issued a stop command.
    OperatorStop,
}

impl SimulationEndReason {
    /// Whether the run reached a natural fixed point and gets a run record.
    pub const fn is_natural(self) -> bool {
        matches!(self, Self::AllDocked | Self::AllInactive)
    }
}

/// Shared operator control state.
#[derive(Debug)]
pub struct OperatorState {
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Minimum time between ticks in milliseconds.
    tick_interval_ms: u64,

    /// Wall-clock time when the run was configured.
    started_at: DateTime<Utc>,

    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,

    /// Maximum wall-clock seconds (0 = unlimited).
    max_real_time_seconds: u64,
}

impl OperatorState {
    /// Create a new operator state from configuration.
    pub fn new(tick_interval_ms: u64, bounds: &SimulationBoundsConfig) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            tick_interval_ms,
            started_at: Utc::now(),
            max_ticks: bounds.max_ticks,
            max_real_time_seconds: bounds.max_real_time_seconds,
        }
    }

    /// Request a clean simulation stop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Minimum time between ticks.
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// When the run was configured.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns `true` if `max_ticks > 0` and `current_tick >= max_ticks`.
    pub const fn tick_limit_reached(&self, current_tick: u64) -> bool {
        self.max_ticks > 0 && current_tick >= self.max_ticks
    }

    /// Returns `true` if `max_real_time_seconds > 0` and `elapsed` has
    /// reached it.
    pub const fn time_limit_reached(&self, elapsed: Duration) -> bool {
        self.max_real_time_seconds > 0 && elapsed.as_secs() >= self.max_real_time_seconds
    }
}
