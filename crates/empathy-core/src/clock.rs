//! Tick counting and wall-clock time.
//!
//! Two notions of time drive a run. The [`WorldClock`] counts ticks and
//! decides ordering. A [`TimeSource`] supplies monotonic wall-clock time for
//! battery decay, dock timestamps, and the real-time limit. Tests swap in a
//! [`ManualTimeSource`] to make decay deterministic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Tick counter for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldClock {
    /// Current tick number (0 before the first tick runs).
    tick: u64,
}

impl WorldClock {
    /// Create a clock at tick 0.
    pub const fn new() -> Self {
        Self { tick: 0 }
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }
}

/// Monotonic wall-clock time measured from the start of a run.
pub trait TimeSource: Send + Sync {
    /// Time elapsed since the source was created.
    fn elapsed(&self) -> Duration;
}

/// Real time backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    /// Start measuring from now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Time that only moves when told to. Millisecond resolution.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    millis: AtomicU64,
}

impl ManualTimeSource {
    /// Start at zero.
    pub const fn new() -> Self {
        Self {
            millis: AtomicU64::new(0),
        }
    }

    /// Move time forward by `by`.
    pub fn advance(&self, by: Duration) {
        let add = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.millis
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |m| {
                Some(m.saturating_add(add))
            })
            .ok();
    }

    /// Jump to an absolute elapsed time. Going backwards is ignored.
    pub fn set(&self, at: Duration) {
        let target = u64::try_from(at.as_millis()).unwrap_or(u64::MAX);
        self.millis.fetch_max(target, Ordering::AcqRel);
    }
}

impl TimeSource for ManualTimeSource {
    fn elapsed(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_at_zero_and_advances() {
        let mut clock = WorldClock::new();
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.advance().ok(), Some(1));
        assert_eq!(clock.advance().ok(), Some(2));
        assert_eq!(clock.tick(), 2);
    }

    #[test]
    fn manual_time_is_monotonic() {
        let time = ManualTimeSource::new();
        time.advance(Duration::from_secs(3));
        assert_eq!(time.elapsed(), Duration::from_secs(3));
        time.set(Duration::from_secs(1));
        assert_eq!(time.elapsed(), Duration::from_secs(3));
        time.set(Duration::from_secs(12));
        assert_eq!(time.elapsed(), Duration::from_secs(12));
    }

    #[test]
    fn system_time_moves_forward() {
        let time = SystemTimeSource::new();
        let a = time.elapsed();
        let b = time.elapsed();
        assert!(b >= a);
    }
}
