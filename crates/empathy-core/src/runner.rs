//! Simulation loop runner with operator controls.
//!
//! This module provides [`run_simulation`], the top-level async function
//! that drives the tick loop with support for:
//!
//! - **Natural termination**: every robot docked, or every robot docked or
//!   depleted. Both emit a [`RunRecord`].
//! - **Bounded simulation**: stop after `max_ticks` or `max_real_time_seconds`
//! - **Operator stop**: abort before the next tick; only the per-robot dock
//!   records already handed to the logger survive
//! - **Frame limiting**: a fixed sleep between ticks
//!
//! The runner wraps the single-tick [`run_tick`] function and adds the
//! control plane around it.
//!
//! [`run_tick`]: crate::tick::run_tick

use std::sync::Arc;

use tracing::{info, warn};

use crate::clock::TimeSource;
use crate::decision::BehaviorPolicy;
use crate::operator::{OperatorState, SimulationEndReason};
use crate::render::RenderSink;
use crate::report::{RunLogger, RunRecord};
use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
    /// The run record, present only for natural termination.
    pub record: Option<RunRecord>,
}

/// Run the simulation loop until a termination condition is met.
///
/// # Arguments
///
/// * `state` - Mutable simulation state (robots, clock, arena)
/// * `policy` - Behavior policy applied to every robot
/// * `operator` - Shared operator control state
/// * `time` - Monotonic clock for battery decay and run timing
/// * `sink` - Render collaborator, offered a frame after every tick
/// * `logger` - Run log collaborator; failures are logged and ignored
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick fails.
pub async fn run_simulation(
    state: &mut SimulationState,
    policy: &dyn BehaviorPolicy,
    operator: &Arc<OperatorState>,
    time: &dyn TimeSource,
    sink: &mut dyn RenderSink,
    logger: &mut dyn RunLogger,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        policy = policy.name(),
        robots = state.agents.len(),
        started_at = %operator.started_at(),
        tick_interval_ms = u64::try_from(operator.tick_interval().as_millis()).unwrap_or(u64::MAX),
        "Simulation starting"
    );

    loop {
        if operator.is_stop_requested() {
            info!("Operator stop requested");
            return Ok(unrecorded(
                SimulationEndReason::OperatorStop,
                last_summary,
                total_ticks,
            ));
        }

        let elapsed = time.elapsed();
        if operator.time_limit_reached(elapsed) {
            info!(elapsed = elapsed.as_secs_f64(), "Real-time limit reached");
            return Ok(unrecorded(
                SimulationEndReason::MaxRealTimeReached,
                last_summary,
                total_ticks,
            ));
        }

        let summary = tick::run_tick(state, policy, elapsed)?;
        total_ticks = total_ticks.saturating_add(1);

        for record in &summary.docked {
            if let Err(err) = logger.on_dock(record) {
                warn!(agent = %record.label, error = %err, "Failed to log dock record");
            }
        }

        if sink.wants_frame(summary.tick) {
            sink.render(summary.tick, &state.views());
        }

        let natural = if summary.all_docked {
            Some(SimulationEndReason::AllDocked)
        } else if summary.all_inactive {
            Some(SimulationEndReason::AllInactive)
        } else {
            None
        };
        if let Some(end_reason) = natural {
            info!(tick = summary.tick, reason = ?end_reason, "Every robot has stopped");
            let record = RunRecord::summarize(
                &state.agents,
                &state.dock_order,
                state.first_sighting,
                policy.name(),
                time.elapsed(),
                summary.tick,
            );
            if let Err(err) = logger.on_run_complete(&record) {
                warn!(error = %err, "Failed to log run record");
            }
            return Ok(SimulationResult {
                end_reason,
                final_summary: Some(summary),
                total_ticks,
                record: Some(record),
            });
        }

        // run_tick advances the clock internally, so summary.tick is the
        // tick number that just ran.
        if operator.tick_limit_reached(summary.tick) {
            info!(tick = summary.tick, "Tick limit reached");
            return Ok(unrecorded(
                SimulationEndReason::MaxTicksReached,
                Some(summary),
                total_ticks,
            ));
        }

        last_summary = Some(summary);

        let interval = operator.tick_interval();
        if interval.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(interval).await;
        }
    }
}

const fn unrecorded(
    end_reason: SimulationEndReason,
    final_summary: Option<TickSummary>,
    total_ticks: u64,
) -> SimulationResult {
    SimulationResult {
        end_reason,
        final_summary,
        total_ticks,
        record: None,
    }
}

/// Log the simulation end sequence.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        active = result.final_summary.as_ref().map(|s| s.active),
        "Simulation ended"
    );

    match result.record {
        Some(ref record) => info!(
            duration_seconds = record.duration_seconds,
            dock_order = ?record.dock_order,
            follow_events = record.follow_events,
            first_sighting = ?record.first_sighting,
            "Run summary"
        ),
        None if result.final_summary.is_none() => {
            warn!("Simulation ended with no ticks executed");
        }
        None => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::time::Duration;

    use empathy_types::{AgentView, Point};

    use super::*;
    use crate::clock::ManualTimeSource;
    use crate::config::{SimulationBoundsConfig, SimulationConfig};
    use crate::decision::EmpatheticPolicy;
    use crate::render::NoOpSink;
    use crate::report::{DockRecord, LogError, NullLogger};

    fn state() -> SimulationState {
        SimulationState::from_config(&SimulationConfig::default(), Duration::ZERO).unwrap()
    }

    fn operator(max_ticks: u64) -> Arc<OperatorState> {
        Arc::new(OperatorState::new(
            0,
            &SimulationBoundsConfig {
                max_ticks,
                max_real_time_seconds: 0,
            },
        ))
    }

    #[derive(Default)]
    struct FailingLogger {
        attempts: usize,
    }

    impl RunLogger for FailingLogger {
        fn on_dock(&mut self, _record: &DockRecord) -> Result<(), LogError> {
            self.attempts = self.attempts.saturating_add(1);
            Err(LogError::Format {
                message: String::from("disk full"),
            })
        }

        fn on_run_complete(&mut self, _record: &RunRecord) -> Result<(), LogError> {
            self.attempts = self.attempts.saturating_add(1);
            Err(LogError::Format {
                message: String::from("disk full"),
            })
        }
    }

    #[derive(Default)]
    struct CountingSink {
        frames: u64,
    }

    impl RenderSink for CountingSink {
        fn render(&mut self, _tick: u64, views: &[AgentView]) {
            assert_eq!(views.len(), 3);
            self.frames = self.frames.saturating_add(1);
        }
    }

    #[tokio::test]
    async fn stops_at_tick_limit_without_record() {
        let mut state = state();
        let time = ManualTimeSource::new();
        let mut sink = CountingSink::default();
        let result = run_simulation(
            &mut state,
            &EmpatheticPolicy,
            &operator(5),
            &time,
            &mut sink,
            &mut NullLogger,
        )
        .await
        .unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert!(result.record.is_none());
        assert_eq!(sink.frames, 5);
        log_simulation_end(&result);
    }

    #[tokio::test]
    async fn operator_stop_runs_no_ticks() {
        let mut state = state();
        let op = operator(0);
        op.request_stop();
        let result = run_simulation(
            &mut state,
            &EmpatheticPolicy,
            &op,
            &ManualTimeSource::new(),
            &mut NoOpSink,
            &mut NullLogger,
        )
        .await
        .unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
    }

    #[tokio::test]
    async fn real_time_limit_is_checked_before_each_tick() {
        let mut state = state();
        let time = ManualTimeSource::new();
        time.advance(Duration::from_secs(31));
        let op = Arc::new(OperatorState::new(
            0,
            &SimulationBoundsConfig {
                max_ticks: 0,
                max_real_time_seconds: 30,
            },
        ));
        let result = run_simulation(
            &mut state,
            &EmpatheticPolicy,
            &op,
            &time,
            &mut NoOpSink,
            &mut NullLogger,
        )
        .await
        .unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::MaxRealTimeReached);
        assert_eq!(result.total_ticks, 0);
    }

    #[tokio::test]
    async fn logger_failures_do_not_stop_the_run() {
        let mut state = state();
        // Park every robot on the top dock strip so all dock on tick 1.
        for (index, agent) in state.agents.iter_mut().enumerate() {
            let offset = f64::from(u32::try_from(index).unwrap()) * 30.0;
            agent.pose.position = Point::new(210.0 + offset, 3.0);
        }
        let mut logger = FailingLogger::default();
        let result = run_simulation(
            &mut state,
            &EmpatheticPolicy,
            &operator(100),
            &ManualTimeSource::new(),
            &mut NoOpSink,
            &mut logger,
        )
        .await
        .unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::AllDocked);
        assert_eq!(result.total_ticks, 1);
        assert_eq!(logger.attempts, 4);
        let record = result.record.unwrap();
        assert_eq!(record.dock_order, vec!["A", "B", "C"]);
    }
}
