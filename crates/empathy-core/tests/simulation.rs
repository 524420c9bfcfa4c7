//! Multi-module scenarios: perception, knowledge, decision, and kinematics
//! driven together through the tick loop.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;
use std::time::Duration;

use empathy_core::clock::{ManualTimeSource, TimeSource};
use empathy_core::config::{PolicyKind, SimulationConfig};
use empathy_core::decision::{EmpatheticPolicy, SelfishPolicy, policy_for};
use empathy_core::operator::{OperatorState, SimulationEndReason};
use empathy_core::render::NoOpSink;
use empathy_core::report::{DockRecord, LogError, RunLogger, RunRecord};
use empathy_core::runner::run_simulation;
use empathy_core::tick::{SimulationState, resolve_collisions, run_tick};
use empathy_types::{BehaviorState, Point, Pose};

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn state_from(config: &SimulationConfig) -> SimulationState {
    SimulationState::from_config(config, Duration::ZERO).unwrap()
}

fn default_state() -> SimulationState {
    state_from(&SimulationConfig::default())
}

#[derive(Default)]
struct RecordingLogger {
    docks: Vec<DockRecord>,
    runs: Vec<RunRecord>,
}

impl RunLogger for RecordingLogger {
    fn on_dock(&mut self, record: &DockRecord) -> Result<(), LogError> {
        self.docks.push(record.clone());
        Ok(())
    }

    fn on_run_complete(&mut self, record: &RunRecord) -> Result<(), LogError> {
        self.runs.push(record.clone());
        Ok(())
    }
}

#[test]
fn robot_on_dock_docks_that_tick_and_never_moves() {
    let mut state = default_state();
    state.agents[0].pose.position = Point::new(250.0, 8.0);
    let parked = state.agents[0].pose;

    let summary = run_tick(&mut state, &EmpatheticPolicy, Duration::from_secs(3)).unwrap();
    assert_eq!(summary.docked.len(), 1);
    assert_eq!(summary.docked[0].label, "A");
    assert_eq!(summary.docked[0].rank, 1);
    assert_eq!(summary.docked[0].dock_time, Duration::from_secs(3));
    assert_eq!(state.agents[0].state, BehaviorState::Docked);
    assert_eq!(state.dock_order, vec![state.agents[0].id]);

    for second in 4..200 {
        let summary = run_tick(&mut state, &EmpatheticPolicy, Duration::from_secs(second)).unwrap();
        assert!(summary.docked.iter().all(|record| record.label != "A"));
        assert_eq!(state.agents[0].pose, parked);
        assert!(state.agents[0].speed.abs() < f64::EPSILON);
    }
    assert_eq!(state.agents[0].docked_at, Some(Duration::from_secs(3)));
}

#[test]
fn collision_boundary_is_exclusive() {
    let mut state = default_state();
    state.agents[2].pose.position = Point::new(20.0, 380.0);

    state.agents[0].pose = Pose::new(Point::new(100.0, 200.0), 0.0);
    state.agents[1].pose = Pose::new(Point::new(100.0 + 16.4 - 1.0, 200.0), 0.5);
    assert_eq!(resolve_collisions(&mut state.agents, 16.4), vec![(0, 1)]);
    assert!(approx_eq(state.agents[0].pose.heading, FRAC_PI_2));
    assert!(approx_eq(state.agents[1].pose.heading, 0.5 + FRAC_PI_2));

    state.agents[0].pose = Pose::new(Point::new(100.0, 200.0), 0.0);
    state.agents[1].pose = Pose::new(Point::new(116.4, 200.0), 0.5);
    assert!(resolve_collisions(&mut state.agents, 16.4).is_empty());
    assert!(approx_eq(state.agents[0].pose.heading, 0.0));
    assert!(approx_eq(state.agents[1].pose.heading, 0.5));
}

#[test]
fn exhausted_battery_stops_robot_for_good() {
    let mut config = SimulationConfig::default();
    config.battery.capacity = 4.0;
    config.battery.decrement = 2.0;
    config.battery.interval_seconds = 10.0;
    let mut state = state_from(&config);
    let time = ManualTimeSource::new();

    run_tick(&mut state, &EmpatheticPolicy, time.elapsed()).unwrap();
    assert!(state.agents.iter().all(|agent| agent.is_active()));

    time.advance(Duration::from_secs(10));
    run_tick(&mut state, &EmpatheticPolicy, time.elapsed()).unwrap();
    assert!(approx_eq(state.agents[0].battery.level(), 2.0));

    time.advance(Duration::from_secs(10));
    let summary = run_tick(&mut state, &EmpatheticPolicy, time.elapsed()).unwrap();
    assert!(summary.all_inactive);
    assert!(!summary.all_docked);

    let poses: Vec<_> = state.agents.iter().map(|agent| agent.pose).collect();
    for _ in 0..50 {
        time.advance(Duration::from_secs(10));
        run_tick(&mut state, &EmpatheticPolicy, time.elapsed()).unwrap();
    }
    for (agent, pose) in state.agents.iter().zip(&poses) {
        assert_eq!(agent.state, BehaviorState::Depleted);
        assert!(agent.battery.level().abs() < f64::EPSILON);
        assert!(agent.speed.abs() < f64::EPSILON);
        assert_eq!(agent.pose, *pose);
    }
}

#[test]
fn invariants_hold_over_a_long_run() {
    let mut config = SimulationConfig::default();
    config.world.seed = 11;
    let mut state = state_from(&config);
    let mut sizes: Vec<usize> = state.agents.iter().map(|a| a.knowledge.len()).collect();
    let mut batteries: Vec<f64> = state.agents.iter().map(|a| a.battery.level()).collect();

    for tick in 0..3_000_u64 {
        let now = Duration::from_millis(tick.saturating_mul(16));
        let summary = run_tick(&mut state, &EmpatheticPolicy, now).unwrap();
        for (index, agent) in state.agents.iter().enumerate() {
            assert!(agent.knowledge.len() >= sizes[index]);
            assert!(agent.battery.level() <= batteries[index]);
            assert!(state.perceiver.arena().contains(agent.pose.position));
            sizes[index] = agent.knowledge.len();
            batteries[index] = agent.battery.level();
        }
        if summary.all_docked {
            break;
        }
    }
}

#[test]
fn selfish_robots_never_follow() {
    let mut config = SimulationConfig::default();
    config.policy = PolicyKind::Selfish;
    let mut state = state_from(&config);
    // A peer seeking the target right in front of robot A.
    state.agents[0].pose = Pose::new(Point::new(20.0, 300.0), 0.0);
    state.agents[1].pose = Pose::new(Point::new(80.0, 300.0), 0.0);
    state.agents[1].state = BehaviorState::SeekingTarget;

    let policy = policy_for(config.policy);
    for tick in 0..1_000_u64 {
        run_tick(&mut state, policy.as_ref(), Duration::from_millis(tick)).unwrap();
        assert!(
            state
                .agents
                .iter()
                .all(|agent| agent.state != BehaviorState::FollowingPeer)
        );
    }
    assert!(state.agents.iter().all(|agent| !agent.has_followed));
}

#[test]
fn empathetic_robot_follows_seeking_peer() {
    let mut state = default_state();
    state.agents[2].pose.position = Point::new(20.0, 50.0);
    // B is marked as seeking. A is updated first, so it decides on that
    // state before B's own turn recomputes it.
    state.agents[0].pose = Pose::new(Point::new(20.0, 300.0), 0.0);
    state.agents[1].pose = Pose::new(Point::new(80.0, 300.0), 0.0);
    state.agents[1].state = BehaviorState::SeekingTarget;

    run_tick(&mut state, &EmpatheticPolicy, Duration::ZERO).unwrap();
    assert_eq!(state.agents[0].state, BehaviorState::FollowingPeer);
    assert!(state.agents[0].has_followed);
}

#[test]
fn first_sighting_goes_to_first_robot_in_array_order() {
    let mut state = default_state();
    let facing_target = -std::f64::consts::FRAC_PI_4;
    state.agents[0].pose = Pose::new(Point::new(20.0, 380.0), 0.0);
    state.agents[1].pose = Pose::new(Point::new(150.0, 150.0), facing_target);
    state.agents[2].pose = Pose::new(Point::new(160.0, 140.0), facing_target);

    run_tick(&mut state, &SelfishPolicy, Duration::ZERO).unwrap();
    assert_eq!(state.agents[1].state, BehaviorState::SeekingTarget);
    assert_eq!(state.agents[2].state, BehaviorState::SeekingTarget);
    assert_eq!(state.first_sighting, Some(state.agents[1].id));
}

fn park_inside_target(state: &mut SimulationState) {
    for (index, agent) in state.agents.iter_mut().enumerate() {
        let offset = f64::from(u32::try_from(index).unwrap()) * 20.0;
        agent.pose.position = Point::new(230.0 + offset, 50.0);
    }
}

#[test]
fn without_battery_robots_dock_on_the_target() {
    let mut config = SimulationConfig::default();
    config.policy = PolicyKind::Selfish;
    config.battery.enabled = false;
    let mut state = state_from(&config);
    park_inside_target(&mut state);

    let policy = policy_for(config.policy);
    let summary = run_tick(&mut state, policy.as_ref(), Duration::from_secs(3_600)).unwrap();
    assert!(summary.all_docked);
    assert_eq!(summary.docked.len(), 3);
    for agent in &state.agents {
        assert_eq!(agent.state, BehaviorState::Docked);
        assert!((agent.battery.level() - 100.0).abs() < f64::EPSILON);
    }
}

#[test]
fn with_battery_the_target_alone_does_not_dock() {
    let mut state = default_state();
    park_inside_target(&mut state);

    let summary = run_tick(&mut state, &SelfishPolicy, Duration::ZERO).unwrap();
    assert!(summary.docked.is_empty());
    assert!(!summary.all_docked);
    assert!(state.agents.iter().all(|agent| agent.is_active()));
}

#[tokio::test]
async fn run_to_completion_emits_one_record() {
    let mut config = SimulationConfig::default();
    config.world.tick_interval_ms = 0;
    config.simulation.max_ticks = 10_000;
    let mut state = state_from(&config);
    for (index, agent) in state.agents.iter_mut().enumerate() {
        let offset = f64::from(u32::try_from(index).unwrap()) * 25.0;
        // Start just below the top dock strip, facing straight up.
        agent.pose = Pose::new(Point::new(215.0 + offset, 30.0), -FRAC_PI_2);
    }

    let operator = Arc::new(OperatorState::new(
        config.world.tick_interval_ms,
        &config.simulation,
    ));
    let time = ManualTimeSource::new();
    let mut logger = RecordingLogger::default();
    let result = run_simulation(
        &mut state,
        &EmpatheticPolicy,
        &operator,
        &time,
        &mut NoOpSink,
        &mut logger,
    )
    .await
    .unwrap();

    assert_eq!(result.end_reason, SimulationEndReason::AllDocked);
    assert_eq!(logger.docks.len(), 3);
    assert_eq!(logger.runs.len(), 1);
    let ranks: Vec<usize> = logger.docks.iter().map(|d| d.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
    let record = &logger.runs[0];
    assert_eq!(record.agents.len(), 3);
    assert_eq!(record.dock_order.len(), 3);
    assert!(record.agents.iter().all(|a| a.dock_time_seconds.is_some()));
    assert!(record.agents.iter().all(|a| a.knowledge_size >= 8));
    assert_eq!(record.policy, "empathetic");
}
