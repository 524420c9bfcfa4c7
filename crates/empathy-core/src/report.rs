//! Dock and run records handed to the external run logger.
//!
//! The core produces plain records; the [`RunLogger`] collaborator owns file
//! format, path, and append semantics. Logger failures never stop a run:
//! the runner reports them with `warn!` and carries on.

use std::time::Duration;

use chrono::{DateTime, Utc};
use empathy_agents::Agent;
use empathy_types::AgentId;
use serde::Serialize;

/// Errors a [`RunLogger`] may report.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Writing the log failed.
    #[error("run log I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The record could not be formatted.
    #[error("run log formatting failed: {message}")]
    Format {
        /// Description of the failure.
        message: String,
    },
}

/// Captured once, on the tick a robot docks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DockRecord {
    /// The docked robot.
    pub agent_id: AgentId,
    /// Its label.
    pub label: String,
    /// Elapsed run time at docking.
    pub dock_time: Duration,
    /// 1-based dock position.
    pub rank: usize,
    /// Knowledge base size at docking.
    pub knowledge_size: usize,
    /// States skipped by the novelty gate.
    pub skipped: u64,
    /// Skipped share of evaluated states, in percent.
    pub skip_percentage: f64,
}

impl DockRecord {
    /// Snapshot `agent` as it docks at `dock_time` in position `rank`.
    pub fn capture(agent: &Agent, dock_time: Duration, rank: usize) -> Self {
        Self {
            agent_id: agent.id,
            label: agent.label.clone(),
            dock_time,
            rank,
            knowledge_size: agent.knowledge.len(),
            skipped: agent.knowledge.skipped(),
            skip_percentage: agent.knowledge.skip_percentage(),
        }
    }
}

/// Final state of one robot in a run record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentOutcome {
    /// Robot label.
    pub label: String,
    /// Battery level at the end of the run.
    pub final_battery: f64,
    /// Seconds into the run at which the robot docked.
    pub dock_time_seconds: Option<f64>,
    /// Knowledge base size at the end of the run.
    pub knowledge_size: usize,
    /// States skipped by the novelty gate.
    pub skipped: u64,
}

/// One row per completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRecord {
    /// When the record was produced.
    pub recorded_at: DateTime<Utc>,
    /// Policy that drove the run.
    pub policy: String,
    /// Wall-clock run length in seconds.
    pub duration_seconds: f64,
    /// Ticks executed.
    pub ticks: u64,
    /// Per-robot outcomes, in spawn order.
    pub agents: Vec<AgentOutcome>,
    /// Labels in the order the robots docked.
    pub dock_order: Vec<String>,
    /// Number of robots that followed a peer at least once.
    pub follow_events: usize,
    /// Label of the first robot to sight the target.
    pub first_sighting: Option<String>,
}

impl RunRecord {
    /// Summarize a finished run.
    pub fn summarize(
        agents: &[Agent],
        dock_order: &[AgentId],
        first_sighting: Option<AgentId>,
        policy: &str,
        duration: Duration,
        ticks: u64,
    ) -> Self {
        let label_of = |id: AgentId| {
            agents
                .iter()
                .find(|agent| agent.id == id)
                .map(|agent| agent.label.clone())
        };
        Self {
            recorded_at: Utc::now(),
            policy: policy.to_owned(),
            duration_seconds: duration.as_secs_f64(),
            ticks,
            agents: agents
                .iter()
                .map(|agent| AgentOutcome {
                    label: agent.label.clone(),
                    final_battery: agent.battery.level(),
                    dock_time_seconds: agent.docked_at.map(|at| at.as_secs_f64()),
                    knowledge_size: agent.knowledge.len(),
                    skipped: agent.knowledge.skipped(),
                })
                .collect(),
            dock_order: dock_order.iter().filter_map(|id| label_of(*id)).collect(),
            follow_events: agents.iter().filter(|agent| agent.has_followed).count(),
            first_sighting: first_sighting.and_then(label_of),
        }
    }
}

/// Append-only sink for run statistics.
pub trait RunLogger: Send {
    /// A robot docked.
    ///
    /// # Errors
    ///
    /// Returns [`LogError`] if the record could not be written.
    fn on_dock(&mut self, record: &DockRecord) -> Result<(), LogError>;

    /// Every robot reached a terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`LogError`] if the record could not be written.
    fn on_run_complete(&mut self, record: &RunRecord) -> Result<(), LogError>;
}

/// A logger that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl RunLogger for NullLogger {
    fn on_dock(&mut self, _record: &DockRecord) -> Result<(), LogError> {
        Ok(())
    }

    fn on_run_complete(&mut self, _record: &RunRecord) -> Result<(), LogError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use empathy_agents::{AgentSpawn, BatteryConfig, KnowledgeConfig, MotionConfig};
    use empathy_types::{BehaviorState, Category};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn agents() -> Vec<Agent> {
        let mut rng = SmallRng::seed_from_u64(5);
        ["A", "B", "C"]
            .into_iter()
            .map(|label| {
                Agent::spawn(
                    &AgentSpawn {
                        label: String::from(label),
                        x: 10.0,
                        y: 10.0,
                        category: Category::Red,
                    },
                    &MotionConfig::default(),
                    &BatteryConfig::default(),
                    &KnowledgeConfig::default(),
                    Duration::ZERO,
                    &mut rng,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn summary_lists_dock_order_by_label() {
        let mut agents = agents();
        agents[2].settle(BehaviorState::Docked);
        agents[2].docked_at = Some(Duration::from_secs(4));
        agents[0].settle(BehaviorState::Docked);
        agents[0].docked_at = Some(Duration::from_secs(9));
        agents[1].has_followed = true;

        let order = [agents[2].id, agents[0].id];
        let record = RunRecord::summarize(
            &agents,
            &order,
            Some(agents[1].id),
            "empathetic",
            Duration::from_secs(12),
            700,
        );
        assert_eq!(record.dock_order, vec!["C", "A"]);
        assert_eq!(record.follow_events, 1);
        assert_eq!(record.first_sighting.as_deref(), Some("B"));
        assert_eq!(record.agents[1].dock_time_seconds, None);
        assert_eq!(record.agents[2].dock_time_seconds, Some(4.0));
        assert_eq!(record.agents[0].knowledge_size, 8);
    }

    #[test]
    fn dock_record_captures_knowledge_counters() {
        let agents = agents();
        let record = DockRecord::capture(&agents[0], Duration::from_millis(2_500), 1);
        assert_eq!(record.label, "A");
        assert_eq!(record.rank, 1);
        assert_eq!(record.knowledge_size, 8);
        assert_eq!(record.skipped, 0);
        assert!(record.skip_percentage.abs() < f64::EPSILON);
    }
}
