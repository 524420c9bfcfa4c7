//! Tunables for robot motion, battery decay, and the knowledge store.
//!
//! These structs deserialize directly from the `motion`, `battery`, and
//! `knowledge` sections of `empathy-config.yaml`. Every field defaults to
//! the reference value used in the original experiments.

use serde::Deserialize;

use crate::knowledge::REFERENCE_PRIORS;

/// Motion parameters shared by every robot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MotionConfig {
    /// Distance travelled per tick while active (default: 2).
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Maximum heading change per tick, in radians (default: 0.1).
    #[serde(default = "default_turn_speed")]
    pub turn_speed: f64,

    /// Robot diameter. Also the collision distance (default: 16.4).
    #[serde(default = "default_robot_size")]
    pub robot_size: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            turn_speed: default_turn_speed(),
            robot_size: default_robot_size(),
        }
    }
}

/// Battery decay parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatteryConfig {
    /// Model battery drain at all (default: true). With the battery off,
    /// robots dock on the target zone itself instead of the dock strips.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Full charge (default: 100).
    #[serde(default = "default_capacity")]
    pub capacity: f64,

    /// Charge removed per elapsed interval (default: 2).
    #[serde(default = "default_decrement")]
    pub decrement: f64,

    /// Wall-clock seconds between decrements (default: 10).
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: f64,

    /// Feed the raw charge into the state vector instead of the
    /// capacity-normalized fraction (default: false).
    #[serde(default)]
    pub raw_state_feature: bool,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            capacity: default_capacity(),
            decrement: default_decrement(),
            interval_seconds: default_interval_seconds(),
            raw_state_feature: false,
        }
    }
}

/// One prior `(state, reward)` example as written in the config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriorConfig {
    /// Feature values; must have exactly six entries.
    pub state: Vec<f64>,
    /// Reward associated with the state.
    pub reward: f64,
}

/// Knowledge store parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KnowledgeConfig {
    /// Novelty gate: states more similar than this to any stored entry are
    /// skipped (default: 0.96).
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Prior examples every robot starts with (default: the eight
    /// reference priors).
    #[serde(default = "default_priors")]
    pub priors: Vec<PriorConfig>,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            priors: default_priors(),
        }
    }
}

const fn default_speed() -> f64 {
    2.0
}

const fn default_turn_speed() -> f64 {
    0.1
}

const fn default_robot_size() -> f64 {
    16.4
}

const fn default_enabled() -> bool {
    true
}

const fn default_capacity() -> f64 {
    100.0
}

const fn default_decrement() -> f64 {
    2.0
}

const fn default_interval_seconds() -> f64 {
    10.0
}

const fn default_similarity_threshold() -> f64 {
    0.96
}

fn default_priors() -> Vec<PriorConfig> {
    REFERENCE_PRIORS
        .iter()
        .map(|(state, reward)| PriorConfig {
            state: state.to_vec(),
            reward: *reward,
        })
        .collect()
}
