//! Configuration loading and typed config structures for the Empathy simulation.
//!
//! The canonical configuration lives in `empathy-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.
//! Every field defaults to the reference value, so an empty file is a valid
//! configuration.

use std::path::Path;

use empathy_agents::{AgentSpawn, BatteryConfig, KnowledgeConfig, MotionConfig};
use empathy_types::{Category, STATE_FEATURES};
use empathy_world::{Arena, DockZone, WorldError};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an impossible simulation.
    #[error("invalid config: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `empathy-config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Seed and frame timing.
    #[serde(default)]
    pub world: WorldConfig,

    /// Arena, target, and dock geometry.
    #[serde(default)]
    pub arena: ArenaConfig,

    /// Vision cone parameters.
    #[serde(default)]
    pub vision: VisionConfig,

    /// Robot motion.
    #[serde(default)]
    pub motion: MotionConfig,

    /// Battery decay.
    #[serde(default)]
    pub battery: BatteryConfig,

    /// Knowledge store priors and novelty gate.
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Which decision policy drives the robots.
    #[serde(default)]
    pub policy: PolicyKind,

    /// Robots to spawn, in update order.
    #[serde(default = "default_population")]
    pub population: Vec<AgentSpawn>,

    /// Run limits.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            arena: ArenaConfig::default(),
            vision: VisionConfig::default(),
            motion: MotionConfig::default(),
            battery: BatteryConfig::default(),
            knowledge: KnowledgeConfig::default(),
            policy: PolicyKind::default(),
            population: default_population(),
            simulation: SimulationBoundsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// The `EMPATHY_RUN_LOG` environment variable overrides
    /// `logging.run_log_path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.logging.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Build the arena. Without battery modeling robots dock on the target
    /// zone itself, otherwise on the dock strips.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError`] if the arena geometry is inconsistent.
    pub fn build_arena(&self) -> Result<Arena, WorldError> {
        let zone = if self.battery.enabled {
            DockZone::Docks
        } else {
            DockZone::Target
        };
        self.arena.build().map(|arena| arena.with_dock_zone(zone))
    }

    /// Reject configurations that cannot produce a meaningful run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("arena.width", self.arena.width)?;
        require_positive("arena.height", self.arena.height)?;
        require_positive("arena.target_size", self.arena.target_size)?;
        require_positive("arena.dock_thickness", self.arena.dock_thickness)?;
        require_positive("vision.view_distance", self.vision.view_distance)?;
        require_positive("vision.view_angle_degrees", self.vision.view_angle_degrees)?;
        if self.vision.view_angle_degrees > 360.0 {
            return Err(invalid(format!(
                "vision.view_angle_degrees {} exceeds a full turn",
                self.vision.view_angle_degrees
            )));
        }
        require_positive("motion.turn_speed", self.motion.turn_speed)?;
        require_positive("motion.robot_size", self.motion.robot_size)?;
        if !(self.motion.speed.is_finite() && self.motion.speed >= 0.0) {
            return Err(invalid(format!(
                "motion.speed {} must be non-negative",
                self.motion.speed
            )));
        }
        require_positive("battery.capacity", self.battery.capacity)?;
        require_positive("battery.interval_seconds", self.battery.interval_seconds)?;

        let threshold = self.knowledge.similarity_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(invalid(format!(
                "knowledge.similarity_threshold {threshold} must be in (0, 1]"
            )));
        }
        if self.knowledge.priors.is_empty() {
            return Err(invalid(String::from("knowledge.priors must not be empty")));
        }
        for (index, prior) in self.knowledge.priors.iter().enumerate() {
            if prior.state.len() != STATE_FEATURES {
                return Err(invalid(format!(
                    "knowledge.priors[{index}] has {} features, expected {STATE_FEATURES}",
                    prior.state.len()
                )));
            }
        }

        if self.population.is_empty() {
            return Err(invalid(String::from("population must not be empty")));
        }
        for spawn in &self.population {
            let inside = (0.0..=self.arena.width).contains(&spawn.x)
                && (0.0..=self.arena.height).contains(&spawn.y);
            if !inside {
                return Err(invalid(format!(
                    "robot {} spawns at ({}, {}) outside the arena",
                    spawn.label, spawn.x, spawn.y
                )));
            }
        }
        Ok(())
    }
}

fn require_positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{field} {value} must be positive")))
    }
}

const fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

/// Seed and frame timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Minimum milliseconds between ticks (default: 16, roughly 60 fps).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Arena, target, and dock geometry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArenaConfig {
    /// Arena width (default: 300).
    #[serde(default = "default_arena_width")]
    pub width: f64,

    /// Arena height (default: 400).
    #[serde(default = "default_arena_height")]
    pub height: f64,

    /// Side of the square target in the top-right corner (default: 100).
    #[serde(default = "default_target_size")]
    pub target_size: f64,

    /// Inset applied to the target before measuring distance (default: 5).
    #[serde(default = "default_target_inset")]
    pub target_inset: f64,

    /// Thickness of the two dock strips (default: 5).
    #[serde(default = "default_dock_thickness")]
    pub dock_thickness: f64,
}

impl ArenaConfig {
    /// Build the arena this section describes.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError`] if the geometry is inconsistent.
    pub fn build(&self) -> Result<Arena, WorldError> {
        Arena::corner_target(
            self.width,
            self.height,
            self.target_size,
            self.target_inset,
            self.dock_thickness,
        )
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: default_arena_width(),
            height: default_arena_height(),
            target_size: default_target_size(),
            target_inset: default_target_inset(),
            dock_thickness: default_dock_thickness(),
        }
    }
}

/// Vision cone parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VisionConfig {
    /// Maximum sensing radius (default: 150).
    #[serde(default = "default_view_distance")]
    pub view_distance: f64,

    /// Full cone angle in degrees (default: 76).
    #[serde(default = "default_view_angle_degrees")]
    pub view_angle_degrees: f64,
}

impl VisionConfig {
    /// Half the cone angle, in radians.
    pub fn half_angle(&self) -> f64 {
        self.view_angle_degrees.to_radians() / 2.0
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            view_distance: default_view_distance(),
            view_angle_degrees: default_view_angle_degrees(),
        }
    }
}

/// Which behavior policy drives the robots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Robots follow visible peers that appear to be doing better.
    #[default]
    Empathetic,
    /// Robots never follow peers.
    Selfish,
}

/// Run limits. Zero means unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Stop after this many ticks.
    #[serde(default)]
    pub max_ticks: u64,

    /// Stop after this many wall-clock seconds.
    #[serde(default)]
    pub max_real_time_seconds: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is not set (default: `info`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Append-only CSV file receiving one row per completed run.
    #[serde(default = "default_run_log_path")]
    pub run_log_path: String,

    /// Emit a render frame every N ticks. Zero disables rendering.
    #[serde(default)]
    pub render_every_ticks: u64,
}

impl LoggingConfig {
    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("EMPATHY_RUN_LOG") {
            self.run_log_path = val;
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            run_log_path: default_run_log_path(),
            render_every_ticks: 0,
        }
    }
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    16
}

const fn default_arena_width() -> f64 {
    300.0
}

const fn default_arena_height() -> f64 {
    400.0
}

const fn default_target_size() -> f64 {
    100.0
}

const fn default_target_inset() -> f64 {
    5.0
}

const fn default_dock_thickness() -> f64 {
    5.0
}

const fn default_view_distance() -> f64 {
    150.0
}

const fn default_view_angle_degrees() -> f64 {
    76.0
}

fn default_population() -> Vec<AgentSpawn> {
    [("A", 50.0, 150.0), ("B", 65.0, 250.0), ("C", 80.0, 350.0)]
        .into_iter()
        .map(|(label, x, y)| AgentSpawn {
            label: String::from(label),
            x,
            y,
            category: Category::Red,
        })
        .collect()
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_run_log_path() -> String {
    String::from("empathy-runs.csv")
}
