//! Simulation binary for the Empathy robot experiments.
//!
//! This is the main entry point that wires together configuration, the
//! robot population, the behavior policy, and the external collaborators
//! (CSV run log, trace renderer, Ctrl-C stop). It runs one simulation until
//! a termination condition is met.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `EMPATHY_CONFIG` or `empathy-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the arena and spawn the population
//! 4. Create operator state from simulation bounds
//! 5. Install the Ctrl-C stop handler
//! 6. Run the simulation loop
//! 7. Log the result

mod csv_log;
mod error;
mod render_log;

use std::path::PathBuf;
use std::sync::Arc;

use empathy_core::clock::{SystemTimeSource, TimeSource};
use empathy_core::config::SimulationConfig;
use empathy_core::decision::policy_for;
use empathy_core::operator::OperatorState;
use empathy_core::render::{NoOpSink, RenderSink};
use empathy_core::runner;
use empathy_core::tick::SimulationState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::csv_log::CsvRunLogger;
use crate::error::EngineError;
use crate::render_log::TraceRenderer;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "empathy-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so report afterwards.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("empathy-engine starting");
    match source {
        Some(ref path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        policy = ?config.policy,
        robots = config.population.len(),
        "Configuration resolved"
    );

    // 3. Build the arena and spawn the population.
    let time = SystemTimeSource::new();
    let mut state =
        SimulationState::from_config(&config, time.elapsed()).map_err(EngineError::from)?;
    let policy = policy_for(config.policy);

    // 4. Create operator state.
    let operator = Arc::new(OperatorState::new(
        config.world.tick_interval_ms,
        &config.simulation,
    ));
    info!(
        max_ticks = config.simulation.max_ticks,
        max_real_time_seconds = config.simulation.max_real_time_seconds,
        "Operator state initialized"
    );

    // 5. Ctrl-C is the window-close equivalent: stop before the next tick.
    {
        let operator = Arc::clone(&operator);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupt received, stopping");
                    operator.request_stop();
                }
                Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
            }
        });
    }

    // 6. Run the simulation.
    let mut logger = CsvRunLogger::new(&config.logging.run_log_path);
    let mut sink: Box<dyn RenderSink> = if config.logging.render_every_ticks > 0 {
        Box::new(TraceRenderer::new(config.logging.render_every_ticks))
    } else {
        Box::new(NoOpSink)
    };
    info!(run_log = %logger.path().display(), "Entering tick loop");

    let result = runner::run_simulation(
        &mut state,
        policy.as_ref(),
        &operator,
        &time,
        sink.as_mut(),
        &mut logger,
    )
    .await
    .map_err(EngineError::from)?;

    // 7. Log results.
    runner::log_simulation_end(&result);
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "empathy-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration.
///
/// `EMPATHY_CONFIG` names the file; otherwise `empathy-config.yaml` in the
/// working directory is used. A missing file means defaults. Returns the
/// path actually read, if any.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    let config_path = std::env::var_os("EMPATHY_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if config_path.exists() {
        let config = SimulationConfig::from_file(&config_path)?;
        Ok((config, Some(config_path)))
    } else {
        let mut config = SimulationConfig::default();
        config.logging.apply_env_overrides();
        Ok((config, None))
    }
}
