//! Scenario binary for riskgrid.
//!
//! This is the main entry point that wires together configuration, the
//! participant population, the automaton run, and report export.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `riskgrid-config.yaml` (or the path given as
//!    the first argument)
//! 2. Initialize structured logging (tracing)
//! 3. Validate run parameters
//! 4. Load and classify the participant population
//! 5. Sample the initial risk and exposure grids
//! 6. Run the simulation, logging progress
//! 7. Write the history and report files
//! 8. Log the final distribution

mod error;
mod observer;
mod report;

use std::path::{Path, PathBuf};

use chrono::Utc;
use riskgrid_core::config::ScenarioConfig;
use riskgrid_core::population::Cohort;
use riskgrid_core::runner;
use riskgrid_types::{ExposureLevel, StateCounts};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::observer::ProgressObserver;
use crate::report::RunReport;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "riskgrid-config.yaml";

/// Application entry point for the scenario binary.
///
/// # Errors
///
/// Returns an error if any initialization step, the run, or export fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so the outcome is
    //    reported right after step 2.
    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, config_found) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    let default_level = config.logging.level.clone();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(true)
        .init();

    info!("riskgrid-engine starting");
    if config_found {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    // 3. Validate run parameters.
    let params = config.simulation_params().map_err(EngineError::from)?;
    info!(
        grid_size = config.grid.size,
        steps = params.steps(),
        seed = params.seed(),
        stream = ?params.stream(),
        "Run parameters validated"
    );

    // 4. Load and classify the population.
    let cohort = Cohort::load(&config.population.path).map_err(EngineError::from)?;
    log_counts("Population risk labels", cohort.state_counts());
    info!(
        low = cohort.exposure_count(ExposureLevel::Low),
        medium = cohort.exposure_count(ExposureLevel::Medium),
        high = cohort.exposure_count(ExposureLevel::High),
        unknown = cohort.exposure_count(ExposureLevel::Unknown),
        q1 = cohort.bands().map(|b| b.q1),
        q3 = cohort.bands().map(|b| b.q3),
        "Population exposure levels"
    );

    // 5. Sample the initial grids.
    let (initial, exposure) = cohort
        .sample_grids(config.grid.size, config.population.sample_seed)
        .map_err(EngineError::from)?;
    let initial_counts = initial.state_counts();
    log_counts("Initial grid sampled", initial_counts);

    // 6. Run the simulation.
    let started_at = Utc::now();
    let mut observer =
        ProgressObserver::new(config.logging.progress_interval_steps, params.steps());
    let outcome = runner::run_with_observer(&initial, &exposure, &params, &mut observer)
        .map_err(EngineError::from)?;
    let finished_at = Utc::now();

    // 7. Write outputs.
    report::write_history(&config.output.history_path, &outcome.history)?;
    info!(path = %config.output.history_path.display(), "History written");

    let run_report = RunReport::new(&params, initial_counts, &outcome, started_at, finished_at);
    report::write_report(&config.output.report_path, &run_report)?;
    info!(
        path = %config.output.report_path.display(),
        run_id = %run_report.run_id,
        "Report written"
    );

    // 8. Log results.
    log_counts("Final grid", outcome.final_counts());
    info!(
        elapsed_ms = finished_at
            .signed_duration_since(started_at)
            .num_milliseconds(),
        "riskgrid-engine shutdown complete"
    );

    Ok(())
}

/// Load the scenario configuration, falling back to defaults when the file
/// does not exist. The flag tells whether the file was found.
fn load_config(path: &Path) -> Result<(ScenarioConfig, bool), EngineError> {
    if path.exists() {
        let config = ScenarioConfig::from_file(path)?;
        Ok((config, true))
    } else {
        let mut config = ScenarioConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}

fn log_counts(message: &str, counts: StateCounts) {
    info!(
        sii_0 = counts.none,
        sii_1 = counts.mild,
        sii_2 = counts.moderate,
        sii_3 = counts.severe,
        "{message}"
    );
}
