//! Error types for the scenario binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup, the run, and report export.

use std::path::PathBuf;

/// Top-level error for the scenario binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: riskgrid_core::config::ConfigError,
    },

    /// Population loading or grid sampling failed.
    #[error("population error: {source}")]
    Population {
        /// The underlying population error.
        #[from]
        source: riskgrid_core::population::PopulationError,
    },

    /// Parameter validation or the run itself failed.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: riskgrid_core::SimulationError,
    },

    /// Writing an output file failed.
    #[error("failed to write {path}: {message}")]
    Output {
        /// File that could not be written.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },
}
