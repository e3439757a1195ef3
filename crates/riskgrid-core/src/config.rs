//! Configuration loading and typed config structures for a riskgrid scenario.
//!
//! The canonical configuration lives in `riskgrid-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads the file and turns the model
//! and run sections into validated [`SimulationParams`].

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SimulationError;
use crate::params::{RandomStream, SimulationParams};
use crate::risk::{RiskWeights, Thresholds};

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
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level scenario configuration.
///
/// Mirrors the structure of `riskgrid-config.yaml`. Every field has a default,
/// so an empty file describes the reference scenario.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScenarioConfig {
    /// Grid dimensions.
    #[serde(default)]
    pub grid: GridConfig,

    /// Risk model weights and thresholds.
    #[serde(default)]
    pub model: ModelConfig,

    /// Step count, seed and random stream.
    #[serde(default)]
    pub run: RunConfig,

    /// Participant data source.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Output file locations.
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ScenarioConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `RISKGRID_POPULATION_PATH` overrides `population.path`
    /// - `RISKGRID_SEED` overrides `run.seed`
    /// - `RISKGRID_STEPS` overrides `run.steps`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Override selected values with environment variables when set.
    ///
    /// Unparseable numeric values are ignored and the YAML value is kept.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("RISKGRID_POPULATION_PATH") {
            self.population.path = PathBuf::from(val);
        }
        if let Some(seed) = env_parse::<u64>("RISKGRID_SEED") {
            self.run.seed = seed;
        }
        if let Some(steps) = env_parse::<i64>("RISKGRID_STEPS") {
            self.run.steps = steps;
        }
    }

    /// Validated run parameters built from the `model` and `run` sections.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidParameter`] for negative steps,
    /// invalid weights, or thresholds outside `0 <= down_th < up_th <= 1`.
    pub fn simulation_params(&self) -> Result<SimulationParams, SimulationError> {
        let weights = RiskWeights {
            w_self: self.model.w_self,
            w_neigh: self.model.w_neigh,
        };
        let thresholds = Thresholds {
            up: self.model.up_th,
            down: self.model.down_th,
        };
        let params = SimulationParams::new(weights, thresholds, self.run.seed, self.run.steps)?;
        Ok(params.with_stream(self.run.random_stream))
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .and_then(|val| val.trim().parse().ok())
}

/// Grid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GridConfig {
    /// Side length `N` of the square grid.
    #[serde(default = "default_grid_size")]
    pub size: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: default_grid_size(),
        }
    }
}

/// Risk model configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelConfig {
    /// Weight of a cell's own risk.
    #[serde(default = "default_w_self")]
    pub w_self: f64,

    /// Weight of the high-risk neighbor fraction.
    #[serde(default = "default_w_neigh")]
    pub w_neigh: f64,

    /// Score above which a cell may move up one level.
    #[serde(default = "default_up_th")]
    pub up_th: f64,

    /// Score below which a cell may move down one level.
    #[serde(default = "default_down_th")]
    pub down_th: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            w_self: default_w_self(),
            w_neigh: default_w_neigh(),
            up_th: default_up_th(),
            down_th: default_down_th(),
        }
    }
}

/// Run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Number of steps. Kept signed so a negative value reaches validation.
    #[serde(default = "default_steps")]
    pub steps: i64,

    /// Seed of the run's random generator.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// `shared` (row-major, single-threaded) or `per_cell` (parallel).
    #[serde(default)]
    pub random_stream: RandomStream,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            seed: default_seed(),
            random_stream: RandomStream::default(),
        }
    }
}

/// Participant data configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// JSON file holding an array of participant records.
    #[serde(default = "default_population_path")]
    pub path: PathBuf,

    /// Seed used when sampling participants onto the grid.
    #[serde(default = "default_sample_seed")]
    pub sample_seed: u64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            path: default_population_path(),
            sample_seed: default_sample_seed(),
        }
    }
}

/// Output file configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Where the per-step history is written.
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,

    /// Where the full run report is written.
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
            report_path: default_report_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log the distribution every N steps (0 disables progress lines).
    #[serde(default = "default_progress_interval_steps")]
    pub progress_interval_steps: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            progress_interval_steps: default_progress_interval_steps(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_grid_size() -> usize {
    30
}

const fn default_w_self() -> f64 {
    0.4
}

const fn default_w_neigh() -> f64 {
    0.6
}

const fn default_up_th() -> f64 {
    0.7
}

const fn default_down_th() -> f64 {
    0.3
}

const fn default_steps() -> i64 {
    50
}

const fn default_seed() -> u64 {
    123
}

fn default_population_path() -> PathBuf {
    PathBuf::from("population.json")
}

const fn default_sample_seed() -> u64 {
    42
}

fn default_history_path() -> PathBuf {
    PathBuf::from("scenario_history.json")
}

fn default_report_path() -> PathBuf {
    PathBuf::from("scenario_report.json")
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_progress_interval_steps() -> usize {
    10
}
