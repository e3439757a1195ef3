//! Run report and JSON export.
//!
//! Two files come out of a scenario run: the bare per-step history, and a
//! [`RunReport`] that also carries the parameters, timing, and final grid.

use std::path::Path;

use chrono::{DateTime, Utc};
use riskgrid_core::{RandomStream, RiskWeights, SimulationOutcome, SimulationParams, Thresholds};
use riskgrid_types::{HistoryRecord, StateCounts};
use serde::Serialize;
use uuid::Uuid;

use crate::error::EngineError;

/// Everything needed to reproduce and inspect one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Unique run identifier (time-ordered).
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// Grid side length.
    pub grid_size: usize,
    /// Number of steps run.
    pub steps: usize,
    /// Seed of the run's generator.
    pub seed: u64,
    /// Random stream strategy.
    pub random_stream: RandomStream,
    /// Risk blend weights.
    pub weights: RiskWeights,
    /// Transition thresholds.
    pub thresholds: Thresholds,
    /// Distribution of the sampled initial grid.
    pub initial_counts: StateCounts,
    /// Distribution of the final grid.
    pub final_counts: StateCounts,
    /// Per-step distribution.
    pub history: Vec<HistoryRecord>,
    /// Final grid as rows of levels.
    pub final_grid: Vec<Vec<u8>>,
}

impl RunReport {
    /// Assemble a report from a finished run.
    pub fn new(
        params: &SimulationParams,
        initial_counts: StateCounts,
        outcome: &SimulationOutcome,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            started_at,
            finished_at,
            grid_size: outcome.final_grid.size(),
            steps: params.steps(),
            seed: params.seed(),
            random_stream: params.stream(),
            weights: params.weights(),
            thresholds: params.thresholds(),
            initial_counts,
            final_counts: outcome.final_counts(),
            history: outcome.history.clone(),
            final_grid: outcome.final_grid.to_levels(),
        }
    }
}

/// Write the history as a pretty-printed JSON array.
pub fn write_history(path: &Path, history: &[HistoryRecord]) -> Result<(), EngineError> {
    write_json(path, history)
}

/// Write the full report as pretty-printed JSON.
pub fn write_report(path: &Path, report: &RunReport) -> Result<(), EngineError> {
    write_json(path, report)
}

/// Serialize `value` to `path`, creating parent directories as needed.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), EngineError> {
    let output_error = |message: String| EngineError::Output {
        path: path.to_path_buf(),
        message,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| output_error(format!("{e}")))?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|e| output_error(format!("{e}")))?;
    std::fs::write(path, json).map_err(|e| output_error(format!("{e}")))?;
    Ok(())
}
