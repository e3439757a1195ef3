//! Validated parameters for one simulation run.

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::risk::{RiskWeights, Thresholds};

/// How random draws are assigned to cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RandomStream {
    /// One generator consumed in row-major order, single-threaded.
    #[default]
    Shared,
    /// One generator per cell per step, derived from the run seed; cells are
    /// evaluated in parallel.
    PerCell,
}

/// Immutable parameters of a run.
///
/// Built through [`SimulationParams::new`], so a value of this type always
/// satisfies `0 <= down_th < up_th <= 1` and has non-negative weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationParams {
    weights: RiskWeights,
    thresholds: Thresholds,
    seed: u64,
    steps: usize,
    stream: RandomStream,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            weights: RiskWeights::default(),
            thresholds: Thresholds::default(),
            seed: 123,
            steps: 50,
            stream: RandomStream::Shared,
        }
    }
}

impl SimulationParams {
    /// Validate and build parameters.
    ///
    /// `steps` is signed so that a negative count coming from configuration
    /// or a caller is rejected here instead of wrapping.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidParameter`] for negative `steps`,
    /// invalid weights, or thresholds outside `0 <= down < up <= 1`.
    pub fn new(
        weights: RiskWeights,
        thresholds: Thresholds,
        seed: u64,
        steps: i64,
    ) -> Result<Self, SimulationError> {
        weights.validate()?;
        thresholds.validate()?;
        let steps = usize::try_from(steps).map_err(|e| {
            SimulationError::invalid(format!("steps must be non-negative, got {steps} ({e})"))
        })?;
        Ok(Self {
            weights,
            thresholds,
            seed,
            steps,
            stream: RandomStream::Shared,
        })
    }

    /// Same parameters with a different random stream strategy.
    #[must_use]
    pub const fn with_stream(mut self, stream: RandomStream) -> Self {
        self.stream = stream;
        self
    }

    /// Risk blend weights.
    pub const fn weights(&self) -> RiskWeights {
        self.weights
    }

    /// Transition thresholds.
    pub const fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Seed of the run's generator.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of steps to run.
    pub const fn steps(&self) -> usize {
        self.steps
    }

    /// Random stream strategy.
    pub const fn stream(&self) -> RandomStream {
        self.stream
    }
}
