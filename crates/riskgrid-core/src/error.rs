//! Error types for the `riskgrid-core` engine.
//!
//! Every check happens at the call boundary, before any grid is touched. The
//! per-cell update itself is infallible.

/// Errors that can occur when building grids or starting a run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    /// A parameter is outside its allowed range (thresholds, weights, grid
    /// size, step count, grid shape).
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// Explanation of what is wrong.
        reason: String,
    },

    /// The risk grid and exposure grid do not have the same size.
    #[error("risk grid is {risk}x{risk} but exposure grid is {exposure}x{exposure}")]
    DimensionMismatch {
        /// Side length of the risk grid.
        risk: usize,
        /// Side length of the exposure grid.
        exposure: usize,
    },
}

impl SimulationError {
    /// Shorthand for [`SimulationError::InvalidParameter`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }
}
