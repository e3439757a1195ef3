//! Per-cell risk model.
//!
//! A cell's score blends its own state and exposure with the share of
//! high-risk cells around it:
//!
//! ```text
//! self_part     = 0.5 * state / 3 + 0.5 * base_risk(exposure)
//! neighbor_risk = (# neighbors with state >= 2) / (# neighbors)
//! total         = clamp(w_self * self_part + w_neigh * neighbor_risk + jitter, 0, 1)
//! ```
//!
//! The score is then turned into a transition by a two-stage gate: the score
//! must cross a threshold *and* an independent uniform draw must fall below
//! [`TRANSITION_GATE`]. The same draw gates both directions, so no cell ever
//! moves with probability above one half per step, however extreme its score.

use riskgrid_types::{ExposureLevel, RiskState};
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

/// Weight of the normalized state inside the self part (the exposure gets
/// the complement).
pub const STATE_SHARE: f64 = 0.5;

/// Standard deviation of the Gaussian jitter added to every score.
pub const JITTER_STD_DEV: f64 = 0.05;

/// A triggered cell only moves when its uniform draw is below this value.
pub const TRANSITION_GATE: f64 = 0.5;

/// Blend between a cell's own risk and its neighborhood's.
///
/// The two weights need not sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    /// Weight of the self part.
    pub w_self: f64,
    /// Weight of the high-risk neighbor fraction.
    pub w_neigh: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            w_self: 0.4,
            w_neigh: 0.6,
        }
    }
}

impl RiskWeights {
    /// Check that both weights are finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidParameter`] otherwise.
    pub fn validate(&self) -> Result<(), SimulationError> {
        for (name, value) in [("w_self", self.w_self), ("w_neigh", self.w_neigh)] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::invalid(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Score thresholds for moving up or down one level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// A score strictly above this may raise the state.
    pub up: f64,
    /// A score strictly below this may lower the state.
    pub down: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { up: 0.7, down: 0.3 }
    }
}

impl Thresholds {
    /// Check `0 <= down < up <= 1`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidParameter`] when the ordering or
    /// range is violated.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let Self { up, down } = *self;
        if !(up.is_finite() && down.is_finite()) {
            return Err(SimulationError::invalid(format!(
                "thresholds must be finite, got up_th={up} down_th={down}"
            )));
        }
        if down < 0.0 || up > 1.0 || down >= up {
            return Err(SimulationError::invalid(format!(
                "thresholds must satisfy 0 <= down_th < up_th <= 1, got up_th={up} down_th={down}"
            )));
        }
        Ok(())
    }
}

/// Own contribution of a cell: half normalized state, half exposure risk.
#[allow(clippy::suboptimal_flops)]
pub fn self_part(state: RiskState, exposure: ExposureLevel) -> f64 {
    STATE_SHARE * state.normalized() + (1.0 - STATE_SHARE) * exposure.base_risk()
}

/// Fraction of `neighbors` at level 2 or above; 0.0 for an empty slice.
pub fn neighbor_risk(neighbors: &[RiskState]) -> f64 {
    if neighbors.is_empty() {
        return 0.0;
    }
    let high = neighbors.iter().filter(|s| s.is_high()).count();
    let high = u32::try_from(high).unwrap_or(u32::MAX);
    let total = u32::try_from(neighbors.len()).unwrap_or(u32::MAX);
    f64::from(high) / f64::from(total)
}

/// Bounded risk score of one cell, in `[0, 1]`.
#[allow(clippy::suboptimal_flops)]
pub fn risk_score(
    state: RiskState,
    exposure: ExposureLevel,
    neighbors: &[RiskState],
    weights: RiskWeights,
    jitter: f64,
) -> f64 {
    let raw =
        weights.w_self * self_part(state, exposure) + weights.w_neigh * neighbor_risk(neighbors);
    (raw + jitter).clamp(0.0, 1.0)
}

/// State after applying the threshold policy to `score`.
///
/// `draw` is the cell's uniform draw in `[0, 1)`. A state at the ceiling
/// never rises and one at the floor never falls.
pub fn next_state(state: RiskState, score: f64, draw: f64, thresholds: Thresholds) -> RiskState {
    let gate_open = draw < TRANSITION_GATE;
    if gate_open
        && score > thresholds.up
        && let Some(up) = state.raised()
    {
        up
    } else if gate_open
        && score < thresholds.down
        && let Some(down) = state.lowered()
    {
        down
    } else {
        state
    }
}
