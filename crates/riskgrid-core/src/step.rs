//! Synchronous grid update.
//!
//! One step reads the current risk grid as an immutable snapshot and writes
//! every cell's next state into a fresh grid. No cell ever sees a neighbor's
//! value from the step in progress. The exposure grid is read-only.
//!
//! Two flavors share the same per-cell rule:
//!
//! - [`advance`] consumes one injected [`CellDraws`] in row-major order
//!   (jitter, then uniform, per cell). This is the reference order.
//! - [`advance_per_cell`] gives every cell a private generator derived from
//!   `(run_seed, step, cell)` and evaluates cells on the rayon pool.

use rayon::prelude::*;
use riskgrid_types::RiskState;

use crate::error::SimulationError;
use crate::grid::{ExposureGrid, RiskGrid};
use crate::neighborhood::moore_neighbors;
use crate::random::{CellDraws, SeededDraws};
use crate::risk::{self, RiskWeights, Thresholds};

/// Produce the next grid from `current`, drawing randomness from `draws` in
/// row-major order.
///
/// # Errors
///
/// Returns [`SimulationError::DimensionMismatch`] if the grids differ in size.
pub fn advance<D>(
    current: &RiskGrid,
    exposure: &ExposureGrid,
    weights: RiskWeights,
    thresholds: Thresholds,
    draws: &mut D,
) -> Result<RiskGrid, SimulationError>
where
    D: CellDraws + ?Sized,
{
    current.ensure_same_size(exposure)?;
    let size = current.size();
    let mut next = Vec::with_capacity(current.cell_count());
    for row in 0..size {
        for col in 0..size {
            next.push(update_cell(current, exposure, row, col, weights, thresholds, draws));
        }
    }
    RiskGrid::from_cells(size, next)
}

/// Produce the next grid with one private generator per cell, in parallel.
///
/// The result depends only on `(run_seed, step)` and the inputs, not on
/// thread scheduling.
///
/// # Errors
///
/// Returns [`SimulationError::DimensionMismatch`] if the grids differ in size.
pub fn advance_per_cell(
    current: &RiskGrid,
    exposure: &ExposureGrid,
    weights: RiskWeights,
    thresholds: Thresholds,
    run_seed: u64,
    step: u64,
) -> Result<RiskGrid, SimulationError> {
    current.ensure_same_size(exposure)?;
    let size = current.size();
    let next: Vec<RiskState> = (0..current.cell_count())
        .into_par_iter()
        .map(|index| {
            let (row, col) = current.coords_of(index).unwrap_or_default();
            let cell = u64::try_from(index).unwrap_or(u64::MAX);
            let mut draws = SeededDraws::for_cell(run_seed, step, cell);
            update_cell(current, exposure, row, col, weights, thresholds, &mut draws)
        })
        .collect();
    RiskGrid::from_cells(size, next)
}

/// Next state of the cell at `(row, col)`, read from the pre-step snapshot.
fn update_cell<D>(
    current: &RiskGrid,
    exposure: &ExposureGrid,
    row: usize,
    col: usize,
    weights: RiskWeights,
    thresholds: Thresholds,
    draws: &mut D,
) -> RiskState
where
    D: CellDraws + ?Sized,
{
    let state = current.get(row, col).unwrap_or_default();
    let level = exposure.get(row, col).unwrap_or_default();
    let neighbors = moore_neighbors(row, col, current.size())
        .map(|(r, c)| current.get(r, c).unwrap_or_default());

    let jitter = draws.jitter();
    let score = risk::risk_score(state, level, &neighbors, weights, jitter);
    let u = draws.uniform();
    risk::next_state(state, score, u, thresholds)
}
