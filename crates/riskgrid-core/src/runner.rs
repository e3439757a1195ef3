//! Simulation driver.
//!
//! This module provides [`run`], which advances the automaton for a fixed
//! number of steps and records the state distribution along the way:
//!
//! - **Validation first**: grid sizes are checked before any step runs.
//! - **History convention**: entry `t` is the distribution *before* step
//!   `t`'s transition, so the returned final grid is one step past the last
//!   history entry.
//! - **Observers**: a [`StepObserver`] sees every record and snapshot as it
//!   is produced.
//! - **Stream choice**: [`RandomStream::Shared`] runs the reference
//!   row-major order; [`RandomStream::PerCell`] runs cells in parallel.
//!
//! Intermediate grids are dropped as soon as the next one exists; only their
//! counts survive in the history.

use riskgrid_types::{HistoryRecord, StateCounts};
use tracing::{debug, info};

use crate::error::SimulationError;
use crate::grid::{ExposureGrid, RiskGrid};
use crate::params::{RandomStream, SimulationParams};
use crate::random::{CellDraws, SeededDraws};
use crate::step;

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationOutcome {
    /// One record per step, in step order.
    pub history: Vec<HistoryRecord>,
    /// Grid after the last step (the initial grid when no step ran).
    pub final_grid: RiskGrid,
}

impl SimulationOutcome {
    /// Distribution of the final grid.
    pub fn final_counts(&self) -> StateCounts {
        self.final_grid.state_counts()
    }
}

/// Callback invoked at the start of every step.
///
/// Implementations can use this to log progress or stream the distribution
/// elsewhere. The grid passed in is the snapshot the record was taken from.
pub trait StepObserver {
    /// Called once per step, before the step's transition is applied.
    fn on_step(&mut self, record: &HistoryRecord, grid: &RiskGrid);
}

/// A step observer that ignores everything.
pub struct NoOpObserver;

impl StepObserver for NoOpObserver {
    fn on_step(&mut self, _record: &HistoryRecord, _grid: &RiskGrid) {}
}

/// Run the automaton from `initial` for `params.steps()` steps.
///
/// # Errors
///
/// Returns [`SimulationError::DimensionMismatch`] if the two grids differ in
/// size.
pub fn run(
    initial: &RiskGrid,
    exposure: &ExposureGrid,
    params: &SimulationParams,
) -> Result<SimulationOutcome, SimulationError> {
    run_with_observer(initial, exposure, params, &mut NoOpObserver)
}

/// Like [`run`], notifying `observer` at every step.
///
/// # Errors
///
/// Returns [`SimulationError::DimensionMismatch`] if the two grids differ in
/// size.
pub fn run_with_observer(
    initial: &RiskGrid,
    exposure: &ExposureGrid,
    params: &SimulationParams,
    observer: &mut dyn StepObserver,
) -> Result<SimulationOutcome, SimulationError> {
    initial.ensure_same_size(exposure)?;
    let weights = params.weights();
    let thresholds = params.thresholds();

    info!(
        grid_size = initial.size(),
        steps = params.steps(),
        seed = params.seed(),
        stream = ?params.stream(),
        w_self = weights.w_self,
        w_neigh = weights.w_neigh,
        up_th = thresholds.up,
        down_th = thresholds.down,
        "Simulation starting"
    );

    let outcome = match params.stream() {
        RandomStream::Shared => {
            let mut draws = SeededDraws::from_seed(params.seed());
            drive(initial, params.steps(), observer, |current, _| {
                step::advance(current, exposure, weights, thresholds, &mut draws)
            })?
        }
        RandomStream::PerCell => {
            let seed = params.seed();
            drive(initial, params.steps(), observer, |current, t| {
                let t = u64::try_from(t).unwrap_or(u64::MAX);
                step::advance_per_cell(current, exposure, weights, thresholds, seed, t)
            })?
        }
    };

    log_simulation_end(&outcome);
    Ok(outcome)
}

/// Run with caller-supplied draws, ignoring the seed and stream strategy in
/// `params`.
///
/// # Errors
///
/// Returns [`SimulationError::DimensionMismatch`] if the two grids differ in
/// size.
pub fn run_with_draws(
    initial: &RiskGrid,
    exposure: &ExposureGrid,
    params: &SimulationParams,
    draws: &mut dyn CellDraws,
    observer: &mut dyn StepObserver,
) -> Result<SimulationOutcome, SimulationError> {
    initial.ensure_same_size(exposure)?;
    let weights = params.weights();
    let thresholds = params.thresholds();
    drive(initial, params.steps(), observer, |current, _| {
        step::advance(current, exposure, weights, thresholds, &mut *draws)
    })
}

/// Log the distribution a run ended with.
pub fn log_simulation_end(outcome: &SimulationOutcome) {
    let counts = outcome.final_counts();
    info!(
        steps = outcome.history.len(),
        sii_0 = counts.none,
        sii_1 = counts.mild,
        sii_2 = counts.moderate,
        sii_3 = counts.severe,
        "Simulation ended"
    );
}

/// Record, then advance, `steps` times.
fn drive<F>(
    initial: &RiskGrid,
    steps: usize,
    observer: &mut dyn StepObserver,
    mut advance: F,
) -> Result<SimulationOutcome, SimulationError>
where
    F: FnMut(&RiskGrid, usize) -> Result<RiskGrid, SimulationError>,
{
    let mut current = initial.clone();
    let mut history = Vec::with_capacity(steps);

    for t in 0..steps {
        let record = HistoryRecord::from_counts(t, current.state_counts());
        debug!(
            step = t,
            sii_0 = record.sii_0,
            sii_1 = record.sii_1,
            sii_2 = record.sii_2,
            sii_3 = record.sii_3,
            "Step recorded"
        );
        observer.on_step(&record, &current);
        history.push(record);
        current = advance(&current, t)?;
    }

    Ok(SimulationOutcome {
        history,
        final_grid: current,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use riskgrid_types::{ExposureLevel, RiskState};

    use super::*;
    use crate::random::FixedDraws;
    use crate::risk::{RiskWeights, Thresholds};

    fn sample_grids() -> (RiskGrid, ExposureGrid) {
        let risk = RiskGrid::from_levels(&[
            vec![0, 1, 2, 3, 0],
            vec![1, 2, 3, 0, 1],
            vec![2, 3, 0, 1, 2],
            vec![3, 0, 1, 2, 3],
            vec![0, 1, 2, 3, 0],
        ])
        .unwrap();
        let exposure = ExposureGrid::from_labels(&[
            vec!["low", "medium", "high", "missing", "low"],
            vec!["high", "high", "low", "medium", "unknown"],
            vec!["medium", "low", "low", "high", "high"],
            vec!["missing", "medium", "high", "low", "medium"],
            vec!["low", "low", "medium", "high", "high"],
        ])
        .unwrap();
        (risk, exposure)
    }

    fn params(steps: i64) -> SimulationParams {
        SimulationParams::new(RiskWeights::default(), Thresholds::default(), 123, steps).unwrap()
    }

    #[test]
    fn history_has_one_entry_per_step() {
        let (risk, exposure) = sample_grids();
        let outcome = run(&risk, &exposure, &params(12)).unwrap();
        assert_eq!(outcome.history.len(), 12);
        for (t, record) in outcome.history.iter().enumerate() {
            assert_eq!(record.step, t);
            assert_eq!(record.total(), 25);
        }
    }

    #[test]
    fn first_entry_is_the_initial_distribution() {
        let (risk, exposure) = sample_grids();
        let outcome = run(&risk, &exposure, &params(3)).unwrap();
        let first = outcome.history.first().unwrap();
        assert_eq!(first.counts(), risk.state_counts());
    }

    #[test]
    fn zero_steps_returns_initial_grid() {
        let (risk, exposure) = sample_grids();
        let outcome = run(&risk, &exposure, &params(0)).unwrap();
        assert!(outcome.history.is_empty());
        assert_eq!(outcome.final_grid, risk);
    }

    #[test]
    fn dimension_mismatch_is_rejected_before_running() {
        let (risk, _) = sample_grids();
        let exposure = ExposureGrid::filled(4, ExposureLevel::Low).unwrap();
        struct Count(usize);
        impl StepObserver for Count {
            fn on_step(&mut self, _record: &HistoryRecord, _grid: &RiskGrid) {
                self.0 = self.0.saturating_add(1);
            }
        }
        let mut observer = Count(0);
        let result = run_with_observer(&risk, &exposure, &params(5), &mut observer);
        assert_eq!(observer.0, 0);
        assert!(matches!(
            result,
            Err(SimulationError::DimensionMismatch {
                risk: 5,
                exposure: 4
            })
        ));
    }

    #[test]
    fn observer_sees_every_step() {
        struct Collect {
            steps: Vec<usize>,
        }
        impl StepObserver for Collect {
            fn on_step(&mut self, record: &HistoryRecord, grid: &RiskGrid) {
                assert_eq!(record.counts(), grid.state_counts());
                self.steps.push(record.step);
            }
        }

        let (risk, exposure) = sample_grids();
        let mut observer = Collect { steps: Vec::new() };
        let outcome = run_with_observer(&risk, &exposure, &params(4), &mut observer).unwrap();
        assert_eq!(observer.steps, vec![0, 1, 2, 3]);
        assert_eq!(outcome.history.len(), 4);
    }

    #[test]
    fn final_grid_is_one_step_past_last_record() {
        // With the gate always open and no jitter, a saturated high-exposure
        // neighborhood climbs one level per step.
        let risk = RiskGrid::filled(3, RiskState::None).unwrap();
        let exposure = ExposureGrid::filled(3, ExposureLevel::High).unwrap();
        let params = SimulationParams::new(
            RiskWeights {
                w_self: 1.0,
                w_neigh: 0.0,
            },
            Thresholds { up: 0.2, down: 0.1 },
            1,
            2,
        )
        .unwrap();
        let mut draws = FixedDraws::always_trigger();
        let outcome =
            run_with_draws(&risk, &exposure, &params, &mut draws, &mut NoOpObserver).unwrap();

        let last = outcome.history.last().unwrap();
        assert_eq!(last.step, 1);
        assert_eq!(last.sii_1, 9);
        assert_eq!(outcome.final_counts().moderate, 9);
    }

    #[test]
    fn per_cell_stream_is_reproducible_and_distinct() {
        let (risk, exposure) = sample_grids();
        let per_cell = params(20).with_stream(RandomStream::PerCell);
        let a = run(&risk, &exposure, &per_cell).unwrap();
        let b = run(&risk, &exposure, &per_cell).unwrap();
        assert_eq!(a, b);
        for record in &a.history {
            assert_eq!(record.total(), 25);
        }

        let shared = run(&risk, &exposure, &params(20)).unwrap();
        assert_eq!(shared.history.len(), a.history.len());
        assert_ne!(a, shared);
    }
}
