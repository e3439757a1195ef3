//! Grid state, risk model, stepper, and simulation driver for riskgrid.
//!
//! The automaton lives on an `N x N` torus. Every cell holds a risk state in
//! `0..=3` and a fixed exposure level; each step every cell recomputes a risk
//! score from itself and its eight wrapped neighbors and may move one level
//! up or down.
//!
//! # Modules
//!
//! - [`config`] -- Scenario configuration loaded from `riskgrid-config.yaml`
//!   into strongly-typed structs.
//! - [`error`] -- [`SimulationError`], returned before any grid is touched.
//! - [`grid`] -- Square row-major grid storage.
//! - [`neighborhood`] -- Moore-8 neighbors with periodic wrap.
//! - [`params`] -- Validated run parameters.
//! - [`population`] -- Participant records, exposure banding, and grid
//!   sampling.
//! - [`random`] -- The [`CellDraws`] trait and its seeded implementation.
//! - [`risk`] -- Per-cell score and transition policy.
//! - [`runner`] -- The multi-step driver and its history.
//! - [`step`] -- One synchronous grid update.
//!
//! [`CellDraws`]: random::CellDraws

pub mod config;
pub mod error;
pub mod grid;
pub mod neighborhood;
pub mod params;
pub mod population;
pub mod random;
pub mod risk;
pub mod runner;
pub mod step;

pub use error::SimulationError;
pub use grid::{ExposureGrid, Grid, RiskGrid};
pub use params::{RandomStream, SimulationParams};
pub use risk::{RiskWeights, Thresholds};
pub use runner::{NoOpObserver, SimulationOutcome, StepObserver, run, run_with_observer};
