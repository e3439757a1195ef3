//! Random draws consumed by the stepper.
//!
//! Each cell takes exactly two draws per step, in this order:
//!
//! 1. a Gaussian jitter with standard deviation [`JITTER_STD_DEV`], added to
//!    the risk score;
//! 2. a uniform value in `[0, 1)`, used by the transition gate.
//!
//! The stepper only sees the [`CellDraws`] trait, so the generator is always
//! injected explicitly. [`SeededDraws`] is the production implementation;
//! [`FixedDraws`] replays constant values.
//!
//! # Determinism
//!
//! A shared [`SeededDraws`] consumed in row-major order reproduces a run
//! exactly for a given seed. For parallel stepping every cell instead gets a
//! private generator seeded by [`cell_seed`], which mixes the run seed, the
//! step index and the cell index. The result depends only on those three
//! numbers, never on which thread evaluates the cell.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::risk::JITTER_STD_DEV;

/// Source of the two per-cell random draws.
pub trait CellDraws {
    /// Gaussian jitter with mean 0 for the risk score.
    fn jitter(&mut self) -> f64;

    /// Uniform draw in `[0, 1)` for the transition gate.
    fn uniform(&mut self) -> f64;
}

/// Draws backed by a seeded pseudo-random generator.
#[derive(Debug, Clone)]
pub struct SeededDraws<R = StdRng> {
    rng: R,
}

impl SeededDraws<StdRng> {
    /// Seed a fresh generator.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Private generator for one cell at one step.
    pub fn for_cell(run_seed: u64, step: u64, cell: u64) -> Self {
        Self::from_seed(cell_seed(run_seed, step, cell))
    }
}

impl<R: Rng> SeededDraws<R> {
    /// Wrap an existing generator.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> CellDraws for SeededDraws<R> {
    fn jitter(&mut self) -> f64 {
        let z: f64 = self.rng.sample(StandardNormal);
        z * JITTER_STD_DEV
    }

    fn uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Constant draws.
///
/// Useful for noise-free runs (`jitter = 0`) and for pinning the transition
/// gate open (`uniform = 0.0`) or shut (`uniform >= 0.5`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDraws {
    /// Returned by every [`CellDraws::jitter`] call.
    pub jitter: f64,
    /// Returned by every [`CellDraws::uniform`] call.
    pub uniform: f64,
}

impl FixedDraws {
    /// No jitter, gate always open.
    pub const fn always_trigger() -> Self {
        Self {
            jitter: 0.0,
            uniform: 0.0,
        }
    }

    /// No jitter, gate always shut.
    pub const fn never_trigger() -> Self {
        Self {
            jitter: 0.0,
            uniform: 0.9,
        }
    }
}

impl CellDraws for FixedDraws {
    fn jitter(&mut self) -> f64 {
        self.jitter
    }

    fn uniform(&mut self) -> f64 {
        self.uniform
    }
}

/// Seed for the private generator of `cell` at `step` within run `run_seed`.
///
/// The inputs are combined with two odd multipliers and passed through the
/// `splitmix64` finalizer so that neighboring cells and consecutive steps get
/// unrelated streams.
pub const fn cell_seed(run_seed: u64, step: u64, cell: u64) -> u64 {
    let mut z = run_seed
        .wrapping_add(step.wrapping_mul(0x517c_c1b7_2722_0a95))
        .wrapping_add(cell.wrapping_mul(0x9e37_79b9_7f4a_7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
