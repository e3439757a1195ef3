//! Square grid storage with row-major flat layout.
//!
//! A [`Grid`] is an `N x N` arena of `Copy` values. The automaton keeps two of
//! them side by side: a [`RiskGrid`] that evolves every step and an
//! [`ExposureGrid`] that is fixed for the whole run. Topology (wraparound) is
//! not a property of the storage; see [`crate::neighborhood`].
//!
//! Every constructor enforces `N >= 1` and a square shape, so a `Grid` value
//! is always well formed.

use riskgrid_types::{ExposureLevel, RiskState, StateCounts};

use crate::error::SimulationError;

/// A square, row-major grid of cell values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    /// Side length `N`.
    size: usize,
    /// `N * N` cells, row by row.
    cells: Vec<T>,
}

/// Grid of per-cell risk states.
pub type RiskGrid = Grid<RiskState>;

/// Grid of per-cell exposure levels.
pub type ExposureGrid = Grid<ExposureLevel>;

impl<T: Copy> Grid<T> {
    /// Create an `N x N` grid with every cell set to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidParameter`] if `size` is 0 or
    /// `size * size` overflows.
    pub fn filled(size: usize, value: T) -> Result<Self, SimulationError> {
        let count = cell_count(size)?;
        Ok(Self {
            size,
            cells: vec![value; count],
        })
    }

    /// Create a grid from `N * N` cells in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidParameter`] if `size` is 0 or the
    /// cell count does not equal `size * size`.
    pub fn from_cells(size: usize, cells: Vec<T>) -> Result<Self, SimulationError> {
        let expected = cell_count(size)?;
        if cells.len() != expected {
            return Err(SimulationError::invalid(format!(
                "expected {expected} cells for a {size}x{size} grid, got {}",
                cells.len()
            )));
        }
        Ok(Self { size, cells })
    }

    /// Create a grid from a list of rows.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidParameter`] if there are no rows or
    /// any row length differs from the number of rows.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, SimulationError> {
        let size = rows.len();
        let expected = cell_count(size)?;
        let mut cells = Vec::with_capacity(expected);
        for (row_index, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(SimulationError::invalid(format!(
                    "grid must be square: row {row_index} has {} cells, expected {size}",
                    row.len()
                )));
            }
            cells.extend(row);
        }
        Ok(Self { size, cells })
    }

    /// Side length `N`.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Total number of cells (`N * N`).
    pub const fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Flat index of `(row, col)`, or `None` when out of bounds.
    pub fn index_of(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.size || col >= self.size {
            return None;
        }
        row.checked_mul(self.size)?.checked_add(col)
    }

    /// `(row, col)` of a flat index, or `None` when out of bounds.
    pub fn coords_of(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.cells.len() {
            return None;
        }
        Some((index.checked_div(self.size)?, index.checked_rem(self.size)?))
    }

    /// Value at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        self.index_of(row, col)
            .and_then(|index| self.cells.get(index))
            .copied()
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// Iterate rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks_exact(self.size)
    }

    /// Check that `other` has the same side length.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::DimensionMismatch`] when the sizes differ.
    pub const fn ensure_same_size<U>(&self, other: &Grid<U>) -> Result<(), SimulationError> {
        if self.size == other.size {
            Ok(())
        } else {
            Err(SimulationError::DimensionMismatch {
                risk: self.size,
                exposure: other.size,
            })
        }
    }
}

impl RiskGrid {
    /// Build a risk grid from integer levels, rejecting anything outside `0..=3`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidParameter`] for an out-of-range level
    /// or a malformed shape.
    pub fn from_levels(rows: &[Vec<i64>]) -> Result<Self, SimulationError> {
        let mut parsed = Vec::with_capacity(rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let mut out = Vec::with_capacity(row.len());
            for (col_index, &level) in row.iter().enumerate() {
                let state = RiskState::try_from(level).map_err(|e| {
                    SimulationError::invalid(format!("cell ({row_index}, {col_index}): {e}"))
                })?;
                out.push(state);
            }
            parsed.push(out);
        }
        Self::from_rows(parsed)
    }

    /// Integer levels as nested rows.
    pub fn to_levels(&self) -> Vec<Vec<u8>> {
        self.rows()
            .map(|row| row.iter().map(|s| s.level()).collect())
            .collect()
    }

    /// Number of cells at each state.
    pub fn state_counts(&self) -> StateCounts {
        StateCounts::tally(self.cells.iter().copied())
    }
}

impl ExposureGrid {
    /// Build an exposure grid from labels. Unrecognized labels become
    /// [`ExposureLevel::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidParameter`] for a malformed shape.
    pub fn from_labels<S: AsRef<str>>(rows: &[Vec<S>]) -> Result<Self, SimulationError> {
        Self::from_rows(
            rows.iter()
                .map(|row| {
                    row.iter()
                        .map(|label| ExposureLevel::from_label(label.as_ref()))
                        .collect()
                })
                .collect(),
        )
    }
}

/// `size * size`, rejecting a zero side and overflow.
fn cell_count(size: usize) -> Result<usize, SimulationError> {
    if size == 0 {
        return Err(SimulationError::invalid("grid size must be at least 1"));
    }
    size.checked_mul(size)
        .ok_or_else(|| SimulationError::invalid(format!("grid size {size} is too large")))
}
