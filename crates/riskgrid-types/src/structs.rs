//! Aggregate records produced by a simulation run.

use serde::{Deserialize, Serialize};

use crate::enums::RiskState;

/// Number of cells holding each risk state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateCounts {
    /// Cells at level 0.
    pub none: usize,
    /// Cells at level 1.
    pub mild: usize,
    /// Cells at level 2.
    pub moderate: usize,
    /// Cells at level 3.
    pub severe: usize,
}

impl StateCounts {
    /// Tally an iterator of states.
    pub fn tally<I>(states: I) -> Self
    where
        I: IntoIterator<Item = RiskState>,
    {
        let mut counts = Self::default();
        for state in states {
            counts.record(state);
        }
        counts
    }

    /// Count one more cell at `state`.
    pub const fn record(&mut self, state: RiskState) {
        let slot = self.slot_mut(state);
        *slot = slot.saturating_add(1);
    }

    /// Total number of cells counted.
    pub const fn total(&self) -> usize {
        self.none
            .saturating_add(self.mild)
            .saturating_add(self.moderate)
            .saturating_add(self.severe)
    }

    const fn slot_mut(&mut self, state: RiskState) -> &mut usize {
        match state {
            RiskState::None => &mut self.none,
            RiskState::Mild => &mut self.mild,
            RiskState::Moderate => &mut self.moderate,
            RiskState::Severe => &mut self.severe,
        }
    }
}

/// Distribution of risk states at the start of one step.
///
/// Entry `step` reflects the grid before that step's transition was applied.
/// Field names follow the exported column names of the source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Zero-based step index.
    pub step: usize,
    /// Cells at level 0.
    pub sii_0: usize,
    /// Cells at level 1.
    pub sii_1: usize,
    /// Cells at level 2.
    pub sii_2: usize,
    /// Cells at level 3.
    pub sii_3: usize,
}

impl HistoryRecord {
    /// Build a record for `step` from a tally.
    pub const fn from_counts(step: usize, counts: StateCounts) -> Self {
        Self {
            step,
            sii_0: counts.none,
            sii_1: counts.mild,
            sii_2: counts.moderate,
            sii_3: counts.severe,
        }
    }

    /// The counts carried by this record.
    pub const fn counts(&self) -> StateCounts {
        StateCounts {
            none: self.sii_0,
            mild: self.sii_1,
            moderate: self.sii_2,
            severe: self.sii_3,
        }
    }

    /// Sum of the four counts; equals the number of grid cells.
    pub const fn total(&self) -> usize {
        self.counts().total()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn tally_counts_each_state() {
        let counts = StateCounts::tally([
            RiskState::None,
            RiskState::Severe,
            RiskState::Severe,
            RiskState::Mild,
        ]);
        assert_eq!(counts.none, 1);
        assert_eq!(counts.mild, 1);
        assert_eq!(counts.moderate, 0);
        assert_eq!(counts.severe, 2);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn history_record_serializes_with_sii_columns() {
        let counts = StateCounts {
            none: 5,
            mild: 3,
            moderate: 0,
            severe: 1,
        };
        let record = HistoryRecord::from_counts(7, counts);
        assert_eq!(record.total(), 9);
        assert_eq!(record.counts(), counts);

        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json["step"], 7);
        assert_eq!(json["sii_0"], 5);
        assert_eq!(json["sii_3"], 1);
    }
}
