//! Participant records and the sampled initial grids.
//!
//! A scenario starts from a cohort of survey participants. Each participant
//! contributes a risk label and an exposure level:
//!
//! - **Risk label**: when any participant has a recorded `sii`, labels come
//!   from `sii` alone and rows without one (or with one outside `0..=3`) are
//!   dropped. Only a cohort with no `sii` at all is labelled from the PCIAT
//!   total score.
//! - **Exposure level**: daily internet hours, banded by the cohort's own
//!   first and third quartiles. A missing value is [`ExposureLevel::Unknown`].
//!
//! [`Cohort::sample_grids`] then draws `N * N` participants with replacement
//! and lays them out row-major into the two aligned grids.

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use riskgrid_types::{ExposureLevel, RiskState, StateCounts};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::SimulationError;
use crate::grid::{ExposureGrid, RiskGrid};

/// Errors that can occur when loading or sampling a population.
#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    /// Failed to read the population file from disk.
    #[error("failed to read population file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The population file is not a JSON array of participants.
    #[error("failed to parse population JSON: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// No participant had a usable risk label.
    #[error("population has no participant with a usable risk label")]
    EmptyCohort,

    /// The requested grid could not be built.
    #[error("failed to build grid from population: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: SimulationError,
    },
}

/// One raw participant record.
///
/// Field names follow the survey export; the short names are accepted too.
/// Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Recorded severity impairment index, if any.
    #[serde(default)]
    pub sii: Option<f64>,

    /// PCIAT questionnaire total score, if any.
    #[serde(default, alias = "PCIAT-PCIAT_Total")]
    pub pciat_total: Option<f64>,

    /// Self-reported daily computer/internet hours, if any.
    #[serde(default, alias = "PreInt_EduHx-computerinternet_hoursday")]
    pub internet_hours_per_day: Option<f64>,
}

impl Participant {
    /// Risk label of this participant read from `source`, or `None` if the
    /// row must be dropped.
    pub fn risk_state(&self, source: LabelSource) -> Option<RiskState> {
        match source {
            LabelSource::Sii => self.sii.and_then(risk_state_from_sii),
            LabelSource::Pciat => self.pciat_total.and_then(risk_state_from_pciat),
        }
    }

    fn hours(&self) -> Option<f64> {
        self.internet_hours_per_day.filter(|h| h.is_finite())
    }
}

/// Field the whole cohort takes its risk labels from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    /// The recorded `sii`. Rows without one are dropped.
    Sii,
    /// The PCIAT total score, banded.
    Pciat,
}

impl LabelSource {
    /// [`LabelSource::Sii`] if any participant has a recorded `sii`,
    /// [`LabelSource::Pciat`] otherwise.
    pub fn detect(participants: &[Participant]) -> Self {
        if participants.iter().any(|p| p.sii.is_some()) {
            Self::Sii
        } else {
            Self::Pciat
        }
    }
}

/// Map a recorded `sii` to a state. Only the whole numbers 0 to 3 qualify.
pub fn risk_state_from_sii(sii: f64) -> Option<RiskState> {
    RiskState::ALL
        .into_iter()
        .find(|state| (f64::from(state.level()) - sii).abs() < f64::EPSILON)
}

/// Map a PCIAT total score to a state: `<= 30` none, `<= 49` mild, `<= 79`
/// moderate, above that severe. Non-finite scores have no label.
pub const fn risk_state_from_pciat(total: f64) -> Option<RiskState> {
    if !total.is_finite() {
        return None;
    }
    let state = if total <= 30.0 {
        RiskState::None
    } else if total <= 49.0 {
        RiskState::Mild
    } else if total <= 79.0 {
        RiskState::Moderate
    } else {
        RiskState::Severe
    };
    Some(state)
}

/// Quartile cut points used to band internet hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExposureBands {
    /// First quartile; values at or below are [`ExposureLevel::Low`].
    pub q1: f64,
    /// Third quartile; values at or below (and above `q1`) are
    /// [`ExposureLevel::Medium`], the rest [`ExposureLevel::High`].
    pub q3: f64,
}

impl ExposureBands {
    /// Quartiles of `hours`, or `None` when there are no finite values.
    pub fn from_hours(hours: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = hours.iter().copied().filter(|h| h.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            q1: quantile(&sorted, 1, 4)?,
            q3: quantile(&sorted, 3, 4)?,
        })
    }

    /// Band a single value.
    pub const fn classify(&self, hours: Option<f64>) -> ExposureLevel {
        match hours {
            Some(h) if h <= self.q1 => ExposureLevel::Low,
            Some(h) if h <= self.q3 => ExposureLevel::Medium,
            Some(_) => ExposureLevel::High,
            None => ExposureLevel::Unknown,
        }
    }
}

/// Quantile `num / den` of a sorted, non-empty slice, interpolating linearly
/// between the two closest order statistics.
fn quantile(sorted: &[f64], num: usize, den: usize) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let scaled = last.checked_mul(num)?;
    let lo = scaled.checked_div(den)?;
    let rem = scaled.checked_rem(den)?;
    let lower = *sorted.get(lo)?;
    if rem == 0 {
        return Some(lower);
    }
    let upper = *sorted.get(lo.checked_add(1)?)?;
    let frac = f64::from(u32::try_from(rem).ok()?) / f64::from(u32::try_from(den).ok()?);
    Some((upper - lower).mul_add(frac, lower))
}

/// A participant reduced to what the automaton needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CohortMember {
    /// Initial risk state.
    pub state: RiskState,
    /// Exposure level.
    pub exposure: ExposureLevel,
}

/// Classified participants ready to be sampled onto a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Cohort {
    members: Vec<CohortMember>,
    bands: Option<ExposureBands>,
}

impl Cohort {
    /// Classify `participants`, dropping rows without a usable risk label.
    ///
    /// The label source is chosen once for the whole cohort with
    /// [`LabelSource::detect`]. Exposure quartiles are computed over the kept
    /// rows only.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::EmptyCohort`] if no row survives.
    pub fn from_participants(participants: &[Participant]) -> Result<Self, PopulationError> {
        let source = LabelSource::detect(participants);
        let kept: Vec<(RiskState, Option<f64>)> = participants
            .iter()
            .filter_map(|p| p.risk_state(source).map(|state| (state, p.hours())))
            .collect();

        let dropped = participants.len().saturating_sub(kept.len());
        if dropped > 0 {
            warn!(
                dropped,
                total = participants.len(),
                source = ?source,
                "Dropped participants without a usable risk label"
            );
        }
        if kept.is_empty() {
            return Err(PopulationError::EmptyCohort);
        }

        let hours: Vec<f64> = kept.iter().filter_map(|(_, h)| *h).collect();
        let bands = ExposureBands::from_hours(&hours);
        if bands.is_none() {
            warn!("No participant reports internet hours; every exposure is unknown");
        }

        let members = kept
            .into_iter()
            .map(|(state, hours)| CohortMember {
                state,
                exposure: bands.map_or(ExposureLevel::Unknown, |b| b.classify(hours)),
            })
            .collect();

        Ok(Self { members, bands })
    }

    /// Read a JSON array of participants from `path` and classify it.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::Io`] or [`PopulationError::Json`] when the
    /// file cannot be loaded, and [`PopulationError::EmptyCohort`] when no
    /// row survives classification.
    pub fn load(path: &Path) -> Result<Self, PopulationError> {
        let participants = load_participants(path)?;
        let cohort = Self::from_participants(&participants)?;
        info!(
            path = %path.display(),
            participants = participants.len(),
            kept = cohort.len(),
            "Population loaded"
        );
        Ok(cohort)
    }

    /// Number of classified participants.
    pub const fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the cohort is empty. Always `false` for a constructed cohort.
    pub const fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Classified participants, in input order.
    pub fn members(&self) -> &[CohortMember] {
        &self.members
    }

    /// Quartile bands, or `None` when nobody reported internet hours.
    pub const fn bands(&self) -> Option<ExposureBands> {
        self.bands
    }

    /// Distribution of risk labels across the cohort.
    pub fn state_counts(&self) -> StateCounts {
        StateCounts::tally(self.members.iter().map(|m| m.state))
    }

    /// Number of members at `level`.
    pub fn exposure_count(&self, level: ExposureLevel) -> usize {
        self.members.iter().filter(|m| m.exposure == level).count()
    }

    /// Draw `size * size` members with replacement and lay them out
    /// row-major into aligned risk and exposure grids.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::Grid`] if `size` is 0 or too large.
    pub fn sample_grids(
        &self,
        size: usize,
        seed: u64,
    ) -> Result<(RiskGrid, ExposureGrid), PopulationError> {
        let count = size
            .checked_mul(size)
            .ok_or_else(|| SimulationError::invalid(format!("grid size {size} is too large")))?;
        if self.members.is_empty() {
            return Err(PopulationError::EmptyCohort);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut states = Vec::with_capacity(count);
        let mut exposures = Vec::with_capacity(count);
        for _ in 0..count {
            let pick = rng.random_range(0..self.members.len());
            let member = self.members.get(pick).copied().unwrap_or(CohortMember {
                state: RiskState::None,
                exposure: ExposureLevel::Unknown,
            });
            states.push(member.state);
            exposures.push(member.exposure);
        }

        let risk = RiskGrid::from_cells(size, states)?;
        let exposure = ExposureGrid::from_cells(size, exposures)?;
        Ok((risk, exposure))
    }
}

/// Read a JSON array of participant records.
///
/// # Errors
///
/// Returns [`PopulationError::Io`] if the file cannot be read, or
/// [`PopulationError::Json`] if it is not a JSON array of records.
pub fn load_participants(path: &Path) -> Result<Vec<Participant>, PopulationError> {
    let contents = std::fs::read_to_string(path)?;
    let participants: Vec<Participant> = serde_json::from_str(&contents)?;
    Ok(participants)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn participant(sii: Option<f64>, pciat: Option<f64>, hours: Option<f64>) -> Participant {
        Participant {
            sii,
            pciat_total: pciat,
            internet_hours_per_day: hours,
        }
    }

    #[test]
    fn pciat_bands() {
        assert_eq!(risk_state_from_pciat(0.0), Some(RiskState::None));
        assert_eq!(risk_state_from_pciat(30.0), Some(RiskState::None));
        assert_eq!(risk_state_from_pciat(31.0), Some(RiskState::Mild));
        assert_eq!(risk_state_from_pciat(49.0), Some(RiskState::Mild));
        assert_eq!(risk_state_from_pciat(50.0), Some(RiskState::Moderate));
        assert_eq!(risk_state_from_pciat(79.0), Some(RiskState::Moderate));
        assert_eq!(risk_state_from_pciat(80.0), Some(RiskState::Severe));
        assert_eq!(risk_state_from_pciat(f64::NAN), None);
    }

    #[test]
    fn label_source_reads_one_field_only() {
        let p = participant(Some(3.0), Some(0.0), None);
        assert_eq!(p.risk_state(LabelSource::Sii), Some(RiskState::Severe));
        assert_eq!(p.risk_state(LabelSource::Pciat), Some(RiskState::None));

        let p = participant(None, Some(55.0), None);
        assert_eq!(p.risk_state(LabelSource::Sii), None);
        assert_eq!(p.risk_state(LabelSource::Pciat), Some(RiskState::Moderate));
    }

    #[test]
    fn label_source_is_sii_when_any_row_has_one() {
        let mixed = [
            participant(None, Some(40.0), None),
            participant(Some(1.0), None, None),
        ];
        assert_eq!(LabelSource::detect(&mixed), LabelSource::Sii);

        let pciat_only = [participant(None, Some(40.0), None)];
        assert_eq!(LabelSource::detect(&pciat_only), LabelSource::Pciat);
    }

    #[test]
    fn out_of_range_sii_drops_the_row() {
        let sii = LabelSource::Sii;
        assert_eq!(participant(Some(4.0), None, None).risk_state(sii), None);
        assert_eq!(participant(Some(1.5), None, None).risk_state(sii), None);
        assert_eq!(participant(Some(-1.0), None, None).risk_state(sii), None);
        assert_eq!(participant(None, None, Some(2.0)).risk_state(sii), None);
    }

    #[test]
    fn missing_sii_is_dropped_even_with_a_pciat_score() {
        let participants = vec![
            participant(Some(1.0), None, Some(1.0)),
            participant(None, Some(90.0), Some(9.0)),
        ];
        let cohort = Cohort::from_participants(&participants).unwrap();
        assert_eq!(cohort.len(), 1);
        assert_eq!(cohort.state_counts().mild, 1);
        assert_eq!(cohort.state_counts().severe, 0);
        assert_eq!(cohort.bands(), Some(ExposureBands { q1: 1.0, q3: 1.0 }));
    }

    #[test]
    fn cohort_without_sii_is_labelled_from_pciat() {
        let participants = vec![
            participant(None, Some(10.0), Some(1.0)),
            participant(None, Some(90.0), Some(2.0)),
            participant(None, None, Some(3.0)),
        ];
        let cohort = Cohort::from_participants(&participants).unwrap();
        assert_eq!(cohort.len(), 2);
        assert_eq!(cohort.state_counts().none, 1);
        assert_eq!(cohort.state_counts().severe, 1);
    }

    #[test]
    fn quartiles_interpolate_linearly() {
        let bands = ExposureBands::from_hours(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert!((bands.q1 - 1.75).abs() < 1e-12);
        assert!((bands.q3 - 3.25).abs() < 1e-12);

        let bands = ExposureBands::from_hours(&[0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(bands.q1, 1.0);
        assert_eq!(bands.q3, 3.0);

        let single = ExposureBands::from_hours(&[2.0]).unwrap();
        assert_eq!(single.q1, 2.0);
        assert_eq!(single.q3, 2.0);

        assert!(ExposureBands::from_hours(&[]).is_none());
        assert!(ExposureBands::from_hours(&[f64::NAN]).is_none());
    }

    #[test]
    fn classification_uses_inclusive_upper_bounds() {
        let bands = ExposureBands { q1: 1.0, q3: 3.0 };
        assert_eq!(bands.classify(Some(0.5)), ExposureLevel::Low);
        assert_eq!(bands.classify(Some(1.0)), ExposureLevel::Low);
        assert_eq!(bands.classify(Some(2.0)), ExposureLevel::Medium);
        assert_eq!(bands.classify(Some(3.0)), ExposureLevel::Medium);
        assert_eq!(bands.classify(Some(3.5)), ExposureLevel::High);
        assert_eq!(bands.classify(None), ExposureLevel::Unknown);
    }

    #[test]
    fn cohort_drops_unlabelled_rows_and_bands_kept_rows() {
        let participants = vec![
            participant(Some(0.0), None, Some(0.0)),
            participant(Some(1.0), None, Some(1.0)),
            participant(Some(2.0), Some(10.0), Some(2.0)),
            participant(Some(3.0), None, Some(3.0)),
            participant(Some(2.0), None, Some(4.0)),
            participant(Some(2.0), None, None),
            // Dropped: its hours must not shift the quartiles.
            participant(None, Some(60.0), Some(100.0)),
        ];
        let cohort = Cohort::from_participants(&participants).unwrap();
        assert_eq!(cohort.len(), 6);
        assert_eq!(cohort.bands(), Some(ExposureBands { q1: 1.0, q3: 3.0 }));

        let counts = cohort.state_counts();
        assert_eq!(counts.none, 1);
        assert_eq!(counts.mild, 1);
        assert_eq!(counts.moderate, 3);
        assert_eq!(counts.severe, 1);

        assert_eq!(cohort.exposure_count(ExposureLevel::Low), 2);
        assert_eq!(cohort.exposure_count(ExposureLevel::Medium), 2);
        assert_eq!(cohort.exposure_count(ExposureLevel::High), 1);
        assert_eq!(cohort.exposure_count(ExposureLevel::Unknown), 1);
    }

    #[test]
    fn no_hours_means_all_unknown() {
        let participants = vec![
            participant(Some(0.0), None, None),
            participant(Some(2.0), None, None),
        ];
        let cohort = Cohort::from_participants(&participants).unwrap();
        assert!(cohort.bands().is_none());
        assert_eq!(cohort.exposure_count(ExposureLevel::Unknown), 2);
    }

    #[test]
    fn empty_cohort_is_an_error() {
        let participants = vec![participant(None, None, Some(1.0))];
        assert!(matches!(
            Cohort::from_participants(&participants),
            Err(PopulationError::EmptyCohort)
        ));
        assert!(matches!(
            Cohort::from_participants(&[]),
            Err(PopulationError::EmptyCohort)
        ));
    }

    #[test]
    fn json_accepts_export_column_names() {
        let json = r#"[
            {"id": "a", "sii": 2, "PreInt_EduHx-computerinternet_hoursday": 3},
            {"id": "b", "sii": null, "PCIAT-PCIAT_Total": 25.0},
            {"id": "c", "pciat_total": 90, "internet_hours_per_day": 1.5}
        ]"#;
        let participants: Vec<Participant> = serde_json::from_str(json).unwrap();
        assert_eq!(participants.len(), 3);
        assert_eq!(participants[0].sii, Some(2.0));
        assert_eq!(participants[0].internet_hours_per_day, Some(3.0));
        assert_eq!(participants[1].sii, None);
        assert_eq!(participants[1].pciat_total, Some(25.0));
        assert_eq!(participants[2].pciat_total, Some(90.0));
        assert_eq!(participants[2].internet_hours_per_day, Some(1.5));
    }

    #[test]
    fn sampling_fills_aligned_grids_reproducibly() {
        let participants: Vec<Participant> = (0..20_u32)
            .map(|i| participant(Some(f64::from(i % 4)), None, Some(f64::from(i))))
            .collect();
        let cohort = Cohort::from_participants(&participants).unwrap();

        let (risk_a, exposure_a) = cohort.sample_grids(6, 42).unwrap();
        let (risk_b, exposure_b) = cohort.sample_grids(6, 42).unwrap();
        assert_eq!(risk_a, risk_b);
        assert_eq!(exposure_a, exposure_b);
        assert_eq!(risk_a.size(), 6);
        assert_eq!(exposure_a.cell_count(), 36);
        assert_eq!(risk_a.state_counts().total(), 36);

        // Every sampled cell pairs a state and exposure from the same member.
        for (state, exposure) in risk_a.cells().iter().zip(exposure_a.cells()) {
            assert!(
                cohort
                    .members()
                    .iter()
                    .any(|m| m.state == *state && m.exposure == *exposure)
            );
        }
    }

    #[test]
    fn zero_size_grid_is_rejected() {
        let cohort = Cohort::from_participants(&[participant(Some(1.0), None, None)]).unwrap();
        assert!(matches!(cohort.sample_grids(0, 1), Err(PopulationError::Grid { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_participants(Path::new("/nonexistent/population.json"));
        assert!(matches!(result, Err(PopulationError::Io { .. })));
    }
}
