//! Enumeration types for the riskgrid automaton.
//!
//! Both per-cell attributes are closed sets: the ordinal risk category a cell
//! currently holds, and the exposure level it was assigned at seeding time.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Risk State
// ---------------------------------------------------------------------------

/// Error returned when an integer level is outside `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("risk level {0} is outside 0..=3")]
pub struct InvalidRiskLevel(pub i64);

/// Ordinal risk category of a single cell.
///
/// Serialized as its integer level (`0` through `3`) so histories and grids
/// keep the compact numeric shape of the input data.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum RiskState {
    /// Level 0, the lowest risk category.
    #[default]
    None,
    /// Level 1.
    Mild,
    /// Level 2. Counts as high risk for neighbors.
    Moderate,
    /// Level 3, the ceiling.
    Severe,
}

impl RiskState {
    /// All states in ascending order.
    pub const ALL: [Self; 4] = [Self::None, Self::Mild, Self::Moderate, Self::Severe];

    /// Highest integer level a state can hold.
    pub const MAX_LEVEL: u8 = 3;

    /// Integer level of this state (`0..=3`).
    pub const fn level(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Mild => 1,
            Self::Moderate => 2,
            Self::Severe => 3,
        }
    }

    /// Level scaled into `[0, 1]` (`level / 3`).
    pub fn normalized(self) -> f64 {
        f64::from(self.level()) / f64::from(Self::MAX_LEVEL)
    }

    /// Whether this state counts toward a neighbor's high-risk fraction.
    pub const fn is_high(self) -> bool {
        matches!(self, Self::Moderate | Self::Severe)
    }

    /// The next state up, or `None` at the ceiling.
    pub const fn raised(self) -> Option<Self> {
        match self {
            Self::None => Some(Self::Mild),
            Self::Mild => Some(Self::Moderate),
            Self::Moderate => Some(Self::Severe),
            Self::Severe => None,
        }
    }

    /// The next state down, or `None` at the floor.
    pub const fn lowered(self) -> Option<Self> {
        match self {
            Self::None => None,
            Self::Mild => Some(Self::None),
            Self::Moderate => Some(Self::Mild),
            Self::Severe => Some(Self::Moderate),
        }
    }
}

impl TryFrom<u8> for RiskState {
    type Error = InvalidRiskLevel;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Self::None),
            1 => Ok(Self::Mild),
            2 => Ok(Self::Moderate),
            3 => Ok(Self::Severe),
            other => Err(InvalidRiskLevel(i64::from(other))),
        }
    }
}

impl TryFrom<i64> for RiskState {
    type Error = InvalidRiskLevel;

    fn try_from(level: i64) -> Result<Self, Self::Error> {
        u8::try_from(level)
            .ok()
            .and_then(|l| Self::try_from(l).ok())
            .ok_or(InvalidRiskLevel(level))
    }
}

impl From<RiskState> for u8 {
    fn from(state: RiskState) -> Self {
        state.level()
    }
}

impl fmt::Display for RiskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

// ---------------------------------------------------------------------------
// Exposure Level
// ---------------------------------------------------------------------------

/// Discretized exposure covariate attached to each cell.
///
/// Parsing is total: any label outside `low`/`medium`/`high` becomes
/// [`ExposureLevel::Unknown`]. The source data marks absent measurements as
/// `missing` and absent columns as `unknown`; both carry the same base risk,
/// so they share one variant.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub enum ExposureLevel {
    /// At or below the first quartile.
    Low,
    /// Between the first and third quartile.
    Medium,
    /// Above the third quartile.
    High,
    /// Missing measurement or unrecognized label.
    #[default]
    Unknown,
}

impl ExposureLevel {
    /// All levels, in table order.
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Unknown];

    /// Parse a label. Unrecognized labels map to [`ExposureLevel::Unknown`].
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.eq_ignore_ascii_case("low") {
            Self::Low
        } else if label.eq_ignore_ascii_case("medium") {
            Self::Medium
        } else if label.eq_ignore_ascii_case("high") {
            Self::High
        } else {
            Self::Unknown
        }
    }

    /// Canonical lowercase label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Unknown => "unknown",
        }
    }

    /// Base risk contribution of this exposure level.
    pub const fn base_risk(self) -> f64 {
        match self {
            Self::Low => 0.1,
            Self::Medium => 0.3,
            Self::High => 0.6,
            Self::Unknown => 0.2,
        }
    }
}

impl From<String> for ExposureLevel {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<&str> for ExposureLevel {
    fn from(label: &str) -> Self {
        Self::from_label(label)
    }
}

impl From<ExposureLevel> for String {
    fn from(level: ExposureLevel) -> Self {
        level.label().to_owned()
    }
}

impl fmt::Display for ExposureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
