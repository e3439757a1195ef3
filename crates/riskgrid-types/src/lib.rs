//! Shared type definitions for the riskgrid cellular automaton.
//!
//! This crate holds the value types that flow between the engine core and the
//! scenario binary: per-cell categories and the per-step distribution record.
//!
//! # Modules
//!
//! - [`enums`] -- [`RiskState`] (ordinal 0-3) and [`ExposureLevel`] with its
//!   static base-risk table
//! - [`structs`] -- [`StateCounts`] and [`HistoryRecord`]

pub mod enums;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ExposureLevel, InvalidRiskLevel, RiskState};
pub use structs::{HistoryRecord, StateCounts};
