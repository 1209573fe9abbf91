//! Typed payloads exchanged with the telemetry backend.
//!
//! Every payload struct is `#[serde(default)]`: a missing field deserializes
//! to its empty value, so a partial or `{}` response still produces a value
//! the generators can work with.

mod catalog;
mod race;
mod telemetry;

pub use catalog::{
    CompareRequest, Driver, Event, HealthStatus, Season, Session, TrackEvolution,
    TrackEvolutionPoint,
};
pub use race::{
    Compound, DriverRacePace, LapRecord, PitStop, PositionData, PositionPoint, RacePaceResult,
    StintSummary, StrategyData, TireStint,
};
pub use telemetry::{
    DeltaPoint, LapTelemetry, SectorTimes, TelemetryChannel, TelemetryComparison, TelemetryPoint,
};

use serde::{Deserialize, Serialize};

/// A chronological event in the race narrative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryEvent {
    /// Badge label: `Start`, `Lap 23`, `Finish`.
    pub lap: String,
    /// Headline.
    pub title: String,
    /// One-sentence description.
    pub content: String,
    /// Whether the event concerns the primary driver or the race result.
    pub highlight: bool,
}
