//! Deterministic "what to look for" insights.
//!
//! Each generator turns one payload into at most
//! [`InsightConfig::max_insights`] short sentences, every one anchored to a
//! number taken from the payload. Generators never fail: when the arrays
//! they need are missing they return a single "not available" message, and
//! an insight whose inputs are absent is skipped.
//!
//! # Example
//!
//! ```
//! use pitwall::insights::{speed_insights, DATA_UNAVAILABLE};
//! use pitwall::model::TelemetryComparison;
//!
//! let empty = TelemetryComparison::default();
//! assert_eq!(speed_insights(&empty), vec![DATA_UNAVAILABLE.to_string()]);
//! ```

mod delta;
mod race_pace;
mod telemetry;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::InsightConfig;
use crate::model::{RacePaceResult, TelemetryComparison};

/// Returned by the telemetry generators when either lap has no samples.
pub const DATA_UNAVAILABLE: &str = "Data not available for analysis";

/// Returned by the delta generator when the delta trace is empty.
pub const DELTA_UNAVAILABLE: &str = "Delta data not available";

/// Returned by the race-pace generator when no driver is present.
pub const RACE_PACE_UNAVAILABLE: &str = "Race pace data not available";

/// The chart an insight list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// Speed trace.
    Speed,
    /// Throttle and brake trace.
    ThrottleBrake,
    /// Gear trace.
    Gear,
    /// Delta trace.
    Delta,
    /// Race pace chart.
    RacePace,
}

impl std::fmt::Display for InsightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Speed => write!(f, "speed"),
            Self::ThrottleBrake => write!(f, "throttle_brake"),
            Self::Gear => write!(f, "gear"),
            Self::Delta => write!(f, "delta"),
            Self::RacePace => write!(f, "race_pace"),
        }
    }
}

/// A chart driven by a single-lap telemetry comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryChart {
    /// Speed trace.
    Speed,
    /// Throttle and brake trace.
    ThrottleBrake,
    /// Gear trace.
    Gear,
    /// Delta trace.
    Delta,
}

impl From<TelemetryChart> for InsightKind {
    fn from(chart: TelemetryChart) -> Self {
        match chart {
            TelemetryChart::Speed => Self::Speed,
            TelemetryChart::ThrottleBrake => Self::ThrottleBrake,
            TelemetryChart::Gear => Self::Gear,
            TelemetryChart::Delta => Self::Delta,
        }
    }
}

/// Insights for every telemetry chart of one comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryReport {
    /// Speed insights.
    pub speed: Vec<String>,
    /// Throttle and brake insights.
    pub throttle_brake: Vec<String>,
    /// Gear insights.
    pub gear: Vec<String>,
    /// Delta insights.
    pub delta: Vec<String>,
}

/// Insight generators parameterised by a set of thresholds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsightEngine {
    config: InsightConfig,
}

impl InsightEngine {
    /// Create an engine with the given thresholds.
    #[must_use]
    pub fn new(config: InsightConfig) -> Self {
        Self { config }
    }

    /// The thresholds in use.
    #[must_use]
    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    /// Run the generator for one telemetry chart.
    #[must_use]
    pub fn telemetry(&self, chart: TelemetryChart, comparison: &TelemetryComparison) -> Vec<String> {
        match chart {
            TelemetryChart::Speed => self.speed(comparison),
            TelemetryChart::ThrottleBrake => self.throttle_brake(comparison),
            TelemetryChart::Gear => self.gear(comparison),
            TelemetryChart::Delta => self.delta(comparison),
        }
    }

    /// Run every telemetry generator on one comparison.
    #[must_use]
    pub fn telemetry_report(&self, comparison: &TelemetryComparison) -> TelemetryReport {
        TelemetryReport {
            speed: self.speed(comparison),
            throttle_brake: self.throttle_brake(comparison),
            gear: self.gear(comparison),
            delta: self.delta(comparison),
        }
    }

    fn finish(&self, kind: InsightKind, mut insights: Vec<String>) -> Vec<String> {
        insights.truncate(self.config.max_insights);
        trace!(%kind, count = insights.len(), "generated insights");
        insights
    }
}

/// Speed insights with default thresholds.
#[must_use]
pub fn speed_insights(comparison: &TelemetryComparison) -> Vec<String> {
    InsightEngine::default().speed(comparison)
}

/// Throttle and brake insights with default thresholds.
#[must_use]
pub fn throttle_brake_insights(comparison: &TelemetryComparison) -> Vec<String> {
    InsightEngine::default().throttle_brake(comparison)
}

/// Gear insights with default thresholds.
#[must_use]
pub fn gear_insights(comparison: &TelemetryComparison) -> Vec<String> {
    InsightEngine::default().gear(comparison)
}

/// Delta insights with default thresholds.
#[must_use]
pub fn delta_insights(comparison: &TelemetryComparison) -> Vec<String> {
    InsightEngine::default().delta(comparison)
}

/// Race pace insights with default thresholds.
#[must_use]
pub fn race_pace_insights(race_pace: &RacePaceResult) -> Vec<String> {
    InsightEngine::default().race_pace(race_pace)
}

/// Largest finite value and the index it first occurs at.
fn max_with_index(values: impl Iterator<Item = f64>) -> Option<(usize, f64)> {
    values
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .fold(None, |best, (i, v)| match best {
            Some((_, b)) if v <= b => best,
            _ => Some((i, v)),
        })
}

/// Smallest finite value and the index it first occurs at.
fn min_with_index(values: impl Iterator<Item = f64>) -> Option<(usize, f64)> {
    max_with_index(values.map(|v| -v)).map(|(i, v)| (i, -v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LapTelemetry, TelemetryPoint};

    fn comparison() -> TelemetryComparison {
        let lap = |driver: &str, speed: f64| LapTelemetry {
            driver: driver.to_string(),
            data: (0..10)
                .map(|i| TelemetryPoint {
                    distance: f64::from(i) * 100.0,
                    speed: speed + f64::from(i),
                    gear: 7,
                    throttle: 100.0,
                    ..TelemetryPoint::default()
                })
                .collect(),
            ..LapTelemetry::default()
        };
        TelemetryComparison {
            driver_a: lap("VER", 200.0),
            driver_b: lap("LEC", 190.0),
            ..TelemetryComparison::default()
        }
    }

    #[test]
    fn test_max_with_index_first_occurrence() {
        let values = [1.0, 3.0, 2.0, 3.0];
        assert_eq!(max_with_index(values.into_iter()), Some((1, 3.0)));
        assert_eq!(max_with_index(std::iter::empty()), None);
    }

    #[test]
    fn test_min_with_index_first_occurrence() {
        let values = [1.0, -3.0, 2.0, -3.0];
        assert_eq!(min_with_index(values.into_iter()), Some((1, -3.0)));
    }

    #[test]
    fn test_max_with_index_skips_nan() {
        let values = [f64::NAN, 2.0];
        assert_eq!(max_with_index(values.into_iter()), Some((1, 2.0)));
    }

    #[test]
    fn test_engine_respects_max_insights() {
        let engine = InsightEngine::new(InsightConfig {
            max_insights: 1,
            ..InsightConfig::default()
        });
        assert_eq!(engine.speed(&comparison()).len(), 1);
    }

    #[test]
    fn test_telemetry_report_runs_all_generators() {
        let report = InsightEngine::default().telemetry_report(&comparison());
        assert!(!report.speed.is_empty());
        assert!(!report.throttle_brake.is_empty());
        assert!(!report.gear.is_empty());
        assert_eq!(report.delta, vec![DELTA_UNAVAILABLE.to_string()]);
    }

    #[test]
    fn test_telemetry_by_chart() {
        let engine = InsightEngine::default();
        let cmp = comparison();
        assert_eq!(engine.telemetry(TelemetryChart::Gear, &cmp), engine.gear(&cmp));
        assert_eq!(engine.telemetry(TelemetryChart::Delta, &cmp), engine.delta(&cmp));
    }

    #[test]
    fn test_telemetry_chart_kind() {
        assert_eq!(InsightKind::from(TelemetryChart::Speed), InsightKind::Speed);
        assert_eq!(
            InsightKind::from(TelemetryChart::ThrottleBrake).to_string(),
            "throttle_brake"
        );
    }

    #[test]
    fn test_insight_kind_display() {
        assert_eq!(InsightKind::ThrottleBrake.to_string(), "throttle_brake");
        assert_eq!(InsightKind::RacePace.to_string(), "race_pace");
    }
}
