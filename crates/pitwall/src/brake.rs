//! Brake signal interpretation.
//!
//! Some sessions report the brake channel as an on/off flag (0/1), others as
//! a 0-100 pressure percentage. The mode is detected from the data: if no
//! sample on either lap exceeds 1, the signal is treated as binary. This is
//! a heuristic, so callers can also force a mode.

use serde::{Deserialize, Serialize};

use crate::model::TelemetryPoint;

/// How the brake channel of a lap should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrakeMode {
    /// 0/1 flag; any positive value is braking.
    Binary,
    /// 0-100 pressure; values above a threshold are braking.
    #[default]
    Percentage,
}

impl BrakeMode {
    /// Detect the mode from one or more laps.
    ///
    /// Binary when every brake sample across all laps is at most 1.
    /// Laps without samples do not vote; with no samples at all the result
    /// is [`BrakeMode::Percentage`].
    #[must_use]
    pub fn detect(laps: &[&[TelemetryPoint]]) -> Self {
        let max = laps
            .iter()
            .flat_map(|lap| lap.iter())
            .map(|p| p.brake)
            .filter(|b| b.is_finite())
            .fold(None, |acc: Option<f64>, b| Some(acc.map_or(b, |m| m.max(b))));
        match max {
            Some(m) if m <= 1.0 => Self::Binary,
            _ => Self::Percentage,
        }
    }

    /// Whether `value` counts as braking in this mode.
    #[must_use]
    pub fn is_braking(self, value: f64, percentage_threshold: f64) -> bool {
        match self {
            Self::Binary => value > 0.0,
            Self::Percentage => value > percentage_threshold,
        }
    }

    /// Scale a sample for plotting on a 0-100 axis alongside throttle.
    #[must_use]
    pub fn chart_value(self, value: f64) -> f64 {
        match self {
            Self::Binary if value > 0.0 => 100.0,
            Self::Binary => 0.0,
            Self::Percentage => value,
        }
    }
}

/// A maximal run of braking samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrakeZone {
    /// Distance of the first braking sample.
    pub start_distance: f64,
    /// Distance of the first released sample, or of the lap's last sample
    /// when the lap ends under braking.
    pub end_distance: f64,
}

impl BrakeZone {
    /// Length of the zone in meters.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.end_distance - self.start_distance
    }
}

/// Extract brake zones from a lap using the given mode.
#[must_use]
pub fn brake_zones(points: &[TelemetryPoint], mode: BrakeMode, percentage_threshold: f64) -> Vec<BrakeZone> {
    let mut zones = Vec::new();
    let mut zone_start: Option<f64> = None;

    for point in points {
        let braking = mode.is_braking(point.brake, percentage_threshold);
        match (braking, zone_start) {
            (true, None) => zone_start = Some(point.distance),
            (false, Some(start)) => {
                zones.push(BrakeZone {
                    start_distance: start,
                    end_distance: point.distance,
                });
                zone_start = None;
            }
            _ => {}
        }
    }

    if let (Some(start), Some(last)) = (zone_start, points.last()) {
        zones.push(BrakeZone {
            start_distance: start,
            end_distance: last.distance,
        });
    }
    zones
}

/// Count maximal runs of samples with a positive brake value.
///
/// This is the two-state machine the insights use: it enters a zone on the
/// first positive sample and leaves it on the first zero.
#[must_use]
pub fn count_brake_zones(points: &[TelemetryPoint]) -> usize {
    let mut zones = 0;
    let mut in_zone = false;
    for point in points {
        let braking = point.brake > 0.0;
        if braking && !in_zone {
            zones += 1;
        }
        in_zone = braking;
    }
    zones
}

/// Total distance covered while braking: the sum of `distance[i] -
/// distance[i - 1]` over every sample `i > 0` with a positive brake value.
#[must_use]
pub fn braking_distance(points: &[TelemetryPoint]) -> f64 {
    points
        .windows(2)
        .filter(|w| w[1].brake > 0.0)
        .map(|w| w[1].distance - w[0].distance)
        .sum()
}
