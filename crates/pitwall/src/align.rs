//! Distance alignment of two laps.
//!
//! The backend samples each driver independently, so index `i` of driver A
//! and index `i` of driver B are generally not at the same track position.
//! Anything that pairs the two laps sample by sample must first resample
//! both onto a shared distance grid. Speed, throttle and RPM are linearly
//! interpolated; brake, gear and DRS are held from the preceding sample,
//! since interpolating a flag or a gear produces values the car never had.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::brake::{brake_zones, BrakeMode, BrakeZone};
use crate::model::{LapTelemetry, TelemetryComparison, TelemetryPoint};

/// One row of a two-driver chart, both drivers at the same distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRow {
    /// Shared distance in meters.
    pub distance: f64,
    /// Driver A speed.
    pub speed_a: f64,
    /// Driver B speed.
    pub speed_b: f64,
    /// Driver A throttle.
    pub throttle_a: f64,
    /// Driver B throttle.
    pub throttle_b: f64,
    /// Driver A brake, scaled to 0-100.
    pub brake_a: f64,
    /// Driver B brake, scaled to 0-100.
    pub brake_b: f64,
    /// Driver A gear.
    pub gear_a: u8,
    /// Driver B gear.
    pub gear_b: u8,
}

/// Resample two laps onto a shared grid of `points` distances spanning the
/// range both laps cover. `points == 0` uses the longer lap's sample count.
///
/// Returns `None` when either lap is empty or the laps do not overlap.
#[must_use]
pub fn resample(
    a: &[TelemetryPoint],
    b: &[TelemetryPoint],
    points: usize,
) -> Option<(Vec<TelemetryPoint>, Vec<TelemetryPoint>)> {
    let a = sorted_by_distance(a);
    let b = sorted_by_distance(b);
    let (a_first, a_last) = (a.first()?, a.last()?);
    let (b_first, b_last) = (b.first()?, b.last()?);

    let start = a_first.distance.max(b_first.distance);
    let end = a_last.distance.min(b_last.distance);
    if !(start.is_finite() && end.is_finite()) || end < start {
        debug!(start, end, "laps do not overlap, skipping alignment");
        return None;
    }

    let points = if points == 0 { a.len().max(b.len()) } else { points };
    let grid = distance_grid(start, end, points);
    Some((interpolate(&a, &grid), interpolate(&b, &grid)))
}

/// Resample both laps of a comparison onto a shared grid. The delta trace is
/// already distance-based and is carried over unchanged.
#[must_use]
pub fn align_comparison(comparison: &TelemetryComparison, points: usize) -> Option<TelemetryComparison> {
    let (a, b) = resample(&comparison.driver_a.data, &comparison.driver_b.data, points)?;
    Some(TelemetryComparison {
        driver_a: LapTelemetry {
            data: a,
            ..comparison.driver_a.clone()
        },
        driver_b: LapTelemetry {
            data: b,
            ..comparison.driver_b.clone()
        },
        delta: comparison.delta.clone(),
        sectors_a: comparison.sectors_a,
        sectors_b: comparison.sectors_b,
    })
}

/// Build chart rows from a comparison, aligning the laps first.
///
/// The brake mode is detected from the raw laps so a binary signal is shown
/// as 0/100.
#[must_use]
pub fn merged_rows(comparison: &TelemetryComparison, points: usize) -> Vec<ChartRow> {
    let mode = BrakeMode::detect(&[
        comparison.driver_a.data.as_slice(),
        comparison.driver_b.data.as_slice(),
    ]);
    let Some((a, b)) = resample(&comparison.driver_a.data, &comparison.driver_b.data, points) else {
        return Vec::new();
    };

    a.iter()
        .zip(&b)
        .map(|(pa, pb)| ChartRow {
            distance: pa.distance,
            speed_a: pa.speed,
            speed_b: pb.speed,
            throttle_a: pa.throttle,
            throttle_b: pb.throttle,
            brake_a: mode.chart_value(pa.brake),
            brake_b: mode.chart_value(pb.brake),
            gear_a: pa.gear,
            gear_b: pb.gear,
        })
        .collect()
}

/// Chart-ready view of two laps: aligned rows plus each driver's brake zones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    /// How the brake channel was read.
    pub brake_mode: BrakeMode,
    /// Distance-aligned rows.
    pub rows: Vec<ChartRow>,
    /// Driver A brake zones on the raw lap.
    pub brake_zones_a: Vec<BrakeZone>,
    /// Driver B brake zones on the raw lap.
    pub brake_zones_b: Vec<BrakeZone>,
}

/// Build [`ChartData`] for a comparison. Zones are extracted from the raw
/// samples with `brake_threshold` applying to percentage signals.
#[must_use]
pub fn chart_data(comparison: &TelemetryComparison, points: usize, brake_threshold: f64) -> ChartData {
    let (a, b) = (&comparison.driver_a.data, &comparison.driver_b.data);
    let brake_mode = BrakeMode::detect(&[a.as_slice(), b.as_slice()]);
    ChartData {
        brake_mode,
        rows: merged_rows(comparison, points),
        brake_zones_a: brake_zones(a, brake_mode, brake_threshold),
        brake_zones_b: brake_zones(b, brake_mode, brake_threshold),
    }
}

fn sorted_by_distance(points: &[TelemetryPoint]) -> Cow<'_, [TelemetryPoint]> {
    if points.windows(2).all(|w| w[0].distance <= w[1].distance) {
        Cow::Borrowed(points)
    } else {
        let mut owned = points.to_vec();
        owned.sort_by(|x, y| x.distance.total_cmp(&y.distance));
        Cow::Owned(owned)
    }
}

#[allow(clippy::cast_precision_loss)]
fn distance_grid(start: f64, end: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (points - 1) as f64;
            (0..points)
                .map(|i| if i == points - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Sample `series` (sorted by distance, non-empty) at each grid distance.
fn interpolate(series: &[TelemetryPoint], grid: &[f64]) -> Vec<TelemetryPoint> {
    let mut out = Vec::with_capacity(grid.len());
    let mut k = 0;

    for &x in grid {
        // First sample at or beyond x; the grid is ascending so k only moves forward.
        while k < series.len() - 1 && series[k].distance < x {
            k += 1;
        }
        let hi = &series[k];
        let lo = if k == 0 { hi } else { &series[k - 1] };
        let held = if hi.distance <= x { hi } else { lo };

        let span = hi.distance - lo.distance;
        let t = if span > 0.0 {
            ((x - lo.distance) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let lerp = |from: f64, to: f64| from + (to - from) * t;

        out.push(TelemetryPoint {
            distance: x,
            speed: lerp(lo.speed, hi.speed),
            throttle: lerp(lo.throttle, hi.throttle),
            brake: held.brake,
            gear: held.gear,
            rpm: lo.rpm.zip(hi.rpm).map(|(from, to)| lerp(from, to)),
            drs: held.drs,
        });
    }
    out
}
