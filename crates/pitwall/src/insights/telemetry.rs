//! Speed, throttle/brake and gear insights for a single-lap comparison.

use tracing::debug;

use super::{max_with_index, min_with_index, InsightEngine, InsightKind, DATA_UNAVAILABLE};
use crate::brake::{braking_distance, count_brake_zones};
use crate::format::{percentage, whole};
use crate::model::{TelemetryComparison, TelemetryPoint};

fn unavailable(kind: InsightKind) -> Vec<String> {
    debug!(%kind, "telemetry missing for one or both drivers");
    vec![DATA_UNAVAILABLE.to_string()]
}

fn speeds(points: &[TelemetryPoint]) -> impl Iterator<Item = f64> + '_ {
    points.iter().map(|p| p.speed)
}

fn count_shifts(points: &[TelemetryPoint]) -> usize {
    points.windows(2).filter(|w| w[0].gear != w[1].gear).count()
}

impl InsightEngine {
    /// Top speed, slowest-corner speed and lap time comparison.
    #[must_use]
    pub fn speed(&self, comparison: &TelemetryComparison) -> Vec<String> {
        if !comparison.has_both_laps() {
            return unavailable(InsightKind::Speed);
        }
        let (a, b) = (&comparison.driver_a, &comparison.driver_b);
        let mut insights = Vec::new();

        if let (Some((_, max_a)), Some((_, max_b))) =
            (max_with_index(speeds(&a.data)), max_with_index(speeds(&b.data)))
        {
            let diff = (max_a - max_b).abs();
            if diff > self.config.top_speed_threshold_kmh {
                let faster = if max_a > max_b { &a.driver } else { &b.driver };
                insights.push(format!(
                    "{faster} reaches {} km/h top speed, {} km/h faster",
                    whole(max_a.max(max_b)),
                    whole(diff)
                ));
            }
        }

        if let (Some((_, min_a)), Some((_, min_b))) =
            (min_with_index(speeds(&a.data)), min_with_index(speeds(&b.data)))
        {
            let diff = (min_a - min_b).abs();
            if diff > self.config.corner_speed_threshold_kmh {
                let faster = if min_a > min_b { &a.driver } else { &b.driver };
                insights.push(format!(
                    "{faster} carries {} km/h more through slowest corner",
                    whole(diff)
                ));
            }
        }

        if let (Some(time_a), Some(time_b)) = (a.valid_lap_time(), b.valid_lap_time()) {
            let faster = if time_a < time_b { &a.driver } else { &b.driver };
            insights.push(format!(
                "{faster} is {:.3}s faster over the lap",
                (time_a - time_b).abs()
            ));
        }

        self.finish(InsightKind::Speed, insights)
    }

    /// Brake zone count, braking distance and full-throttle share.
    #[must_use]
    pub fn throttle_brake(&self, comparison: &TelemetryComparison) -> Vec<String> {
        if !comparison.has_both_laps() {
            return unavailable(InsightKind::ThrottleBrake);
        }
        let (a, b) = (&comparison.driver_a, &comparison.driver_b);
        let mut insights = Vec::new();

        insights.push(format!(
            "{} uses {} brake zones, {} uses {}",
            a.driver,
            count_brake_zones(&a.data),
            b.driver,
            count_brake_zones(&b.data)
        ));

        let dist_a = braking_distance(&a.data);
        let dist_b = braking_distance(&b.data);
        let diff = (dist_a - dist_b).abs();
        if diff > self.config.brake_distance_threshold_m {
            let shorter = if dist_a < dist_b { &a.driver } else { &b.driver };
            insights.push(format!(
                "{shorter} spends {}m less on brakes per lap",
                whole(diff)
            ));
        }

        let full_throttle = |points: &[TelemetryPoint]| {
            let full = points
                .iter()
                .filter(|p| p.throttle >= self.config.full_throttle_pct)
                .count();
            whole(percentage(full, points.len()))
        };
        insights.push(format!(
            "Full throttle: {} {}%, {} {}%",
            a.driver,
            full_throttle(&a.data),
            b.driver,
            full_throttle(&b.data)
        ));

        self.finish(InsightKind::ThrottleBrake, insights)
    }

    /// Highest gear, shift count and share of the lap in top gear.
    #[must_use]
    pub fn gear(&self, comparison: &TelemetryComparison) -> Vec<String> {
        if !comparison.has_both_laps() {
            return unavailable(InsightKind::Gear);
        }
        let (a, b) = (&comparison.driver_a, &comparison.driver_b);
        let mut insights = Vec::new();

        // Both laps are non-empty, so the maxima exist.
        let top_a = a.data.iter().map(|p| p.gear).max().unwrap_or_default();
        let top_b = b.data.iter().map(|p| p.gear).max().unwrap_or_default();

        insights.push(format!(
            "Both drivers use up to {}th gear",
            top_a.max(top_b)
        ));

        insights.push(format!(
            "Gear changes: {} makes {}, {} makes {}",
            a.driver,
            count_shifts(&a.data),
            b.driver,
            count_shifts(&b.data)
        ));

        let time_in = |points: &[TelemetryPoint], gear: u8| {
            let count = points.iter().filter(|p| p.gear == gear).count();
            whole(percentage(count, points.len()))
        };
        insights.push(format!(
            "Time in top gear: {} {}%, {} {}%",
            a.driver,
            time_in(&a.data, top_a),
            b.driver,
            time_in(&b.data, top_b)
        ));

        self.finish(InsightKind::Gear, insights)
    }
}
