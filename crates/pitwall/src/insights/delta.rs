//! Delta trace insights.

use tracing::debug;

use super::{max_with_index, min_with_index, InsightEngine, InsightKind, DELTA_UNAVAILABLE};
use crate::format::{format_delta, format_distance_km};
use crate::model::{DeltaPoint, TelemetryComparison};

/// Number of sign changes between consecutive delta points. A zero sample
/// counts as B ahead, like every non-positive delta.
fn lead_changes(delta: &[DeltaPoint]) -> usize {
    delta
        .windows(2)
        .filter(|w| w[0].driver_a_ahead() != w[1].driver_a_ahead())
        .count()
}

impl InsightEngine {
    /// Final gap, each driver's largest advantage and lead changes.
    #[must_use]
    pub fn delta(&self, comparison: &TelemetryComparison) -> Vec<String> {
        let delta = &comparison.delta;
        let Some(last) = delta.last() else {
            debug!("delta trace is empty");
            return vec![DELTA_UNAVAILABLE.to_string()];
        };
        let (a, b) = (&comparison.driver_a.driver, &comparison.driver_b.driver);
        let threshold = self.config.delta_advantage_threshold_s;
        let mut insights = Vec::new();

        let leader = if last.driver_a_ahead() { a } else { b };
        insights.push(format!(
            "{leader} finishes {:.3}s ahead",
            last.delta.abs()
        ));

        let values = || delta.iter().map(|p| p.delta);
        if let Some((i, max)) = max_with_index(values()) {
            if max > threshold {
                insights.push(format!(
                    "{a} max advantage: {} at {}",
                    format_delta(max),
                    format_distance_km(delta[i].distance)
                ));
            }
        }
        if let Some((i, min)) = min_with_index(values()) {
            if min < -threshold {
                insights.push(format!(
                    "{b} max advantage: {} at {}",
                    format_delta(min.abs()),
                    format_distance_km(delta[i].distance)
                ));
            }
        }

        let changes = lead_changes(delta);
        if changes > 0 {
            let times = if changes == 1 { "time" } else { "times" };
            insights.push(format!(
                "Time advantage switched {changes} {times} during lap"
            ));
        }

        self.finish(InsightKind::Delta, insights)
    }
}
