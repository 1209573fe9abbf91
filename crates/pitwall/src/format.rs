//! Pure formatting helpers shared by the insight and story generators.
//!
//! All helpers round to their display resolution before splitting a value
//! into minutes/seconds, so a carry never produces `0:60.000`.

/// Format a lap time as `M:SS.mmm`.
///
/// Minutes are not rolled into hours: `3661.2` formats as `61:01.200`.
/// Negative and non-finite inputs are clamped to zero.
///
/// ```
/// assert_eq!(pitwall::format::format_lap_time(76.345), "1:16.345");
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_lap_time(seconds: f64) -> String {
    let millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let mins = millis / 60_000;
    let rem = millis % 60_000;
    format!("{mins}:{:02}.{:03}", rem / 1000, rem % 1000)
}

/// Format a signed time delta with three decimals and an explicit `+` for
/// non-negative values, e.g. `+0.123s`.
#[must_use]
pub fn format_delta(delta: f64) -> String {
    // Adding zero turns -0.0 into 0.0 so it renders as "+0.000s".
    let delta = delta + 0.0;
    if delta >= 0.0 {
        format!("+{delta:.3}s")
    } else {
        format!("{delta:.3}s")
    }
}

/// Format a race gap for the story timeline.
///
/// - under a minute: `45.2s`
/// - under an hour: `2:05.7`
/// - otherwise: `1:06:40.0`
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_gap(seconds: f64) -> String {
    let tenths = (seconds.max(0.0) * 10.0).round() as u64;
    if tenths < 600 {
        format!("{}.{}s", tenths / 10, tenths % 10)
    } else if tenths < 36_000 {
        let rem = tenths % 600;
        format!("{}:{:02}.{}", tenths / 600, rem / 10, rem % 10)
    } else {
        let hours = tenths / 36_000;
        let mins = (tenths % 36_000) / 600;
        let rem = tenths % 600;
        format!("{hours}:{mins:02}:{:02}.{}", rem / 10, rem % 10)
    }
}

/// Format a degradation slope as `+0.045s/lap`. Only strictly positive
/// rates carry a `+`.
#[must_use]
pub fn format_deg_rate(rate: f64) -> String {
    let rate = rate + 0.0;
    let sign = if rate > 0.0 { "+" } else { "" };
    format!("{sign}{rate:.3}s/lap")
}

/// Format a lap distance in meters as kilometers with one decimal.
#[must_use]
pub fn format_distance_km(meters: f64) -> String {
    format!("{:.1}km", meters / 1000.0)
}

/// Round to the nearest whole number, halves away from zero.
///
/// Display precision in `format!` rounds ties to even; the dashboard rounds
/// them up, so counts and percentages go through this instead.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn whole(value: f64) -> i64 {
    if value.is_finite() {
        value.round() as i64
    } else {
        0
    }
}

/// Percentage of `count` over `total`, zero when `total` is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_lap_time() {
        assert_eq!(format_lap_time(76.345), "1:16.345");
        assert_eq!(format_lap_time(59.5), "0:59.500");
        assert_eq!(format_lap_time(90.0), "1:30.000");
    }

    #[test]
    fn test_format_lap_time_minute_overflow() {
        assert_eq!(format_lap_time(3661.2), "61:01.200");
    }

    #[test]
    fn test_format_lap_time_carry() {
        assert_eq!(format_lap_time(59.9996), "1:00.000");
    }

    #[test]
    fn test_format_lap_time_clamps_invalid() {
        assert_eq!(format_lap_time(-3.0), "0:00.000");
        assert_eq!(format_lap_time(f64::NAN), "0:00.000");
    }

    #[test]
    fn test_format_delta() {
        assert_eq!(format_delta(0.1234), "+0.123s");
        assert_eq!(format_delta(-0.25), "-0.250s");
        assert_eq!(format_delta(0.0), "+0.000s");
        assert_eq!(format_delta(-0.0), "+0.000s");
    }

    #[test]
    fn test_format_gap() {
        assert_eq!(format_gap(45.2), "45.2s");
        assert_eq!(format_gap(125.7), "2:05.7");
        assert_eq!(format_gap(4000.0), "1:06:40.0");
    }

    #[test]
    fn test_format_gap_boundaries() {
        assert_eq!(format_gap(0.0), "0.0s");
        assert_eq!(format_gap(59.96), "1:00.0");
        assert_eq!(format_gap(3600.0), "1:00:00.0");
        assert_eq!(format_gap(4575.7), "1:16:15.7");
    }

    #[test]
    fn test_format_deg_rate() {
        assert_eq!(format_deg_rate(0.0452), "+0.045s/lap");
        assert_eq!(format_deg_rate(-0.012), "-0.012s/lap");
        assert_eq!(format_deg_rate(0.0), "0.000s/lap");
    }

    #[test]
    fn test_format_distance_km() {
        assert_eq!(format_distance_km(1234.0), "1.2km");
        assert_eq!(format_distance_km(0.0), "0.0km");
    }

    #[test]
    fn test_whole_rounds_half_up() {
        assert_eq!(whole(12.5), 13);
        assert_eq!(whole(12.49), 12);
        assert_eq!(whole(f64::INFINITY), 0);
    }

    #[test]
    fn test_percentage() {
        assert!((percentage(1, 4) - 25.0).abs() < f64::EPSILON);
        assert!(percentage(3, 0).abs() < f64::EPSILON);
    }
}
