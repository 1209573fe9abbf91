//! Largest-Triangle-Three-Buckets decimation for chart series.
//!
//! The first and last samples are always kept. The samples in between are
//! split into `target - 2` buckets of equal width; from each bucket the
//! sample forming the largest triangle with the previously kept sample and
//! the mean of the next bucket is kept. The x coordinate is the sample's
//! index in the input, the y coordinate is read through a caller-supplied
//! accessor (missing values count as `0.0`).

use std::borrow::Cow;

use serde_json::Value;
use tracing::trace;

use crate::model::{TelemetryChannel, TelemetryPoint};

/// Downsample `data` to `target` samples.
///
/// Returns the input borrowed and untouched when it already has at most
/// `target` samples. For `target < 3` there is no room for buckets: `0`
/// yields nothing, `1` the first sample, `2` the first and last.
///
/// ```
/// let data: Vec<f64> = (0..100).map(f64::from).collect();
/// let out = pitwall::downsample::lttb(&data, 10, |v| Some(*v));
/// assert_eq!(out.len(), 10);
/// assert_eq!(out[0], 0.0);
/// assert_eq!(out[9], 99.0);
/// ```
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn lttb<T, F>(data: &[T], target: usize, y: F) -> Cow<'_, [T]>
where
    T: Clone,
    F: Fn(&T) -> Option<f64>,
{
    let n = data.len();
    if n <= target {
        return Cow::Borrowed(data);
    }
    match target {
        0 => return Cow::Owned(Vec::new()),
        1 => return Cow::Owned(vec![data[0].clone()]),
        2 => return Cow::Owned(vec![data[0].clone(), data[n - 1].clone()]),
        _ => {}
    }

    let y_at = |i: usize| y(&data[i]).filter(|v| v.is_finite()).unwrap_or(0.0);
    let bucket_size = (n - 2) as f64 / (target - 2) as f64;
    let bucket_bound = |i: usize| ((i as f64 * bucket_size).floor() as usize + 1).min(n - 1);

    let mut sampled = Vec::with_capacity(target);
    sampled.push(data[0].clone());
    let mut prev = 0usize;

    for bucket in 0..target - 2 {
        let start = bucket_bound(bucket);
        let end = bucket_bound(bucket + 1).max(start + 1);

        // The last bucket looks ahead at the final sample.
        let next_start = end.min(n - 1);
        let next_end = bucket_bound(bucket + 2).max(next_start + 1).min(n);
        let next_len = (next_end - next_start) as f64;
        let avg_x = (next_start..next_end).map(|j| j as f64).sum::<f64>() / next_len;
        let avg_y = (next_start..next_end).map(y_at).sum::<f64>() / next_len;

        let prev_x = prev as f64;
        let prev_y = y_at(prev);
        let mut max_area = -1.0;
        let mut max_index = start;
        for j in start..end.min(n - 1) {
            let area = ((prev_x - avg_x) * (y_at(j) - prev_y) - (prev_x - j as f64) * (avg_y - prev_y))
                .abs()
                * 0.5;
            if area > max_area {
                max_area = area;
                max_index = j;
            }
        }

        sampled.push(data[max_index].clone());
        prev = max_index;
    }

    sampled.push(data[n - 1].clone());
    trace!(input = n, output = sampled.len(), "lttb downsampled series");
    Cow::Owned(sampled)
}

/// Downsample a telemetry trace, using `channel` as the y value.
#[must_use]
pub fn downsample_telemetry(
    points: &[TelemetryPoint],
    target: usize,
    channel: TelemetryChannel,
) -> Cow<'_, [TelemetryPoint]> {
    lttb(points, target, |p| p.channel(channel))
}

/// Downsample an array of JSON objects, using the numeric `field` of each
/// object as the y value. Non-numeric or missing fields count as `0.0`.
#[must_use]
pub fn downsample_json<'a>(values: &'a [Value], target: usize, field: &str) -> Cow<'a, [Value]> {
    lttb(values, target, |v| v.get(field).and_then(Value::as_f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn series(n: usize) -> Vec<f64> {
        (0..n).map(|i| ((i * 37) % 101) as f64).collect()
    }

    #[test]
    fn test_identity_when_short_enough() {
        let data = series(10);
        let out = lttb(&data, 10, |v| Some(*v));
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out.as_ref(), data.as_slice());

        let out = lttb(&data, 50, |v| Some(*v));
        assert_eq!(out.len(), 10);
    }

    #[test]
    fn test_length_and_endpoints() {
        for n in [5usize, 17, 100, 1001] {
            let data = series(n);
            for target in [2usize, 3, 4, 7, n - 1].into_iter().filter(|t| *t < n) {
                let out = lttb(&data, target, |v| Some(*v));
                assert_eq!(out.len(), target, "n={n} target={target}");
                assert_eq!(out[0], data[0]);
                assert_eq!(out[target - 1], data[n - 1]);
            }
        }
    }

    #[test]
    fn test_small_targets() {
        let data = series(10);
        assert!(lttb(&data, 0, |v| Some(*v)).is_empty());
        assert_eq!(lttb(&data, 1, |v| Some(*v)).as_ref(), &[data[0]]);
    }

    #[test]
    fn test_keeps_spike() {
        let mut data = vec![0.0; 100];
        data[42] = 500.0;
        let out = lttb(&data, 10, |v| Some(*v));
        assert!(out.contains(&500.0));
    }

    #[test]
    fn test_indices_strictly_increasing() {
        let data: Vec<(usize, f64)> = series(300).into_iter().enumerate().collect();
        let out = lttb(&data, 40, |p| Some(p.1));
        assert!(out.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_deterministic() {
        let data = series(777);
        let a = lttb(&data, 64, |v| Some(*v)).into_owned();
        let b = lttb(&data, 64, |v| Some(*v)).into_owned();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_field_counts_as_zero() {
        let data: Vec<Option<f64>> = (0..50).map(|i| if i == 20 { Some(90.0) } else { None }).collect();
        let out = lttb(&data, 5, |v| *v);
        assert_eq!(out.len(), 5);
        assert!(out.contains(&Some(90.0)));
    }

    #[test]
    fn test_downsample_telemetry_by_channel() {
        let points: Vec<TelemetryPoint> = (0..200)
            .map(|i| TelemetryPoint {
                distance: f64::from(i) * 10.0,
                speed: if i == 120 { 340.0 } else { 200.0 },
                ..TelemetryPoint::default()
            })
            .collect();
        let out = downsample_telemetry(&points, 20, TelemetryChannel::Speed);
        assert_eq!(out.len(), 20);
        assert!(out.iter().any(|p| (p.speed - 340.0).abs() < f64::EPSILON));
    }

    #[test]
    fn test_downsample_json_objects() {
        let values: Vec<Value> = (0..30)
            .map(|i| {
                if i == 7 {
                    json!({"distance": i, "speed": "fast"})
                } else {
                    json!({"distance": i, "speed": i * 2})
                }
            })
            .collect();
        let out = downsample_json(&values, 8, "speed");
        assert_eq!(out.len(), 8);
        assert_eq!(out[0]["distance"], 0);
        assert_eq!(out[7]["distance"], 29);
    }
}
