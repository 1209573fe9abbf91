//! Sector-by-sector comparison of two laps.

use serde::{Deserialize, Serialize};

use crate::model::{SectorTimes, TelemetryComparison};

/// Which driver was quicker through a sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectorWinner {
    /// Driver A.
    A,
    /// Driver B.
    B,
    /// Equal times, or at least one time missing.
    Tie,
}

/// One row of the sector table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorRow {
    /// `S1`, `S2`, `S3` or `Total`.
    pub name: &'static str,
    /// Driver A time in seconds.
    pub a: Option<f64>,
    /// Driver B time in seconds.
    pub b: Option<f64>,
    /// Quicker driver.
    pub winner: SectorWinner,
}

impl SectorRow {
    fn new(name: &'static str, a: Option<f64>, b: Option<f64>) -> Self {
        let winner = match (a, b) {
            (Some(a), Some(b)) if a < b => SectorWinner::A,
            (Some(a), Some(b)) if b < a => SectorWinner::B,
            _ => SectorWinner::Tie,
        };
        Self { name, a, b, winner }
    }

    /// `a - b`, when both times are known.
    #[must_use]
    pub fn delta(&self) -> Option<f64> {
        Some(self.a? - self.b?)
    }

    /// The delta as `+0.123` / `-0.123`, or `-` when a time is missing.
    #[must_use]
    pub fn formatted_delta(&self) -> String {
        match self.delta() {
            Some(d) => {
                let d = d + 0.0;
                let sign = if d > 0.0 { "+" } else { "" };
                format!("{sign}{d:.3}")
            }
            None => "-".to_string(),
        }
    }
}

/// Format a sector time with three decimals, `-` when missing.
#[must_use]
pub fn format_sector_time(seconds: Option<f64>) -> String {
    seconds.map_or_else(|| "-".to_string(), |s| format!("{s:.3}"))
}

/// Compare two laps sector by sector. The result has the three sector rows
/// followed by a `Total` row, which is only populated for a lap whose three
/// sectors are all known.
#[must_use]
pub fn compare_sectors(a: &SectorTimes, b: &SectorTimes) -> Vec<SectorRow> {
    let mut rows: Vec<SectorRow> = ["S1", "S2", "S3"]
        .into_iter()
        .zip(a.as_array().into_iter().zip(b.as_array()))
        .map(|(name, (a, b))| SectorRow::new(name, a, b))
        .collect();
    rows.push(SectorRow::new("Total", a.total(), b.total()));
    rows
}

/// Sector rows for a comparison payload, `None` when either lap lacks
/// sector times.
#[must_use]
pub fn comparison_sectors(comparison: &TelemetryComparison) -> Option<Vec<SectorRow>> {
    Some(compare_sectors(
        comparison.sectors_a.as_ref()?,
        comparison.sectors_b.as_ref()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn times(s1: Option<f64>, s2: Option<f64>, s3: Option<f64>) -> SectorTimes {
        SectorTimes {
            sector1: s1,
            sector2: s2,
            sector3: s3,
        }
    }

    #[test]
    fn test_compare_sectors() {
        let a = times(Some(18.25), Some(33.5), Some(24.0));
        let b = times(Some(18.5), Some(33.25), Some(24.0));
        let rows = compare_sectors(&a, &b);

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].winner, SectorWinner::A);
        assert_eq!(rows[0].formatted_delta(), "-0.250");
        assert_eq!(rows[1].winner, SectorWinner::B);
        assert_eq!(rows[1].formatted_delta(), "+0.250");
        assert_eq!(rows[2].winner, SectorWinner::Tie);
        assert_eq!(rows[2].formatted_delta(), "0.000");
        assert_eq!(rows[3].name, "Total");
        assert_eq!(rows[3].a, Some(75.75));
        assert_eq!(rows[3].winner, SectorWinner::Tie);
    }

    #[test]
    fn test_missing_sector() {
        let a = times(Some(18.0), None, Some(24.0));
        let b = times(Some(18.5), Some(33.0), Some(24.5));
        let rows = compare_sectors(&a, &b);

        assert_eq!(rows[1].winner, SectorWinner::Tie);
        assert_eq!(rows[1].formatted_delta(), "-");
        assert_eq!(rows[3].a, None);
        assert_eq!(rows[3].b, Some(76.0));
        assert_eq!(rows[3].formatted_delta(), "-");
    }

    #[test]
    fn test_comparison_without_sectors() {
        assert!(comparison_sectors(&TelemetryComparison::default()).is_none());
    }

    #[test]
    fn test_format_sector_time() {
        assert_eq!(format_sector_time(Some(18.2)), "18.200");
        assert_eq!(format_sector_time(None), "-");
    }
}
