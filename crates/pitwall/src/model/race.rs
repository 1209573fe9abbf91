//! Race-level payloads: race pace, tire strategy and running positions.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Tire compound classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Compound {
    /// Red-walled slick.
    Soft,
    /// Yellow-walled slick.
    Medium,
    /// White-walled slick.
    Hard,
    /// Green-walled light wet.
    Intermediate,
    /// Blue-walled full wet.
    Wet,
    /// Anything the backend could not classify.
    #[default]
    Unknown,
}

impl Compound {
    /// Parse a compound name, case-insensitively. Unrecognised names map to
    /// [`Compound::Unknown`].
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "SOFT" => Self::Soft,
            "MEDIUM" => Self::Medium,
            "HARD" => Self::Hard,
            "INTERMEDIATE" => Self::Intermediate,
            "WET" => Self::Wet,
            _ => Self::Unknown,
        }
    }

    /// Upper-case wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Soft => "SOFT",
            Self::Medium => "MEDIUM",
            Self::Hard => "HARD",
            Self::Intermediate => "INTERMEDIATE",
            Self::Wet => "WET",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Whether the compound is known.
    #[must_use]
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

impl<'de> Deserialize<'de> for Compound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // The backend stringifies pandas values, so "nan" and "None" show up.
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(Self::Unknown, Self::parse))
    }
}

impl std::fmt::Display for Compound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timed lap in a race-pace payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LapRecord {
    /// Lap number.
    pub lap: u32,
    /// Lap time in seconds.
    pub lap_time: f64,
    /// Compound fitted for the lap.
    pub compound: Compound,
    /// Stint the lap belongs to.
    pub stint: u32,
    /// In-lap or out-lap.
    pub is_pit_lap: bool,
    /// Slower than 107% of the driver's median; excluded from aggregates.
    pub is_outlier: bool,
}

/// Aggregate statistics for one stint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StintSummary {
    /// 1-based stint number.
    pub stint_number: u32,
    /// Compound used for the stint.
    pub compound: Compound,
    /// First lap of the stint.
    pub start_lap: u32,
    /// Last lap of the stint.
    pub end_lap: u32,
    /// Number of timed laps in the stint.
    pub total_laps: u32,
    /// Mean clean lap time in seconds.
    pub avg_lap_time: f64,
    /// Best clean lap time in seconds.
    pub best_lap_time: f64,
    /// Lap-time slope in seconds per lap.
    pub deg_rate: f64,
}

/// Race pace for a single driver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DriverRacePace {
    /// Driver code.
    pub driver: String,
    /// Team name.
    pub team: String,
    /// Team colour as `#RRGGBB`.
    pub team_color: String,
    /// Timed laps in lap order.
    pub laps: Vec<LapRecord>,
    /// Stint summaries in stint order.
    pub stints: Vec<StintSummary>,
    /// Sum of all timed laps, in seconds.
    pub total_race_time: f64,
}

impl DriverRacePace {
    /// Laps that count towards pace aggregates.
    pub fn clean_laps(&self) -> impl Iterator<Item = &LapRecord> {
        self.laps.iter().filter(|l| !l.is_outlier)
    }

    /// Number of pit stops implied by the stint list.
    #[must_use]
    pub fn pit_stop_count(&self) -> usize {
        self.stints.len().saturating_sub(1)
    }

    /// Check that stint numbers are contiguous and lap ranges do not overlap.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPayload`] describing the first violation.
    pub fn validate_stints(&self) -> Result<()> {
        for pair in self.stints.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if prev.stint_number.checked_add(1) != Some(next.stint_number) {
                return Err(Error::invalid_payload(format!(
                    "{}: stint {} is followed by stint {}",
                    self.driver, prev.stint_number, next.stint_number
                )));
            }
            if next.start_lap <= prev.end_lap {
                return Err(Error::invalid_payload(format!(
                    "{}: stint {} (laps {}-{}) overlaps stint {} (laps {}-{})",
                    self.driver,
                    prev.stint_number,
                    prev.start_lap,
                    prev.end_lap,
                    next.stint_number,
                    next.start_lap,
                    next.end_lap
                )));
            }
        }
        Ok(())
    }
}

/// Response of the race-pace endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RacePaceResult {
    /// Per-driver pace.
    pub drivers: Vec<DriverRacePace>,
    /// Laps in the race.
    pub total_laps: u32,
    /// Laps run behind the safety car.
    pub safety_car_laps: Vec<u32>,
    /// Laps run under a virtual safety car.
    pub vsc_laps: Vec<u32>,
}

impl RacePaceResult {
    /// Drivers ordered by total race time, fastest first. Ties keep input order.
    #[must_use]
    pub fn classified(&self) -> Vec<&DriverRacePace> {
        let mut sorted: Vec<&DriverRacePace> = self.drivers.iter().collect();
        sorted.sort_by(|a, b| a.total_race_time.total_cmp(&b.total_race_time));
        sorted
    }
}

/// A stint as reported by the strategy endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TireStint {
    /// Driver code.
    pub driver: String,
    /// 1-based stint number.
    pub stint_number: u32,
    /// Compound used.
    pub compound: Compound,
    /// First lap of the stint.
    pub start_lap: u32,
    /// Last lap of the stint.
    pub end_lap: u32,
    /// Number of laps.
    pub laps: u32,
}

/// An explicit pit-stop record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PitStop {
    /// Driver code.
    pub driver: String,
    /// Lap the stop happened on.
    pub lap: u32,
    /// Stop duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Compound fitted during the stop.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compound: Option<Compound>,
}

/// Response of the strategy endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StrategyData {
    /// All stints for all drivers.
    pub stints: Vec<TireStint>,
    /// Explicit pit-stop records.
    pub pit_stops: Vec<PitStop>,
    /// Laps in the race.
    pub total_laps: u32,
}

/// Running position at the end of a lap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionPoint {
    /// Lap number.
    pub lap: u32,
    /// Classified position.
    pub position: u32,
}

/// Position history for one driver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionData {
    /// Driver code.
    pub driver: String,
    /// Positions in lap order.
    pub positions: Vec<PositionPoint>,
}

impl PositionData {
    /// Position held on the given lap.
    #[must_use]
    pub fn position_on_lap(&self, lap: u32) -> Option<u32> {
        self.positions
            .iter()
            .find(|p| p.lap == lap)
            .map(|p| p.position)
            .filter(|p| *p > 0)
    }
}
