//! Single-lap telemetry payloads returned by `POST /telemetry/compare`.

use serde::{Deserialize, Serialize};

/// One telemetry sample along a lap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TelemetryPoint {
    /// Distance from the start of the lap, in meters.
    pub distance: f64,
    /// Speed in km/h.
    pub speed: f64,
    /// Throttle position, 0-100.
    pub throttle: f64,
    /// Brake signal: 0/1 on some sessions, 0-100 on others.
    pub brake: f64,
    /// Selected gear, 0 for neutral.
    pub gear: u8,
    /// Engine speed, when the backend includes it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpm: Option<f64>,
    /// DRS state flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drs: Option<u8>,
}

/// A numeric channel of a [`TelemetryPoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryChannel {
    /// Lap distance.
    Distance,
    /// Speed.
    Speed,
    /// Throttle position.
    Throttle,
    /// Brake signal.
    Brake,
    /// Gear.
    Gear,
    /// Engine speed.
    Rpm,
    /// DRS flag.
    Drs,
}

impl TelemetryChannel {
    /// Wire name of the channel, matching the JSON field.
    #[must_use]
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Speed => "speed",
            Self::Throttle => "throttle",
            Self::Brake => "brake",
            Self::Gear => "gear",
            Self::Rpm => "rpm",
            Self::Drs => "drs",
        }
    }
}

impl std::fmt::Display for TelemetryChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

impl TelemetryPoint {
    /// Read a channel, `None` when an optional channel is absent.
    #[must_use]
    pub fn channel(&self, channel: TelemetryChannel) -> Option<f64> {
        match channel {
            TelemetryChannel::Distance => Some(self.distance),
            TelemetryChannel::Speed => Some(self.speed),
            TelemetryChannel::Throttle => Some(self.throttle),
            TelemetryChannel::Brake => Some(self.brake),
            TelemetryChannel::Gear => Some(f64::from(self.gear)),
            TelemetryChannel::Rpm => self.rpm,
            TelemetryChannel::Drs => self.drs.map(f64::from),
        }
    }
}

/// Telemetry for one driver's lap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LapTelemetry {
    /// Driver code, e.g. `VER`.
    pub driver: String,
    /// Lap the samples were taken from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lap_number: Option<u32>,
    /// Lap time in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lap_time: Option<f64>,
    /// Samples ordered by distance.
    pub data: Vec<TelemetryPoint>,
}

impl LapTelemetry {
    /// Whether the lap carries no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Lap time, treating zero and non-finite values as absent.
    #[must_use]
    pub fn valid_lap_time(&self) -> Option<f64> {
        self.lap_time.filter(|t| t.is_finite() && *t > 0.0)
    }
}

/// Time difference between the two drivers at one track position.
///
/// A positive `delta` means driver A is ahead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeltaPoint {
    /// Distance along the lap, in meters.
    pub distance: f64,
    /// Signed gap in seconds.
    pub delta: f64,
}

impl DeltaPoint {
    /// Whether driver A is ahead at this point.
    #[must_use]
    pub fn driver_a_ahead(&self) -> bool {
        self.delta > 0.0
    }
}

/// Sector times of one lap, in seconds. A sector the timing system missed
/// is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorTimes {
    /// Sector 1.
    pub sector1: Option<f64>,
    /// Sector 2.
    pub sector2: Option<f64>,
    /// Sector 3.
    pub sector3: Option<f64>,
}

impl SectorTimes {
    /// The three sectors in order.
    #[must_use]
    pub fn as_array(&self) -> [Option<f64>; 3] {
        [self.sector1, self.sector2, self.sector3]
    }

    /// Sum of the three sectors, `None` unless all three are present and
    /// non-zero.
    #[must_use]
    pub fn total(&self) -> Option<f64> {
        self.as_array()
            .into_iter()
            .try_fold(0.0, |sum, s| s.filter(|v| v.abs() > 0.0).map(|v| sum + v))
    }
}

/// Response of the telemetry comparison endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TelemetryComparison {
    /// First selected driver.
    pub driver_a: LapTelemetry,
    /// Second selected driver.
    pub driver_b: LapTelemetry,
    /// Delta trace, positive when driver A is ahead.
    pub delta: Vec<DeltaPoint>,
    /// Sector times of driver A's lap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sectors_a: Option<SectorTimes>,
    /// Sector times of driver B's lap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sectors_b: Option<SectorTimes>,
}

impl TelemetryComparison {
    /// Whether both laps carry samples.
    #[must_use]
    pub fn has_both_laps(&self) -> bool {
        !self.driver_a.is_empty() && !self.driver_b.is_empty()
    }
}
