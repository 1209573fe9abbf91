//! Catalogue payloads (seasons, events, sessions, drivers) and request bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A championship season.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Season {
    /// Year of the season.
    pub year: i32,
    /// Display name.
    pub name: String,
}

/// A race weekend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Event {
    /// Championship round.
    pub round_number: u32,
    /// Host country.
    pub country: String,
    /// Circuit location.
    pub location: String,
    /// Official event name, used as the `event` query parameter.
    pub event_name: String,
    /// Event date as reported by the backend.
    pub event_date: String,
}

/// A session within an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Session {
    /// Session name, e.g. `Race`.
    pub name: String,
    /// Session date.
    pub date: String,
    /// Short identifier used in queries: `FP1`, `Q`, `R`, ...
    pub session_type: String,
}

/// A driver entered in a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Driver {
    /// Three-letter code.
    pub code: String,
    /// Full name.
    pub name: String,
    /// Team name.
    pub team: String,
    /// Team colour.
    pub team_color: String,
    /// Car number.
    pub number: u32,
}

/// Backend health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `healthy` when the backend is up.
    pub status: String,
    /// Server time of the check.
    pub timestamp: DateTime<Utc>,
    /// Backend version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Session best lap at a given lap number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackEvolutionPoint {
    /// Lap number.
    pub lap: u32,
    /// Best lap time so far, in seconds.
    pub best_time: f64,
    /// Driver who set it.
    pub driver: String,
    /// Compound used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compound: Option<String>,
}

/// Response of the track evolution endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackEvolution {
    /// Evolution points in lap order.
    pub points: Vec<TrackEvolutionPoint>,
    /// Average improvement in seconds per lap.
    pub improvement_rate: f64,
}

/// Body of `POST /telemetry/compare`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareRequest {
    /// Season year.
    pub season: i32,
    /// Event name.
    pub event: String,
    /// Session identifier.
    pub session: String,
    /// First driver code.
    pub driver_a: String,
    /// Second driver code.
    pub driver_b: String,
    /// Lap for driver A, fastest lap when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lap_a: Option<u32>,
    /// Lap for driver B, fastest lap when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lap_b: Option<u32>,
}

impl CompareRequest {
    /// Key identifying this comparison, `season:event:session:A:B[:lapA][:lapB]`.
    #[must_use]
    pub fn cache_key(&self) -> String {
        let mut parts = vec![
            self.season.to_string(),
            self.event.clone(),
            self.session.clone(),
            self.driver_a.clone(),
            self.driver_b.clone(),
        ];
        parts.extend(self.lap_a.filter(|l| *l > 0).map(|l| l.to_string()));
        parts.extend(self.lap_b.filter(|l| *l > 0).map(|l| l.to_string()));
        parts.join(":")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompareRequest {
        CompareRequest {
            season: 2024,
            event: "Monaco Grand Prix".to_string(),
            session: "Q".to_string(),
            driver_a: "LEC".to_string(),
            driver_b: "PIA".to_string(),
            lap_a: None,
            lap_b: None,
        }
    }

    #[test]
    fn test_cache_key_without_laps() {
        assert_eq!(request().cache_key(), "2024:Monaco Grand Prix:Q:LEC:PIA");
    }

    #[test]
    fn test_cache_key_with_laps() {
        let mut req = request();
        req.lap_a = Some(14);
        req.lap_b = Some(0);
        assert_eq!(req.cache_key(), "2024:Monaco Grand Prix:Q:LEC:PIA:14");
    }

    #[test]
    fn test_compare_request_wire_format() {
        let json = serde_json::to_value(request()).unwrap();
        assert_eq!(json["driver_a"], "LEC");
        assert!(json.get("lap_a").is_none());
    }

    #[test]
    fn test_event_deserialize() {
        let json = r#"{"roundNumber": 8, "country": "Monaco", "location": "Monte Carlo",
                       "eventName": "Monaco Grand Prix", "eventDate": "2024-05-26"}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.round_number, 8);
        assert_eq!(event.event_name, "Monaco Grand Prix");
    }

    #[test]
    fn test_health_deserialize() {
        let json = r#"{"status": "healthy", "timestamp": "2024-05-26T13:00:00Z"}"#;
        let health: HealthStatus = serde_json::from_str(json).unwrap();
        assert_eq!(health.status, "healthy");
        assert!(health.version.is_none());
    }
}
