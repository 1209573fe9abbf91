//! Access to the telemetry backend and to payloads saved on disk.
//!
//! [`ApiClient`] talks to the REST backend. [`FileSource`] reads the same
//! payloads from JSON files, so everything downstream of a
//! [`PayloadSource`] works offline.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::model::{
    CompareRequest, Driver, Event, HealthStatus, PositionData, RacePaceResult, Season, Session,
    StrategyData, TelemetryComparison, TrackEvolution,
};

/// Fallback when an error response carries no `detail`.
const UNKNOWN_ERROR: &str = "Unknown error";

/// Identifies one session of one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKey {
    /// Season year.
    pub season: i32,
    /// Event name.
    pub event: String,
    /// Session identifier.
    pub session: String,
}

impl SessionKey {
    /// Build a key.
    #[must_use]
    pub fn new(season: i32, event: impl Into<String>, session: impl Into<String>) -> Self {
        Self {
            season,
            event: event.into(),
            session: session.into(),
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("season", self.season.to_string()),
            ("event", self.event.clone()),
            ("session", self.session.clone()),
        ]
    }
}

impl From<&CompareRequest> for SessionKey {
    fn from(request: &CompareRequest) -> Self {
        Self::new(request.season, &request.event, &request.session)
    }
}

/// Where comparison and race payloads come from.
#[async_trait]
pub trait PayloadSource: Send + Sync {
    /// Telemetry of the two requested laps.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be fetched or decoded.
    async fn telemetry(&self, request: &CompareRequest) -> Result<TelemetryComparison>;

    /// Race pace for the given drivers; all drivers when `drivers` is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be fetched or decoded.
    async fn race_pace(&self, key: &SessionKey, drivers: &[String]) -> Result<RacePaceResult>;

    /// Tire strategy of every driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be fetched or decoded.
    async fn strategy(&self, key: &SessionKey) -> Result<StrategyData>;

    /// Lap-by-lap positions of every driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be fetched or decoded.
    async fn positions(&self, key: &SessionKey) -> Result<Vec<PositionData>>;
}

/// REST client for the telemetry backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("pitwall/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The backend base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    pub async fn health(&self) -> Result<HealthStatus> {
        self.send(self.request(Method::GET, "/health", &[])).await
    }

    /// `GET /seasons`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn seasons(&self) -> Result<Vec<Season>> {
        self.send(self.request(Method::GET, "/seasons", &[])).await
    }

    /// `GET /events?season=`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn events(&self, season: i32) -> Result<Vec<Event>> {
        let query = [("season", season.to_string())];
        self.send(self.request(Method::GET, "/events", &query)).await
    }

    /// `GET /sessions?season=&event=`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn sessions(&self, season: i32, event: &str) -> Result<Vec<Session>> {
        let query = [("season", season.to_string()), ("event", event.to_string())];
        self.send(self.request(Method::GET, "/sessions", &query)).await
    }

    /// `GET /drivers?season=&event=&session=`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn drivers(&self, key: &SessionKey) -> Result<Vec<Driver>> {
        self.send(self.request(Method::GET, "/drivers", &key.query())).await
    }

    /// `POST /telemetry/compare`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn compare_telemetry(&self, request: &CompareRequest) -> Result<TelemetryComparison> {
        info!(key = %request.cache_key(), "comparing telemetry");
        self.send_json(Method::POST, "/telemetry/compare", request).await
    }

    /// `GET /race-pace?season=&event=&session=&drivers=A,B`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn race_pace(&self, key: &SessionKey, drivers: &[String]) -> Result<RacePaceResult> {
        self.send(self.race_pace_request(key, drivers)).await
    }

    /// `GET /strategy?season=&event=&session=`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn strategy(&self, key: &SessionKey) -> Result<StrategyData> {
        self.send(self.request(Method::GET, "/strategy", &key.query())).await
    }

    /// `GET /positions?season=&event=&session=`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn positions(&self, key: &SessionKey) -> Result<Vec<PositionData>> {
        self.send(self.request(Method::GET, "/positions", &key.query())).await
    }

    /// `GET /track-evolution?season=&event=&session=`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn track_evolution(&self, key: &SessionKey) -> Result<TrackEvolution> {
        self.send(self.request(Method::GET, "/track-evolution", &key.query()))
            .await
    }

    fn race_pace_request(&self, key: &SessionKey, drivers: &[String]) -> RequestBuilder {
        let mut query = key.query();
        if !drivers.is_empty() {
            query.push(("drivers", drivers.join(",")));
        }
        self.request(Method::GET, "/race-pace", &query)
    }

    fn request(&self, method: Method, path: &str, query: &[(&str, String)]) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{path}", self.base_url));
        if query.is_empty() {
            builder
        } else {
            builder.query(query)
        }
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(method, path, &[]).json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        debug!(url = %response.url(), status = %response.status(), "backend response");
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let body = response.text().await.unwrap_or_default();
    let detail = error_detail(&body);
    warn!(status = status.as_u16(), %detail, "backend request failed");
    Err(Error::Api {
        status: status.as_u16(),
        detail,
    })
}

/// The `detail` of an error body. Validation errors carry a structured
/// detail, which is passed through as JSON text.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
            Some(Value::Null | Value::String(_)) | None => UNKNOWN_ERROR.to_string(),
            Some(other) => other.to_string(),
        },
        _ => UNKNOWN_ERROR.to_string(),
    }
}

#[async_trait]
impl PayloadSource for ApiClient {
    async fn telemetry(&self, request: &CompareRequest) -> Result<TelemetryComparison> {
        self.compare_telemetry(request).await
    }

    async fn race_pace(&self, key: &SessionKey, drivers: &[String]) -> Result<RacePaceResult> {
        ApiClient::race_pace(self, key, drivers).await
    }

    async fn strategy(&self, key: &SessionKey) -> Result<StrategyData> {
        ApiClient::strategy(self, key).await
    }

    async fn positions(&self, key: &SessionKey) -> Result<Vec<PositionData>> {
        ApiClient::positions(self, key).await
    }
}

/// Payloads saved as JSON files in one directory.
///
/// The files are `telemetry.json`, `race_pace.json`, `strategy.json` and
/// `positions.json`; request parameters are ignored.
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    /// File holding the telemetry comparison.
    pub const TELEMETRY: &'static str = "telemetry.json";
    /// File holding the race pace result.
    pub const RACE_PACE: &'static str = "race_pace.json";
    /// File holding the strategy payload.
    pub const STRATEGY: &'static str = "strategy.json";
    /// File holding the position histories.
    pub const POSITIONS: &'static str = "positions.json";

    /// Read payloads from `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        read_payload(&self.dir.join(name)).await
    }
}

/// Read and decode one JSON payload file.
///
/// # Errors
///
/// Returns [`Error::PayloadRead`] if the file cannot be read and
/// [`Error::Json`] if it is not a valid payload.
pub async fn read_payload<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::PayloadRead {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), bytes = text.len(), "read payload");
    Ok(serde_json::from_str(&text)?)
}

/// Write `value` as pretty-printed JSON to `path`.
///
/// # Errors
///
/// Returns [`Error::Json`] if the value cannot be serialized and
/// [`Error::Io`] if the file cannot be written.
pub async fn write_payload<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, &text).await?;
    debug!(path = %path.display(), bytes = text.len(), "wrote payload");
    Ok(())
}

#[async_trait]
impl PayloadSource for FileSource {
    async fn telemetry(&self, _request: &CompareRequest) -> Result<TelemetryComparison> {
        self.load(Self::TELEMETRY).await
    }

    async fn race_pace(&self, _key: &SessionKey, drivers: &[String]) -> Result<RacePaceResult> {
        let mut result: RacePaceResult = self.load(Self::RACE_PACE).await?;
        if !drivers.is_empty() {
            result.drivers.retain(|d| drivers.contains(&d.driver));
        }
        Ok(result)
    }

    async fn strategy(&self, _key: &SessionKey) -> Result<StrategyData> {
        self.load(Self::STRATEGY).await
    }

    async fn positions(&self, _key: &SessionKey) -> Result<Vec<PositionData>> {
        self.load(Self::POSITIONS).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: "http://localhost:8000/".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn key() -> SessionKey {
        SessionKey::new(2024, "São Paulo Grand Prix", "R")
    }

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
    fn test_base_url_trailing_slash_removed() {
        assert_eq!(client().base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_query_is_encoded() {
        let request = client()
            .request(Method::GET, "/strategy", &key().query())
            .build()
            .unwrap();
        assert_eq!(request.url().path(), "/strategy");
        let pairs: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("season".to_string(), "2024".to_string()),
                ("event".to_string(), "São Paulo Grand Prix".to_string()),
                ("session".to_string(), "R".to_string()),
            ]
        );
    }

    #[test]
    fn test_race_pace_drivers_joined() {
        let drivers = vec!["VER".to_string(), "NOR".to_string()];
        let request = client().race_pace_request(&key(), &drivers).build().unwrap();
        assert_eq!(request.url().path(), "/race-pace");
        assert!(request
            .url()
            .query_pairs()
            .any(|(k, v)| k == "drivers" && v == "VER,NOR"));

        let request = client().race_pace_request(&key(), &[]).build().unwrap();
        assert!(!request.url().query_pairs().any(|(k, _)| k == "drivers"));
    }

    #[test]
    fn test_no_query_for_plain_paths() {
        let request = client().request(Method::GET, "/seasons", &[]).build().unwrap();
        assert_eq!(request.url().as_str(), "http://localhost:8000/seasons");
        assert!(request.url().query().is_none());
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(error_detail(r#"{"detail": "Session not found"}"#), "Session not found");
        assert_eq!(error_detail(r#"{"message": "nope"}"#), UNKNOWN_ERROR);
        assert_eq!(error_detail("<html>502</html>"), UNKNOWN_ERROR);
        assert_eq!(error_detail(""), UNKNOWN_ERROR);
        assert_eq!(
            error_detail(r#"{"detail": [{"loc": ["season"]}]}"#),
            r#"[{"loc":["season"]}]"#
        );
    }

    #[test]
    fn test_session_key_from_request() {
        let key = SessionKey::from(&request());
        assert_eq!(key, SessionKey::new(2024, "Monaco Grand Prix", "Q"));
    }

    #[tokio::test]
    async fn test_file_source_reads_payloads() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(FileSource::TELEMETRY),
            r#"{"driverA": {"driver": "LEC", "data": [{"distance": 0, "speed": 100}]}}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join(FileSource::RACE_PACE),
            r#"{"drivers": [{"driver": "LEC"}, {"driver": "PIA"}, {"driver": "NOR"}]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join(FileSource::STRATEGY), "{}").unwrap();
        std::fs::write(dir.path().join(FileSource::POSITIONS), "[]").unwrap();

        let source = FileSource::new(dir.path());
        let telemetry = source.telemetry(&request()).await.unwrap();
        assert_eq!(telemetry.driver_a.driver, "LEC");
        assert!(!telemetry.has_both_laps());

        let drivers = vec!["LEC".to_string(), "PIA".to_string()];
        let pace = source.race_pace(&key(), &drivers).await.unwrap();
        assert_eq!(pace.drivers.len(), 2);

        assert!(source.strategy(&key()).await.unwrap().stints.is_empty());
        assert!(source.positions(&key()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path());
        let err = source.strategy(&key()).await.unwrap_err();
        assert!(matches!(err, Error::PayloadRead { .. }));
    }

    #[tokio::test]
    async fn test_write_payload_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sampled.json");
        let values = vec![serde_json::json!({"distance": 0.0, "speed": 281.5})];
        write_payload(&path, values.as_slice()).await.unwrap();

        let back: Vec<Value> = read_payload(&path).await.unwrap();
        assert_eq!(back, values);
    }

    #[tokio::test]
    async fn test_write_payload_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("sampled.json");
        let err = write_payload(&path, &[1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn test_read_payload_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = read_payload::<StrategyData>(&path).await.unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
