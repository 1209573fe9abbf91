//! Error types for pitwall.
//!
//! The derived-metrics core (insights, story, downsampling) never fails:
//! absent data yields a safe default. These errors belong to the I/O shell
//! around it: configuration, the backend client, payload files and the
//! selection store.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for pitwall operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Backend Errors ===
    /// The HTTP request could not be sent or its body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {detail}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The `detail` field of the error body.
        detail: String,
    },

    // === Payload Errors ===
    /// A payload file could not be read.
    #[error("failed to read payload {path}: {source}")]
    PayloadRead {
        /// Path of the payload file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A payload was well-formed JSON but violates a data-model invariant.
    #[error("invalid payload: {message}")]
    InvalidPayload {
        /// Description of the violated invariant.
        message: String,
    },

    /// A selection is missing a field required for the request.
    #[error("incomplete selection: {field} is not set")]
    IncompleteSelection {
        /// Name of the missing field.
        field: &'static str,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for pitwall operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new invalid payload error.
    #[must_use]
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            message: message.into(),
        }
    }

    /// Create a new configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error indicates the requested data does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_payload("stints overlap");
        assert_eq!(err.to_string(), "invalid payload: stints overlap");

        let err = Error::config_validation("timeout_secs must be greater than 0");
        assert_eq!(
            err.to_string(),
            "invalid configuration: timeout_secs must be greater than 0"
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = Error::Api {
            status: 404,
            detail: "Session not found".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("Session not found"));
    }

    #[test]
    fn test_is_not_found() {
        let err = Error::Api {
            status: 404,
            detail: "missing".to_string(),
        };
        assert!(err.is_not_found());

        let err = Error::Api {
            status: 500,
            detail: "boom".to_string(),
        };
        assert!(!err.is_not_found());
        assert!(!Error::invalid_payload("x").is_not_found());
    }

    #[test]
    fn test_incomplete_selection_display() {
        let err = Error::IncompleteSelection { field: "driver_b" };
        assert_eq!(err.to_string(), "incomplete selection: driver_b is not set");
    }

    #[test]
    fn test_payload_read_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = Error::PayloadRead {
            path: PathBuf::from("/tmp/race_pace.json"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/race_pace.json"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_from_figment_error() {
        let err: Error = figment::Error::from("bad value".to_string()).into();
        assert!(matches!(err, Error::ConfigLoad(_)));
        assert!(err.to_string().contains("bad value"));
    }
}
