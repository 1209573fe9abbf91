//! `pitwall` - Derived metrics for comparing two Formula 1 drivers
//!
//! This library turns telemetry, race pace, strategy and position payloads
//! into deterministic insights, a race story timeline and chart-ready
//! series. The derived-metrics core is pure and never fails on missing
//! data; configuration, the backend client and payload files form the
//! fallible shell around it.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod align;
pub mod brake;
pub mod cli;
pub mod client;
pub mod config;
pub mod downsample;
pub mod error;
pub mod format;
pub mod insights;
pub mod logging;
pub mod model;
pub mod sectors;
pub mod store;
pub mod story;

pub use client::{ApiClient, FileSource, PayloadSource, SessionKey};
pub use config::Config;
pub use error::{Error, Result};
pub use insights::InsightEngine;
pub use logging::init_logging;
pub use store::{Selection, SessionStore};
pub use story::race_story;
