//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::client::SessionKey;
use crate::error::{Error, Result};
use crate::insights::TelemetryChart;
use crate::model::CompareRequest;
use crate::store::{Selection, SessionStore};

/// Where payloads come from and which session and drivers to analyse.
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Read payloads from JSON files in this directory instead of the backend
    #[arg(short, long, value_name = "DIR")]
    pub data: Option<PathBuf>,

    /// Season year
    #[arg(short, long)]
    pub season: Option<i32>,

    /// Event name, e.g. "Bahrain Grand Prix"
    #[arg(short, long)]
    pub event: Option<String>,

    /// Session identifier, e.g. R, Q, FP1
    #[arg(long)]
    pub session: Option<String>,

    /// First driver code
    #[arg(short = 'a', long)]
    pub driver_a: Option<String>,

    /// Second driver code
    #[arg(short = 'b', long)]
    pub driver_b: Option<String>,

    /// Lap for the first driver (fastest lap when omitted)
    #[arg(long)]
    pub lap_a: Option<u32>,

    /// Lap for the second driver (fastest lap when omitted)
    #[arg(long)]
    pub lap_b: Option<u32>,
}

impl SourceArgs {
    /// Whether payloads are read from disk.
    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.data.is_some()
    }

    /// The selection described by the flags, applied in hierarchy order.
    #[must_use]
    pub fn selection(&self) -> Selection {
        let mut store = SessionStore::new();
        store.set_season(self.season);
        store.set_event(self.event.clone());
        store.set_session(self.session.clone());
        store.set_driver_a(self.driver_a.clone());
        store.set_driver_b(self.driver_b.clone());
        store.selection().clone()
    }

    /// The telemetry comparison request.
    ///
    /// Offline, missing fields are left empty since files are not keyed by
    /// request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteSelection`] when querying the backend
    /// without a complete selection.
    pub fn compare_request(&self) -> Result<CompareRequest> {
        let selection = self.selection();
        let mut request = if self.is_offline() {
            CompareRequest {
                season: selection.season.unwrap_or_default(),
                event: selection.event.unwrap_or_default(),
                session: selection.session.unwrap_or_default(),
                driver_a: selection.driver_a.unwrap_or_default(),
                driver_b: selection.driver_b.unwrap_or_default(),
                lap_a: None,
                lap_b: None,
            }
        } else {
            selection.compare_request()?
        };
        request.lap_a = self.lap_a;
        request.lap_b = self.lap_b;
        Ok(request)
    }

    /// The session to query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteSelection`] when querying the backend
    /// without season, event and session.
    pub fn session_key(&self) -> Result<SessionKey> {
        if self.is_offline() {
            return Ok(SessionKey::new(
                self.season.unwrap_or_default(),
                self.event.clone().unwrap_or_default(),
                self.session.clone().unwrap_or_default(),
            ));
        }
        let missing = |field| Error::IncompleteSelection { field };
        Ok(SessionKey::new(
            self.season.ok_or_else(|| missing("season"))?,
            self.event.clone().ok_or_else(|| missing("event"))?,
            self.session.clone().ok_or_else(|| missing("session"))?,
        ))
    }

    /// Both driver codes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteSelection`] naming the missing driver.
    pub fn driver_pair(&self) -> Result<(String, String)> {
        let a = self
            .driver_a
            .clone()
            .ok_or(Error::IncompleteSelection { field: "driver_a" })?;
        let b = self
            .driver_b
            .clone()
            .ok_or(Error::IncompleteSelection { field: "driver_b" })?;
        Ok((a, b))
    }

    /// The selected drivers, in order, skipping unset ones.
    #[must_use]
    pub fn drivers(&self) -> Vec<String> {
        self.driver_a.iter().chain(&self.driver_b).cloned().collect()
    }
}

/// Which insights to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InsightTarget {
    /// Speed trace
    Speed,
    /// Throttle and brake trace
    ThrottleBrake,
    /// Gear trace
    Gear,
    /// Delta trace
    Delta,
    /// Race pace chart
    RacePace,
    /// Every telemetry chart
    All,
}

impl InsightTarget {
    /// The telemetry chart this target names, `None` for
    /// [`InsightTarget::RacePace`] and [`InsightTarget::All`].
    #[must_use]
    pub fn chart(self) -> Option<TelemetryChart> {
        match self {
            Self::Speed => Some(TelemetryChart::Speed),
            Self::ThrottleBrake => Some(TelemetryChart::ThrottleBrake),
            Self::Gear => Some(TelemetryChart::Gear),
            Self::Delta => Some(TelemetryChart::Delta),
            Self::RacePace | Self::All => None,
        }
    }
}

/// Insights command arguments.
#[derive(Debug, Args)]
pub struct InsightsCommand {
    /// Chart to generate insights for
    #[arg(value_enum)]
    pub target: InsightTarget,

    /// Payload source and selection
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Story command arguments.
#[derive(Debug, Args)]
pub struct StoryCommand {
    /// Payload source and selection
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Sectors command arguments.
#[derive(Debug, Args)]
pub struct SectorsCommand {
    /// Payload source and selection
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Chart command arguments.
#[derive(Debug, Args)]
pub struct ChartCommand {
    /// Payload source and selection
    #[command(flatten)]
    pub source: SourceArgs,

    /// Points on the shared distance grid (0 uses the longer lap's length)
    #[arg(long)]
    pub points: Option<usize>,

    /// Downsample the rows to at most this many points
    #[arg(short, long)]
    pub target: Option<usize>,
}

/// Downsample command arguments.
#[derive(Debug, Args)]
pub struct DownsampleCommand {
    /// JSON file holding an array of objects
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Numeric field used as the y value
    #[arg(short, long, default_value = "speed")]
    pub field: String,

    /// Number of points to keep (defaults to the configured target)
    #[arg(short, long)]
    pub target: Option<usize>,

    /// Write the result here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Raw backend queries, printed as JSON.
#[derive(Debug, Subcommand)]
pub enum FetchCommand {
    /// Backend health
    Health,

    /// Available seasons
    Seasons,

    /// Events of a season
    Events {
        /// Season year
        #[arg(short, long)]
        season: i32,
    },

    /// Sessions of an event
    Sessions {
        /// Season year
        #[arg(short, long)]
        season: i32,

        /// Event name
        #[arg(short, long)]
        event: String,
    },

    /// Drivers of a session
    Drivers(SourceArgs),

    /// Telemetry comparison of two laps
    Telemetry {
        /// Payload source and selection
        #[command(flatten)]
        source: SourceArgs,

        /// Resample both laps onto a shared grid of this many distances
        #[arg(long, value_name = "POINTS")]
        align: Option<usize>,

        /// Downsample each lap by speed to at most this many samples
        #[arg(short, long)]
        target: Option<usize>,
    },

    /// Race pace of the selected drivers
    RacePace(SourceArgs),

    /// Tire strategy
    Strategy(SourceArgs),

    /// Lap-by-lap positions
    Positions(SourceArgs),

    /// Track evolution
    TrackEvolution(SourceArgs),
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
