//! Command-line interface for pitwall.
//!
//! This module provides the CLI structure for the `pitwall` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ChartCommand, ConfigCommand, DownsampleCommand, FetchCommand, InsightTarget, InsightsCommand,
    SectorsCommand, SourceArgs, StoryCommand,
};

/// pitwall - Explain the difference between two F1 drivers
///
/// Turns telemetry, race pace, strategy and position payloads into short
/// insights, a race story and chart-ready series.
#[derive(Debug, Parser)]
#[command(name = "pitwall")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate insights for a chart
    Insights(InsightsCommand),

    /// Build the race story for two drivers
    Story(StoryCommand),

    /// Compare sector times of two laps
    Sectors(SectorsCommand),

    /// Print distance-aligned chart rows and brake zones as JSON
    Chart(ChartCommand),

    /// Downsample a JSON series with LTTB
    Downsample(DownsampleCommand),

    /// Query the backend and print the raw payload
    #[command(subcommand)]
    Fetch(FetchCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
