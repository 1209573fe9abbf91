//! `pitwall` - CLI for the pitwall derived-metrics engine
//!
//! This binary loads payloads from the backend or from JSON files and prints
//! insights, race stories, sector tables and chart-ready series.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use pitwall::align::{align_comparison, chart_data};
use pitwall::cli::{
    ChartCommand, Cli, Command, ConfigCommand, DownsampleCommand, FetchCommand, InsightTarget,
    InsightsCommand, SectorsCommand, SourceArgs, StoryCommand,
};
use pitwall::client::{read_payload, write_payload};
use pitwall::downsample::{downsample_json, downsample_telemetry, lttb};
use pitwall::insights::InsightKind;
use pitwall::model::{RacePaceResult, TelemetryChannel};
use pitwall::sectors::{comparison_sectors, format_sector_time};
use pitwall::{
    init_logging, race_story, ApiClient, Config, FileSource, InsightEngine, PayloadSource,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Insights(cmd) => handle_insights(&config, &cmd).await,
        Command::Story(cmd) => handle_story(&config, &cmd).await,
        Command::Sectors(cmd) => handle_sectors(&config, &cmd).await,
        Command::Chart(cmd) => handle_chart(&config, &cmd).await,
        Command::Downsample(cmd) => handle_downsample(&config, &cmd).await,
        Command::Fetch(cmd) => handle_fetch(&config, cmd).await,
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn payload_source(config: &Config, args: &SourceArgs) -> anyhow::Result<Box<dyn PayloadSource>> {
    Ok(match &args.data {
        Some(dir) => Box::new(FileSource::new(dir)),
        None => Box::new(ApiClient::new(&config.api)?),
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_insights(title: &str, insights: &[String]) {
    println!("{title}");
    for insight in insights {
        println!("  - {insight}");
    }
}

fn warn_inconsistent_stints(race_pace: &RacePaceResult) {
    for driver in &race_pace.drivers {
        if let Err(e) = driver.validate_stints() {
            warn!(error = %e, "race pace payload has inconsistent stints");
        }
    }
}

fn optional_payload<T>(name: &str, result: pitwall::Result<T>) -> Option<T> {
    match result {
        Ok(payload) => Some(payload),
        Err(e) if e.is_not_found() => {
            debug!(payload = name, "not available for this session");
            None
        }
        Err(e) => {
            warn!(payload = name, error = %e, "payload unavailable");
            None
        }
    }
}

async fn handle_insights(config: &Config, cmd: &InsightsCommand) -> anyhow::Result<()> {
    let engine = InsightEngine::new(config.insights.clone());
    let source = payload_source(config, &cmd.source)?;

    if let Some(chart) = cmd.target.chart() {
        let comparison = source.telemetry(&cmd.source.compare_request()?).await?;
        let insights = engine.telemetry(chart, &comparison);
        if cmd.json {
            print_json(&insights)?;
        } else {
            print_insights(&InsightKind::from(chart).to_string(), &insights);
        }
    } else if cmd.target == InsightTarget::RacePace {
        let key = cmd.source.session_key()?;
        let race_pace = source.race_pace(&key, &cmd.source.drivers()).await?;
        warn_inconsistent_stints(&race_pace);
        let insights = engine.race_pace(&race_pace);
        if cmd.json {
            print_json(&insights)?;
        } else {
            print_insights("Race pace", &insights);
        }
    } else {
        let comparison = source.telemetry(&cmd.source.compare_request()?).await?;
        let report = engine.telemetry_report(&comparison);
        if cmd.json {
            print_json(&report)?;
        } else {
            print_insights("Speed", &report.speed);
            print_insights("Throttle & brake", &report.throttle_brake);
            print_insights("Gear", &report.gear);
            print_insights("Delta", &report.delta);
        }
    }
    Ok(())
}

async fn handle_story(config: &Config, cmd: &StoryCommand) -> anyhow::Result<()> {
    let (driver_a, driver_b) = cmd.source.driver_pair()?;
    let key = cmd.source.session_key()?;
    let source = payload_source(config, &cmd.source)?;
    let drivers = [driver_a.clone(), driver_b.clone()];

    let (race_pace, strategy, positions) = tokio::join!(
        source.race_pace(&key, &drivers),
        source.strategy(&key),
        source.positions(&key),
    );

    // A missing payload only removes the events derived from it.
    let race_pace = optional_payload("race pace", race_pace);
    let strategy = optional_payload("strategy", strategy);
    let positions = optional_payload("positions", positions).unwrap_or_default();

    let events = race_story(
        race_pace.as_ref(),
        strategy.as_ref(),
        &positions,
        &driver_a,
        &driver_b,
    );

    if cmd.json {
        return print_json(&events);
    }
    if events.is_empty() {
        println!("Story data not available for this session");
    }
    for event in &events {
        let marker = if event.highlight { "*" } else { " " };
        println!("{marker} [{}] {}", event.lap, event.title);
        println!("    {}", event.content);
    }
    Ok(())
}

async fn handle_sectors(config: &Config, cmd: &SectorsCommand) -> anyhow::Result<()> {
    let source = payload_source(config, &cmd.source)?;
    let comparison = source.telemetry(&cmd.source.compare_request()?).await?;

    let Some(rows) = comparison_sectors(&comparison) else {
        println!("Sector times not available");
        return Ok(());
    };
    if cmd.json {
        return print_json(&rows);
    }

    println!(
        "{:<6} {:>10} {:>10} {:>8}",
        "",
        comparison.driver_a.driver,
        comparison.driver_b.driver,
        "Delta"
    );
    for row in &rows {
        println!(
            "{:<6} {:>10} {:>10} {:>8}",
            row.name,
            format_sector_time(row.a),
            format_sector_time(row.b),
            row.formatted_delta()
        );
    }
    Ok(())
}

async fn handle_chart(config: &Config, cmd: &ChartCommand) -> anyhow::Result<()> {
    let source = payload_source(config, &cmd.source)?;
    let comparison = source.telemetry(&cmd.source.compare_request()?).await?;

    let points = cmd.points.unwrap_or(config.telemetry.align_points);
    let target = cmd.target.unwrap_or(config.telemetry.downsample_target);
    let mut chart = chart_data(&comparison, points, config.telemetry.brake_percentage_threshold);
    if chart.rows.is_empty() {
        warn!("laps do not overlap, no chart rows");
    }
    chart.rows = lttb(&chart.rows, target, |row| Some(row.speed_a)).into_owned();
    print_json(&chart)
}

async fn handle_downsample(config: &Config, cmd: &DownsampleCommand) -> anyhow::Result<()> {
    let values: Vec<Value> = read_payload(&cmd.input).await?;
    let target = cmd.target.unwrap_or(config.telemetry.downsample_target);
    let sampled = downsample_json(&values, target, &cmd.field);

    match &cmd.output {
        Some(path) => write_payload(path, sampled.as_ref())
            .await
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print_json(sampled.as_ref())?,
    }
    Ok(())
}

async fn handle_fetch(config: &Config, cmd: FetchCommand) -> anyhow::Result<()> {
    match cmd {
        FetchCommand::Health => print_json(&ApiClient::new(&config.api)?.health().await?),
        FetchCommand::Seasons => print_json(&ApiClient::new(&config.api)?.seasons().await?),
        FetchCommand::Events { season } => {
            print_json(&ApiClient::new(&config.api)?.events(season).await?)
        }
        FetchCommand::Sessions { season, event } => {
            print_json(&ApiClient::new(&config.api)?.sessions(season, &event).await?)
        }
        FetchCommand::Drivers(args) => {
            let key = args.session_key()?;
            print_json(&ApiClient::new(&config.api)?.drivers(&key).await?)
        }
        FetchCommand::TrackEvolution(args) => {
            let key = args.session_key()?;
            print_json(&ApiClient::new(&config.api)?.track_evolution(&key).await?)
        }
        FetchCommand::Telemetry {
            source: args,
            align,
            target,
        } => {
            let source = payload_source(config, &args)?;
            let mut comparison = source.telemetry(&args.compare_request()?).await?;
            if let Some(points) = align {
                match align_comparison(&comparison, points) {
                    Some(aligned) => comparison = aligned,
                    None => warn!("laps do not overlap, printing raw samples"),
                }
            }
            if let Some(target) = target {
                for lap in [&mut comparison.driver_a, &mut comparison.driver_b] {
                    lap.data = downsample_telemetry(&lap.data, target, TelemetryChannel::Speed)
                        .into_owned();
                }
            }
            print_json(&comparison)
        }
        FetchCommand::RacePace(args) => {
            let source = payload_source(config, &args)?;
            let race_pace = source.race_pace(&args.session_key()?, &args.drivers()).await?;
            warn_inconsistent_stints(&race_pace);
            print_json(&race_pace)
        }
        FetchCommand::Strategy(args) => {
            let source = payload_source(config, &args)?;
            print_json(&source.strategy(&args.session_key()?).await?)
        }
        FetchCommand::Positions(args) => {
            let source = payload_source(config, &args)?;
            print_json(&source.positions(&args.session_key()?).await?)
        }
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                print_json(config)?;
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[API]");
                println!("  Base URL:             {}", config.api.base_url);
                println!("  Timeout (s):          {}", config.api.timeout_secs);
                println!();
                println!("[Insights]");
                println!("  Max insights:         {}", config.insights.max_insights);
                println!(
                    "  Top speed (km/h):     {}",
                    config.insights.top_speed_threshold_kmh
                );
                println!(
                    "  Corner speed (km/h):  {}",
                    config.insights.corner_speed_threshold_kmh
                );
                println!(
                    "  Brake distance (m):   {}",
                    config.insights.brake_distance_threshold_m
                );
                println!("  Full throttle (%):    {}", config.insights.full_throttle_pct);
                println!(
                    "  Delta advantage (s):  {}",
                    config.insights.delta_advantage_threshold_s
                );
                println!("  Min stint laps:       {}", config.insights.min_stint_laps);
                println!();
                println!("[Telemetry]");
                println!(
                    "  Brake threshold (%):  {}",
                    config.telemetry.brake_percentage_threshold
                );
                println!(
                    "  Downsample target:    {}",
                    config.telemetry.downsample_target
                );
                println!("  Align points:         {}", config.telemetry.align_points);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
