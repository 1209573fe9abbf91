//! Race narrative for two drivers: the start, every pit stop of either
//! driver in lap order, and the result.
//!
//! Each payload is optional. Events whose inputs are missing are left out,
//! so any combination of payloads yields a (possibly empty) timeline.

use tracing::{debug, trace};

use crate::format::format_gap;
use crate::model::{Compound, PositionData, RacePaceResult, StoryEvent, StrategyData, TireStint};

/// A pit stop as shown on the timeline.
#[derive(Debug, Clone, PartialEq)]
struct StopEvent<'a> {
    driver: &'a str,
    lap: u32,
    compound: Compound,
    duration: Option<f64>,
}

/// Build the race story for `driver_a` and `driver_b`.
///
/// ```
/// use pitwall::story::race_story;
///
/// assert!(race_story(None, None, &[], "VER", "HAM").is_empty());
/// ```
#[must_use]
pub fn race_story(
    race_pace: Option<&RacePaceResult>,
    strategy: Option<&StrategyData>,
    positions: &[PositionData],
    driver_a: &str,
    driver_b: &str,
) -> Vec<StoryEvent> {
    let mut events = Vec::new();

    if let Some(start) = start_event(positions, driver_a, driver_b) {
        events.push(start);
    }

    if let Some(strategy) = strategy {
        events.extend(pit_stops(strategy, driver_a, driver_b).into_iter().map(|stop| {
            let mut content = format!("{} pits for {}.", stop.driver, compound_label(stop.compound));
            if let Some(duration) = stop.duration.filter(|d| d.is_finite() && *d > 0.0) {
                content.push_str(&format!(" Stationary {duration:.1}s."));
            }
            StoryEvent {
                lap: format!("Lap {}", stop.lap),
                title: format!("{} Pit Stop", stop.driver),
                content,
                highlight: stop.driver == driver_a,
            }
        }));
    }

    if let Some(finish) = race_pace.and_then(finish_event) {
        events.push(finish);
    }

    trace!(count = events.len(), "built race story");
    events
}

fn compound_label(compound: Compound) -> &'static str {
    if compound.is_known() {
        compound.as_str()
    } else {
        "new tires"
    }
}

fn starting_position(positions: &[PositionData], driver: &str) -> String {
    positions
        .iter()
        .find(|p| p.driver == driver)
        .and_then(|p| {
            p.position_on_lap(1)
                .or_else(|| p.positions.first().map(|first| first.position).filter(|pos| *pos > 0))
        })
        .map_or_else(|| "?".to_string(), |pos| pos.to_string())
}

fn start_event(positions: &[PositionData], driver_a: &str, driver_b: &str) -> Option<StoryEvent> {
    if positions.is_empty() {
        return None;
    }
    Some(StoryEvent {
        lap: "Start".to_string(),
        title: "Lights Out".to_string(),
        content: format!(
            "{driver_a} starts P{}, {driver_b} starts P{}. The race begins.",
            starting_position(positions, driver_a),
            starting_position(positions, driver_b)
        ),
        highlight: true,
    })
}

fn finish_event(race_pace: &RacePaceResult) -> Option<StoryEvent> {
    let classified = race_pace.classified();
    let [winner, second, ..] = classified.as_slice() else {
        return None;
    };
    Some(StoryEvent {
        lap: "Finish".to_string(),
        title: "Checkered Flag".to_string(),
        content: format!(
            "{} takes the win, finishing {} ahead of {}.",
            winner.driver,
            format_gap(second.total_race_time - winner.total_race_time),
            second.driver
        ),
        highlight: true,
    })
}

/// Pit stops of the two drivers, sorted by lap. A driver's explicit stop
/// records win; a driver without any has stops inferred from stint
/// boundaries.
fn pit_stops<'a>(strategy: &'a StrategyData, driver_a: &str, driver_b: &str) -> Vec<StopEvent<'a>> {
    let involved = |driver: &str| driver == driver_a || driver == driver_b;
    let stints: Vec<&TireStint> = strategy.stints.iter().filter(|s| involved(&s.driver)).collect();

    let mut stops: Vec<StopEvent<'a>> = strategy
        .pit_stops
        .iter()
        .filter(|p| involved(&p.driver))
        .map(|p| StopEvent {
            driver: &p.driver,
            lap: p.lap,
            compound: p
                .compound
                .filter(|c| c.is_known())
                .unwrap_or_else(|| fitted_compound(&stints, &p.driver, p.lap)),
            duration: p.duration,
        })
        .collect();

    let inferred: Vec<&TireStint> = stints
        .iter()
        .copied()
        .filter(|s| !stops.iter().any(|stop| stop.driver == s.driver))
        .collect();
    if !inferred.is_empty() {
        debug!(stints = inferred.len(), "inferring pit stops from stints");
        stops.extend(stops_from_stints(&inferred));
    }

    stops.sort_by_key(|stop| stop.lap);
    stops
}

/// Compound of the stint `driver` started on `lap` or the lap after.
fn fitted_compound(stints: &[&TireStint], driver: &str, lap: u32) -> Compound {
    let next = lap.checked_add(1);
    stints
        .iter()
        .find(|s| s.driver == driver && (s.start_lap == lap || Some(s.start_lap) == next))
        .map_or(Compound::Unknown, |s| s.compound)
}

/// Each transition from stint N to stint N+1 is a stop on N+1's first lap.
fn stops_from_stints<'a>(stints: &[&'a TireStint]) -> Vec<StopEvent<'a>> {
    let mut drivers: Vec<&str> = Vec::new();
    for stint in stints {
        if !drivers.contains(&stint.driver.as_str()) {
            drivers.push(&stint.driver);
        }
    }

    let mut stops = Vec::new();
    for driver in drivers {
        let mut own: Vec<&TireStint> = stints.iter().copied().filter(|s| s.driver == driver).collect();
        own.sort_by_key(|s| s.stint_number);
        stops.extend(own.into_iter().skip(1).map(|s| StopEvent {
            driver: &s.driver,
            lap: s.start_lap,
            compound: s.compound,
            duration: None,
        }));
    }
    stops
}
