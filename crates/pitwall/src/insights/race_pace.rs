//! Race pace insights: result gap, tire management, fastest lap and stops.

use tracing::debug;

use super::{InsightEngine, InsightKind, RACE_PACE_UNAVAILABLE};
use crate::format::{format_deg_rate, format_lap_time};
use crate::model::{DriverRacePace, LapRecord, RacePaceResult, StintSummary};

impl InsightEngine {
    /// Insights for the race pace chart.
    #[must_use]
    pub fn race_pace(&self, race_pace: &RacePaceResult) -> Vec<String> {
        if race_pace.drivers.is_empty() {
            debug!("race pace payload has no drivers");
            return vec![RACE_PACE_UNAVAILABLE.to_string()];
        }
        let mut insights = Vec::new();

        if let [first, second, ..] = race_pace.classified().as_slice() {
            insights.push(format!(
                "{} finished {:.1}s ahead of {}",
                first.driver,
                second.total_race_time - first.total_race_time,
                second.driver
            ));
        }

        if let Some((driver, stint)) = self.best_tire_management(&race_pace.drivers) {
            insights.push(format!(
                "Best tire management: {} on {} ({})",
                driver.driver,
                stint.compound,
                format_deg_rate(stint.deg_rate)
            ));
        }

        if let Some((driver, lap)) = fastest_lap(&race_pace.drivers) {
            insights.push(format!(
                "Fastest lap: {} on lap {} ({})",
                driver.driver,
                lap.lap,
                format_lap_time(lap.lap_time)
            ));
        }

        if race_pace.drivers.len() >= 2 {
            let stops: Vec<String> = race_pace
                .drivers
                .iter()
                .map(|d| format!("{} {}", d.driver, d.pit_stop_count()))
                .collect();
            insights.push(format!("Pit stops: {}", stops.join(", ")));
        }

        self.finish(InsightKind::RacePace, insights)
    }

    /// The stint with the flattest non-zero degradation among stints long
    /// enough to be meaningful. Ties keep the first stint found.
    fn best_tire_management<'a>(
        &self,
        drivers: &'a [DriverRacePace],
    ) -> Option<(&'a DriverRacePace, &'a StintSummary)> {
        drivers
            .iter()
            .flat_map(|d| d.stints.iter().map(move |s| (d, s)))
            .filter(|(_, s)| s.total_laps >= self.config.min_stint_laps && s.deg_rate.abs() > 0.0)
            .fold(None, |best, candidate| match best {
                Some((_, b)) if candidate.1.deg_rate.abs() >= b.deg_rate.abs() => best,
                _ => Some(candidate),
            })
    }
}

/// The quickest non-outlier lap across all drivers. Ties keep the first.
fn fastest_lap(drivers: &[DriverRacePace]) -> Option<(&DriverRacePace, &LapRecord)> {
    drivers
        .iter()
        .flat_map(|d| d.clean_laps().map(move |l| (d, l)))
        .filter(|(_, l)| l.lap_time.is_finite() && l.lap_time > 0.0)
        .fold(None, |best, candidate| match best {
            Some((_, b)) if candidate.1.lap_time >= b.lap_time => best,
            _ => Some(candidate),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InsightConfig;
    use crate::insights::race_pace_insights;
    use crate::model::Compound;

    fn lap(lap: u32, lap_time: f64, is_outlier: bool) -> LapRecord {
        LapRecord {
            lap,
            lap_time,
            is_outlier,
            ..LapRecord::default()
        }
    }

    fn stint(number: u32, compound: Compound, total_laps: u32, deg_rate: f64) -> StintSummary {
        StintSummary {
            stint_number: number,
            compound,
            total_laps,
            deg_rate,
            ..StintSummary::default()
        }
    }

    fn race() -> RacePaceResult {
        RacePaceResult {
            drivers: vec![
                DriverRacePace {
                    driver: "HAM".to_string(),
                    total_race_time: 5412.74,
                    laps: vec![lap(1, 95.2, false), lap(40, 78.4, true), lap(41, 79.912, false)],
                    stints: vec![
                        stint(1, Compound::Medium, 20, 0.081),
                        stint(2, Compound::Hard, 3, 0.001),
                        stint(3, Compound::Hard, 30, 0.032),
                    ],
                    ..DriverRacePace::default()
                },
                DriverRacePace {
                    driver: "VER".to_string(),
                    total_race_time: 5400.0,
                    laps: vec![lap(1, 94.1, false), lap(52, 80.5, false)],
                    stints: vec![
                        stint(1, Compound::Medium, 25, 0.0),
                        stint(2, Compound::Hard, 32, -0.032),
                    ],
                    ..DriverRacePace::default()
                },
            ],
            total_laps: 57,
            ..RacePaceResult::default()
        }
    }

    #[test]
    fn test_race_pace_insights() {
        assert_eq!(
            race_pace_insights(&race()),
            vec![
                "VER finished 12.7s ahead of HAM".to_string(),
                "Best tire management: HAM on HARD (+0.032s/lap)".to_string(),
                "Fastest lap: HAM on lap 41 (1:19.912)".to_string(),
                "Pit stops: HAM 2, VER 1".to_string(),
            ]
        );
    }

    #[test]
    fn test_race_pace_insights_deterministic() {
        let pace = race();
        let first = race_pace_insights(&pace);
        assert_eq!(first, race_pace_insights(&pace));
        assert_eq!(first, race_pace_insights(&pace.clone()));
    }

    #[test]
    fn test_short_stints_ignored() {
        let engine = InsightEngine::new(InsightConfig {
            min_stint_laps: 2,
            ..InsightConfig::default()
        });
        let insights = engine.race_pace(&race());
        assert_eq!(insights[1], "Best tire management: HAM on HARD (+0.001s/lap)");
    }

    #[test]
    fn test_single_driver() {
        let mut race = race();
        race.drivers.truncate(1);
        let insights = race_pace_insights(&race);
        assert_eq!(
            insights,
            vec![
                "Best tire management: HAM on HARD (+0.032s/lap)".to_string(),
                "Fastest lap: HAM on lap 41 (1:19.912)".to_string(),
            ]
        );
    }

    #[test]
    fn test_no_qualifying_stint() {
        let race = RacePaceResult {
            drivers: vec![DriverRacePace {
                driver: "SAI".to_string(),
                stints: vec![stint(1, Compound::Soft, 4, 0.2)],
                ..DriverRacePace::default()
            }],
            ..RacePaceResult::default()
        };
        assert!(race_pace_insights(&race).is_empty());
    }

    #[test]
    fn test_empty_race_pace() {
        assert_eq!(
            race_pace_insights(&RacePaceResult::default()),
            vec![RACE_PACE_UNAVAILABLE.to_string()]
        );
    }

    #[test]
    fn test_fastest_lap_skips_outliers() {
        let race = race();
        let (driver, lap) = fastest_lap(&race.drivers).unwrap();
        assert_eq!(driver.driver, "HAM");
        assert_eq!(lap.lap, 41);
    }
}
