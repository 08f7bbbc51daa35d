//! Round-robin fixture generation.
//!
//! Uses the circle method: index 0 stays fixed while every other participant
//! rotates one place per round. An odd field gets a virtual BYE participant
//! whose pairings are dropped.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::{next_match_day, Calendar, SystemCalendar};
use crate::error::CompetitionError;
use crate::models::{Fixture, Team};
use crate::parse_kickoff_time;

/// Scheduling parameters for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOptions {
    /// Stage key mixed into every fixture ID
    pub stage: String,

    /// First possible match day; the calendar's today when absent
    pub start_date: Option<NaiveDate>,

    /// Kickoff time, "HH:MM" 24-hour
    pub kickoff_time: String,

    /// Only schedule on Saturdays and Sundays
    pub weekends_only: bool,

    /// Play a second, mirrored leg
    pub home_and_away: bool,

    /// Venue attached to every fixture
    pub venue: Option<String>,

    /// Gap between consecutive rounds
    pub days_between_rounds: u32,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            stage: "league".to_string(),
            start_date: None,
            kickoff_time: "15:00".to_string(),
            weekends_only: false,
            home_and_away: false,
            venue: None,
            days_between_rounds: 7,
        }
    }
}

impl ScheduleOptions {
    pub fn new(kickoff_time: impl Into<String>) -> Self {
        Self {
            kickoff_time: kickoff_time.into(),
            ..Self::default()
        }
    }

    /// Builder method to set the stage key.
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = stage.into();
        self
    }

    /// Builder method to set start date.
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Builder method to restrict match days to weekends.
    pub fn with_weekends_only(mut self, weekends_only: bool) -> Self {
        self.weekends_only = weekends_only;
        self
    }

    /// Builder method to enable the return leg.
    pub fn with_home_and_away(mut self, home_and_away: bool) -> Self {
        self.home_and_away = home_and_away;
        self
    }

    /// Builder method to set venue.
    pub fn with_venue(mut self, venue: String) -> Self {
        self.venue = Some(venue);
        self
    }

    /// Builder method to set the gap between rounds.
    pub fn with_days_between_rounds(mut self, days: u32) -> Self {
        self.days_between_rounds = days;
        self
    }
}

/// Builds complete round-robin schedules.
#[derive(Debug, Clone, Default)]
pub struct FixtureGenerator<C = SystemCalendar> {
    calendar: C,
}

impl FixtureGenerator<SystemCalendar> {
    pub fn new() -> Self {
        Self {
            calendar: SystemCalendar,
        }
    }
}

impl<C: Calendar> FixtureGenerator<C> {
    pub fn with_calendar(calendar: C) -> Self {
        Self { calendar }
    }

    /// Generate every fixture of the stage.
    ///
    /// Inputs are validated up front; either the whole schedule is returned
    /// or nothing is.
    pub fn generate(
        &self,
        teams: &[Team],
        options: &ScheduleOptions,
    ) -> Result<Vec<Fixture>, CompetitionError> {
        if teams.len() < 2 {
            return Err(CompetitionError::ConfigurationError(format!(
                "a round robin needs at least 2 teams, got {}",
                teams.len()
            )));
        }

        let kickoff_time = parse_kickoff_time(&options.kickoff_time).ok_or_else(|| {
            CompetitionError::ConfigurationError(format!(
                "invalid kickoff time '{}', expected HH:MM",
                options.kickoff_time
            ))
        })?;

        if options.days_between_rounds == 0 {
            return Err(CompetitionError::ConfigurationError(
                "days between rounds must be greater than 0".to_string(),
            ));
        }

        if options.stage.trim().is_empty() {
            return Err(CompetitionError::ConfigurationError(
                "stage key must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(teams.len());
        for team in teams {
            if !seen.insert(&team.id) {
                return Err(CompetitionError::ValidationError(format!(
                    "duplicate team id {}",
                    team.id
                )));
            }
        }

        let pairings = round_robin_pairings(teams.len());
        let legs: u32 = if options.home_and_away { 2 } else { 1 };
        let rounds_per_leg = pairings.len() as u32;
        let step = u64::from(options.days_between_rounds);
        let overflow = || {
            CompetitionError::ConfigurationError(
                "schedule runs past the last representable date".to_string(),
            )
        };

        let mut working_date = options
            .start_date
            .unwrap_or_else(|| self.calendar.today());
        let mut fixtures =
            Vec::with_capacity(pairings.iter().map(Vec::len).sum::<usize>() * legs as usize);

        for leg in 1..=legs {
            for (round_offset, round) in pairings.iter().enumerate() {
                let round_number = (leg - 1) * rounds_per_leg + round_offset as u32 + 1;
                let match_day = next_match_day(&self.calendar, working_date, options.weekends_only)
                    .ok_or_else(overflow)?;
                let kickoff = match_day.and_time(kickoff_time);

                for &(home, away) in round {
                    let (home, away) = if leg == 2 { (away, home) } else { (home, away) };
                    fixtures.push(
                        Fixture::new(
                            round_number,
                            leg,
                            Some(teams[home].id.clone()),
                            Some(teams[away].id.clone()),
                            kickoff,
                        )
                        .in_stage(&options.stage)
                        .with_venue(options.venue.clone()),
                    );
                }

                working_date = self
                    .calendar
                    .add_days(working_date, step)
                    .ok_or_else(overflow)?;
            }
        }

        debug!(
            "Generated {} fixtures for {} teams over {} rounds",
            fixtures.len(),
            teams.len(),
            rounds_per_leg * legs
        );

        Ok(fixtures)
    }
}

/// Circle-method pairings for `team_count` participants.
///
/// Returns one entry per round, each a list of `(home, away)` indices into the
/// original team list. Pairings against the BYE are already removed.
/// The fixed participant alternates home and away between rounds.
pub fn round_robin_pairings(team_count: usize) -> Vec<Vec<(usize, usize)>> {
    if team_count < 2 {
        return Vec::new();
    }

    let n = team_count + team_count % 2;
    let bye = (n != team_count).then_some(team_count);
    let rotating = n - 1;

    (0..rotating)
        .map(|r| {
            let circle: Vec<usize> = std::iter::once(0)
                .chain((0..rotating).map(|i| 1 + (i + r) % rotating))
                .collect();

            (0..n / 2)
                .filter_map(|i| {
                    let (a, b) = (circle[i], circle[n - 1 - i]);
                    if Some(a) == bye || Some(b) == bye {
                        return None;
                    }
                    if i == 0 && r % 2 == 1 {
                        Some((b, a))
                    } else {
                        Some((a, b))
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::FixedCalendar;
    use crate::models::{group_rounds, TeamId};
    use chrono::{Datelike, NaiveTime, Weekday};
    use std::collections::HashMap;

    fn teams(count: usize) -> Vec<Team> {
        (0..count)
            .map(|i| Team::new(format!("t{}", i), format!("Team {}", i)))
            .collect()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    fn generator() -> FixtureGenerator<FixedCalendar> {
        FixtureGenerator::with_calendar(FixedCalendar::new(monday()))
    }

    fn pair_key(f: &Fixture) -> (TeamId, TeamId) {
        let home = f.home_team_id.clone().unwrap();
        let away = f.away_team_id.clone().unwrap();
        if home < away {
            (home, away)
        } else {
            (away, home)
        }
    }

    fn assert_once_per_round(fixtures: &[Fixture]) {
        for round in group_rounds(fixtures) {
            let mut seen = HashSet::new();
            for f in &round.fixtures {
                assert!(seen.insert(f.home_team_id.clone().unwrap()));
                assert!(seen.insert(f.away_team_id.clone().unwrap()));
            }
        }
    }

    #[test]
    fn test_four_teams_single_leg() {
        let options = ScheduleOptions::new("15:00").with_start_date(monday());
        let fixtures = generator().generate(&teams(4), &options).unwrap();

        assert_eq!(fixtures.len(), 6);
        let rounds = group_rounds(&fixtures);
        assert_eq!(rounds.len(), 3);
        assert!(rounds.iter().all(|r| r.fixtures.len() == 2));

        let mut played: HashMap<TeamId, u32> = HashMap::new();
        for f in &fixtures {
            *played.entry(f.home_team_id.clone().unwrap()).or_default() += 1;
            *played.entry(f.away_team_id.clone().unwrap()).or_default() += 1;
        }
        assert_eq!(played.len(), 4);
        assert!(played.values().all(|&n| n == 3));
        assert_once_per_round(&fixtures);
    }

    #[test]
    fn test_even_field_counts() {
        for n in [2usize, 6, 8, 10] {
            let options = ScheduleOptions::new("19:30").with_start_date(monday());
            let fixtures = generator().generate(&teams(n), &options).unwrap();
            let rounds = group_rounds(&fixtures);

            assert_eq!(fixtures.len(), n * (n - 1) / 2);
            assert_eq!(rounds.len(), n - 1);
            assert!(rounds.iter().all(|r| r.fixtures.len() == n / 2));
            assert_once_per_round(&fixtures);

            let pairs: HashSet<_> = fixtures.iter().map(pair_key).collect();
            assert_eq!(pairs.len(), fixtures.len());
        }
    }

    #[test]
    fn test_odd_field_drops_byes() {
        for n in [3usize, 5, 7, 9] {
            let options = ScheduleOptions::new("15:00").with_start_date(monday());
            let fixtures = generator().generate(&teams(n), &options).unwrap();

            assert_eq!(fixtures.len(), n * (n - 1) / 2);
            assert_eq!(group_rounds(&fixtures).len(), n);
            assert_once_per_round(&fixtures);

            let pairs: HashSet<_> = fixtures.iter().map(pair_key).collect();
            assert_eq!(pairs.len(), n * (n - 1) / 2);
        }
    }

    #[test]
    fn test_home_and_away_mirrors_first_leg() {
        let options = ScheduleOptions::new("15:00")
            .with_start_date(monday())
            .with_home_and_away(true);
        let fixtures = generator().generate(&teams(6), &options).unwrap();

        assert_eq!(fixtures.len(), 30);

        let (first, second): (Vec<_>, Vec<_>) = fixtures.iter().partition(|f| f.leg == 1);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.home_team_id, b.away_team_id);
            assert_eq!(a.away_team_id, b.home_team_id);
            assert_eq!(b.round_number, a.round_number + 5);
        }

        let mut meetings: HashMap<(TeamId, TeamId), u32> = HashMap::new();
        for f in &fixtures {
            *meetings.entry(pair_key(f)).or_default() += 1;
        }
        assert!(meetings.values().all(|&n| n == 2));
    }

    #[test]
    fn test_round_numbers_continue_into_second_leg() {
        let options = ScheduleOptions::new("15:00")
            .with_start_date(monday())
            .with_home_and_away(true);
        let fixtures = generator().generate(&teams(4), &options).unwrap();
        let numbers: Vec<u32> = group_rounds(&fixtures)
            .iter()
            .map(|r| r.round_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_weekends_only() {
        let options = ScheduleOptions::new("15:00")
            .with_start_date(monday())
            .with_weekends_only(true)
            .with_home_and_away(true);
        let fixtures = generator().generate(&teams(7), &options).unwrap();

        assert!(fixtures
            .iter()
            .all(|f| matches!(f.kickoff.weekday(), Weekday::Sat | Weekday::Sun)));
    }

    #[test]
    fn test_five_teams_from_monday_start_on_saturday() {
        let options = ScheduleOptions::new("14:30")
            .with_start_date(monday())
            .with_weekends_only(true);
        let fixtures = generator().generate(&teams(5), &options).unwrap();
        let rounds = group_rounds(&fixtures);

        assert_eq!(rounds[0].date, NaiveDate::from_ymd_opt(2026, 1, 10).unwrap());
        assert_eq!(rounds[1].date, NaiveDate::from_ymd_opt(2026, 1, 17).unwrap());
        assert_eq!(
            rounds[0].fixtures[0].kickoff.time(),
            NaiveTime::from_hms_opt(14, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_rounds_spaced_weekly() {
        let options = ScheduleOptions::new("15:00").with_start_date(monday());
        let fixtures = generator().generate(&teams(4), &options).unwrap();
        let dates: Vec<NaiveDate> = group_rounds(&fixtures).iter().map(|r| r.date).collect();

        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
                NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
                NaiveDate::from_ymd_opt(2026, 1, 19).unwrap(),
            ]
        );
    }

    #[test]
    fn test_custom_round_spacing() {
        let options = ScheduleOptions::new("15:00")
            .with_start_date(monday())
            .with_days_between_rounds(3);
        let fixtures = generator().generate(&teams(4), &options).unwrap();
        let rounds = group_rounds(&fixtures);
        assert_eq!(rounds[2].date, NaiveDate::from_ymd_opt(2026, 1, 11).unwrap());
    }

    #[test]
    fn test_start_date_defaults_to_calendar_today() {
        let options = ScheduleOptions::new("15:00");
        let fixtures = generator().generate(&teams(2), &options).unwrap();
        assert_eq!(fixtures[0].kickoff.date(), monday());
    }

    #[test]
    fn test_venue_attached_to_every_fixture() {
        let options = ScheduleOptions::new("15:00")
            .with_start_date(monday())
            .with_venue("Riverside Ground".to_string());
        let fixtures = generator().generate(&teams(5), &options).unwrap();
        assert!(fixtures
            .iter()
            .all(|f| f.venue.as_deref() == Some("Riverside Ground")));
    }

    #[test]
    fn test_fixture_ids_unique_and_repeatable() {
        let options = ScheduleOptions::new("15:00")
            .with_start_date(monday())
            .with_home_and_away(true);
        let first = generator().generate(&teams(6), &options).unwrap();
        let second = generator().generate(&teams(6), &options).unwrap();

        let ids: HashSet<_> = first.iter().map(|f| f.id.clone()).collect();
        assert_eq!(ids.len(), first.len());
        assert_eq!(first, second);
    }

    #[test]
    fn test_fixed_team_home_count_balanced() {
        let options = ScheduleOptions::new("15:00").with_start_date(monday());
        let fixtures = generator().generate(&teams(8), &options).unwrap();
        let fixed = TeamId::from("t0");
        let home = fixtures
            .iter()
            .filter(|f| f.home_team_id.as_ref() == Some(&fixed))
            .count();
        assert_eq!(home, 4);
    }

    #[test]
    fn test_too_few_teams() {
        let options = ScheduleOptions::new("15:00");
        for n in [0usize, 1] {
            let err = generator().generate(&teams(n), &options).unwrap_err();
            assert!(matches!(err, CompetitionError::ConfigurationError(_)));
        }
    }

    #[test]
    fn test_invalid_kickoff_time() {
        for time in ["25:00", "15h00", "", "12:60"] {
            let options = ScheduleOptions::new(time);
            let err = generator().generate(&teams(4), &options).unwrap_err();
            assert!(matches!(err, CompetitionError::ConfigurationError(_)));
        }
    }

    #[test]
    fn test_duplicate_team_ids() {
        let mut field = teams(3);
        field.push(Team::new("t1", "Impostor"));
        let err = generator()
            .generate(&field, &ScheduleOptions::default())
            .unwrap_err();
        assert!(matches!(err, CompetitionError::ValidationError(_)));
    }

    #[test]
    fn test_zero_round_spacing_rejected() {
        let options = ScheduleOptions::new("15:00").with_days_between_rounds(0);
        let err = generator().generate(&teams(4), &options).unwrap_err();
        assert!(matches!(err, CompetitionError::ConfigurationError(_)));
    }

    #[test]
    fn test_stages_get_distinct_ids() {
        let league = ScheduleOptions::new("15:00").with_start_date(monday());
        let playoff = ScheduleOptions::new("19:00")
            .with_start_date(NaiveDate::from_ymd_opt(2026, 9, 7).unwrap())
            .with_stage("playoff-group");

        let first = generator().generate(&teams(4), &league).unwrap();
        let second = generator().generate(&teams(4), &playoff).unwrap();

        let first_ids: HashSet<_> = first.iter().map(|f| f.id.clone()).collect();
        assert_eq!(first_ids.len(), 6);
        assert!(second.iter().all(|f| !first_ids.contains(&f.id)));

        let again = generator().generate(&teams(4), &league).unwrap();
        assert_eq!(
            again.iter().map(|f| &f.id).collect::<Vec<_>>(),
            first.iter().map(|f| &f.id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_empty_stage_rejected() {
        let options = ScheduleOptions::new("15:00").with_stage(" ");
        let err = generator().generate(&teams(4), &options).unwrap_err();
        assert!(matches!(err, CompetitionError::ConfigurationError(_)));
    }

    #[test]
    fn test_pairings_for_four() {
        let pairings = round_robin_pairings(4);
        assert_eq!(
            pairings,
            vec![
                vec![(0, 3), (1, 2)],
                vec![(1, 0), (2, 3)],
                vec![(0, 2), (3, 1)],
            ]
        );
    }

    #[test]
    fn test_pairings_degenerate() {
        assert!(round_robin_pairings(0).is_empty());
        assert!(round_robin_pairings(1).is_empty());
    }
}
