//! # Competition Engine
//!
//! Fixture scheduling, league standings and knockout brackets for tournament
//! administration.
//!
//! ## Architecture
//!
//! - **models**: Plain value types (teams, fixtures, standings rows, bracket nodes)
//! - **calendar**: Injectable "today" and date arithmetic
//! - **schedule**: Round-robin fixture generation (circle method)
//! - **standings**: League tables with a configurable tie-break chain
//! - **bracket**: Seeded single-elimination brackets and their progression
//! - **config**: Configuration loading and validation
//!
//! Every engine call is a synchronous computation over caller-supplied data.
//! Persistence, transport and concurrency control around a stored bracket
//! belong to the caller.

pub mod bracket;
pub mod calendar;
pub mod config;
pub mod error;
pub mod models;
pub mod schedule;
pub mod standings;

pub use error::CompetitionError;
pub use models::*;

use chrono::NaiveTime;

/// Parse a 24-hour kickoff time in strict "HH:MM" form (e.g., "15:00", "09:30").
pub fn parse_kickoff_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    let bytes = s.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }

    NaiveTime::parse_from_str(s, "%H:%M").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::KnockoutBracketBuilder;
    use crate::calendar::FixedCalendar;
    use crate::schedule::{FixtureGenerator, ScheduleOptions};
    use crate::standings::{StandingsEngine, StandingsRules};
    use chrono::NaiveDate;

    #[test]
    fn test_parse_kickoff_time() {
        assert_eq!(
            parse_kickoff_time("15:00"),
            NaiveTime::from_hms_opt(15, 0, 0)
        );
        assert_eq!(
            parse_kickoff_time(" 09:30 "),
            NaiveTime::from_hms_opt(9, 30, 0)
        );
        assert_eq!(parse_kickoff_time("00:00"), NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(
            parse_kickoff_time("23:59"),
            NaiveTime::from_hms_opt(23, 59, 0)
        );
    }

    #[test]
    fn test_parse_kickoff_time_invalid() {
        assert_eq!(parse_kickoff_time("24:00"), None);
        assert_eq!(parse_kickoff_time("9:30"), None);
        assert_eq!(parse_kickoff_time("15:00:00"), None);
        assert_eq!(parse_kickoff_time("ab:cd"), None);
        assert_eq!(parse_kickoff_time(""), None);
    }

    /// League stage feeding a knockout stage, start to finish.
    #[test]
    fn test_league_to_knockout_flow() {
        let teams: Vec<Team> = ["ash", "birch", "cedar", "elm", "fir", "oak"]
            .iter()
            .map(|id| Team::new(*id, id.to_uppercase()))
            .collect();

        let calendar = FixedCalendar::new(NaiveDate::from_ymd_opt(2026, 2, 2).unwrap());
        let options = ScheduleOptions::new("15:00").with_weekends_only(true);
        let mut fixtures = FixtureGenerator::with_calendar(calendar)
            .generate(&teams, &options)
            .unwrap();
        assert_eq!(fixtures.len(), 15);

        // Lower index in the roster always wins 1-0.
        let rank = |id: &TeamId| teams.iter().position(|t| &t.id == id).unwrap();
        let updates: Vec<ResultUpdate> = fixtures
            .iter()
            .map(|f| {
                let home = rank(f.home_team_id.as_ref().unwrap());
                let away = rank(f.away_team_id.as_ref().unwrap());
                let (h, a) = if home < away { (1, 0) } else { (0, 1) };
                ResultUpdate::completed(f.id.clone(), h, a)
            })
            .collect();
        apply_result_updates(&mut fixtures, &updates).unwrap();

        let table = StandingsEngine::new(StandingsRules::default())
            .compute(&teams, &fixtures)
            .unwrap();
        let order: Vec<&str> = table.rows.iter().map(|r| r.team_id.as_str()).collect();
        assert_eq!(order, vec!["ash", "birch", "cedar", "elm", "fir", "oak"]);

        let seeded = table.qualifiers(&teams, 4).unwrap();
        let mut bracket = KnockoutBracketBuilder::new()
            .with_third_place(true)
            .build(&seeded)
            .unwrap();

        loop {
            let Some(node) = bracket.playable_nodes().first().map(|n| n.id) else {
                break;
            };
            let (home, away) = {
                let n = bracket.node(node).unwrap();
                (
                    n.home.team_id.clone().unwrap(),
                    n.away.team_id.clone().unwrap(),
                )
            };
            let winner = if rank(&home) < rank(&away) { home } else { away };
            bracket.advance(node, &winner).unwrap();
        }

        assert_eq!(bracket.status(), BracketStatus::Complete);
        assert_eq!(bracket.champion(), Some(&TeamId::from("ash")));
        assert_eq!(bracket.runner_up(), Some(&TeamId::from("birch")));
        assert_eq!(bracket.third_place_winner(), Some(&TeamId::from("cedar")));
    }
}
