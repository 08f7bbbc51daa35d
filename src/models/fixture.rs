//! Fixture model: a scheduled or played match between two teams.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{EntityId, FixtureId, FormResult, TeamId};
use crate::error::CompetitionError;

/// Lifecycle status of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Completed,
    Postponed,
    Cancelled,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Scheduled => write!(f, "scheduled"),
            MatchStatus::Live => write!(f, "live"),
            MatchStatus::Completed => write!(f, "completed"),
            MatchStatus::Postponed => write!(f, "postponed"),
            MatchStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A single match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    /// Unique identifier (derived from leg + round + teams)
    pub id: FixtureId,

    /// Round number, 1-based and continuous across legs
    pub round_number: u32,

    /// Leg number (1, or 2 for the return leg)
    pub leg: u32,

    /// Home side; None only for an unresolved knockout slot
    pub home_team_id: Option<TeamId>,

    /// Away side; None only for an unresolved knockout slot
    pub away_team_id: Option<TeamId>,

    /// Scheduled kickoff
    pub kickoff: NaiveDateTime,

    /// Venue, if assigned
    pub venue: Option<String>,

    #[serde(default)]
    pub status: MatchStatus,

    #[serde(default)]
    pub home_score: Option<u32>,

    #[serde(default)]
    pub away_score: Option<u32>,
}

fn fixture_id(
    stage: &str,
    leg: u32,
    round_number: u32,
    home: Option<&TeamId>,
    away: Option<&TeamId>,
) -> FixtureId {
    EntityId::generate(&[
        stage,
        &leg.to_string(),
        &round_number.to_string(),
        home.map_or("tbd", |t| t.as_str()),
        away.map_or("tbd", |t| t.as_str()),
    ])
}

impl Fixture {
    /// Create a new scheduled Fixture with auto-generated ID.
    pub fn new(
        round_number: u32,
        leg: u32,
        home_team_id: Option<TeamId>,
        away_team_id: Option<TeamId>,
        kickoff: NaiveDateTime,
    ) -> Self {
        let id = fixture_id(
            "fixture",
            leg,
            round_number,
            home_team_id.as_ref(),
            away_team_id.as_ref(),
        );

        Self {
            id,
            round_number,
            leg,
            home_team_id,
            away_team_id,
            kickoff,
            venue: None,
            status: MatchStatus::Scheduled,
            home_score: None,
            away_score: None,
        }
    }

    /// Builder method to scope the generated ID to a competition stage.
    pub fn in_stage(mut self, stage: &str) -> Self {
        self.id = fixture_id(
            stage,
            self.leg,
            self.round_number,
            self.home_team_id.as_ref(),
            self.away_team_id.as_ref(),
        );
        self
    }

    /// Builder method to override the generated ID.
    pub fn with_id(mut self, id: FixtureId) -> Self {
        self.id = id;
        self
    }

    /// Builder method to set venue.
    pub fn with_venue(mut self, venue: Option<String>) -> Self {
        self.venue = venue;
        self
    }

    /// Builder method to mark the match completed with a final score.
    pub fn with_result(mut self, home_score: u32, away_score: u32) -> Self {
        self.home_score = Some(home_score);
        self.away_score = Some(away_score);
        self.status = MatchStatus::Completed;
        self
    }

    /// Whether this match takes part in a standings table:
    /// completed, both sides known, both scores recorded.
    pub fn counts_for_table(&self) -> bool {
        self.status == MatchStatus::Completed
            && self.home_team_id.is_some()
            && self.away_team_id.is_some()
            && self.home_score.is_some()
            && self.away_score.is_some()
    }

    /// Whether the given team plays in this match.
    pub fn involves(&self, team_id: &TeamId) -> bool {
        self.home_team_id.as_ref() == Some(team_id) || self.away_team_id.as_ref() == Some(team_id)
    }

    /// Outcome of a counted match from the given team's point of view.
    pub fn result_for(&self, team_id: &TeamId) -> Option<FormResult> {
        if !self.counts_for_table() {
            return None;
        }
        let (home, away) = (self.home_score?, self.away_score?);
        let (own, other) = if self.home_team_id.as_ref() == Some(team_id) {
            (home, away)
        } else if self.away_team_id.as_ref() == Some(team_id) {
            (away, home)
        } else {
            return None;
        };
        Some(FormResult::from_scores(own, other))
    }

    /// Record a result update against this match.
    ///
    /// Scores are replaced wholesale: either both are given or neither.
    /// A completed match needs both scores and both teams.
    pub fn apply_result(&mut self, update: &ResultUpdate) -> Result<(), CompetitionError> {
        if update.match_id != self.id {
            return Err(CompetitionError::IntegrityError(format!(
                "result for match {} applied to match {}",
                update.match_id, self.id
            )));
        }

        if update.home_score.is_some() != update.away_score.is_some() {
            return Err(CompetitionError::ValidationError(format!(
                "match {}: both scores must be supplied together",
                self.id
            )));
        }

        if update.status == MatchStatus::Completed {
            if update.home_score.is_none() {
                return Err(CompetitionError::ValidationError(format!(
                    "match {}: completed result requires scores",
                    self.id
                )));
            }
            if self.home_team_id.is_none() || self.away_team_id.is_none() {
                return Err(CompetitionError::StateError(format!(
                    "match {}: cannot complete a match with an unresolved side",
                    self.id
                )));
            }
        }

        self.status = update.status;
        self.home_score = update.home_score;
        self.away_score = update.away_score;
        Ok(())
    }
}

/// A result update written by the external result-entry process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultUpdate {
    pub match_id: FixtureId,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub status: MatchStatus,
}

impl ResultUpdate {
    /// A final score.
    pub fn completed(match_id: FixtureId, home_score: u32, away_score: u32) -> Self {
        Self {
            match_id,
            home_score: Some(home_score),
            away_score: Some(away_score),
            status: MatchStatus::Completed,
        }
    }
}

/// Apply a batch of result updates.
///
/// All updates are validated against a working copy first; on any error the
/// fixtures are left untouched.
pub fn apply_result_updates(
    fixtures: &mut [Fixture],
    updates: &[ResultUpdate],
) -> Result<(), CompetitionError> {
    let mut working = fixtures.to_vec();

    for update in updates {
        let fixture = working
            .iter_mut()
            .find(|f| f.id == update.match_id)
            .ok_or_else(|| {
                CompetitionError::IntegrityError(format!("unknown match {}", update.match_id))
            })?;
        fixture.apply_result(update)?;
    }

    fixtures.clone_from_slice(&working);
    Ok(())
}

/// Matches sharing a `(leg, round_number)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub leg: u32,
    pub round_number: u32,
    /// Match day, taken from the earliest kickoff in the round
    pub date: NaiveDate,
    pub fixtures: Vec<Fixture>,
}

/// Group fixtures into rounds ordered by `(leg, round_number)`.
pub fn group_rounds(fixtures: &[Fixture]) -> Vec<Round> {
    let mut sorted: Vec<&Fixture> = fixtures.iter().collect();
    sorted.sort_by_key(|f| (f.leg, f.round_number, f.kickoff));

    let mut rounds: Vec<Round> = Vec::new();
    for fixture in sorted {
        match rounds.last_mut() {
            Some(round)
                if round.leg == fixture.leg && round.round_number == fixture.round_number =>
            {
                round.fixtures.push(fixture.clone());
            }
            _ => rounds.push(Round {
                leg: fixture.leg,
                round_number: fixture.round_number,
                date: fixture.kickoff.date(),
                fixtures: vec![fixture.clone()],
            }),
        }
    }

    rounds
}
