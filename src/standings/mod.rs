//! League standings.
//!
//! A table is a derived snapshot: it is rebuilt from the full set of completed
//! matches on every call and never updated incrementally.

mod tiebreak;

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CompetitionError;
use crate::models::{
    Fixture, HeadToHeadMode, PointsScheme, StandingsRow, Team, TeamId, TieBreaker,
};

/// How a table is scored and ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRules {
    #[serde(default)]
    pub points: PointsScheme,

    /// Applied after points, before the team-id fallback
    #[serde(default = "default_tie_breakers")]
    pub tie_breakers: Vec<TieBreaker>,

    #[serde(default)]
    pub head_to_head: HeadToHeadMode,

    /// Number of recent results kept in each row's form
    #[serde(default = "default_form_window")]
    pub form_window: usize,
}

fn default_tie_breakers() -> Vec<TieBreaker> {
    vec![
        TieBreaker::GoalDifference,
        TieBreaker::GoalsFor,
        TieBreaker::HeadToHead,
    ]
}

fn default_form_window() -> usize {
    5
}

impl Default for StandingsRules {
    fn default() -> Self {
        Self {
            points: PointsScheme::default(),
            tie_breakers: default_tie_breakers(),
            head_to_head: HeadToHeadMode::default(),
            form_window: default_form_window(),
        }
    }
}

impl StandingsRules {
    /// Builder method to set the points scheme.
    pub fn with_points(mut self, points: PointsScheme) -> Self {
        self.points = points;
        self
    }

    /// Builder method to replace the tie-break chain.
    pub fn with_tie_breakers(mut self, tie_breakers: Vec<TieBreaker>) -> Self {
        self.tie_breakers = tie_breakers;
        self
    }

    /// Builder method to set the head-to-head comparison.
    pub fn with_head_to_head(mut self, mode: HeadToHeadMode) -> Self {
        self.head_to_head = mode;
        self
    }

    /// Builder method to set the form window.
    pub fn with_form_window(mut self, window: usize) -> Self {
        self.form_window = window;
        self
    }

    /// Validate the rules.
    pub fn validate(&self) -> Result<(), CompetitionError> {
        let mut seen = HashSet::new();
        for rule in &self.tie_breakers {
            if !seen.insert(rule) {
                return Err(CompetitionError::ConfigurationError(format!(
                    "tie-breaker '{}' listed more than once",
                    rule
                )));
            }
        }

        let p = &self.points;
        if p.win < p.draw || p.draw < p.loss {
            return Err(CompetitionError::ConfigurationError(format!(
                "points scheme must satisfy win >= draw >= loss, got {}/{}/{}",
                p.win, p.draw, p.loss
            )));
        }

        Ok(())
    }
}

/// A fully ordered league table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsTable {
    /// Rows in position order
    pub rows: Vec<StandingsRow>,
}

impl StandingsTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for a team.
    pub fn row(&self, team_id: &TeamId) -> Option<&StandingsRow> {
        self.rows.iter().find(|r| &r.team_id == team_id)
    }

    /// Ids of the top `n` teams, best first.
    pub fn top(&self, n: usize) -> Vec<&TeamId> {
        self.rows.iter().take(n).map(|r| &r.team_id).collect()
    }

    /// The top `n` teams as a seeded list, best first, for a knockout stage.
    pub fn qualifiers(&self, teams: &[Team], n: usize) -> Result<Vec<Team>, CompetitionError> {
        if n > self.rows.len() {
            return Err(CompetitionError::ConfigurationError(format!(
                "cannot qualify {} teams from a table of {}",
                n,
                self.rows.len()
            )));
        }

        self.top(n)
            .into_iter()
            .map(|id| {
                teams.iter().find(|t| &t.id == id).cloned().ok_or_else(|| {
                    CompetitionError::IntegrityError(format!("team {} is not in the roster", id))
                })
            })
            .collect()
    }
}

/// Builds league tables from completed matches.
#[derive(Debug, Clone, Default)]
pub struct StandingsEngine {
    rules: StandingsRules,
}

impl StandingsEngine {
    pub fn new(rules: StandingsRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &StandingsRules {
        &self.rules
    }

    /// Compute the table for `teams` from `matches`.
    ///
    /// Only completed matches with both scores count. Every team id referenced
    /// by any match must belong to `teams`.
    pub fn compute(
        &self,
        teams: &[Team],
        matches: &[Fixture],
    ) -> Result<StandingsTable, CompetitionError> {
        self.rules.validate()?;

        let mut rows: BTreeMap<TeamId, StandingsRow> = BTreeMap::new();
        for team in teams {
            if rows
                .insert(team.id.clone(), StandingsRow::new(team.id.clone()))
                .is_some()
            {
                return Err(CompetitionError::ValidationError(format!(
                    "duplicate team id {}",
                    team.id
                )));
            }
        }

        for fixture in matches {
            for team_id in [&fixture.home_team_id, &fixture.away_team_id]
                .into_iter()
                .flatten()
            {
                if !rows.contains_key(team_id) {
                    return Err(CompetitionError::IntegrityError(format!(
                        "match {} references unknown team {}",
                        fixture.id, team_id
                    )));
                }
            }
        }

        let mut counted: Vec<&Fixture> = matches.iter().filter(|f| f.counts_for_table()).collect();
        if let Some(f) = counted.iter().find(|f| f.home_team_id == f.away_team_id) {
            return Err(CompetitionError::ValidationError(format!(
                "match {} has the same team on both sides",
                f.id
            )));
        }
        counted.sort_by(|a, b| {
            (a.kickoff, a.leg, a.round_number, &a.id)
                .cmp(&(b.kickoff, b.leg, b.round_number, &b.id))
        });

        for fixture in &counted {
            let (Some(home), Some(away), Some(hs), Some(aws)) = (
                &fixture.home_team_id,
                &fixture.away_team_id,
                fixture.home_score,
                fixture.away_score,
            ) else {
                continue;
            };

            for (team, scored, conceded) in [(home, hs, aws), (away, aws, hs)] {
                if let Some(row) = rows.get_mut(team) {
                    row.record(scored, conceded, &self.rules.points)?;
                }
            }
        }

        for row in rows.values_mut() {
            let results: Vec<_> = counted
                .iter()
                .filter_map(|f| f.result_for(&row.team_id))
                .collect();
            let skip = results.len().saturating_sub(self.rules.form_window);
            row.form = results[skip..].to_vec();
        }

        let order = tiebreak::rank(&rows, &counted, &self.rules);
        let mut ordered = Vec::with_capacity(order.len());
        for (i, team_id) in order.iter().enumerate() {
            if let Some(mut row) = rows.remove(team_id) {
                row.position = i as u32 + 1;
                ordered.push(row);
            }
        }

        debug!(
            "Computed standings for {} teams from {} completed matches",
            ordered.len(),
            counted.len()
        );

        Ok(StandingsTable { rows: ordered })
    }
}
