//! League table models.

use serde::{Deserialize, Serialize};

use super::TeamId;
use crate::error::CompetitionError;

/// Single-match outcome from one team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "L")]
    Loss,
}

impl FormResult {
    pub fn from_scores(own: u32, other: u32) -> Self {
        match own.cmp(&other) {
            std::cmp::Ordering::Greater => FormResult::Win,
            std::cmp::Ordering::Equal => FormResult::Draw,
            std::cmp::Ordering::Less => FormResult::Loss,
        }
    }
}

impl std::fmt::Display for FormResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormResult::Win => write!(f, "W"),
            FormResult::Draw => write!(f, "D"),
            FormResult::Loss => write!(f, "L"),
        }
    }
}

/// Points awarded per outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsScheme {
    #[serde(default = "default_win_points")]
    pub win: u32,
    #[serde(default = "default_draw_points")]
    pub draw: u32,
    #[serde(default)]
    pub loss: u32,
}

fn default_win_points() -> u32 {
    3
}

fn default_draw_points() -> u32 {
    1
}

impl Default for PointsScheme {
    fn default() -> Self {
        Self {
            win: default_win_points(),
            draw: default_draw_points(),
            loss: 0,
        }
    }
}

impl PointsScheme {
    pub fn points_for(&self, result: FormResult) -> u32 {
        match result {
            FormResult::Win => self.win,
            FormResult::Draw => self.draw,
            FormResult::Loss => self.loss,
        }
    }

    /// Total points for a win/draw/loss record; None when it exceeds `u32`.
    pub fn total(&self, won: u32, drawn: u32, lost: u32) -> Option<u32> {
        self.win
            .checked_mul(won)?
            .checked_add(self.draw.checked_mul(drawn)?)?
            .checked_add(self.loss.checked_mul(lost)?)
    }
}

/// A rule applied to teams still level on every earlier rule.
///
/// Points always rank first and team id always ranks last; these sit between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreaker {
    GoalDifference,
    GoalsFor,
    HeadToHead,
    Wins,
}

impl std::fmt::Display for TieBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TieBreaker::GoalDifference => write!(f, "goal_difference"),
            TieBreaker::GoalsFor => write!(f, "goals_for"),
            TieBreaker::HeadToHead => write!(f, "head_to_head"),
            TieBreaker::Wins => write!(f, "wins"),
        }
    }
}

/// What the head-to-head mini-table compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeadToHeadMode {
    PointsOnly,
    #[default]
    PointsThenGoalDifference,
}

/// One team's line in a league table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub team_id: TeamId,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub points: u32,
    /// 1-based, assigned after full ordering
    pub position: u32,
    /// Most recent results, oldest first
    pub form: Vec<FormResult>,
}

impl StandingsRow {
    /// An empty row for a team with no counted matches.
    pub fn new(team_id: TeamId) -> Self {
        Self {
            team_id,
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
            position: 0,
            form: Vec::new(),
        }
    }

    /// Accumulate one counted match.
    ///
    /// The row is left untouched when any running total would overflow.
    pub fn record(
        &mut self,
        scored: u32,
        conceded: u32,
        scheme: &PointsScheme,
    ) -> Result<(), CompetitionError> {
        let overflow = |what: &str| {
            CompetitionError::ValidationError(format!(
                "{} for team {} exceeds the supported range",
                what, self.team_id
            ))
        };

        let played = self
            .played
            .checked_add(1)
            .ok_or_else(|| overflow("matches played"))?;
        let goals_for = self
            .goals_for
            .checked_add(scored)
            .ok_or_else(|| overflow("goals scored"))?;
        let goals_against = self
            .goals_against
            .checked_add(conceded)
            .ok_or_else(|| overflow("goals conceded"))?;
        let (mut won, mut drawn, mut lost) = (self.won, self.drawn, self.lost);
        match FormResult::from_scores(scored, conceded) {
            FormResult::Win => won += 1,
            FormResult::Draw => drawn += 1,
            FormResult::Loss => lost += 1,
        }
        let points = scheme
            .total(won, drawn, lost)
            .ok_or_else(|| overflow("points"))?;

        self.played = played;
        self.won = won;
        self.drawn = drawn;
        self.lost = lost;
        self.goals_for = goals_for;
        self.goals_against = goals_against;
        self.goal_difference = i64::from(goals_for) - i64::from(goals_against);
        self.points = points;
        Ok(())
    }

    /// Form rendered as e.g. "WWDLW".
    pub fn form_string(&self) -> String {
        self.form.iter().map(|r| r.to_string()).collect()
    }
}
