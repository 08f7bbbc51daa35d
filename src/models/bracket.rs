//! Knockout bracket models.

use serde::{Deserialize, Serialize};

use super::{NodeId, TeamId};

/// Human-facing name of a knockout round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundLabel {
    /// Round with the given number of entrants (32, 16, ...)
    RoundOf(u32),
    QuarterFinal,
    SemiFinal,
    Final,
    ThirdPlace,
}

impl RoundLabel {
    /// Label for a round that starts with `entrants` teams.
    pub fn for_entrants(entrants: u32) -> Self {
        match entrants {
            2 => RoundLabel::Final,
            4 => RoundLabel::SemiFinal,
            8 => RoundLabel::QuarterFinal,
            n => RoundLabel::RoundOf(n),
        }
    }
}

impl std::fmt::Display for RoundLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundLabel::RoundOf(n) => write!(f, "Round of {}", n),
            RoundLabel::QuarterFinal => write!(f, "Quarter-final"),
            RoundLabel::SemiFinal => write!(f, "Semi-final"),
            RoundLabel::Final => write!(f, "Final"),
            RoundLabel::ThirdPlace => write!(f, "Third place"),
        }
    }
}

/// Lifecycle of a bracket node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    #[default]
    Unresolved,
    /// Walkover against a padding slot, resolved at build time
    Bye,
    Resolved,
}

/// Lifecycle of a whole bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BracketStatus {
    #[default]
    InProgress,
    Complete,
}

/// Which side of a node a team occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

/// Where a slot's team comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum SlotSource {
    /// Initial seed (1 = best)
    Seed(u32),
    /// Padding; never holds a team
    Bye,
    /// Winner of a prior node
    WinnerOf(NodeId),
    /// Loser of a prior node (third-place match)
    LoserOf(NodeId),
}

/// One side of a bracket node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSlot {
    pub source: SlotSource,
    /// Populated for seeds at build time, otherwise once the source resolves
    pub team_id: Option<TeamId>,
}

impl BracketSlot {
    pub fn seed(seed: u32, team_id: TeamId) -> Self {
        Self {
            source: SlotSource::Seed(seed),
            team_id: Some(team_id),
        }
    }

    pub fn bye() -> Self {
        Self {
            source: SlotSource::Bye,
            team_id: None,
        }
    }

    pub fn pending(source: SlotSource) -> Self {
        Self {
            source,
            team_id: None,
        }
    }

    /// The prior node feeding this slot, if any.
    pub fn source_node(&self) -> Option<NodeId> {
        match self.source {
            SlotSource::WinnerOf(id) | SlotSource::LoserOf(id) => Some(id),
            SlotSource::Seed(_) | SlotSource::Bye => None,
        }
    }
}

/// Where a node's winner (or loser) moves on to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub node: NodeId,
    pub side: Side,
}

/// A single match slot in a knockout tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketNode {
    pub id: NodeId,
    pub round_label: RoundLabel,
    /// 0 for the opening round
    pub round_index: u32,
    /// Position within the round, top to bottom
    pub slot_index: u32,
    pub home: BracketSlot,
    pub away: BracketSlot,
    pub state: NodeState,
    pub winner: Option<TeamId>,
    pub is_bye: bool,
    /// Dependent slot for the winner; None for terminal nodes
    pub winner_to: Option<Feed>,
    /// Dependent slot for the loser (semi-finals feeding a third-place match)
    pub loser_to: Option<Feed>,
}

impl BracketNode {
    pub fn new(
        id: NodeId,
        round_label: RoundLabel,
        round_index: u32,
        slot_index: u32,
        home: BracketSlot,
        away: BracketSlot,
    ) -> Self {
        Self {
            id,
            round_label,
            round_index,
            slot_index,
            home,
            away,
            state: NodeState::Unresolved,
            winner: None,
            is_bye: false,
            winner_to: None,
            loser_to: None,
        }
    }

    pub fn slot(&self, side: Side) -> &BracketSlot {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn slot_mut(&mut self, side: Side) -> &mut BracketSlot {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }

    /// Both teams known and no result yet.
    pub fn is_playable(&self) -> bool {
        self.state == NodeState::Unresolved
            && self.home.team_id.is_some()
            && self.away.team_id.is_some()
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, NodeState::Resolved | NodeState::Bye)
    }

    /// The team that did not win, once resolved with two real teams.
    pub fn loser(&self) -> Option<&TeamId> {
        let winner = self.winner.as_ref()?;
        [&self.home.team_id, &self.away.team_id]
            .into_iter()
            .flatten()
            .find(|t| *t != winner)
    }
}
