//! Single-elimination knockout brackets.
//!
//! A bracket is a value: nodes live in a flat arena indexed by `NodeId`, and
//! every mutation goes through `advance` or `reset` on the bracket the caller
//! owns. Persisting it and serializing concurrent writers is the caller's job;
//! `version` supports an optimistic check.

mod seeding;

pub use seeding::seeding_order;

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CompetitionError;
use crate::models::{
    BracketNode, BracketSlot, BracketStatus, EntityId, Feed, Fixture, NodeId, NodeState,
    RoundLabel, Side, SlotSource, Team, TeamId,
};

/// Builds seeded single-elimination brackets.
#[derive(Debug, Clone)]
pub struct KnockoutBracketBuilder {
    stage: String,
    third_place: bool,
}

impl Default for KnockoutBracketBuilder {
    fn default() -> Self {
        Self {
            stage: "knockout".to_string(),
            third_place: false,
        }
    }
}

impl KnockoutBracketBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the stage key mixed into fixture IDs.
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = stage.into();
        self
    }

    /// Builder method to add a third-place match between the semi-final losers.
    pub fn with_third_place(mut self, third_place: bool) -> Self {
        self.third_place = third_place;
        self
    }

    /// Build a bracket from teams ordered best to worst.
    ///
    /// The field is padded with byes up to the next power of two; byes are
    /// resolved immediately and their teams moved into the next round.
    pub fn build(&self, seeded: &[Team]) -> Result<KnockoutBracket, CompetitionError> {
        if seeded.len() < 2 {
            return Err(CompetitionError::ConfigurationError(format!(
                "a knockout bracket needs at least 2 teams, got {}",
                seeded.len()
            )));
        }

        let mut seen = HashSet::with_capacity(seeded.len());
        for team in seeded {
            if !seen.insert(&team.id) {
                return Err(CompetitionError::ValidationError(format!(
                    "duplicate team id {}",
                    team.id
                )));
            }
        }

        if self.stage.trim().is_empty() {
            return Err(CompetitionError::ConfigurationError(
                "stage key must not be empty".to_string(),
            ));
        }

        if self.third_place && seeded.len() < 4 {
            return Err(CompetitionError::ConfigurationError(
                "a third-place match needs at least 4 teams".to_string(),
            ));
        }

        let entrants = u32::try_from(seeded.len()).map_err(|_| {
            CompetitionError::ConfigurationError("too many teams for one bracket".to_string())
        })?;
        let size = entrants.checked_next_power_of_two().ok_or_else(|| {
            CompetitionError::ConfigurationError("too many teams for one bracket".to_string())
        })?;
        let round_count = size.trailing_zeros();

        let mut nodes: Vec<BracketNode> = Vec::with_capacity(size as usize);

        // Opening round from the seeding order.
        let order = seeding_order(size);
        let slot_for = |seed: u32| -> BracketSlot {
            if seed <= entrants {
                BracketSlot::seed(seed, seeded[(seed - 1) as usize].id.clone())
            } else {
                BracketSlot::bye()
            }
        };
        for (slot_index, pair) in order.chunks(2).enumerate() {
            nodes.push(BracketNode::new(
                NodeId(nodes.len() as u32),
                RoundLabel::for_entrants(size),
                0,
                slot_index as u32,
                slot_for(pair[0]),
                slot_for(pair[1]),
            ));
        }

        // Later rounds, each slot fed by two adjacent nodes of the round before.
        let mut previous_start = 0u32;
        for round_index in 1..round_count {
            let round_entrants = size >> round_index;
            let round_start = nodes.len() as u32;
            for slot_index in 0..round_entrants / 2 {
                let id = NodeId(round_start + slot_index);
                let home_feeder = NodeId(previous_start + 2 * slot_index);
                let away_feeder = NodeId(previous_start + 2 * slot_index + 1);

                nodes[home_feeder.index()].winner_to = Some(Feed {
                    node: id,
                    side: Side::Home,
                });
                nodes[away_feeder.index()].winner_to = Some(Feed {
                    node: id,
                    side: Side::Away,
                });
                nodes.push(BracketNode::new(
                    id,
                    RoundLabel::for_entrants(round_entrants),
                    round_index,
                    slot_index,
                    BracketSlot::pending(SlotSource::WinnerOf(home_feeder)),
                    BracketSlot::pending(SlotSource::WinnerOf(away_feeder)),
                ));
            }
            previous_start = round_start;
        }

        let final_node = NodeId(nodes.len() as u32 - 1);

        let third_place = if self.third_place {
            let id = NodeId(nodes.len() as u32);
            let (semi_home, semi_away) = (NodeId(final_node.0 - 2), NodeId(final_node.0 - 1));
            nodes[semi_home.index()].loser_to = Some(Feed {
                node: id,
                side: Side::Home,
            });
            nodes[semi_away.index()].loser_to = Some(Feed {
                node: id,
                side: Side::Away,
            });
            nodes.push(BracketNode::new(
                id,
                RoundLabel::ThirdPlace,
                round_count - 1,
                1,
                BracketSlot::pending(SlotSource::LoserOf(semi_home)),
                BracketSlot::pending(SlotSource::LoserOf(semi_away)),
            ));
            Some(id)
        } else {
            None
        };

        let mut bracket = KnockoutBracket {
            stage: self.stage.clone(),
            nodes,
            size,
            entrants,
            final_node,
            third_place,
            status: BracketStatus::InProgress,
            version: 0,
        };
        bracket.resolve_byes();

        debug!(
            "Built knockout bracket: {} entrants, size {}, {} rounds",
            entrants, size, round_count
        );

        Ok(bracket)
    }
}

/// A knockout bracket and its progression state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnockoutBracket {
    stage: String,
    nodes: Vec<BracketNode>,
    size: u32,
    entrants: u32,
    final_node: NodeId,
    third_place: Option<NodeId>,
    status: BracketStatus,
    version: u64,
}

impl KnockoutBracket {
    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn nodes(&self) -> &[BracketNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&BracketNode> {
        self.nodes.get(id.index())
    }

    /// Node by position; the third-place match is not a bracket position.
    pub fn node_at(&self, round_index: u32, slot_index: u32) -> Option<&BracketNode> {
        self.nodes.iter().find(|n| {
            n.round_index == round_index
                && n.slot_index == slot_index
                && n.round_label != RoundLabel::ThirdPlace
        })
    }

    /// Bracket size after padding (a power of two).
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of real teams.
    pub fn entrants(&self) -> u32 {
        self.entrants
    }

    pub fn round_count(&self) -> u32 {
        self.size.trailing_zeros()
    }

    pub fn status(&self) -> BracketStatus {
        self.status
    }

    /// Incremented on every successful mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Fail unless the bracket is still at `expected` version.
    pub fn check_version(&self, expected: u64) -> Result<(), CompetitionError> {
        if self.version != expected {
            return Err(CompetitionError::ConflictError(format!(
                "bracket is at version {}, expected {}",
                self.version, expected
            )));
        }
        Ok(())
    }

    pub fn final_node(&self) -> &BracketNode {
        &self.nodes[self.final_node.index()]
    }

    pub fn third_place_node(&self) -> Option<&BracketNode> {
        self.third_place.map(|id| &self.nodes[id.index()])
    }

    /// Nodes ready to be played, in bracket order.
    pub fn playable_nodes(&self) -> Vec<&BracketNode> {
        self.nodes.iter().filter(|n| n.is_playable()).collect()
    }

    pub fn champion(&self) -> Option<&TeamId> {
        self.final_node().winner.as_ref()
    }

    pub fn runner_up(&self) -> Option<&TeamId> {
        self.final_node().loser()
    }

    pub fn third_place_winner(&self) -> Option<&TeamId> {
        self.third_place_node().and_then(|n| n.winner.as_ref())
    }

    /// Record the winner of a node and move teams on.
    ///
    /// Repeating an identical result is a no-op. A different winner for a
    /// resolved node is a conflict; use `reset` first.
    pub fn advance(
        &mut self,
        node_id: NodeId,
        winner: &TeamId,
    ) -> Result<BracketStatus, CompetitionError> {
        let node = self.node(node_id).ok_or_else(|| {
            CompetitionError::IntegrityError(format!("unknown bracket node {}", node_id))
        })?;

        if node.is_resolved() {
            if node.winner.as_ref() == Some(winner) {
                return Ok(self.status);
            }
            return Err(CompetitionError::ConflictError(format!(
                "{} already resolved with winner {}",
                node_id,
                node.winner
                    .as_ref()
                    .map_or("none", |w| w.as_str())
            )));
        }

        let (Some(home), Some(away)) = (&node.home.team_id, &node.away.team_id) else {
            return Err(CompetitionError::StateError(format!(
                "{} is waiting on an earlier match",
                node_id
            )));
        };

        let loser = if winner == home {
            away.clone()
        } else if winner == away {
            home.clone()
        } else {
            return Err(CompetitionError::ValidationError(format!(
                "team {} is not playing in {}",
                winner, node_id
            )));
        };

        let (winner_to, loser_to) = (node.winner_to, node.loser_to);

        let node = &mut self.nodes[node_id.index()];
        node.winner = Some(winner.clone());
        node.state = NodeState::Resolved;

        if let Some(feed) = winner_to {
            self.place(feed, Some(winner.clone()));
        }
        if let Some(feed) = loser_to {
            self.place(feed, Some(loser));
        }

        self.version += 1;
        self.refresh_status();

        debug!("{} won by {}; bracket status {:?}", node_id, winner, self.status);

        Ok(self.status)
    }

    /// Clear a resolved node and every result that depended on it.
    pub fn reset(&mut self, node_id: NodeId) -> Result<(), CompetitionError> {
        let node = self.node(node_id).ok_or_else(|| {
            CompetitionError::IntegrityError(format!("unknown bracket node {}", node_id))
        })?;

        match node.state {
            NodeState::Bye => {
                return Err(CompetitionError::StateError(format!(
                    "{} is a bye and cannot be reset",
                    node_id
                )))
            }
            NodeState::Unresolved => return Ok(()),
            NodeState::Resolved => {}
        }

        let mut pending = vec![node_id];
        while let Some(id) = pending.pop() {
            let node = &mut self.nodes[id.index()];
            node.winner = None;
            node.state = NodeState::Unresolved;
            let feeds = [node.winner_to, node.loser_to];

            for feed in feeds.into_iter().flatten() {
                self.place(feed, None);
                if self.nodes[feed.node.index()].state == NodeState::Resolved {
                    pending.push(feed.node);
                }
            }
        }

        self.version += 1;
        self.refresh_status();

        debug!("{} reset; bracket status {:?}", node_id, self.status);

        Ok(())
    }

    /// Fixtures for every match still to be played, including those whose
    /// teams are not known yet.
    pub fn pending_fixtures(&self, kickoff: NaiveDateTime, venue: Option<String>) -> Vec<Fixture> {
        self.nodes
            .iter()
            .filter(|n| n.state == NodeState::Unresolved)
            .map(|n| {
                Fixture::new(
                    n.round_index + 1,
                    1,
                    n.home.team_id.clone(),
                    n.away.team_id.clone(),
                    kickoff,
                )
                .with_id(EntityId::generate(&[
                    self.stage.as_str(),
                    &self.size.to_string(),
                    &n.id.to_string(),
                ]))
                .with_venue(venue.clone())
            })
            .collect()
    }

    fn place(&mut self, feed: Feed, team: Option<TeamId>) {
        self.nodes[feed.node.index()].slot_mut(feed.side).team_id = team;
    }

    fn resolve_byes(&mut self) {
        for i in 0..self.nodes.len() {
            let node = &self.nodes[i];
            let team = match (&node.home.source, &node.away.source) {
                (SlotSource::Bye, _) => node.away.team_id.clone(),
                (_, SlotSource::Bye) => node.home.team_id.clone(),
                _ => continue,
            };
            let winner_to = node.winner_to;

            let node = &mut self.nodes[i];
            node.is_bye = true;
            node.state = NodeState::Bye;
            node.winner = team.clone();
            if let Some(feed) = winner_to {
                self.place(feed, team);
            }
        }
    }

    fn refresh_status(&mut self) {
        let final_done = self.final_node().is_resolved();
        let third_done = self.third_place_node().map_or(true, |n| n.is_resolved());
        self.status = if final_done && third_done {
            BracketStatus::Complete
        } else {
            BracketStatus::InProgress
        };
    }
}
