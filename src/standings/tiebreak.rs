//! Tie-break chain.
//!
//! Teams are split into groups level on the first criterion, each group is
//! ordered by the next criterion, and so on. Head-to-head is evaluated over
//! the matches played among the members of the group currently being split.
//! Team id, ascending, settles whatever remains.

use std::collections::{BTreeMap, HashSet};

use crate::models::{
    FormResult, Fixture, HeadToHeadMode, PointsScheme, StandingsRow, TeamId, TieBreaker,
};

use super::StandingsRules;

#[derive(Debug, Clone, Copy)]
enum Criterion {
    Points,
    Rule(TieBreaker),
}

/// Comparison key; larger ranks higher.
type Key = (i64, i64);

struct Context<'a> {
    rows: &'a BTreeMap<TeamId, StandingsRow>,
    matches: &'a [&'a Fixture],
    points: PointsScheme,
    head_to_head: HeadToHeadMode,
}

/// Order every team in `rows` according to `rules`.
pub(super) fn rank(
    rows: &BTreeMap<TeamId, StandingsRow>,
    matches: &[&Fixture],
    rules: &StandingsRules,
) -> Vec<TeamId> {
    let chain: Vec<Criterion> = std::iter::once(Criterion::Points)
        .chain(rules.tie_breakers.iter().copied().map(Criterion::Rule))
        .collect();

    let ctx = Context {
        rows,
        matches,
        points: rules.points,
        head_to_head: rules.head_to_head,
    };

    let mut ordered = Vec::with_capacity(rows.len());
    split(rows.keys().cloned().collect(), &chain, &ctx, &mut ordered);
    ordered
}

fn split(mut group: Vec<TeamId>, chain: &[Criterion], ctx: &Context<'_>, out: &mut Vec<TeamId>) {
    if group.len() <= 1 {
        out.extend(group);
        return;
    }

    let Some((criterion, rest)) = chain.split_first() else {
        group.sort();
        out.extend(group);
        return;
    };

    let keys = keys_for(*criterion, &group, ctx);
    group.sort_by(|a, b| keys[b].cmp(&keys[a]).then_with(|| a.cmp(b)));

    let mut start = 0;
    for end in 1..=group.len() {
        if end == group.len() || keys[&group[end]] != keys[&group[start]] {
            split(group[start..end].to_vec(), rest, ctx, out);
            start = end;
        }
    }
}

fn keys_for(criterion: Criterion, group: &[TeamId], ctx: &Context<'_>) -> BTreeMap<TeamId, Key> {
    match criterion {
        Criterion::Points => row_keys(group, ctx, |r| i64::from(r.points)),
        Criterion::Rule(TieBreaker::GoalDifference) => row_keys(group, ctx, |r| r.goal_difference),
        Criterion::Rule(TieBreaker::GoalsFor) => row_keys(group, ctx, |r| i64::from(r.goals_for)),
        Criterion::Rule(TieBreaker::Wins) => row_keys(group, ctx, |r| i64::from(r.won)),
        Criterion::Rule(TieBreaker::HeadToHead) => head_to_head_keys(group, ctx),
    }
}

fn row_keys<F>(group: &[TeamId], ctx: &Context<'_>, value: F) -> BTreeMap<TeamId, Key>
where
    F: Fn(&StandingsRow) -> i64,
{
    group
        .iter()
        .map(|id| {
            let v = ctx.rows.get(id).map(&value).unwrap_or_default();
            (id.clone(), (v, 0))
        })
        .collect()
}

/// Mini-table over matches played exclusively among `group`.
fn head_to_head_keys(group: &[TeamId], ctx: &Context<'_>) -> BTreeMap<TeamId, Key> {
    let members: HashSet<&TeamId> = group.iter().collect();
    let mut table: BTreeMap<TeamId, (i64, i64)> =
        group.iter().map(|id| (id.clone(), (0, 0))).collect();

    for fixture in ctx.matches {
        let (Some(home), Some(away)) = (&fixture.home_team_id, &fixture.away_team_id) else {
            continue;
        };
        if !members.contains(home) || !members.contains(away) {
            continue;
        }
        let (Some(hs), Some(aws)) = (fixture.home_score, fixture.away_score) else {
            continue;
        };

        for (team, scored, conceded) in [(home, hs, aws), (away, aws, hs)] {
            if let Some(entry) = table.get_mut(team) {
                let result = FormResult::from_scores(scored, conceded);
                entry.0 += i64::from(ctx.points.points_for(result));
                entry.1 += i64::from(scored) - i64::from(conceded);
            }
        }
    }

    table
        .into_iter()
        .map(|(id, (points, goal_difference))| {
            let key = match ctx.head_to_head {
                HeadToHeadMode::PointsOnly => (points, 0),
                HeadToHeadMode::PointsThenGoalDifference => (points, goal_difference),
            };
            (id, key)
        })
        .collect()
}
