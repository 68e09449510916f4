//! Swiss system pairing.
//!
//! Participants are ranked by score, then rating, then registration order.
//! A backtracking search walks the ranking top-down and gives each player
//! the nearest unplayed opponent below them, so pairs stay inside score
//! groups and an odd group floats its lowest-rated member down. When the
//! nearest choice would force a rematch further down, the search backtracks,
//! across group boundaries if needed. Only when no rematch-free pairing of
//! the whole field exists does pairing fall back to score groups paired
//! greedily, allowing the fewest rematches it can.
//!
//! With an odd field one participant sits out with a bye, chosen among
//! those without a previous bye: lowest score, then lowest rating, then
//! latest registration.

use std::cmp::Ordering;
use std::collections::HashSet;

use super::{PairingContext, PairingStrategy, RoundPlan, ordered, require_two};
use crate::tournament::{
    Bracket, MatchPhase, Participant, ParticipantId, Slot, TournamentResult,
};

/// Upper bound on backtracking steps per search
const SEARCH_BUDGET: usize = 50_000;

type PlayedPairs = HashSet<(ParticipantId, ParticipantId)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swiss {
    pub rounds: u32,
}

impl Swiss {
    #[must_use]
    pub const fn new(rounds: u32) -> Self {
        Self { rounds }
    }

    fn pair_round(&self, ctx: &PairingContext<'_>, round: u32) -> RoundPlan {
        let played = ctx.played_pairs();

        let mut ranked: Vec<&Participant> = ctx.participants.iter().collect();
        ranked.sort_by(|a, b| rank_order(a, b));

        let bye = (ranked.len() % 2 == 1)
            .then(|| bye_recipient(&ranked))
            .flatten();
        if let Some(id) = bye {
            ranked.retain(|p| p.id != id);
        }

        let field: Vec<ParticipantId> = ranked.iter().map(|p| p.id).collect();
        let pairs = rematch_free(&field, &played).unwrap_or_else(|| {
            log::warn!(
                "Swiss round {round}: no rematch-free pairing for {} players, allowing rematches",
                field.len()
            );
            pair_by_groups(&ranked, &played)
        });

        let mut pairs: Vec<(ParticipantId, Slot)> = pairs
            .into_iter()
            .map(|(a, b)| (a, Slot::Participant(b)))
            .collect();
        if let Some(id) = bye {
            pairs.push((id, Slot::Bye));
        }
        RoundPlan::from_pairs(Bracket::Main, round, MatchPhase::Qualification, pairs)
    }
}

/// Score desc, rating desc, registration order asc
fn rank_order(a: &Participant, b: &Participant) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.current_rating.total_cmp(&a.current_rating))
        .then_with(|| a.id.cmp(&b.id))
}

fn bye_recipient(ranked: &[&Participant]) -> Option<ParticipantId> {
    let fresh: Vec<&Participant> = ranked.iter().copied().filter(|p| p.byes == 0).collect();
    let candidates = if fresh.is_empty() { ranked.to_vec() } else { fresh };
    candidates
        .into_iter()
        .min_by(|a, b| {
            a.score
                .total_cmp(&b.score)
                .then_with(|| a.current_rating.total_cmp(&b.current_rating))
                .then_with(|| b.id.cmp(&a.id))
        })
        .map(|p| p.id)
}

fn score_groups<'a>(ranked: &[&'a Participant]) -> Vec<Vec<&'a Participant>> {
    let mut groups: Vec<Vec<&Participant>> = Vec::new();
    for &participant in ranked {
        match groups.last_mut() {
            Some(group) if group[0].score.total_cmp(&participant.score) == Ordering::Equal => {
                group.push(participant);
            }
            _ => groups.push(vec![participant]),
        }
    }
    groups
}

/// Rematch-free pairing of `pool` in rank order, if one is found within
/// the search budget
fn rematch_free(
    pool: &[ParticipantId],
    played: &PlayedPairs,
) -> Option<Vec<(ParticipantId, ParticipantId)>> {
    let mut used = vec![false; pool.len()];
    let mut pairs = Vec::with_capacity(pool.len() / 2);
    let mut budget = SEARCH_BUDGET;
    search(pool, played, &mut used, &mut pairs, &mut budget).then_some(pairs)
}

/// Pair each score group after taking in the member floated from the group
/// above, preferring new opponents inside the group
fn pair_by_groups(
    ranked: &[&Participant],
    played: &PlayedPairs,
) -> Vec<(ParticipantId, ParticipantId)> {
    let groups = score_groups(ranked);
    let mut pairs = Vec::with_capacity(ranked.len() / 2);
    let mut floaters: Vec<ParticipantId> = Vec::new();
    for (index, group) in groups.iter().enumerate() {
        let mut pool = std::mem::take(&mut floaters);
        pool.extend(group.iter().map(|p| p.id));
        if pool.len() % 2 == 1
            && index + 1 < groups.len()
            && let Some(lowest) = pool.pop()
        {
            floaters.push(lowest);
        }
        pairs.extend(rematch_free(&pool, played).unwrap_or_else(|| greedy(&pool, played)));
    }
    pairs
}

fn search(
    pool: &[ParticipantId],
    played: &PlayedPairs,
    used: &mut [bool],
    pairs: &mut Vec<(ParticipantId, ParticipantId)>,
    budget: &mut usize,
) -> bool {
    let Some(first) = used.iter().position(|u| !u) else {
        return true;
    };
    used[first] = true;
    for second in first + 1..pool.len() {
        if used[second] || played.contains(&ordered(pool[first], pool[second])) {
            continue;
        }
        if *budget == 0 {
            break;
        }
        *budget -= 1;

        used[second] = true;
        pairs.push((pool[first], pool[second]));
        if search(pool, played, used, pairs, budget) {
            return true;
        }
        pairs.pop();
        used[second] = false;
    }
    used[first] = false;
    false
}

fn greedy(pool: &[ParticipantId], played: &PlayedPairs) -> Vec<(ParticipantId, ParticipantId)> {
    let mut used = vec![false; pool.len()];
    let mut pairs = Vec::with_capacity(pool.len() / 2);
    while let Some(first) = used.iter().position(|u| !u) {
        used[first] = true;
        let open: Vec<usize> = (first + 1..pool.len()).filter(|&j| !used[j]).collect();
        let partner = open
            .iter()
            .copied()
            .find(|&j| !played.contains(&ordered(pool[first], pool[j])))
            .or_else(|| open.first().copied());
        if let Some(second) = partner {
            used[second] = true;
            pairs.push((pool[first], pool[second]));
        }
    }
    pairs
}

impl PairingStrategy for Swiss {
    fn initial_rounds(&self, ctx: &PairingContext<'_>) -> TournamentResult<Vec<RoundPlan>> {
        require_two(ctx)?;
        Ok(vec![self.pair_round(ctx, 1)])
    }

    fn next_round(&self, ctx: &PairingContext<'_>) -> TournamentResult<Option<RoundPlan>> {
        let played = ctx.played_rounds().count() as u32;
        if played >= self.rounds {
            return Ok(None);
        }
        let plan = self.pair_round(ctx, played + 1);
        log::debug!("Swiss round {} paired with {} matches", played + 1, plan.matches.len());
        Ok(Some(plan))
    }

    fn expected_rounds(&self, _participants: usize) -> u32 {
        self.rounds
    }
}
