//! Round robin via the circle method.
//!
//! The first seat stays fixed while the others rotate one step per round.
//! With an odd field a bye sentinel takes the fixed seat, so each round
//! exactly one participant sits out. The whole schedule is produced when
//! the tournament starts.

use super::{PairingContext, PairingStrategy, RoundPlan, require_two};
use crate::tournament::{Bracket, MatchPhase, ParticipantId, Slot, TournamentResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundRobin;

/// Full schedule for the given participants, one entry per round
#[must_use]
pub fn schedule(ids: &[ParticipantId]) -> Vec<Vec<(ParticipantId, Slot)>> {
    let mut ring: Vec<Slot> = Vec::with_capacity(ids.len() + 1);
    if ids.len() % 2 == 1 {
        ring.push(Slot::Bye);
    }
    ring.extend(ids.iter().map(|&id| Slot::Participant(id)));

    let seats = ring.len();
    if seats < 2 {
        return Vec::new();
    }

    let mut rounds = Vec::with_capacity(seats - 1);
    for _ in 0..seats - 1 {
        let mut games = Vec::with_capacity(seats / 2);
        let mut byes = Vec::new();
        for i in 0..seats / 2 {
            match (ring[i], ring[seats - 1 - i]) {
                (Slot::Participant(a), Slot::Participant(b)) => {
                    let (a, b) = super::ordered(a, b);
                    games.push((a, Slot::Participant(b)));
                }
                (Slot::Participant(id), Slot::Bye) | (Slot::Bye, Slot::Participant(id)) => {
                    byes.push((id, Slot::Bye));
                }
                (Slot::Bye, Slot::Bye) => {}
            }
        }
        games.extend(byes);
        rounds.push(games);
        ring[1..].rotate_right(1);
    }
    rounds
}

impl PairingStrategy for RoundRobin {
    fn initial_rounds(&self, ctx: &PairingContext<'_>) -> TournamentResult<Vec<RoundPlan>> {
        require_two(ctx)?;
        let ids: Vec<ParticipantId> = ctx.participants.iter().map(|p| p.id).collect();
        let plans: Vec<RoundPlan> = schedule(&ids)
            .into_iter()
            .enumerate()
            .map(|(i, pairs)| {
                RoundPlan::from_pairs(Bracket::Main, i as u32 + 1, MatchPhase::Qualification, pairs)
            })
            .collect();
        log::debug!(
            "Round robin schedule of {} rounds for {} participants",
            plans.len(),
            ids.len()
        );
        Ok(plans)
    }

    fn next_round(&self, _ctx: &PairingContext<'_>) -> TournamentResult<Option<RoundPlan>> {
        // The schedule is complete from the start
        Ok(None)
    }

    fn expected_rounds(&self, participants: usize) -> u32 {
        let n = participants as u32;
        if n % 2 == 0 { n.saturating_sub(1) } else { n }
    }
}
