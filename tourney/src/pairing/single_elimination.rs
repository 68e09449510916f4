//! Single elimination bracket.
//!
//! The bracket is padded to the next power of two. Byes go to the top
//! registration seeds and are spread with the standard seeding order, so the
//! first seeds sit in different halves. The remaining participants fill the
//! other first-stage matches pairwise in registration order. Every later
//! stage pairs the winners of adjacent matches.

use super::{PairingContext, PairingStrategy, RoundPlan, require_two, stage_count};
use crate::tournament::{
    Bracket, MatchPhase, Participant, ParticipantId, Slot, TournamentResult,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SingleElimination;

/// Seed number occupying each bracket slot, for a power-of-two `size`
///
/// `seed_order(8)` is `[1, 8, 4, 5, 2, 7, 3, 6]`: seed `s` always meets
/// seed `size + 1 - s` in the first stage.
#[must_use]
pub fn seed_order(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() < size {
        let span = order.len() * 2 + 1;
        order = order.iter().flat_map(|&seed| [seed, span - seed]).collect();
    }
    order
}

/// First-stage pairs of a padded bracket
pub(crate) fn first_stage(participants: &[Participant]) -> Vec<(ParticipantId, Slot)> {
    let n = participants.len();
    let size = n.max(2).next_power_of_two();
    let byes = size - n;
    let order = seed_order(size);

    let mut unseeded = participants.iter().skip(byes).map(|p| p.id);
    order
        .chunks_exact(2)
        .filter_map(|slots| {
            let top = slots[0].min(slots[1]);
            if top <= byes {
                Some((participants[top - 1].id, Slot::Bye))
            } else {
                let a = unseeded.next()?;
                let b = unseeded.next()?;
                Some((a, Slot::Participant(b)))
            }
        })
        .collect()
}

/// Phase label of a winners-bracket stage
pub(crate) fn stage_phase(stage: u32, stages: u32) -> MatchPhase {
    MatchPhase::from_stages_remaining(stages.saturating_sub(stage))
}

impl PairingStrategy for SingleElimination {
    fn initial_rounds(&self, ctx: &PairingContext<'_>) -> TournamentResult<Vec<RoundPlan>> {
        require_two(ctx)?;
        let stages = stage_count(ctx.participants.len());
        let plan = RoundPlan::from_pairs(
            Bracket::Main,
            1,
            stage_phase(1, stages),
            first_stage(ctx.participants),
        );
        log::debug!(
            "Single elimination bracket of {} for {} participants",
            1usize << stages,
            ctx.participants.len()
        );
        Ok(vec![plan])
    }

    fn next_round(&self, ctx: &PairingContext<'_>) -> TournamentResult<Option<RoundPlan>> {
        let stages = stage_count(ctx.participants.len());
        let played = ctx.played_rounds().count() as u32;
        if played >= stages {
            return Ok(None);
        }

        let winners = ctx.stage_winners(Bracket::Main, played)?;
        let stage = played + 1;
        let pairs = winners
            .chunks_exact(2)
            .map(|pair| (pair[0], Slot::Participant(pair[1])));
        Ok(Some(RoundPlan::from_pairs(
            Bracket::Main,
            stage,
            stage_phase(stage, stages),
            pairs,
        )))
    }

    fn expected_rounds(&self, participants: usize) -> u32 {
        stage_count(participants)
    }

    fn elimination_losses(&self) -> Option<u32> {
        Some(1)
    }
}
