//! Double elimination bracket.
//!
//! With a padded bracket of `2^W` slots the schedule is fixed:
//!
//! - round 1: winners stage 1 (seeded like single elimination)
//! - rounds 2..=W: winners stage `t` alongside losers stage `t - 1`
//! - rounds W+1..2W-1: the remaining losers stages, up to `2(W - 1)`
//! - round 2W: grand final, winners champion against losers champion
//! - round 2W+1: bracket reset, only if the losers champion won the final
//!
//! Losers stage 1 pairs the first-stage losers. Odd losers stages pair the
//! survivors among themselves. Even stage `2j` drops the losers of winners
//! stage `j + 1` in reverse order against the survivors, which keeps
//! immediate rematches away.

use super::single_elimination::{first_stage, stage_phase};
use super::{
    PairingContext, PairingStrategy, PlannedMatch, RoundPlan, pair_in_order, require_two,
    stage_count,
};
use crate::rating::Outcome;
use crate::tournament::{
    Bracket, MatchPhase, ParticipantId, Slot, TournamentError, TournamentResult,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoubleElimination;

fn winners_phase(stage: u32, stages: u32) -> MatchPhase {
    if stage >= stages {
        MatchPhase::WinnersFinal
    } else {
        stage_phase(stage, stages)
    }
}

fn planned(
    bracket: Bracket,
    stage: u32,
    phase: MatchPhase,
    pairs: Vec<(ParticipantId, Slot)>,
) -> impl Iterator<Item = PlannedMatch> {
    pairs
        .into_iter()
        .enumerate()
        .map(move |(position, (player_a, player_b))| PlannedMatch {
            bracket,
            stage,
            position: position as u32,
            phase,
            player_a,
            player_b,
        })
}

fn single_winner(ctx: &PairingContext<'_>, bracket: Bracket, stage: u32) -> TournamentResult<ParticipantId> {
    match ctx.stage_winners(bracket, stage)?.as_slice() {
        [winner] => Ok(*winner),
        other => Err(TournamentError::FormatConstraintViolation(format!(
            "{bracket:?} stage {stage} has {} winners, expected 1",
            other.len()
        ))),
    }
}

impl DoubleElimination {
    fn losers_stage(
        ctx: &PairingContext<'_>,
        stage: u32,
        total: u32,
    ) -> TournamentResult<Vec<(ParticipantId, Slot)>> {
        if stage == 1 {
            return Ok(pair_in_order(&ctx.stage_losers(Bracket::Main, 1)?));
        }

        let survivors = ctx.stage_winners(Bracket::Losers, stage - 1)?;
        if stage % 2 == 1 {
            return Ok(pair_in_order(&survivors));
        }

        let mut dropped = ctx.stage_losers(Bracket::Main, stage / 2 + 1)?;
        dropped.reverse();

        let crossed = survivors.len().min(dropped.len());
        let mut pairs: Vec<(ParticipantId, Slot)> = survivors
            .iter()
            .zip(&dropped)
            .map(|(&s, &d)| (s, Slot::Participant(d)))
            .collect();
        let leftovers = if survivors.len() > crossed {
            &survivors[crossed..]
        } else {
            &dropped[crossed..]
        };
        pairs.extend(pair_in_order(leftovers));

        if stage == total && pairs.len() != 1 {
            log::warn!("Losers final planned with {} matches", pairs.len());
        }
        Ok(pairs)
    }

    fn losers_champion(ctx: &PairingContext<'_>, losers_stages: u32) -> TournamentResult<ParticipantId> {
        if losers_stages == 0 {
            match ctx.stage_losers(Bracket::Main, 1)?.as_slice() {
                [loser] => Ok(*loser),
                other => Err(TournamentError::FormatConstraintViolation(format!(
                    "expected one first-stage loser, found {}",
                    other.len()
                ))),
            }
        } else {
            single_winner(ctx, Bracket::Losers, losers_stages)
        }
    }
}

impl PairingStrategy for DoubleElimination {
    fn initial_rounds(&self, ctx: &PairingContext<'_>) -> TournamentResult<Vec<RoundPlan>> {
        require_two(ctx)?;
        let stages = stage_count(ctx.participants.len());
        let matches = planned(
            Bracket::Main,
            1,
            winners_phase(1, stages),
            first_stage(ctx.participants),
        )
        .collect();
        Ok(vec![RoundPlan { matches }])
    }

    fn next_round(&self, ctx: &PairingContext<'_>) -> TournamentResult<Option<RoundPlan>> {
        let w = stage_count(ctx.participants.len());
        let losers_stages = 2 * (w - 1);
        let t = ctx.played_rounds().count() as u32 + 1;
        let mut matches = Vec::new();

        if (2..=w).contains(&t) {
            let winners = ctx.stage_winners(Bracket::Main, t - 1)?;
            let pairs = winners
                .chunks_exact(2)
                .map(|pair| (pair[0], Slot::Participant(pair[1])))
                .collect();
            matches.extend(planned(Bracket::Main, t, winners_phase(t, w), pairs));
        }

        let losers_stage = t - 1;
        if (1..=losers_stages).contains(&losers_stage) {
            let phase = if losers_stage == losers_stages {
                MatchPhase::LosersFinal
            } else {
                MatchPhase::LosersBracket
            };
            let pairs = Self::losers_stage(ctx, losers_stage, losers_stages)?;
            matches.extend(planned(Bracket::Losers, losers_stage, phase, pairs));
        }

        if t == 2 * w {
            let champion = single_winner(ctx, Bracket::Main, w)?;
            let challenger = Self::losers_champion(ctx, losers_stages)?;
            matches.extend(planned(
                Bracket::GrandFinal,
                1,
                MatchPhase::GrandFinal,
                vec![(champion, Slot::Participant(challenger))],
            ));
        }

        if t == 2 * w + 1 {
            let grand_final = ctx.stage_matches(Bracket::GrandFinal, 1);
            if let [m] = grand_final.as_slice()
                && m.outcome() == Some(Outcome::BWins)
            {
                log::debug!("Losers champion won the grand final, playing bracket reset");
                matches.extend(planned(
                    Bracket::BracketReset,
                    1,
                    MatchPhase::BracketReset,
                    vec![(m.player_a, m.player_b)],
                ));
            }
        }

        if matches.is_empty() {
            return Ok(None);
        }
        Ok(Some(RoundPlan { matches }))
    }

    fn expected_rounds(&self, participants: usize) -> u32 {
        2 * stage_count(participants)
    }

    fn elimination_losses(&self) -> Option<u32> {
        Some(2)
    }
}
