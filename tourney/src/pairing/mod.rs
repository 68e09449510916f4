//! Pairing strategies.
//!
//! Each tournament format is a variant of [`Pairing`], dispatched through the
//! [`PairingStrategy`] trait with `enum_dispatch`. Strategies are pure: they
//! read the participants and the rounds played so far and return planned
//! matches. The tournament aggregate assigns match ids, opens rounds and
//! resolves byes.

use enum_dispatch::enum_dispatch;
use std::collections::HashSet;

use crate::tournament::{
    Bracket, Match, MatchPhase, Participant, ParticipantId, Round, RoundStatus, Slot,
    TournamentConfig, TournamentError, TournamentFormat, TournamentResult,
};

pub mod double_elimination;
pub mod round_robin;
pub mod single_elimination;
pub mod swiss;

pub use double_elimination::DoubleElimination;
pub use round_robin::RoundRobin;
pub use single_elimination::SingleElimination;
pub use swiss::Swiss;

/// Read-only view of a tournament handed to a strategy
#[derive(Debug, Clone, Copy)]
pub struct PairingContext<'a> {
    /// Participants in registration order
    pub participants: &'a [Participant],
    /// Rounds generated so far, in order
    pub rounds: &'a [Round],
}

impl<'a> PairingContext<'a> {
    #[must_use]
    pub const fn new(participants: &'a [Participant], rounds: &'a [Round]) -> Self {
        Self {
            participants,
            rounds,
        }
    }

    /// Rounds that were not voided
    pub fn played_rounds(&self) -> impl Iterator<Item = &'a Round> {
        self.rounds.iter().filter(|r| r.status != RoundStatus::Void)
    }

    /// Unordered pairs that have already met
    #[must_use]
    pub fn played_pairs(&self) -> HashSet<(ParticipantId, ParticipantId)> {
        self.played_rounds()
            .flat_map(|r| r.matches.iter())
            .filter_map(|m| m.player_b.participant().map(|b| ordered(m.player_a, b)))
            .collect()
    }

    /// Matches of one bracket stage, in position order
    #[must_use]
    pub fn stage_matches(&self, bracket: Bracket, stage: u32) -> Vec<&'a Match> {
        let mut matches: Vec<&Match> = self
            .played_rounds()
            .flat_map(|r| r.matches.iter())
            .filter(|m| m.bracket == bracket && m.stage == stage)
            .collect();
        matches.sort_by_key(|m| m.position);
        matches
    }

    /// Winners of a stage in position order, byes included
    ///
    /// # Errors
    ///
    /// `FormatConstraintViolation` if any match of the stage is undecided.
    pub fn stage_winners(&self, bracket: Bracket, stage: u32) -> TournamentResult<Vec<ParticipantId>> {
        self.stage_matches(bracket, stage)
            .into_iter()
            .map(|m| {
                m.winner().ok_or_else(|| {
                    TournamentError::FormatConstraintViolation(format!(
                        "match {} has no winner",
                        m.id
                    ))
                })
            })
            .collect()
    }

    /// Losers of a stage in position order; byes contribute none
    ///
    /// # Errors
    ///
    /// `FormatConstraintViolation` if any non-bye match is undecided.
    pub fn stage_losers(&self, bracket: Bracket, stage: u32) -> TournamentResult<Vec<ParticipantId>> {
        self.stage_matches(bracket, stage)
            .into_iter()
            .filter(|m| !m.is_bye())
            .map(|m| {
                m.loser().ok_or_else(|| {
                    TournamentError::FormatConstraintViolation(format!(
                        "match {} has no loser",
                        m.id
                    ))
                })
            })
            .collect()
    }
}

/// A match the strategy wants played
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedMatch {
    pub bracket: Bracket,
    pub stage: u32,
    pub position: u32,
    pub phase: MatchPhase,
    pub player_a: ParticipantId,
    pub player_b: Slot,
}

/// Matches of one round, in play order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundPlan {
    pub matches: Vec<PlannedMatch>,
}

impl RoundPlan {
    /// Plan a single-bracket round from ordered pairs
    #[must_use]
    pub fn from_pairs(
        bracket: Bracket,
        stage: u32,
        phase: MatchPhase,
        pairs: impl IntoIterator<Item = (ParticipantId, Slot)>,
    ) -> Self {
        let matches = pairs
            .into_iter()
            .enumerate()
            .map(|(position, (player_a, player_b))| PlannedMatch {
                bracket,
                stage,
                position: position as u32,
                phase,
                player_a,
                player_b,
            })
            .collect();
        Self { matches }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Round generation contract shared by every format
#[enum_dispatch]
pub trait PairingStrategy {
    /// Rounds created when the tournament starts. Round robin returns the
    /// full schedule; every other format returns round 1 only.
    ///
    /// # Errors
    ///
    /// `InsufficientParticipants` with fewer than two participants.
    fn initial_rounds(&self, ctx: &PairingContext<'_>) -> TournamentResult<Vec<RoundPlan>>;

    /// Next round once every generated round is complete, or `None` when
    /// the terminal condition of the format is reached.
    ///
    /// # Errors
    ///
    /// `FormatConstraintViolation` if the rounds so far are inconsistent.
    fn next_round(&self, ctx: &PairingContext<'_>) -> TournamentResult<Option<RoundPlan>>;

    /// Rounds a complete event with `participants` entrants takes, not
    /// counting a bracket reset
    fn expected_rounds(&self, participants: usize) -> u32;

    /// Losses that knock a participant out; `None` when nobody is eliminated
    fn elimination_losses(&self) -> Option<u32> {
        None
    }
}

/// Closed set of pairing formats
#[enum_dispatch(PairingStrategy)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    SingleElimination,
    DoubleElimination,
    Swiss,
    RoundRobin,
}

impl Pairing {
    /// Strategy for a tournament configuration
    #[must_use]
    pub fn for_config(config: &TournamentConfig) -> Self {
        match config.format {
            TournamentFormat::SingleElimination => SingleElimination.into(),
            TournamentFormat::DoubleElimination => DoubleElimination.into(),
            TournamentFormat::Swiss => Swiss::new(config.swiss_rounds.unwrap_or(1)).into(),
            TournamentFormat::RoundRobin => RoundRobin.into(),
        }
    }
}

pub(crate) fn ordered(a: ParticipantId, b: ParticipantId) -> (ParticipantId, ParticipantId) {
    if a <= b { (a, b) } else { (b, a) }
}

pub(crate) fn require_two(ctx: &PairingContext<'_>) -> TournamentResult<()> {
    let current = ctx.participants.len();
    if current < 2 {
        return Err(TournamentError::InsufficientParticipants { needed: 2, current });
    }
    Ok(())
}

/// Pair entrants in order; an odd entrant count gives the first one a bye,
/// which is placed last
pub(crate) fn pair_in_order(entrants: &[ParticipantId]) -> Vec<(ParticipantId, Slot)> {
    let (bye, rest) = match entrants.split_first() {
        Some((&first, rest)) if entrants.len() % 2 == 1 => (Some(first), rest),
        _ => (None, entrants),
    };
    let mut pairs: Vec<(ParticipantId, Slot)> = rest
        .chunks_exact(2)
        .map(|pair| (pair[0], Slot::Participant(pair[1])))
        .collect();
    if let Some(first) = bye {
        pairs.push((first, Slot::Bye));
    }
    pairs
}

/// `log2` of the bracket size for `n` entrants
pub(crate) fn stage_count(n: usize) -> u32 {
    n.max(2).next_power_of_two().trailing_zeros()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_in_order_even() {
        let ids: Vec<_> = (0..4).map(ParticipantId).collect();
        let pairs = pair_in_order(&ids);
        assert_eq!(
            pairs,
            vec![
                (ParticipantId(0), Slot::Participant(ParticipantId(1))),
                (ParticipantId(2), Slot::Participant(ParticipantId(3))),
            ]
        );
    }

    #[test]
    fn test_pair_in_order_odd_gives_first_a_bye() {
        let ids: Vec<_> = (0..3).map(ParticipantId).collect();
        let pairs = pair_in_order(&ids);
        assert_eq!(
            pairs,
            vec![
                (ParticipantId(1), Slot::Participant(ParticipantId(2))),
                (ParticipantId(0), Slot::Bye),
            ]
        );
    }

    #[test]
    fn test_stage_count() {
        assert_eq!(stage_count(2), 1);
        assert_eq!(stage_count(3), 2);
        assert_eq!(stage_count(4), 2);
        assert_eq!(stage_count(5), 3);
        assert_eq!(stage_count(16), 4);
    }

    #[test]
    fn test_for_config_selects_format() {
        let swiss = Pairing::for_config(&TournamentConfig::swiss("Open", 4));
        assert_eq!(swiss, Pairing::Swiss(Swiss::new(4)));

        let rr = Pairing::for_config(&TournamentConfig::round_robin("League"));
        assert_eq!(rr, Pairing::RoundRobin(RoundRobin));
    }

    #[test]
    fn test_expected_rounds_per_format() {
        let se = Pairing::from(SingleElimination);
        assert_eq!(se.expected_rounds(8), 3);
        assert_eq!(se.expected_rounds(5), 3);
        assert_eq!(se.elimination_losses(), Some(1));

        let swiss = Pairing::from(Swiss::new(5));
        assert_eq!(swiss.expected_rounds(30), 5);
        assert_eq!(swiss.elimination_losses(), None);

        let rr = Pairing::from(RoundRobin);
        assert_eq!(rr.expected_rounds(4), 3);
        assert_eq!(rr.expected_rounds(5), 5);
        assert_eq!(rr.elimination_losses(), None);
    }

    #[test]
    fn test_fewer_than_two_participants_rejected() {
        let participants = test_support::participants(1);
        let ctx = PairingContext::new(&participants, &[]);
        for strategy in [
            Pairing::from(SingleElimination),
            DoubleElimination.into(),
            Swiss::new(3).into(),
            RoundRobin.into(),
        ] {
            assert!(matches!(
                strategy.initial_rounds(&ctx),
                Err(TournamentError::InsufficientParticipants { needed: 2, current: 1 })
            ));
        }
    }
}
