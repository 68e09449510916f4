//! Standings calculator.
//!
//! Standings are derived from participant counters on every call and never
//! cached. Ordering: score descending, then current rating descending, then
//! registration order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::tournament::{Participant, ParticipantId, PlayerId};

/// One row of the standings table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based
    pub rank: usize,
    pub participant_id: ParticipantId,
    pub player_id: PlayerId,
    pub score: f64,
    pub rating: f64,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub byes: u32,
    pub matches_played: u32,
}

fn standings_order(a: &Participant, b: &Participant) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.current_rating.total_cmp(&a.current_rating))
        .then_with(|| a.id.cmp(&b.id))
}

/// Rank participants
#[must_use]
pub fn compute_standings(participants: &[Participant]) -> Vec<Standing> {
    let mut ordered: Vec<&Participant> = participants.iter().collect();
    ordered.sort_by(|a, b| standings_order(a, b));

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, p)| Standing {
            rank: i + 1,
            participant_id: p.id,
            player_id: p.player_id,
            score: p.score,
            rating: p.current_rating,
            wins: p.wins,
            losses: p.losses,
            draws: p.draws,
            byes: p.byes,
            matches_played: p.matches_played(),
        })
        .collect()
}
