//! Cross-tournament player history.
//!
//! History is derived on demand from finished tournaments and never stored.
//! A tournament belongs to a period when it finished inside the period's
//! window.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::tournament::{
    MatchId, PlayerId, RatingChangeKind, Tournament, TournamentFormat, TournamentId,
    TournamentStatus,
};

/// Time window for history queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryPeriod {
    #[default]
    All,
    LastMonth,
    LastThreeMonths,
    LastYear,
    /// Inclusive custom window
    Between {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

impl HistoryPeriod {
    /// Inclusive bounds of the window relative to `now`
    #[must_use]
    pub fn bounds(&self, now: DateTime<Utc>) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let months_back = |months: u32| now.checked_sub_months(Months::new(months));
        match *self {
            HistoryPeriod::All => (None, None),
            HistoryPeriod::LastMonth => (months_back(1), None),
            HistoryPeriod::LastThreeMonths => (months_back(3), None),
            HistoryPeriod::LastYear => (months_back(12), None),
            HistoryPeriod::Between { from, to } => (Some(from), Some(to)),
        }
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let (from, to) = self.bounds(now);
        from.is_none_or(|from| at >= from) && to.is_none_or(|to| at <= to)
    }
}

impl fmt::Display for HistoryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryPeriod::All => f.write_str("all"),
            HistoryPeriod::LastMonth => f.write_str("1m"),
            HistoryPeriod::LastThreeMonths => f.write_str("3m"),
            HistoryPeriod::LastYear => f.write_str("1y"),
            HistoryPeriod::Between { from, to } => {
                write!(f, "{}..{}", from.to_rfc3339(), to.to_rfc3339())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown history period: {0}")]
pub struct ParsePeriodError(pub String);

impl FromStr for HistoryPeriod {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(HistoryPeriod::All),
            "1m" | "month" | "last_month" => Ok(HistoryPeriod::LastMonth),
            "3m" | "3_months" | "last_3_months" => Ok(HistoryPeriod::LastThreeMonths),
            "1y" | "year" | "last_year" => Ok(HistoryPeriod::LastYear),
            other => Err(ParsePeriodError(other.to_string())),
        }
    }
}

/// A player's result in one finished tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentHistoryEntry {
    pub tournament_id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    pub finished_at: DateTime<Utc>,
    pub rank: usize,
    pub total_players: usize,
    pub score: f64,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub byes: u32,
    /// Percentage, one decimal
    pub win_rate: f64,
    pub rating_before: f64,
    pub rating_after: f64,
    pub rating_delta: f64,
}

/// One step of the rating trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingPoint {
    pub tournament_id: TournamentId,
    pub match_id: MatchId,
    pub recorded_at: DateTime<Utc>,
    pub rating_before: f64,
    pub rating_after: f64,
    /// `Reversal` steps undo an overridden result
    pub kind: RatingChangeKind,
}

/// Totals over the selected tournaments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_tournaments: usize,
    pub total_matches: u32,
    pub total_wins: u32,
    pub total_losses: u32,
    pub total_draws: u32,
    pub total_byes: u32,
    /// Percentage, one decimal
    pub win_rate: f64,
    pub best_rank: Option<usize>,
    pub total_points: f64,
    pub rating_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerHistory {
    pub player_id: PlayerId,
    pub period: HistoryPeriod,
    /// Seed rating in the oldest selected tournament
    pub base_rating: Option<f64>,
    pub stats: HistoryStats,
    /// Most recent first
    pub tournaments: Vec<TournamentHistoryEntry>,
    /// Chronological
    pub trajectory: Vec<RatingPoint>,
}

fn win_rate(wins: u32, matches: u32) -> f64 {
    if matches == 0 {
        return 0.0;
    }
    (f64::from(wins) / f64::from(matches) * 1000.0).round() / 10.0
}

fn entry_for(player_id: PlayerId, tournament: &Tournament) -> Option<TournamentHistoryEntry> {
    let finished_at = tournament.finished_at?;
    let standing = tournament
        .standings()
        .into_iter()
        .find(|s| s.player_id == player_id)?;
    let participant = tournament.participant(standing.participant_id)?;

    Some(TournamentHistoryEntry {
        tournament_id: tournament.id,
        name: tournament.config.name.clone(),
        format: tournament.config.format,
        finished_at,
        rank: standing.rank,
        total_players: tournament.participants.len(),
        score: participant.score,
        wins: participant.wins,
        losses: participant.losses,
        draws: participant.draws,
        byes: participant.byes,
        win_rate: win_rate(participant.wins, participant.matches_played()),
        rating_before: participant.seed_rating,
        rating_after: participant.current_rating,
        rating_delta: participant.current_rating - participant.seed_rating,
    })
}

/// Build a player's history over the finished tournaments in `period`
///
/// Tournaments the player did not take part in, and tournaments that are
/// not finished, are ignored.
#[must_use]
pub fn aggregate_history(
    player_id: PlayerId,
    tournaments: &[Tournament],
    period: HistoryPeriod,
    now: DateTime<Utc>,
) -> PlayerHistory {
    let selected: Vec<&Tournament> = tournaments
        .iter()
        .filter(|t| t.status == TournamentStatus::Finished)
        .filter(|t| t.finished_at.is_some_and(|at| period.contains(at, now)))
        .collect();

    let mut entries: Vec<TournamentHistoryEntry> = selected
        .iter()
        .filter_map(|t| entry_for(player_id, t))
        .collect();
    entries.sort_by(|a, b| b.finished_at.cmp(&a.finished_at));

    let mut trajectory: Vec<RatingPoint> = selected
        .iter()
        .flat_map(|t| t.rating_records_for(player_id))
        .map(|record| RatingPoint {
            tournament_id: record.tournament_id,
            match_id: record.match_id,
            recorded_at: record.recorded_at,
            rating_before: record.elo_before,
            rating_after: record.elo_after,
            kind: record.kind,
        })
        .collect();
    trajectory.sort_by_key(|point| point.recorded_at);

    let mut stats = HistoryStats {
        total_tournaments: entries.len(),
        ..HistoryStats::default()
    };
    for entry in &entries {
        stats.total_wins += entry.wins;
        stats.total_losses += entry.losses;
        stats.total_draws += entry.draws;
        stats.total_byes += entry.byes;
        stats.total_points += entry.score;
        stats.rating_change += entry.rating_delta;
        stats.best_rank = Some(stats.best_rank.map_or(entry.rank, |best| best.min(entry.rank)));
    }
    stats.total_matches = stats.total_wins + stats.total_losses + stats.total_draws;
    stats.win_rate = win_rate(stats.total_wins, stats.total_matches);

    let base_rating = entries.last().map(|entry| entry.rating_before);

    PlayerHistory {
        player_id,
        period,
        base_rating,
        stats,
        tournaments: entries,
        trajectory,
    }
}
