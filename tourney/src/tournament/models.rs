//! Tournament data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::errors::{TournamentError, TournamentResult};
use crate::rating::{DEFAULT_K_FACTOR, Outcome};

/// Tournament ID type
pub type TournamentId = Uuid;

/// Player ID type (owned by the player registry)
pub type PlayerId = i64;

/// Index of a participant inside one tournament, in registration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub u32);

impl ParticipantId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0 + 1)
    }
}

/// Match identifier, unique within one tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub u32);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

/// Competitive format, selects the pairing strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    SingleElimination,
    DoubleElimination,
    Swiss,
    RoundRobin,
}

impl TournamentFormat {
    /// Elimination brackets need a winner for every match
    #[must_use]
    pub const fn allows_draws(self) -> bool {
        matches!(self, TournamentFormat::Swiss | TournamentFormat::RoundRobin)
    }

    #[must_use]
    pub const fn is_elimination(self) -> bool {
        !self.allows_draws()
    }
}

impl fmt::Display for TournamentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TournamentFormat::SingleElimination => "single_elimination",
            TournamentFormat::DoubleElimination => "double_elimination",
            TournamentFormat::Swiss => "swiss",
            TournamentFormat::RoundRobin => "round_robin",
        };
        f.write_str(name)
    }
}

/// Tournament lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Created, not yet visible for registration
    Draft,
    /// Accepting registrations
    RegistrationOpen,
    /// Participant list frozen, waiting to start
    RegistrationClosed,
    /// Rounds are being played
    InProgress,
    /// Terminal condition of the format reached
    Finished,
    /// Cancelled by an administrator
    Cancelled,
}

impl TournamentStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, TournamentStatus::Finished | TournamentStatus::Cancelled)
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TournamentStatus::Draft => "draft",
            TournamentStatus::RegistrationOpen => "registration_open",
            TournamentStatus::RegistrationClosed => "registration_closed",
            TournamentStatus::InProgress => "in_progress",
            TournamentStatus::Finished => "finished",
            TournamentStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Points awarded per match outcome
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringRules {
    pub win: f64,
    pub draw: f64,
    pub loss: f64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            win: 1.0,
            draw: 0.5,
            loss: 0.0,
        }
    }
}

impl ScoringRules {
    /// Football-style 3 / 1 / 0 points
    #[must_use]
    pub const fn three_one_zero() -> Self {
        Self {
            win: 3.0,
            draw: 1.0,
            loss: 0.0,
        }
    }
}

/// Tournament configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Tournament name
    pub name: String,
    /// Pairing format
    pub format: TournamentFormat,
    /// Elo K-factor applied to every rated match
    pub k_factor: f64,
    /// Points per outcome
    pub scoring: ScoringRules,
    /// Fixed round count, Swiss only
    pub swiss_rounds: Option<u32>,
    /// Minimum participants needed to start
    pub min_participants: usize,
    /// Registration cap
    pub max_participants: Option<usize>,
    /// Registration closes automatically at this instant
    pub registration_deadline: Option<DateTime<Utc>>,
    /// Only checked-in participants take part once play starts
    #[serde(default)]
    pub check_in_required: bool,
}

impl TournamentConfig {
    fn base(name: impl Into<String>, format: TournamentFormat) -> Self {
        Self {
            name: name.into(),
            format,
            k_factor: DEFAULT_K_FACTOR,
            scoring: ScoringRules::default(),
            swiss_rounds: None,
            min_participants: 2,
            max_participants: None,
            registration_deadline: None,
            check_in_required: false,
        }
    }

    /// Single elimination bracket
    #[must_use]
    pub fn single_elimination(name: impl Into<String>) -> Self {
        Self::base(name, TournamentFormat::SingleElimination)
    }

    /// Double elimination bracket with grand final and bracket reset
    #[must_use]
    pub fn double_elimination(name: impl Into<String>) -> Self {
        Self::base(name, TournamentFormat::DoubleElimination)
    }

    /// Swiss system with a fixed number of rounds
    #[must_use]
    pub fn swiss(name: impl Into<String>, rounds: u32) -> Self {
        Self {
            swiss_rounds: Some(rounds),
            ..Self::base(name, TournamentFormat::Swiss)
        }
    }

    /// Full round robin
    #[must_use]
    pub fn round_robin(name: impl Into<String>) -> Self {
        Self::base(name, TournamentFormat::RoundRobin)
    }

    #[must_use]
    pub fn with_k_factor(mut self, k_factor: f64) -> Self {
        self.k_factor = k_factor;
        self
    }

    #[must_use]
    pub fn with_scoring(mut self, scoring: ScoringRules) -> Self {
        self.scoring = scoring;
        self
    }

    #[must_use]
    pub fn with_min_participants(mut self, min: usize) -> Self {
        self.min_participants = min;
        self
    }

    #[must_use]
    pub fn with_max_participants(mut self, max: usize) -> Self {
        self.max_participants = Some(max);
        self
    }

    #[must_use]
    pub fn with_registration_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.registration_deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn with_check_in_required(mut self) -> Self {
        self.check_in_required = true;
        self
    }

    /// Check the configuration for internal consistency
    ///
    /// # Errors
    ///
    /// - `FormatConstraintViolation` if the Swiss round count is missing, zero,
    ///   or set for a non-Swiss format
    /// - `InvalidConfig` for any other inconsistent field
    pub fn validate(&self) -> TournamentResult<()> {
        match (self.format, self.swiss_rounds) {
            (TournamentFormat::Swiss, None) => {
                return Err(TournamentError::FormatConstraintViolation(
                    "swiss tournaments need a fixed round count".to_string(),
                ));
            }
            (TournamentFormat::Swiss, Some(0)) => {
                return Err(TournamentError::FormatConstraintViolation(
                    "swiss round count must be at least 1".to_string(),
                ));
            }
            (format, Some(_)) if format != TournamentFormat::Swiss => {
                return Err(TournamentError::FormatConstraintViolation(format!(
                    "round count only applies to swiss, not {format}"
                )));
            }
            _ => {}
        }

        if self.name.trim().is_empty() {
            return Err(TournamentError::InvalidConfig(
                "name must not be empty".to_string(),
            ));
        }

        if !self.k_factor.is_finite() || self.k_factor <= 0.0 {
            return Err(TournamentError::InvalidConfig(format!(
                "k-factor must be positive, got {}",
                self.k_factor
            )));
        }

        let ScoringRules { win, draw, loss } = self.scoring;
        if ![win, draw, loss].iter().all(|p| p.is_finite()) || win < draw || draw < loss {
            return Err(TournamentError::InvalidConfig(
                "scoring must satisfy win >= draw >= loss".to_string(),
            ));
        }

        if self.min_participants < 2 {
            return Err(TournamentError::InvalidConfig(
                "at least 2 participants are required".to_string(),
            ));
        }

        if let Some(max) = self.max_participants
            && max < self.min_participants
        {
            return Err(TournamentError::InvalidConfig(format!(
                "max participants {max} is below minimum {}",
                self.min_participants
            )));
        }

        Ok(())
    }
}

/// A player inside one tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub player_id: PlayerId,
    /// Rating taken from the registry at registration
    pub seed_rating: f64,
    pub current_rating: f64,
    pub score: f64,
    /// Includes byes
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub byes: u32,
    pub registered_at: DateTime<Utc>,
    #[serde(default)]
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl Participant {
    #[must_use]
    pub fn new(
        id: ParticipantId,
        player_id: PlayerId,
        rating: f64,
        registered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            player_id,
            seed_rating: rating,
            current_rating: rating,
            score: 0.0,
            wins: 0,
            losses: 0,
            draws: 0,
            byes: 0,
            registered_at,
            checked_in_at: None,
        }
    }

    #[must_use]
    pub const fn is_checked_in(&self) -> bool {
        self.checked_in_at.is_some()
    }

    /// Matches with a result, byes included
    #[must_use]
    pub const fn matches_played(&self) -> u32 {
        self.wins + self.losses + self.draws
    }
}

/// Second seat of a match: a participant or the bye sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Participant(ParticipantId),
    Bye,
}

impl Slot {
    #[must_use]
    pub const fn participant(self) -> Option<ParticipantId> {
        match self {
            Slot::Participant(id) => Some(id),
            Slot::Bye => None,
        }
    }
}

/// Bracket a match belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bracket {
    /// Winners bracket, or the only bracket of non-elimination formats
    Main,
    Losers,
    GrandFinal,
    BracketReset,
}

/// Human-facing label for where a match sits in the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    Qualification,
    QuarterFinal,
    SemiFinal,
    Final,
    WinnersFinal,
    LosersBracket,
    LosersFinal,
    GrandFinal,
    BracketReset,
}

impl MatchPhase {
    /// Phase of a bracket stage given how many stages follow it
    #[must_use]
    pub const fn from_stages_remaining(remaining: u32) -> Self {
        match remaining {
            0 => MatchPhase::Final,
            1 => MatchPhase::SemiFinal,
            2 => MatchPhase::QuarterFinal,
            _ => MatchPhase::Qualification,
        }
    }
}

/// Recorded result of a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub outcome: Outcome,
    pub recorded_at: DateTime<Utc>,
    /// Set when an administrator replaced the original result
    pub override_reason: Option<String>,
}

/// A single pairing inside a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub round: u32,
    pub bracket: Bracket,
    /// Stage inside the bracket (1-based)
    pub stage: u32,
    /// Position inside the stage (0-based)
    pub position: u32,
    pub phase: MatchPhase,
    pub player_a: ParticipantId,
    pub player_b: Slot,
    pub result: Option<MatchResult>,
    /// Cancelled before a result was recorded
    pub voided: bool,
}

impl Match {
    #[must_use]
    pub const fn is_bye(&self) -> bool {
        matches!(self.player_b, Slot::Bye)
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.result.is_some()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.result.as_ref().map(|r| r.outcome)
    }

    /// Winner of a resolved, decisive match
    #[must_use]
    pub fn winner(&self) -> Option<ParticipantId> {
        match self.outcome()? {
            Outcome::AWins => Some(self.player_a),
            Outcome::BWins => self.player_b.participant(),
            Outcome::Draw => None,
        }
    }

    /// Loser of a resolved, decisive match; byes have none
    #[must_use]
    pub fn loser(&self) -> Option<ParticipantId> {
        match self.outcome()? {
            Outcome::AWins => self.player_b.participant(),
            Outcome::BWins => Some(self.player_a),
            Outcome::Draw => None,
        }
    }

    #[must_use]
    pub fn involves(&self, participant: ParticipantId) -> bool {
        self.player_a == participant || self.player_b == Slot::Participant(participant)
    }

    #[must_use]
    pub fn opponent_of(&self, participant: ParticipantId) -> Option<Slot> {
        if self.player_a == participant {
            Some(self.player_b)
        } else if self.player_b == Slot::Participant(participant) {
            Some(Slot::Participant(self.player_a))
        } else {
            None
        }
    }
}

/// Round status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    Pending,
    InProgress,
    Complete,
    /// Abandoned by cancellation
    Void,
}

/// An ordered set of matches played together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub number: u32,
    pub status: RoundStatus,
    pub matches: Vec<Match>,
}

impl Round {
    #[must_use]
    pub fn is_fully_resolved(&self) -> bool {
        self.matches.iter().all(Match::is_resolved)
    }

    #[must_use]
    pub fn find_match(&self, match_id: MatchId) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == match_id)
    }
}

/// Why a rating record was written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingChangeKind {
    /// Regular result ingestion
    Result,
    /// Compensation for an overridden result
    Reversal,
}

/// Append-only rating change entry, one per participant per rated match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub tournament_id: TournamentId,
    pub participant_id: ParticipantId,
    pub player_id: PlayerId,
    pub match_id: MatchId,
    pub elo_before: f64,
    pub elo_after: f64,
    pub kind: RatingChangeKind,
    pub recorded_at: DateTime<Utc>,
}

impl RatingRecord {
    #[must_use]
    pub fn delta(&self) -> f64 {
        self.elo_after - self.elo_before
    }
}

/// Lightweight tournament listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentSummary {
    pub id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    pub status: TournamentStatus,
    pub participant_count: usize,
    /// Number of the open round, if any
    pub current_round: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// How far a tournament has come
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentProgress {
    pub status: TournamentStatus,
    /// Number of the open round, if any
    pub current_round: Option<u32>,
    pub completed_rounds: u32,
    /// Grows by one when a bracket reset is played
    pub total_rounds: u32,
    /// Byes included
    pub completed_matches: usize,
    /// Matches generated so far
    pub total_matches: usize,
    pub active_participants: usize,
    pub eliminated_participants: usize,
    /// Percentage, one decimal
    pub percent_complete: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let se = TournamentConfig::single_elimination("Cup");
        assert_eq!(se.format, TournamentFormat::SingleElimination);
        assert_eq!(se.k_factor, DEFAULT_K_FACTOR);
        assert!(se.validate().is_ok());

        let swiss = TournamentConfig::swiss("Open", 5);
        assert_eq!(swiss.swiss_rounds, Some(5));
        assert!(swiss.validate().is_ok());

        assert!(TournamentConfig::round_robin("League").validate().is_ok());
        assert!(TournamentConfig::double_elimination("Major").validate().is_ok());
    }

    #[test]
    fn test_swiss_requires_rounds() {
        let mut config = TournamentConfig::swiss("Open", 0);
        assert!(matches!(
            config.validate(),
            Err(TournamentError::FormatConstraintViolation(_))
        ));

        config.swiss_rounds = None;
        assert!(matches!(
            config.validate(),
            Err(TournamentError::FormatConstraintViolation(_))
        ));
    }

    #[test]
    fn test_rounds_rejected_for_other_formats() {
        let mut config = TournamentConfig::round_robin("League");
        config.swiss_rounds = Some(3);
        assert!(matches!(
            config.validate(),
            Err(TournamentError::FormatConstraintViolation(_))
        ));
    }

    #[test]
    fn test_invalid_config_fields() {
        let bad_k = TournamentConfig::round_robin("League").with_k_factor(0.0);
        assert!(matches!(bad_k.validate(), Err(TournamentError::InvalidConfig(_))));

        let bad_scoring = TournamentConfig::round_robin("League").with_scoring(ScoringRules {
            win: 1.0,
            draw: 2.0,
            loss: 0.0,
        });
        assert!(matches!(
            bad_scoring.validate(),
            Err(TournamentError::InvalidConfig(_))
        ));

        let bad_cap = TournamentConfig::round_robin("League")
            .with_min_participants(4)
            .with_max_participants(3);
        assert!(matches!(bad_cap.validate(), Err(TournamentError::InvalidConfig(_))));

        let unnamed = TournamentConfig::round_robin("  ");
        assert!(matches!(unnamed.validate(), Err(TournamentError::InvalidConfig(_))));
    }

    #[test]
    fn test_three_one_zero_scoring() {
        let config =
            TournamentConfig::round_robin("League").with_scoring(ScoringRules::three_one_zero());
        assert!(config.validate().is_ok());
        assert_eq!(config.scoring.win, 3.0);
    }

    #[test]
    fn test_match_winner_and_loser() {
        let mut m = Match {
            id: MatchId(1),
            round: 1,
            bracket: Bracket::Main,
            stage: 1,
            position: 0,
            phase: MatchPhase::Final,
            player_a: ParticipantId(0),
            player_b: Slot::Participant(ParticipantId(1)),
            result: None,
            voided: false,
        };
        assert_eq!(m.winner(), None);

        m.result = Some(MatchResult {
            outcome: Outcome::BWins,
            recorded_at: Utc::now(),
            override_reason: None,
        });
        assert_eq!(m.winner(), Some(ParticipantId(1)));
        assert_eq!(m.loser(), Some(ParticipantId(0)));
        assert_eq!(
            m.opponent_of(ParticipantId(1)),
            Some(Slot::Participant(ParticipantId(0)))
        );
        assert_eq!(m.opponent_of(ParticipantId(7)), None);
    }

    #[test]
    fn test_bye_has_no_loser() {
        let m = Match {
            id: MatchId(1),
            round: 1,
            bracket: Bracket::Main,
            stage: 1,
            position: 0,
            phase: MatchPhase::SemiFinal,
            player_a: ParticipantId(0),
            player_b: Slot::Bye,
            result: Some(MatchResult {
                outcome: Outcome::AWins,
                recorded_at: Utc::now(),
                override_reason: None,
            }),
            voided: false,
        };
        assert!(m.is_bye());
        assert_eq!(m.winner(), Some(ParticipantId(0)));
        assert_eq!(m.loser(), None);
    }

    #[test]
    fn test_phase_from_stages_remaining() {
        assert_eq!(MatchPhase::from_stages_remaining(0), MatchPhase::Final);
        assert_eq!(MatchPhase::from_stages_remaining(1), MatchPhase::SemiFinal);
        assert_eq!(MatchPhase::from_stages_remaining(2), MatchPhase::QuarterFinal);
        assert_eq!(MatchPhase::from_stages_remaining(5), MatchPhase::Qualification);
    }

    #[test]
    fn test_display() {
        assert_eq!(ParticipantId(0).to_string(), "P1");
        assert_eq!(MatchId(4).to_string(), "M4");
        assert_eq!(TournamentStatus::InProgress.to_string(), "in_progress");
        assert_eq!(TournamentFormat::Swiss.to_string(), "swiss");
    }
}
