//! Tournament error types.

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use super::models::{MatchId, ParticipantId, PlayerId, TournamentId, TournamentStatus};
use super::state::TournamentAction;
use crate::store::RepositoryError;

/// Reference to an entity that could not be found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Tournament(TournamentId),
    Match(MatchId),
    Participant(ParticipantId),
    Player(PlayerId),
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Tournament(id) => write!(f, "tournament {id}"),
            EntityKind::Match(id) => write!(f, "match {id}"),
            EntityKind::Participant(id) => write!(f, "participant {id}"),
            EntityKind::Player(id) => write!(f, "player {id}"),
        }
    }
}

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    /// Action not allowed from the current status
    #[error("Cannot {action} while tournament is {status}")]
    InvalidTransition {
        status: TournamentStatus,
        action: TournamentAction,
    },

    /// Match already has a result
    #[error("Result already recorded for match {0}")]
    DuplicateResult(MatchId),

    #[error("Insufficient participants: need {needed}, have {current}")]
    InsufficientParticipants { needed: usize, current: usize },

    #[error("Unknown {0}")]
    UnknownEntity(EntityKind),

    /// Request conflicts with the rules of the tournament format
    #[error("Format constraint violated: {0}")]
    FormatConstraintViolation(String),

    /// Match exists but its round is not the open one
    #[error("Match {0} is not in the open round")]
    MatchNotInOpenRound(MatchId),

    #[error("Match {0} has no result to override")]
    NoResultToOverride(MatchId),

    #[error("Player {0} is already registered")]
    AlreadyRegistered(PlayerId),

    #[error("Tournament is full ({0} participants)")]
    TournamentFull(usize),

    #[error("Registration deadline passed at {0}")]
    DeadlinePassed(DateTime<Utc>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Storage collaborator failure
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl TournamentError {
    /// Get a client-safe error message that doesn't leak storage details
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Repository(_) => "Internal server error".to_string(),
            // Don't expose registry ids of other players
            TournamentError::UnknownEntity(EntityKind::Player(_)) => "Unknown player".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
