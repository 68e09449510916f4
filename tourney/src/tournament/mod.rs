//! Tournament lifecycle, aggregate and manager.
//!
//! This module provides:
//! - Tournament configuration and data models
//! - The lifecycle transition table
//! - The [`Tournament`] aggregate with its synchronous operations
//! - The async [`TournamentManager`] that serialises mutations per
//!   tournament and persists each committed transition
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tourney::rating::Outcome;
//! use tourney::store::{MemoryPlayerRegistry, MemoryTournamentRepository};
//! use tourney::tournament::{TournamentConfig, TournamentManager, TournamentStatus};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let manager = TournamentManager::new(
//!     Arc::new(MemoryTournamentRepository::new()),
//!     Arc::new(MemoryPlayerRegistry::new()),
//! );
//!
//! let id = manager
//!     .create_tournament(TournamentConfig::single_elimination("Friday Cup"))
//!     .await?;
//! manager.publish(id).await?;
//! for player in 1..=2 {
//!     manager.register_participant(id, player).await?;
//! }
//! manager.close_registration(id).await?;
//! manager.start_tournament(id).await?;
//!
//! let tournament = manager.get_tournament(id).await?;
//! let final_match = tournament.current_round().unwrap().matches[0].id;
//! let receipt = manager.submit_result(id, final_match, Outcome::AWins).await?;
//! assert_eq!(receipt.status, TournamentStatus::Finished);
//! # Ok::<(), tourney::tournament::TournamentError>(())
//! # }).unwrap();
//! ```

pub mod aggregate;
pub mod errors;
pub mod manager;
pub mod models;
pub mod state;

pub use aggregate::{ResultReceipt, Tournament};
pub use errors::{EntityKind, TournamentError, TournamentResult};
pub use manager::TournamentManager;
pub use models::{
    Bracket, Match, MatchId, MatchPhase, MatchResult, Participant, ParticipantId, PlayerId,
    RatingChangeKind, RatingRecord, Round, RoundStatus, ScoringRules, Slot, TournamentConfig,
    TournamentFormat, TournamentId, TournamentProgress, TournamentStatus, TournamentSummary,
};
pub use state::{TournamentAction, Transition, available_actions, next_status};
