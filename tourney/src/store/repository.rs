//! Repository trait definitions for testability and dependency injection.

use async_trait::async_trait;

use super::errors::RepositoryResult;
use crate::tournament::{PlayerId, Tournament, TournamentId};

/// Whole-aggregate tournament storage
///
/// `save` replaces the stored aggregate atomically; `load` returns an
/// independent copy the caller may mutate freely.
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Load a tournament by ID
    async fn load(&self, id: TournamentId) -> RepositoryResult<Option<Tournament>>;

    /// Insert or replace a tournament
    async fn save(&self, tournament: &Tournament) -> RepositoryResult<()>;

    /// All stored tournaments, oldest first
    async fn list(&self) -> RepositoryResult<Vec<Tournament>>;

    /// Tournaments in which the player is registered, oldest first
    async fn tournaments_for_player(&self, player_id: PlayerId)
    -> RepositoryResult<Vec<Tournament>>;
}

/// Source of player ratings, queried only at registration
#[async_trait]
pub trait PlayerRegistry: Send + Sync {
    /// Current rating of a player, `None` if the player is unknown
    async fn current_rating(&self, player_id: PlayerId) -> RepositoryResult<Option<f64>>;
}
