//! Tournament manager for creating and running tournaments.
//!
//! Each tournament is its own unit of mutual exclusion: mutations on one
//! tournament are serialised behind a per-tournament lock while different
//! tournaments proceed in parallel. Every mutation loads a fresh copy of
//! the aggregate, applies the operation and saves the whole aggregate only
//! if the operation succeeded. A tournament's lock is dropped once it
//! finishes or is cancelled.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::aggregate::{ResultReceipt, Tournament};
use super::errors::{EntityKind, TournamentError, TournamentResult};
use super::models::{
    MatchId, ParticipantId, PlayerId, TournamentConfig, TournamentId, TournamentProgress,
    TournamentStatus, TournamentSummary,
};
use crate::config::EngineConfig;
use crate::history::{HistoryPeriod, PlayerHistory, aggregate_history};
use crate::rating::Outcome;
use crate::standings::Standing;
use crate::store::{PlayerRegistry, TournamentRepository};

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    repository: Arc<dyn TournamentRepository>,
    registry: Arc<dyn PlayerRegistry>,
    config: EngineConfig,
    /// Per-tournament write locks
    locks: Arc<RwLock<HashMap<TournamentId, Arc<Mutex<()>>>>>,
}

impl TournamentManager {
    /// Create a new tournament manager with default engine settings
    pub fn new(
        repository: Arc<dyn TournamentRepository>,
        registry: Arc<dyn PlayerRegistry>,
    ) -> Self {
        Self::with_config(repository, registry, EngineConfig::default())
    }

    pub fn with_config(
        repository: Arc<dyn TournamentRepository>,
        registry: Arc<dyn PlayerRegistry>,
        config: EngineConfig,
    ) -> Self {
        Self {
            repository,
            registry,
            config,
            locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn lock_for(&self, id: TournamentId) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(&id) {
            return Arc::clone(lock);
        }
        let mut locks = self.locks.write().await;
        Arc::clone(locks.entry(id).or_default())
    }

    async fn load(&self, id: TournamentId) -> TournamentResult<Tournament> {
        self.repository
            .load(id)
            .await?
            .ok_or(TournamentError::UnknownEntity(EntityKind::Tournament(id)))
    }

    /// Run `operation` on a fresh copy under the tournament's lock and save
    /// the result only if it succeeded
    async fn mutate<T>(
        &self,
        id: TournamentId,
        operation: impl FnOnce(&mut Tournament) -> TournamentResult<T>,
    ) -> TournamentResult<T> {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let mut tournament = self.load(id).await?;
        let result = operation(&mut tournament);
        match &result {
            Ok(_) => self.repository.save(&tournament).await?,
            Err(e) => log::warn!("Tournament {id}: {e}"),
        }
        if tournament.status.is_terminal() {
            // Terminal tournaments reject every further mutation
            self.locks.write().await.remove(&id);
        }
        result
    }

    /// Create a new tournament in `Draft`
    ///
    /// # Arguments
    ///
    /// * `config` - Format, scoring and registration settings
    ///
    /// # Returns
    ///
    /// * `TournamentResult<TournamentId>` - ID of the new tournament
    ///
    /// # Errors
    ///
    /// Configuration validation errors, storage errors.
    pub async fn create_tournament(&self, config: TournamentConfig) -> TournamentResult<TournamentId> {
        let tournament = Tournament::new(config, Utc::now())?;
        self.repository.save(&tournament).await?;
        log::info!(
            "Created {} tournament {} ({})",
            tournament.config.format,
            tournament.id,
            tournament.config.name
        );
        Ok(tournament.id)
    }

    /// Open registration
    pub async fn publish(&self, id: TournamentId) -> TournamentResult<()> {
        self.mutate(id, Tournament::publish).await
    }

    /// Register a player, seeding them with the registry's current rating
    ///
    /// # Arguments
    ///
    /// * `id` - Tournament ID
    /// * `player_id` - Registry ID of the player
    ///
    /// # Returns
    ///
    /// * `TournamentResult<ParticipantId>` - Participant ID inside the tournament
    ///
    /// # Errors
    ///
    /// `UnknownEntity` for an unknown player when unrated players are not
    /// allowed, plus every error of [`Tournament::register`].
    pub async fn register_participant(
        &self,
        id: TournamentId,
        player_id: PlayerId,
    ) -> TournamentResult<ParticipantId> {
        let rating = match self.registry.current_rating(player_id).await? {
            Some(rating) => rating,
            None if self.config.allow_unrated_players => self.config.default_rating,
            None => return Err(TournamentError::UnknownEntity(EntityKind::Player(player_id))),
        };

        let participant = self
            .mutate(id, |t| t.register(player_id, rating, Utc::now()))
            .await?;
        log::debug!("Player {player_id} registered in {id} as {participant} at {rating:.1}");
        Ok(participant)
    }

    /// Remove a player while registration is open
    pub async fn withdraw_participant(
        &self,
        id: TournamentId,
        player_id: PlayerId,
    ) -> TournamentResult<()> {
        self.mutate(id, |t| t.withdraw(player_id)).await
    }

    pub async fn close_registration(&self, id: TournamentId) -> TournamentResult<()> {
        self.mutate(id, Tournament::close_registration).await
    }

    pub async fn reopen_registration(&self, id: TournamentId) -> TournamentResult<()> {
        self.mutate(id, |t| t.reopen_registration(Utc::now())).await
    }

    /// Close every open registration whose deadline is at or before `now`
    ///
    /// # Returns
    ///
    /// * `TournamentResult<Vec<TournamentId>>` - Tournaments that were closed
    pub async fn close_expired_registrations(
        &self,
        now: DateTime<Utc>,
    ) -> TournamentResult<Vec<TournamentId>> {
        let candidates: Vec<TournamentId> = self
            .repository
            .list()
            .await?
            .into_iter()
            .filter(|t| t.status == TournamentStatus::RegistrationOpen)
            .filter(|t| t.config.registration_deadline.is_some_and(|d| d <= now))
            .map(|t| t.id)
            .collect();

        let mut closed = Vec::with_capacity(candidates.len());
        for id in candidates {
            // Status may have changed since listing, so re-check under the lock
            if self.mutate(id, |t| t.close_if_deadline_passed(now)).await? {
                log::info!("Registration deadline reached for tournament {id}");
                closed.push(id);
            }
        }
        Ok(closed)
    }

    /// Confirm a registered player's attendance
    pub async fn check_in_participant(
        &self,
        id: TournamentId,
        player_id: PlayerId,
    ) -> TournamentResult<ParticipantId> {
        self.mutate(id, |t| t.check_in(player_id, Utc::now())).await
    }

    /// Start play and generate the first round
    pub async fn start_tournament(&self, id: TournamentId) -> TournamentResult<()> {
        self.mutate(id, |t| t.start(Utc::now())).await
    }

    /// Record a match result
    ///
    /// # Arguments
    ///
    /// * `id` - Tournament ID
    /// * `match_id` - Match in the open round
    /// * `outcome` - Result from the perspective of side A
    ///
    /// # Returns
    ///
    /// * `TournamentResult<ResultReceipt>` - Rating changes and follow-up state
    pub async fn submit_result(
        &self,
        id: TournamentId,
        match_id: MatchId,
        outcome: Outcome,
    ) -> TournamentResult<ResultReceipt> {
        self.mutate(id, |t| t.submit_result(match_id, outcome, Utc::now()))
            .await
    }

    /// Administrative correction of a recorded result
    pub async fn override_result(
        &self,
        id: TournamentId,
        match_id: MatchId,
        outcome: Outcome,
        reason: impl Into<String>,
    ) -> TournamentResult<ResultReceipt> {
        let reason = reason.into();
        self.mutate(id, |t| t.override_result(match_id, outcome, reason, Utc::now()))
            .await
    }

    /// Cancel a tournament that has not finished
    pub async fn cancel_tournament(
        &self,
        id: TournamentId,
        reason: Option<String>,
    ) -> TournamentResult<()> {
        self.mutate(id, |t| t.cancel(reason, Utc::now())).await
    }

    /// Current standings, recomputed from the stored aggregate
    pub async fn get_standings(&self, id: TournamentId) -> TournamentResult<Vec<Standing>> {
        Ok(self.load(id).await?.standings())
    }

    pub async fn get_tournament(&self, id: TournamentId) -> TournamentResult<Tournament> {
        self.load(id).await
    }

    pub async fn get_progress(&self, id: TournamentId) -> TournamentResult<TournamentProgress> {
        Ok(self.load(id).await?.progress())
    }

    /// List tournaments, optionally filtered by status
    pub async fn list_tournaments(
        &self,
        status: Option<TournamentStatus>,
    ) -> TournamentResult<Vec<TournamentSummary>> {
        Ok(self
            .repository
            .list()
            .await?
            .iter()
            .filter(|t| status.is_none_or(|s| t.status == s))
            .map(Tournament::summary)
            .collect())
    }

    /// Cross-tournament history of a player over finished tournaments
    pub async fn get_player_history(
        &self,
        player_id: PlayerId,
        period: HistoryPeriod,
    ) -> TournamentResult<PlayerHistory> {
        let tournaments = self.repository.tournaments_for_player(player_id).await?;
        Ok(aggregate_history(player_id, &tournaments, period, Utc::now()))
    }
}
