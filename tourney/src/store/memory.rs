//! In-memory collaborators backed by `serde_json` snapshots.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;

use super::errors::RepositoryResult;
use super::repository::{PlayerRegistry, TournamentRepository};
use crate::tournament::{PlayerId, Tournament, TournamentId};

#[derive(Default)]
struct Snapshots {
    tournaments: HashMap<TournamentId, String>,
    by_player: HashMap<PlayerId, BTreeSet<TournamentId>>,
}

/// Tournament repository keeping JSON snapshots in memory
///
/// Every `save` serialises the whole aggregate and every `load` decodes a
/// fresh copy, so callers never share mutable state with the store.
#[derive(Default)]
pub struct MemoryTournamentRepository {
    inner: RwLock<Snapshots>,
}

impl MemoryTournamentRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tournaments
    pub async fn len(&self) -> usize {
        self.inner.read().await.tournaments.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn decode_sorted<'a>(
        snapshots: impl Iterator<Item = &'a String>,
    ) -> RepositoryResult<Vec<Tournament>> {
        let mut tournaments = snapshots
            .map(|json| serde_json::from_str::<Tournament>(json))
            .collect::<Result<Vec<_>, _>>()?;
        tournaments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(tournaments)
    }
}

#[async_trait]
impl TournamentRepository for MemoryTournamentRepository {
    async fn load(&self, id: TournamentId) -> RepositoryResult<Option<Tournament>> {
        let inner = self.inner.read().await;
        inner
            .tournaments
            .get(&id)
            .map(|json| serde_json::from_str(json))
            .transpose()
            .map_err(Into::into)
    }

    async fn save(&self, tournament: &Tournament) -> RepositoryResult<()> {
        // Encode before taking the lock so a failure leaves the store untouched
        let json = serde_json::to_string(tournament)?;

        let mut inner = self.inner.write().await;
        for ids in inner.by_player.values_mut() {
            ids.remove(&tournament.id);
        }
        for participant in &tournament.participants {
            inner
                .by_player
                .entry(participant.player_id)
                .or_default()
                .insert(tournament.id);
        }
        inner.by_player.retain(|_, ids| !ids.is_empty());
        inner.tournaments.insert(tournament.id, json);
        Ok(())
    }

    async fn list(&self) -> RepositoryResult<Vec<Tournament>> {
        let inner = self.inner.read().await;
        Self::decode_sorted(inner.tournaments.values())
    }

    async fn tournaments_for_player(
        &self,
        player_id: PlayerId,
    ) -> RepositoryResult<Vec<Tournament>> {
        let inner = self.inner.read().await;
        let Some(ids) = inner.by_player.get(&player_id) else {
            return Ok(Vec::new());
        };
        Self::decode_sorted(ids.iter().filter_map(|id| inner.tournaments.get(id)))
    }
}

/// Player registry holding ratings in a map
#[derive(Default)]
pub struct MemoryPlayerRegistry {
    ratings: RwLock<HashMap<PlayerId, f64>>,
}

impl MemoryPlayerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-filled with `(player, rating)` pairs
    #[must_use]
    pub fn with_ratings(ratings: impl IntoIterator<Item = (PlayerId, f64)>) -> Self {
        Self {
            ratings: RwLock::new(ratings.into_iter().collect()),
        }
    }

    pub async fn set_rating(&self, player_id: PlayerId, rating: f64) {
        self.ratings.write().await.insert(player_id, rating);
    }
}

#[async_trait]
impl PlayerRegistry for MemoryPlayerRegistry {
    async fn current_rating(&self, player_id: PlayerId) -> RepositoryResult<Option<f64>> {
        Ok(self.ratings.read().await.get(&player_id).copied())
    }
}
