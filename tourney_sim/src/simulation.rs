//! Simulated tournaments.
//!
//! Players get random seed ratings and every match is decided by a coin
//! weighted with the Elo expected score, so stronger players win more often
//! without winning every time.

use rand::{Rng, SeedableRng, rngs::StdRng};
use std::time::Instant;

use tourney::{
    Outcome, TournamentFormat, TournamentId, TournamentManager, TournamentResult,
    rating::{DEFAULT_RATING, expected_score},
    standings::Standing,
    store::MemoryPlayerRegistry,
    tournament::{PlayerId, TournamentStatus},
};

use crate::config::SimConfig;
use crate::logging;

/// Decides match outcomes from the players' current ratings
#[derive(Debug, Clone, Copy)]
pub struct OutcomeModel {
    draw_probability: f64,
}

impl OutcomeModel {
    /// Draws are only produced for formats that allow them
    pub fn new(format: TournamentFormat, draw_probability: f64) -> Self {
        let draw_probability = if format.allows_draws() {
            draw_probability
        } else {
            0.0
        };
        Self { draw_probability }
    }

    pub fn decide(&self, rng: &mut impl Rng, rating_a: f64, rating_b: f64) -> Outcome {
        if self.draw_probability > 0.0 && rng.random::<f64>() < self.draw_probability {
            return Outcome::Draw;
        }
        if rng.random::<f64>() < expected_score(rating_a, rating_b) {
            Outcome::AWins
        } else {
            Outcome::BWins
        }
    }
}

/// Result of one simulated tournament
#[derive(Debug, Clone)]
pub struct SimReport {
    pub tournament_id: TournamentId,
    pub name: String,
    pub rounds: usize,
    pub matches: usize,
    pub standings: Vec<Standing>,
}

/// Seed RNG for the run, reproducible when a seed is configured
pub fn base_rng(config: &SimConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Registry with `config.players` players, ids starting at 1
pub fn seed_registry(config: &SimConfig, rng: &mut impl Rng) -> MemoryPlayerRegistry {
    let spread = config.rating_spread;
    MemoryPlayerRegistry::with_ratings((1..=config.players as PlayerId).map(|player| {
        let offset = if spread > 0.0 {
            rng.random_range(-spread..=spread)
        } else {
            0.0
        };
        (player, (DEFAULT_RATING + offset).round())
    }))
}

/// Run one tournament from creation to its final standings
///
/// # Errors
///
/// Any engine error; a correct run never produces one.
pub async fn run_tournament(
    manager: &TournamentManager,
    config: &SimConfig,
    name: String,
    mut rng: StdRng,
) -> TournamentResult<SimReport> {
    let started = Instant::now();
    let mut tournament_config = manager.config().tournament_config(name.clone(), config.format);
    if config.format == TournamentFormat::Swiss {
        tournament_config.swiss_rounds = Some(config.swiss_rounds);
    }
    let model = OutcomeModel::new(config.format, config.draw_probability);

    let id = manager.create_tournament(tournament_config).await?;
    manager.publish(id).await?;
    for player in 1..=config.players as PlayerId {
        manager.register_participant(id, player).await?;
    }
    manager.close_registration(id).await?;
    manager.start_tournament(id).await?;

    loop {
        let tournament = manager.get_tournament(id).await?;
        if tournament.status != TournamentStatus::InProgress {
            break;
        }
        let Some(round) = tournament.current_round() else {
            break;
        };
        tracing::debug!(tournament = %name, round = round.number, "Playing round");

        for m in round.matches.iter().filter(|m| !m.is_resolved()) {
            let Some(b) = m.player_b.participant() else {
                continue;
            };
            let rating = |id| {
                tournament
                    .participant(id)
                    .map_or(DEFAULT_RATING, |p| p.current_rating)
            };
            let outcome = model.decide(&mut rng, rating(m.player_a), rating(b));
            manager.submit_result(id, m.id, outcome).await?;
        }
    }

    let tournament = manager.get_tournament(id).await?;
    let matches = tournament
        .rounds
        .iter()
        .flat_map(|r| &r.matches)
        .filter(|m| !m.is_bye())
        .count();
    logging::log_tournament_finished(
        &name,
        tournament.rounds.len(),
        matches,
        started.elapsed().as_millis() as u64,
    );

    Ok(SimReport {
        tournament_id: id,
        name,
        rounds: tournament.rounds.len(),
        matches,
        standings: tournament.standings(),
    })
}

/// Render standings as a fixed-width table
pub fn render_table(report: &SimReport) -> String {
    let mut out = format!(
        "{} ({} rounds, {} matches)\n{:>4}  {:>6}  {:>6}  {:>8}  {:>3}  {:>3}  {:>3}  {:>3}\n",
        report.name,
        report.rounds,
        report.matches,
        "Rank",
        "Player",
        "Score",
        "Rating",
        "W",
        "L",
        "D",
        "Bye"
    );
    for row in &report.standings {
        out.push_str(&format!(
            "{:>4}  {:>6}  {:>6.1}  {:>8.1}  {:>3}  {:>3}  {:>3}  {:>3}\n",
            row.rank, row.player_id, row.score, row.rating, row.wins, row.losses, row.draws, row.byes
        ));
    }
    out
}

/// Render a report as JSON
pub fn render_json(report: &SimReport) -> serde_json::Value {
    serde_json::json!({
        "tournament_id": report.tournament_id,
        "name": report.name,
        "rounds": report.rounds,
        "matches": report.matches,
        "standings": report.standings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tourney::{EngineConfig, store::MemoryTournamentRepository};

    fn config(format: TournamentFormat, players: usize) -> SimConfig {
        SimConfig {
            format,
            players,
            tournaments: 1,
            swiss_rounds: 4,
            draw_probability: 0.2,
            rating_spread: 250.0,
            seed: Some(42),
            json: false,
            history_player: None,
            engine: EngineConfig::default(),
        }
    }

    fn manager(config: &SimConfig) -> TournamentManager {
        let mut rng = base_rng(config);
        TournamentManager::with_config(
            Arc::new(MemoryTournamentRepository::new()),
            Arc::new(seed_registry(config, &mut rng)),
            config.engine.clone(),
        )
    }

    #[test]
    fn test_no_draws_in_elimination() {
        let model = OutcomeModel::new(TournamentFormat::SingleElimination, 0.9);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            assert_ne!(model.decide(&mut rng, 1500.0, 1500.0), Outcome::Draw);
        }
    }

    #[test]
    fn test_stronger_player_usually_wins() {
        let model = OutcomeModel::new(TournamentFormat::Swiss, 0.0);
        let mut rng = StdRng::seed_from_u64(3);
        let wins = (0..1000)
            .filter(|_| model.decide(&mut rng, 1900.0, 1500.0) == Outcome::AWins)
            .count();
        // Expected score is about 0.91
        assert!(wins > 850, "wins = {wins}");
    }

    #[test]
    fn test_seed_registry_within_spread() {
        let config = config(TournamentFormat::Swiss, 32);
        let mut rng = base_rng(&config);
        let registry = seed_registry(&config, &mut rng);
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            use tourney::store::PlayerRegistry;
            for player in 1..=32 {
                let rating = registry.current_rating(player).await.unwrap().unwrap();
                assert!((1250.0..=1750.0).contains(&rating));
            }
            assert!(registry.current_rating(33).await.unwrap().is_none());
        });
    }

    #[tokio::test]
    async fn test_run_every_format() {
        for format in [
            TournamentFormat::SingleElimination,
            TournamentFormat::DoubleElimination,
            TournamentFormat::Swiss,
            TournamentFormat::RoundRobin,
        ] {
            let config = config(format, 9);
            let mgr = manager(&config);
            let report = run_tournament(&mgr, &config, format!("{format}"), base_rng(&config))
                .await
                .unwrap();
            assert_eq!(report.standings.len(), 9);
            assert_eq!(report.standings[0].rank, 1);

            let t = mgr.get_tournament(report.tournament_id).await.unwrap();
            assert_eq!(t.status, TournamentStatus::Finished);
        }
    }

    #[tokio::test]
    async fn test_seeded_runs_are_reproducible() {
        let config = config(TournamentFormat::Swiss, 10);
        let first = run_tournament(&manager(&config), &config, "A".to_string(), base_rng(&config))
            .await
            .unwrap();
        let second = run_tournament(&manager(&config), &config, "A".to_string(), base_rng(&config))
            .await
            .unwrap();
        assert_eq!(first.standings, second.standings);
    }

    #[tokio::test]
    async fn test_render_outputs() {
        let config = config(TournamentFormat::RoundRobin, 4);
        let report = run_tournament(&manager(&config), &config, "League".to_string(), base_rng(&config))
            .await
            .unwrap();

        let table = render_table(&report);
        assert!(table.starts_with("League (3 rounds, 6 matches)"));
        assert_eq!(table.lines().count(), 2 + 4);

        let json = render_json(&report);
        assert_eq!(json["matches"], 6);
        assert_eq!(json["standings"].as_array().unwrap().len(), 4);
    }
}
