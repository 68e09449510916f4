//! Tournament simulator.
//!
//! Seeds a registry of rated players, runs simulated tournaments
//! concurrently through the engine and prints the final standings.

mod config;
mod logging;
mod simulation;

use std::sync::Arc;

use anyhow::Error;
use pico_args::Arguments;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tourney::{HistoryPeriod, TournamentManager, store::MemoryTournamentRepository};

use config::{SimConfig, SimOverrides};

const HELP: &str = "\
Simulate rated tournaments with the tourney engine

USAGE:
  tourney_sim [OPTIONS]

OPTIONS:
  --format       NAME    single_elimination, double_elimination, swiss, round_robin  [default: env SIM_FORMAT or swiss]
  --players      N       Players per tournament                 [default: env SIM_PLAYERS or 16]
  --tournaments  N       Tournaments run concurrently           [default: env SIM_TOURNAMENTS or 1]
  --rounds       N       Rounds for Swiss events                [default: env SIM_SWISS_ROUNDS or 5]
  --seed         N       RNG seed for a reproducible run        [default: env SIM_SEED]
  --history      PLAYER  Print this player's history afterwards
  --period       PERIOD  History window: all, 1m, 3m, 1y        [default: all]

FLAGS:
  --json                 Print JSON instead of tables
  -h, --help             Print help information

ENVIRONMENT:
  SIM_DRAW_PROBABILITY   Chance of a draw where allowed         [default: 0.1]
  SIM_RATING_SPREAD      Seed ratings are 1500 +/- this         [default: 300]
  TOURNEY_K_FACTOR       Elo K-factor                           [default: 32]
  RUST_LOG               Log filter                             [default: info]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = SimOverrides {
        format: pargs.opt_value_from_str("--format")?,
        players: pargs.opt_value_from_str("--players")?,
        tournaments: pargs.opt_value_from_str("--tournaments")?,
        swiss_rounds: pargs.opt_value_from_str("--rounds")?,
        seed: pargs.opt_value_from_str("--seed")?,
        json: pargs.contains("--json"),
        history_player: pargs.opt_value_from_str("--history")?,
    };
    let period: HistoryPeriod = pargs
        .opt_value_from_str("--period")?
        .unwrap_or_default();

    logging::init();

    let config = SimConfig::from_env(overrides)?;
    config.validate()?;
    tracing::info!(
        format = %config.format,
        players = config.players,
        tournaments = config.tournaments,
        seed = ?config.seed,
        "Starting simulation"
    );

    let mut rng = simulation::base_rng(&config);
    let registry = simulation::seed_registry(&config, &mut rng);
    let manager = TournamentManager::with_config(
        Arc::new(MemoryTournamentRepository::new()),
        Arc::new(registry),
        config.engine.clone(),
    );

    let mut handles = Vec::with_capacity(config.tournaments);
    for i in 0..config.tournaments {
        let manager = manager.clone();
        let config = config.clone();
        let tournament_rng = StdRng::seed_from_u64(rng.random());
        let name = format!("{} #{}", config.format, i + 1);
        handles.push(tokio::spawn(async move {
            simulation::run_tournament(&manager, &config, name, tournament_rng).await
        }));
    }

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        reports.push(handle.await??);
    }

    let history = match config.history_player {
        Some(player) => Some(manager.get_player_history(player, period).await?),
        None => None,
    };

    if config.json {
        let output = serde_json::json!({
            "tournaments": reports.iter().map(simulation::render_json).collect::<Vec<_>>(),
            "history": history,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for report in &reports {
            println!("{}", simulation::render_table(report));
        }
        if let Some(history) = history {
            let stats = &history.stats;
            println!(
                "Player {} ({}): {} tournaments, {}W {}L {}D, win rate {:.1}%, best rank {}, rating change {:+.1}",
                history.player_id,
                history.period,
                stats.total_tournaments,
                stats.total_wins,
                stats.total_losses,
                stats.total_draws,
                stats.win_rate,
                stats
                    .best_rank
                    .map_or_else(|| "-".to_string(), |rank| rank.to_string()),
                stats.rating_change
            );
        }
    }

    tracing::info!("Simulation complete");
    Ok(())
}
