//! # Tourney
//!
//! A tournament pairing and rating engine.
//!
//! The engine drives a tournament through its lifecycle, generates the
//! matches of each round for four competitive formats, ingests results,
//! updates Elo ratings and produces standings and cross-tournament player
//! history. Persistence and the player registry are external collaborators
//! behind async traits.
//!
//! ## Architecture
//!
//! Components, leaf first:
//!
//! - **Rating**: pure Elo update, zero-sum, fixed K-factor
//! - **Pairing**: single elimination, double elimination, Swiss and round
//!   robin as a closed set of variants dispatched with `enum_dispatch`
//! - **Tournament**: explicit transition table, the aggregate that owns
//!   rounds and matches, and the async manager that serialises mutations
//!   per tournament
//! - **Standings**: derived on every query
//! - **History**: per-player statistics over finished tournaments
//!
//! ## Core Modules
//!
//! - [`rating`]: Elo engine
//! - [`pairing`]: pairing strategies
//! - [`tournament`]: lifecycle, aggregate and manager
//! - [`standings`]: standings calculator
//! - [`history`]: history aggregator
//! - [`store`]: repository and registry collaborators
//!
//! ## Example
//!
//! ```
//! use tourney::rating::{Outcome, update_ratings};
//!
//! let (a, b) = update_ratings(1500.0, 1500.0, Outcome::Draw, 32.0);
//! assert_eq!((a, b), (1500.0, 1500.0));
//! ```

/// Engine-wide configuration.
pub mod config;

/// Cross-tournament player history.
pub mod history;

/// Pairing strategies for every format.
pub mod pairing;

/// Elo rating engine.
pub mod rating;

/// Standings calculator.
pub mod standings;

/// Persistence and player registry collaborators.
pub mod store;

/// Tournament lifecycle, aggregate and manager.
pub mod tournament;

pub use config::EngineConfig;
pub use history::{HistoryPeriod, PlayerHistory};
pub use pairing::{Pairing, PairingStrategy};
pub use rating::{EloCalculator, Outcome};
pub use standings::{Standing, compute_standings};
pub use tournament::{
    Tournament, TournamentConfig, TournamentError, TournamentFormat, TournamentId,
    TournamentManager, TournamentResult, TournamentStatus,
};
