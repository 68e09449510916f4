//! Engine configuration.
//!
//! Consolidates the environment variable reads of the library. Every value
//! has a default, so an empty environment yields a working engine.

use crate::rating::{DEFAULT_K_FACTOR, DEFAULT_RATING};
use crate::tournament::{
    TournamentConfig, TournamentError, TournamentFormat, TournamentResult,
};

/// Settings shared by every tournament a manager creates
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// K-factor for tournaments created through [`EngineConfig::tournament_config`]
    pub default_k_factor: f64,
    /// Seed rating for players the registry does not know
    pub default_rating: f64,
    /// Register unknown players at `default_rating` instead of rejecting them
    pub allow_unrated_players: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_k_factor: DEFAULT_K_FACTOR,
            default_rating: DEFAULT_RATING,
            allow_unrated_players: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// - `TOURNEY_K_FACTOR` (default 32)
    /// - `TOURNEY_DEFAULT_RATING` (default 1500)
    /// - `TOURNEY_ALLOW_UNRATED` (default true)
    ///
    /// Unparseable values fall back to the default.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if a parsed value is out of range.
    pub fn from_env() -> TournamentResult<Self> {
        let config = Self {
            default_k_factor: parse_env_or("TOURNEY_K_FACTOR", DEFAULT_K_FACTOR),
            default_rating: parse_env_or("TOURNEY_DEFAULT_RATING", DEFAULT_RATING),
            allow_unrated_players: parse_env_or("TOURNEY_ALLOW_UNRATED", true),
        };
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// `InvalidConfig` for a non-positive K-factor or a non-finite rating.
    pub fn validate(&self) -> TournamentResult<()> {
        if !self.default_k_factor.is_finite() || self.default_k_factor <= 0.0 {
            return Err(TournamentError::InvalidConfig(format!(
                "TOURNEY_K_FACTOR must be positive, got {}",
                self.default_k_factor
            )));
        }
        if !self.default_rating.is_finite() {
            return Err(TournamentError::InvalidConfig(
                "TOURNEY_DEFAULT_RATING must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Format preset carrying the engine's K-factor
    #[must_use]
    pub fn tournament_config(&self, name: impl Into<String>, format: TournamentFormat) -> TournamentConfig {
        let config = match format {
            TournamentFormat::SingleElimination => TournamentConfig::single_elimination(name),
            TournamentFormat::DoubleElimination => TournamentConfig::double_elimination(name),
            // Callers raise `swiss_rounds` as needed
            TournamentFormat::Swiss => TournamentConfig::swiss(name, 1),
            TournamentFormat::RoundRobin => TournamentConfig::round_robin(name),
        };
        config.with_k_factor(self.default_k_factor)
    }
}

/// Parse environment variable with fallback to default
fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
