//! Simulator configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use tourney::{EngineConfig, TournamentFormat, tournament::PlayerId};

/// Complete simulator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Format of every simulated tournament
    pub format: TournamentFormat,
    /// Players registered in each tournament
    pub players: usize,
    /// Tournaments run concurrently
    pub tournaments: usize,
    /// Round count for Swiss events
    pub swiss_rounds: u32,
    /// Chance that a match is drawn where the format allows it
    pub draw_probability: f64,
    /// Seed ratings are drawn from the default rating plus or minus this
    pub rating_spread: f64,
    /// RNG seed for reproducible runs
    pub seed: Option<u64>,
    /// Print JSON instead of tables
    pub json: bool,
    /// Print this player's history after the run
    pub history_player: Option<PlayerId>,
    /// Engine settings (K-factor, default rating)
    pub engine: EngineConfig,
}

/// Values given on the command line, taking precedence over the environment
#[derive(Debug, Clone, Default)]
pub struct SimOverrides {
    pub format: Option<String>,
    pub players: Option<usize>,
    pub tournaments: Option<usize>,
    pub swiss_rounds: Option<u32>,
    pub seed: Option<u64>,
    pub json: bool,
    pub history_player: Option<PlayerId>,
}

impl SimConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `overrides` - Values from CLI args
    ///
    /// # Returns
    ///
    /// * `Result<SimConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if the format name is unknown or the engine settings
    /// are out of range
    pub fn from_env(overrides: SimOverrides) -> Result<Self, ConfigError> {
        let format_name = overrides
            .format
            .or_else(|| std::env::var("SIM_FORMAT").ok())
            .unwrap_or_else(|| "swiss".to_string());
        let format = parse_format(&format_name).ok_or_else(|| ConfigError::Invalid {
            var: "SIM_FORMAT".to_string(),
            reason: format!(
                "Unknown format '{format_name}' (expected single_elimination, double_elimination, swiss or round_robin)"
            ),
        })?;

        let engine = EngineConfig::from_env().map_err(|e| ConfigError::Invalid {
            var: "TOURNEY_*".to_string(),
            reason: e.to_string(),
        })?;

        Ok(SimConfig {
            format,
            players: overrides
                .players
                .unwrap_or_else(|| parse_env_or("SIM_PLAYERS", 16)),
            tournaments: overrides
                .tournaments
                .unwrap_or_else(|| parse_env_or("SIM_TOURNAMENTS", 1)),
            swiss_rounds: overrides
                .swiss_rounds
                .unwrap_or_else(|| parse_env_or("SIM_SWISS_ROUNDS", 5)),
            draw_probability: parse_env_or("SIM_DRAW_PROBABILITY", 0.1),
            rating_spread: parse_env_or("SIM_RATING_SPREAD", 300.0),
            seed: overrides
                .seed
                .or_else(|| std::env::var("SIM_SEED").ok().and_then(|v| v.parse().ok())),
            json: overrides.json || parse_env_or("SIM_JSON", false),
            history_player: overrides.history_player,
            engine,
        })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players < 2 {
            return Err(ConfigError::Invalid {
                var: "SIM_PLAYERS".to_string(),
                reason: "Must be at least 2".to_string(),
            });
        }

        if self.tournaments == 0 {
            return Err(ConfigError::Invalid {
                var: "SIM_TOURNAMENTS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.format == TournamentFormat::Swiss && self.swiss_rounds == 0 {
            return Err(ConfigError::Invalid {
                var: "SIM_SWISS_ROUNDS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if !(0.0..1.0).contains(&self.draw_probability) {
            return Err(ConfigError::Invalid {
                var: "SIM_DRAW_PROBABILITY".to_string(),
                reason: format!("Must be in [0, 1), got {}", self.draw_probability),
            });
        }

        if !self.rating_spread.is_finite() || self.rating_spread < 0.0 {
            return Err(ConfigError::Invalid {
                var: "SIM_RATING_SPREAD".to_string(),
                reason: "Must be a non-negative number".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn parse_format(name: &str) -> Option<TournamentFormat> {
    match name.trim().to_lowercase().replace('-', "_").as_str() {
        "single_elimination" | "single" | "se" => Some(TournamentFormat::SingleElimination),
        "double_elimination" | "double" | "de" => Some(TournamentFormat::DoubleElimination),
        "swiss" => Some(TournamentFormat::Swiss),
        "round_robin" | "rr" => Some(TournamentFormat::RoundRobin),
        _ => None,
    }
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn config() -> SimConfig {
        SimConfig {
            format: TournamentFormat::Swiss,
            players: 8,
            tournaments: 1,
            swiss_rounds: 3,
            draw_probability: 0.1,
            rating_spread: 200.0,
            seed: Some(7),
            json: false,
            history_player: None,
            engine: EngineConfig::default(),
        }
    }

    #[test]
    fn test_parse_format_aliases() {
        assert_eq!(parse_format("RR"), Some(TournamentFormat::RoundRobin));
        assert_eq!(
            parse_format("double-elimination"),
            Some(TournamentFormat::DoubleElimination)
        );
        assert_eq!(parse_format("se"), Some(TournamentFormat::SingleElimination));
        assert_eq!(parse_format("ladder"), None);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            var: "SIM_PLAYERS".to_string(),
            reason: "Must be at least 2".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("SIM_PLAYERS"));
        assert!(msg.contains("at least 2"));
    }

    #[test]
    fn test_config_validation() {
        assert!(config().validate().is_ok());

        let mut too_few = config();
        too_few.players = 1;
        assert!(matches!(too_few.validate(), Err(ConfigError::Invalid { .. })));

        let mut always_draw = config();
        always_draw.draw_probability = 1.0;
        assert!(always_draw.validate().is_err());

        let mut no_rounds = config();
        no_rounds.swiss_rounds = 0;
        assert!(no_rounds.validate().is_err());
        no_rounds.format = TournamentFormat::RoundRobin;
        assert!(no_rounds.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_overrides_beat_environment() {
        // SAFETY: serialised with every other test touching the environment
        unsafe {
            std::env::set_var("SIM_PLAYERS", "12");
            std::env::set_var("SIM_FORMAT", "round_robin");
        }

        let from_env = SimConfig::from_env(SimOverrides::default()).unwrap();
        assert_eq!(from_env.players, 12);
        assert_eq!(from_env.format, TournamentFormat::RoundRobin);

        let overridden = SimConfig::from_env(SimOverrides {
            players: Some(5),
            format: Some("single".to_string()),
            ..SimOverrides::default()
        })
        .unwrap();
        assert_eq!(overridden.players, 5);
        assert_eq!(overridden.format, TournamentFormat::SingleElimination);

        // SAFETY: as above
        unsafe {
            std::env::remove_var("SIM_PLAYERS");
            std::env::remove_var("SIM_FORMAT");
        }
    }

    #[test]
    #[serial]
    fn test_unknown_format_rejected() {
        let err = SimConfig::from_env(SimOverrides {
            format: Some("ladder".to_string()),
            ..SimOverrides::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("ladder"));
    }
}
