//! Structured logging configuration.
//!
//! The engine logs through the `log` facade; those records are forwarded
//! to the same `tracing` subscriber as the simulator's own events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels come from `RUST_LOG`, default `info`.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    // `try_init` also installs the `log` bridge
    if tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        return;
    }

    tracing::debug!("Structured logging initialized");
}

/// Log the outcome of one simulated tournament
pub fn log_tournament_finished(name: &str, rounds: usize, matches: usize, duration_ms: u64) {
    tracing::info!(
        tournament = name,
        rounds = rounds,
        matches = matches,
        duration_ms = duration_ms,
        "Tournament finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice() {
        init();
        init();
    }

    #[test]
    fn test_log_tournament_finished() {
        // Just ensure it doesn't panic
        log_tournament_finished("Open 1", 5, 40, 3);
    }
}
