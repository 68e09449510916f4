//! Elo rating engine.
//!
//! Ratings follow the logistic expected-score model:
//!
//! - `E_A = 1 / (1 + 10^((R_B - R_A) / 400))`
//! - `R_A' = R_A + K * (S_A - E_A)`, and symmetrically for B
//!
//! Every update is zero-sum: whatever one side gains the other loses. The
//! K-factor is a single constant for all participants, so identical inputs
//! always produce identical ratings.
//!
//! ## Example
//!
//! ```
//! use tourney::rating::{EloCalculator, Outcome};
//!
//! let elo = EloCalculator::default();
//! let (winner, loser) = elo.update(1500.0, 1500.0, Outcome::AWins);
//! assert!((winner - 1516.0).abs() < 1e-9);
//! assert!((loser - 1484.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rating assigned to players the registry has never rated
pub const DEFAULT_RATING: f64 = 1500.0;

/// K-factor used when a tournament does not configure its own
pub const DEFAULT_K_FACTOR: f64 = 32.0;

/// Result of a single match from the perspective of side A
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    AWins,
    BWins,
    Draw,
}

impl Outcome {
    /// Observed score for side A (1, 0.5 or 0)
    #[must_use]
    pub const fn score_a(self) -> f64 {
        match self {
            Outcome::AWins => 1.0,
            Outcome::BWins => 0.0,
            Outcome::Draw => 0.5,
        }
    }

    /// Observed score for side B
    #[must_use]
    pub const fn score_b(self) -> f64 {
        1.0 - self.score_a()
    }

    #[must_use]
    pub const fn is_draw(self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::AWins => write!(f, "a_wins"),
            Outcome::BWins => write!(f, "b_wins"),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

/// Expected score of a player rated `rating` against `opponent`
#[must_use]
pub fn expected_score(rating: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((opponent - rating) / 400.0))
}

/// Update both ratings after a match.
///
/// Returns `(new_rating_a, new_rating_b)`. Byes and forfeits must never be
/// routed through here.
#[must_use]
pub fn update_ratings(rating_a: f64, rating_b: f64, outcome: Outcome, k_factor: f64) -> (f64, f64) {
    let expected_a = expected_score(rating_a, rating_b);
    let delta = k_factor * (outcome.score_a() - expected_a);
    (rating_a + delta, rating_b - delta)
}

/// Elo calculator bound to a fixed K-factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EloCalculator {
    k_factor: f64,
}

impl Default for EloCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_K_FACTOR)
    }
}

impl EloCalculator {
    #[must_use]
    pub const fn new(k_factor: f64) -> Self {
        Self { k_factor }
    }

    #[must_use]
    pub const fn k_factor(&self) -> f64 {
        self.k_factor
    }

    /// Updated `(rating_a, rating_b)` for the given outcome
    #[must_use]
    pub fn update(&self, rating_a: f64, rating_b: f64, outcome: Outcome) -> (f64, f64) {
        update_ratings(rating_a, rating_b, outcome, self.k_factor)
    }
}
