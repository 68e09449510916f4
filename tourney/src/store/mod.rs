//! Storage collaborators.
//!
//! The engine talks to the outside world through two narrow traits:
//! [`TournamentRepository`] persists whole tournament aggregates and
//! [`PlayerRegistry`] supplies seed ratings at registration time. In-memory
//! implementations are provided for tests and the simulator.

pub mod errors;
pub mod memory;
pub mod repository;

pub use errors::{RepositoryError, RepositoryResult};
pub use memory::{MemoryPlayerRegistry, MemoryTournamentRepository};
pub use repository::{PlayerRegistry, TournamentRepository};
