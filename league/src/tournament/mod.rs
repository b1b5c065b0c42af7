//! Tournament module: registration workflow, administration and auto-close.
//!
//! ## Example
//!
//! ```no_run
//! use league::db::{Database, PgLeagueRepository};
//! use league::tournament::TournamentManager;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let repository = Arc::new(PgLeagueRepository::new(Arc::new(db.pool().clone())));
//!     let tournaments = TournamentManager::new(repository);
//!
//!     let outcome = tournaments.apply_tournament(1, 42).await?;
//!     println!("{}", outcome.message());
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod outcome;

pub use errors::{TournamentError, TournamentResult};
pub use manager::TournamentManager;
pub use models::{
    NewTournament, Tournament, TournamentDetail, TournamentId, TournamentPatch,
    TournamentResultEntry, TournamentSummary,
};
pub use outcome::{CloseSummary, TournamentAction, TournamentOutcome};
