//! # League
//!
//! Tournament and team registration for a sports league backend.
//!
//! The interesting part is the tournament registration workflow: applying,
//! withdrawing, updating and auto-closing tournaments under a row lock so
//! concurrent registrations can never oversubscribe a tournament.
//!
//! ## Core Modules
//!
//! - [`tournament`]: Registration workflow, administration, auto-close sweep
//! - [`team`]: Teams that register for tournaments
//! - [`db`]: PostgreSQL pool, migrations and the repository seam
//! - [`pagination`]: Page request/response helpers
//!
//! ## Example
//!
//! ```
//! use league::db::MemoryLeagueRepository;
//! use league::tournament::TournamentManager;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tournaments = TournamentManager::new(Arc::new(MemoryLeagueRepository::new()));
//! let outcome = tournaments.apply_tournament(1, 1).await?;
//! assert_eq!(outcome.message(), "존재하지 않는 대회입니다.");
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod pagination;
pub mod team;
pub mod tournament;

pub use pagination::{Page, PageRequest};
pub use team::{NewTeam, Team, TeamError, TeamId, TeamManager};
pub use tournament::{
    CloseSummary, NewTournament, Tournament, TournamentAction, TournamentError, TournamentId,
    TournamentManager, TournamentOutcome, TournamentPatch,
};
