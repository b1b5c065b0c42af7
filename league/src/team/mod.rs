//! Team module: the teams that register for tournaments.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{TeamError, TeamResult};
pub use manager::TeamManager;
pub use models::{NewTeam, Team, TeamId};
