//! Repository traits for the league store.
//!
//! The workflow code only talks to these traits so it can run against
//! PostgreSQL in production and against [`MemoryLeagueRepository`] in tests.
//!
//! [`MemoryLeagueRepository`]: super::memory::MemoryLeagueRepository

use async_trait::async_trait;

use super::errors::RepositoryResult;
use crate::pagination::{Page, PageRequest};
use crate::team::{NewTeam, Team, TeamId};
use crate::tournament::{NewTournament, Tournament, TournamentId, TournamentPatch, TournamentSummary};

/// Store-level operations plus the entry point to a unit of work
#[async_trait]
pub trait LeagueRepository: Send + Sync {
    /// Transactional unit of work
    type Unit: RegistrationUnit;

    /// Start a unit of work. Dropping it without [`RegistrationUnit::commit`] rolls back.
    async fn begin(&self) -> RepositoryResult<Self::Unit>;

    /// Check that the store is reachable
    async fn ping(&self) -> RepositoryResult<()>;

    /// Insert a tournament with no registered teams
    async fn insert_tournament(&self, new: &NewTournament) -> RepositoryResult<Tournament>;

    /// Load a tournament with its teams, without locking
    async fn find_tournament(&self, id: TournamentId) -> RepositoryResult<Option<Tournament>>;

    /// Newest tournaments first
    async fn list_tournaments(
        &self,
        page: PageRequest,
    ) -> RepositoryResult<Page<TournamentSummary>>;

    /// Tournaments with `is_finished = false AND is_cancelled = false`
    async fn find_open_tournaments(&self) -> RepositoryResult<Vec<Tournament>>;

    /// Registered teams of a tournament in registration order
    async fn tournament_teams(&self, id: TournamentId) -> RepositoryResult<Vec<Team>>;

    async fn insert_team(&self, new: &NewTeam) -> RepositoryResult<Team>;

    async fn find_team(&self, id: TeamId) -> RepositoryResult<Option<Team>>;

    /// Teams ordered by id
    async fn list_teams(&self, page: PageRequest) -> RepositoryResult<Page<Team>>;
}

/// Unit of work holding the tournament row lock between `lock_tournament` and `commit`
#[async_trait]
pub trait RegistrationUnit: Send {
    /// Load a tournament and its teams, locking the tournament row until commit or rollback
    async fn lock_tournament(&mut self, id: TournamentId) -> RepositoryResult<Option<Tournament>>;

    /// Load a tournament and its teams without taking a row lock
    async fn load_tournament(&mut self, id: TournamentId) -> RepositoryResult<Option<Tournament>>;

    async fn find_team(&mut self, id: TeamId) -> RepositoryResult<Option<Team>>;

    async fn add_team(&mut self, tournament_id: TournamentId, team_id: TeamId)
    -> RepositoryResult<()>;

    async fn remove_team(
        &mut self,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> RepositoryResult<()>;

    /// Persist the `is_finished` flag
    async fn save_finished(&mut self, tournament_id: TournamentId, finished: bool)
    -> RepositoryResult<()>;

    /// Partial update of the patch's non-address fields
    async fn update_tournament(
        &mut self,
        tournament_id: TournamentId,
        patch: &TournamentPatch,
    ) -> RepositoryResult<()>;

    async fn save_result(
        &mut self,
        tournament_id: TournamentId,
        winner: TeamId,
        runner_up: TeamId,
    ) -> RepositoryResult<()>;

    /// Publish every write made through this unit
    async fn commit(self) -> RepositoryResult<()>;
}
