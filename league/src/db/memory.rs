//! In-process league repository.
//!
//! Units of work take an owned lock on the whole store, stage their writes on
//! a copy and publish the copy on commit. That serializes every unit, which
//! is a stronger guarantee than the per-row lock the PostgreSQL store takes.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::errors::{RepositoryError, RepositoryResult};
use super::repository::{LeagueRepository, RegistrationUnit};
use crate::pagination::{Page, PageRequest};
use crate::team::{NewTeam, Team, TeamId};
use crate::tournament::{NewTournament, Tournament, TournamentId, TournamentPatch, TournamentSummary};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    tournaments: BTreeMap<TournamentId, Tournament>,
    teams: BTreeMap<TeamId, Team>,
    next_tournament_id: TournamentId,
    next_team_id: TeamId,
}

/// Repository keeping everything in memory
#[derive(Clone, Default)]
pub struct MemoryLeagueRepository {
    state: Arc<Mutex<MemoryState>>,
    finished_saves: Arc<AtomicUsize>,
    failing_saves: Arc<std::sync::Mutex<HashSet<TournamentId>>>,
}

impl MemoryLeagueRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tournament row as-is, bypassing validation (test fixtures)
    pub async fn seed_tournament(&self, mut tournament: Tournament) -> Tournament {
        let mut state = self.state.lock().await;
        if tournament.id == 0 {
            state.next_tournament_id += 1;
            tournament.id = state.next_tournament_id;
        } else {
            state.next_tournament_id = state.next_tournament_id.max(tournament.id);
        }
        state.tournaments.insert(tournament.id, tournament.clone());
        tournament
    }

    /// Number of `save_finished` calls made through units so far
    pub fn finished_saves(&self) -> usize {
        self.finished_saves.load(Ordering::SeqCst)
    }

    /// Make every later `save_finished` on this tournament fail
    pub fn fail_saves_for(&self, tournament_id: TournamentId) {
        if let Ok(mut failing) = self.failing_saves.lock() {
            failing.insert(tournament_id);
        }
    }

    fn save_should_fail(&self, tournament_id: TournamentId) -> bool {
        self.failing_saves
            .lock()
            .map(|failing| failing.contains(&tournament_id))
            .unwrap_or(false)
    }
}

/// Unit of work over a staged copy of the store
pub struct MemoryRegistrationUnit {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
    repository: MemoryLeagueRepository,
}

impl MemoryRegistrationUnit {
    fn tournament_mut(&mut self, id: TournamentId) -> RepositoryResult<&mut Tournament> {
        self.staged
            .tournaments
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::Unavailable(format!("tournament {id} does not exist")))
    }
}

#[async_trait]
impl LeagueRepository for MemoryLeagueRepository {
    type Unit = MemoryRegistrationUnit;

    async fn begin(&self) -> RepositoryResult<Self::Unit> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryRegistrationUnit {
            guard,
            staged,
            repository: self.clone(),
        })
    }

    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }

    async fn insert_tournament(&self, new: &NewTournament) -> RepositoryResult<Tournament> {
        let mut state = self.state.lock().await;
        state.next_tournament_id += 1;
        let tournament = Tournament {
            id: state.next_tournament_id,
            name: new.name.clone(),
            address: new.address.clone(),
            team_limit: new.team_limit,
            register_deadline: new.register_deadline,
            event_date: new.event_date,
            is_finished: false,
            is_cancelled: false,
            winner_team_id: None,
            runner_up_team_id: None,
            teams: Vec::new(),
            created_at: Utc::now(),
        };
        state.tournaments.insert(tournament.id, tournament.clone());
        Ok(tournament)
    }

    async fn find_tournament(&self, id: TournamentId) -> RepositoryResult<Option<Tournament>> {
        Ok(self.state.lock().await.tournaments.get(&id).cloned())
    }

    async fn list_tournaments(
        &self,
        page: PageRequest,
    ) -> RepositoryResult<Page<TournamentSummary>> {
        let state = self.state.lock().await;
        let mut all: Vec<TournamentSummary> =
            state.tournaments.values().map(TournamentSummary::from).collect();
        all.reverse();
        Ok(Page::from_sorted(all, page))
    }

    async fn find_open_tournaments(&self) -> RepositoryResult<Vec<Tournament>> {
        let state = self.state.lock().await;
        Ok(state
            .tournaments
            .values()
            .filter(|t| !t.is_finished && !t.is_cancelled)
            .cloned()
            .collect())
    }

    async fn tournament_teams(&self, id: TournamentId) -> RepositoryResult<Vec<Team>> {
        let state = self.state.lock().await;
        let Some(tournament) = state.tournaments.get(&id) else {
            return Ok(Vec::new());
        };
        Ok(tournament
            .teams
            .iter()
            .filter_map(|team_id| state.teams.get(team_id).cloned())
            .collect())
    }

    async fn insert_team(&self, new: &NewTeam) -> RepositoryResult<Team> {
        let mut state = self.state.lock().await;
        if state.teams.values().any(|team| team.name == new.name) {
            return Err(RepositoryError::Constraint(format!(
                "team name {} already exists",
                new.name
            )));
        }
        state.next_team_id += 1;
        let team = Team {
            id: state.next_team_id,
            name: new.name.clone(),
            description: new.description.clone(),
            created_at: Utc::now(),
        };
        state.teams.insert(team.id, team.clone());
        Ok(team)
    }

    async fn find_team(&self, id: TeamId) -> RepositoryResult<Option<Team>> {
        Ok(self.state.lock().await.teams.get(&id).cloned())
    }

    async fn list_teams(&self, page: PageRequest) -> RepositoryResult<Page<Team>> {
        let state = self.state.lock().await;
        Ok(Page::from_sorted(state.teams.values().cloned().collect(), page))
    }
}

#[async_trait]
impl RegistrationUnit for MemoryRegistrationUnit {
    async fn lock_tournament(&mut self, id: TournamentId) -> RepositoryResult<Option<Tournament>> {
        Ok(self.staged.tournaments.get(&id).cloned())
    }

    async fn load_tournament(&mut self, id: TournamentId) -> RepositoryResult<Option<Tournament>> {
        Ok(self.staged.tournaments.get(&id).cloned())
    }

    async fn find_team(&mut self, id: TeamId) -> RepositoryResult<Option<Team>> {
        Ok(self.staged.teams.get(&id).cloned())
    }

    async fn add_team(
        &mut self,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> RepositoryResult<()> {
        if !self.staged.teams.contains_key(&team_id) {
            return Err(RepositoryError::Constraint(format!(
                "team {team_id} does not exist"
            )));
        }
        let tournament = self.tournament_mut(tournament_id)?;
        if tournament.teams.contains(&team_id) {
            return Err(RepositoryError::Constraint(format!(
                "team {team_id} already registered for tournament {tournament_id}"
            )));
        }
        tournament.teams.push(team_id);
        Ok(())
    }

    async fn remove_team(
        &mut self,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> RepositoryResult<()> {
        self.tournament_mut(tournament_id)?
            .teams
            .retain(|registered| *registered != team_id);
        Ok(())
    }

    async fn save_finished(
        &mut self,
        tournament_id: TournamentId,
        finished: bool,
    ) -> RepositoryResult<()> {
        self.repository.finished_saves.fetch_add(1, Ordering::SeqCst);
        if self.repository.save_should_fail(tournament_id) {
            return Err(RepositoryError::Unavailable(format!(
                "injected save failure for tournament {tournament_id}"
            )));
        }
        self.tournament_mut(tournament_id)?.is_finished = finished;
        Ok(())
    }

    async fn update_tournament(
        &mut self,
        tournament_id: TournamentId,
        patch: &TournamentPatch,
    ) -> RepositoryResult<()> {
        let tournament = self.tournament_mut(tournament_id)?;
        patch.apply_to(tournament);
        Ok(())
    }

    async fn save_result(
        &mut self,
        tournament_id: TournamentId,
        winner: TeamId,
        runner_up: TeamId,
    ) -> RepositoryResult<()> {
        let tournament = self.tournament_mut(tournament_id)?;
        tournament.winner_team_id = Some(winner);
        tournament.runner_up_team_id = Some(runner_up);
        Ok(())
    }

    async fn commit(mut self) -> RepositoryResult<()> {
        *self.guard = self.staged;
        Ok(())
    }
}
