//! Tournament manager: registration workflow and tournament administration.

use chrono::Utc;
use std::sync::Arc;

use super::errors::{TournamentError, TournamentResult};
use super::models::{
    NewTournament, Tournament, TournamentDetail, TournamentId, TournamentPatch,
    TournamentResultEntry, TournamentSummary,
};
use super::outcome::{CloseSummary, TournamentAction, TournamentOutcome};
use crate::db::timeouts::{SWEEP_TIMEOUT, with_timeout};
use crate::db::{LeagueRepository, RegistrationUnit, RepositoryResult};
use crate::pagination::{Page, PageRequest};
use crate::team::TeamId;

/// Tournament manager
///
/// Apply and cancel lock the tournament row for the whole unit of work, so
/// concurrent registrations against one tournament run their capacity check
/// and append one after another. Different tournaments proceed in parallel.
pub struct TournamentManager<R: LeagueRepository> {
    repository: Arc<R>,
}

impl<R: LeagueRepository> Clone for TournamentManager<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<R: LeagueRepository> TournamentManager<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Register a team for a tournament
    ///
    /// A full tournament that is not yet marked finished gets marked finished
    /// here even though this registration is rejected. The registration that
    /// takes the last slot also marks the tournament finished.
    pub async fn apply_tournament(
        &self,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> TournamentResult<TournamentOutcome> {
        let mut unit = self.repository.begin().await?;

        let Some(mut tournament) = unit.lock_tournament(tournament_id).await? else {
            log::warn!("Team {team_id} applied to missing tournament {tournament_id}");
            return Ok(TournamentOutcome::NotFound);
        };

        if tournament.deadline_passed(Utc::now()) {
            return Ok(TournamentOutcome::DeadlinePassed);
        }

        if tournament.is_finished {
            return Ok(TournamentOutcome::AlreadyFinished);
        }

        if tournament.is_full() {
            unit.save_finished(tournament_id, true).await?;
            unit.commit().await?;
            log::debug!(
                "Tournament {tournament_id} closed at capacity ({}/{})",
                tournament.teams.len(),
                tournament.team_limit
            );
            return Ok(TournamentOutcome::AlreadyFinished);
        }

        if tournament.is_registered(team_id) {
            return Ok(TournamentOutcome::DuplicateRegistration);
        }

        if unit.find_team(team_id).await?.is_none() {
            log::warn!("Missing team {team_id} applied to tournament {tournament_id}");
            return Ok(TournamentOutcome::TeamNotFound);
        }

        unit.add_team(tournament_id, team_id).await?;
        tournament.teams.push(team_id);

        if tournament.is_full() {
            unit.save_finished(tournament_id, true).await?;
        }

        unit.commit().await?;

        if tournament.is_full() {
            log::info!("Tournament {tournament_id} filled its last slot with team {team_id}");
        }

        Ok(TournamentOutcome::Success(TournamentAction::Apply))
    }

    /// Withdraw a registered team. A successful withdrawal always reopens the tournament.
    pub async fn cancel_tournament(
        &self,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> TournamentResult<TournamentOutcome> {
        let mut unit = self.repository.begin().await?;

        let Some(tournament) = unit.lock_tournament(tournament_id).await? else {
            log::warn!("Team {team_id} cancelled on missing tournament {tournament_id}");
            return Ok(TournamentOutcome::NotFound);
        };

        if tournament.deadline_passed(Utc::now()) {
            return Ok(TournamentOutcome::DeadlinePassed);
        }

        if !tournament.is_registered(team_id) {
            return Ok(TournamentOutcome::NotRegistered);
        }

        unit.remove_team(tournament_id, team_id).await?;
        unit.save_finished(tournament_id, false).await?;
        unit.commit().await?;

        Ok(TournamentOutcome::Success(TournamentAction::Cancel))
    }

    /// Partially update a tournament. Any address in the patch is ignored.
    pub async fn update_tournament(
        &self,
        tournament_id: TournamentId,
        patch: TournamentPatch,
    ) -> TournamentResult<TournamentOutcome> {
        let mut unit = self.repository.begin().await?;

        let Some(current) = unit.load_tournament(tournament_id).await? else {
            log::warn!("Update of missing tournament {tournament_id}");
            return Ok(TournamentOutcome::NotFound);
        };

        let patch = patch.without_address().validated(&current)?;
        if !patch.is_empty() {
            unit.update_tournament(tournament_id, &patch).await?;
            unit.commit().await?;
        }

        Ok(TournamentOutcome::Success(TournamentAction::Update))
    }

    /// Mark every open tournament that has reached capacity as finished
    ///
    /// Each tournament is closed in its own unit of work; a failure is logged
    /// and the sweep moves on to the next one. Nothing is returned as an error.
    pub async fn close_finished_tournaments(&self) -> CloseSummary {
        let mut summary = CloseSummary::default();

        let open = match with_timeout(SWEEP_TIMEOUT, self.repository.find_open_tournaments()).await
        {
            Ok(open) => open,
            Err(e) => {
                log::error!("Failed to load open tournaments: {e}");
                return summary;
            }
        };

        summary.examined = open.len();

        for tournament in open.iter().filter(|t| t.is_full()) {
            match self.close_if_full(tournament.id).await {
                Ok(true) => {
                    summary.closed += 1;
                    log::info!(
                        "Auto-closed tournament {} ({}/{})",
                        tournament.id,
                        tournament.teams.len(),
                        tournament.team_limit
                    );
                }
                Ok(false) => {}
                Err(e) => {
                    summary.failed += 1;
                    log::error!("Failed to close tournament {}: {e}", tournament.id);
                }
            }
        }

        summary
    }

    /// Re-check under the row lock before closing; another request may have
    /// freed a slot since the open list was read.
    async fn close_if_full(&self, tournament_id: TournamentId) -> RepositoryResult<bool> {
        let mut unit = self.repository.begin().await?;
        let Some(tournament) = unit.lock_tournament(tournament_id).await? else {
            return Ok(false);
        };

        if tournament.is_finished || tournament.is_cancelled || !tournament.is_full() {
            return Ok(false);
        }

        unit.save_finished(tournament_id, true).await?;
        unit.commit().await?;
        Ok(true)
    }

    /// Create a tournament with no registered teams
    pub async fn create_tournament(&self, new: NewTournament) -> TournamentResult<Tournament> {
        let new = new.validated()?;
        let tournament = self.repository.insert_tournament(&new).await?;
        log::info!(
            "Created tournament {} '{}' for {} teams",
            tournament.id,
            tournament.name,
            tournament.team_limit
        );
        Ok(tournament)
    }

    /// Tournament with its registered teams
    pub async fn get_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Option<TournamentDetail>> {
        let Some(tournament) = self.repository.find_tournament(tournament_id).await? else {
            return Ok(None);
        };
        let registered_teams = self.repository.tournament_teams(tournament_id).await?;
        Ok(Some(TournamentDetail {
            tournament,
            registered_teams,
        }))
    }

    pub async fn list_tournaments(
        &self,
        page: PageRequest,
    ) -> TournamentResult<Page<TournamentSummary>> {
        Ok(self.repository.list_tournaments(page).await?)
    }

    /// Record winner and runner-up; both must be registered and distinct
    pub async fn record_result(
        &self,
        tournament_id: TournamentId,
        result: TournamentResultEntry,
    ) -> TournamentResult<TournamentOutcome> {
        if result.winner_team_id == result.runner_up_team_id {
            return Err(TournamentError::Validation(
                "winner and runner-up must be different teams".to_string(),
            ));
        }

        let mut unit = self.repository.begin().await?;

        let Some(tournament) = unit.lock_tournament(tournament_id).await? else {
            log::warn!("Result recorded for missing tournament {tournament_id}");
            return Ok(TournamentOutcome::NotFound);
        };

        if !tournament.is_registered(result.winner_team_id)
            || !tournament.is_registered(result.runner_up_team_id)
        {
            return Ok(TournamentOutcome::NotRegistered);
        }

        unit.save_result(
            tournament_id,
            result.winner_team_id,
            result.runner_up_team_id,
        )
        .await?;
        unit.commit().await?;

        Ok(TournamentOutcome::Success(TournamentAction::RecordResult))
    }
}
