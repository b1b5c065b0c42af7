//! Team manager.

use std::sync::Arc;

use super::errors::{TeamError, TeamResult};
use super::models::{NewTeam, Team, TeamId};
use crate::db::LeagueRepository;
use crate::pagination::{Page, PageRequest};

/// Team manager
pub struct TeamManager<R: LeagueRepository> {
    repository: Arc<R>,
}

impl<R: LeagueRepository> Clone for TeamManager<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<R: LeagueRepository> TeamManager<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Create a team
    ///
    /// # Errors
    ///
    /// * `TeamError::Validation` - Blank or overlong name
    /// * `TeamError::NameTaken` - Another team already uses the name
    pub async fn create_team(&self, new: NewTeam) -> TeamResult<Team> {
        let new = new.validated()?;
        match self.repository.insert_team(&new).await {
            Ok(team) => {
                log::info!("Created team {} '{}'", team.id, team.name);
                Ok(team)
            }
            Err(e) if e.is_unique_violation() => Err(TeamError::NameTaken(new.name)),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch a team, failing with `TeamError::NotFound` when absent
    pub async fn get_team(&self, team_id: TeamId) -> TeamResult<Team> {
        self.repository
            .find_team(team_id)
            .await?
            .ok_or(TeamError::NotFound(team_id))
    }

    pub async fn list_teams(&self, page: PageRequest) -> TeamResult<Page<Team>> {
        Ok(self.repository.list_teams(page).await?)
    }
}
