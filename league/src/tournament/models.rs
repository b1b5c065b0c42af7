//! Tournament data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{TournamentError, TournamentResult};
use crate::team::{Team, TeamId};

/// Tournament ID type
pub type TournamentId = i64;

/// A tournament row together with its registered team ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    /// Venue address, fixed at creation
    pub address: Option<String>,
    /// Maximum number of teams
    pub team_limit: i32,
    pub register_deadline: DateTime<Utc>,
    pub event_date: DateTime<Utc>,
    pub is_finished: bool,
    pub is_cancelled: bool,
    pub winner_team_id: Option<TeamId>,
    pub runner_up_team_id: Option<TeamId>,
    /// Registered teams in registration order
    pub teams: Vec<TeamId>,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Registration window closed
    pub fn deadline_passed(&self, now: DateTime<Utc>) -> bool {
        self.register_deadline < now
    }

    /// Every slot is taken (or over-taken after the limit was lowered)
    pub fn is_full(&self) -> bool {
        self.teams.len() >= self.capacity()
    }

    pub fn is_registered(&self, team_id: TeamId) -> bool {
        self.teams.contains(&team_id)
    }

    fn capacity(&self) -> usize {
        usize::try_from(self.team_limit).unwrap_or(0)
    }
}

/// Listing row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentSummary {
    pub id: TournamentId,
    pub name: String,
    pub team_limit: i32,
    pub registered_count: usize,
    pub register_deadline: DateTime<Utc>,
    pub event_date: DateTime<Utc>,
    pub is_finished: bool,
    pub is_cancelled: bool,
}

impl From<&Tournament> for TournamentSummary {
    fn from(tournament: &Tournament) -> Self {
        Self {
            id: tournament.id,
            name: tournament.name.clone(),
            team_limit: tournament.team_limit,
            registered_count: tournament.teams.len(),
            register_deadline: tournament.register_deadline,
            event_date: tournament.event_date,
            is_finished: tournament.is_finished,
            is_cancelled: tournament.is_cancelled,
        }
    }
}

/// Tournament with its registered teams resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentDetail {
    #[serde(flatten)]
    pub tournament: Tournament,
    pub registered_teams: Vec<Team>,
}

/// Payload for creating a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTournament {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    pub team_limit: i32,
    pub register_deadline: DateTime<Utc>,
    pub event_date: DateTime<Utc>,
}

impl NewTournament {
    /// Trim the name and check limit and dates
    pub fn validated(mut self) -> TournamentResult<Self> {
        self.name = validate_name(&self.name)?;
        validate_team_limit(self.team_limit)?;
        validate_dates(self.register_deadline, self.event_date)?;
        Ok(self)
    }
}

/// Partial update of a tournament
///
/// `address` is accepted on the wire so existing clients keep working, but it
/// is never written: the address is immutable once the tournament exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub team_limit: Option<i32>,
    #[serde(default)]
    pub register_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub event_date: Option<DateTime<Utc>>,
}

impl TournamentPatch {
    /// Drop the address field
    pub fn without_address(mut self) -> Self {
        self.address = None;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.team_limit.is_none()
            && self.register_deadline.is_none()
            && self.event_date.is_none()
    }

    /// Validate the patch against the current row
    pub fn validated(mut self, current: &Tournament) -> TournamentResult<Self> {
        if let Some(name) = &self.name {
            self.name = Some(validate_name(name)?);
        }
        if let Some(limit) = self.team_limit {
            validate_team_limit(limit)?;
            if usize::try_from(limit).unwrap_or(0) < current.teams.len() {
                return Err(TournamentError::Validation(format!(
                    "team limit {limit} is below the {} registered teams",
                    current.teams.len()
                )));
            }
        }
        validate_dates(
            self.register_deadline.unwrap_or(current.register_deadline),
            self.event_date.unwrap_or(current.event_date),
        )?;
        Ok(self)
    }

    /// Apply the patch to an in-memory row (address untouched)
    pub fn apply_to(&self, tournament: &mut Tournament) {
        if let Some(name) = &self.name {
            tournament.name = name.clone();
        }
        if let Some(limit) = self.team_limit {
            tournament.team_limit = limit;
        }
        if let Some(deadline) = self.register_deadline {
            tournament.register_deadline = deadline;
        }
        if let Some(event_date) = self.event_date {
            tournament.event_date = event_date;
        }
    }
}

/// Final placing of a tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentResultEntry {
    pub winner_team_id: TeamId,
    pub runner_up_team_id: TeamId,
}

/// Column width of `tournaments.name`
pub const MAX_TOURNAMENT_NAME_LEN: usize = 100;

fn validate_name(name: &str) -> TournamentResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TournamentError::Validation(
            "tournament name must not be blank".to_string(),
        ));
    }
    if name.chars().count() > MAX_TOURNAMENT_NAME_LEN {
        return Err(TournamentError::Validation(format!(
            "tournament name must be at most {MAX_TOURNAMENT_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn validate_team_limit(limit: i32) -> TournamentResult<()> {
    if limit < 1 {
        return Err(TournamentError::Validation(format!(
            "team limit must be positive, got {limit}"
        )));
    }
    Ok(())
}

fn validate_dates(deadline: DateTime<Utc>, event_date: DateTime<Utc>) -> TournamentResult<()> {
    if deadline > event_date {
        return Err(TournamentError::Validation(
            "registration deadline must not be after the event date".to_string(),
        ));
    }
    Ok(())
}
