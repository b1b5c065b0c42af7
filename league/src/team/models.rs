//! Team data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{TeamError, TeamResult};

/// Team ID type
pub type TeamId = i64;

/// A team that can register for tournaments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewTeam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Trim the name and reject blank or overlong names
    pub fn validated(mut self) -> TeamResult<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(TeamError::Validation("team name must not be blank".to_string()));
        }
        if self.name.chars().count() > 50 {
            return Err(TeamError::Validation(
                "team name must be at most 50 characters".to_string(),
            ));
        }
        Ok(self)
    }
}
