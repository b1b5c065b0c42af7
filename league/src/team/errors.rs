//! Team error types.

use thiserror::Error;

use super::models::TeamId;
use crate::db::RepositoryError;

/// Team errors
#[derive(Debug, Error)]
pub enum TeamError {
    /// Repository failure
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Team not found
    #[error("Team not found: {0}")]
    NotFound(TeamId),

    /// Team name already taken
    #[error("Team name already taken: {0}")]
    NameTaken(String),

    /// Invalid input
    #[error("Invalid team: {0}")]
    Validation(String),
}

impl TeamError {
    /// Message safe to return to API clients
    pub fn client_message(&self) -> String {
        match self {
            TeamError::Repository(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for team operations
pub type TeamResult<T> = Result<T, TeamError>;
