//! Tournament error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Infrastructure and input errors for tournament operations
///
/// Business outcomes (deadline passed, full, duplicate...) are not errors;
/// see [`TournamentOutcome`](super::TournamentOutcome).
#[derive(Debug, Error)]
pub enum TournamentError {
    /// Repository failure
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Invalid input
    #[error("Invalid tournament: {0}")]
    Validation(String),
}

impl TournamentError {
    /// Message safe to return to API clients
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Repository(_) => "Internal server error".to_string(),
            TournamentError::Validation(_) => self.to_string(),
        }
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
