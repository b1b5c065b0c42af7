//! Repository error types.

use std::time::Duration;
use thiserror::Error;

/// Errors raised by repository implementations
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Operation exceeded its deadline
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// A uniqueness or foreign key constraint rejected the write
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// Store refused the operation (used by the in-memory store for injected failures)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    /// True when the error came from a unique index
    pub fn is_unique_violation(&self) -> bool {
        match self {
            RepositoryError::Database(sqlx::Error::Database(db)) => db.is_unique_violation(),
            RepositoryError::Constraint(_) => true,
            _ => false,
        }
    }
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = RepositoryError::Timeout(Duration::from_secs(5));
        assert!(err.to_string().contains("timed out"));
        assert!(err.to_string().contains("5s"));
    }

    #[test]
    fn test_unique_violation_detection() {
        assert!(RepositoryError::Constraint("teams_name_key".to_string()).is_unique_violation());
        assert!(!RepositoryError::Unavailable("down".to_string()).is_unique_violation());
    }
}
