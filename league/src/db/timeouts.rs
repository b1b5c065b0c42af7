//! Deadlines for database calls that must not hang a request or a sweep.

use super::errors::{RepositoryError, RepositoryResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Default deadline for single queries such as health checks
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Deadline for one full auto-close sweep
pub const SWEEP_TIMEOUT: Duration = Duration::from_secs(30);

/// Run a repository future, failing with [`RepositoryError::Timeout`] once `duration` elapses
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> RepositoryResult<T>
where
    F: Future<Output = RepositoryResult<T>>,
{
    match timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(RepositoryError::Timeout(duration)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passes_through_result() {
        let value = with_timeout(DEFAULT_QUERY_TIMEOUT, async { Ok::<_, RepositoryError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out() {
        let result = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, RepositoryError>(())
        })
        .await;
        assert!(matches!(result, Err(RepositoryError::Timeout(_))));
    }
}
