//! Periodic auto-close of full tournaments.

use league::CloseSummary;
use league::db::LeagueRepository;
use league::tournament::TournamentManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::metrics;

/// Run one sweep and record it
pub async fn run_once<R: LeagueRepository>(manager: &TournamentManager<R>) -> CloseSummary {
    let summary = manager.close_finished_tournaments().await;
    metrics::auto_close_sweep(summary.closed, summary.failed);

    if summary.failed > 0 {
        tracing::warn!(
            examined = summary.examined,
            closed = summary.closed,
            failed = summary.failed,
            "Auto-close sweep finished with failures"
        );
    } else if summary.closed > 0 {
        tracing::info!(
            examined = summary.examined,
            closed = summary.closed,
            "Auto-close sweep closed tournaments"
        );
    } else {
        tracing::debug!(examined = summary.examined, "Auto-close sweep found nothing to close");
    }

    summary
}

/// Spawn the auto-close loop
///
/// The first sweep runs immediately. Ticks missed while a sweep is still
/// running are skipped. The task exits once `shutdown` flips to `true` or its
/// sender is dropped.
pub fn spawn_auto_close<R: LeagueRepository + 'static>(
    manager: Arc<TournamentManager<R>>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(period_secs = period.as_secs(), "Auto-close scheduler started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    run_once(&manager).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Auto-close scheduler stopped");
    })
}
