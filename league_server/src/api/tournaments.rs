//! Tournament endpoints: registration workflow and administration.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use league::db::LeagueRepository;
use league::tournament::{
    CloseSummary, NewTournament, Tournament, TournamentDetail, TournamentError, TournamentId,
    TournamentOutcome, TournamentPatch, TournamentResultEntry, TournamentSummary,
};
use league::{Page, TeamId, TournamentAction};
use serde::{Deserialize, Serialize};

use super::request_id::RequestId;
use super::{ApiError, AppState, PageParams, api_error};
use crate::{metrics, scheduler};

/// Body for apply and cancel
#[derive(Debug, Serialize, Deserialize)]
pub struct TeamRequest {
    pub team_id: TeamId,
}

fn tournament_error(
    request_id: &RequestId,
    tournament_id: Option<TournamentId>,
    e: TournamentError,
) -> ApiError {
    match &e {
        TournamentError::Validation(_) => {
            api_error(StatusCode::BAD_REQUEST, e.client_message())
        }
        TournamentError::Repository(inner) => {
            tracing::error!(
                request_id = %request_id.as_str(),
                tournament_id = tournament_id,
                "Tournament operation failed: {}",
                inner
            );
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.client_message())
        }
    }
}

fn outcome_response(
    action: TournamentAction,
    outcome: TournamentOutcome,
) -> (StatusCode, Json<TournamentOutcome>) {
    metrics::tournament_outcomes_total(action.as_str(), outcome.code());

    let status = if outcome == TournamentOutcome::Success(TournamentAction::Apply) {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, Json(outcome))
}

/// Register a team for a tournament.
///
/// `201 Created` on success. Rejections such as a passed deadline or a full
/// tournament are `200 OK` with `success: false`:
///
/// ```json
/// { "success": false, "code": "deadline_passed", "message": "신청 기간이 지났습니다." }
/// ```
pub async fn apply_tournament<R: LeagueRepository + 'static>(
    State(state): State<AppState<R>>,
    request_id: RequestId,
    Path(tournament_id): Path<TournamentId>,
    Json(request): Json<TeamRequest>,
) -> Result<(StatusCode, Json<TournamentOutcome>), ApiError> {
    let outcome = state
        .tournament_manager
        .apply_tournament(tournament_id, request.team_id)
        .await
        .map_err(|e| tournament_error(&request_id, Some(tournament_id), e))?;

    Ok(outcome_response(TournamentAction::Apply, outcome))
}

/// Withdraw a registered team. Reopens the tournament.
pub async fn cancel_tournament<R: LeagueRepository + 'static>(
    State(state): State<AppState<R>>,
    request_id: RequestId,
    Path(tournament_id): Path<TournamentId>,
    Json(request): Json<TeamRequest>,
) -> Result<(StatusCode, Json<TournamentOutcome>), ApiError> {
    let outcome = state
        .tournament_manager
        .cancel_tournament(tournament_id, request.team_id)
        .await
        .map_err(|e| tournament_error(&request_id, Some(tournament_id), e))?;

    Ok(outcome_response(TournamentAction::Cancel, outcome))
}

/// Partially update a tournament (admin). `address` in the body is ignored.
pub async fn update_tournament<R: LeagueRepository + 'static>(
    State(state): State<AppState<R>>,
    request_id: RequestId,
    Path(tournament_id): Path<TournamentId>,
    Json(patch): Json<TournamentPatch>,
) -> Result<(StatusCode, Json<TournamentOutcome>), ApiError> {
    let outcome = state
        .tournament_manager
        .update_tournament(tournament_id, patch)
        .await
        .map_err(|e| tournament_error(&request_id, Some(tournament_id), e))?;

    Ok(outcome_response(TournamentAction::Update, outcome))
}

/// Record winner and runner-up (admin)
pub async fn record_result<R: LeagueRepository + 'static>(
    State(state): State<AppState<R>>,
    request_id: RequestId,
    Path(tournament_id): Path<TournamentId>,
    Json(result): Json<TournamentResultEntry>,
) -> Result<(StatusCode, Json<TournamentOutcome>), ApiError> {
    let outcome = state
        .tournament_manager
        .record_result(tournament_id, result)
        .await
        .map_err(|e| tournament_error(&request_id, Some(tournament_id), e))?;

    Ok(outcome_response(TournamentAction::RecordResult, outcome))
}

/// Create a tournament (admin)
pub async fn create_tournament<R: LeagueRepository + 'static>(
    State(state): State<AppState<R>>,
    request_id: RequestId,
    Json(request): Json<NewTournament>,
) -> Result<(StatusCode, Json<Tournament>), ApiError> {
    let tournament = state
        .tournament_manager
        .create_tournament(request)
        .await
        .map_err(|e| tournament_error(&request_id, None, e))?;

    Ok((StatusCode::CREATED, Json(tournament)))
}

/// Tournament with its registered teams
pub async fn get_tournament<R: LeagueRepository + 'static>(
    State(state): State<AppState<R>>,
    request_id: RequestId,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<TournamentDetail>, ApiError> {
    match state.tournament_manager.get_tournament(tournament_id).await {
        Ok(Some(detail)) => Ok(Json(detail)),
        Ok(None) => Err(api_error(
            StatusCode::NOT_FOUND,
            TournamentOutcome::NotFound.message(),
        )),
        Err(e) => Err(tournament_error(&request_id, Some(tournament_id), e)),
    }
}

/// Newest tournaments first
pub async fn list_tournaments<R: LeagueRepository + 'static>(
    State(state): State<AppState<R>>,
    request_id: RequestId,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<TournamentSummary>>, ApiError> {
    state
        .tournament_manager
        .list_tournaments(params.into())
        .await
        .map(Json)
        .map_err(|e| tournament_error(&request_id, None, e))
}

/// Run the auto-close sweep now (admin)
pub async fn close_finished_tournaments<R: LeagueRepository + 'static>(
    State(state): State<AppState<R>>,
) -> Json<CloseSummary> {
    Json(scheduler::run_once(&state.tournament_manager).await)
}
