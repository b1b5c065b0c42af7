//! Team endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use league::db::LeagueRepository;
use league::team::{NewTeam, Team, TeamError, TeamId};
use league::Page;

use super::request_id::RequestId;
use super::{ApiError, AppState, PageParams, api_error};

fn team_error(request_id: &RequestId, e: TeamError) -> ApiError {
    let status = match &e {
        TeamError::NotFound(_) => StatusCode::NOT_FOUND,
        TeamError::NameTaken(_) => StatusCode::CONFLICT,
        TeamError::Validation(_) => StatusCode::BAD_REQUEST,
        TeamError::Repository(inner) => {
            tracing::error!(request_id = %request_id.as_str(), "Team operation failed: {}", inner);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    api_error(status, e.client_message())
}

/// Create a team. Names are unique; a taken name is `409 Conflict`.
pub async fn create_team<R: LeagueRepository + 'static>(
    State(state): State<AppState<R>>,
    request_id: RequestId,
    Json(request): Json<NewTeam>,
) -> Result<(StatusCode, Json<Team>), ApiError> {
    let team = state
        .team_manager
        .create_team(request)
        .await
        .map_err(|e| team_error(&request_id, e))?;

    Ok((StatusCode::CREATED, Json(team)))
}

pub async fn get_team<R: LeagueRepository + 'static>(
    State(state): State<AppState<R>>,
    request_id: RequestId,
    Path(team_id): Path<TeamId>,
) -> Result<Json<Team>, ApiError> {
    state
        .team_manager
        .get_team(team_id)
        .await
        .map(Json)
        .map_err(|e| team_error(&request_id, e))
}

pub async fn list_teams<R: LeagueRepository + 'static>(
    State(state): State<AppState<R>>,
    request_id: RequestId,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<Team>>, ApiError> {
    state
        .team_manager
        .list_teams(params.into())
        .await
        .map(Json)
        .map_err(|e| team_error(&request_id, e))
}
