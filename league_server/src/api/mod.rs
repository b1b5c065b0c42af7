//! HTTP API for the league server.
//!
//! # Modules
//!
//! - [`tournaments`]: Registration workflow and tournament administration
//! - [`teams`]: Team creation and lookup
//! - [`middleware`]: Admin key guard
//! - [`request_id`]: Request id propagation, request logging and metrics
//!
//! # Endpoints Overview
//!
//! ```text
//! GET   /health                                    - Health check (public)
//! POST  /api/v1/teams                              - Create team (public)
//! GET   /api/v1/teams?page&limit                   - List teams (public)
//! GET   /api/v1/teams/{id}                         - Get team (public)
//! POST  /api/v1/tournaments                        - Create tournament (admin)
//! GET   /api/v1/tournaments?page&limit             - List tournaments (public)
//! GET   /api/v1/tournaments/{id}                   - Tournament with teams (public)
//! PATCH /api/v1/tournaments/{id}                   - Update tournament (admin)
//! POST  /api/v1/tournaments/{id}/apply             - Register a team (public)
//! POST  /api/v1/tournaments/{id}/cancel            - Withdraw a team (public)
//! POST  /api/v1/tournaments/{id}/result            - Record result (admin)
//! POST  /api/v1/admin/tournaments/close-finished   - Run auto-close now (admin)
//! ```
//!
//! Workflow operations answer with `{ "success", "code", "message" }` where
//! `message` is the user-facing text. Infrastructure failures return `500`
//! with a generic message; details only go to the log.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use league::db::MemoryLeagueRepository;
//! use league_server::api::{AppState, create_router};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = Arc::new(MemoryLeagueRepository::new());
//! let app = create_router(AppState::new(repository, "0123456789abcdef"));
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod middleware;
pub mod request_id;
pub mod teams;
pub mod tournaments;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use league::db::LeagueRepository;
use league::db::timeouts::{DEFAULT_QUERY_TIMEOUT, with_timeout};
use league::{TeamManager, TournamentManager};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use self::middleware::AdminKey;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is behind an `Arc`.
pub struct AppState<R: LeagueRepository> {
    pub tournament_manager: Arc<TournamentManager<R>>,
    pub team_manager: Arc<TeamManager<R>>,
    pub repository: Arc<R>,
    pub admin_key: Arc<AdminKey>,
}

impl<R: LeagueRepository> AppState<R> {
    /// Build managers over one shared repository
    pub fn new(repository: Arc<R>, admin_api_key: &str) -> Self {
        Self {
            tournament_manager: Arc::new(TournamentManager::new(repository.clone())),
            team_manager: Arc::new(TeamManager::new(repository.clone())),
            repository,
            admin_key: Arc::new(AdminKey::new(admin_api_key)),
        }
    }
}

impl<R: LeagueRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            tournament_manager: self.tournament_manager.clone(),
            team_manager: self.team_manager.clone(),
            repository: self.repository.clone(),
            admin_key: self.admin_key.clone(),
        }
    }
}

/// Error body for non-workflow failures
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler error: status plus JSON body
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// `?page=&limit=` query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl From<PageParams> for league::PageRequest {
    fn from(params: PageParams) -> Self {
        league::PageRequest::new(params.page, params.limit)
    }
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router<R: LeagueRepository + 'static>(state: AppState<R>) -> Router {
    let v1_routes = create_v1_router(state.clone());

    Router::new()
        .route("/health", get(health_check::<R>))
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router<R: LeagueRepository + 'static>(state: AppState<R>) -> Router<AppState<R>> {
    let public_routes = Router::new()
        .route("/teams", post(teams::create_team::<R>).get(teams::list_teams::<R>))
        .route("/teams/{team_id}", get(teams::get_team::<R>))
        .route("/tournaments", get(tournaments::list_tournaments::<R>))
        .route(
            "/tournaments/{tournament_id}",
            get(tournaments::get_tournament::<R>),
        )
        .route(
            "/tournaments/{tournament_id}/apply",
            post(tournaments::apply_tournament::<R>),
        )
        .route(
            "/tournaments/{tournament_id}/cancel",
            post(tournaments::cancel_tournament::<R>),
        );

    // PATCH shares a path with the public GET, so the guard is a route layer
    // on the admin router and the two are merged method-by-method.
    let admin_routes = Router::new()
        .route("/tournaments", post(tournaments::create_tournament::<R>))
        .route(
            "/tournaments/{tournament_id}",
            axum::routing::patch(tournaments::update_tournament::<R>),
        )
        .route(
            "/tournaments/{tournament_id}/result",
            post(tournaments::record_result::<R>),
        )
        .route(
            "/admin/tournaments/close-finished",
            post(tournaments::close_finished_tournaments::<R>),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::admin_guard::<R>,
        ));

    Router::new().merge(public_routes).merge(admin_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the repository answers within the query timeout,
/// `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","version":"0.1.0","database":true,"timestamp":"2026-03-02T10:30:00Z"}
/// ```
async fn health_check<R: LeagueRepository + 'static>(
    State(state): State<AppState<R>>,
) -> impl IntoResponse {
    let db_healthy = match with_timeout(DEFAULT_QUERY_TIMEOUT, state.repository.ping()).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            false
        }
    };

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
