//! HTTP tests for the league API.
//!
//! The router runs against the in-memory repository, so no database is needed.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use league::db::{LeagueRepository, MemoryLeagueRepository};
use league::team::NewTeam;
use league::{Tournament, TeamId};
use league_server::api::{AppState, create_router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot` method

const ADMIN_KEY: &str = "test-admin-key-0123456789";

fn create_test_server() -> (axum::Router, Arc<MemoryLeagueRepository>) {
    let repository = Arc::new(MemoryLeagueRepository::new());
    let app = create_router(AppState::new(repository.clone(), ADMIN_KEY));
    (app, repository)
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    let mut request = json_request(method, uri, body);
    request
        .headers_mut()
        .insert("x-admin-key", ADMIN_KEY.parse().unwrap());
    request
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn seed(repository: &MemoryLeagueRepository, team_limit: i32, teams: Vec<TeamId>) -> Tournament {
    let now = Utc::now();
    repository
        .seed_tournament(Tournament {
            id: 0,
            name: "Busan Open".to_string(),
            address: Some("Busan Asiad Stadium".to_string()),
            team_limit,
            register_deadline: now + Duration::days(2),
            event_date: now + Duration::days(8),
            is_finished: false,
            is_cancelled: false,
            winner_team_id: None,
            runner_up_team_id: None,
            teams,
            created_at: now,
        })
        .await
}

async fn create_team(repository: &MemoryLeagueRepository, name: &str) -> TeamId {
    repository.insert_team(&NewTeam::new(name)).await.unwrap().id
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let (app, _) = create_test_server();

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let (_, body) = send(&app, get("/health")).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (app, _) = create_test_server();

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-me-42")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "trace-me-42");
}

// ============================================================================
// Workflow Tests
// ============================================================================

#[tokio::test]
async fn test_apply_returns_created_with_message() {
    let (app, repository) = create_test_server();
    let team = create_team(&repository, "Daegu FC").await;
    let tournament = seed(&repository, 4, vec![]).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/v1/tournaments/{}/apply", tournament.id),
            json!({ "team_id": team }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["code"], "success");
    assert_eq!(body["message"], "신청이 완료되었습니다.");
}

#[tokio::test]
async fn test_apply_rejections_are_ok_with_failure_body() {
    let (app, repository) = create_test_server();
    let team = create_team(&repository, "Gwangju FC").await;
    let tournament = seed(&repository, 4, vec![team]).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/v1/tournaments/{}/apply", tournament.id),
            json!({ "team_id": team }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "duplicate_registration");
    assert_eq!(body["message"], "이미 신청한 팀입니다.");

    let (status, body) = send(
        &app,
        json_request("POST", "/api/v1/tournaments/999/apply", json!({ "team_id": team })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "존재하지 않는 대회입니다.");
}

#[tokio::test]
async fn test_apply_then_cancel_reopens() {
    let (app, repository) = create_test_server();
    let team = create_team(&repository, "Ulsan FC").await;
    let tournament = seed(&repository, 1, vec![]).await;
    let apply_uri = format!("/api/v1/tournaments/{}/apply", tournament.id);
    let cancel_uri = format!("/api/v1/tournaments/{}/cancel", tournament.id);

    let (status, _) = send(&app, json_request("POST", &apply_uri, json!({ "team_id": team }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(repository.find_tournament(tournament.id).await.unwrap().unwrap().is_finished);

    let (status, body) = send(&app, json_request("POST", &cancel_uri, json!({ "team_id": team }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "취소가 완료되었습니다.");

    let stored = repository.find_tournament(tournament.id).await.unwrap().unwrap();
    assert!(!stored.is_finished);
    assert!(stored.teams.is_empty());

    let (_, body) = send(&app, json_request("POST", &cancel_uri, json!({ "team_id": team }))).await;
    assert_eq!(body["code"], "not_registered");
}

#[tokio::test]
async fn test_apply_with_malformed_body_is_rejected() {
    let (app, repository) = create_test_server();
    let tournament = seed(&repository, 2, vec![]).await;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/tournaments/{}/apply", tournament.id),
            json!({ "team": "nope" }),
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

// ============================================================================
// Admin Tests
// ============================================================================

#[tokio::test]
async fn test_admin_routes_require_key() {
    let (app, repository) = create_test_server();
    let tournament = seed(&repository, 2, vec![]).await;

    let (status, _) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/v1/tournaments/{}", tournament.id),
            json!({ "name": "Renamed" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut wrong_key = json_request("POST", "/api/v1/admin/tournaments/close-finished", json!({}));
    wrong_key
        .headers_mut()
        .insert("x-admin-key", "not-the-admin-key".parse().unwrap());
    let (status, _) = send(&app, wrong_key).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // GET on the same path stays public
    let (status, _) = send(&app, get(&format!("/api/v1/tournaments/{}", tournament.id))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_and_fetch_tournament() {
    let (app, _) = create_test_server();
    let now = Utc::now();

    let (status, created) = send(
        &app,
        admin_request(
            "POST",
            "/api/v1/tournaments",
            json!({
                "name": "  Jeju Cup  ",
                "address": "Jeju World Cup Stadium",
                "team_limit": 8,
                "register_deadline": (now + Duration::days(5)).to_rfc3339(),
                "event_date": (now + Duration::days(12)).to_rfc3339(),
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Jeju Cup");
    assert_eq!(created["is_finished"], false);

    let id = created["id"].as_i64().unwrap();
    let (status, detail) = send(&app, get(&format!("/api/v1/tournaments/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["team_limit"], 8);
    assert_eq!(detail["registered_teams"], json!([]));

    let (status, page) = send(&app, get("/api/v1/tournaments?page=1&limit=5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["limit"], 5);
}

#[tokio::test]
async fn test_create_tournament_validation_error() {
    let (app, _) = create_test_server();
    let now = Utc::now();

    let (status, body) = send(
        &app,
        admin_request(
            "POST",
            "/api/v1/tournaments",
            json!({
                "name": "Zero Cup",
                "team_limit": 0,
                "register_deadline": (now + Duration::days(1)).to_rfc3339(),
                "event_date": (now + Duration::days(2)).to_rfc3339(),
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("team limit"));
}

#[tokio::test]
async fn test_update_keeps_address() {
    let (app, repository) = create_test_server();
    let tournament = seed(&repository, 4, vec![]).await;

    let (status, body) = send(
        &app,
        admin_request(
            "PATCH",
            &format!("/api/v1/tournaments/{}", tournament.id),
            json!({ "name": "Busan Grand Open", "address": "Somewhere Else" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "수정이 완료되었습니다.");

    let stored = repository.find_tournament(tournament.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Busan Grand Open");
    assert_eq!(stored.address.as_deref(), Some("Busan Asiad Stadium"));
}

#[tokio::test]
async fn test_close_finished_endpoint() {
    let (app, repository) = create_test_server();
    let a = create_team(&repository, "Team A").await;
    let b = create_team(&repository, "Team B").await;
    let full = seed(&repository, 2, vec![a, b]).await;
    seed(&repository, 3, vec![a]).await;

    let (status, summary) = send(
        &app,
        admin_request("POST", "/api/v1/admin/tournaments/close-finished", json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary, json!({ "examined": 2, "closed": 1, "failed": 0 }));
    assert!(repository.find_tournament(full.id).await.unwrap().unwrap().is_finished);
}

#[tokio::test]
async fn test_record_result() {
    let (app, repository) = create_test_server();
    let a = create_team(&repository, "Winners").await;
    let b = create_team(&repository, "Runners").await;
    let tournament = seed(&repository, 2, vec![a, b]).await;
    let uri = format!("/api/v1/tournaments/{}/result", tournament.id);

    let (status, _) = send(
        &app,
        admin_request("POST", &uri, json!({ "winner_team_id": a, "runner_up_team_id": a })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        admin_request("POST", &uri, json!({ "winner_team_id": a, "runner_up_team_id": b })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "결과가 등록되었습니다.");

    let stored = repository.find_tournament(tournament.id).await.unwrap().unwrap();
    assert_eq!(stored.winner_team_id, Some(a));
    assert_eq!(stored.runner_up_team_id, Some(b));
}

// ============================================================================
// Team Tests
// ============================================================================

#[tokio::test]
async fn test_team_endpoints() {
    let (app, _) = create_test_server();

    let (status, team) = send(
        &app,
        json_request("POST", "/api/v1/teams", json!({ "name": "Incheon United" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = team["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        json_request("POST", "/api/v1/teams", json!({ "name": "Incheon United" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, fetched) = send(&app, get(&format!("/api/v1/teams/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Incheon United");

    let (status, _) = send(&app, get("/api/v1/teams/4242")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, page) = send(&app, get("/api/v1/teams")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
}

#[tokio::test]
async fn test_missing_tournament_is_not_found() {
    let (app, _) = create_test_server();

    let (status, body) = send(&app, get("/api/v1/tournaments/77")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "존재하지 않는 대회입니다.");
}

#[tokio::test]
async fn test_overlong_tournament_name_is_bad_request() {
    let (app, _) = create_test_server();
    let now = Utc::now();

    let (status, body) = send(
        &app,
        admin_request(
            "POST",
            "/api/v1/tournaments",
            json!({
                "name": "x".repeat(101),
                "team_limit": 4,
                "register_deadline": (now + Duration::days(1)).to_rfc3339(),
                "event_date": (now + Duration::days(2)).to_rfc3339(),
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("at most 100"));
}

#[tokio::test]
async fn test_update_cannot_shrink_below_registered_teams() {
    let (app, repository) = create_test_server();
    let a = create_team(&repository, "Suwon A").await;
    let b = create_team(&repository, "Suwon B").await;
    let tournament = seed(&repository, 2, vec![a, b]).await;

    let (status, _) = send(
        &app,
        admin_request(
            "PATCH",
            &format!("/api/v1/tournaments/{}", tournament.id),
            json!({ "team_limit": 1 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let stored = repository.find_tournament(tournament.id).await.unwrap().unwrap();
    assert_eq!(stored.team_limit, 2);
}
