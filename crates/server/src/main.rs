// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod live;
mod rate_limit;
mod session;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State as AxumState, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use civdraft_api::{
    ActionRequest, ActionResponse, ApiError, CatalogResponse, ChangeNotifier,
    CreateSessionRequest, CreateSessionResponse, DeleteResponse, DraftService, SessionResponse,
    UpsertSessionRequest, ValidateConfigResponse, VersionResponse, WriteResponse,
};
use civdraft_persistence::{MAX_PAYLOAD_BYTES, Persistence, PurgeReport, SessionStore};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::live::live_session_handler;
use crate::rate_limit::{RateLimiter, rate_limit};
use crate::session::{SessionKeyPath, ViewerRole};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Civ Draft Server - HTTP and WebSocket server for civilization drafts
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Sessions not updated for this many days are purged
    #[arg(long, default_value_t = 7)]
    retention_days: u32,

    /// Seconds between purge sweeps
    #[arg(long, default_value_t = 3600)]
    purge_interval_secs: u64,

    /// Requests allowed per client in each rate-limit window
    #[arg(long, default_value_t = 120)]
    rate_limit_requests: u32,

    /// Length of the rate-limit window in seconds
    #[arg(long, default_value_t = 60)]
    rate_limit_window_secs: u64,

    /// Seconds between WebSocket liveness pings
    #[arg(long, default_value_t = 30)]
    heartbeat_secs: u64,
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session operations and change notification.
    pub(crate) service: DraftService,
    /// Per-client request budget.
    pub(crate) limiter: RateLimiter,
    /// Interval between WebSocket pings.
    pub(crate) heartbeat: Duration,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error indicator.
    pub(crate) error: bool,
    /// Error message.
    pub(crate) message: String,
    /// Whether the same request may succeed later.
    pub(crate) retryable: bool,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
    retryable: bool,
}

impl HttpError {
    /// A non-retryable error with the given status.
    pub(crate) const fn new(status: StatusCode, message: String) -> Self {
        Self {
            status,
            message,
            retryable: false,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
            retryable: self.retryable,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::DomainRuleViolation { rule, .. } => match rule.as_str() {
                "role_cannot_act" => StatusCode::FORBIDDEN,
                "item_unavailable" => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::CONFLICT,
            },
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::StorageUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            retryable: err.is_retryable(),
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(status = %rejection.status(), "Rejected request body");
        Self::new(rejection.status(), rejection.body_text())
    }
}

/// Handler for GET `/api/catalog`.
#[allow(clippy::unused_async)]
async fn handle_catalog() -> Json<CatalogResponse> {
    Json(DraftService::catalog())
}

/// Handler for POST `/api/config/validate`.
#[allow(clippy::unused_async)]
async fn handle_validate_config(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ValidateConfigResponse>, HttpError> {
    let Json(raw): Json<Value> = body?;
    Ok(Json(DraftService::validate_config(&raw)?))
}

/// Handler for POST `/api/sessions`.
///
/// Creates a session under a freshly generated key.
async fn handle_create_session(
    AxumState(app_state): AxumState<AppState>,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), HttpError> {
    let Json(req): Json<CreateSessionRequest> = body?;
    let response: CreateSessionResponse = app_state.service.create_session(&req.config).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/api/session/{key}`.
async fn handle_get_session(
    AxumState(app_state): AxumState<AppState>,
    SessionKeyPath(key): SessionKeyPath,
    ViewerRole(role): ViewerRole,
) -> Result<Json<SessionResponse>, HttpError> {
    Ok(Json(app_state.service.get_session(&key, role).await?))
}

/// Handler for GET `/api/session/{key}/version`.
async fn handle_get_version(
    AxumState(app_state): AxumState<AppState>,
    SessionKeyPath(key): SessionKeyPath,
) -> Result<Json<VersionResponse>, HttpError> {
    Ok(Json(app_state.service.session_version(&key).await?))
}

/// Handler for POST `/api/session/{key}`.
///
/// Replaces the stored state and history.
async fn handle_put_session(
    AxumState(app_state): AxumState<AppState>,
    SessionKeyPath(key): SessionKeyPath,
    body: Result<Json<UpsertSessionRequest>, JsonRejection>,
) -> Result<Json<WriteResponse>, HttpError> {
    let Json(req): Json<UpsertSessionRequest> = body?;
    Ok(Json(app_state.service.put_session(&key, req).await?))
}

/// Handler for DELETE `/api/session/{key}`.
async fn handle_delete_session(
    AxumState(app_state): AxumState<AppState>,
    SessionKeyPath(key): SessionKeyPath,
) -> Result<Json<DeleteResponse>, HttpError> {
    Ok(Json(app_state.service.delete_session(&key).await?))
}

/// Handler for POST `/api/session/{key}/action`.
async fn handle_action(
    AxumState(app_state): AxumState<AppState>,
    SessionKeyPath(key): SessionKeyPath,
    body: Result<Json<ActionRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, HttpError> {
    let Json(req): Json<ActionRequest> = body?;
    Ok(Json(app_state.service.perform_action(&key, req).await?))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/catalog", get(handle_catalog))
        .route("/api/config/validate", post(handle_validate_config))
        .route("/api/sessions", post(handle_create_session))
        .route(
            "/api/session/{key}",
            get(handle_get_session)
                .post(handle_put_session)
                .delete(handle_delete_session),
        )
        .route("/api/session/{key}/version", get(handle_get_version))
        .route("/api/session/{key}/action", post(handle_action))
        .route("/api/session/{key}/live", get(live_session_handler))
        .layer(DefaultBodyLimit::max(MAX_PAYLOAD_BYTES))
        .layer(middleware::from_fn_with_state(app_state.clone(), rate_limit))
        .with_state(app_state)
}

/// Purges expired sessions and idle rate-limit buckets every `interval`.
async fn run_purge_loop(app_state: AppState, retention: Duration, interval: Duration) {
    let mut ticker: tokio::time::Interval = tokio::time::interval(interval);
    loop {
        ticker.tick().await;

        match app_state.service.purge_expired(retention).await {
            Ok(report) if report == PurgeReport::default() => {}
            Ok(report) => {
                info!(
                    expired = report.expired,
                    corrupt = report.corrupt,
                    "Purged stale sessions"
                );
            }
            Err(e) => error!(error = %e, "Session purge failed"),
        }

        let pruned: usize = app_state.limiter.prune(Instant::now());
        if pruned > 0 {
            info!(pruned, "Pruned idle rate-limit buckets");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Civ Draft Server");

    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let notifier: ChangeNotifier = ChangeNotifier::new();
    let app_state: AppState = AppState {
        service: DraftService::new(SessionStore::new(persistence), notifier.clone()),
        limiter: RateLimiter::new(
            args.rate_limit_requests,
            Duration::from_secs(args.rate_limit_window_secs.max(1)),
        ),
        heartbeat: Duration::from_secs(args.heartbeat_secs.max(1)),
    };

    let retention: Duration = Duration::from_secs(u64::from(args.retention_days) * SECONDS_PER_DAY);
    let purge_interval: Duration = Duration::from_secs(args.purge_interval_secs.max(1));
    info!(
        retention_days = args.retention_days,
        purge_interval_secs = purge_interval.as_secs(),
        "Starting session purge task"
    );
    let purge_task: tokio::task::JoinHandle<()> =
        tokio::spawn(run_purge_loop(app_state.clone(), retention, purge_interval));

    let app: Router = build_router(app_state);

    let addr: SocketAddr = SocketAddr::new(args.bind, args.port);
    info!("Server listening on {}", addr);

    let listener: tokio::net::TcpListener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
        info!("Shutting down");
        notifier.shutdown();
    })
    .await?;

    purge_task.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode as HttpStatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;

    /// Helper to create test app state with in-memory persistence.
    fn create_test_app_state() -> AppState {
        create_test_app_state_with_limit(1000)
    }

    fn create_test_app_state_with_limit(limit: u32) -> AppState {
        let persistence: Persistence =
            Persistence::new_in_memory().expect("Failed to create in-memory persistence");
        AppState {
            service: DraftService::new(SessionStore::new(persistence), ChangeNotifier::new()),
            limiter: RateLimiter::new(limit, Duration::from_secs(60)),
            heartbeat: Duration::from_secs(30),
        }
    }

    fn create_test_config() -> Value {
        json!({
            "name": "Server Cup",
            "teamSize": 1,
            "civPool": ["english", "french", "hre", "mongols"],
            "mapPool": ["altai", "lipany", "dry-arabia"],
            "steps": [
                {"action": "ban", "target": "civ", "team": "team1"},
                {"action": "ban", "target": "civ", "team": "team2"},
                {"action": "pick", "target": "civ", "team": "team1", "playerIndex": 0},
                {"action": "pick", "target": "civ", "team": "team2", "playerIndex": 0},
                {"action": "pick", "target": "map", "team": "team1", "auto": true}
            ],
            "team1Players": [{"name": "Alpha"}],
            "team2Players": [{"name": "Bravo"}]
        })
    }

    fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(body).unwrap()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Creates a session through the router and returns its key.
    async fn create_session(app: &Router) -> String {
        let response: Response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/sessions",
                &json!({"config": create_test_config()}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::CREATED);
        let body: Value = body_json(response).await;
        body["sessionKey"].as_str().unwrap().to_string()
    }

    async fn post_action(app: &Router, key: &str, body: &Value) -> Response {
        app.clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/session/{key}/action"),
                body,
            ))
            .await
            .unwrap()
    }

    async fn mark_both_ready(app: &Router, key: &str) {
        for role in ["team1", "team2"] {
            let response: Response =
                post_action(app, key, &json!({"action": "mark-ready", "role": role})).await;
            assert_eq!(response.status(), HttpStatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_catalog_lists_civilizations_and_maps() {
        let app: Router = build_router(create_test_app_state());

        let response: Response = app.oneshot(get_request("/api/catalog")).await.unwrap();

        assert_eq!(response.status(), HttpStatusCode::OK);
        let body: Value = body_json(response).await;
        assert!(!body["civilizations"].as_array().unwrap().is_empty());
        assert!(!body["maps"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validate_config_accepts_and_rejects() {
        let app: Router = build_router(create_test_app_state());

        let response: Response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/config/validate",
                &create_test_config(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::OK);
        assert_eq!(body_json(response).await["valid"], true);

        let response: Response = app
            .oneshot(json_request(
                "POST",
                "/api/config/validate",
                &json!({"name": "", "teamSize": 9}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
        let body: Value = body_json(response).await;
        assert_eq!(body["error"], true);
        assert_eq!(body["retryable"], false);
    }

    #[tokio::test]
    async fn test_create_then_get_session() {
        let app: Router = build_router(create_test_app_state());
        let key: String = create_session(&app).await;
        assert_eq!(key.len(), 10);

        let response: Response = app
            .oneshot(get_request(&format!("/api/session/{key}?role=team1")))
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::OK);
        let body: Value = body_json(response).await;
        assert_eq!(body["exists"], true);
        assert_eq!(body["version"], 1);
        assert_eq!(body["state"]["config"]["name"], "Server Cup");
    }

    #[tokio::test]
    async fn test_missing_session_reads_as_not_existing() {
        let app: Router = build_router(create_test_app_state());

        let response: Response = app
            .oneshot(get_request("/api/session/ABCDEFGH23"))
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::OK);
        assert_eq!(body_json(response).await, json!({"exists": false}));
    }

    #[tokio::test]
    async fn test_malformed_key_returns_bad_request() {
        let app: Router = build_router(create_test_app_state());

        let response: Response = app
            .oneshot(get_request("/api/session/not-a-key"))
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_role_query_returns_bad_request() {
        let app: Router = build_router(create_test_app_state());
        let key: String = create_session(&app).await;

        let response: Response = app
            .oneshot(get_request(&format!("/api/session/{key}?role=referee")))
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_version_endpoint_tracks_writes() {
        let app: Router = build_router(create_test_app_state());
        let key: String = create_session(&app).await;
        mark_both_ready(&app, &key).await;

        let response: Response = app
            .oneshot(get_request(&format!("/api/session/{key}/version")))
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"exists": true, "version": 3})
        );
    }

    #[tokio::test]
    async fn test_action_flow_through_router() {
        let app: Router = build_router(create_test_app_state());
        let key: String = create_session(&app).await;
        mark_both_ready(&app, &key).await;

        let response: Response = post_action(
            &app,
            &key,
            &json!({"action": "apply-action", "role": "team1", "itemId": "english"}),
        )
        .await;

        assert_eq!(response.status(), HttpStatusCode::OK);
        let body: Value = body_json(response).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["changed"], true);
        assert_eq!(body["version"], 4);
        assert!(body.get("pickedId").is_none());
    }

    #[tokio::test]
    async fn test_unknown_action_returns_bad_request() {
        let app: Router = build_router(create_test_app_state());
        let key: String = create_session(&app).await;

        let response: Response =
            post_action(&app, &key, &json!({"action": "teleport", "role": "admin"})).await;

        assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_out_of_turn_action_returns_conflict() {
        let app: Router = build_router(create_test_app_state());
        let key: String = create_session(&app).await;
        mark_both_ready(&app, &key).await;

        let response: Response = post_action(
            &app,
            &key,
            &json!({"action": "apply-action", "role": "team2", "itemId": "english"}),
        )
        .await;

        assert_eq!(response.status(), HttpStatusCode::CONFLICT);
        assert_eq!(body_json(response).await["retryable"], false);
    }

    #[tokio::test]
    async fn test_spectator_action_returns_forbidden() {
        let app: Router = build_router(create_test_app_state());
        let key: String = create_session(&app).await;
        mark_both_ready(&app, &key).await;

        let response: Response = post_action(
            &app,
            &key,
            &json!({"action": "apply-action", "role": "spectator", "itemId": "english"}),
        )
        .await;

        assert_eq!(response.status(), HttpStatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_action_on_missing_session_returns_not_found() {
        let app: Router = build_router(create_test_app_state());

        let response: Response =
            post_action(&app, "ABCDEFGH23", &json!({"action": "undo", "role": "admin"})).await;

        assert_eq!(response.status(), HttpStatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_oversized_body_returns_payload_too_large() {
        let app: Router = build_router(create_test_app_state());
        let padding: String = "x".repeat(MAX_PAYLOAD_BYTES + 1);

        let response: Response = app
            .oneshot(json_request(
                "POST",
                "/api/session/ABCDEFGH23",
                &json!({"state": {"padding": padding}, "history": []}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_upsert_replaces_session() {
        let app: Router = build_router(create_test_app_state());
        let key: String = create_session(&app).await;

        let current: Value = body_json(
            app.clone()
                .oneshot(get_request(&format!("/api/session/{key}?role=admin")))
                .await
                .unwrap(),
        )
        .await;

        let response: Response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/session/{key}"),
                &json!({"state": current["state"], "history": []}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"ok": true, "version": 2})
        );
    }

    #[tokio::test]
    async fn test_delete_session() {
        let app: Router = build_router(create_test_app_state());
        let key: String = create_session(&app).await;

        let delete: Request<Body> = Request::builder()
            .method("DELETE")
            .uri(format!("/api/session/{key}"))
            .body(Body::empty())
            .unwrap();
        let response: Response = app.clone().oneshot(delete).await.unwrap();
        assert_eq!(response.status(), HttpStatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"ok": true, "existed": true})
        );

        let response: Response = app
            .oneshot(get_request(&format!("/api/session/{key}/version")))
            .await
            .unwrap();
        assert_eq!(body_json(response).await, json!({"exists": false}));
    }

    #[tokio::test]
    async fn test_rate_limit_returns_too_many_requests() {
        let app: Router = build_router(create_test_app_state_with_limit(2));

        for _ in 0..2 {
            let request: Request<Body> = Request::builder()
                .uri("/api/catalog")
                .header("x-forwarded-for", "198.51.100.4")
                .body(Body::empty())
                .unwrap();
            let response: Response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), HttpStatusCode::OK);
        }

        let request: Request<Body> = Request::builder()
            .uri("/api/catalog")
            .header("x-forwarded-for", "198.51.100.4")
            .body(Body::empty())
            .unwrap();
        let response: Response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), HttpStatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("retry-after"));
        assert_eq!(body_json(response).await["retryable"], true);

        // Another client still has its own budget.
        let request: Request<Body> = Request::builder()
            .uri("/api/catalog")
            .header("x-forwarded-for", "198.51.100.5")
            .body(Body::empty())
            .unwrap();
        let response: Response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), HttpStatusCode::OK);
    }

    #[test]
    fn test_api_errors_map_to_status_codes() {
        let cases: Vec<(ApiError, StatusCode, bool)> = vec![
            (
                ApiError::DomainRuleViolation {
                    rule: String::from("item_unavailable"),
                    message: String::from("taken"),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
                false,
            ),
            (
                ApiError::DomainRuleViolation {
                    rule: String::from("draft_completed"),
                    message: String::from("done"),
                },
                StatusCode::CONFLICT,
                false,
            ),
            (
                ApiError::StorageUnavailable {
                    message: String::from("locked"),
                },
                StatusCode::SERVICE_UNAVAILABLE,
                true,
            ),
            (
                ApiError::PayloadTooLarge {
                    size: 600_000,
                    limit: MAX_PAYLOAD_BYTES,
                },
                StatusCode::PAYLOAD_TOO_LARGE,
                false,
            ),
        ];

        for (err, status, retryable) in cases {
            let http: HttpError = HttpError::from(err);
            assert_eq!(http.status, status);
            assert_eq!(http.retryable, retryable);
        }
    }
}
