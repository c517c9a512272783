//! HTTP request handlers for the friendship routes.
//!
//! Translates requests into engine calls and engine results into JSON bodies
//! that always carry `friendship_status` when the pair's state is known.

use crate::auth::AuthUser;
use crate::session::SessionManager;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use rapport_domain::{Friendship, ReportedStatus, UserId};
use rapport_engine::{EngineError, FriendshipEngine};
use rapport_store::SqliteStore;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::error;

/// Engine shared between requests; the mutex serializes each operation's
/// read-check-write sequence.
pub type SharedEngine = Arc<Mutex<FriendshipEngine<SqliteStore>>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Session manager for bearer token verification
    pub session_manager: Arc<SessionManager>,
    /// The relationship engine
    pub engine: SharedEngine,
    /// Redirect target for unauthenticated non-JSON clients
    pub login_path: String,
}

impl AppState {
    /// Run one engine operation under the engine lock
    fn with_engine<T>(
        &self,
        op: impl FnOnce(&mut FriendshipEngine<SqliteStore>) -> Result<T, EngineError>,
    ) -> Result<T, AppError> {
        let mut engine = self
            .engine
            .lock()
            .map_err(|_| AppError::InternalError("engine lock poisoned".to_string()))?;
        Ok(op(&mut *engine)?)
    }
}

/// Body returned by every friendship operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendshipStatusResponse {
    /// Status of the pair after the operation
    pub friendship_status: String,
}

impl From<ReportedStatus> for FriendshipStatusResponse {
    fn from(status: ReportedStatus) -> Self {
        Self {
            friendship_status: status.as_str().to_string(),
        }
    }
}

/// A pending request as listed for its recipient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendshipRequestView {
    /// Who sent the request
    pub sender_id: String,
    /// Who received it
    pub recipient_id: String,
    /// Always "pending" in listings of open requests
    pub friendship_status: String,
    /// When the request was sent (Unix seconds)
    pub created_at: u64,
}

impl From<&Friendship> for FriendshipRequestView {
    fn from(friendship: &Friendship) -> Self {
        Self {
            sender_id: friendship.initiator_id.to_string(),
            recipient_id: friendship.target_id.to_string(),
            friendship_status: friendship.status.as_str().to_string(),
            created_at: friendship.created_at,
        }
    }
}

/// Pending requests listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRequestsResponse {
    /// Open requests addressed to the caller, newest first
    pub friendship_requests: Vec<FriendshipRequestView>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status of the pair after the rejected operation, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendship_status: Option<String>,
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Engine rejected the operation
    EngineError(EngineError),
    /// Malformed request input
    BadRequest(String),
    /// Internal server error
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, friendship_status, message) = match self {
            AppError::EngineError(e) => {
                let status = match &e {
                    EngineError::InvalidOperation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    EngineError::Unauthorized { .. } => StatusCode::FORBIDDEN,
                    EngineError::NotFound => StatusCode::NOT_FOUND,
                    EngineError::InvalidState { .. } | EngineError::Conflict { .. } => {
                        StatusCode::CONFLICT
                    }
                    EngineError::Store(msg) => {
                        error!(error = %msg, "friendship store failure");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, e.reported_status(), e.to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, None, msg),
            AppError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, None, msg),
        };

        let body = Json(ErrorResponse {
            friendship_status: friendship_status.map(|s| s.as_str().to_string()),
            error: message,
        });
        (status, body).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        AppError::EngineError(e)
    }
}

fn parse_user(raw: &str) -> Result<UserId, AppError> {
    UserId::parse(raw).map_err(AppError::BadRequest)
}

/// POST /friendships/:other - Send a friendship request
async fn request_friendship(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(other): Path<String>,
) -> Result<Json<FriendshipStatusResponse>, AppError> {
    let other = parse_user(&other)?;
    let status = state.with_engine(|engine| engine.request(actor, other))?;
    Ok(Json(status.into()))
}

/// DELETE /friendships/:other - Withdraw or clear a friendship
async fn withdraw_friendship(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(other): Path<String>,
) -> Result<Json<FriendshipStatusResponse>, AppError> {
    let other = parse_user(&other)?;
    let status = state.with_engine(|engine| engine.withdraw(actor, other))?;
    Ok(Json(status.into()))
}

/// GET /friendships/:other - Current status with another user
async fn friendship_status(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(other): Path<String>,
) -> Result<Json<FriendshipStatusResponse>, AppError> {
    let other = parse_user(&other)?;
    let status = state.with_engine(|engine| engine.status_between(actor, other))?;
    Ok(Json(status.into()))
}

/// GET /accept-friendships - Pending requests addressed to the caller
async fn pending_requests(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
) -> Result<Json<PendingRequestsResponse>, AppError> {
    let pending = state.with_engine(|engine| engine.pending_requests(actor))?;
    Ok(Json(PendingRequestsResponse {
        friendship_requests: pending.iter().map(FriendshipRequestView::from).collect(),
    }))
}

/// POST /accept-friendships/:requester - Accept a pending request
async fn accept_friendship(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(requester): Path<String>,
) -> Result<Json<FriendshipStatusResponse>, AppError> {
    let requester = parse_user(&requester)?;
    let status = state.with_engine(|engine| engine.accept(actor, requester))?;
    Ok(Json(status.into()))
}

/// DELETE /accept-friendships/:requester - Deny a pending request
async fn deny_friendship(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(requester): Path<String>,
) -> Result<Json<FriendshipStatusResponse>, AppError> {
    let requester = parse_user(&requester)?;
    let status = state.with_engine(|engine| engine.deny(actor, requester))?;
    Ok(Json(status.into()))
}

/// GET /health - Health check
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthCheckResponse>) {
    let status = match state.engine.lock() {
        Ok(engine) if engine.store().friendship_count().is_ok() => "healthy",
        _ => "unhealthy",
    };

    let code = if status == "healthy" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(HealthCheckResponse {
            status: status.to_string(),
        }),
    )
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route(
            "/friendships/:other",
            get(friendship_status)
                .post(request_friendship)
                .delete(withdraw_friendship),
        )
        .route("/accept-friendships", get(pending_requests))
        .route(
            "/accept-friendships/:requester",
            post(accept_friendship).delete(deny_friendship),
        )
        .route("/health", get(health_check))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt; // for oneshot

    fn create_test_state() -> AppState {
        AppState {
            session_manager: Arc::new(SessionManager::new("test-secret", 3600)),
            engine: Arc::new(Mutex::new(FriendshipEngine::new(
                SqliteStore::new(":memory:").unwrap(),
            ))),
            login_path: "/login".to_string(),
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_user_id() {
        let state = create_test_state();
        let token = state.session_manager.generate_token(UserId::new()).unwrap();
        let app = create_router(state);

        let request = Request::builder()
            .method("POST")
            .uri("/friendships/not-a-uuid")
            .header(header::ACCEPT, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_engine_error_status_codes() {
        let cases = [
            (
                EngineError::InvalidOperation("self".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                EngineError::Unauthorized {
                    status: ReportedStatus::Denied,
                    reason: "sender".into(),
                },
                StatusCode::FORBIDDEN,
            ),
            (EngineError::NotFound, StatusCode::NOT_FOUND),
            (
                EngineError::Conflict {
                    status: ReportedStatus::Denied,
                },
                StatusCode::CONFLICT,
            ),
            (
                EngineError::Store("locked".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
