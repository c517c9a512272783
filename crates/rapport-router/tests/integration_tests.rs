//! Integration tests for the Router service

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use rapport_domain::{FriendshipStatus, FriendshipStore, UserId, UserPair};
use rapport_router::{
    build_state,
    config::RouterConfig,
    handlers::{
        create_router, AppState, ErrorResponse, FriendshipStatusResponse, HealthCheckResponse,
        PendingRequestsResponse,
    },
};
use serde::de::DeserializeOwned;
use tower::ServiceExt; // for oneshot

/// Helper to create test application state
fn create_test_state() -> AppState {
    build_state(&RouterConfig::default_test_config()).unwrap()
}

fn token_for(state: &AppState, user: UserId) -> String {
    state.session_manager.generate_token(user).unwrap()
}

fn json_request(method: Method, uri: String, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ACCEPT, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap()
}

fn stored_status(state: &AppState, a: UserId, b: UserId) -> Option<FriendshipStatus> {
    let engine = state.engine.lock().unwrap();
    engine
        .store()
        .find_friendship(&UserPair::new(a, b).unwrap())
        .unwrap()
        .map(|f| f.status)
}

fn record_count(state: &AppState) -> usize {
    state.engine.lock().unwrap().store().friendship_count().unwrap()
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = create_router(create_test_state());

    let (status, body) = send(&app, json_request(Method::GET, "/health".into(), None)).await;

    assert_eq!(status, StatusCode::OK);
    let health: HealthCheckResponse = parse(&body);
    assert_eq!(health.status, "healthy");
}

#[tokio::test]
async fn test_guests_cannot_create_friendship_request() {
    let state = create_test_state();
    let app = create_router(state.clone());
    let recipient = UserId::new();

    let request = json_request(Method::POST, format!("/friendships/{}", recipient), None);
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let error: ErrorResponse = parse(&body);
    assert!(error.friendship_status.is_none());
    assert_eq!(record_count(&state), 0);
}

#[tokio::test]
async fn test_invalid_token_is_unauthenticated() {
    let state = create_test_state();
    let app = create_router(state.clone());

    let request = json_request(
        Method::POST,
        format!("/friendships/{}", UserId::new()),
        Some("not-a-jwt"),
    );
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(record_count(&state), 0);
}

#[tokio::test]
async fn test_can_create_friendship_request() {
    let state = create_test_state();
    let app = create_router(state.clone());
    let sender = UserId::new();
    let recipient = UserId::new();
    let token = token_for(&state, sender);

    let uri = format!("/friendships/{}", recipient);
    let (status, body) = send(&app, json_request(Method::POST, uri.clone(), Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    let response: FriendshipStatusResponse = parse(&body);
    assert_eq!(response.friendship_status, "pending");
    assert_eq!(
        stored_status(&state, sender, recipient),
        Some(FriendshipStatus::Pending)
    );

    send(&app, json_request(Method::POST, uri, Some(&token))).await;
    assert_eq!(record_count(&state), 1);
}

#[tokio::test]
async fn test_user_cannot_send_request_to_itself() {
    let state = create_test_state();
    let app = create_router(state.clone());
    let sender = UserId::new();
    let token = token_for(&state, sender);

    let request = json_request(Method::POST, format!("/friendships/{}", sender), Some(&token));
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(record_count(&state), 0);
}

#[tokio::test]
async fn test_guests_cannot_delete_friendship_request() {
    let app = create_router(create_test_state());

    let request = json_request(Method::DELETE, format!("/friendships/{}", UserId::new()), None);
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_senders_can_delete_sent_request() {
    let state = create_test_state();
    let app = create_router(state.clone());
    let sender = UserId::new();
    let recipient = UserId::new();
    state.engine.lock().unwrap().request(sender, recipient).unwrap();

    let token = token_for(&state, sender);
    let request = json_request(Method::DELETE, format!("/friendships/{}", recipient), Some(&token));
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    let response: FriendshipStatusResponse = parse(&body);
    assert_eq!(response.friendship_status, "deleted");
    assert_eq!(stored_status(&state, sender, recipient), None);
}

#[tokio::test]
async fn test_recipients_can_delete_received_request() {
    let state = create_test_state();
    let app = create_router(state.clone());
    let sender = UserId::new();
    let recipient = UserId::new();
    state.engine.lock().unwrap().request(sender, recipient).unwrap();

    let token = token_for(&state, recipient);
    let request = json_request(Method::DELETE, format!("/friendships/{}", sender), Some(&token));
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    let response: FriendshipStatusResponse = parse(&body);
    assert_eq!(response.friendship_status, "deleted");
    assert_eq!(stored_status(&state, sender, recipient), None);
}

#[tokio::test]
async fn test_senders_cannot_delete_denied_request() {
    let state = create_test_state();
    let app = create_router(state.clone());
    let sender = UserId::new();
    let recipient = UserId::new();
    {
        let mut engine = state.engine.lock().unwrap();
        engine.request(sender, recipient).unwrap();
        engine.deny(recipient, sender).unwrap();
    }

    let token = token_for(&state, sender);
    let request = json_request(Method::DELETE, format!("/friendships/{}", recipient), Some(&token));
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    let response: ErrorResponse = parse(&body);
    assert_eq!(response.friendship_status.as_deref(), Some("denied"));
    assert_eq!(
        stored_status(&state, sender, recipient),
        Some(FriendshipStatus::Denied)
    );
}

#[tokio::test]
async fn test_recipients_can_delete_denied_request() {
    let state = create_test_state();
    let app = create_router(state.clone());
    let sender = UserId::new();
    let recipient = UserId::new();
    {
        let mut engine = state.engine.lock().unwrap();
        engine.request(sender, recipient).unwrap();
        engine.deny(recipient, sender).unwrap();
    }

    let token = token_for(&state, recipient);
    let request = json_request(Method::DELETE, format!("/friendships/{}", sender), Some(&token));
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    let response: FriendshipStatusResponse = parse(&body);
    assert_eq!(response.friendship_status, "deleted");
    assert_eq!(stored_status(&state, sender, recipient), None);
}

#[tokio::test]
async fn test_withdraw_without_record_is_not_found() {
    let state = create_test_state();
    let app = create_router(state.clone());
    let token = token_for(&state, UserId::new());

    let request = json_request(
        Method::DELETE,
        format!("/friendships/{}", UserId::new()),
        Some(&token),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let response: ErrorResponse = parse(&body);
    assert_eq!(response.friendship_status.as_deref(), Some("deleted"));
}

#[tokio::test]
async fn test_can_accept_friendship_request() {
    let state = create_test_state();
    let app = create_router(state.clone());
    let sender = UserId::new();
    let recipient = UserId::new();
    state.engine.lock().unwrap().request(sender, recipient).unwrap();

    let token = token_for(&state, recipient);
    let request = json_request(
        Method::POST,
        format!("/accept-friendships/{}", sender),
        Some(&token),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    let response: FriendshipStatusResponse = parse(&body);
    assert_eq!(response.friendship_status, "accepted");
    assert_eq!(
        stored_status(&state, sender, recipient),
        Some(FriendshipStatus::Accepted)
    );
}

#[tokio::test]
async fn test_sender_cannot_accept_own_request() {
    let state = create_test_state();
    let app = create_router(state.clone());
    let sender = UserId::new();
    let recipient = UserId::new();
    state.engine.lock().unwrap().request(sender, recipient).unwrap();

    let token = token_for(&state, sender);
    let request = json_request(
        Method::POST,
        format!("/accept-friendships/{}", recipient),
        Some(&token),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    let response: ErrorResponse = parse(&body);
    assert_eq!(response.friendship_status.as_deref(), Some("pending"));
    assert_eq!(
        stored_status(&state, sender, recipient),
        Some(FriendshipStatus::Pending)
    );
}

#[tokio::test]
async fn test_guests_cannot_accept_friendship_request() {
    let app = create_router(create_test_state());

    let request = json_request(
        Method::POST,
        format!("/accept-friendships/{}", UserId::new()),
        None,
    );
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A browser (non-JSON) listing request is sent to the login page
    let request = Request::builder()
        .method(Method::GET)
        .uri("/accept-friendships")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn test_can_list_pending_requests() {
    let state = create_test_state();
    let app = create_router(state.clone());
    let recipient = UserId::new();
    let sender = UserId::new();
    state.engine.lock().unwrap().request(sender, recipient).unwrap();

    let token = token_for(&state, recipient);
    let request = json_request(Method::GET, "/accept-friendships".into(), Some(&token));
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    let listing: PendingRequestsResponse = parse(&body);
    assert_eq!(listing.friendship_requests.len(), 1);
    assert_eq!(listing.friendship_requests[0].sender_id, sender.to_string());
    assert_eq!(listing.friendship_requests[0].friendship_status, "pending");
}

#[tokio::test]
async fn test_can_deny_friendship_request() {
    let state = create_test_state();
    let app = create_router(state.clone());
    let sender = UserId::new();
    let recipient = UserId::new();
    state.engine.lock().unwrap().request(sender, recipient).unwrap();

    let token = token_for(&state, recipient);
    let request = json_request(
        Method::DELETE,
        format!("/accept-friendships/{}", sender),
        Some(&token),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    let response: FriendshipStatusResponse = parse(&body);
    assert_eq!(response.friendship_status, "denied");
    assert_eq!(
        stored_status(&state, sender, recipient),
        Some(FriendshipStatus::Denied)
    );
}

#[tokio::test]
async fn test_guests_cannot_deny_friendship_request() {
    let app = create_router(create_test_state());

    let request = json_request(
        Method::DELETE,
        format!("/accept-friendships/{}", UserId::new()),
        None,
    );
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_friendship_status_lookup() {
    let state = create_test_state();
    let app = create_router(state.clone());
    let me = UserId::new();
    let other = UserId::new();
    let token = token_for(&state, me);
    let uri = format!("/friendships/{}", other);

    let (_, body) = send(&app, json_request(Method::GET, uri.clone(), Some(&token))).await;
    let response: FriendshipStatusResponse = parse(&body);
    assert_eq!(response.friendship_status, "deleted");

    state.engine.lock().unwrap().request(other, me).unwrap();

    let (status, body) = send(&app, json_request(Method::GET, uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let response: FriendshipStatusResponse = parse(&body);
    assert_eq!(response.friendship_status, "pending");
}

#[test]
fn test_router_config_from_toml() {
    let toml = r#"
        bind_address = "0.0.0.0"
        bind_port = 9000
        jwt_secret = "my-secret-key"
        database_path = ":memory:"
    "#;

    let config = RouterConfig::from_toml(toml).unwrap();
    assert_eq!(config.bind_addr(), "0.0.0.0:9000");
    assert!(build_state(&config).is_ok());
}

#[test]
fn test_file_backed_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = RouterConfig::default_test_config();
    config.database_path = dir.path().join("rapport.db").to_string_lossy().into_owned();

    let sender = UserId::new();
    let recipient = UserId::new();
    {
        let state = build_state(&config).unwrap();
        state.engine.lock().unwrap().request(sender, recipient).unwrap();
    }

    let state = build_state(&config).unwrap();
    assert_eq!(
        stored_status(&state, sender, recipient),
        Some(FriendshipStatus::Pending)
    );
}
