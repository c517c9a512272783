//! Authenticated actor extraction.
//!
//! Every friendship route takes an [`AuthUser`]. Requests without a valid
//! bearer token are rejected here, before any engine call.

use crate::handlers::{AppState, ErrorResponse};
use crate::session::SessionError;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Redirect, Response},
};
use rapport_domain::UserId;
use tracing::debug;

/// The authenticated user performing the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

/// Rejection for requests without a valid identity
#[derive(Debug)]
pub struct Unauthenticated {
    reason: String,
    wants_json: bool,
    login_path: String,
}

impl IntoResponse for Unauthenticated {
    fn into_response(self) -> Response {
        if self.wants_json {
            let body = Json(ErrorResponse {
                friendship_status: None,
                error: self.reason,
            });
            (StatusCode::UNAUTHORIZED, body).into_response()
        } else {
            Redirect::to(&self.login_path).into_response()
        }
    }
}

/// Whether the client asked for a JSON response
fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .map(|accept| accept.contains("/json") || accept.contains("+json"))
        .unwrap_or(false)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Unauthenticated;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let reject = |reason: String| Unauthenticated {
            reason,
            wants_json: wants_json(&parts.headers),
            login_path: state.login_path.clone(),
        };

        let token = bearer_token(&parts.headers)
            .ok_or_else(|| reject("Missing bearer token".to_string()))?;

        state
            .session_manager
            .authenticate(token)
            .map(AuthUser)
            .map_err(|e: SessionError| {
                debug!(error = %e, "rejected bearer token");
                reject(e.to_string())
            })
    }
}
