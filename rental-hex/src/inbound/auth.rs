//! Authentication middleware for session tokens.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use rental_types::{AppError, Repository};

use super::handlers::AppState;

/// The raw bearer token of an authenticated request.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Extracts the token from the Authorization header.
/// Expected format: "Bearer <token>" or just "<token>"
fn extract_token(auth_header: Option<&str>) -> Option<&str> {
    let header = auth_header?;
    Some(header.strip_prefix("Bearer ").unwrap_or(header).trim())
}

/// Routes reachable without a session.
fn is_public(method: &Method, path: &str) -> bool {
    if path == "/health" || path.starts_with("/swagger-ui") || path.starts_with("/api-docs") {
        return true;
    }
    match *method {
        Method::POST => path == "/api/users" || path == "/api/sessions",
        Method::GET => {
            path == "/api/packages" || path == "/api/cars" || path.starts_with("/api/cars/")
        }
        _ => false,
    }
}

/// Authentication middleware that resolves session tokens.
///
/// On success the request carries the resolved `Caller` and the raw
/// `BearerToken` as extensions. Public routes pass through untouched.
pub async fn auth_middleware<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if is_public(request.method(), request.uri().path()) {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let token = match extract_token(auth_header) {
        Some(token) if !token.is_empty() => token.to_string(),
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    match state.accounts.authenticate(&token).await {
        Ok(caller) => {
            tracing::debug!(user_id = %caller.user_id, "Request authenticated");
            request.extensions_mut().insert(caller);
            request.extensions_mut().insert(BearerToken(token));
            next.run(request).await
        }
        Err(AppError::Unauthorized(message)) => unauthorized_response(&message),
        Err(e) => {
            tracing::error!("Session lookup failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "Internal server error",
                    "code": 500,
                    "kind": "internal"
                })),
            )
                .into_response()
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": message,
            "code": 401,
            "kind": "unauthorized"
        })),
    )
        .into_response()
}
