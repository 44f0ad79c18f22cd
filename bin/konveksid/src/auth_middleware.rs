//! JWT authentication middleware.
//!
//! Extracts JWT from `Authorization: Bearer <token>`, validates it,
//! and provides an [`Actor`] to downstream handlers via request
//! extensions.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use konveksi_core::{Actor, Role};

/// JWT claims payload issued by the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: String,
    /// Display name.
    pub name: String,
    /// Role string (closed enumeration, e.g. "KEPALA_PRODUKSI").
    pub role: String,
    /// Session id.
    pub sid: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Shared JWT configuration for the middleware.
#[derive(Clone)]
pub struct JwtState {
    pub decoding_key: DecodingKey,
    pub validation: Validation,
}

/// Error type for authentication failures.
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "Token otorisasi tidak ada / missing authorization token".to_string(),
            ),
            AuthError::InvalidToken(e) => (
                StatusCode::UNAUTHORIZED,
                format!("Token tidak valid / invalid token: {}", e),
            ),
        };
        let body = serde_json::json!({ "code": "UNAUTHENTICATED", "message": msg });
        (status, axum::Json(body)).into_response()
    }
}

/// Middleware that extracts and validates JWT from the Authorization header.
///
/// If the request path is in the public list, the middleware passes
/// through. Otherwise it requires a valid JWT and stores the [`Actor`]
/// in request extensions.
pub async fn auth_middleware(
    State(jwt_state): State<Arc<JwtState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let path = request.uri().path().to_string();

    if is_public_path(&path) {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingToken)?;

    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &jwt_state.decoding_key,
        &jwt_state.validation,
    )
    .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    let claims = token_data.claims;
    let role = Role::from_str(&claims.role)
        .ok_or_else(|| AuthError::InvalidToken(format!("unknown role {}", claims.role)))?;

    let actor = Actor {
        id: claims.sub.clone(),
        name: claims.name.clone(),
        role,
    };

    request.extensions_mut().insert(actor);

    Ok(next.run(request).await)
}

/// Check if a request path is public (no auth required).
fn is_public_path(path: &str) -> bool {
    matches!(path, "/" | "/health" | "/version") || path.starts_with("/auth/login")
}
