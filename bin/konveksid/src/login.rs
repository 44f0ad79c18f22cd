//! Login endpoint — verifies password against argon2id hash, issues JWT.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use konveksi_core::{ServiceError, new_id};

use crate::auth_middleware::Claims;
use crate::bootstrap;
use crate::routes::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Register login routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login_handler))
}

/// Handle POST /auth/login.
///
/// Looks the user up in the users table (the owner account is seeded at
/// startup) and issues a JWT carrying the user's role.
async fn login_handler(
    State(state): State<AppState>,
    axum::Json(body): axum::Json<LoginRequest>,
) -> impl IntoResponse {
    let creds = match state.users.get_credentials(&body.username) {
        Ok(c) => c,
        Err(e) => return e.into_response(),
    };

    let Some((user, hash)) = creds else {
        return invalid_credentials();
    };
    if !bootstrap::verify_password(&body.password, &hash) {
        return invalid_credentials();
    }

    let config = &state.server_config;
    let now = chrono::Utc::now().timestamp();
    let expire_secs = config.jwt.expire_secs;

    let claims = Claims {
        sub: user.id,
        name: user.name,
        role: user.role.as_str().to_string(),
        sid: new_id(),
        iat: now,
        exp: now + expire_secs as i64,
    };

    let encoding_key = EncodingKey::from_secret(config.jwt.secret.as_bytes());
    match encode(&Header::default(), &claims, &encoding_key) {
        Ok(token) => {
            let response = LoginResponse {
                access_token: token,
                token_type: "Bearer".to_string(),
                expires_in: expire_secs,
            };
            (StatusCode::OK, axum::Json(serde_json::json!(response))).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to encode JWT: {}", e);
            ServiceError::Internal("internal server error".into()).into_response()
        }
    }
}

fn invalid_credentials() -> axum::response::Response {
    ServiceError::Unauthorized(
        "Nama pengguna atau kata sandi salah / invalid username or password".into(),
    )
    .into_response()
}
