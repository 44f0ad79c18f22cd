//! User storage and owner-gated user management endpoints.
//!
//! Workers must log in to act on tasks, so users live in a SQL table.
//! The owner account is seeded at startup from the config hash; workers
//! are created here by the owner.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};

use konveksi_core::{Actor, Role, ServiceError, new_id, now_rfc3339};
use konveksi_sql::{Row, SQLStore, Value};

use crate::bootstrap;
use crate::routes::AppState;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        role TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        create_at TEXT NOT NULL
    )",
];

/// A user account. The password hash never leaves the store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: String,
    pub role: Role,
    pub create_at: String,
}

/// Persistent storage for users, backed by SQLStore (SQLite).
pub struct UserStore {
    db: Arc<dyn SQLStore>,
}

impl UserStore {
    /// Create a new UserStore and initialise the schema.
    pub fn new(db: Arc<dyn SQLStore>) -> Result<Self, ServiceError> {
        for stmt in SCHEMA {
            db.exec(stmt, &[])
                .map_err(|e| ServiceError::Storage(format!("user schema init: {}", e)))?;
        }
        Ok(Self { db })
    }

    /// Insert a new user.
    pub fn create(
        &self,
        username: &str,
        name: &str,
        role: Role,
        password_hash: &str,
    ) -> Result<User, ServiceError> {
        let user = User {
            id: new_id(),
            username: username.to_string(),
            name: name.to_string(),
            role,
            create_at: now_rfc3339(),
        };

        self.db
            .exec(
                "INSERT INTO users (id, username, name, role, password_hash, create_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                &[
                    Value::Text(user.id.clone()),
                    Value::Text(user.username.clone()),
                    Value::Text(user.name.clone()),
                    Value::Text(user.role.as_str().to_string()),
                    Value::Text(password_hash.to_string()),
                    Value::Text(user.create_at.clone()),
                ],
            )
            .map_err(|e| {
                let msg = e.to_string();
                if msg.contains("UNIQUE constraint") {
                    ServiceError::Conflict(format!(
                        "Nama pengguna {} sudah dipakai / username {} is already taken",
                        username, username
                    ))
                } else {
                    ServiceError::Storage(msg)
                }
            })?;

        Ok(user)
    }

    /// Look up a user and their password hash by username.
    pub fn get_credentials(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT id, username, name, role, password_hash, create_at \
                 FROM users WHERE username = ?1",
                &[Value::Text(username.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        match rows.first() {
            None => Ok(None),
            Some(row) => {
                let user = row_to_user(row)?;
                let hash = row
                    .get_str("password_hash")
                    .ok_or_else(|| ServiceError::Storage("missing password_hash".into()))?
                    .to_string();
                Ok(Some((user, hash)))
            }
        }
    }

    /// List all users, newest first.
    pub fn list(&self) -> Result<Vec<User>, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT id, username, name, role, create_at FROM users \
                 ORDER BY create_at DESC",
                &[],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        rows.iter().map(row_to_user).collect()
    }
}

fn row_to_user(row: &Row) -> Result<User, ServiceError> {
    let role_str = row
        .get_str("role")
        .ok_or_else(|| ServiceError::Storage("missing role column".into()))?;
    let role = Role::from_str(role_str)
        .ok_or_else(|| ServiceError::Storage(format!("unknown role {}", role_str)))?;
    Ok(User {
        id: row.get_str("id").unwrap_or_default().to_string(),
        username: row.get_str("username").unwrap_or_default().to_string(),
        name: row.get_str("name").unwrap_or_default().to_string(),
        role,
        create_at: row.get_str("create_at").unwrap_or_default().to_string(),
    })
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// Body for `POST /auth/users`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub name: String,
    pub role: Role,
    pub password: String,
}

/// Register user management routes (owner only).
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/users", post(create_user).get(list_users))
}

async fn create_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateUserRequest>,
) -> impl IntoResponse {
    if let Err(e) = actor.require_role(&[Role::Owner]) {
        return e.into_response();
    }
    if req.password.len() < 8 {
        return ServiceError::Validation(
            "Kata sandi minimal 8 karakter / password must be at least 8 characters".into(),
        )
        .into_response();
    }

    let hash = match bootstrap::hash_password(&req.password) {
        Ok(h) => h,
        Err(e) => return ServiceError::Internal(e.to_string()).into_response(),
    };

    match state.users.create(&req.username, &req.name, req.role, &hash) {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn list_users(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> impl IntoResponse {
    if let Err(e) = actor.require_role(&[Role::Owner]) {
        return e.into_response();
    }
    match state.users.list() {
        Ok(users) => Json(users).into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use konveksi_sql::SqliteStore;

    fn test_store() -> UserStore {
        let db = Arc::new(SqliteStore::open_in_memory().unwrap());
        UserStore::new(db).unwrap()
    }

    #[test]
    fn create_and_fetch_credentials() {
        let store = test_store();
        let user = store
            .create("budi", "Budi", Role::Pemotong, "hash123")
            .unwrap();
        assert_eq!(user.role, Role::Pemotong);

        let (fetched, hash) = store.get_credentials("budi").unwrap().unwrap();
        assert_eq!(fetched.id, user.id);
        assert_eq!(hash, "hash123");

        assert!(store.get_credentials("nobody").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_conflicts() {
        let store = test_store();
        store.create("budi", "Budi", Role::Pemotong, "h").unwrap();
        let err = store.create("budi", "Budi 2", Role::Penjahit, "h").unwrap_err();
        assert_eq!(err.error_code(), "ALREADY_EXISTS");
    }

    #[test]
    fn list_users_excludes_hash() {
        let store = test_store();
        store.create("siti", "Siti", Role::Penjahit, "h").unwrap();
        let users = store.list().unwrap();
        assert_eq!(users.len(), 1);
        let json = serde_json::to_string(&users[0]).unwrap();
        assert!(!json.contains("password"));
        assert!(json.contains("\"PENJAHIT\""));
    }
}
