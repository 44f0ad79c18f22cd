//! POST /production/tasks/{id}/@start — assigned worker starts a task.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use konveksi_core::Actor;

use crate::api::ServiceState;

pub async fn start(
    State(svc): State<ServiceState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match svc.start_task(&actor, &id) {
        Ok(task) => (StatusCode::OK, Json(task)).into_response(),
        Err(e) => e.into_response(),
    }
}
