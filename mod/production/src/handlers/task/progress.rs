//! POST /production/tasks/{id}/@progress — assigned worker reports progress.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use konveksi_core::Actor;

use crate::api::ServiceState;
use crate::model::ProgressRequest;

pub async fn progress(
    State(svc): State<ServiceState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(body): Json<ProgressRequest>,
) -> impl IntoResponse {
    match svc.progress_task(&actor, &id, body) {
        Ok(task) => (StatusCode::OK, Json(task)).into_response(),
        Err(e) => e.into_response(),
    }
}
