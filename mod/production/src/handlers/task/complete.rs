//! POST /production/tasks/{id}/@complete — assigned worker completes a task.
//!
//! Cutting tasks report `piecesBySize` (creates the cutting result);
//! finishing tasks on a sub-batch report `items`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use konveksi_core::Actor;

use crate::api::ServiceState;
use crate::model::CompleteTaskRequest;

pub async fn complete(
    State(svc): State<ServiceState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(body): Json<CompleteTaskRequest>,
) -> impl IntoResponse {
    match svc.complete_task(&actor, &id, body) {
        Ok(task) => (StatusCode::OK, Json(task)).into_response(),
        Err(e) => e.into_response(),
    }
}
