//! POST /production/batches/{id}/@complete — supervisor closes a batch.
//!
//! Legal only when the batch is IN_FINISHING, the finishing task is
//! completed and every sub-batch has reached the warehouse.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use konveksi_core::Actor;

use crate::api::ServiceState;

pub async fn complete(
    State(svc): State<ServiceState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match svc.complete_batch(&actor, &id) {
        Ok(batch) => (StatusCode::OK, Json(batch)).into_response(),
        Err(e) => e.into_response(),
    }
}
