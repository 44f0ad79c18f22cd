//! POST /production/sub-batches/{id}/@complete — submit a sub-batch to
//! the warehouse. Requires status CREATED; writes SUBMITTED_TO_WAREHOUSE
//! plus one FINISHING_COMPLETED timeline row summarizing good/reject
//! counts by category.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use konveksi_core::Actor;

use crate::api::ServiceState;
use crate::model::CompleteSubBatchRequest;

pub async fn complete(
    State(svc): State<ServiceState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(body): Json<CompleteSubBatchRequest>,
) -> impl IntoResponse {
    match svc.complete_sub_batch(&actor, &id, body) {
        Ok(sub_batch) => (StatusCode::OK, Json(sub_batch)).into_response(),
        Err(e) => e.into_response(),
    }
}
