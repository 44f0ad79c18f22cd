//! POST /production/sub-batches/{id}/@verify — warehouse verifies a
//! submitted sub-batch.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use konveksi_core::Actor;

use crate::api::ServiceState;

pub async fn verify(
    State(svc): State<ServiceState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match svc.verify_sub_batch(&actor, &id) {
        Ok(sub_batch) => (StatusCode::OK, Json(sub_batch)).into_response(),
        Err(e) => e.into_response(),
    }
}
