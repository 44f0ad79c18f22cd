//! POST /production/cutting-results/{id}/@confirm — supervisor confirms
//! cutting counts. An already-confirmed result is rejected with 400 and
//! nothing is written.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use konveksi_core::Actor;

use crate::api::ServiceState;

pub async fn confirm(
    State(svc): State<ServiceState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match svc.confirm_cutting_result(&actor, &id) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => e.into_response(),
    }
}
