use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use konveksi_core::ServiceError;

use crate::handlers;
use crate::model::CuttingResult;

use super::ServiceState;

pub fn router() -> Router<ServiceState> {
    Router::new()
        .route("/cutting-results/{id}", get(get_cutting_result))
        .route("/batches/{id}/cutting-result", get(batch_cutting_result))
        .route(
            "/cutting-results/{id}/@confirm",
            post(handlers::cutting_result::confirm),
        )
}

async fn get_cutting_result(
    State(svc): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<CuttingResult>, ServiceError> {
    Ok(Json(svc.get_cutting_result(&id)?))
}

async fn batch_cutting_result(
    State(svc): State<ServiceState>,
    Path(batch_id): Path<String>,
) -> Result<Json<CuttingResult>, ServiceError> {
    Ok(Json(svc.cutting_result_for_batch(&batch_id)?))
}
