use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};

use konveksi_core::{Actor, ServiceError};

use crate::handlers;
use crate::model::{CreateSubBatchRequest, SubBatch, SubBatchTimelineEntry};

use super::ServiceState;

pub fn router() -> Router<ServiceState> {
    Router::new()
        .route(
            "/batches/{id}/sub-batches",
            post(create_sub_batch).get(list_sub_batches),
        )
        .route("/sub-batches/{id}", get(get_sub_batch))
        .route("/sub-batches/{id}/timeline", get(sub_batch_timeline))
        .route("/sub-batches/{id}/@complete", post(handlers::sub_batch::complete))
        .route("/sub-batches/{id}/@verify", post(handlers::sub_batch::verify))
}

async fn create_sub_batch(
    State(svc): State<ServiceState>,
    Extension(actor): Extension<Actor>,
    Path(batch_id): Path<String>,
    Json(req): Json<CreateSubBatchRequest>,
) -> Result<(StatusCode, Json<SubBatch>), ServiceError> {
    let sub_batch = svc.create_sub_batch(&actor, &batch_id, req)?;
    Ok((StatusCode::CREATED, Json(sub_batch)))
}

async fn list_sub_batches(
    State(svc): State<ServiceState>,
    Path(batch_id): Path<String>,
) -> Result<Json<Vec<SubBatch>>, ServiceError> {
    svc.get_batch(&batch_id)?;
    Ok(Json(svc.sub_batches_of(&batch_id)?))
}

async fn get_sub_batch(
    State(svc): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<SubBatch>, ServiceError> {
    Ok(Json(svc.get_sub_batch(&id)?))
}

async fn sub_batch_timeline(
    State(svc): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<SubBatchTimelineEntry>>, ServiceError> {
    svc.get_sub_batch(&id)?;
    Ok(Json(svc.sub_batch_timeline(&id)?))
}
