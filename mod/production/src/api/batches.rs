use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;

use konveksi_core::{Actor, ListParams, ServiceError};

use crate::handlers;
use crate::model::{Batch, BatchTimelineEntry, CreateBatchRequest};
use crate::service::batches::BatchFilters;

use super::ServiceState;

pub fn router() -> Router<ServiceState> {
    Router::new()
        .route("/batches", post(create_batch).get(list_batches))
        .route("/batches/{id}", get(get_batch))
        .route("/batches/{id}/timeline", get(batch_timeline))
        .route("/batches/{id}/@complete", post(handlers::batch::complete))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchQuery {
    #[serde(flatten)]
    params: ListParams,
    status: Option<String>,
    product: Option<String>,
}

async fn create_batch(
    State(svc): State<ServiceState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateBatchRequest>,
) -> Result<(StatusCode, Json<Batch>), ServiceError> {
    let batch = svc.create_batch(&actor, req)?;
    Ok((StatusCode::CREATED, Json(batch)))
}

async fn get_batch(
    State(svc): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<Batch>, ServiceError> {
    Ok(Json(svc.get_batch(&id)?))
}

async fn list_batches(
    State(svc): State<ServiceState>,
    Query(q): Query<BatchQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let filters = BatchFilters {
        status: q.status,
        product: q.product,
    };
    let result = svc.list_batches(&q.params, &filters)?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

async fn batch_timeline(
    State(svc): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<BatchTimelineEntry>>, ServiceError> {
    // 404 for unknown batches rather than an empty timeline.
    svc.get_batch(&id)?;
    Ok(Json(svc.batch_timeline(&id)?))
}
