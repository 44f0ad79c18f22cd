use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;

use konveksi_core::{Actor, ListParams, ServiceError};

use crate::handlers;
use crate::model::{AssignTaskRequest, WorkTask};
use crate::service::tasks::TaskFilters;

use super::ServiceState;

pub fn router() -> Router<ServiceState> {
    Router::new()
        .route("/batches/{id}/tasks", post(assign_task))
        .route("/tasks", get(list_tasks))
        .route("/tasks/{id}", get(get_task))
        .route("/tasks/{id}/@start", post(handlers::task::start))
        .route("/tasks/{id}/@progress", post(handlers::task::progress))
        .route("/tasks/{id}/@complete", post(handlers::task::complete))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskQuery {
    #[serde(flatten)]
    params: ListParams,
    batch_id: Option<String>,
    assigned_to: Option<String>,
    stage: Option<String>,
    status: Option<String>,
}

async fn assign_task(
    State(svc): State<ServiceState>,
    Extension(actor): Extension<Actor>,
    Path(batch_id): Path<String>,
    Json(req): Json<AssignTaskRequest>,
) -> Result<(StatusCode, Json<WorkTask>), ServiceError> {
    let task = svc.assign_task(&actor, &batch_id, req)?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn list_tasks(
    State(svc): State<ServiceState>,
    Query(q): Query<TaskQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let filters = TaskFilters {
        batch_id: q.batch_id,
        assigned_to: q.assigned_to,
        stage: q.stage,
        status: q.status,
    };
    let result = svc.list_tasks(&q.params, &filters)?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

async fn get_task(
    State(svc): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<WorkTask>, ServiceError> {
    Ok(Json(svc.get_task(&id)?))
}
