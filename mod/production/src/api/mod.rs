mod batches;
mod cutting_results;
mod sub_batches;
mod tasks;

use std::sync::Arc;

use axum::Router;

use crate::service::ProductionService;

/// Shared handler state.
pub type ServiceState = Arc<ProductionService>;

/// Build the complete production module router.
///
/// Routes:
/// - `POST   /batches`                        — create batch
/// - `GET    /batches`                        — list batches
/// - `GET    /batches/{id}`                   — get batch
/// - `GET    /batches/{id}/timeline`          — batch audit log
/// - `POST   /batches/{id}/@complete`         — close batch
/// - `POST   /batches/{id}/tasks`             — assign a work task
/// - `GET    /tasks`, `GET /tasks/{id}`       — query tasks
/// - `POST   /tasks/{id}/@start|@progress|@complete`
/// - `GET    /batches/{id}/cutting-result`    — the batch's cutting result
/// - `GET    /cutting-results/{id}`
/// - `POST   /cutting-results/{id}/@confirm`
/// - `POST   /batches/{id}/sub-batches`       — create sub-batch
/// - `GET    /batches/{id}/sub-batches`
/// - `GET    /sub-batches/{id}`, `GET /sub-batches/{id}/timeline`
/// - `POST   /sub-batches/{id}/@complete`     — submit to warehouse
/// - `POST   /sub-batches/{id}/@verify`       — warehouse verification
pub fn router(service: Arc<ProductionService>) -> Router {
    Router::new()
        .merge(batches::router())
        .merge(tasks::router())
        .merge(cutting_results::router())
        .merge(sub_batches::router())
        .with_state(service)
}
