pub mod api;
pub mod handlers;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;
use konveksi_core::{Module, ServiceError};
use konveksi_sql::SQLStore;

use service::ProductionService;

/// The Production module — garment batch workflow tracking.
///
/// Tracks production batches through cutting, sewing, finishing and
/// warehouse delivery. Every status transition is guarded against the
/// persisted predecessor status and recorded in an append-only timeline.
pub struct ProductionModule {
    service: Arc<ProductionService>,
}

impl ProductionModule {
    /// Create the production module and initialise its schema.
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Self, ServiceError> {
        Ok(Self {
            service: Arc::new(ProductionService::new(sql)?),
        })
    }

    /// Get a reference to the service for programmatic access.
    pub fn service(&self) -> &Arc<ProductionService> {
        &self.service
    }
}

impl Module for ProductionModule {
    fn name(&self) -> &str {
        "production"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.service))
    }
}
