mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::import::tasks::TaskRegistry;
use crate::import::ImportService;
use crate::store::PlanStore;

/// Shared state of the HTTP shell. The store and registry are injected so
/// tests can run against a [`crate::store::MemoryStore`].
#[derive(Clone)]
pub struct AppState {
    pub service: ImportService,
    pub store: Arc<dyn PlanStore>,
    pub registry: TaskRegistry,
}

impl AppState {
    pub fn new(store: Arc<dyn PlanStore>) -> Self {
        Self {
            service: ImportService::new(store.clone()),
            store,
            registry: TaskRegistry::new(),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Imports
        .route("/import", post(handlers::import))
        .route("/import/async", post(handlers::import_async))
        .route("/import/status/{task_id}", get(handlers::import_status))
        // Plans
        .route("/plans/{project}", get(handlers::list_plans))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
