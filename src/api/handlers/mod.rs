use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::api::AppState;
use crate::error::ImportError;
use crate::import::tasks::{TaskSnapshot, TaskState};
use crate::models::{ImportReport, ImportRequest, PlanSummary};

// ============================================================
// Error Handling
// ============================================================

/// Map an import error onto an HTTP status.
///
/// Validation errors are the caller's fault and safe to expose verbatim.
/// Store failures during reconciliation surface as 502; everything later in
/// a run is recorded inside the report instead of becoming an HTTP error.
fn import_error_response(e: ImportError) -> (StatusCode, String) {
    if e.is_validation() {
        tracing::warn!("Validation error: {}", e);
        return (StatusCode::BAD_REQUEST, e.to_string());
    }

    tracing::error!("Import failed before any content was processed: {}", e);
    (StatusCode::BAD_GATEWAY, e.to_string())
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ============================================================
// Imports
// ============================================================

pub async fn import(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ImportReport>, (StatusCode, String)> {
    state
        .service
        .run(&request)
        .await
        .map(Json)
        .map_err(import_error_response)
}

#[derive(Debug, Serialize)]
pub struct AsyncImportResponse {
    pub task_id: Uuid,
    pub status: TaskState,
    pub message: String,
}

pub async fn import_async(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> Result<(StatusCode, Json<AsyncImportResponse>), (StatusCode, String)> {
    // Reject malformed requests up front so the caller gets a 400 instead of
    // a task that is doomed to fail.
    request.validate_project_name().map_err(import_error_response)?;
    request
        .version
        .parse::<crate::models::SemanticVersion>()
        .map_err(import_error_response)?;
    request.content.validate().map_err(import_error_response)?;

    let task_id = state.registry.create();
    let service = state.service.clone();
    let registry = state.registry.clone();

    tokio::spawn(async move {
        registry.mark_running(task_id, "Import started");
        match service.run(&request).await {
            Ok(report) => registry.mark_completed(task_id, report),
            Err(e) => registry.mark_failed(task_id, &e.to_string()),
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(AsyncImportResponse {
            task_id,
            status: TaskState::Pending,
            message: "Import accepted; poll /import/status/{task_id}".to_string(),
        }),
    ))
}

pub async fn import_status(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<TaskSnapshot>, (StatusCode, String)> {
    state
        .registry
        .get(task_id)
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Task not found".to_string()))
}

// ============================================================
// Plans
// ============================================================

pub async fn list_plans(
    State(state): State<AppState>,
    Path(project): Path<String>,
) -> Result<Json<Vec<PlanSummary>>, (StatusCode, String)> {
    state.store.list_plans(&project).await.map(Json).map_err(|e| {
        tracing::error!("Failed to list plans for '{}': {}", project, e);
        (StatusCode::BAD_GATEWAY, e.to_string())
    })
}
