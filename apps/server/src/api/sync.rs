use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde_json::Value;

use crate::{error::ApiResult, main_lib::AppState};
use omie_connect::{ApiResponse, ConsoleRequest, SyncOutcome};

/// Run a sync and wait for its outcome.
///
/// The sync runs on its own task so a dropped request cannot cut it short
/// between the direct batch and the proxy retry.
async fn run_sync(State(state): State<Arc<AppState>>) -> ApiResult<Json<SyncOutcome>> {
    let orchestrator = state.sync_orchestrator.clone();
    let outcome = tokio::spawn(async move { orchestrator.sync().await })
        .await
        .map_err(|e| anyhow::anyhow!("Sync task failed: {}", e))?;
    Ok(Json(outcome))
}

/// Send a hand-written call. The upstream answer is returned in its wire shape.
async fn run_console(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConsoleRequest>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    Ok(Json(state.console.execute(request).await?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sync", post(run_sync))
        .route("/console", post(run_console))
}
