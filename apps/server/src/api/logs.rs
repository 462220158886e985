use std::sync::Arc;

use axum::{
    extract::State,
    routing::{delete, get},
    Json, Router,
};

use crate::{error::ApiResult, main_lib::AppState};
use omie_core::{logs::ConnectionLog, maintenance::clear_sensitive_data};

async fn list_logs(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<ConnectionLog>>> {
    Ok(Json(state.log_service.list()))
}

async fn clear_logs(State(state): State<Arc<AppState>>) -> ApiResult<()> {
    state.log_service.clear()?;
    Ok(())
}

/// Forget the key, the secret, every profile and the connection log.
/// Proxy settings survive.
async fn clear_data(State(state): State<Arc<AppState>>) -> ApiResult<()> {
    clear_sensitive_data(state.store.as_ref())?;
    state.log_service.clear()?;
    state.credentials_service.reload()?;
    state.dashboard.clear();
    tracing::info!("Sensitive data cleared on request");
    Ok(())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/logs", get(list_logs).delete(clear_logs))
        .route("/data", delete(clear_data))
}
