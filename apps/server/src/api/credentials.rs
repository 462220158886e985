use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::{
    error::ApiResult,
    main_lib::{spawn_sync, AppState},
};
use omie_core::{
    constants::LOG_METHOD_CONFIG, credentials::Credentials, logs::LogStatus,
};

/// Active credentials with the secret masked.
async fn get_credentials(State(state): State<Arc<AppState>>) -> ApiResult<Json<Credentials>> {
    Ok(Json(state.credentials_service.active().masked()))
}

/// Replace the active credentials, then start a sync with them.
async fn update_credentials(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Credentials>,
) -> ApiResult<Json<Credentials>> {
    let saved = state.credentials_service.save(payload)?;
    state.log_service.append(
        LOG_METHOD_CONFIG,
        LogStatus::System,
        "Network settings updated.",
    );
    spawn_sync(&state);
    Ok(Json(saved.masked()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/credentials",
        get(get_credentials).put(update_credentials),
    )
}
