use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};

use crate::{
    error::ApiResult,
    main_lib::{spawn_sync, AppState},
};
use omie_core::{
    constants::LOG_METHOD_PROFILE,
    credentials::{CredentialProfile, Credentials, NewProfile},
    logs::LogStatus,
};

fn masked(profile: CredentialProfile) -> CredentialProfile {
    CredentialProfile {
        credentials: profile.credentials.masked(),
        ..profile
    }
}

async fn list_profiles(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<CredentialProfile>>> {
    let profiles = state.credentials_service.list_profiles()?;
    Ok(Json(profiles.into_iter().map(masked).collect()))
}

async fn create_profile(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewProfile>,
) -> ApiResult<Json<CredentialProfile>> {
    let profile = state.credentials_service.create_profile(payload)?;
    state.log_service.append(
        LOG_METHOD_PROFILE,
        LogStatus::System,
        &format!("Profile '{}' saved.", profile.name),
    );
    Ok(Json(masked(profile)))
}

/// Make a profile the active credential set and sync with it.
async fn select_profile(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Credentials>> {
    let credentials = state.credentials_service.select_profile(&id)?;
    state.log_service.append(
        LOG_METHOD_PROFILE,
        LogStatus::System,
        "Profile loaded as active credentials.",
    );
    spawn_sync(&state);
    Ok(Json(credentials.masked()))
}

async fn delete_profile(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<()> {
    state.credentials_service.delete_profile(&id)?;
    Ok(())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profiles", get(list_profiles).post(create_profile))
        .route("/profiles/{id}", delete(delete_profile))
        .route("/profiles/{id}/select", post(select_profile))
}
