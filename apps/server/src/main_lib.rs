use std::sync::Arc;

use chrono::Utc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use omie_connect::{
    OmieApiClient, OmieGateway, OmieService, RawCallConsole, SyncConfig, SyncOrchestrator,
    SyncOutcome, SyncProgressReporter, SyncStatus,
};
use omie_core::{
    constants::LOG_RING_CAPACITY,
    credentials::{CredentialsService, CredentialsServiceTrait},
    dashboard::DashboardState,
    logs::{ConnectionLogService, ConnectionLogServiceTrait},
    maintenance::{perform_maintenance, MaintenanceReport},
    settings::SettingsStore,
};
use omie_storage_file::FileSettingsStore;

pub type ServerSyncOrchestrator = SyncOrchestrator<TracingProgressReporter>;

pub struct AppState {
    pub store: Arc<dyn SettingsStore>,
    pub credentials_service: Arc<dyn CredentialsServiceTrait>,
    pub log_service: Arc<dyn ConnectionLogServiceTrait>,
    pub dashboard: Arc<DashboardState>,
    pub sync_orchestrator: Arc<ServerSyncOrchestrator>,
    pub console: Arc<RawCallConsole>,
    /// Result of the maintenance pass run while building the state.
    pub maintenance_report: MaintenanceReport,
}

/// Forwards sync lifecycle events to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct TracingProgressReporter;

impl SyncProgressReporter for TracingProgressReporter {
    fn report_sync_start(&self, services: &[OmieService]) {
        let names: Vec<&str> = services.iter().map(|s| s.call()).collect();
        tracing::info!(status = %SyncStatus::Starting, calls = ?names, "Dashboard sync started");
    }

    fn report_fallback(&self, proxy_url: &str) {
        tracing::warn!(status = %SyncStatus::Retrying, proxy = proxy_url, "Retrying sync through the proxy tunnel");
    }

    fn report_sync_complete(&self, outcome: &SyncOutcome) {
        let status = SyncStatus::from(outcome);
        match outcome {
            SyncOutcome::Failed { message, .. } => {
                tracing::warn!(status = %status, "Dashboard sync failed: {}", message)
            }
            _ => tracing::info!(status = %status, ?outcome, "Dashboard sync finished"),
        }
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("OMIE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let file_store = FileSettingsStore::new(&config.store_path, config.store_key.as_deref())?;
    tracing::info!(
        "Settings store in use: {} (encrypted: {})",
        file_store.path().display(),
        file_store.is_encrypted()
    );
    let store: Arc<dyn SettingsStore> = Arc::new(file_store);

    // Persisted state is pruned before any service reads it.
    let maintenance_report = perform_maintenance(store.as_ref(), Utc::now())?;
    tracing::info!(?maintenance_report, "Startup maintenance complete");

    let credentials_service: Arc<dyn CredentialsServiceTrait> =
        Arc::new(CredentialsService::new(store.clone())?);
    let log_service: Arc<dyn ConnectionLogServiceTrait> =
        Arc::new(ConnectionLogService::new(store.clone(), LOG_RING_CAPACITY));
    let dashboard = Arc::new(DashboardState::new());

    let gateway: Arc<dyn OmieGateway> = Arc::new(OmieApiClient::new(config.api_timeout)?);

    let sync_orchestrator = Arc::new(SyncOrchestrator::new(
        gateway.clone(),
        credentials_service.clone(),
        log_service.clone(),
        dashboard.clone(),
        Arc::new(TracingProgressReporter),
        SyncConfig {
            base_url: config.api_base_url.clone(),
            ..SyncConfig::default()
        },
    ));

    let console = Arc::new(RawCallConsole::new(
        gateway,
        credentials_service.clone(),
        log_service.clone(),
        config.api_base_url.clone(),
    ));

    Ok(Arc::new(AppState {
        store,
        credentials_service,
        log_service,
        dashboard,
        sync_orchestrator,
        console,
        maintenance_report,
    }))
}

/// Run a sync in the background without holding up the caller.
pub fn spawn_sync(state: &Arc<AppState>) {
    let orchestrator = state.sync_orchestrator.clone();
    tokio::spawn(async move {
        orchestrator.sync().await;
    });
}

/// Kick off the first sync once the server is up, when credentials exist.
pub fn start_initial_sync(state: &Arc<AppState>, config: &Config) {
    if !config.sync_on_start {
        tracing::info!("Initial sync disabled (OMIE_SYNC_ON_START)");
        return;
    }
    if !state.credentials_service.active().is_complete() {
        tracing::info!("No credentials configured yet; waiting for PUT /api/v1/credentials");
        return;
    }
    spawn_sync(state);
}
