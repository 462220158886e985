//! Dashboard sync orchestrator.
//!
//! Issues the configured batch of listing calls concurrently, switches to the
//! proxy tunnel once when the direct route fails at the network level, and
//! folds the results into the dashboard snapshot and the connection log.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::progress::SyncProgressReporter;
use crate::catalog::{DateRange, OmieRequest, OmieService, DEFAULT_API_BASE_URL};
use crate::gateway::{decode_page, ApiResponse, OmieGateway};
use omie_core::constants::{LOG_METHOD_API_SYNC, LOG_METHOD_CORS_AUTO};
use omie_core::credentials::{Credentials, CredentialsServiceTrait};
use omie_core::dashboard::{DashboardState, EntityKind, SnapshotUpdate};
use omie_core::errors::{Error, Result};
use omie_core::logs::{ConnectionLog, ConnectionLogServiceTrait, LogStatus};

/// Used when no failure in a failed batch carries any text.
const GENERIC_FAILURE_MESSAGE: &str = "Unexpected API response";

/// Configuration for sync operations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL the catalog paths are joined to.
    pub base_url: String,
    /// Procedures issued by each sync, in order.
    pub services: Vec<OmieService>,
    /// Page passed through to every listing.
    pub page: u32,
    /// Date filter; the current calendar year when `None`.
    pub date_range: Option<DateRange>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            services: OmieService::DEFAULT_BATCH.to_vec(),
            page: 1,
            date_range: None,
        }
    }
}

/// Whether the one-shot proxy fallback has been used in this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FallbackPolicy {
    NotAttempted,
    Attempted,
}

impl FallbackPolicy {
    /// Fall back only once, only from a direct route, and only when some call
    /// never reached the server.
    pub fn should_fall_back(
        self,
        credentials: &Credentials,
        results: &[(OmieRequest, ApiResponse<Value>)],
    ) -> bool {
        self == FallbackPolicy::NotAttempted
            && !credentials.use_proxy
            && results.iter().any(|(_, response)| response.is_network_error())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    MissingCredentials,
    AlreadyRunning,
}

/// What a call to [`SyncOrchestrator::sync`] did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SyncOutcome {
    Skipped {
        reason: SkipReason,
    },
    Synced {
        entities: Vec<EntityKind>,
        records: usize,
        fallback: FallbackPolicy,
    },
    Failed {
        message: String,
        fallback: FallbackPolicy,
    },
}

/// Orchestrates dashboard data synchronization.
///
/// Runs never overlap: a call made while another is in flight returns
/// [`SkipReason::AlreadyRunning`] immediately.
pub struct SyncOrchestrator<P: SyncProgressReporter> {
    gateway: Arc<dyn OmieGateway>,
    credentials: Arc<dyn CredentialsServiceTrait>,
    logs: Arc<dyn ConnectionLogServiceTrait>,
    state: Arc<DashboardState>,
    progress_reporter: Arc<P>,
    config: SyncConfig,
    running: AtomicBool,
}

impl<P: SyncProgressReporter> SyncOrchestrator<P> {
    pub fn new(
        gateway: Arc<dyn OmieGateway>,
        credentials: Arc<dyn CredentialsServiceTrait>,
        logs: Arc<dyn ConnectionLogServiceTrait>,
        state: Arc<DashboardState>,
        progress_reporter: Arc<P>,
        config: SyncConfig,
    ) -> Self {
        Self {
            gateway,
            credentials,
            logs,
            state,
            progress_reporter,
            config,
            running: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Fetch the configured batch with the active credentials.
    ///
    /// Every outcome other than a skip leaves an entry in the connection log.
    pub async fn sync(&self) -> SyncOutcome {
        let credentials = self.credentials.active();
        if !credentials.is_complete() {
            debug!("[Sync] Skipping sync: credentials are incomplete");
            return SyncOutcome::Skipped {
                reason: SkipReason::MissingCredentials,
            };
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("[Sync] Skipping sync: another run is in flight");
            return SyncOutcome::Skipped {
                reason: SkipReason::AlreadyRunning,
            };
        }
        let _running = RunningGuard(&self.running);

        info!("[Sync] Starting dashboard sync...");
        self.progress_reporter.report_sync_start(&self.config.services);

        let mut fallback = FallbackPolicy::NotAttempted;
        let result = self.sync_internal(credentials, &mut fallback).await;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("[Sync] Sync aborted: {}", err);
                self.logs.append(
                    LOG_METHOD_API_SYNC,
                    LogStatus::Error,
                    &format!("Critical error: {}", err),
                );
                SyncOutcome::Failed {
                    message: err.to_string(),
                    fallback,
                }
            }
        };

        self.progress_reporter.report_sync_complete(&outcome);
        outcome
    }

    /// `fallback` is updated as soon as the proxy is switched on, so a later
    /// error still reports the retry.
    async fn sync_internal(
        &self,
        mut credentials: Credentials,
        fallback: &mut FallbackPolicy,
    ) -> Result<SyncOutcome> {
        self.logs.append(
            LOG_METHOD_CORS_AUTO,
            LogStatus::System,
            "Injecting compatibility headers...",
        );

        let requests = self.requests();
        let mut results = self.run_batch(&credentials, &requests).await;

        if fallback.should_fall_back(&credentials, &results) {
            warn!("[Sync] Direct route failed at the network level, retrying through the proxy");
            self.logs.append(
                LOG_METHOD_CORS_AUTO,
                LogStatus::Pending,
                "Network failure detected. Enabling the proxy tunnel automatically...",
            );
            *fallback = FallbackPolicy::Attempted;
            credentials = self.credentials.enable_proxy()?;
            self.progress_reporter.report_fallback(&credentials.proxy_url);

            results = self.run_batch(&credentials, &requests).await;
        }

        if let Some(message) = failure_message(&results) {
            error!("[Sync] Batch failed: {}", message);
            self.logs.record(
                ConnectionLog::new(
                    LOG_METHOD_API_SYNC,
                    LogStatus::Error,
                    format!("Connection failed: {}", message),
                )
                .with_details(failure_details(&results)),
            );
            return Ok(SyncOutcome::Failed {
                message,
                fallback: *fallback,
            });
        }

        let update = build_update(results)?;
        let entities = update.kinds();
        let records = record_count(&update);
        self.state.apply(update, Utc::now());

        info!(
            "[Sync] Dashboard synced: {} records across {} entities",
            records,
            entities.len()
        );
        self.logs.append(
            LOG_METHOD_API_SYNC,
            LogStatus::Success,
            "Connection established and data synchronized.",
        );

        Ok(SyncOutcome::Synced {
            entities,
            records,
            fallback: *fallback,
        })
    }

    fn requests(&self) -> Vec<OmieRequest> {
        let range = self
            .config
            .date_range
            .unwrap_or_else(|| DateRange::calendar_year(Utc::now().date_naive()));
        self.config
            .services
            .iter()
            .map(|service| service.request(&self.config.base_url, self.config.page, &range))
            .collect()
    }

    /// Issue every request and wait for all of them; one failure does not
    /// cancel the others.
    async fn run_batch(
        &self,
        credentials: &Credentials,
        requests: &[OmieRequest],
    ) -> Vec<(OmieRequest, ApiResponse<Value>)> {
        let calls = requests.iter().map(|request| async move {
            let response = self
                .gateway
                .call(credentials, &request.endpoint, &request.call, &request.param)
                .await;
            (request.clone(), response)
        });
        join_all(calls).await
    }
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Text for the aggregated failure entry, `None` when every call succeeded.
///
/// Gateway-made errors win over upstream faults, which win over upstream
/// application errors.
pub fn failure_message(results: &[(OmieRequest, ApiResponse<Value>)]) -> Option<String> {
    if results.iter().all(|(_, response)| response.is_success()) {
        return None;
    }

    let synthetic = results.iter().find_map(|(_, response)| {
        response
            .gateway_error()
            .filter(|e| e.is_synthetic() && !e.description.is_empty())
            .map(|e| e.description.clone())
    });
    let fault = || {
        results.iter().find_map(|(_, response)| {
            response
                .fault_string()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    };
    let application = || {
        results.iter().find_map(|(_, response)| {
            response
                .gateway_error()
                .filter(|e| !e.is_synthetic() && !e.description.is_empty())
                .map(|e| e.description.clone())
        })
    };

    Some(
        synthetic
            .or_else(fault)
            .or_else(application)
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
    )
}

fn failure_details(results: &[(OmieRequest, ApiResponse<Value>)]) -> String {
    results
        .iter()
        .filter_map(|(request, response)| {
            response
                .failure_message()
                .map(|message| format!("{}: {}", request.call, message))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_update(results: Vec<(OmieRequest, ApiResponse<Value>)>) -> Result<SnapshotUpdate> {
    let mut update = SnapshotUpdate::default();
    for (request, response) in results {
        let ApiResponse::Success(body) = response else {
            continue;
        };
        let service = request.service;
        match service {
            OmieService::Receivable => update.receivables = Some(decode_records(body, service)?),
            OmieService::Payable => update.payables = Some(decode_records(body, service)?),
            OmieService::Clients => update.clients = Some(decode_records(body, service)?),
            OmieService::Sales => update.sales = Some(decode_records(body, service)?),
        }
    }
    Ok(update)
}

fn decode_records<T: DeserializeOwned>(body: Value, service: OmieService) -> Result<Vec<T>> {
    let page = decode_page::<T>(body, service.list_field()).map_err(|e| Error::PayloadDecode {
        entity: service.entity().to_string(),
        message: e.to_string(),
    })?;
    debug!(
        "[Sync] {}: {} records (page {:?} of {:?})",
        service.call(),
        page.records.len(),
        page.pagination.pagina,
        page.pagination.total_de_paginas
    );
    Ok(page.records)
}

fn record_count(update: &SnapshotUpdate) -> usize {
    update.receivables.as_ref().map_or(0, Vec::len)
        + update.payables.as_ref().map_or(0, Vec::len)
        + update.clients.as_ref().map_or(0, Vec::len)
        + update.sales.as_ref().map_or(0, Vec::len)
}
